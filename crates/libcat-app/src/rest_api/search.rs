use axum::{
    extract::Query,
    response::IntoResponse,
    routing::get,
    Json,
};
use axum_valid::Garde;
use garde::Validate;
use http::StatusCode;
use libcat_dal::{
    author::{AuthorRepository, AuthorShort},
    book::{BookRepository, BookShort},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::ApiResult, state::AppState};

const DEFAULT_LIMIT: u32 = 20;

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct SearchQuery {
    /// Substring searched in book titles, genre names and author names
    #[garde(length(min = 1, max = 100))]
    q: String,
    /// Maximum number of results in each category
    #[garde(range(min = 1, max = 100))]
    limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchResult {
    pub books_by_title: Vec<BookShort>,
    pub books_by_genre: Vec<BookShort>,
    pub authors: Vec<AuthorShort>,
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "", tag = "Search", operation_id = "search",
    params(SearchQuery),
    responses((status = StatusCode::OK, description = "Matching books and authors", body = SearchResult))))]
pub async fn search(
    books: BookRepository,
    authors: AuthorRepository,
    Garde(Query(query)): Garde<Query<SearchQuery>>,
) -> ApiResult<impl IntoResponse> {
    let term = query.q.trim();
    let limit = i64::from(query.limit.unwrap_or(DEFAULT_LIMIT));
    debug!("Searching for {term}");
    let result = SearchResult {
        books_by_title: books.search_by_title(term, limit).await?,
        books_by_genre: books.search_by_genre(term, limit).await?,
        authors: authors.search(term, limit).await?,
    };
    Ok((StatusCode::OK, Json(result)))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/", get(search))
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(search))]
    struct ApiDocs;
    ApiDocs::openapi()
}
