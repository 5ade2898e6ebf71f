//! Catalog overview for front page and charts

use axum::{response::IntoResponse, routing::get, Json};
use http::StatusCode;
use libcat_dal::{
    author::{AuthorRepository, AuthorShort},
    book::{BookRepository, ChartEntry},
    genre::GenreRepository,
    user::UserRepository,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, state::AppState};

const LATEST_AUTHORS: i64 = 5;

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CatalogStats {
    pub books: u64,
    pub authors: u64,
    pub genres: u64,
    pub users: u64,
    pub latest_authors: Vec<AuthorShort>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Charts {
    pub books_per_genre: Vec<ChartEntry>,
    pub books_per_author: Vec<ChartEntry>,
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "", tag = "Stats", operation_id = "catalogStats",
    responses((status = StatusCode::OK, description = "Record counts and latest authors", body = CatalogStats))))]
pub async fn stats(
    books: BookRepository,
    authors: AuthorRepository,
    genres: GenreRepository,
    users: UserRepository,
) -> ApiResult<impl IntoResponse> {
    let stats = CatalogStats {
        books: books.count().await?,
        authors: authors.count().await?,
        genres: genres.count().await?,
        users: users.count().await?,
        latest_authors: authors.latest(LATEST_AUTHORS).await?,
    };
    Ok((StatusCode::OK, Json(stats)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/charts", tag = "Stats", operation_id = "catalogCharts",
    responses((status = StatusCode::OK, description = "Data for catalog charts", body = Charts))))]
pub async fn charts(books: BookRepository) -> ApiResult<impl IntoResponse> {
    let charts = Charts {
        books_per_genre: books.books_per_genre().await?,
        books_per_author: books.books_per_author().await?,
    };
    Ok((StatusCode::OK, Json(charts)))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(stats))
        .route("/charts", get(charts))
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(stats, charts))]
    struct ApiDocs;
    ApiDocs::openapi()
}
