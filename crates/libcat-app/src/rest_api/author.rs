use crate::{auth::token::RequiredRolesLayer, crud_api, publish_api_docs};
#[cfg_attr(not(feature = "openapi"), allow(unused_imports))]
use libcat_dal::author::{Author, AuthorRepository, AuthorShort};
use libcat_types::claim::Role;

use crate::state::AppState;
#[allow(unused_imports)]
use axum::routing::{delete, get, post, put};

publish_api_docs!(
    extra_crud_api::list_books,
    extra_crud_api::create,
    extra_crud_api::update,
    extra_crud_api::delete
);
crud_api!(Author, RO);

mod extra_crud_api {
    use axum::{
        extract::{Path, Query, State},
        response::IntoResponse,
        Json,
    };
    use axum_valid::Garde;
    use http::StatusCode;
    use libcat_dal::author::{AuthorRepository, CreateAuthor, UpdateAuthor};
    #[cfg_attr(not(feature = "openapi"), allow(unused_imports))]
    use libcat_dal::book::{BookRepository, BookShort};
    use libcat_types::claim::ApiClaim;
    use tracing::info;

    use crate::{error::ApiResult, rest_api::Paging, state::AppState};

    #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}/books", tag = "Author", operation_id = "listAuthorBooks",
        params(Paging), responses((status = StatusCode::OK, description = "List of Author Books paginated", body = crate::rest_api::Page<BookShort>))))]
    pub async fn list_books(
        Path(author_id): Path<i64>,
        repository: BookRepository,
        State(state): State<AppState>,
        Garde(Query(paging)): Garde<Query<Paging>>,
    ) -> ApiResult<impl IntoResponse> {
        let default_page_size: u32 = state.config().default_page_size;
        let page_size = paging.page_size(default_page_size);
        let listing_params = paging.into_listing_params(default_page_size)?;
        let batch = repository.list_by_author(listing_params, author_id).await?;
        Ok((
            StatusCode::OK,
            Json(crate::rest_api::Page::from_batch(batch, page_size)),
        ))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(post, path = "", tag = "Author", operation_id = "createAuthor",
            responses((status = StatusCode::CREATED, description = "Created Author", body = libcat_dal::author::Author))))]
    pub async fn create(
        repository: AuthorRepository,
        api_user: ApiClaim,
        Garde(Json(mut payload)): Garde<Json<CreateAuthor>>,
    ) -> ApiResult<impl IntoResponse> {
        payload.created_by = Some(api_user.sub);
        let record = repository.create(payload).await?;

        Ok((StatusCode::CREATED, Json(record)))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/{id}", tag = "Author", operation_id = "updateAuthor",
            responses((status = StatusCode::OK, description = "Updated Author", body = libcat_dal::author::Author))))]
    pub async fn update(
        Path(id): Path<i64>,
        repository: AuthorRepository,
        Garde(Json(payload)): Garde<Json<UpdateAuthor>>,
    ) -> ApiResult<impl IntoResponse> {
        let record = repository.update(id, payload).await?;

        Ok((StatusCode::OK, Json(record)))
    }

    #[cfg_attr(
        feature = "openapi",
        utoipa::path(delete, path = "/{id}", tag = "Author", operation_id = "deleteAuthor",
        description = "Books of the author are detached or deleted, depending on server configuration")
    )]
    pub async fn delete(
        Path(id): Path<i64>,
        repository: AuthorRepository,
        State(state): State<AppState>,
    ) -> ApiResult<impl IntoResponse> {
        let policy = state.config().author_delete_policy;
        repository.delete(id, policy).await?;
        info!("Deleted author {id}, books handled by {policy} policy");

        Ok((StatusCode::NO_CONTENT, ()))
    }
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/{id}", delete(extra_crud_api::delete))
        .layer(RequiredRolesLayer::new([Role::Admin]))
        .route("/", post(extra_crud_api::create))
        .route("/{id}", put(extra_crud_api::update))
        .layer(RequiredRolesLayer::new([Role::Trusted, Role::Admin]))
        .route("/", get(crud_api::list))
        .route("/count", get(crud_api::count))
        .route("/{id}", get(crud_api::get))
        .route("/{id}/books", get(extra_crud_api::list_books))
}
