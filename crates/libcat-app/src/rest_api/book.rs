use crate::{auth::token::RequiredRolesLayer, crud_api, publish_api_docs};
#[cfg_attr(not(feature = "openapi"), allow(unused_imports))]
use libcat_dal::book::{Book, BookRepository, BookShort};
use libcat_types::claim::Role;

use crate::state::AppState;
#[allow(unused_imports)]
use axum::routing::{delete, get, post, put};

publish_api_docs!(
    extra_crud_api::create,
    extra_crud_api::update,
    extra_crud_api::delete
);
crud_api!(Book, RO);

mod extra_crud_api {
    use axum::{extract::Path, response::IntoResponse, Json};
    use axum_valid::Garde;
    use http::StatusCode;
    use libcat_dal::book::{BookRepository, CreateBook, UpdateBook};
    use libcat_types::claim::ApiClaim;
    use tracing::debug;

    use crate::error::ApiResult;

    #[cfg_attr(feature = "openapi",  utoipa::path(post, path = "", tag = "Book", operation_id = "createBook",
            responses((status = StatusCode::CREATED, description = "Created Book", body = libcat_dal::book::Book))))]
    pub async fn create(
        repository: BookRepository,
        api_user: ApiClaim,
        Garde(Json(mut payload)): Garde<Json<CreateBook>>,
    ) -> ApiResult<impl IntoResponse> {
        payload.created_by = Some(api_user.sub);
        let record = repository.create(payload).await?;
        debug!("Created book {} ({})", record.id, record.isbn);

        Ok((StatusCode::CREATED, Json(record)))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/{id}", tag = "Book", operation_id = "updateBook",
            responses((status = StatusCode::OK, description = "Updated Book", body = libcat_dal::book::Book))))]
    pub async fn update(
        Path(id): Path<i64>,
        repository: BookRepository,
        Garde(Json(payload)): Garde<Json<UpdateBook>>,
    ) -> ApiResult<impl IntoResponse> {
        let record = repository.update(id, payload).await?;

        Ok((StatusCode::OK, Json(record)))
    }

    #[cfg_attr(
        feature = "openapi",
        utoipa::path(delete, path = "/{id}", tag = "Book", operation_id = "deleteBook")
    )]
    pub async fn delete(
        Path(id): Path<i64>,
        repository: BookRepository,
    ) -> ApiResult<impl IntoResponse> {
        repository.delete(id).await?;

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
        .merge(super::comment::router())
}
