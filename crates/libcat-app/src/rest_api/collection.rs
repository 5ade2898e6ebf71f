//! Collections of the logged in user, other users' collections are reported as missing

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, put},
    Json,
};
use axum_valid::Garde;
use http::StatusCode;
#[cfg_attr(not(feature = "openapi"), allow(unused_imports))]
use libcat_dal::{
    book::BookShort,
    collection::{Collection, CollectionRepository, CreateCollection, UpdateCollection},
};
use libcat_types::claim::ApiClaim;

use crate::{error::ApiResult, repository_from_request, rest_api::user_id, state::AppState};

repository_from_request!(CollectionRepository);

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "", tag = "Collection", operation_id = "listCollections",
    responses((status = StatusCode::OK, description = "Own collections", body = Vec<Collection>))))]
pub async fn list(
    repository: CollectionRepository,
    api_user: ApiClaim,
) -> ApiResult<impl IntoResponse> {
    let collections = repository.list(user_id(&api_user)?).await?;
    Ok((StatusCode::OK, Json(collections)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "", tag = "Collection", operation_id = "createCollection",
    responses((status = StatusCode::CREATED, description = "Created collection", body = Collection))))]
pub async fn create(
    repository: CollectionRepository,
    api_user: ApiClaim,
    Garde(Json(payload)): Garde<Json<CreateCollection>>,
) -> ApiResult<impl IntoResponse> {
    let collection = repository.create(user_id(&api_user)?, payload).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}", tag = "Collection", operation_id = "getCollection",
    responses((status = StatusCode::OK, description = "Collection", body = Collection))))]
pub async fn get_one(
    Path(id): Path<i64>,
    repository: CollectionRepository,
    api_user: ApiClaim,
) -> ApiResult<impl IntoResponse> {
    let collection = repository.get(id, user_id(&api_user)?).await?;
    Ok((StatusCode::OK, Json(collection)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/{id}", tag = "Collection", operation_id = "updateCollection",
    responses((status = StatusCode::OK, description = "Updated collection", body = Collection))))]
pub async fn update(
    Path(id): Path<i64>,
    repository: CollectionRepository,
    api_user: ApiClaim,
    Garde(Json(payload)): Garde<Json<UpdateCollection>>,
) -> ApiResult<impl IntoResponse> {
    let collection = repository.update(id, user_id(&api_user)?, payload).await?;
    Ok((StatusCode::OK, Json(collection)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(delete, path = "/{id}", tag = "Collection", operation_id = "deleteCollection"))]
pub async fn delete(
    Path(id): Path<i64>,
    repository: CollectionRepository,
    api_user: ApiClaim,
) -> ApiResult<impl IntoResponse> {
    repository.delete(id, user_id(&api_user)?).await?;
    Ok((StatusCode::NO_CONTENT, ()))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}/books", tag = "Collection", operation_id = "listCollectionBooks",
    responses((status = StatusCode::OK, description = "Books in collection", body = Vec<BookShort>))))]
pub async fn books(
    Path(id): Path<i64>,
    repository: CollectionRepository,
    api_user: ApiClaim,
) -> ApiResult<impl IntoResponse> {
    let books = repository.books(id, user_id(&api_user)?).await?;
    Ok((StatusCode::OK, Json(books)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/{id}/books/{book_id}", tag = "Collection", operation_id = "addCollectionBook",
    responses((status = StatusCode::CREATED, description = "Book added"), (status = StatusCode::OK, description = "Book already in collection"))))]
pub async fn add_book(
    Path((id, book_id)): Path<(i64, i64)>,
    repository: CollectionRepository,
    api_user: ApiClaim,
) -> ApiResult<impl IntoResponse> {
    let added = repository.add_book(id, user_id(&api_user)?, book_id).await?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, ()))
}

#[cfg_attr(feature = "openapi",  utoipa::path(delete, path = "/{id}/books/{book_id}", tag = "Collection", operation_id = "removeCollectionBook"))]
pub async fn remove_book(
    Path((id, book_id)): Path<(i64, i64)>,
    repository: CollectionRepository,
    api_user: ApiClaim,
) -> ApiResult<impl IntoResponse> {
    repository
        .remove_book(id, user_id(&api_user)?, book_id)
        .await?;
    Ok((StatusCode::NO_CONTENT, ()))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
        .route("/{id}/books", get(books))
        .route("/{id}/books/{book_id}", put(add_book).delete(remove_book))
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(list, create, get_one, update, delete, books, add_book, remove_book))]
    struct ApiDocs;
    ApiDocs::openapi()
}
