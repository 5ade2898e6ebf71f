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
    profile::{Profile, ProfileRepository, UpdateProfile},
};
use libcat_types::claim::ApiClaim;

use crate::{error::ApiResult, repository_from_request, rest_api::user_id, state::AppState};

repository_from_request!(ProfileRepository);

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "", tag = "Profile", operation_id = "getProfile",
    responses((status = StatusCode::OK, description = "Own profile", body = Profile))))]
pub async fn get_own(
    repository: ProfileRepository,
    api_user: ApiClaim,
) -> ApiResult<impl IntoResponse> {
    let profile = repository.get_for_user(user_id(&api_user)?).await?;
    Ok((StatusCode::OK, Json(profile)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(put, path = "", tag = "Profile", operation_id = "updateProfile",
    responses((status = StatusCode::OK, description = "Updated profile", body = Profile))))]
pub async fn update(
    repository: ProfileRepository,
    api_user: ApiClaim,
    Garde(Json(payload)): Garde<Json<UpdateProfile>>,
) -> ApiResult<impl IntoResponse> {
    let profile = repository.update(user_id(&api_user)?, payload).await?;
    Ok((StatusCode::OK, Json(profile)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/liked", tag = "Profile", operation_id = "listLikedBooks",
    responses((status = StatusCode::OK, description = "Liked books", body = Vec<BookShort>))))]
pub async fn liked_books(
    repository: ProfileRepository,
    api_user: ApiClaim,
) -> ApiResult<impl IntoResponse> {
    let books = repository.liked_books(user_id(&api_user)?).await?;
    Ok((StatusCode::OK, Json(books)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/liked/{book_id}", tag = "Profile", operation_id = "likeBook",
    responses((status = StatusCode::CREATED, description = "Book liked"), (status = StatusCode::OK, description = "Book was liked already"))))]
pub async fn like(
    Path(book_id): Path<i64>,
    repository: ProfileRepository,
    api_user: ApiClaim,
) -> ApiResult<impl IntoResponse> {
    let status = if repository.like(user_id(&api_user)?, book_id).await? {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, ()))
}

#[cfg_attr(feature = "openapi",  utoipa::path(delete, path = "/liked/{book_id}", tag = "Profile", operation_id = "unlikeBook"))]
pub async fn unlike(
    Path(book_id): Path<i64>,
    repository: ProfileRepository,
    api_user: ApiClaim,
) -> ApiResult<impl IntoResponse> {
    repository.unlike(user_id(&api_user)?, book_id).await?;
    Ok((StatusCode::NO_CONTENT, ()))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(get_own).put(update))
        .route("/liked", get(liked_books))
        .route("/liked/{book_id}", put(like).delete(unlike))
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(get_own, update, liked_books, like, unlike))]
    struct ApiDocs;
    ApiDocs::openapi()
}
