//! Comments nested under book, `/api/book/{id}/comments`

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{delete, get},
    Json,
};
use axum_valid::Garde;
use http::StatusCode;
#[cfg_attr(not(feature = "openapi"), allow(unused_imports))]
use libcat_dal::comment::{Comment, CommentRepository, CreateComment};
use libcat_types::claim::ApiClaim;

use crate::{
    error::{ApiError, ApiResult},
    repository_from_request,
    rest_api::user_id,
    state::AppState,
};

repository_from_request!(CommentRepository);

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}/comments", tag = "Book", operation_id = "listBookComments",
    responses((status = StatusCode::OK, description = "Comments of the book, newest first", body = Vec<Comment>))))]
pub async fn list(
    Path(book_id): Path<i64>,
    repository: CommentRepository,
) -> ApiResult<impl IntoResponse> {
    let comments = repository.list_for_book(book_id).await?;
    Ok((StatusCode::OK, Json(comments)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "/{id}/comments", tag = "Book", operation_id = "addBookComment",
    responses((status = StatusCode::CREATED, description = "Added comment", body = Comment))))]
pub async fn add(
    Path(book_id): Path<i64>,
    repository: CommentRepository,
    api_user: ApiClaim,
    Garde(Json(payload)): Garde<Json<CreateComment>>,
) -> ApiResult<impl IntoResponse> {
    let comment = repository
        .create(book_id, user_id(&api_user)?, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(delete, path = "/{id}/comments/{comment_id}", tag = "Book", operation_id = "deleteBookComment",
    description = "Users can delete own comments, admin any comment"))]
pub async fn remove(
    Path((book_id, comment_id)): Path<(i64, i64)>,
    repository: CommentRepository,
    api_user: ApiClaim,
) -> ApiResult<impl IntoResponse> {
    let comment = repository.get(comment_id).await?;
    if comment.book_id != book_id {
        return Err(ApiError::ResourceNotFound(format!(
            "Comment {comment_id} of book {book_id}"
        )));
    }
    repository
        .delete(comment_id, user_id(&api_user)?, api_user.is_admin())
        .await?;
    Ok((StatusCode::NO_CONTENT, ()))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/{id}/comments", get(list).post(add))
        .route("/{id}/comments/{comment_id}", delete(remove))
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(list, add, remove))]
    struct ApiDocs;
    ApiDocs::openapi()
}
