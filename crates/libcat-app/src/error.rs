use axum::{extract::multipart::MultipartError, response::IntoResponse, Json};
use http::StatusCode;
use serde_json::json;
use tracing::{debug, error};

pub type Error = anyhow::Error;
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unprocessable request: {0}")]
    UnprocessableRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    DatabaseError(libcat_dal::Error),

    #[error("Transfer error: {0}")]
    TransferError(libcat_transfer::Error),

    #[error("Multipart error: {0}")]
    MultipartError(#[from] MultipartError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<libcat_dal::Error> for ApiError {
    fn from(e: libcat_dal::Error) -> Self {
        use libcat_dal::Error;
        match e {
            Error::RecordNotFound(what) => ApiError::ResourceNotFound(what),
            Error::DuplicateKey(_) | Error::FailedUpdate { .. } => {
                ApiError::Conflict(e.to_string())
            }
            Error::InvalidReference(_) => ApiError::UnprocessableRequest(e.to_string()),
            Error::MissingVersion | Error::InvalidOrderByField(_) => {
                ApiError::InvalidRequest(e.to_string())
            }
            Error::InvalidCredentials => ApiError::Unauthorized,
            e => ApiError::DatabaseError(e),
        }
    }
}

impl From<libcat_transfer::Error> for ApiError {
    fn from(e: libcat_transfer::Error) -> Self {
        match e {
            libcat_transfer::Error::MalformedInputFile(_) => {
                ApiError::UnprocessableRequest(e.to_string())
            }
            e => ApiError::TransferError(e),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::InternalError(e.to_string())
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidQuery(_) | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MultipartError(e) => e.status(),
            ApiError::UnprocessableRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::DatabaseError(_) | ApiError::TransferError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("Request failed: {self}");
            "Internal server error".to_string()
        } else {
            debug!("Request rejected ({status}): {self}");
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_status() {
        let status = |e: libcat_dal::Error| ApiError::from(e).status_code();
        assert_eq!(
            status(libcat_dal::Error::not_found("Book", 1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(libcat_dal::Error::DuplicateKey("Book".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(libcat_dal::Error::FailedUpdate { id: 1, version: 2 }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(libcat_dal::Error::InvalidReference("Book".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(libcat_dal::Error::InvalidOrderByField("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(libcat_dal::Error::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(libcat_dal::Error::DatabaseError(sqlx_error())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    fn sqlx_error() -> libcat_dal::SqlxError {
        libcat_dal::SqlxError::RowNotFound
    }
}
