pub mod author;
pub mod book;
pub mod collection;
pub mod comment;
pub mod genre;
pub mod macros;
pub mod paging;
pub mod profile;
pub mod search;
pub mod stats;
pub mod transfer;

use libcat_types::claim::ApiClaim;
pub use paging::{Page, Paging};

use crate::error::{ApiError, ApiResult};

/// Id of the user the token was issued for
pub(crate) fn user_id(claim: &ApiClaim) -> ApiResult<i64> {
    claim.user_id().ok_or_else(|| {
        tracing::warn!("Token subject {} is not a user id", claim.sub);
        ApiError::Unauthorized
    })
}
