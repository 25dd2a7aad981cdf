//! Upload credential policy.
//!
//! The exact pairing of user id and token is the service's only
//! access-control mechanism: it authenticates the caller and scopes the
//! upload to that user in one check.  Keeping the comparison here, rather
//! than inline in handlers, makes the policy testable on its own.

use sonica_store::{Database, User};

use crate::error::ApiError;

/// Check an id + token pair against the user table.
///
/// Returns the matching [`User`] or [`ApiError::InvalidCredentials`].  A
/// wrong token and an unknown id are deliberately indistinguishable.
pub fn authorize_upload(db: &Database, user_id: i64, token: &str) -> Result<User, ApiError> {
    match db.find_user_by_credentials(user_id, token)? {
        Some(user) => Ok(user),
        None => Err(ApiError::InvalidCredentials),
    }
}
