//! Users Data

use crate::domain::users::records::{Role, UserUuid};

/// New User Data
///
/// Only the SHA-256 hash of the user's API token is ever stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub uuid: UserUuid,
    pub email: String,
    pub role: Role,
    pub token_hash: String,
}
