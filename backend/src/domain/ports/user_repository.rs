//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{ExternalIdentity, Identity, User};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a profile for `identity` unless one exists, then return the
    /// stored profile.
    ///
    /// Adapters must rely on the unique identity column so concurrent first
    /// requests converge on one row. Existing profiles are returned as stored.
    async fn insert_or_fetch(&self, identity: &Identity) -> Result<User, UserRepositoryError>;

    /// Fetch a user by external identity.
    async fn find_by_identity(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<Option<User>, UserRepositoryError>;
}
