use async_trait::async_trait;

use super::{NewUser, UserRecord};
use crate::domain::DirectoryError;

/// Port to the external service that owns persistent user records.
///
/// Implementations decide on transport, timeouts and retries; the credential
/// workflow makes exactly one call per step and never retries.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<(), DirectoryError>;

    /// `Ok(None)` when no user is registered under `email`.
    async fn fetch_by_email(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError>;
}
