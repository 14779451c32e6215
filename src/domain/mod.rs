//! Domain layer: user records, request inputs, errors and the user directory port.

pub mod error;
pub mod user;

pub use error::{DirectoryError, DomainError, DomainResult};
pub use user::{
    Credentials, NewUser, RegistrationRequest, UserDirectory, UserRecord, UserSummary,
    DEFAULT_ROLE,
};
