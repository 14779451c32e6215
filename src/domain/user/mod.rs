//! User aggregate
//!
//! Records as served by the user directory, request inputs, and the
//! directory port itself.

pub mod directory;
pub mod model;
pub mod requests;

pub use directory::UserDirectory;
pub use model::{NewUser, UserRecord, UserSummary, DEFAULT_ROLE};
pub use requests::{Credentials, RegistrationRequest};
