pub mod identity;

pub use identity::{CredentialService, LoginOutcome};
