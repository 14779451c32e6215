//! Identity module — credential workflow
//!
//! Contains the `CredentialService` which orchestrates registration,
//! login and logout against the user directory.

pub mod service;

pub use service::{
    CredentialService, LoginOutcome, LOGIN_FIELDS_REQUIRED, REGISTER_FIELDS_REQUIRED,
};
