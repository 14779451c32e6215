//! # Authentication Service
//!
//! Credential issuance microservice: registers users with an external user
//! directory and issues signed JWT access tokens on login.
//!
//! ## Architecture
//!
//! - **domain**: user records, request inputs, errors, the user directory port
//! - **application**: the credential workflow (register / login / logout)
//! - **infrastructure**: bcrypt hashing, JWT signing, user directory adapters
//! - **interfaces**: REST API with Swagger documentation and Prometheus metrics
//! - **config**: TOML + environment configuration and startup validation
//! - **server**: process lifecycle and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod support;

pub use config::{default_config_path, AppConfig, RuntimeSettings};

pub use application::identity::CredentialService;

pub use interfaces::http::create_api_router;
