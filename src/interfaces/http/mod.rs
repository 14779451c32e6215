//! HTTP REST API interfaces
//!
//! - `common`: response shapes, error mapping, JSON extractor
//! - `modules`: handlers per resource (auth, health, metrics) and middleware
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::create_api_router;
