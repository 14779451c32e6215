//! Infrastructure layer - external concerns

pub mod crypto;
pub mod directory;

pub use directory::{HttpUserDirectory, InMemoryUserDirectory};
