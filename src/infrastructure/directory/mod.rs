//! User directory adapters

pub mod http;
pub mod memory;

pub use http::HttpUserDirectory;
pub use memory::InMemoryUserDirectory;
