//! # Adapters
//!
//! Concrete implementations of the outbound ports.

pub mod http_directory;

pub use http_directory::{parse_directory_response, HttpKeyDirectory};
