//! # Adapters

pub mod http_store;

pub use http_store::HttpContentStore;
