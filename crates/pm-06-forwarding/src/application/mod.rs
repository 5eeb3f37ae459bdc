//! # Application Layer

pub mod factory;

pub use factory::{forwarder_from_json, test_request, TEST_SENDER};
