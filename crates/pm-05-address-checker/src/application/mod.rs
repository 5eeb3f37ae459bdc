//! # Application Layer

pub mod checker;

pub use checker::{AddressChecker, CheckerContext};
