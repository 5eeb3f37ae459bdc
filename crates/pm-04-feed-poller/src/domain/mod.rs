//! # Domain Module

pub mod cursor;
pub mod errors;

pub use cursor::*;
pub use errors::*;
