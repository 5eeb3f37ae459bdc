//! # Algorithms
//!
//! Link parsing and the keyed-hash stages.

pub mod link_parser;
pub mod tags;

pub use link_parser::{compose_link, parse_link};
pub use tags::{content_tag, meta_tag, verify};
