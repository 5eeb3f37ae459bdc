//! # Algorithms

pub mod decrypt;
pub mod mail_parser;

pub use decrypt::{decrypt_content, seal_message};
pub use mail_parser::parse_message;
