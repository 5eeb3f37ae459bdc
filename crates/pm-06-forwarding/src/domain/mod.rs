//! # Domain Module

pub mod mime;
pub mod template;

pub use mime::{extract_alternative, parse_media_type};
pub use template::{render_template, TemplateData};
