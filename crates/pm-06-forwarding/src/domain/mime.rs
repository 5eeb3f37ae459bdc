//! # MIME Helpers
//!
//! Just enough MIME to pull the text and HTML alternatives out of a
//! `multipart/alternative` body.

use std::collections::BTreeMap;

/// Split a `Content-Type` value into its lowercased media type and its
/// parameters (names lowercased, quotes removed).
pub fn parse_media_type(value: &str) -> (String, BTreeMap<String, String>) {
    let mut parts = value.split(';');
    let media_type = parts.next().unwrap_or_default().trim().to_ascii_lowercase();

    let params = parts
        .filter_map(|param| {
            let (name, value) = param.split_once('=')?;
            let value = value.trim().trim_matches('"');
            Some((name.trim().to_ascii_lowercase(), value.to_string()))
        })
        .collect();

    (media_type, params)
}

fn split_part(part: &str) -> (&str, &str) {
    let part = part.trim_start_matches(['\r', '\n']);
    if let Some(idx) = part.find("\r\n\r\n") {
        (&part[..idx], &part[idx + 4..])
    } else if let Some(idx) = part.find("\n\n") {
        (&part[..idx], &part[idx + 2..])
    } else {
        ("", part)
    }
}

fn part_content_type(headers: &str) -> String {
    headers
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| parse_media_type(value).0)
        .unwrap_or_else(|| "text/plain".to_string())
}

/// Text and HTML parts of a `multipart/alternative` body.
///
/// Returns `(None, None)` for any other content type or when the boundary
/// parameter is missing.
pub fn extract_alternative(content_type: &str, body: &str) -> (Option<String>, Option<String>) {
    let (media_type, params) = parse_media_type(content_type);
    if media_type != "multipart/alternative" {
        return (None, None);
    }
    let Some(boundary) = params.get("boundary") else {
        return (None, None);
    };

    let delimiter = format!("--{boundary}");
    let mut text = None;
    let mut html = None;

    for part in body.split(delimiter.as_str()).skip(1) {
        if part.starts_with("--") {
            break;
        }
        let (headers, content) = split_part(part);
        let content = content
            .strip_suffix("\r\n")
            .or_else(|| content.strip_suffix('\n'))
            .unwrap_or(content);

        match part_content_type(headers).as_str() {
            "text/plain" => text = Some(content.to_string()),
            "text/html" => html = Some(content.to_string()),
            _ => {}
        }
    }

    (text, html)
}
