//! # Link Parsing
//!
//! Links look like `https://host/path?check=<hex>&hash=<hex>&ts=<nanos>`.

use crate::algorithms::tags::meta_tag;
use crate::domain::LinkError;
use shared_types::{Address, LinkParams, SharedSecret};
use url::Url;

fn query_value(url: &Url, name: &'static str) -> Result<String, LinkError> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .ok_or(LinkError::MissingParameter(name))
}

/// Extract `check`, `hash` and `ts` from a feed link.
pub fn parse_link(link: &str) -> Result<LinkParams, LinkError> {
    let url = Url::parse(link.trim()).map_err(|e| LinkError::MalformedLink(e.to_string()))?;

    let check = query_value(&url, "check")?;
    let hash = query_value(&url, "hash")?;
    let ts = query_value(&url, "ts")?;
    let ts_nanos = ts
        .parse::<i64>()
        .map_err(|_| LinkError::InvalidTimestamp(ts.clone()))?;

    Ok(LinkParams {
        check,
        hash,
        ts,
        ts_nanos,
    })
}

/// Build a link the way the publisher does, with a correct stage-1 tag.
///
/// Used by tooling and tests that stand in for the publishing side.
pub fn compose_link(
    base: &str,
    secret: &SharedSecret,
    address: &Address,
    hash: &str,
    ts_nanos: i64,
) -> Result<String, LinkError> {
    let ts = ts_nanos.to_string();
    let mut url = Url::parse(base).map_err(|e| LinkError::MalformedLink(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("check", &meta_tag(secret, address, hash, &ts))
        .append_pair("hash", hash)
        .append_pair("ts", &ts);
    Ok(url.into())
}
