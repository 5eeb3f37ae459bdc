//! # Domain Entities

use serde::{Deserialize, Serialize};
use shared_types::LinkParams;

/// Result of running the verifier over one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// Whether the stage-1 tag matched.
    pub matched: bool,
    /// Stage-2 digest; present only when `matched`.
    pub content_locator: Option<String>,
}

impl VerificationOutcome {
    /// Stage 1 failed.
    pub fn no_match() -> Self {
        Self {
            matched: false,
            content_locator: None,
        }
    }

    /// Stage 1 matched and stage 2 produced `locator`.
    pub fn matched(locator: String) -> Self {
        Self {
            matched: true,
            content_locator: Some(locator),
        }
    }
}

/// A parsed link together with its verification outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkVerdict {
    /// The link's query parameters.
    pub params: LinkParams,
    /// What the verifier decided.
    pub outcome: VerificationOutcome,
}
