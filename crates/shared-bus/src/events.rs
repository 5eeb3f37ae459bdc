//! # Checker Events
//!
//! Everything the feed poller and the address checkers report while running.

use serde::{Deserialize, Serialize};
use shared_types::entities::Address;

/// Why the poller went back to page one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedResetReason {
    /// The feed request failed.
    FetchFailed,
    /// The feed returned a page with no items.
    EmptyPage,
    /// The genesis sentinel was reached.
    Genesis,
}

/// Why a checker dropped a link without forwarding anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkSkipReason {
    /// The link could not be parsed.
    MalformedLink,
    /// The link matched but is not newer than the cutoff.
    Stale,
    /// Fetching or decrypting the content failed.
    ContentFailed,
}

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckerEvent {
    // =========================================================================
    // SUBSYSTEM 4: FEED POLLER
    // =========================================================================
    /// A feed page was fetched and fanned out.
    FeedPageFetched {
        /// Page cursor used for the request.
        page: u32,
        /// Number of items on the page.
        items: usize,
    },

    /// The page cursor went back to 1.
    FeedReset {
        /// What triggered the reset.
        reason: FeedResetReason,
    },

    // =========================================================================
    // SUBSYSTEM 5: ADDRESS CHECKER
    // =========================================================================
    /// A link was run through the verifier.
    LinkChecked {
        /// Address the checker serves.
        address: Address,
        /// Whether the stage-1 tag matched.
        matched: bool,
    },

    /// A link was dropped.
    LinkSkipped {
        /// Address the checker serves.
        address: Address,
        /// Why it was dropped.
        reason: LinkSkipReason,
    },

    /// A checker task exited.
    CheckerStopped {
        /// Address the checker served.
        address: Address,
    },

    // =========================================================================
    // SUBSYSTEM 6: FORWARDING
    // =========================================================================
    /// A decrypted message was handed to a forwarder successfully.
    MessageForwarded {
        /// Recipient address.
        address: Address,
        /// Forwarder kind (`smtp`, `http-api`, ...).
        forwarder: String,
    },

    /// The forwarder rejected or failed a message.
    ForwardFailed {
        /// Recipient address.
        address: Address,
        /// Forwarder kind.
        forwarder: String,
        /// Error text.
        error: String,
    },
}

impl CheckerEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::FeedPageFetched { .. } | Self::FeedReset { .. } => EventTopic::Feed,
            Self::LinkChecked { .. } | Self::LinkSkipped { .. } | Self::CheckerStopped { .. } => {
                EventTopic::Checker
            }
            Self::MessageForwarded { .. } | Self::ForwardFailed { .. } => EventTopic::Forwarding,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self.topic() {
            EventTopic::Feed => 4,
            EventTopic::Checker => 5,
            EventTopic::Forwarding | EventTopic::All => 6,
        }
    }

    /// The address this event concerns, if any.
    #[must_use]
    pub fn address(&self) -> Option<&Address> {
        match self {
            Self::LinkChecked { address, .. }
            | Self::LinkSkipped { address, .. }
            | Self::CheckerStopped { address }
            | Self::MessageForwarded { address, .. }
            | Self::ForwardFailed { address, .. } => Some(address),
            Self::FeedPageFetched { .. } | Self::FeedReset { .. } => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Subsystem 4 events.
    Feed,
    /// Subsystem 5 events.
    Checker,
    /// Subsystem 6 events.
    Forwarding,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Only events about this address. `None` means any.
    pub address: Option<Address>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            address: None,
        }
    }

    /// Create a filter for events concerning one address.
    #[must_use]
    pub fn for_address(address: Address) -> Self {
        Self {
            topics: Vec::new(),
            address: Some(address),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &CheckerEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let address_match = match &self.address {
            None => true,
            Some(wanted) => event.address() == Some(wanted),
        };

        topic_match && address_match
    }
}
