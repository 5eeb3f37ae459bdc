//! # Shared Bus - Checker Event Bus
//!
//! Carries what the pipeline observed to whoever is watching: the metrics
//! task in the runtime, tests, and any status display.
//!
//! ```text
//! ┌──────────────┐                     ┌──────────────────┐
//! │ pm-04 Poller │── publish() ──┐     │ metrics listener │
//! └──────────────┘               ▼     └──────────────────┘
//!                         ┌──────────────┐      ↑
//! ┌──────────────┐        │  Event Bus   │──────┘ subscribe()
//! │ pm-05 Checker│──────▶ │  (broadcast) │
//! └──────────────┘        └──────────────┘
//!
//!        every checker ── touch() ──▶ LivenessBeacon (watch, latest value)
//! ```
//!
//! ## Rules
//!
//! - Publishing never blocks and never fails; with no subscribers the event is dropped.
//! - The liveness beacon keeps only the most recent check time.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod liveness;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{CheckerEvent, EventFilter, EventTopic, FeedResetReason, LinkSkipReason};
pub use liveness::LivenessBeacon;
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
