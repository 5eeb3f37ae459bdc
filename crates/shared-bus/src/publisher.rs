//! # Event Publisher
//!
//! The sending half of the bus. The poller and every checker hold an
//! `Arc<dyn EventPublisher>`; the runtime owns the concrete bus.

use crate::events::{CheckerEvent, EventFilter, EventTopic};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Anything the pipeline can report its observations to.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Hand an event to every current listener and return how many there were.
    async fn publish(&self, event: CheckerEvent) -> usize;

    /// Events accepted since the bus was built, delivered or not.
    fn events_published(&self) -> u64;
}

/// Published-event tallies, one per concrete topic.
#[derive(Debug, Default)]
struct TopicTally {
    feed: AtomicU64,
    checker: AtomicU64,
    forwarding: AtomicU64,
    unheard: AtomicU64,
}

impl TopicTally {
    fn slot(&self, topic: EventTopic) -> &AtomicU64 {
        match topic {
            EventTopic::Feed => &self.feed,
            EventTopic::Checker => &self.checker,
            EventTopic::Forwarding | EventTopic::All => &self.forwarding,
        }
    }

    fn total(&self) -> u64 {
        self.feed.load(Ordering::Relaxed)
            + self.checker.load(Ordering::Relaxed)
            + self.forwarding.load(Ordering::Relaxed)
    }
}

/// Broadcast-backed bus shared by the poller, the checkers and the runtime.
///
/// A slow listener lags and loses the oldest events instead of slowing
/// down the pipeline.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<CheckerEvent>,
    tally: TopicTally,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Bus buffering [`DEFAULT_CHANNEL_CAPACITY`] events per listener.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` events per listener (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            tally: TopicTally::default(),
            capacity,
        }
    }

    /// Start listening. Only events published after this call are seen.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, address = ?filter.address, "[bus] listener attached");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Listeners currently attached.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Per-listener buffer size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events published under `topic`. `EventTopic::All` gives the grand total.
    #[must_use]
    pub fn published_on(&self, topic: EventTopic) -> u64 {
        match topic {
            EventTopic::All => self.tally.total(),
            other => self.tally.slot(other).load(Ordering::Relaxed),
        }
    }

    /// Events published while nobody was listening.
    #[must_use]
    pub fn unheard(&self) -> u64 {
        self.tally.unheard.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: CheckerEvent) -> usize {
        let topic = event.topic();
        let source = event.source_subsystem();
        self.tally.slot(topic).fetch_add(1, Ordering::Relaxed);

        // SendError only means there are no receivers right now.
        let heard = self.sender.send(event).unwrap_or(0);
        if heard == 0 {
            self.tally.unheard.fetch_add(1, Ordering::Relaxed);
        }
        trace!(?topic, source, listeners = heard, "[bus] event published");
        heard
    }

    fn events_published(&self) -> u64 {
        self.tally.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::FeedResetReason;
    use shared_types::Address;

    fn reset() -> CheckerEvent {
        CheckerEvent::FeedReset {
            reason: FeedResetReason::FetchFailed,
        }
    }

    #[tokio::test]
    async fn test_unheard_events_are_counted() {
        let bus = InMemoryEventBus::new();
        assert_eq!(bus.publish(reset()).await, 0);
        assert_eq!(bus.events_published(), 1);
        assert_eq!(bus.unheard(), 1);
    }

    #[tokio::test]
    async fn test_every_listener_receives_regardless_of_filter() {
        let bus = InMemoryEventBus::new();
        let _everything = bus.subscribe(EventFilter::all());
        let _checks_only = bus.subscribe(EventFilter::topics(vec![EventTopic::Checker]));

        // Filtering is done by the receiver.
        assert_eq!(bus.publish(reset()).await, 2);
        assert_eq!(bus.unheard(), 0);
    }

    #[tokio::test]
    async fn test_published_on_splits_by_topic() {
        let bus = InMemoryEventBus::new();
        bus.publish(reset()).await;
        bus.publish(CheckerEvent::FeedPageFetched { page: 1, items: 3 })
            .await;
        bus.publish(CheckerEvent::LinkChecked {
            address: Address::from("mA"),
            matched: true,
        })
        .await;

        assert_eq!(bus.published_on(EventTopic::Feed), 2);
        assert_eq!(bus.published_on(EventTopic::Checker), 1);
        assert_eq!(bus.published_on(EventTopic::Forwarding), 0);
        assert_eq!(bus.published_on(EventTopic::All), 3);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(InMemoryEventBus::with_capacity(0).capacity(), 1);
        let bus = InMemoryEventBus::default();
        assert_eq!(bus.capacity(), DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
