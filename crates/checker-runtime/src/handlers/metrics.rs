//! # Metrics Handler
//!
//! Turns bus events into Prometheus counter increments. Checkers and the
//! poller never touch the metrics registry directly.

use pm_telemetry::{
    metric_inc, CONTENT_FAILURES, FEED_PAGES, FEED_RESETS, FORWARD_FAILURES, LINKS_CHECKED,
    LINKS_MATCHED, MESSAGES_FORWARDED,
};
use shared_bus::{CheckerEvent, FeedResetReason, LinkSkipReason, Subscription};
use tracing::{debug, info};

/// Handler recording every event into the global counters.
pub struct MetricsHandler {
    subscription: Subscription,
}

impl MetricsHandler {
    /// Create a handler over a bus subscription.
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// Run until the bus closes.
    pub async fn run(mut self) {
        info!("[pm-telemetry] Metrics handler started");

        while let Some(event) = self.subscription.recv().await {
            record(&event);
        }

        debug!("[pm-telemetry] Event bus closed, metrics handler exiting");
    }
}

fn reset_label(reason: FeedResetReason) -> &'static str {
    match reason {
        FeedResetReason::FetchFailed => "fetch_failed",
        FeedResetReason::EmptyPage => "empty_page",
        FeedResetReason::Genesis => "genesis",
    }
}

/// Apply one event to the counters.
pub fn record(event: &CheckerEvent) {
    match event {
        CheckerEvent::FeedPageFetched { .. } => metric_inc!(FEED_PAGES),
        CheckerEvent::FeedReset { reason } => metric_inc!(FEED_RESETS, &[reset_label(*reason)]),
        CheckerEvent::LinkChecked { matched, .. } => {
            metric_inc!(LINKS_CHECKED);
            if *matched {
                metric_inc!(LINKS_MATCHED);
            }
        }
        CheckerEvent::LinkSkipped {
            reason: LinkSkipReason::ContentFailed,
            ..
        } => metric_inc!(CONTENT_FAILURES),
        CheckerEvent::LinkSkipped { .. } | CheckerEvent::CheckerStopped { .. } => {}
        CheckerEvent::MessageForwarded { .. } => metric_inc!(MESSAGES_FORWARDED),
        CheckerEvent::ForwardFailed { .. } => metric_inc!(FORWARD_FAILURES),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm_telemetry::RESET_REASONS;
    use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus};
    use shared_types::Address;
    use std::sync::Arc;

    #[test]
    fn test_record_matched_link_counts_twice() {
        let checked = LINKS_CHECKED.get();
        let matched = LINKS_MATCHED.get();

        record(&CheckerEvent::LinkChecked {
            address: Address::new("mAddr"),
            matched: true,
        });

        assert!(LINKS_CHECKED.get() >= checked + 1.0);
        assert!(LINKS_MATCHED.get() >= matched + 1.0);
    }

    #[test]
    fn test_record_content_failure() {
        let before = CONTENT_FAILURES.get();
        record(&CheckerEvent::LinkSkipped {
            address: Address::new("mAddr"),
            reason: LinkSkipReason::ContentFailed,
        });
        assert!(CONTENT_FAILURES.get() >= before + 1.0);
    }

    #[tokio::test]
    async fn test_handler_exits_when_bus_drops() {
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = MetricsHandler::new(bus.subscribe(EventFilter::all()));
        let genesis = FEED_RESETS.with_label_values(&["genesis"]);
        let resets = genesis.get();

        bus.publish(CheckerEvent::FeedReset {
            reason: FeedResetReason::Genesis,
        })
        .await;
        drop(bus);

        handler.run().await;
        assert!(genesis.get() >= resets + 1.0);
    }

    #[test]
    fn test_reset_labels_are_registered_names() {
        for reason in [
            FeedResetReason::FetchFailed,
            FeedResetReason::EmptyPage,
            FeedResetReason::Genesis,
        ] {
            assert!(RESET_REASONS.contains(&reset_label(reason)));
        }
    }
}
