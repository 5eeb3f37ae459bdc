//! # Runtime Flows
//!
//! The end-to-end scenarios run through `CheckerRuntime`: subscribe a
//! credential, feed it links, observe forwarding, counters and resets.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use checker_runtime::{CheckerConfig, CheckerRuntime, ContentMessageFetcher, ServiceContainer};
    use pm_03_content_decrypt::{ContentService, MockContentStore};
    use pm_04_feed_poller::{FeedError, MockFeedSource};
    use pm_05_address_checker::RecordingForwarder;
    use shared_bus::{CheckerEvent, EventFilter, EventTopic, FeedResetReason};
    use shared_types::CurrencyTag;

    use crate::fixtures::{key_service, Subscriber};

    struct Harness {
        runtime: CheckerRuntime,
        feed: Arc<MockFeedSource>,
        store: Arc<MockContentStore>,
        recorder: Arc<RecordingForwarder>,
    }

    fn harness(config: CheckerConfig) -> Harness {
        let feed = Arc::new(MockFeedSource::new());
        let store = Arc::new(MockContentStore::new());
        let messages = Arc::new(ContentMessageFetcher::new(Arc::new(ContentService::new(
            store.clone(),
        ))));
        let container =
            ServiceContainer::with_services(config, key_service(), messages, feed.clone());

        let recorder = Arc::new(RecordingForwarder::new());
        container.forwarders.insert("inbox", recorder.clone());

        Harness {
            runtime: CheckerRuntime::with_container(container),
            feed,
            store,
            recorder,
        }
    }

    /// A correctly tagged link is forwarded exactly once and the unread
    /// counter becomes 1.
    #[tokio::test(start_paused = true)]
    async fn test_matching_link_forwarded_once() {
        let mut config = CheckerConfig::default();
        config.checker.after = Some("2024-01-01".into());
        let h = harness(config);
        let alice = Subscriber::new(21).await;
        assert_eq!(alice.credential.currency(), CurrencyTag::Btc);

        let address = h.runtime.subscribe(&alice.wif, None).await.unwrap();
        assert_eq!(&address, alice.credential.address());
        assert_eq!(h.runtime.forwarder_of(&address).as_deref(), Some("inbox"));

        let sent_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        alice.publish(&h.store, "feedbeef", sent_at, "Quarterly report", "numbers inside");
        h.feed.push_page(vec![alice.entry("item-1", "feedbeef", sent_at)]);

        h.runtime.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;

        let sent = h.recorder.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "alice@example.com");
        assert_eq!(sent[0].subject, "Quarterly report");
        assert_eq!(sent[0].body, "numbers inside");
        assert!(!sent[0].is_test);
        assert_eq!(h.runtime.unread(&address), 1);

        let reports = h.runtime.shutdown().await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].delivered, 1);
    }

    /// A link tagged for somebody else causes no fetch and no forward.
    #[tokio::test(start_paused = true)]
    async fn test_foreign_link_ignored() {
        let h = harness(CheckerConfig::default());
        let alice = Subscriber::new(21).await;
        let stranger = Subscriber::new(22).await;
        let address = h.runtime.subscribe(&alice.wif, None).await.unwrap();
        let mut checks = h
            .runtime
            .container()
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Checker]));

        let sent_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        stranger.publish(&h.store, "feedbeef", sent_at, "not yours", "nope");
        h.feed
            .push_page(vec![stranger.entry("item-1", "feedbeef", sent_at)]);

        h.runtime.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(h.store.fetches().is_empty());
        assert!(h.recorder.requests().is_empty());
        assert_eq!(h.runtime.unread(&address), 0);
        assert!(checks.drain().contains(&CheckerEvent::LinkChecked {
            address: address.clone(),
            matched: false,
        }));

        h.runtime.shutdown().await;
    }

    /// A feed transport error resets the cursor and the poller retries
    /// after the long interval, then delivers normally.
    #[tokio::test(start_paused = true)]
    async fn test_feed_error_resets_and_retries() {
        let h = harness(CheckerConfig::default());
        let alice = Subscriber::new(21).await;
        let address = h.runtime.subscribe(&alice.wif, None).await.unwrap();
        let mut feed_events = h
            .runtime
            .container()
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Feed]));

        let sent_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        alice.publish(&h.store, "feedbeef", sent_at, "late", "made it");
        h.feed
            .push_error(FeedError::FeedFetch("connection refused".into()));
        h.feed.push_page(vec![alice.entry("item-1", "feedbeef", sent_at)]);

        h.runtime.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(h.feed.requests(), vec![(1, 250)]);
        assert!(h.recorder.requests().is_empty());
        assert!(feed_events.drain().contains(&CheckerEvent::FeedReset {
            reason: FeedResetReason::FetchFailed
        }));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(h.feed.requests(), vec![(1, 250), (1, 250)]);
        assert_eq!(h.recorder.requests().len(), 1);
        assert_eq!(h.runtime.unread(&address), 1);

        h.runtime.shutdown().await;
    }

    /// Removing the forwarder stops the subscriptions that used it.
    #[tokio::test(start_paused = true)]
    async fn test_removing_forwarder_stops_checker() {
        let h = harness(CheckerConfig::default());
        let alice = Subscriber::new(21).await;
        let address = h.runtime.subscribe(&alice.wif, Some("inbox")).await.unwrap();
        h.runtime.start().await.unwrap();

        let removed = h.runtime.remove_forwarder("inbox").unwrap();
        assert_eq!(removed, vec![address.clone()]);
        assert!(h.runtime.status_lines().is_empty());

        tokio::time::sleep(Duration::from_secs(1)).await;
        let reports = h.runtime.shutdown().await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].address, address);
    }
}
