//! # Pipeline Tests
//!
//! Poller, queues and checkers wired by hand, with real key derivation,
//! verification and decryption and mocked HTTP collaborators.
//!
//! ## Flow Tested
//!
//! ```text
//! MockFeedSource → FeedPoller → QueueRegistry → AddressChecker
//!                                                 ├─ LinkVerifier
//!                                                 ├─ ContentService(MockContentStore)
//!                                                 └─ RecordingForwarder
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};
    use tokio::sync::watch;
    use tokio::task::JoinHandle;

    use checker_runtime::ContentMessageFetcher;
    use pm_02_link_verification::LinkVerifier;
    use pm_03_content_decrypt::{ContentService, MockContentStore};
    use pm_04_feed_poller::{FeedPoller, MockFeedSource, PollerConfig, QueueRegistry};
    use pm_05_address_checker::{
        AddressChecker, AddressCheckerConfig, CheckerContext, CheckerReport, RecordingForwarder,
        StaticForwarderResolver,
    };
    use shared_bus::{
        CheckerEvent, EventFilter, EventTopic, FeedResetReason, InMemoryEventBus, LivenessBeacon,
    };
    use shared_types::{FeedEntry, UnreadCounters, GENESIS_GUID};

    use crate::fixtures::Subscriber;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    struct Pipeline {
        bus: Arc<InMemoryEventBus>,
        queues: Arc<QueueRegistry>,
        feed: Arc<MockFeedSource>,
        store: Arc<MockContentStore>,
        recorder: Arc<RecordingForwarder>,
        counters: Arc<UnreadCounters>,
        shutdown_tx: watch::Sender<bool>,
        checkers: Vec<JoinHandle<CheckerReport>>,
    }

    impl Pipeline {
        fn new() -> Self {
            let (shutdown_tx, _) = watch::channel(false);
            Self {
                bus: Arc::new(InMemoryEventBus::new()),
                queues: Arc::new(QueueRegistry::new(250)),
                feed: Arc::new(MockFeedSource::new()),
                store: Arc::new(MockContentStore::new()),
                recorder: Arc::new(RecordingForwarder::new()),
                counters: Arc::new(UnreadCounters::new()),
                shutdown_tx,
                checkers: Vec::new(),
            }
        }

        fn subscribe(&mut self, subscriber: &Subscriber, after: Option<DateTime<Utc>>) {
            let address = subscriber.credential.address();
            let queue = self.queues.register(address).expect("fresh address");
            self.counters.register(address);

            let ctx = CheckerContext {
                verifier: Arc::new(LinkVerifier),
                messages: Arc::new(ContentMessageFetcher::new(Arc::new(ContentService::new(
                    self.store.clone(),
                )))),
                forwarders: Arc::new(StaticForwarderResolver::new(self.recorder.clone())),
                counters: self.counters.clone(),
                events: self.bus.clone(),
                liveness: LivenessBeacon::new(),
                config: AddressCheckerConfig {
                    backoff_secs: 10,
                    after,
                },
            };
            let checker = AddressChecker::new(Arc::clone(&subscriber.credential), queue, ctx);
            self.checkers
                .push(tokio::spawn(checker.run(self.shutdown_tx.subscribe())));
        }

        fn start_poller(&self) -> JoinHandle<()> {
            let poller = FeedPoller::new(
                self.feed.clone(),
                self.queues.clone(),
                self.bus.clone(),
                PollerConfig::default(),
            );
            tokio::spawn(poller.run(self.shutdown_tx.subscribe()))
        }

        async fn stop(self, poller: JoinHandle<()>) -> Vec<CheckerReport> {
            self.shutdown_tx.send(true).unwrap();
            poller.await.unwrap();
            let mut reports = Vec::new();
            for checker in self.checkers {
                reports.push(checker.await.unwrap());
            }
            reports
        }
    }

    fn sent_at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    // =========================================================================
    // INTEGRATION TESTS
    // =========================================================================

    /// Links for one address are handled strictly in arrival order.
    #[tokio::test(start_paused = true)]
    async fn test_links_forwarded_in_arrival_order() {
        let mut pipeline = Pipeline::new();
        let alice = Subscriber::new(11).await;
        pipeline.subscribe(&alice, None);

        alice.publish(&pipeline.store, "h1", sent_at(1), "first", "one");
        alice.publish(&pipeline.store, "h2", sent_at(2), "second", "two");
        pipeline.feed.push_page(vec![
            alice.entry("g1", "h1", sent_at(1)),
            alice.entry("g2", "h2", sent_at(2)),
        ]);

        let poller = pipeline.start_poller();
        tokio::time::sleep(Duration::from_secs(15)).await;

        let subjects: Vec<String> = pipeline
            .recorder
            .requests()
            .into_iter()
            .map(|r| r.subject)
            .collect();
        assert_eq!(subjects, vec!["first".to_string(), "second".to_string()]);
        assert_eq!(pipeline.counters.get(alice.credential.address()), 2);

        let reports = pipeline.stop(poller).await;
        assert_eq!(reports[0].delivered, 2);
    }

    /// A link not newer than the cutoff is never fetched nor forwarded.
    #[tokio::test(start_paused = true)]
    async fn test_cutoff_blocks_old_mail() {
        let mut pipeline = Pipeline::new();
        let alice = Subscriber::new(11).await;
        pipeline.subscribe(&alice, Some(sent_at(5)));

        alice.publish(&pipeline.store, "old", sent_at(5), "old", "old");
        alice.publish(&pipeline.store, "new", sent_at(6), "new", "new");
        pipeline.feed.push_page(vec![
            alice.entry("g1", "old", sent_at(5)),
            alice.entry("g2", "new", sent_at(6)),
        ]);

        let poller = pipeline.start_poller();
        tokio::time::sleep(Duration::from_secs(15)).await;

        let sent = pipeline.recorder.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "new");
        assert_eq!(
            pipeline.store.fetches(),
            vec![alice.locator("new", sent_at(6))]
        );

        pipeline.stop(poller).await;
    }

    /// Each subscriber only receives its own mail even though every checker
    /// sees every link.
    #[tokio::test(start_paused = true)]
    async fn test_fan_out_to_every_subscriber() {
        let mut pipeline = Pipeline::new();
        let alice = Subscriber::new(11).await;
        let bob = Subscriber::new(12).await;
        pipeline.subscribe(&alice, None);
        pipeline.subscribe(&bob, None);
        let mut checked = pipeline
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Checker]));

        bob.publish(&pipeline.store, "hb", sent_at(3), "for bob", "hi bob");
        pipeline
            .feed
            .push_page(vec![bob.entry("g1", "hb", sent_at(3))]);

        let poller = pipeline.start_poller();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(pipeline.counters.get(alice.credential.address()), 0);
        assert_eq!(pipeline.counters.get(bob.credential.address()), 1);

        let mut verdicts = Vec::new();
        for event in checked.drain() {
            if let CheckerEvent::LinkChecked { address, matched } = event {
                verdicts.push((address, matched));
            }
        }
        verdicts.sort();
        let mut expected = vec![
            (alice.credential.address().clone(), false),
            (bob.credential.address().clone(), true),
        ];
        expected.sort();
        assert_eq!(verdicts, expected);

        pipeline.stop(poller).await;
    }

    /// The genesis sentinel abandons the page and restarts from page one
    /// after the reset interval plus the page interval.
    #[tokio::test(start_paused = true)]
    async fn test_genesis_resets_cursor() {
        let mut pipeline = Pipeline::new();
        let alice = Subscriber::new(11).await;
        pipeline.subscribe(&alice, None);
        let mut feed_events = pipeline
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Feed]));

        alice.publish(&pipeline.store, "h1", sent_at(1), "before", "x");
        alice.publish(&pipeline.store, "h2", sent_at(2), "after", "y");
        pipeline.feed.push_page(vec![
            alice.entry("g1", "h1", sent_at(1)),
            FeedEntry::new(GENESIS_GUID, ""),
            alice.entry("g2", "h2", sent_at(2)),
        ]);

        let poller = pipeline.start_poller();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(pipeline.feed.requests(), vec![(1, 250)]);

        tokio::time::sleep(Duration::from_secs(40)).await;
        assert_eq!(pipeline.feed.requests(), vec![(1, 250)]);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(pipeline.feed.requests(), vec![(1, 250), (1, 250)]);

        let subjects: Vec<String> = pipeline
            .recorder
            .requests()
            .into_iter()
            .map(|r| r.subject)
            .collect();
        assert_eq!(subjects, vec!["before".to_string()]);
        assert!(feed_events.drain().contains(&CheckerEvent::FeedReset {
            reason: FeedResetReason::Genesis
        }));

        pipeline.stop(poller).await;
    }
}
