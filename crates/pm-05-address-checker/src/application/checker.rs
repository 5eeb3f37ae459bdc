//! # Address Checker
//!
//! The per-address loop. `process_link()` handles one link with no sleeping;
//! `run()` drives it from the queue with the backoff between links.

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::config::AddressCheckerConfig;
use crate::domain::{CheckerReport, CheckerState, FreshnessCutoff, LinkOutcome};
use crate::ports::{ForwarderResolver, MessageFetcher};
use pm_02_link_verification::LinkVerifierApi;
use shared_bus::{CheckerEvent, EventPublisher, LinkSkipReason, LivenessBeacon};
use shared_types::{Address, Credential, ForwardRequest, UnreadCounters};

/// Collaborators shared by every checker in the process.
#[derive(Clone)]
pub struct CheckerContext {
    /// Link verifier.
    pub verifier: Arc<dyn LinkVerifierApi>,
    /// Content retrieval.
    pub messages: Arc<dyn MessageFetcher>,
    /// Forwarder lookup.
    pub forwarders: Arc<dyn ForwarderResolver>,
    /// Unread counters.
    pub counters: Arc<UnreadCounters>,
    /// Event bus.
    pub events: Arc<dyn EventPublisher>,
    /// Last global check time.
    pub liveness: LivenessBeacon,
    /// Checker settings.
    pub config: AddressCheckerConfig,
}

/// One checker per subscribed address.
pub struct AddressChecker {
    credential: Arc<Credential>,
    queue: mpsc::Receiver<String>,
    ctx: CheckerContext,
    cutoff: FreshnessCutoff,
    state: CheckerState,
    links_processed: u64,
    delivered: u64,
}

impl AddressChecker {
    /// Create a checker draining `queue` for `credential`.
    pub fn new(credential: Arc<Credential>, queue: mpsc::Receiver<String>, ctx: CheckerContext) -> Self {
        let cutoff = ctx.config.cutoff();
        Self {
            credential,
            queue,
            ctx,
            cutoff,
            state: CheckerState::Waiting,
            links_processed: 0,
            delivered: 0,
        }
    }

    /// Address served by this checker.
    pub fn address(&self) -> &Address {
        self.credential.address()
    }

    /// Current state.
    pub fn state(&self) -> CheckerState {
        self.state
    }

    async fn skip(&self, reason: LinkSkipReason) {
        self.ctx
            .events
            .publish(CheckerEvent::LinkSkipped {
                address: self.address().clone(),
                reason,
            })
            .await;
    }

    /// Verify, filter, decrypt, count and forward one link.
    pub async fn process_link(&mut self, link: &str) -> LinkOutcome {
        let address = self.address().clone();
        self.state = CheckerState::Verifying;

        let verdict = match self.ctx.verifier.verify_link(&self.credential, link) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(%address, error = %e, "[pm-05] Dropping malformed link");
                self.skip(LinkSkipReason::MalformedLink).await;
                return LinkOutcome::Malformed;
            }
        };

        self.ctx
            .events
            .publish(CheckerEvent::LinkChecked {
                address: address.clone(),
                matched: verdict.outcome.matched,
            })
            .await;

        let Some(locator) = verdict.outcome.content_locator else {
            return LinkOutcome::NotMatched;
        };

        if !self.cutoff.is_fresh(verdict.params.ts_nanos) {
            debug!(%address, ts = %verdict.params.ts, "[pm-05] Skipping message older than cutoff");
            self.skip(LinkSkipReason::Stale).await;
            return LinkOutcome::Stale;
        }

        self.state = CheckerState::Decrypting;
        let sent_at = Utc.timestamp_nanos(verdict.params.ts_nanos);
        let message = match self
            .ctx
            .messages
            .fetch_message(&self.credential, &locator, sent_at)
            .await
        {
            Ok(message) => message,
            Err(e) => {
                warn!(%address, %locator, error = %e, "[pm-05] Could not retrieve message");
                self.skip(LinkSkipReason::ContentFailed).await;
                return LinkOutcome::ContentFailed;
            }
        };

        self.state = CheckerState::Dispatching;
        let unread = self.ctx.counters.increment(&address);
        info!(%address, unread, "[pm-05] New message");

        let Some(forwarder) = self.ctx.forwarders.resolve(&address) else {
            info!(%address, "[pm-05] No forwarder assigned, message counted only");
            return LinkOutcome::Counted { unread };
        };

        let request = ForwardRequest {
            from: message.from().to_string(),
            subject: message.subject().to_string(),
            body: message.body,
            headers: message.headers,
            is_test: false,
        };

        let kind = forwarder.kind();
        match forwarder.forward(request).await {
            Ok(()) => {
                info!(%address, forwarder = kind, "[pm-05] Message forwarded");
                self.ctx
                    .events
                    .publish(CheckerEvent::MessageForwarded {
                        address,
                        forwarder: kind.to_string(),
                    })
                    .await;
                LinkOutcome::Forwarded {
                    unread,
                    forwarder: kind,
                }
            }
            Err(e) => {
                error!(%address, forwarder = kind, error = %e, "[pm-05] Forwarding failed");
                self.ctx
                    .events
                    .publish(CheckerEvent::ForwardFailed {
                        address,
                        forwarder: kind.to_string(),
                        error: e.to_string(),
                    })
                    .await;
                LinkOutcome::ForwardFailed { unread }
            }
        }
    }

    /// Drain the queue until shutdown or until the queue is closed.
    ///
    /// A link and the shutdown signal racing each other are resolved by
    /// whichever the runtime polls first.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> CheckerReport {
        let address = self.address().clone();
        info!(%address, "[pm-05] Checker started");

        loop {
            self.state = CheckerState::Waiting;
            if *shutdown.borrow() {
                break;
            }

            let link = tokio::select! {
                link = self.queue.recv() => match link {
                    Some(link) => link,
                    None => {
                        info!(%address, "[pm-05] Queue closed");
                        break;
                    }
                },
                _ = shutdown.changed() => break,
            };

            let outcome = self.process_link(&link).await;
            self.links_processed += 1;
            if outcome.is_delivered() {
                self.delivered += 1;
            }
            self.ctx.liveness.touch();

            self.state = CheckerState::Backoff;
            tokio::select! {
                _ = tokio::time::sleep(self.ctx.config.backoff()) => {}
                _ = shutdown.changed() => break,
            }
        }

        self.state = CheckerState::Stopped;
        self.ctx
            .events
            .publish(CheckerEvent::CheckerStopped {
                address: address.clone(),
            })
            .await;
        info!(%address, processed = self.links_processed, "[pm-05] Checker stopped");

        CheckerReport {
            address,
            links_processed: self.links_processed,
            delivered: self.delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockMessageFetcher, RecordingForwarder, StaticForwarderResolver};
    use chrono::Duration as ChronoDuration;
    use pm_02_link_verification::{compose_link, content_tag, LinkVerifier};
    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus};
    use shared_types::{
        CredentialParts, CurrencyTag, DecryptedMessage, MailHeaders, MailForwarder, SharedSecret,
    };
    use std::time::Duration;

    const BASE: &str = "https://rss.pubkemail.com/item";
    const TS: i64 = 1_700_000_000_000_000_000;

    fn credential(address: &str, secret: u8) -> Arc<Credential> {
        Arc::new(Credential::from_parts(CredentialParts {
            wif: String::new(),
            secret_scalar: [1; 32],
            public_key: vec![2; 33],
            address: Address::from(address),
            currency: CurrencyTag::Btc,
            shared_secret: SharedSecret::new(vec![secret; 65]),
        }))
    }

    fn message(subject: &str) -> DecryptedMessage {
        let mut headers = MailHeaders::new();
        headers.append("From", "alice@example.com");
        headers.append("Subject", subject);
        DecryptedMessage {
            headers,
            body: "hello".to_string(),
        }
    }

    /// Link for `cred` plus the locator it verifies to.
    fn link_for(cred: &Credential, hash: &str, ts: i64) -> (String, String) {
        let link = compose_link(BASE, cred.shared_secret(), cred.address(), hash, ts).unwrap();
        let locator = content_tag(cred.shared_secret(), cred.address(), hash, &ts.to_string());
        (link, locator)
    }

    struct Fixture {
        fetcher: Arc<MockMessageFetcher>,
        forwarder: Arc<RecordingForwarder>,
        counters: Arc<UnreadCounters>,
        bus: Arc<InMemoryEventBus>,
        liveness: LivenessBeacon,
        ctx: CheckerContext,
    }

    fn fixture(fetcher: MockMessageFetcher, forwarder: RecordingForwarder, config: AddressCheckerConfig) -> Fixture {
        let fetcher = Arc::new(fetcher);
        let forwarder = Arc::new(forwarder);
        let counters = Arc::new(UnreadCounters::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let liveness = LivenessBeacon::new();
        let dyn_forwarder: Arc<dyn MailForwarder> = forwarder.clone();
        let ctx = CheckerContext {
            verifier: Arc::new(LinkVerifier),
            messages: fetcher.clone(),
            forwarders: Arc::new(StaticForwarderResolver::new(dyn_forwarder)),
            counters: counters.clone(),
            events: bus.clone(),
            liveness: liveness.clone(),
            config,
        };
        Fixture {
            fetcher,
            forwarder,
            counters,
            bus,
            liveness,
            ctx,
        }
    }

    fn checker(cred: Arc<Credential>, ctx: CheckerContext) -> (mpsc::Sender<String>, AddressChecker) {
        let (tx, rx) = mpsc::channel(8);
        (tx, AddressChecker::new(cred, rx, ctx))
    }

    #[tokio::test]
    async fn test_matching_link_is_counted_and_forwarded() {
        let cred = credential("mAlice", 7);
        let (link, locator) = link_for(&cred, "abcd", TS);
        let fetcher = MockMessageFetcher::new();
        fetcher.insert(locator.clone(), message("Hi"));
        let f = fixture(fetcher, RecordingForwarder::new(), AddressCheckerConfig::default());
        let (_tx, mut checker) = checker(cred.clone(), f.ctx.clone());

        let outcome = checker.process_link(&link).await;

        assert_eq!(
            outcome,
            LinkOutcome::Forwarded {
                unread: 1,
                forwarder: "recording"
            }
        );
        assert_eq!(f.fetcher.calls(), vec![locator]);
        assert_eq!(f.counters.get(cred.address()), 1);

        let requests = f.forwarder.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].from, "alice@example.com");
        assert_eq!(requests[0].subject, "Hi");
        assert_eq!(requests[0].body, "hello");
        assert!(!requests[0].is_test);
    }

    #[tokio::test]
    async fn test_foreign_link_never_fetches() {
        let mine = credential("mAlice", 7);
        let other = credential("mBob", 9);
        let (link, _) = link_for(&other, "abcd", TS);
        let f = fixture(MockMessageFetcher::new(), RecordingForwarder::new(), AddressCheckerConfig::default());
        let (_tx, mut checker) = checker(mine.clone(), f.ctx.clone());

        assert_eq!(checker.process_link(&link).await, LinkOutcome::NotMatched);
        assert!(f.fetcher.calls().is_empty());
        assert!(f.forwarder.requests().is_empty());
        assert_eq!(f.counters.get(mine.address()), 0);
    }

    #[tokio::test]
    async fn test_link_at_cutoff_is_stale() {
        let cred = credential("mAlice", 7);
        let after = Utc.timestamp_nanos(TS);
        let config = AddressCheckerConfig {
            after: Some(after),
            ..AddressCheckerConfig::default()
        };
        let (at_cutoff, _) = link_for(&cred, "abcd", TS);
        let (before, _) = link_for(&cred, "abcd", TS - 1);
        let f = fixture(MockMessageFetcher::new(), RecordingForwarder::new(), config);
        let (_tx, mut checker) = checker(cred.clone(), f.ctx.clone());

        assert_eq!(checker.process_link(&at_cutoff).await, LinkOutcome::Stale);
        assert_eq!(checker.process_link(&before).await, LinkOutcome::Stale);
        assert!(f.fetcher.calls().is_empty());
        assert!(f.forwarder.requests().is_empty());
    }

    #[tokio::test]
    async fn test_link_after_cutoff_is_delivered() {
        let cred = credential("mAlice", 7);
        let after = Utc.timestamp_nanos(TS) - ChronoDuration::seconds(1);
        let config = AddressCheckerConfig {
            after: Some(after),
            ..AddressCheckerConfig::default()
        };
        let (link, locator) = link_for(&cred, "abcd", TS);
        let fetcher = MockMessageFetcher::new();
        fetcher.insert(locator, message("fresh"));
        let f = fixture(fetcher, RecordingForwarder::new(), config);
        let (_tx, mut checker) = checker(cred, f.ctx.clone());

        assert!(checker.process_link(&link).await.is_delivered());
    }

    #[tokio::test]
    async fn test_malformed_link_is_dropped() {
        let cred = credential("mAlice", 7);
        let f = fixture(MockMessageFetcher::new(), RecordingForwarder::new(), AddressCheckerConfig::default());
        let mut sub = f.bus.subscribe(EventFilter::topics(vec![EventTopic::Checker]));
        let (_tx, mut checker) = checker(cred.clone(), f.ctx.clone());

        assert_eq!(checker.process_link("::not a url::").await, LinkOutcome::Malformed);
        assert_eq!(
            checker.process_link(&format!("{BASE}?check=aa&hash=bb")).await,
            LinkOutcome::Malformed
        );
        assert_eq!(
            sub.drain(),
            vec![
                CheckerEvent::LinkSkipped {
                    address: cred.address().clone(),
                    reason: LinkSkipReason::MalformedLink
                };
                2
            ]
        );
    }

    #[tokio::test]
    async fn test_content_failure_is_not_counted() {
        let cred = credential("mAlice", 7);
        let (link, _) = link_for(&cred, "abcd", TS);
        let f = fixture(MockMessageFetcher::failing(), RecordingForwarder::new(), AddressCheckerConfig::default());
        let (_tx, mut checker) = checker(cred.clone(), f.ctx.clone());

        assert_eq!(checker.process_link(&link).await, LinkOutcome::ContentFailed);
        assert_eq!(f.counters.get(cred.address()), 0);
        assert!(f.forwarder.requests().is_empty());
    }

    #[tokio::test]
    async fn test_forward_failure_still_counts() {
        let cred = credential("mAlice", 7);
        let (link, locator) = link_for(&cred, "abcd", TS);
        let fetcher = MockMessageFetcher::new();
        fetcher.insert(locator, message("Hi"));
        let f = fixture(fetcher, RecordingForwarder::failing(), AddressCheckerConfig::default());
        let mut sub = f.bus.subscribe(EventFilter::topics(vec![EventTopic::Forwarding]));
        let (_tx, mut checker) = checker(cred.clone(), f.ctx.clone());

        assert_eq!(
            checker.process_link(&link).await,
            LinkOutcome::ForwardFailed { unread: 1 }
        );
        assert_eq!(f.counters.get(cred.address()), 1);
        assert!(matches!(
            sub.drain().as_slice(),
            [CheckerEvent::ForwardFailed { .. }]
        ));
    }

    #[tokio::test]
    async fn test_no_forwarder_counts_only() {
        let cred = credential("mAlice", 7);
        let (link, locator) = link_for(&cred, "abcd", TS);
        let fetcher = MockMessageFetcher::new();
        fetcher.insert(locator, message("Hi"));
        let f = fixture(fetcher, RecordingForwarder::new(), AddressCheckerConfig::default());
        let ctx = CheckerContext {
            forwarders: Arc::new(StaticForwarderResolver::empty()),
            ..f.ctx.clone()
        };
        let (_tx, mut checker) = checker(cred, ctx);

        assert_eq!(checker.process_link(&link).await, LinkOutcome::Counted { unread: 1 });
        assert!(f.forwarder.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_processes_in_order_with_backoff() {
        let cred = credential("mAlice", 7);
        let (first, loc1) = link_for(&cred, "aaaa", TS);
        let (second, loc2) = link_for(&cred, "bbbb", TS + 1);
        let fetcher = MockMessageFetcher::new();
        fetcher.insert(loc1, message("one"));
        fetcher.insert(loc2, message("two"));
        let f = fixture(fetcher, RecordingForwarder::new(), AddressCheckerConfig::default());
        let (tx, checker) = checker(cred.clone(), f.ctx.clone());

        tx.send(first).await.unwrap();
        tx.send(second).await.unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(checker.run(shutdown_rx));

        tokio::time::sleep(Duration::from_secs(1)).await;
        let subjects: Vec<_> = f.forwarder.requests().into_iter().map(|r| r.subject).collect();
        assert_eq!(subjects, vec!["one"]);
        assert!(f.liveness.last_check().is_some());

        tokio::time::sleep(Duration::from_secs(10)).await;
        let subjects: Vec<_> = f.forwarder.requests().into_iter().map(|r| r.subject).collect();
        assert_eq!(subjects, vec!["one", "two"]);
        assert_eq!(f.counters.get(cred.address()), 2);

        shutdown_tx.send(true).unwrap();
        let report = handle.await.unwrap();
        assert_eq!(report.links_processed, 2);
        assert_eq!(report.delivered, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exits_when_queue_closes() {
        let cred = credential("mAlice", 7);
        let f = fixture(MockMessageFetcher::new(), RecordingForwarder::new(), AddressCheckerConfig::default());
        let mut sub = f.bus.subscribe(EventFilter::topics(vec![EventTopic::Checker]));
        let (tx, checker) = checker(cred.clone(), f.ctx.clone());
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(checker.run(shutdown_rx));
        drop(tx);

        let report = handle.await.unwrap();
        assert_eq!(report.address, *cred.address());
        assert_eq!(report.links_processed, 0);
        assert_eq!(
            sub.drain(),
            vec![CheckerEvent::CheckerStopped {
                address: cred.address().clone()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_backoff() {
        let cred = credential("mAlice", 7);
        let f = fixture(MockMessageFetcher::new(), RecordingForwarder::new(), AddressCheckerConfig::default());
        let (tx, checker) = checker(cred, f.ctx.clone());
        tx.send("garbage".to_string()).await.unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(checker.run(shutdown_rx));
        tokio::time::sleep(Duration::from_secs(1)).await;

        shutdown_tx.send(true).unwrap();
        let report = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.links_processed, 1);
    }
}
