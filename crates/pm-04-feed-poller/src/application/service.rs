//! # Feed Poller Service
//!
//! Owns the page cursor. `tick()` does one fetch and fan-out; `run()` loops
//! `tick()` with the outcome's delay until shutdown.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::PollerConfig;
use crate::domain::{PageCursor, TickOutcome};
use crate::ports::{FeedPollerApi, FeedSource, LinkTargets};
use shared_bus::{CheckerEvent, EventPublisher, FeedResetReason};

/// Feed Poller - a single instance per process.
pub struct FeedPoller<S: FeedSource + ?Sized, T: LinkTargets + ?Sized> {
    source: Arc<S>,
    targets: Arc<T>,
    events: Arc<dyn EventPublisher>,
    config: PollerConfig,
    cursor: PageCursor,
}

impl<S, T> FeedPoller<S, T>
where
    S: FeedSource + ?Sized + 'static,
    T: LinkTargets + ?Sized + 'static,
{
    /// Create a poller starting on page 1.
    pub fn new(
        source: Arc<S>,
        targets: Arc<T>,
        events: Arc<dyn EventPublisher>,
        config: PollerConfig,
    ) -> Self {
        Self {
            source,
            targets,
            events,
            config,
            cursor: PageCursor::new(),
        }
    }

    /// Poller configuration.
    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    async fn reset(&mut self, reason: FeedResetReason) {
        self.cursor.reset();
        self.events.publish(CheckerEvent::FeedReset { reason }).await;
    }

    /// Poll until the shutdown flag flips to `true` or its sender is dropped.
    ///
    /// A cycle in progress is abandoned at its next await point.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            feed = %self.config.feed_url,
            page_size = self.config.page_size,
            "[pm-04] Feed poller started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let outcome = tokio::select! {
                outcome = self.tick() => outcome,
                _ = shutdown.changed() => break,
            };

            let delay = outcome.delay(&self.config);
            debug!(?outcome, ?delay, "[pm-04] Poll cycle finished");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("[pm-04] Feed poller stopped");
    }
}

#[async_trait]
impl<S, T> FeedPollerApi for FeedPoller<S, T>
where
    S: FeedSource + ?Sized + 'static,
    T: LinkTargets + ?Sized + 'static,
{
    async fn tick(&mut self) -> TickOutcome {
        let targets = self.targets.snapshot();
        if targets.is_empty() {
            return TickOutcome::Idle;
        }

        let page = self.cursor.page();
        let entries = match self.source.fetch_page(page, self.config.page_size).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(page, error = %e, "[pm-04] Feed fetch failed, resetting to page 1");
                self.reset(FeedResetReason::FetchFailed).await;
                return TickOutcome::FetchFailed;
            }
        };

        if entries.is_empty() {
            debug!(page, "[pm-04] Empty feed page, resetting to page 1");
            self.reset(FeedResetReason::EmptyPage).await;
            return TickOutcome::EmptyPage;
        }

        self.events
            .publish(CheckerEvent::FeedPageFetched {
                page,
                items: entries.len(),
            })
            .await;

        let mut delivered = 0;
        for entry in entries {
            if entry.is_genesis() {
                info!(page, delivered, "[pm-04] Reached genesis item, resetting to page 1");
                self.reset(FeedResetReason::Genesis).await;
                return TickOutcome::Genesis { delivered };
            }

            for (address, queue) in &targets {
                if queue.send(entry.link.clone()).await.is_err() {
                    debug!(%address, "[pm-04] Queue closed, subscriber gone");
                }
            }
            delivered += 1;
        }

        self.cursor.advance();
        debug!(page, delivered, "[pm-04] Page fanned out");
        TickOutcome::PageDone { page, delivered }
    }

    fn current_page(&self) -> u32 {
        self.cursor.page()
    }
}
