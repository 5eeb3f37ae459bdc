//! # Checker Supervisor
//!
//! Owns one feed poller task and one checker task per subscribed address.
//!
//! ## Task Model
//!
//! ```text
//!                    ┌─────────────┐
//!                    │ FeedPoller  │  (PM-04, one task)
//!                    └──────┬──────┘
//!             bounded queue │ per address
//!        ┌──────────────────┼──────────────────┐
//!        ↓                  ↓                  ↓
//!  AddressChecker     AddressChecker     AddressChecker   (PM-05, JoinSet)
//!        │                  │                  │
//!        └──────── MailForwarder (PM-06) ──────┘
//! ```
//!
//! The poller and the metrics handler watch the global shutdown channel.
//! Each checker watches its own stop channel so it can be removed alone;
//! `shutdown()` signals all of them and joins the group.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use pm_04_feed_poller::FeedPoller;
use pm_05_address_checker::{AddressChecker, CheckerReport};
use pm_06_forwarding::{forwarder_from_json, normalize_name, test_request};
use pm_telemetry::encode_metrics;
use shared_bus::{EventFilter, EventTopic, LivenessBeacon};
use shared_types::{truncate_text, Address, Credential};

use crate::container::{CheckerConfig, ConfigError, ServiceContainer};
use crate::errors::RuntimeError;
use crate::handlers::MetricsHandler;

/// Characters of an address shown in status lines.
const STATUS_ADDRESS_LEN: usize = 32;

/// A running subscription.
struct ActiveSubscription {
    credential: Arc<Credential>,
    stop: watch::Sender<bool>,
}

/// The checker runtime.
pub struct CheckerRuntime {
    /// Shared services.
    container: Arc<ServiceContainer>,
    /// Subscribed addresses.
    subscriptions: RwLock<BTreeMap<Address, ActiveSubscription>>,
    /// Checker task group.
    checkers: Mutex<JoinSet<CheckerReport>>,
    /// Poller and handler tasks.
    background: Mutex<Vec<JoinHandle<()>>>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
}

impl CheckerRuntime {
    /// Create a runtime with HTTP-backed subsystems.
    pub fn new(config: CheckerConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_container(ServiceContainer::new(config)?))
    }

    /// Create a runtime around an existing container.
    pub fn with_container(container: ServiceContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            subscriptions: RwLock::new(BTreeMap::new()),
            checkers: Mutex::new(JoinSet::new()),
            background: Mutex::new(Vec::new()),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Start the poller and handlers, then apply the configured seeds.
    ///
    /// A seed that fails is logged and skipped; it never stops startup.
    pub async fn start(&self) -> anyhow::Result<()> {
        info!("===========================================");
        info!("  Pubkey-Mail Checker v{}", crate::VERSION);
        info!("===========================================");

        if !self.background.lock().is_empty() {
            warn!("Runtime already started");
            return Ok(());
        }

        self.start_handlers();
        self.start_poller();

        let config = &self.container.config;
        for seed in &config.forwarders {
            if let Err(e) = self.add_forwarder(&seed.name, &seed.json) {
                error!(name = %seed.name, error = %e, "Forwarder seed rejected");
            }
        }
        for seed in &config.subscriptions {
            match self.subscribe(&seed.wif, seed.forward_to.as_deref()).await {
                Ok(address) => debug!(%address, "Subscription seed applied"),
                Err(e) => error!(error = %e, "{}", e.friendly_message()),
            }
        }

        info!(
            feed = %config.poller.feed_url,
            subscriptions = self.subscriptions.read().len(),
            forwarders = self.container.forwarders.len(),
            "Checker running"
        );
        Ok(())
    }

    fn start_handlers(&self) {
        let handler = MetricsHandler::new(self.container.bus.subscribe(EventFilter::all()));
        let mut shutdown = self.shutdown_rx.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = handler.run() => {}
                _ = shutdown.changed() => {
                    debug!("[pm-telemetry] Shutdown signal received");
                }
            }
        });
        self.background.lock().push(task);
    }

    fn start_poller(&self) {
        let poller = FeedPoller::new(
            Arc::clone(&self.container.feed),
            Arc::clone(&self.container.queues),
            self.container.bus.clone(),
            self.container.config.poller.clone(),
        );
        let task = tokio::spawn(poller.run(self.shutdown_rx.clone()));
        self.background.lock().push(task);
    }

    /// Subscribe a credential and start its checker.
    ///
    /// Without `forward_to` any registered forwarder is used; with none
    /// registered, matched mail is only counted.
    pub async fn subscribe(
        &self,
        wif: &str,
        forward_to: Option<&str>,
    ) -> Result<Address, RuntimeError> {
        let credential = self.container.key_derivation.derive_credential(wif.trim()).await?;
        let address = credential.address().clone();

        if self.subscriptions.read().contains_key(&address) {
            return Err(RuntimeError::AlreadySubscribed(address));
        }

        let forwarder = match forward_to.map(normalize_name) {
            Some(name) if !name.is_empty() => Some(name),
            _ => self.container.forwarders.any_name(),
        };
        if let Some(name) = &forwarder {
            self.container.forwarders.assign(&address, name)?;
        }

        let Some(queue) = self.container.queues.register(&address) else {
            self.container.forwarders.unassign(&address);
            return Err(RuntimeError::AlreadySubscribed(address));
        };
        self.container.counters.register(&address);

        let credential = Arc::new(credential);
        let (stop, stop_rx) = watch::channel(false);
        let checker = AddressChecker::new(
            Arc::clone(&credential),
            queue,
            self.container.checker_context(),
        );
        self.checkers.lock().spawn(checker.run(stop_rx));

        info!(
            %address,
            currency = %credential.currency(),
            credential = %credential.truncated_wif(8),
            forwarder = forwarder.as_deref().unwrap_or(""),
            "Subscribed"
        );
        self.subscriptions
            .write()
            .insert(address.clone(), ActiveSubscription { credential, stop });
        Ok(address)
    }

    /// Stop and forget the checker for `address`.
    pub fn unsubscribe(&self, address: &Address) -> Result<(), RuntimeError> {
        let subscription = self
            .subscriptions
            .write()
            .remove(address)
            .ok_or_else(|| RuntimeError::UnknownAddress(address.clone()))?;

        self.container.queues.remove(address);
        self.container.counters.remove(address);
        self.container.forwarders.unassign(address);
        let _ = subscription.stop.send(true);
        self.reap_finished_checkers();

        info!(%address, "Unsubscribed");
        Ok(())
    }

    /// Drop checkers that already returned so the task group does not grow
    /// across subscribe/unsubscribe cycles.
    fn reap_finished_checkers(&self) {
        let mut checkers = self.checkers.lock();
        while let Some(result) = checkers.try_join_next() {
            match result {
                Ok(report) => debug!(
                    address = %report.address,
                    links = report.links_processed,
                    delivered = report.delivered,
                    "Checker reaped"
                ),
                Err(e) => warn!(error = %e, "Checker task ended abnormally"),
            }
        }
    }

    /// Checker tasks not yet reaped.
    pub fn checker_tasks(&self) -> usize {
        self.checkers.lock().len()
    }

    /// Point a subscribed address at a named forwarder.
    pub fn assign_forwarder(&self, address: &Address, name: &str) -> Result<(), RuntimeError> {
        if !self.subscriptions.read().contains_key(address) {
            return Err(RuntimeError::UnknownAddress(address.clone()));
        }
        let name = normalize_name(name);
        self.container.forwarders.assign(address, &name)?;
        info!(%address, forwarder = %name, "Forwarder assigned");
        Ok(())
    }

    /// Register or replace a forwarder. Empty `json` removes it.
    pub fn add_forwarder(&self, name: &str, json: &str) -> Result<(), RuntimeError> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(RuntimeError::EmptyName);
        }

        if json.trim().is_empty() {
            return self.remove_forwarder(&name).map(|_| ());
        }

        let forwarder = forwarder_from_json(json)?;
        info!(forwarder = %name, kind = forwarder.kind(), "Forwarder registered");
        self.container.forwarders.insert(name, forwarder);
        Ok(())
    }

    /// Remove a forwarder and every subscription pointing at it.
    pub fn remove_forwarder(&self, name: &str) -> Result<Vec<Address>, RuntimeError> {
        let name = normalize_name(name);
        let orphaned = self
            .container
            .forwarders
            .remove(&name)
            .ok_or_else(|| RuntimeError::UnknownForwarder(name.clone()))?;

        for address in &orphaned {
            if let Err(e) = self.unsubscribe(address) {
                debug!(%address, error = %e, "Orphaned subscription already gone");
            }
        }
        info!(forwarder = %name, removed = orphaned.len(), "Forwarder removed");
        Ok(orphaned)
    }

    /// Build a forwarder from `json` and send it a test message.
    pub async fn test_forwarder(&self, json: &str) -> Result<(), RuntimeError> {
        let forwarder = forwarder_from_json(json)?;
        forwarder.forward(test_request(Utc::now())).await?;
        info!(kind = forwarder.kind(), "Test message sent");
        Ok(())
    }

    /// Sorted ` {currency} {address}` lines.
    pub fn status_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .subscriptions
            .read()
            .values()
            .map(|sub| {
                format!(
                    " {} {}",
                    sub.credential.currency(),
                    truncate_text(sub.credential.address().as_str(), STATUS_ADDRESS_LEN)
                )
            })
            .collect();
        lines.sort();
        lines
    }

    /// Subscribed addresses, sorted.
    pub fn addresses(&self) -> Vec<Address> {
        self.subscriptions.read().keys().cloned().collect()
    }

    /// Unread messages for `address`.
    pub fn unread(&self, address: &Address) -> u64 {
        self.container.counters.get(address)
    }

    /// Forwarder assigned to `address`.
    pub fn forwarder_of(&self, address: &Address) -> Option<String> {
        self.container.forwarders.assignment(address)
    }

    /// Last global check time.
    pub fn liveness(&self) -> LivenessBeacon {
        self.container.liveness.clone()
    }

    /// Get a reference to the service container.
    pub fn container(&self) -> Arc<ServiceContainer> {
        Arc::clone(&self.container)
    }

    /// Shut down gracefully and return the checkers' reports.
    ///
    /// ## Shutdown Sequence
    ///
    /// 1. Signal the poller, the handlers and every checker
    /// 2. Join the poller and handlers
    /// 3. Join checkers within the grace period, abort stragglers
    /// 4. Log the metrics exposition
    pub async fn shutdown(&self) -> Vec<CheckerReport> {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        for subscription in self.subscriptions.read().values() {
            let _ = subscription.stop.send(true);
        }

        let background = std::mem::take(&mut *self.background.lock());
        for task in background {
            if let Err(e) = task.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }

        let mut checkers = std::mem::take(&mut *self.checkers.lock());
        let grace = Duration::from_secs(self.container.config.checker.shutdown_grace_secs);
        let mut reports = Vec::new();
        let joined = tokio::time::timeout(grace, async {
            while let Some(result) = checkers.join_next().await {
                match result {
                    Ok(report) => reports.push(report),
                    Err(e) => warn!(error = %e, "Checker task ended abnormally"),
                }
            }
        })
        .await;
        if joined.is_err() {
            warn!(remaining = checkers.len(), "Grace period elapsed, aborting checkers");
            checkers.abort_all();
        }
        reports.sort_by(|a, b| a.address.cmp(&b.address));

        match encode_metrics() {
            Ok(text) => info!("Final metrics:\n{}", text),
            Err(e) => warn!(error = %e, "Failed to encode metrics"),
        }
        let bus = &self.container.bus;
        info!(
            checkers = reports.len(),
            feed_events = bus.published_on(EventTopic::Feed),
            checker_events = bus.published_on(EventTopic::Checker),
            unheard = bus.unheard(),
            "Shutdown complete"
        );
        reports
    }
}
