//! # Service Container
//!
//! Holds every shared service and manages their lifetime.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: event bus, liveness beacon, unread counters
//! Level 1: key directory + key derivation (PM-01), link verifier (PM-02)
//! Level 2: content store + decryptor (PM-03)
//! Level 3: feed source + queue registry (PM-04), forwarder registry
//! ```
//!
//! ## Thread Safety
//!
//! - Every service is wrapped in `Arc` and shared with the tasks
//! - Mutable registries guard themselves with `RwLock`

use std::sync::Arc;

use tracing::info;

use pm_01_key_derivation::{HttpKeyDirectory, KeyDerivationApi, KeyDerivationService};
use pm_02_link_verification::{LinkVerifier, LinkVerifierApi};
use pm_03_content_decrypt::{ContentService, HttpContentStore};
use pm_04_feed_poller::{FeedSource, HttpFeedSource, QueueRegistry};
use pm_05_address_checker::{AddressCheckerConfig, CheckerContext, MessageFetcher};
use shared_bus::{InMemoryEventBus, LivenessBeacon};
use shared_types::UnreadCounters;

use crate::adapters::{ContentMessageFetcher, ForwarderRegistry};
use crate::container::config::{CheckerConfig, ConfigError};

/// Central container for the checker's services.
pub struct ServiceContainer {
    /// Configuration the services were built from.
    pub config: CheckerConfig,

    // =========================================================================
    // SUBSYSTEMS
    // =========================================================================
    /// Key Derivation (PM-01)
    pub key_derivation: Arc<dyn KeyDerivationApi>,

    /// Link Verification (PM-02)
    pub verifier: Arc<dyn LinkVerifierApi>,

    /// Content Fetch & Decrypt (PM-03), seen through the checker's port
    pub messages: Arc<dyn MessageFetcher>,

    /// Feed source (PM-04)
    pub feed: Arc<dyn FeedSource>,

    // =========================================================================
    // SHARED STATE
    // =========================================================================
    /// Per-address inbound queues, read by the poller
    pub queues: Arc<QueueRegistry>,

    /// Unread mail per address
    pub counters: Arc<UnreadCounters>,

    /// Named forwarders and assignments
    pub forwarders: Arc<ForwarderRegistry>,

    /// Event bus
    pub bus: Arc<InMemoryEventBus>,

    /// Last global check time
    pub liveness: LivenessBeacon,

    /// Checker settings with the cutoff resolved
    pub checker: AddressCheckerConfig,
}

impl ServiceContainer {
    /// Build the container with HTTP-backed subsystems.
    pub fn new(config: CheckerConfig) -> Result<Self, ConfigError> {
        info!("Initializing checker services...");
        config.validate()?;

        let directory = HttpKeyDirectory::new(config.key_derivation())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let key_derivation = Arc::new(KeyDerivationService::new(Arc::new(directory)));
        info!("  [1] Key Derivation initialized");

        let store = HttpContentStore::new(config.content())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let content = Arc::new(ContentService::new(Arc::new(store)));
        let messages = Arc::new(ContentMessageFetcher::new(content));
        info!("  [3] Content Decrypt initialized");

        let feed = HttpFeedSource::new(&config.poller)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        info!("  [4] Feed Poller source initialized");

        Ok(Self::with_services(
            config,
            key_derivation,
            messages,
            Arc::new(feed),
        ))
    }

    /// Build the container around caller-supplied subsystem ports.
    pub fn with_services(
        config: CheckerConfig,
        key_derivation: Arc<dyn KeyDerivationApi>,
        messages: Arc<dyn MessageFetcher>,
        feed: Arc<dyn FeedSource>,
    ) -> Self {
        let queues = Arc::new(QueueRegistry::new(config.checker.queue_capacity));
        let checker = config.address_checker();

        Self {
            config,
            key_derivation,
            verifier: Arc::new(LinkVerifier),
            messages,
            feed,
            queues,
            counters: Arc::new(UnreadCounters::new()),
            forwarders: Arc::new(ForwarderRegistry::new()),
            bus: Arc::new(InMemoryEventBus::new()),
            liveness: LivenessBeacon::new(),
            checker,
        }
    }

    /// Everything a checker task needs.
    pub fn checker_context(&self) -> CheckerContext {
        CheckerContext {
            verifier: Arc::clone(&self.verifier),
            messages: Arc::clone(&self.messages),
            forwarders: self.forwarders.clone(),
            counters: Arc::clone(&self.counters),
            events: self.bus.clone(),
            liveness: self.liveness.clone(),
            config: self.checker.clone(),
        }
    }
}
