//! Prometheus counters for the checker, named `pm_<what>_total`.
//!
//! Nothing in the pipeline increments these directly; the runtime's metrics
//! handler maps bus events onto them.

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

/// Label values used on [`FEED_RESETS`].
pub const RESET_REASONS: [&str; 3] = ["fetch_failed", "empty_page", "genesis"];

fn counter(name: &str, help: &str) -> Counter {
    Counter::new(name, help).expect("static counter definition is valid")
}

lazy_static! {
    /// Registry the checker exposes.
    pub static ref REGISTRY: Registry = Registry::new();

    /// Feed pages fetched and fanned out.
    pub static ref FEED_PAGES: Counter =
        counter("pm_feed_pages_total", "Feed pages fetched and fanned out");

    /// Page cursor resets, by reason.
    pub static ref FEED_RESETS: CounterVec = CounterVec::new(
        Opts::new("pm_feed_resets_total", "Page cursor resets back to page one"),
        &["reason"],
    )
    .expect("static counter definition is valid");

    /// Links run through the verifier, summed over addresses.
    pub static ref LINKS_CHECKED: Counter =
        counter("pm_links_checked_total", "Links verified across all addresses");

    /// Links that belonged to a subscribed address.
    pub static ref LINKS_MATCHED: Counter =
        counter("pm_links_matched_total", "Links addressed to a subscribed address");

    /// Matched links dropped for content errors.
    pub static ref CONTENT_FAILURES: Counter = counter(
        "pm_content_failures_total",
        "Matched links whose content could not be fetched or decrypted",
    );

    /// Messages delivered.
    pub static ref MESSAGES_FORWARDED: Counter =
        counter("pm_messages_forwarded_total", "Decrypted messages handed to a forwarder");

    /// Delivery failures.
    pub static ref FORWARD_FAILURES: Counter =
        counter("pm_forward_failures_total", "Forwarding attempts that failed");
}

/// Register every counter with [`REGISTRY`]. Repeat calls are no-ops.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let collectors: [Box<dyn prometheus::core::Collector>; 7] = [
        Box::new(FEED_PAGES.clone()),
        Box::new(FEED_RESETS.clone()),
        Box::new(LINKS_CHECKED.clone()),
        Box::new(LINKS_MATCHED.clone()),
        Box::new(CONTENT_FAILURES.clone()),
        Box::new(MESSAGES_FORWARDED.clone()),
        Box::new(FORWARD_FAILURES.clone()),
    ];

    for collector in collectors {
        if let Err(e) = REGISTRY.register(collector) {
            if !matches!(e, prometheus::Error::AlreadyReg) {
                return Err(TelemetryError::MetricsInit(e.to_string()));
            }
        }
    }

    // Pre-create the labelled series so they show up as zero.
    for reason in RESET_REASONS {
        FEED_RESETS.with_label_values(&[reason]);
    }
    Ok(())
}

/// Render [`REGISTRY`] in the Prometheus text exposition format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let mut out = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut out)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(out).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
