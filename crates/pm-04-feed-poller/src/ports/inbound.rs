//! # Inbound Ports
//!
//! What the runtime drives.

use async_trait::async_trait;

use crate::domain::TickOutcome;

/// Feed poller API.
#[async_trait]
pub trait FeedPollerApi: Send {
    /// Run one poll cycle without sleeping.
    async fn tick(&mut self) -> TickOutcome;

    /// Page the next cycle will request.
    fn current_page(&self) -> u32;
}
