//! # Event Subscriber
//!
//! The receiving half of the bus. Filtering happens here, after delivery,
//! so one broadcast channel serves listeners with different interests.

use crate::events::{CheckerEvent, EventFilter};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

/// Errors from reading a subscription.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Every publisher is gone; nothing more will arrive.
    #[error("event bus closed")]
    Closed,
}

/// A filtered view onto the bus.
pub struct Subscription {
    receiver: broadcast::Receiver<CheckerEvent>,
    filter: EventFilter,
    missed: u64,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<CheckerEvent>, filter: EventFilter) -> Self {
        Self {
            receiver,
            filter,
            missed: 0,
        }
    }

    fn note_lag(&mut self, skipped: u64) {
        self.missed += skipped;
        warn!(skipped, total = self.missed, "[bus] listener fell behind");
    }

    /// Wait for the next event this subscription is interested in.
    ///
    /// `None` means the bus has been dropped.
    pub async fn recv(&mut self) -> Option<CheckerEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => self.note_lag(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next buffered event of interest, without waiting.
    ///
    /// `Ok(None)` when nothing of interest is buffered.
    pub fn try_recv(&mut self) -> Result<Option<CheckerEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => self.note_lag(skipped),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// Everything of interest that is already buffered, oldest first.
    pub fn drain(&mut self) -> Vec<CheckerEvent> {
        std::iter::from_fn(|| self.try_recv().ok().flatten()).collect()
    }

    /// Events lost because this listener lagged behind the buffer.
    #[must_use]
    pub fn missed(&self) -> u64 {
        self.missed
    }

    /// What this subscription lets through.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}
