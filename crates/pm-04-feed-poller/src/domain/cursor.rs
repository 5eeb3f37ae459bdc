//! # Page Cursor
//!
//! Where the poller is in the feed, and what a single poll cycle did.

use std::time::Duration;

use crate::config::PollerConfig;

/// First page of the feed.
pub const FIRST_PAGE: u32 = 1;

/// 1-based page cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: u32,
}

impl PageCursor {
    /// A cursor on page 1.
    pub fn new() -> Self {
        Self { page: FIRST_PAGE }
    }

    /// Current page.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Move to the next page.
    pub fn advance(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    /// Back to page 1.
    pub fn reset(&mut self) {
        self.page = FIRST_PAGE;
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nobody is subscribed; nothing was fetched.
    Idle,
    /// The request failed; cursor reset.
    FetchFailed,
    /// The page had no items; cursor reset.
    EmptyPage,
    /// The genesis marker was reached after `delivered` items; cursor reset.
    Genesis {
        /// Items fanned out before the marker.
        delivered: usize,
    },
    /// Every item of `page` was fanned out; cursor advanced.
    PageDone {
        /// Page that was processed.
        page: u32,
        /// Items fanned out.
        delivered: usize,
    },
}

impl TickOutcome {
    /// How long to sleep before the next cycle.
    ///
    /// Genesis abandons the page after the reset sleep and then still takes
    /// the usual between-pages sleep.
    pub fn delay(&self, config: &PollerConfig) -> Duration {
        match self {
            TickOutcome::Idle | TickOutcome::EmptyPage => config.idle_interval(),
            TickOutcome::FetchFailed => config.reset_interval(),
            TickOutcome::Genesis { .. } => config.reset_interval() + config.page_interval(),
            TickOutcome::PageDone { .. } => config.page_interval(),
        }
    }

    /// Whether the cycle sent the cursor back to page 1.
    pub fn is_reset(&self) -> bool {
        matches!(
            self,
            TickOutcome::FetchFailed | TickOutcome::EmptyPage | TickOutcome::Genesis { .. }
        )
    }
}
