//! External pause/cancel signals for a running crawl
//!
//! The controller only looks at these flags at the top of each page
//! iteration, so a page in flight always finishes before a pause or
//! cancellation takes effect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Poll interval while paused
const PAUSE_POLL: Duration = Duration::from_millis(200);

/// Cloneable handle shared between the crawl loop and whoever drives it
#[derive(Debug, Clone, Default)]
pub struct CrawlControl {
    cancelled: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl CrawlControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the crawl stop before the next page
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Waits while paused
    ///
    /// # Returns
    ///
    /// * `true` - The crawl may proceed
    /// * `false` - The crawl was cancelled (possibly while paused)
    pub async fn wait_if_paused(&self) -> bool {
        let mut announced = false;
        while self.is_paused() && !self.is_cancelled() {
            if !announced {
                tracing::info!("Crawl paused");
                announced = true;
            }
            tokio::time::sleep(PAUSE_POLL).await;
        }
        if announced && !self.is_cancelled() {
            tracing::info!("Crawl resumed");
        }
        !self.is_cancelled()
    }
}
