//! Debounced rescans of externally changed files.
//!
//! [`RescanScheduler`] only does the bookkeeping; the host owns the timer and the scan itself.
//! Requests are debounced, a scan never starts while another one is running, and requests that
//! arrive during a scan collapse into a single re-run.

use std::time::{Duration, Instant};

/// Scheduling state of periodic rescans.
#[derive(Debug, Clone)]
pub struct RescanScheduler {
    debounce: Duration,
    pending_since: Option<Instant>,
    running: bool,
    queued: bool,
}

impl RescanScheduler {
    /// Create a scheduler that waits for `debounce` of quiet time before starting a scan.
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending_since: None,
            running: false,
            queued: false,
        }
    }

    /// Ask for a rescan. Repeated requests restart the debounce period.
    pub fn request(&mut self, now: Instant) {
        if self.running {
            if !self.queued {
                tracing::debug!("rescan running, queueing one re-run");
            }
            self.queued = true;
        } else {
            self.pending_since = Some(now);
        }
    }

    /// Whether a scan should start now. Returns `true` at most once per scan; the caller must
    /// call [`RescanScheduler::finish`] when the scan completes.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.running {
            return false;
        }
        match self.pending_since {
            Some(since) if now.saturating_duration_since(since) >= self.debounce => {
                self.pending_since = None;
                self.running = true;
                tracing::debug!("starting rescan");
                true
            }
            _ => false,
        }
    }

    /// Record that the running scan completed.
    pub fn finish(&mut self, now: Instant) {
        self.running = false;
        if std::mem::take(&mut self.queued) {
            self.pending_since = Some(now);
        }
    }

    /// Whether a scan is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a scan is waiting for its debounce period to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }
}
