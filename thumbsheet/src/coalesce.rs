//! Coalescing of identical sheet builds.
//!
//! ```text
//! /update_sheet?q=cat ─┐
//!                      │                         detached task
//! /update_sheet?q=cat ─┼──► BuildCoalescer ────► SheetBuilder::build
//!                      │         │                     │
//! /update_sheet?q=cat ─┘         ▼                     ▼
//!                       all three receive ◄──── complete(outcome)
//!                       the same outcome
//! ```
//!
//! Requests are identical when query, shape and page all match. Different
//! requests are never coalesced and race each other to the cache.

use crate::builder::BuildError;
use crate::cache::SheetArtifact;
use crate::grid::SheetRequest;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

/// What every waiter on a build receives.
pub type BuildOutcome = Result<Arc<SheetArtifact>, BuildError>;

/// Tracks builds in flight so identical requests share one.
pub struct BuildCoalescer {
    in_flight: Mutex<HashMap<SheetRequest, broadcast::Sender<BuildOutcome>>>,
    stats: Mutex<CoalescerStats>,
}

/// Counters for coalescing effectiveness.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoalescerStats {
    /// Total regenerate calls seen.
    pub total_requests: u64,
    /// Calls that joined a build already in flight.
    pub coalesced_requests: u64,
    /// Calls that started a build.
    pub new_requests: u64,
}

impl CoalescerStats {
    /// Fraction of requests that were coalesced (0.0 to 1.0).
    pub fn coalescing_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.coalesced_requests as f64 / self.total_requests as f64
        }
    }
}

/// Result of [`BuildCoalescer::register`].
#[derive(Debug)]
pub enum Registration {
    /// No identical build is running; the caller must start one and call
    /// [`BuildCoalescer::complete`] when it finishes.
    Leader(broadcast::Receiver<BuildOutcome>),
    /// An identical build is running; wait on the receiver.
    Follower(broadcast::Receiver<BuildOutcome>),
}

impl Registration {
    pub fn is_leader(&self) -> bool {
        matches!(self, Self::Leader(_))
    }

    /// Receiver for the build outcome, whichever role this is.
    pub fn into_receiver(self) -> broadcast::Receiver<BuildOutcome> {
        match self {
            Self::Leader(rx) | Self::Follower(rx) => rx,
        }
    }
}

impl BuildCoalescer {
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
            stats: Mutex::new(CoalescerStats::default()),
        }
    }

    /// Registers interest in building `request`.
    pub async fn register(&self, request: &SheetRequest) -> Registration {
        let mut in_flight = self.in_flight.lock().await;
        let mut stats = self.stats.lock().await;
        stats.total_requests += 1;

        if let Some(tx) = in_flight.get(request) {
            stats.coalesced_requests += 1;
            debug!(
                query = %request.query(),
                shape = %request.shape(),
                "Joining in-flight build"
            );
            Registration::Follower(tx.subscribe())
        } else {
            // One message is ever sent per channel
            let (tx, rx) = broadcast::channel(1);
            in_flight.insert(request.clone(), tx);
            stats.new_requests += 1;
            debug!(
                query = %request.query(),
                shape = %request.shape(),
                in_flight = in_flight.len(),
                "Starting new build"
            );
            Registration::Leader(rx)
        }
    }

    /// Delivers `outcome` to every waiter on `request` and forgets it.
    pub async fn complete(&self, request: &SheetRequest, outcome: BuildOutcome) {
        let mut in_flight = self.in_flight.lock().await;

        if let Some(tx) = in_flight.remove(request) {
            let waiters = tx.receiver_count();
            // Receivers may all have gone away
            let _ = tx.send(outcome);
            debug!(query = %request.query(), waiters, "Build outcome delivered");
        }
    }

    pub async fn stats(&self) -> CoalescerStats {
        self.stats.lock().await.clone()
    }

    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    pub async fn log_stats(&self) {
        let stats = self.stats().await;
        let in_flight = self.in_flight_count().await;

        info!(
            total_requests = stats.total_requests,
            coalesced = stats.coalesced_requests,
            new_requests = stats.new_requests,
            in_flight,
            coalescing_ratio = format!("{:.1}%", stats.coalescing_ratio() * 100.0),
            "Build coalescing statistics"
        );
    }
}

impl Default for BuildCoalescer {
    fn default() -> Self {
        Self::new()
    }
}
