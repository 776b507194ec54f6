//! Structured-logging trace points, one per place the original module fires
//! its `ant_drop`/`data_drop` traced callbacks. Emits through `tracing`
//! (same crate the host binary initializes in `main.rs`) and keeps
//! in-memory counters so tests can assert "N ants were dropped" without
//! scraping log output.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::address::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntDropReason {
    TtlExpired,
    DuplicateSeen,
    NoRouteNoBudget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDropReason {
    CacheExpired,
    Blackholed,
}

#[derive(Default)]
pub struct TraceCounters {
    ant_drops: AtomicU64,
    data_drops: AtomicU64,
}

impl TraceCounters {
    pub fn new() -> Self {
        TraceCounters::default()
    }

    pub fn ant_drop(&self, reason: AntDropReason, source: Address, destination: Address) {
        self.ant_drops.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(?reason, %source, %destination, "dropping ant");
    }

    pub fn data_drop(&self, reason: DataDropReason, destination: Address) {
        self.data_drops.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(?reason, %destination, "dropping cached data packet");
    }

    pub fn ant_drop_count(&self) -> u64 {
        self.ant_drops.load(Ordering::Relaxed)
    }

    pub fn data_drop_count(&self) -> u64 {
        self.data_drops.load(Ordering::Relaxed)
    }
}
