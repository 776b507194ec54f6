//! Buffers data packets awaiting route discovery, draining them once a
//! backward ant resolves a destination. Grounded in `SendCachedData`'s
//! drain-and-drop-stale loop; the payload type is left generic since the
//! routing core is agnostic to what it is forwarding.

use std::collections::HashMap;

use crate::address::{Duration, Instant};

struct CacheEntry<T> {
    payload: T,
    arrival_iface: u32,
    enqueued_at: Instant,
}

pub struct PacketCache<T> {
    entries: HashMap<crate::address::Address, Vec<CacheEntry<T>>>,
    /// Per-destination capacity; overflow drops the oldest entry.
    capacity: usize,
}

impl<T> PacketCache<T> {
    pub fn new(capacity: usize) -> Self {
        PacketCache {
            entries: HashMap::new(),
            capacity,
        }
    }

    /// Appends `payload`, evicting the oldest entry for `dest` first if
    /// already at capacity -- bounds per-destination memory against a
    /// flood of datagrams toward an unreachable destination.
    pub fn enqueue(&mut self, dest: crate::address::Address, payload: T, arrival_iface: u32, now: Instant) {
        let bucket = self.entries.entry(dest).or_default();
        if bucket.len() >= self.capacity {
            bucket.remove(0);
        }
        bucket.push(CacheEntry {
            payload,
            arrival_iface,
            enqueued_at: now,
        });
    }

    pub fn has_entries(&self, dest: crate::address::Address) -> bool {
        self.entries.get(&dest).map(|v| !v.is_empty()).unwrap_or(false)
    }

    /// Drains every entry cached for `dest`, dropping (and counting) ones
    /// that aged past `dcache_expire` before a route arrived.
    pub fn drain(
        &mut self,
        dest: crate::address::Address,
        now: Instant,
        dcache_expire: Duration,
    ) -> (Vec<(T, u32)>, usize) {
        let Some(entries) = self.entries.remove(&dest) else {
            return (Vec::new(), 0);
        };
        let mut fresh = Vec::with_capacity(entries.len());
        let mut dropped = 0;
        for entry in entries {
            if now.saturating_sub(entry.enqueued_at) >= dcache_expire {
                dropped += 1;
            } else {
                fresh.push((entry.payload, entry.arrival_iface));
            }
        }
        (fresh, dropped)
    }

    pub fn remove(&mut self, dest: crate::address::Address) {
        self.entries.remove(&dest);
    }
}
