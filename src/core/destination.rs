//! Per-destination bookkeeping (`DestinationInfo` in the original rtable):
//! session activity and broadcast suppression, independent of which
//! neighbor currently carries pheromone toward the destination.

use crate::address::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct DestinationInfo {
    pub session_active: bool,
    pub session_last_seen: Instant,
    /// Broadcasts of forward ants toward this destination are suppressed
    /// until this instant (`no_broadcast` cooldown).
    pub no_broadcast_until: Instant,
}

impl DestinationInfo {
    pub fn new(now: Instant) -> Self {
        DestinationInfo {
            session_active: false,
            session_last_seen: now,
            no_broadcast_until: Instant::ZERO,
        }
    }

    pub fn register_session(&mut self, now: Instant) {
        self.session_active = true;
        self.session_last_seen = now;
    }

    pub fn is_session_active(&self, now: Instant, session_expire: Duration) -> bool {
        self.session_active && now.saturating_sub(self.session_last_seen) < session_expire
    }

    pub fn is_expired(&self, now: Instant, dst_expire: Duration) -> bool {
        !self.is_session_active(now, dst_expire) && now.saturating_sub(self.session_last_seen) >= dst_expire
    }

    pub fn is_broadcast_allowed(&self, now: Instant) -> bool {
        now >= self.no_broadcast_until
    }

    pub fn suppress_broadcast(&mut self, now: Instant, no_broadcast: Duration) {
        self.no_broadcast_until = now + no_broadcast;
    }
}
