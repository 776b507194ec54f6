//! Core identifiers shared across the routing engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// An IPv4-sized opaque node identifier. Compared by equality, hashable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub Ipv4Addr);

impl Address {
    pub const LOOPBACK: Address = Address(Ipv4Addr::new(127, 0, 0, 1));
    pub const BROADCAST: Address = Address(Ipv4Addr::new(255, 255, 255, 255));

    pub fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Address(Ipv4Addr::new(a, b, c, d))
    }

    pub fn is_loopback(&self) -> bool {
        self.0.is_loopback()
    }

    pub fn is_multicast(&self) -> bool {
        self.0.is_multicast()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Ipv4Addr> for Address {
    fn from(a: Ipv4Addr) -> Self {
        Address(a)
    }
}

impl std::str::FromStr for Address {
    type Err = std::net::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Address(s.parse()?))
    }
}

/// Sequence number carried by ants, used together with the source address
/// to deduplicate broadcasts in `SeenHistory`.
pub type SeqNo = u64;

/// Monotonic-ish wall-clock timestamp, expressed in nanoseconds, as
/// produced by a `host::traits::Clock`. Not tied to `SystemTime` so that a
/// fake clock can drive it deterministically in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Instant(pub u64);

impl Instant {
    pub const ZERO: Instant = Instant(0);

    pub fn saturating_sub(self, other: Instant) -> Duration {
        Duration(self.0.saturating_sub(other.0))
    }

    pub fn checked_add(self, d: Duration) -> Option<Instant> {
        self.0.checked_add(d.0).map(Instant)
    }
}

impl std::ops::Add<Duration> for Instant {
    type Output = Instant;
    fn add(self, rhs: Duration) -> Instant {
        Instant(self.0 + rhs.0)
    }
}

/// A duration in nanoseconds, mirroring `ns3::Time` closely enough for the
/// EMA/bootstrap arithmetic to read the same as the original model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Duration(pub u64);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub fn from_millis(ms: u64) -> Self {
        Duration(ms * 1_000_000)
    }

    pub fn from_secs(s: u64) -> Self {
        Duration(s * 1_000_000_000)
    }

    pub fn as_nanos(self) -> u64 {
        self.0
    }

    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Duration(d.as_nanos() as u64)
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> Self {
        std::time::Duration::from_nanos(d.0)
    }
}
