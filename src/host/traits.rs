//! The host collaborators named in spec §1 and §6: everything the core
//! engine needs from the simulator/OS substrate but does not implement
//! itself. Kept as small traits so unit tests can supply deterministic fakes
//! instead of real sockets and wall-clock time (spec §9, "Global time").

use crate::address::{Address, Duration, Instant};
use crate::ants::messages::ControlMessage;
use async_trait::async_trait;

/// Monotonic time source. A real host reads the OS clock; tests advance a
/// `FakeClock` by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Uniform random source, matching `rand_uniform_f64`/`rand_uniform_int` of
/// spec §6.
pub trait RandomSource: Send + Sync {
    /// Uniform sample in `[0, 1)`.
    fn uniform_f64(&self) -> f64;
    /// Uniform integer sample in `[lo, hi)`.
    fn uniform_int(&self, lo: u32, hi: u32) -> u32;
}

/// Best-effort datagram delivery to one interface. Wire-header
/// serialization is out of scope for the core (spec §1); the host receives
/// and sends typed `ControlMessage` records, not raw bytes.
#[async_trait]
pub trait Network: Send + Sync {
    async fn send(&self, iface: u32, to: Address, msg: ControlMessage);

    /// Broadcast on every non-loopback interface.
    async fn broadcast(&self, msg: ControlMessage);
}

/// Single-shot timer scheduling, matching `schedule_after` of spec §6.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn schedule_after(&self, delay: Duration, tag: TimerTag);
}

/// Identifies which periodic job a scheduled callback belongs to, so a
/// single `Scheduler` can multiplex the hello/proactive-ant/neighbor-expiry
/// timers described in spec §5 without the core depending on a concrete
/// executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTag {
    Hello,
    ProactiveAnt,
    RoutingTableSweep,
}
