//! Reactive-plus-proactive pheromone routing for mobile ad-hoc networks.
//!
//! `core` and `ants` hold the deterministic routing logic: no clock, RNG or
//! socket access, so they run the same way under a unit test or a live
//! node. `host` supplies the real tokio-backed implementations of the
//! traits the core depends on; `facade` is the single entry point a host
//! drives.

pub mod address;
pub mod ants;
pub mod config;
pub mod core;
pub mod error;
pub mod expectation;
pub mod facade;
pub mod host;
pub mod packet_cache;
pub mod seen_history;
pub mod timers;
pub mod trace;

pub use address::{Address, Duration, Instant, SeqNo};
pub use config::Config;
pub use error::{Result, RoutingError};
pub use facade::{ProtocolFacade, RouteInputResult, RouteOutputResult};
