//! Host glue: real implementations of the `Clock`/`RandomSource`/`Network`/
//! `Scheduler` traits on top of tokio, grounded in the teacher's
//! `network::multicast::NetworkManager`.

pub mod tokio_host;
pub mod traits;

pub use traits::{Clock, Network, RandomSource, Scheduler, TimerTag};
