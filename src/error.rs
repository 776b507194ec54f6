//! Error types for the routing engine and its host glue.
//!
//! Per the protocol's error-handling design, nothing in `core`/`ants` ever
//! returns `Err` for a protocol-level condition (malformed packet, no route,
//! duplicate ant) -- those are local and recoverable, surfaced through
//! `Option`/`bool` returns or a trace event. `RoutingError` is reserved for
//! genuine host/setup failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("host I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode control message: {0}")]
    Codec(String),
}

pub type Result<T> = std::result::Result<T, RoutingError>;
