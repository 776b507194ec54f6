//! Deterministic routing state: neighbors, destinations, pheromone and the
//! selection/diffusion/failure algorithms built on top. Nothing in this
//! module touches the clock, RNG or network directly -- callers inject
//! `Instant`s and an `&dyn RandomSource`, keeping it synchronously testable.

pub mod destination;
pub mod neighbor;
pub mod pheromone;
pub mod routing_table;

pub use destination::DestinationInfo;
pub use neighbor::NeighborInfo;
pub use pheromone::PheromoneEntry;
pub use routing_table::{RouteKind, RoutingTable, SelectedRoute};
