//! `ProtocolFacade`: the single entry point a host drives. Ties the routing
//! table, ant state machine, packet cache, seen history and the fuzzy
//! expectation tracker together, exposing the two data-path operations
//! (`route_output`/`route_input`) and dispatch for every inbound control
//! message. Grounded in `anthocnet.cc`'s `RoutingProtocol::RouteOutput` and
//! `RouteInput`.

use crate::address::{Address, Instant, SeqNo};
use crate::ants::messages::{ControlMessage, ForwardAnt, LinkFailureMsg, LinkFailureStatus};
use crate::ants::state_machine::{AntOutcome, AntStateMachine};
use crate::config::Config;
use crate::core::RoutingTable;
use crate::expectation::ExpectationTracker;
use crate::host::traits::RandomSource;
use crate::packet_cache::PacketCache;
use crate::seen_history::SeenHistory;
use crate::trace::{DataDropReason, TraceCounters};

/// Outcome of routing a packet originated locally.
pub enum RouteOutputResult {
    /// A route exists now; send immediately.
    Forward { iface: u32, next_hop: Address },
    /// No route yet; the packet was cached and a forward ant is being sent
    /// to discover one.
    Queued { ant_outcomes: Vec<AntOutcome> },
}

/// Outcome of routing a packet arriving from another node.
pub enum RouteInputResult {
    /// Not for us, not multicast/blackholed, a route exists: forward it.
    Forward { iface: u32, next_hop: Address },
    /// This packet's destination is local; deliver it up the stack.
    Deliver,
    /// No usable route and we are not the origin: the link is pruned and a
    /// failure report goes out.
    Dropped { link_failure: LinkFailureMsg },
    /// Silently discarded (multicast, or blackholed).
    Ignored,
}

pub struct ProtocolFacade<T> {
    pub address: Address,
    pub config: Config,
    pub routing_table: RoutingTable,
    pub cache: PacketCache<T>,
    pub seen: SeenHistory,
    pub expectations: ExpectationTracker,
    pub trace: TraceCounters,
    state_machine: AntStateMachine,
    next_seqno: SeqNo,
}

impl<T> ProtocolFacade<T> {
    pub fn new(address: Address, config: Config) -> Self {
        let routing_table = RoutingTable::new(config.min_pheromone);
        let cache = PacketCache::new(config.dcache_capacity);
        ProtocolFacade {
            address,
            config,
            routing_table,
            cache,
            seen: SeenHistory::new(1024),
            expectations: ExpectationTracker::new(),
            trace: TraceCounters::new(),
            state_machine: AntStateMachine,
            next_seqno: 0,
        }
    }

    fn take_seqno(&mut self) -> SeqNo {
        self.next_seqno += 1;
        self.next_seqno
    }

    /// `RouteOutput`: a packet originated on this node bound for `dest`.
    pub fn route_output(&mut self, dest: Address, payload: T, now: Instant, rng: &dyn RandomSource) -> RouteOutputResult {
        self.routing_table.register_session(dest, now);

        if let Some(route) = self.routing_table.select_route(dest, self.config.cons_beta, rng) {
            if self.config.fuzzy_mode {
                self.expectations.expect(route.next_hop);
            }
            return RouteOutputResult::Forward {
                iface: route.iface,
                next_hop: route.next_hop,
            };
        }

        self.cache.enqueue(dest, payload, 0, now);
        let outcomes = self.start_forward_ant(dest, now, false, rng);
        RouteOutputResult::Queued { ant_outcomes: outcomes }
    }

    /// `RouteInput`: a packet arriving on `iface` from `origin`, not
    /// originated here. On a route miss, a packet this node itself
    /// originated (loopback, or `origin` is this node) is cached to await
    /// discovery just like `route_output`; anything else is a relay this
    /// node can no longer carry, so the link is pruned and reported.
    pub fn route_input(&mut self, origin: Address, dest: Address, payload: T, iface: u32, now: Instant, rng: &dyn RandomSource) -> RouteInputResult {
        if dest.is_multicast() {
            return RouteInputResult::Ignored;
        }
        if dest == self.address {
            return RouteInputResult::Deliver;
        }
        if self.config.blackhole && rng.uniform_f64() < self.config.blackhole_amount {
            return RouteInputResult::Ignored;
        }

        if let Some(route) = self.routing_table.select_route(dest, self.config.cons_beta, rng) {
            if self.config.fuzzy_mode {
                self.expectations.expect(route.next_hop);
            }
            return RouteInputResult::Forward {
                iface: route.iface,
                next_hop: route.next_hop,
            };
        }

        if origin.is_loopback() || origin == self.address {
            self.cache.enqueue(dest, payload, iface, now);
            return RouteInputResult::Ignored;
        }

        self.trace.data_drop(DataDropReason::CacheExpired, dest);
        let mut failure = LinkFailureMsg::new(self.address);
        failure.append(dest, LinkFailureStatus::OnlyValue, 0.0);
        RouteInputResult::Dropped { link_failure: failure }
    }

    /// `StartForwardAnt`: either unicasts via a known (if stale) route or
    /// broadcasts a fresh forward ant.
    pub fn start_forward_ant(&mut self, dest: Address, now: Instant, proactive: bool, rng: &dyn RandomSource) -> Vec<AntOutcome> {
        let seqno = self.take_seqno();
        let budget = if proactive {
            self.config.proactive_bcast_count
        } else {
            self.config.reactive_bcast_count
        };
        let ant = ForwardAnt::new(self.address, dest, self.config.initial_ttl, seqno, budget);
        self.state_machine.handle_forward_ant(
            &mut self.routing_table,
            &mut self.seen,
            &self.trace,
            &self.config,
            rng,
            now,
            self.address,
            0,
            ant,
            proactive,
        )
    }

    /// Dispatches one inbound control message, the way `Recv` demultiplexes
    /// by `TypeHeader`.
    pub fn handle_control_message(&mut self, msg: ControlMessage, iface: u32, now: Instant, rng: &dyn RandomSource) -> Vec<AntOutcome> {
        match msg {
            ControlMessage::Forward { ant, proactive } => self.state_machine.handle_forward_ant(
                &mut self.routing_table,
                &mut self.seen,
                &self.trace,
                &self.config,
                rng,
                now,
                self.address,
                iface,
                ant,
                proactive,
            ),
            ControlMessage::Backward(ant) => {
                self.state_machine.handle_backward_ant(&mut self.routing_table, &self.config, now, ant)
            }
            ControlMessage::Hello(hello) => {
                self.routing_table.add_neighbor(hello.source, now, iface);
                self.state_machine.handle_hello(&mut self.routing_table, &self.config, now, self.address, hello)
            }
            ControlMessage::HelloAck(ack) => {
                self.routing_table.add_neighbor(ack.source, now, iface);
                let sample = self.routing_table.get_t_send(ack.source).unwrap_or(0.0);
                self.state_machine.handle_hello_ack(&mut self.routing_table, &self.config, ack.source, sample);
                vec![]
            }
            ControlMessage::LinkFailure(failure) => {
                self.state_machine.handle_link_failure(&mut self.routing_table, self.address, failure)
            }
        }
    }

    /// Drains anything cached for `dest` once a route has been discovered
    /// for it, dropping stale entries (`SendCachedData`).
    pub fn drain_cache(&mut self, dest: Address, now: Instant) -> (Vec<(T, u32)>, usize) {
        self.cache.drain(dest, now, self.config.dcache_expire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRng(f64);
    impl RandomSource for FixedRng {
        fn uniform_f64(&self) -> f64 {
            self.0
        }
        fn uniform_int(&self, lo: u32, _hi: u32) -> u32 {
            lo
        }
    }

    fn addr(n: u8) -> Address {
        Address::new(10, 0, 0, n)
    }

    #[test]
    fn route_output_without_route_queues_and_searches() {
        let mut facade: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(addr(1), Config::default());
        let rng = FixedRng(0.1);
        let result = facade.route_output(addr(9), vec![1, 2, 3], Instant(0), &rng);
        assert!(matches!(result, RouteOutputResult::Queued { .. }));
        assert!(facade.cache.has_entries(addr(9)));
    }

    #[test]
    fn route_output_with_known_route_forwards_directly() {
        let mut facade: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(addr(1), Config::default());
        facade.routing_table.add_neighbor(addr(2), Instant(0), 0);
        facade.routing_table.update_pheromone(addr(9), addr(2), 0.8, 0.7, 0.9);
        let rng = FixedRng(0.1);
        let result = facade.route_output(addr(9), vec![1], Instant(0), &rng);
        match result {
            RouteOutputResult::Forward { next_hop, .. } => assert_eq!(next_hop, addr(2)),
            _ => panic!("expected forward"),
        }
    }

    #[test]
    fn route_input_for_local_address_delivers() {
        let mut facade: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(addr(1), Config::default());
        let rng = FixedRng(0.1);
        let result = facade.route_input(addr(2), addr(1), vec![], 0, Instant(0), &rng);
        assert!(matches!(result, RouteInputResult::Deliver));
    }

    #[test]
    fn route_input_without_route_prunes_link() {
        let mut facade: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(addr(1), Config::default());
        let rng = FixedRng(0.1);
        let result = facade.route_input(addr(2), addr(9), vec![], 0, Instant(0), &rng);
        assert!(matches!(result, RouteInputResult::Dropped { .. }));
    }

    #[test]
    fn route_input_for_self_originated_packet_caches_instead_of_pruning() {
        let mut facade: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(addr(1), Config::default());
        let rng = FixedRng(0.1);
        let result = facade.route_input(addr(1), addr(9), vec![1], 0, Instant(0), &rng);
        assert!(matches!(result, RouteInputResult::Ignored));
        assert!(facade.cache.has_entries(addr(9)));
    }
}
