//! End-to-end scenarios driven through `ProtocolFacade`, covering the
//! concrete scenarios in spec.md §8 that need more than one node's routing
//! table to observe.

use anthocnet::address::{Address, Instant};
use anthocnet::ants::messages::ControlMessage;
use anthocnet::ants::state_machine::AntOutcome;
use anthocnet::config::Config;
use anthocnet::facade::{ProtocolFacade, RouteInputResult, RouteOutputResult};
use anthocnet::host::traits::RandomSource;

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
    Address::new(10, 0, 1, n)
}

/// Scenario 1: A and B are neighbors. Routing to B never emits an ant.
#[test]
fn single_hop_neighbor_forwards_without_discovery() {
    let mut a: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(addr(1), Config::default());
    a.routing_table.add_neighbor(addr(2), Instant(0), 0);
    let rng = FixedRng(0.1);
    let result = a.route_output(addr(2), vec![1, 2, 3], Instant(0), &rng);
    match result {
        RouteOutputResult::Forward { next_hop, .. } => assert_eq!(next_hop, addr(2)),
        RouteOutputResult::Queued { .. } => panic!("a direct neighbor must not trigger ant discovery"),
    }
}

/// Scenario 2: A--B--C line, A sends to C. A broadcasts a forward ant, B
/// (no route yet) relays it to C, C turns it around, B relays the backward
/// ant to A, and A ends up with pheromone toward C via B.
#[test]
fn two_hop_discovery_reinforces_pheromone_at_origin() {
    let a_addr = addr(1);
    let b_addr = addr(2);
    let c_addr = addr(3);
    let rng = FixedRng(0.1);

    let mut a: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(a_addr, Config::default());
    let mut b: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(b_addr, Config::default());
    let mut c: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(c_addr, Config::default());

    a.routing_table.add_neighbor(b_addr, Instant(0), 0);
    b.routing_table.add_neighbor(a_addr, Instant(0), 0);
    b.routing_table.add_neighbor(c_addr, Instant(0), 0);
    c.routing_table.add_neighbor(b_addr, Instant(0), 0);

    assert!(a.routing_table.get_pheromone(c_addr, b_addr).is_none());

    let result = a.route_output(c_addr, b"payload".to_vec(), Instant(0), &rng);
    let outcomes = match result {
        RouteOutputResult::Queued { ant_outcomes } => ant_outcomes,
        RouteOutputResult::Forward { .. } => panic!("A has no route to C yet"),
    };

    let forward_msg = outcomes
        .into_iter()
        .find_map(|o| match o {
            AntOutcome::Broadcast { msg } => Some(msg),
            _ => None,
        })
        .expect("A broadcasts a forward ant searching for C");

    let b_outcomes = b.handle_control_message(forward_msg, 0, Instant(1), &rng);
    let relayed = b_outcomes
        .into_iter()
        .find_map(|o| match o {
            AntOutcome::Send { msg, .. } => Some(msg),
            _ => None,
        })
        .expect("B relays the ant on to C");

    let c_outcomes = c.handle_control_message(relayed, 0, Instant(2), &rng);
    let backward_to_b = c_outcomes
        .into_iter()
        .find_map(|o| match o {
            AntOutcome::Send {
                msg: msg @ ControlMessage::Backward(_),
                ..
            } => Some(msg),
            _ => None,
        })
        .expect("C turns the ant around toward B");

    let b_outcomes = b.handle_control_message(backward_to_b, 0, Instant(3), &rng);
    let backward_to_a = b_outcomes
        .into_iter()
        .find_map(|o| match o {
            AntOutcome::Send {
                msg: msg @ ControlMessage::Backward(_),
                ..
            } => Some(msg),
            _ => None,
        })
        .expect("B relays the backward ant on to A");

    let a_outcomes = a.handle_control_message(backward_to_a, 0, Instant(4), &rng);
    assert!(a_outcomes
        .iter()
        .any(|o| matches!(o, AntOutcome::RouteDiscovered { destination } if *destination == c_addr)));

    assert!(a.routing_table.get_pheromone(c_addr, b_addr).unwrap() > 0.0);

    let (flushed, dropped) = a.drain_cache(c_addr, Instant(4));
    assert_eq!(dropped, 0);
    assert_eq!(flushed.len(), 1);

    // Subsequent data now traverses A -> B directly via pheromone selection.
    let result = a.route_output(c_addr, b"more".to_vec(), Instant(5), &rng);
    match result {
        RouteOutputResult::Forward { next_hop, .. } => assert_eq!(next_hop, b_addr),
        RouteOutputResult::Queued { .. } => panic!("A should now have a pheromone route via B"),
    }
}

/// Scenario 5 at the facade layer: an intermediate node that loses its
/// route for a forwarded packet emits a link-failure report instead of
/// silently dropping it.
#[test]
fn route_input_miss_at_intermediate_emits_link_failure() {
    let mut node: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(addr(2), Config::default());
    let rng = FixedRng(0.1);
    let result = node.route_input(addr(3), addr(9), vec![1, 2, 3], 0, Instant(0), &rng);
    match result {
        RouteInputResult::Dropped { link_failure } => {
            assert_eq!(link_failure.source, addr(2));
            assert!(link_failure.has_updates());
        }
        RouteInputResult::Forward { .. } => panic!("expected no route, but a forward route was selected"),
        RouteInputResult::Deliver => panic!("destination is not local"),
        RouteInputResult::Ignored => panic!("expected a link-failure report, not a silent ignore"),
    }
}

/// Multicast destinations are ignored outright, never cached or relayed.
#[test]
fn multicast_destination_is_ignored() {
    let mut node: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(addr(1), Config::default());
    let rng = FixedRng(0.1);
    let multicast = Address::new(224, 0, 0, 1);
    let result = node.route_input(addr(3), multicast, vec![], 0, Instant(0), &rng);
    assert!(matches!(result, RouteInputResult::Ignored));
}
