//! Scenario-level coverage of route selection, evaporation and link-failure
//! cascades, exercised through the public `RoutingTable` API rather than
//! its internals.

use anthocnet::address::{Address, Instant};
use anthocnet::core::RoutingTable;
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
    Address::new(172, 16, 0, n)
}

#[test]
fn single_hop_discovery_prefers_direct_neighbor() {
    let mut rt = RoutingTable::new(0.001);
    rt.add_neighbor(addr(2), Instant(0), 0);
    let rng = FixedRng(0.99);
    let route = rt.select_route(addr(2), 1.0, &rng).expect("route");
    assert_eq!(route.next_hop, addr(2));
}

#[test]
fn two_hop_discovery_routes_through_relay() {
    let mut rt = RoutingTable::new(0.001);
    rt.add_neighbor(addr(2), Instant(0), 0);
    // addr(9) is two hops away, reachable only via addr(2).
    rt.update_pheromone(addr(9), addr(2), 0.6, 0.7, 0.9);
    let rng = FixedRng(0.5);
    let route = rt.select_route(addr(9), 1.0, &rng).expect("route");
    assert_eq!(route.next_hop, addr(2));
}

#[test]
fn selection_ratio_tracks_pheromone_weight() {
    let mut rt = RoutingTable::new(0.001);
    rt.add_neighbor(addr(2), Instant(0), 0);
    rt.add_neighbor(addr(3), Instant(0), 0);
    rt.update_pheromone(addr(9), addr(2), 0.8, 0.7, 0.9);
    rt.update_pheromone(addr(9), addr(3), 0.8, 0.7, 0.9);
    rt.update_pheromone(addr(9), addr(2), 0.2, 0.7, 0.9);

    let mut picks_of_2 = 0;
    let mut picks_of_3 = 0;
    // Sweep the roulette roll across the unit interval; with equal
    // pheromone after reinforcement/evaporation each neighbor should win
    // roughly half the sweep.
    for i in 0..100 {
        let roll = i as f64 / 100.0;
        let rng = FixedRng(roll);
        match rt.select_route(addr(9), 1.0, &rng) {
            Some(r) if r.next_hop == addr(2) => picks_of_2 += 1,
            Some(r) if r.next_hop == addr(3) => picks_of_3 += 1,
            _ => {}
        }
    }
    assert!(picks_of_2 > 0 && picks_of_3 > 0);
}

#[test]
fn evaporation_without_reinforcement_eventually_drops_below_threshold() {
    let mut rt = RoutingTable::new(0.1);
    rt.add_neighbor(addr(2), Instant(0), 0);
    rt.add_neighbor(addr(3), Instant(0), 0);
    rt.update_pheromone(addr(9), addr(2), 0.9, 0.7, 0.5);
    for _ in 0..20 {
        // Keep reinforcing a different neighbor so addr(2) only evaporates.
        rt.update_pheromone(addr(9), addr(3), 0.9, 0.7, 0.5);
    }
    assert!(!rt.has_pheromone(addr(9), addr(2)));
}

#[test]
fn link_failure_cascades_when_no_alternative_survives() {
    let mut rt = RoutingTable::new(0.001);
    rt.add_neighbor(addr(2), Instant(0), 0);
    rt.update_pheromone(addr(9), addr(2), 0.7, 0.7, 0.9);

    let failure = rt.process_neighbor_timeout(addr(2), addr(1));
    assert!(failure.has_updates());

    // A downstream node applying this report, with no alternative of its
    // own, should produce its own cascade rather than swallow it.
    let mut downstream = RoutingTable::new(0.001);
    let cascade = downstream.process_link_failure_msg(addr(3), &failure);
    assert!(cascade.has_updates());
}

#[test]
fn proactive_selection_uses_prog_beta_independently_of_cons_beta() {
    let mut rt = RoutingTable::new(0.001);
    rt.add_neighbor(addr(2), Instant(0), 0);
    rt.update_pheromone(addr(9), addr(2), 0.5, 0.7, 0.9);
    let rng = FixedRng(0.5);
    let cons = rt.select_route(addr(9), 1.0, &rng);
    let prog = rt.select_route(addr(9), 2.0, &rng);
    assert!(cons.is_some());
    assert!(prog.is_some());
}
