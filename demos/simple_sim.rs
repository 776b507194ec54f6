//! Two-node route discovery, driven entirely through `ProtocolFacade`
//! without any real sockets -- useful for eyeballing how a forward ant
//! turns into a backward ant and reinforces a route.

use anthocnet::address::{Address, Instant};
use anthocnet::ants::state_machine::AntOutcome;
use anthocnet::config::Config;
use anthocnet::facade::{ProtocolFacade, RouteOutputResult};
use anthocnet::host::traits::RandomSource;

struct FixedRng(f64);
impl RandomSource for FixedRng {
    fn uniform_f64(&self) -> f64 {
        self.0
    }
    fn uniform_int(&self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            lo
        } else {
            lo
        }
    }
}

fn main() {
    println!("AntHocNet simple simulation: node A discovers a route to node B");

    let a = Address::new(10, 0, 0, 1);
    let b = Address::new(10, 0, 0, 2);
    let rng = FixedRng(0.1);

    let mut node_a: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(a, Config::default());
    let mut node_b: ProtocolFacade<Vec<u8>> = ProtocolFacade::new(b, Config::default());

    node_a.routing_table.add_neighbor(b, Instant(0), 0);
    node_b.routing_table.add_neighbor(a, Instant(0), 0);

    let result = node_a.route_output(b, b"hello".to_vec(), Instant(0), &rng);
    let forward_outcomes = match result {
        RouteOutputResult::Forward { .. } => {
            println!("unexpectedly already had a route");
            return;
        }
        RouteOutputResult::Queued { ant_outcomes } => ant_outcomes,
    };

    for outcome in forward_outcomes {
        if let AntOutcome::Broadcast { msg } = outcome {
            println!("A broadcasts a forward ant searching for B");
            let backward_outcomes = node_b.handle_control_message(msg, 0, Instant(1_000_000), &rng);
            for bw in backward_outcomes {
                if let AntOutcome::Send { msg, .. } = bw {
                    println!("B turns the ant around and sends a backward ant to A");
                    let reinforced = node_a.handle_control_message(msg, 0, Instant(2_000_000), &rng);
                    for r in reinforced {
                        if let AntOutcome::RouteDiscovered { destination } = r {
                            println!("A has a confirmed route to {destination}");
                            let (flushed, dropped) = node_a.drain_cache(destination, Instant(2_000_000));
                            println!("flushed {} cached packet(s), dropped {dropped} stale", flushed.len());
                        }
                    }
                }
            }
        }
    }
}
