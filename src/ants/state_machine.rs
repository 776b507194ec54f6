//! Drives the control-plane side of the protocol: forward ants, backward
//! ants, hello diffusion and link-failure cascades. Pure and synchronous --
//! every method takes the state it needs to mutate plus an `&dyn
//! RandomSource`, and returns the outcomes a host should carry out, rather
//! than performing I/O itself. Grounded in `anthocnet.cc`'s
//! `HandleForwardAnt`/`HandleBackwardAnt`/`HandleHelloMsg`/
//! `HandleLinkFailure`.

use crate::address::{Address, Instant};
use crate::ants::messages::{BackwardAnt, ControlMessage, ForwardAnt, HelloAck, HelloMsg, LinkFailureMsg};
use crate::config::Config;
use crate::core::RoutingTable;
use crate::host::traits::RandomSource;
use crate::seen_history::SeenHistory;
use crate::trace::{AntDropReason, TraceCounters};

/// What the host should do as a result of processing one control message.
#[derive(Debug, Clone)]
pub enum AntOutcome {
    Send { iface: u32, to: Address, msg: ControlMessage },
    Broadcast { msg: ControlMessage },
    /// A route to `destination` was just confirmed; the facade should try
    /// to flush anything waiting in the packet cache for it.
    RouteDiscovered { destination: Address },
    Dropped,
}

pub struct AntStateMachine;

impl AntStateMachine {
    /// `HandleForwardAnt`: dedup, TTL, blackhole fault injection, arrival
    /// at destination, or continued search.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_forward_ant(
        &self,
        rt: &mut RoutingTable,
        history: &mut SeenHistory,
        trace: &TraceCounters,
        cfg: &Config,
        rng: &dyn RandomSource,
        now: Instant,
        this_node: Address,
        iface: u32,
        mut ant: ForwardAnt,
        proactive: bool,
    ) -> Vec<AntOutcome> {
        if let Some(prev_hop) = ant.visited.last().copied() {
            rt.add_neighbor(prev_hop, now, iface);
        }
        if !history.record(ant.source, ant.seqno) {
            trace.ant_drop(AntDropReason::DuplicateSeen, ant.source, ant.destination);
            return vec![Dropped];
        }
        if !ant.advance(this_node) {
            trace.ant_drop(AntDropReason::TtlExpired, ant.source, ant.destination);
            return vec![Dropped];
        }

        if cfg.blackhole && rng.uniform_f64() < cfg.blackhole_amount {
            return Self::fabricate_backward(&ant, this_node);
        }

        if ant.destination == this_node {
            return Self::turn_around(ant, this_node);
        }

        let beta = if proactive { cfg.prog_beta } else { cfg.cons_beta };
        if let Some(route) = rt.select_route(ant.destination, beta, rng) {
            return vec![Send {
                iface: route.iface,
                to: route.next_hop,
                msg: ControlMessage::Forward { ant, proactive },
            }];
        }

        if ant.consume_broadcast_budget() && rt.is_broadcast_allowed(ant.destination, now) {
            rt.no_broadcast(ant.destination, now, cfg.no_broadcast);
            return vec![Broadcast {
                msg: ControlMessage::Forward { ant, proactive },
            }];
        }

        if let Some(route) = rt.select_random_route(rng) {
            return vec![Send {
                iface: route.iface,
                to: route.next_hop,
                msg: ControlMessage::Forward { ant, proactive },
            }];
        }

        trace.ant_drop(AntDropReason::NoRouteNoBudget, ant.source, ant.destination);
        vec![Dropped]
    }

    /// Builds the backward ant as if `this_node` were the destination,
    /// without having actually reached it -- the blackhole fault model.
    fn fabricate_backward(ant: &ForwardAnt, this_node: Address) -> Vec<AntOutcome> {
        Self::turn_around(ant.clone(), this_node)
    }

    fn turn_around(ant: ForwardAnt, this_node: Address) -> Vec<AntOutcome> {
        let seqno = ant.seqno;
        let max_hops = ant.visited.len() as u32;
        let mut bwant = ant.into_backward(seqno, max_hops);
        debug_assert_eq!(bwant.this_hop(), Some(this_node));
        bwant.advance(0);
        match bwant.this_hop() {
            Some(next) => vec![Send {
                iface: 0,
                to: next,
                msg: ControlMessage::Backward(bwant),
            }],
            None => vec![Dropped],
        }
    }

    /// `HandleBackwardAnt`: reinforces the hop it just traversed and either
    /// forwards it on toward the origin or, once the origin is reached,
    /// signals the facade to drain its packet cache.
    pub fn handle_backward_ant(
        &self,
        rt: &mut RoutingTable,
        cfg: &Config,
        now: Instant,
        mut ant: BackwardAnt,
    ) -> Vec<AntOutcome> {
        let Some(nb) = ant.this_hop() else {
            return vec![Dropped];
        };
        rt.add_neighbor(nb, now, 0);

        let t_ind_ns = rt
            .get_t_send(nb)
            .filter(|_| !cfg.snr_cost_metric)
            .unwrap_or(cfg.t_hop * 1_000_000.0);

        ant.advance(t_ind_ns as u64);
        Self::reinforce_from_backward(rt, cfg, ant.destination, nb, ant.accumulated_t_ns, ant.hops);

        if ant.is_origin_reached() {
            return vec![RouteDiscovered {
                destination: ant.destination,
            }];
        }

        match ant.this_hop() {
            Some(next) => vec![Send {
                iface: 0,
                to: next,
                msg: ControlMessage::Backward(ant),
            }],
            None => vec![Dropped],
        }
    }

    /// `ProcessBackwardAnt`'s cost function:
    /// `T_id = ((T_sd / 1e6) + hops * t_hop) / 2`, pheromone reinforcement
    /// is the reciprocal so that cheaper paths get a stronger pheromone.
    fn reinforce_from_backward(
        rt: &mut RoutingTable,
        cfg: &Config,
        destination: Address,
        nb: Address,
        accumulated_t_ns: u64,
        hops: u32,
    ) {
        let t_sd = accumulated_t_ns as f64;
        let t_id = ((t_sd / 1_000_000.0) + (hops as f64) * cfg.t_hop) / 2.0;
        let reinforcement = 1.0 / t_id.max(1e-6);
        rt.update_pheromone(destination, nb, reinforcement, cfg.gamma, cfg.alpha);
        rt.update_avr_hops(destination, nb, hops as f64, cfg.alpha_pheromone);
    }

    /// `HandleHelloMsg`: folds diffusion entries into virtual pheromone and
    /// unicasts an ack, unless SNR is being used as the cost metric (in
    /// which case the original skips acking entirely).
    pub fn handle_hello(&self, rt: &mut RoutingTable, cfg: &Config, now: Instant, this_node: Address, hello: HelloMsg) -> Vec<AntOutcome> {
        let from = hello.source;
        rt.handle_hello_msg(&hello, now, cfg.t_hop * 1_000_000.0);
        if cfg.snr_cost_metric {
            vec![]
        } else {
            vec![Send {
                iface: 0,
                to: from,
                msg: ControlMessage::HelloAck(HelloAck { source: this_node }),
            }]
        }
    }

    /// `ProcessAck`: feeds the per-neighbor send-delay EMA.
    pub fn handle_hello_ack(&self, rt: &mut RoutingTable, cfg: &Config, from: Address, sample_ns: f64) {
        rt.process_ack(from, sample_ns, cfg.eta_value);
    }

    /// `HandleLinkFailure`: applies the inbound report and rebroadcasts the
    /// cascade if this node itself lost its last route to anything as a
    /// result.
    pub fn handle_link_failure(&self, rt: &mut RoutingTable, own: Address, msg: LinkFailureMsg) -> Vec<AntOutcome> {
        let cascade = rt.process_link_failure_msg(own, &msg);
        if cascade.has_updates() {
            vec![Broadcast {
                msg: ControlMessage::LinkFailure(cascade),
            }]
        } else {
            vec![]
        }
    }
}

use AntOutcome::{Broadcast, Dropped, RouteDiscovered, Send};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::ants::messages::ForwardAnt;

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
    fn duplicate_forward_ant_is_dropped() {
        let sm = AntStateMachine;
        let mut rt = RoutingTable::new(0.001);
        let mut history = SeenHistory::new(16);
        let trace = TraceCounters::new();
        let cfg = Config::default();
        let rng = FixedRng(0.1);
        let ant = ForwardAnt::new(addr(1), addr(9), 8, 1, 2);
        history.record(addr(1), 1);
        let outcomes = sm.handle_forward_ant(&mut rt, &mut history, &trace, &cfg, &rng, Instant(0), addr(2), 0, ant, false);
        assert!(matches!(outcomes[0], AntOutcome::Dropped));
        assert_eq!(trace.ant_drop_count(), 1);
    }

    #[test]
    fn forward_ant_reaching_destination_turns_around() {
        let sm = AntStateMachine;
        let mut rt = RoutingTable::new(0.001);
        let mut history = SeenHistory::new(16);
        let trace = TraceCounters::new();
        let cfg = Config::default();
        let rng = FixedRng(0.1);
        let ant = ForwardAnt::new(addr(1), addr(2), 8, 1, 2);
        let outcomes = sm.handle_forward_ant(&mut rt, &mut history, &trace, &cfg, &rng, Instant(0), addr(2), 0, ant, false);
        match &outcomes[0] {
            AntOutcome::Send { to, msg: ControlMessage::Backward(_), .. } => {
                assert_eq!(*to, addr(1));
            }
            other => panic!("expected backward send, got {other:?}"),
        }
    }

    #[test]
    fn backward_ant_at_origin_signals_route_discovered() {
        let sm = AntStateMachine;
        let mut rt = RoutingTable::new(0.001);
        let cfg = Config::default();
        let bwant = BackwardAnt {
            source: addr(1),
            destination: addr(2),
            seqno: 1,
            path: vec![addr(1)],
            accumulated_t_ns: 0,
            hops: 0,
            max_hops: 1,
        };
        let outcomes = sm.handle_backward_ant(&mut rt, &cfg, Instant(0), bwant);
        assert!(matches!(
            outcomes[0],
            AntOutcome::RouteDiscovered { destination } if destination == addr(2)
        ));
        assert!(rt.has_neighbor(addr(1)));
    }
}
