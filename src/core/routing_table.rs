//! The routing table: neighbor/destination bookkeeping, pheromone storage
//! and the route-selection, hello-diffusion and link-failure algorithms
//! built on top of it. Grounded throughout on `anthocnet-rtable.cc`'s
//! `RoutingTable` class; this is the single largest component, matching the
//! original's own proportions.

use std::collections::HashMap;

use crate::address::{Address, Duration, Instant};
use crate::ants::messages::{DiffusionEntry, HelloMsg, LinkFailureMsg, LinkFailureStatus};
use crate::core::destination::DestinationInfo;
use crate::core::neighbor::NeighborInfo;
use crate::core::pheromone::PheromoneEntry;
use crate::host::traits::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// The destination is a direct neighbor; no pheromone lookup needed.
    DirectNeighbor,
    /// Routed via pheromone selection through `next_hop`.
    Selected,
}

#[derive(Debug, Clone, Copy)]
pub struct SelectedRoute {
    pub next_hop: Address,
    pub iface: u32,
    pub kind: RouteKind,
}

pub struct RoutingTable {
    neighbors: HashMap<Address, NeighborInfo>,
    destinations: HashMap<Address, DestinationInfo>,
    /// destination -> neighbor -> pheromone entry.
    pheromones: HashMap<Address, HashMap<Address, PheromoneEntry>>,
    min_pheromone: f64,
}

impl RoutingTable {
    pub fn new(min_pheromone: f64) -> Self {
        RoutingTable {
            neighbors: HashMap::new(),
            destinations: HashMap::new(),
            pheromones: HashMap::new(),
            min_pheromone,
        }
    }

    // -- neighbors --------------------------------------------------

    pub fn add_neighbor(&mut self, addr: Address, now: Instant, iface: u32) {
        self.neighbors
            .entry(addr)
            .and_modify(|n| n.touch(now, iface))
            .or_insert_with(|| NeighborInfo::new(now, iface));
    }

    pub fn has_neighbor(&self, addr: Address) -> bool {
        self.neighbors.contains_key(&addr)
    }

    pub fn update_neighbor(&mut self, addr: Address, now: Instant, iface: u32) {
        self.add_neighbor(addr, now, iface);
    }

    pub fn neighbor_mut(&mut self, addr: Address) -> Option<&mut NeighborInfo> {
        self.neighbors.get_mut(&addr)
    }

    /// Drops a neighbor and every pheromone entry routed through it,
    /// mirroring `RemoveNeighbor`'s pheromone cascade.
    pub fn remove_neighbor(&mut self, addr: Address) {
        self.neighbors.remove(&addr);
        for per_dest in self.pheromones.values_mut() {
            per_dest.remove(&addr);
        }
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    // -- destinations -------------------------------------------------

    pub fn add_destination(&mut self, addr: Address, now: Instant) {
        self.destinations
            .entry(addr)
            .or_insert_with(|| DestinationInfo::new(now));
    }

    pub fn remove_destination(&mut self, addr: Address) {
        self.destinations.remove(&addr);
        self.pheromones.remove(&addr);
    }

    pub fn register_session(&mut self, addr: Address, now: Instant) {
        self.add_destination(addr, now);
        self.destinations.get_mut(&addr).unwrap().register_session(now);
    }

    /// Destinations with a live session, as sampled by the proactive-ant
    /// timer (`PrAntTimerExpire` calls `GetSessions()`).
    pub fn active_sessions(&self, now: Instant, session_expire: Duration) -> Vec<Address> {
        self.destinations
            .iter()
            .filter(|(_, d)| d.is_session_active(now, session_expire))
            .map(|(addr, _)| *addr)
            .collect()
    }

    /// `IsBroadcastAllowed`: a destination seen here for the first time is
    /// created and denied outright, rate-limiting the initial flood from a
    /// node with no prior context on it; once the destination exists, the
    /// normal `no_broadcast` cooldown window applies.
    pub fn is_broadcast_allowed(&mut self, addr: Address, now: Instant) -> bool {
        let existed = self.destinations.contains_key(&addr);
        self.add_destination(addr, now);
        existed && self.destinations.get(&addr).unwrap().is_broadcast_allowed(now)
    }

    pub fn no_broadcast(&mut self, addr: Address, now: Instant, no_broadcast: Duration) {
        self.add_destination(addr, now);
        self.destinations
            .get_mut(&addr)
            .unwrap()
            .suppress_broadcast(now, no_broadcast);
    }

    // -- pheromone ------------------------------------------------------

    pub fn has_pheromone(&self, dest: Address, nb: Address) -> bool {
        self.pheromones
            .get(&dest)
            .and_then(|m| m.get(&nb))
            .map(|p| p.effective() > self.min_pheromone)
            .unwrap_or(false)
    }

    pub fn get_pheromone(&self, dest: Address, nb: Address) -> Option<f64> {
        self.pheromones.get(&dest).and_then(|m| m.get(&nb)).map(|p| p.effective())
    }

    pub fn set_pheromone(&mut self, dest: Address, nb: Address, value: f64) {
        let entry = self
            .pheromones
            .entry(dest)
            .or_default()
            .entry(nb)
            .or_insert_with(PheromoneEntry::new);
        entry.pheromone = value;
        entry.has_real = true;
    }

    /// Reinforces `nb` toward `dest` and evaporates every other neighbor
    /// known for that destination -- `UpdatePheromone` in the original.
    pub fn update_pheromone(&mut self, dest: Address, nb: Address, reinforcement: f64, gamma: f64, alpha: f64) {
        let per_dest = self.pheromones.entry(dest).or_default();
        for (addr, entry) in per_dest.iter_mut() {
            if *addr == nb {
                entry.reinforce(reinforcement, gamma);
            } else {
                entry.evaporate(alpha);
            }
        }
        if !per_dest.contains_key(&nb) {
            per_dest.entry(nb).or_insert_with(PheromoneEntry::new).reinforce(reinforcement, gamma);
        }
    }

    pub fn update_avr_hops(&mut self, dest: Address, nb: Address, hops: f64, alpha_pheromone: f64) {
        self.pheromones
            .entry(dest)
            .or_default()
            .entry(nb)
            .or_insert_with(PheromoneEntry::new)
            .update_avr_hops(hops, alpha_pheromone);
    }

    /// Sum of `pheromone^beta` over every usable neighbor for `dest`,
    /// the denominator of the random-proportional selection rule.
    fn sum_probability(&self, dest: Address, beta: f64) -> f64 {
        self.pheromones
            .get(&dest)
            .map(|m| {
                m.values()
                    .filter(|p| p.effective() > self.min_pheromone)
                    .map(|p| p.effective().powf(beta))
                    .sum()
            })
            .unwrap_or(0.0)
    }

    /// Random-proportional (roulette-wheel) route selection, matching
    /// `SelectRoute`: neighbors that are the destination short-circuit,
    /// otherwise weigh candidates by `pheromone^beta / sum`.
    pub fn select_route(
        &self,
        dest: Address,
        beta: f64,
        rng: &dyn RandomSource,
    ) -> Option<SelectedRoute> {
        if let Some(nb) = self.neighbors.get(&dest) {
            return Some(SelectedRoute {
                next_hop: dest,
                iface: nb.iface,
                kind: RouteKind::DirectNeighbor,
            });
        }

        let total = self.sum_probability(dest, beta);
        if total <= 0.0 {
            return None;
        }

        let per_dest = self.pheromones.get(&dest)?;
        let roll = rng.uniform_f64() * total;
        let mut cumulative = 0.0;
        for (addr, entry) in per_dest.iter() {
            if entry.effective() <= self.min_pheromone {
                continue;
            }
            cumulative += entry.effective().powf(beta);
            if cumulative >= roll {
                let iface = self.neighbors.get(addr).map(|n| n.iface).unwrap_or(0);
                return Some(SelectedRoute {
                    next_hop: *addr,
                    iface,
                    kind: RouteKind::Selected,
                });
            }
        }
        None
    }

    /// Uniform pick among the current neighbor set, used as a last resort
    /// when the pheromone path is empty and broadcast budget is exhausted
    /// or suppressed (`SelectRandomRoute`, which takes no destination and
    /// has no notion of an already-usable pheromone entry).
    pub fn select_random_route(&self, rng: &dyn RandomSource) -> Option<SelectedRoute> {
        let candidates: Vec<Address> = self.neighbors.keys().copied().collect();
        if candidates.is_empty() {
            return None;
        }
        let idx = rng.uniform_int(0, candidates.len() as u32) as usize;
        let addr = candidates[idx];
        let iface = self.neighbors.get(&addr).map(|n| n.iface).unwrap_or(0);
        Some(SelectedRoute {
            next_hop: addr,
            iface,
            kind: RouteKind::Selected,
        })
    }

    /// Whether an alternative next hop besides `exclude` still exists for
    /// `dest`, and the best such alternative's pheromone -- `IsOnly`.
    pub fn best_alternative(&self, dest: Address, exclude: Address) -> (bool, f64) {
        match self.pheromones.get(&dest) {
            None => (false, 0.0),
            Some(m) => {
                let mut best = 0.0;
                let mut has_alt = false;
                for (addr, entry) in m.iter() {
                    if *addr == exclude {
                        continue;
                    }
                    if entry.effective() > self.min_pheromone {
                        has_alt = true;
                        if entry.effective() > best {
                            best = entry.effective();
                        }
                    }
                }
                (has_alt, best)
            }
        }
    }

    /// Records a per-neighbor send-delay sample, feeding `NeighborInfo`'s
    /// EMA (`ProcessAck`/`GetTSend`).
    pub fn process_ack(&mut self, nb: Address, sample_ns: f64, eta_value: f64) {
        if let Some(n) = self.neighbors.get_mut(&nb) {
            n.record_send_delay(sample_ns, eta_value);
        }
    }

    pub fn get_t_send(&self, nb: Address) -> Option<f64> {
        self.neighbors.get(&nb).map(|n| n.avr_t_send)
    }

    // -- hello diffusion --------------------------------------------------

    /// Picks up to `count` destinations weighted by `|best pheromone|` and
    /// signs each entry +real/-virtual, the way `ConstructHelloMsg` does.
    pub fn construct_hello_msg(&self, source: Address, count: usize) -> HelloMsg {
        let mut candidates: Vec<(Address, f64, bool)> = self
            .pheromones
            .iter()
            .filter_map(|(dest, m)| {
                m.values()
                    .filter(|p| p.effective() > self.min_pheromone)
                    .map(|p| (p.effective(), p.has_real))
                    .fold(None, |acc: Option<(f64, bool)>, (v, real)| match acc {
                        Some((best, best_real)) if best >= v => Some((best, best_real)),
                        _ => Some((v, real)),
                    })
                    .map(|(best, real)| (*dest, best, real))
            })
            .collect();

        candidates.sort_by(|a, b| b.1.abs().partial_cmp(&a.1.abs()).unwrap());
        candidates.truncate(count);

        let entries = candidates
            .into_iter()
            .map(|(destination, value, is_real)| DiffusionEntry {
                destination,
                signed_value: if is_real { value } else { -value },
            })
            .collect();

        HelloMsg { source, entries }
    }

    /// Folds an inbound hello's diffusion entries into virtual pheromone,
    /// bootstrapping each against `T_id`, the current per-send cost
    /// estimate to the sender (falling back to `default_t_id` -- one hop
    /// at `t_hop` cost -- before any real sample has been taken). Only the
    /// virtual value is ever touched here; real pheromone comes
    /// exclusively from backward ants.
    ///
    /// TODO: original `HandleHelloMsg` leaves a note that a negatively
    /// signed (virtual-dominant) entry might also warrant bumping real
    /// pheromone in some cases; left unresolved upstream, so we keep the
    /// conservative virtual-only update here too.
    pub fn handle_hello_msg(&mut self, msg: &HelloMsg, now: Instant, default_t_id: f64) {
        self.add_neighbor(msg.source, now, 0);
        let t_id = self
            .neighbors
            .get(&msg.source)
            .map(|n| n.avr_t_send)
            .filter(|v| *v > 0.0)
            .unwrap_or(default_t_id);
        for entry in &msg.entries {
            let ph = entry.signed_value.abs();
            self.pheromones
                .entry(entry.destination)
                .or_default()
                .entry(msg.source)
                .or_insert_with(PheromoneEntry::new)
                .bootstrap_virtual(ph, t_id);
        }
    }

    // -- failure handling -------------------------------------------------

    /// Builds the cascade message sent when a neighbor has timed out,
    /// mirroring `ProcessNeighborTimeout`: for every destination reachable
    /// only through `failed`, try to promote an alternative; otherwise
    /// report the best surviving alternative, or that none remains.
    pub fn process_neighbor_timeout(&mut self, failed: Address, source: Address) -> LinkFailureMsg {
        let mut msg = LinkFailureMsg::new(source);
        let affected: Vec<Address> = self
            .pheromones
            .iter()
            .filter(|(_, m)| m.contains_key(&failed))
            .map(|(dest, _)| *dest)
            .collect();

        for dest in affected {
            let (has_alt, best) = self.best_alternative(dest, failed);
            if has_alt {
                msg.append(dest, LinkFailureStatus::Value, best);
            } else {
                msg.append(dest, LinkFailureStatus::OnlyValue, 0.0);
            }
        }

        self.remove_neighbor(failed);
        msg
    }

    /// Applies an inbound link-failure report, per `ProcessLinkFailureMsg`,
    /// and builds the cascade to propagate further if this node is now
    /// itself out of routes for any affected destination.
    pub fn process_link_failure_msg(&mut self, own: Address, msg: &LinkFailureMsg) -> LinkFailureMsg {
        let mut cascade = LinkFailureMsg::new(own);
        for update in &msg.updates {
            match update.status {
                LinkFailureStatus::Value => {
                    // Informational only; no local state change required.
                }
                LinkFailureStatus::OnlyValue => {
                    if let Some(m) = self.pheromones.get_mut(&update.destination) {
                        m.remove(&msg.source);
                    }
                    let (has_alt, best) = self.best_alternative(update.destination, msg.source);
                    if has_alt {
                        cascade.append(update.destination, LinkFailureStatus::Value, best);
                    } else {
                        cascade.append(update.destination, LinkFailureStatus::OnlyValue, 0.0);
                    }
                }
                LinkFailureStatus::NewBestValue => {
                    // TODO: upstream leaves this branch commented out
                    // entirely (unresolved open question: whether the
                    // reporting neighbor's entry should be replaced with
                    // `new_pheromone` or merely capped by it). We apply it
                    // as a cap, the least surprising reading of "new best
                    // value", pending a documented decision.
                    if let Some(entry) = self
                        .pheromones
                        .entry(update.destination)
                        .or_default()
                        .get_mut(&msg.source)
                    {
                        if entry.effective() > update.new_pheromone {
                            entry.pheromone = update.new_pheromone;
                        }
                    }
                }
            }
        }
        cascade
    }

    /// Sweeps expired neighbors and destinations. Returns the neighbors
    /// that timed out so the caller can broadcast failure reports for each.
    pub fn update(&mut self, now: Instant, nb_expire: Duration, dst_expire: Duration) -> Vec<Address> {
        let expired_neighbors: Vec<Address> = self
            .neighbors
            .iter()
            .filter(|(_, n)| n.is_expired(now, nb_expire))
            .map(|(addr, _)| *addr)
            .collect();

        // TODO: original evaporates pheromone on a fixed timer tick rather
        // than only on reinforcement events; we currently evaporate only in
        // `update_pheromone`'s per-event pass. Left unresolved pending
        // clarification of which cadence the spec intends.
        self.destinations.retain(|_, d| !d.is_expired(now, dst_expire));

        expired_neighbors
    }
}
