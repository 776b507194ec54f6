//! Ant and hello wire records, described by contract rather than byte
//! layout (spec §1: "wire-header serialization details... treated only as
//! typed records"). `ControlMessage` is what `host::traits::Network` moves
//! between nodes; a real host serializes it with `serde_json` the way the
//! teacher's `network::Message` does, but the `core`/`ants` modules never
//! see bytes.

use crate::address::{Address, SeqNo};
use serde::{Deserialize, Serialize};

/// One-octet type tag in the original wire format (`TypeHeader`). Kept as
/// an explicit enum discriminant so a byte-level codec can be bolted on
/// later without touching the control-message shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AntType {
    HelloMsg = 0,
    HelloAck = 1,
    ForwardAnt = 2,
    ProactiveForwardAnt = 3,
    BackwardAnt = 4,
    LinkFailure = 5,
}

/// A forward ant searching for a route to `destination`. Carried unicast
/// hop by hop, or broadcast when no route is known yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardAnt {
    pub source: Address,
    pub destination: Address,
    pub ttl: u8,
    pub seqno: SeqNo,
    /// Ordered list of nodes the ant has traversed, source first.
    pub visited: Vec<Address>,
    /// Number of times this ant may still be rebroadcast after failing to
    /// find a unicast next hop.
    pub broadcast_budget: u8,
}

impl ForwardAnt {
    pub fn new(source: Address, destination: Address, ttl: u8, seqno: SeqNo, budget: u8) -> Self {
        ForwardAnt {
            source,
            destination,
            ttl,
            seqno,
            visited: vec![source],
            broadcast_budget: budget,
        }
    }

    /// Appends `node` to the visited list and decrements TTL. Returns
    /// `false` (and leaves the ant untouched) if the ant has outlived its
    /// TTL.
    #[must_use]
    pub fn advance(&mut self, node: Address) -> bool {
        if self.ttl == 0 {
            return false;
        }
        self.ttl -= 1;
        self.visited.push(node);
        true
    }

    /// Consumes one unit of broadcast budget, returning whether the ant
    /// may still be rebroadcast.
    #[must_use]
    pub fn consume_broadcast_budget(&mut self) -> bool {
        if self.broadcast_budget == 0 {
            false
        } else {
            self.broadcast_budget -= 1;
            true
        }
    }

    /// Builds the `BackwardAnt` that walks `visited` in reverse, as done
    /// when a `ForwardAnt` reaches its destination.
    pub fn into_backward(self, new_seqno: SeqNo, max_hops: u32) -> BackwardAnt {
        let mut path = self.visited;
        path.reverse();
        BackwardAnt {
            source: self.source,
            destination: self.destination,
            seqno: new_seqno,
            path,
            accumulated_t_ns: 0,
            hops: 0,
            max_hops,
        }
    }
}

/// A backward ant reinforcing the path a `ForwardAnt` discovered. `path` is
/// consumed from the front as the ant walks back toward `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackwardAnt {
    pub source: Address,
    pub destination: Address,
    pub seqno: SeqNo,
    /// Remaining hops toward `source`, nearest first. `path[0]` is always
    /// "this node" immediately after a reinforcement; popping it yields the
    /// next hop to forward to.
    pub path: Vec<Address>,
    pub accumulated_t_ns: u64,
    pub hops: u32,
    pub max_hops: u32,
}

impl BackwardAnt {
    /// The neighbor that relayed this ant to us -- "this" at the head of
    /// the remaining path.
    pub fn this_hop(&self) -> Option<Address> {
        self.path.first().copied()
    }

    /// The next hop toward `source`, after consuming `this_hop`.
    pub fn peek_next(&self) -> Option<Address> {
        self.path.get(1).copied()
    }

    /// Consumes the head of the path and accumulates cost, mirroring the
    /// original `BackwardAntHeader::Update`.
    pub fn advance(&mut self, t_ind_ns: u64) {
        if !self.path.is_empty() {
            self.path.remove(0);
        }
        self.accumulated_t_ns += t_ind_ns;
        self.hops += 1;
    }

    pub fn is_origin_reached(&self) -> bool {
        self.path.is_empty()
    }
}

/// Sign encodes real (+) vs virtual (-) pheromone dominance, per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffusionEntry {
    pub destination: Address,
    /// Positive: real pheromone was the best known value. Negative:
    /// virtual pheromone dominated. Magnitude is the pheromone value.
    pub signed_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelloMsg {
    pub source: Address,
    pub entries: Vec<DiffusionEntry>,
}

/// Unicast acknowledgement of a `HelloMsg`, carrying no payload; the
/// receiver matches it against its own locally remembered last-hello time
/// (see `RoutingTable::process_ack`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HelloAck {
    pub source: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkFailureStatus {
    /// Informational: a route existed and still exists elsewhere.
    Value,
    /// No alternative route to the destination remains.
    OnlyValue,
    /// The previously-best route broke; `new_pheromone` is the best
    /// surviving alternative.
    NewBestValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkFailureUpdate {
    pub destination: Address,
    pub status: LinkFailureStatus,
    pub new_pheromone: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkFailureMsg {
    pub source: Address,
    pub updates: Vec<LinkFailureUpdate>,
}

impl LinkFailureMsg {
    pub fn new(source: Address) -> Self {
        LinkFailureMsg {
            source,
            updates: Vec::new(),
        }
    }

    pub fn append(&mut self, destination: Address, status: LinkFailureStatus, new_pheromone: f64) {
        self.updates.push(LinkFailureUpdate {
            destination,
            status,
            new_pheromone,
        });
    }

    pub fn has_updates(&self) -> bool {
        !self.updates.is_empty()
    }
}

/// Everything that can travel over the wire between two AntHocNet nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlMessage {
    Hello(HelloMsg),
    HelloAck(HelloAck),
    Forward { ant: ForwardAnt, proactive: bool },
    Backward(BackwardAnt),
    LinkFailure(LinkFailureMsg),
}

impl ControlMessage {
    pub fn type_tag(&self) -> AntType {
        match self {
            ControlMessage::Hello(_) => AntType::HelloMsg,
            ControlMessage::HelloAck(_) => AntType::HelloAck,
            ControlMessage::Forward { proactive: false, .. } => AntType::ForwardAnt,
            ControlMessage::Forward { proactive: true, .. } => AntType::ProactiveForwardAnt,
            ControlMessage::Backward(_) => AntType::BackwardAnt,
            ControlMessage::LinkFailure(_) => AntType::LinkFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_ant_ttl_exhaustion() {
        let mut ant = ForwardAnt::new(Address::new(1, 0, 0, 1), Address::new(1, 0, 0, 2), 0, 1, 2);
        assert!(!ant.advance(Address::new(1, 0, 0, 3)));
    }

    #[test]
    fn forward_into_backward_reverses_path() {
        let a = Address::new(1, 0, 0, 1);
        let b = Address::new(1, 0, 0, 2);
        let c = Address::new(1, 0, 0, 3);
        let mut ant = ForwardAnt::new(a, c, 8, 1, 2);
        assert!(ant.advance(b));
        assert!(ant.advance(c));
        let bwant = ant.into_backward(2, 2);
        assert_eq!(bwant.path, vec![c, b, a]);
    }

    #[test]
    fn backward_ant_advance_consumes_head() {
        let mut bwant = BackwardAnt {
            source: Address::new(1, 0, 0, 1),
            destination: Address::new(1, 0, 0, 3),
            seqno: 1,
            path: vec![
                Address::new(1, 0, 0, 3),
                Address::new(1, 0, 0, 2),
                Address::new(1, 0, 0, 1),
            ],
            accumulated_t_ns: 0,
            hops: 0,
            max_hops: 2,
        };
        assert_eq!(bwant.this_hop(), Some(Address::new(1, 0, 0, 3)));
        bwant.advance(1000);
        assert_eq!(bwant.hops, 1);
        assert_eq!(bwant.this_hop(), Some(Address::new(1, 0, 0, 2)));
        assert!(!bwant.is_origin_reached());
    }

    #[test]
    fn serializes_round_trip_as_typed_record() {
        let msg = ControlMessage::LinkFailure(LinkFailureMsg::new(Address::new(1, 0, 0, 1)));
        let json = serde_json::to_string(&msg).unwrap();
        let back: ControlMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
