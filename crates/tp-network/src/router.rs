//! Routing traits and the default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Trip resolution calls routing through [`IntermodalRouter`], and plan
//! repair through [`PedestrianRouter`], so applications can swap in
//! schedule-aware public-transport routers without touching the stage
//! engine.  [`DijkstraRouter`] covers walking and private vehicles only.
//!
//! # Cost units
//!
//! Internal costs are milliseconds (`u64`) so the heap stays integer-keyed.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tp_core::{EdgeId, ModeSet, Tick};

use crate::network::Network;
use crate::NetworkError;

// ── Trip items ────────────────────────────────────────────────────────────────

/// One leg of a routed trip.
///
/// A leg with an empty `line` is walked; otherwise it is ridden on the
/// vehicle or public-transport line named by `line`.
#[derive(Clone, Debug, PartialEq)]
pub struct TripItem {
    /// Edges traversed, in order.  Empty legs are ignored by consumers.
    pub edges:     Vec<EdgeId>,
    pub line:      String,
    /// Stop at which the leg ends, empty if none.
    pub dest_stop: String,
    /// Vehicle the router expects the agent to board (informational).
    pub intended:  String,
    /// Departure of the intended vehicle.
    pub depart:    Option<Tick>,
}

impl TripItem {
    pub fn walk(edges: Vec<EdgeId>) -> Self {
        Self {
            edges,
            line:      String::new(),
            dest_stop: String::new(),
            intended:  String::new(),
            depart:    None,
        }
    }

    pub fn ride(line: &str, edges: Vec<EdgeId>) -> Self {
        Self { line: line.to_owned(), ..Self::walk(edges) }
    }

    pub fn to_stop(mut self, stop: &str) -> Self {
        self.dest_stop = stop.to_owned();
        self
    }

    pub fn intended(mut self, vehicle: &str, depart: Tick) -> Self {
        self.intended = vehicle.to_owned();
        self.depart   = Some(depart);
        self
    }

    #[inline]
    pub fn is_walk(&self) -> bool {
        self.line.is_empty()
    }
}

/// A private vehicle the router may use for part of the trip.
#[derive(Copy, Clone, Debug)]
pub struct VehicleProposal<'a> {
    pub id:        &'a str,
    pub vclass:    ModeSet,
    pub max_speed: f64,
}

/// Everything an intermodal routing query needs.
#[derive(Clone, Debug)]
pub struct TripRequest<'a> {
    pub origin:      EdgeId,
    pub destination: EdgeId,
    pub depart_pos:  f64,
    pub arrival_pos: f64,
    /// Destination stop name; empty if none.
    pub dest_stop:   &'a str,
    /// Walking speed in m/s.
    pub speed:       f64,
    pub vehicle:     Option<VehicleProposal<'a>>,
    pub modes:       ModeSet,
    pub depart:      Tick,
}

// ── Router traits ─────────────────────────────────────────────────────────────

/// Multimodal path search used to resolve trip stages.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one router can be shared by
/// every agent of a simulation.
pub trait IntermodalRouter: Send + Sync {
    /// Ordered legs from `req.origin` to `req.destination`, or
    /// [`NetworkError::NoRoute`] if none exists.
    fn compute(&self, network: &Network, req: &TripRequest<'_>) -> Result<Vec<TripItem>, NetworkError>;
}

/// Walking-only path search used to repair plans.
pub trait PedestrianRouter: Send + Sync {
    fn compute_walk(
        &self,
        network:     &Network,
        from:        EdgeId,
        to:          EdgeId,
        depart_pos:  f64,
        arrival_pos: f64,
        speed:       f64,
    ) -> Result<Vec<EdgeId>, NetworkError>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Edge-based Dijkstra over the CSR graph.
///
/// Walking uses edges that permit pedestrians; a proposed vehicle is used
/// for the whole trip when its class can reach the destination, otherwise
/// the trip is walked.  Public-transport lines are never proposed.
pub struct DijkstraRouter;

impl IntermodalRouter for DijkstraRouter {
    fn compute(&self, network: &Network, req: &TripRequest<'_>) -> Result<Vec<TripItem>, NetworkError> {
        if let Some(vehicle) = req.vehicle {
            let speed = vehicle.max_speed.max(0.1);
            if let Ok(edges) = dijkstra(network, req.origin, req.destination, vehicle.vclass, speed) {
                return Ok(vec![TripItem::ride(vehicle.id, edges).to_stop(req.dest_stop)]);
            }
        }
        let edges = dijkstra(network, req.origin, req.destination, ModeSet::PEDESTRIAN, req.speed.max(0.1))?;
        Ok(vec![TripItem::walk(edges).to_stop(req.dest_stop)])
    }
}

impl PedestrianRouter for DijkstraRouter {
    fn compute_walk(
        &self,
        network:      &Network,
        from:         EdgeId,
        to:           EdgeId,
        _depart_pos:  f64,
        _arrival_pos: f64,
        speed:        f64,
    ) -> Result<Vec<EdgeId>, NetworkError> {
        dijkstra(network, from, to, ModeSet::PEDESTRIAN, speed.max(0.1))
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Cost of traversing `edge` at `speed` m/s, in milliseconds.
#[inline]
fn edge_cost_ms(network: &Network, edge: EdgeId, speed: f64) -> u64 {
    (network.length(edge) / speed * 1000.0).round() as u64
}

fn dijkstra(
    network: &Network,
    from:    EdgeId,
    to:      EdgeId,
    vclass:  ModeSet,
    speed:   f64,
) -> Result<Vec<EdgeId>, NetworkError> {
    let no_route = || NetworkError::NoRoute {
        from: network.edge_name(from).to_owned(),
        to:   network.edge_name(to).to_owned(),
    };
    if !network.permissions(from).allows(vclass) || !network.permissions(to).allows(vclass) {
        return Err(no_route());
    }
    if from == to {
        return Ok(vec![from]);
    }

    let n = network.edge_count();
    // dist[e] = best known cost (ms) of arriving at the end of edge e.
    let mut dist      = vec![u64::MAX; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    dist[from.index()] = 0;

    // Secondary key EdgeId makes tie-breaking deterministic.
    let mut heap: BinaryHeap<Reverse<(u64, EdgeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, edge))) = heap.pop() {
        if edge == to {
            return Ok(reconstruct(prev_edge, to));
        }
        if cost > dist[edge.index()] {
            continue;
        }
        for next in network.successors(edge) {
            if !network.permissions(next).allows(vclass) {
                continue;
            }
            let new_cost = cost.saturating_add(edge_cost_ms(network, next, speed));
            if new_cost < dist[next.index()] {
                dist[next.index()] = new_cost;
                prev_edge[next.index()] = edge;
                heap.push(Reverse((new_cost, next)));
            }
        }
    }

    Err(no_route())
}

fn reconstruct(prev_edge: Vec<EdgeId>, to: EdgeId) -> Vec<EdgeId> {
    let mut edges = vec![to];
    let mut cur = to;
    while prev_edge[cur.index()] != EdgeId::INVALID {
        cur = prev_edge[cur.index()];
        edges.push(cur);
    }
    edges.reverse();
    edges
}
