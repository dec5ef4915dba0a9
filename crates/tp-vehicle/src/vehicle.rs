//! Vehicles as seen by the stage engine.
//!
//! Motion is computed by an external vehicle model; it writes the results
//! back through [`Vehicle::move_to`].  Stages only read position, speed and
//! route progress, and register or remove the transportables on board.

use tp_core::{AgentId, EdgeId, ModeSet, Position, Tick};
use tp_network::Network;

// ── VehicleParams ─────────────────────────────────────────────────────────────

/// How a vehicle decides to leave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DepartProcedure {
    /// At a fixed tick.
    Given(Tick),
    /// As soon as its transportable gets in.
    Triggered,
}

/// Parameters a vehicle is built from.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleParams {
    pub id:     String,
    pub vtype:  String,
    /// Line served; private vehicles use their own id.
    pub line:   String,
    pub depart: DepartProcedure,
}

impl VehicleParams {
    /// A private vehicle that leaves when its owner gets in.
    pub fn triggered(id: &str, vtype: &str) -> Self {
        Self {
            id:     id.to_owned(),
            vtype:  vtype.to_owned(),
            line:   id.to_owned(),
            depart: DepartProcedure::Triggered,
        }
    }

    pub fn scheduled(id: &str, vtype: &str, line: &str, depart: Tick) -> Self {
        Self {
            id:     id.to_owned(),
            vtype:  vtype.to_owned(),
            line:   line.to_owned(),
            depart: DepartProcedure::Given(depart),
        }
    }
}

// ── Vehicle ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Vehicle {
    pub params:      VehicleParams,
    pub vclass:      ModeSet,
    pub max_speed:   f64,
    pub route:       Vec<EdgeId>,
    /// Index into `route` of the edge the vehicle is on.
    pub route_index: usize,
    /// Offset along the current edge (m).
    pub pos_on_edge: f64,
    pub depart_pos:  f64,
    /// Where the vehicle stops on its last edge; `None` means the end.
    pub arrival_pos: Option<f64>,
    /// m/s
    pub speed:       f64,
    /// Radians, mathematical convention.
    pub angle:       f64,
    pub position:    Position,
    /// Agents currently on board, in boarding order.
    pub transportables: Vec<AgentId>,
}

impl Vehicle {
    pub(crate) fn new(params: VehicleParams, vclass: ModeSet, max_speed: f64, route: Vec<EdgeId>) -> Self {
        Self {
            params,
            vclass,
            max_speed,
            route,
            route_index:    0,
            pos_on_edge:    0.0,
            depart_pos:     0.0,
            arrival_pos:    None,
            speed:          0.0,
            angle:          0.0,
            position:       Position::default(),
            transportables: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.params.id
    }

    #[inline]
    pub fn line(&self) -> &str {
        &self.params.line
    }

    /// The edge the vehicle is currently on.
    #[inline]
    pub fn edge(&self) -> EdgeId {
        self.route[self.route_index]
    }

    /// Distance driven along the route since `depart_pos` (m).
    pub fn route_distance(&self, network: &Network) -> f64 {
        let before: f64 = self.route[..self.route_index]
            .iter()
            .map(|&e| network.length(e))
            .sum();
        before - self.depart_pos + self.pos_on_edge
    }

    /// Replace the not yet driven part of the route with `edges`.
    ///
    /// A vehicle still on its first edge takes `edges` wholesale; otherwise
    /// `edges` must start at the current edge.  Returns `false` and leaves
    /// the route untouched if it does not.
    pub fn replace_route(&mut self, edges: &[EdgeId]) -> bool {
        let Some(&first) = edges.first() else {
            return false;
        };
        if self.route_index == 0 {
            self.route = edges.to_vec();
            return true;
        }
        if first != self.edge() {
            return false;
        }
        self.route.truncate(self.route_index);
        self.route.extend_from_slice(edges);
        true
    }

    pub fn set_arrival_pos(&mut self, pos: f64) {
        self.arrival_pos = Some(pos);
    }

    /// Update the kinematic state.  Called by the external vehicle model.
    pub fn move_to(&mut self, route_index: usize, pos_on_edge: f64, position: Position, angle: f64, speed: f64) {
        self.route_index = route_index.min(self.route.len().saturating_sub(1));
        self.pos_on_edge = pos_on_edge;
        self.position    = position;
        self.angle       = angle;
        self.speed       = speed;
    }

    pub fn add_transportable(&mut self, agent: AgentId) {
        if !self.transportables.contains(&agent) {
            self.transportables.push(agent);
        }
    }

    /// Take `agent` off the vehicle.  Returns `false` if it was not on board.
    pub fn remove_transportable(&mut self, agent: AgentId) -> bool {
        let before = self.transportables.len();
        self.transportables.retain(|&a| a != agent);
        self.transportables.len() != before
    }
}
