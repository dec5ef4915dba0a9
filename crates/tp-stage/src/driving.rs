//! Riding a vehicle.
//!
//! A driving stage starts out **waiting**: the agent stands where the
//! previous stage left it until a vehicle serving one of its lines picks it
//! up.  From then on position and speed are the vehicle's.  The distance
//! ridden is measured from the vehicle's route progress, not estimated.

use std::collections::BTreeSet;

use tp_core::{AgentId, EdgeId, ModeSet, Position, StopId, Tick};
use tp_network::Network;
use tp_vehicle::Vehicle;

use crate::stage::{describe_target, roadside_angle, roadside_position};
use crate::{Previous, RouteEntry, SimView, StageContext, StageCore, TripInfo};

#[derive(Clone, Debug)]
pub struct DrivingStage {
    pub(crate) core: StageCore,
    /// Lines (or private vehicle ids) the agent accepts.
    lines:   BTreeSet<String>,
    /// Vehicle the agent rides; `None` while waiting.
    vehicle: Option<String>,
    vehicle_line:   String,
    vehicle_vclass: ModeSet,
    /// Route progress at boarding.
    vehicle_distance: Option<f64>,
    /// Distance ridden, fixed when the ride ends.
    ridden: Option<f64>,
    boarded: Option<Tick>,

    waiting_edge:  EdgeId,
    waiting_pos:   f64,
    stop_wait_pos: Option<Position>,

    intended_vehicle: String,
    intended_depart:  Option<Tick>,
}

impl DrivingStage {
    pub fn new<I, S>(destination: EdgeId, to_stop: Option<StopId>, arrival_pos: f64, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            core: StageCore::new(destination, to_stop, arrival_pos),
            lines: lines.into_iter().map(Into::into).collect(),
            vehicle: None,
            vehicle_line: String::new(),
            vehicle_vclass: ModeSet::IGNORING,
            vehicle_distance: None,
            ridden: None,
            boarded: None,
            waiting_edge: EdgeId::INVALID,
            waiting_pos: 0.0,
            stop_wait_pos: None,
            intended_vehicle: String::new(),
            intended_depart: None,
        }
    }

    /// The vehicle the router expected the agent to board.  Informational.
    pub fn with_intended(mut self, vehicle: &str, depart: Option<Tick>) -> Self {
        self.intended_vehicle = vehicle.to_owned();
        self.intended_depart  = depart;
        self
    }

    /// Where the agent boards when the ride opens a plan.  Otherwise the
    /// previous stage decides.
    pub fn with_origin(mut self, edge: EdgeId) -> Self {
        self.waiting_edge = edge;
        self
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    #[inline]
    pub fn vehicle_id(&self) -> Option<&str> {
        self.vehicle.as_deref()
    }

    #[inline]
    pub fn is_waiting_for_vehicle(&self) -> bool {
        self.vehicle.is_none()
    }

    pub fn is_waiting_for(&self, line: &str) -> bool {
        self.lines.contains(line)
    }

    #[inline]
    pub fn from_edge(&self) -> EdgeId {
        self.waiting_edge
    }

    #[inline]
    pub fn vehicle_line(&self) -> &str {
        &self.vehicle_line
    }

    #[inline]
    pub fn vehicle_vclass(&self) -> ModeSet {
        self.vehicle_vclass
    }

    /// Distance ridden, once arrived.
    #[inline]
    pub fn vehicle_distance(&self) -> Option<f64> {
        if self.core.arrived.is_some() { self.ridden } else { None }
    }

    #[inline]
    pub fn intended_vehicle(&self) -> &str {
        &self.intended_vehicle
    }

    #[inline]
    pub fn intended_depart(&self) -> Option<Tick> {
        self.intended_depart
    }

    /// Bind to `vehicle` at `now`.  The caller puts the agent on board.
    pub fn set_vehicle(&mut self, vehicle: &Vehicle, network: &Network, now: Tick) {
        self.vehicle          = Some(vehicle.id().to_owned());
        self.vehicle_line     = vehicle.line().to_owned();
        self.vehicle_vclass   = vehicle.vclass;
        self.vehicle_distance = Some(vehicle.route_distance(network));
        self.ridden           = None;
        self.boarded          = Some(now);
    }

    /// Fix the distance ridden from `vehicle`'s final route progress.  Used
    /// when the vehicle leaves the registry before the ride is finished.
    pub fn settle_distance(&mut self, vehicle: &Vehicle, network: &Network) {
        if let Some(at_boarding) = self.vehicle_distance {
            self.ridden = Some(vehicle.route_distance(network) - at_boarding);
        }
    }

    /// Redirect the ride.  With a stop, the target position becomes the
    /// stop's midpoint.
    pub fn set_destination(&mut self, network: &Network, destination: EdgeId, stop: Option<StopId>) {
        self.core.destination      = destination;
        self.core.destination_stop = stop;
        if let Some(stop) = stop {
            self.core.arrival_pos = network.stop(stop).mid_pos();
        }
    }

    /// `"waiting for L1,L2 at edge 'E'"`, empty once aboard.
    pub fn waiting_description(&self, network: &Network) -> String {
        if !self.is_waiting_for_vehicle() {
            return String::new();
        }
        let lines: Vec<&str> = self.lines().collect();
        let place = match self.core.destination_stop {
            Some(stop) => format!("busStop '{}'", network.stop(stop).name),
            None => format!("edge '{}'", network.edge_name(self.waiting_at())),
        };
        format!("waiting for {} at {}", lines.join(","), place)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Start waiting where `previous` left the agent; board at once if a
    /// vehicle serving one of the lines is already there.
    pub(crate) fn proceed(&mut self, ctx: &mut StageContext<'_>, agent: AgentId, previous: &Previous) {
        self.core.mark_departed(ctx.now);
        self.waiting_edge = previous.edge;
        self.waiting_pos  = previous.arrival_pos;
        if let Some(stop) = previous.stop {
            let stop = ctx.network.stop(stop);
            self.stop_wait_pos = Some(ctx.network.edge_position(
                stop.edge,
                stop.mid_pos(),
                ctx.config.side_offset(),
            ));
        }

        let waiting_edge = self.waiting_edge;
        let ready = ctx
            .vehicles
            .vehicles_on(waiting_edge)
            .into_iter()
            .find(|v| self.is_waiting_for(v.id()) || self.is_waiting_for(v.line()))
            .map(|v| v.id().to_owned());
        let vehicle = match ready {
            Some(id) => ctx.vehicles.vehicle_mut(&id),
            None => None,
        };
        match vehicle {
            Some(vehicle) => {
                vehicle.add_transportable(agent);
                let vehicle = &*vehicle;
                self.set_vehicle(vehicle, ctx.network, ctx.now);
            }
            None => ctx.control.add_waiting(waiting_edge, agent),
        }
    }

    pub(crate) fn mark_arrived(&mut self, view: &SimView<'_>) {
        self.core.mark_arrived(view.now);
        if self.ridden.is_some() {
            return;
        }
        let vehicle = self.vehicle.as_deref().and_then(|id| view.vehicles.vehicle(id));
        self.ridden = match (vehicle, self.vehicle_distance) {
            (Some(v), Some(at_boarding)) => Some(v.route_distance(view.network) - at_boarding),
            _ => None,
        };
    }

    /// Leave immediately.  Aboard, this means jumping out of the vehicle.
    pub(crate) fn abort(&mut self, ctx: &mut StageContext<'_>, agent: AgentId) {
        match self.vehicle.as_deref().and_then(|id| ctx.vehicles.vehicle_mut(id)) {
            Some(vehicle) => {
                vehicle.remove_transportable(agent);
            }
            None => ctx.control.abort_waiting(agent),
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The waiting edge, or the destination before the ride was started.
    fn waiting_at(&self) -> EdgeId {
        if self.waiting_edge == EdgeId::INVALID { self.core.destination } else { self.waiting_edge }
    }

    fn bound<'v>(&self, view: &SimView<'v>) -> Option<&'v Vehicle> {
        self.vehicle.as_deref().and_then(|id| view.vehicles.vehicle(id))
    }

    pub(crate) fn edge(&self, view: &SimView<'_>) -> EdgeId {
        self.bound(view).map_or_else(|| self.waiting_at(), Vehicle::edge)
    }

    pub(crate) fn edge_pos(&self, view: &SimView<'_>) -> f64 {
        match self.bound(view) {
            Some(v) => v.pos_on_edge.min(view.network.length(v.edge())),
            None => self.waiting_pos,
        }
    }

    pub(crate) fn position(&self, view: &SimView<'_>) -> Position {
        match self.bound(view) {
            Some(v) => v.position,
            None => self
                .stop_wait_pos
                .unwrap_or_else(|| roadside_position(view, self.waiting_at(), self.waiting_pos)),
        }
    }

    pub(crate) fn angle(&self, view: &SimView<'_>) -> f64 {
        match self.bound(view) {
            Some(v) => v.angle,
            None => roadside_angle(view, self.waiting_at(), self.waiting_pos),
        }
    }

    pub(crate) fn speed(&self, view: &SimView<'_>) -> f64 {
        self.bound(view).map_or(0.0, |v| v.speed)
    }

    pub(crate) fn waiting_time(&self, now: Tick) -> u64 {
        match (self.vehicle.is_none(), self.core.departed) {
            (true, Some(departed)) => now.since(departed),
            _ => 0,
        }
    }

    // ── Output ────────────────────────────────────────────────────────────

    pub(crate) fn trip_info(&self) -> TripInfo {
        let waiting_time = match (self.core.departed, self.boarded) {
            (Some(d), Some(b)) => b.since(d),
            (Some(d), None) => self.core.arrived.map_or(0, |a| a.since(d)),
            _ => 0,
        };
        TripInfo::Ride {
            waiting_time,
            vehicle:      self.vehicle.clone().unwrap_or_default(),
            depart:       self.boarded,
            arrival:      self.core.arrived,
            arrival_pos:  self.core.arrival_pos,
            duration:     match (self.boarded, self.core.arrived) {
                (Some(b), Some(a)) => a.since(b),
                _ => 0,
            },
            route_length: self.vehicle_distance(),
            intended:     self.intended_vehicle.clone(),
        }
    }

    pub(crate) fn route_entry(&self, network: &Network) -> RouteEntry {
        let lines: Vec<&str> = self.lines().collect();
        let from = if self.waiting_edge == EdgeId::INVALID {
            String::new()
        } else {
            network.edge_name(self.waiting_edge).to_owned()
        };
        RouteEntry::Ride {
            from,
            to:       network.edge_name(self.core.destination).to_owned(),
            to_stop:  self
                .core
                .destination_stop
                .map(|s| network.stop(s).name.clone())
                .unwrap_or_default(),
            lines:    lines.join(" "),
            intended: self.intended_vehicle.clone(),
        }
    }

    pub(crate) fn stage_summary(&self, network: &Network) -> String {
        let target = describe_target(network, self.core.destination, self.core.destination_stop);
        if self.is_waiting_for_vehicle() {
            let lines: Vec<&str> = self.lines().collect();
            format!("waiting for {} then drive to {}", lines.join(","), target)
        } else {
            format!("driving to {target}")
        }
    }
}
