//! Trip stages and their resolution into concrete stages.
//!
//! A [`TripStage`] only says "get from A to B using these modes".  The first
//! time it becomes due, [`TripStage::resolve`] asks the intermodal router for
//! legs and turns them into walking and driving stages, which the owner
//! splices into the plan right behind the trip.
//!
//! # Private vehicles
//!
//! For each candidate vehicle type a placeholder vehicle is built on the
//! origin edge, departing when its owner boards.  It only becomes live if a
//! leg actually rides it; otherwise it is discarded again before `resolve`
//! returns.  A trip without candidate types gets a default car if it allows
//! `passenger`, else a default bike if it allows `bicycle`, else no vehicle
//! at all (scheduled lines may still be used via stops).
//!
//! # No route
//!
//! With strict routing the trip fails with [`StageError::NoConnection`].
//! Otherwise the agent walks straight from origin to destination, which it
//! cannot physically do: it teleports.

use tp_core::{EdgeId, EngineConfig, ModeSet, Position, StopId};
use tp_network::{Network, StopKind, TripItem, TripRequest, VehicleProposal};
use tp_vehicle::{Vehicle, VehicleParams, VehicleRegistry};
use tracing::{debug, trace, warn};

use crate::stage::{roadside_angle, roadside_position};
use crate::{
    DrivingStage, Previous, SimView, Stage, StageContext, StageCore, StageError, StageResult,
    Traveller, WalkingStage,
};

// ── TripStage ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct TripStage {
    pub(crate) core: StageCore,
    origin:         EdgeId,
    /// Fixed walking time in ticks for the walks this trip produces.
    duration:       Option<u64>,
    modes:          ModeSet,
    /// Candidate vehicle type ids.
    vtypes:         Vec<String>,
    /// Walking speed for the walks this trip produces.
    speed:          Option<f64>,
    /// Factor on the agent's maximum speed offered to the router; negative
    /// means the configured default.
    walk_factor:    f64,
    depart_pos_lat: f64,
    /// Departure position, known once resolved.
    depart_pos:     f64,
}

impl TripStage {
    /// A trip to `destination` (or `to_stop` on it).  A negative
    /// `arrival_pos` leaves the target position to the router's legs.
    pub fn new(origin: EdgeId, destination: EdgeId, to_stop: Option<StopId>, arrival_pos: f64) -> Self {
        Self {
            core: StageCore::new(destination, to_stop, arrival_pos),
            origin,
            duration:       None,
            modes:          ModeSet::IGNORING,
            vtypes:         Vec::new(),
            speed:          None,
            walk_factor:    -1.0,
            depart_pos_lat: 0.0,
            depart_pos:     0.0,
        }
    }

    pub fn with_modes(mut self, modes: ModeSet) -> Self {
        self.modes = modes;
        self
    }

    pub fn with_vtypes<I, S>(mut self, vtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vtypes = vtypes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_walk_factor(mut self, walk_factor: f64) -> Self {
        self.walk_factor = walk_factor;
        self
    }

    /// Walking speed and fixed walking time for the resulting walks.
    pub fn with_walking(mut self, speed: Option<f64>, duration: Option<u64>) -> Self {
        self.speed    = speed;
        self.duration = duration;
        self
    }

    pub fn with_depart_pos_lat(mut self, lat: f64) -> Self {
        self.depart_pos_lat = lat;
        self
    }

    #[inline]
    pub fn origin(&self) -> EdgeId {
        self.origin
    }

    #[inline]
    pub fn modes(&self) -> ModeSet {
        self.modes
    }

    pub fn vtypes(&self) -> &[String] {
        &self.vtypes
    }

    #[inline]
    pub fn depart_pos(&self) -> f64 {
        self.depart_pos
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.core.arrived.is_some()
    }

    pub(crate) fn position(&self, view: &SimView<'_>) -> Position {
        roadside_position(view, self.origin, self.depart_pos)
    }

    pub(crate) fn angle(&self, view: &SimView<'_>) -> f64 {
        roadside_angle(view, self.origin, self.depart_pos)
    }

    pub(crate) fn stage_summary(&self, network: &Network) -> String {
        format!(
            "trip from '{}' to '{}'",
            network.edge_name(self.origin),
            network.edge_name(self.core.destination)
        )
    }

    // ── Resolution ────────────────────────────────────────────────────────

    /// Route the trip and build the stages that realise it.
    ///
    /// `previous` is where the agent stands: the stage before this one, or
    /// the initial wait for a plan's first stage.  Marks the trip arrived, so
    /// a resolved trip is never resolved again.
    pub fn resolve(
        &mut self,
        ctx:       &mut StageContext<'_>,
        traveller: &Traveller<'_>,
        previous:  &Previous,
    ) -> StageResult<Resolution> {
        self.core.mark_arrived(ctx.now);
        self.depart_pos = previous.arrival_pos;

        let mut proposals = self.vehicle_proposals(ctx.config, traveller.name);
        if !ctx.config.multi_candidate_trips {
            proposals.truncate(1);
        }

        let mut resolution = Resolution::default();
        for proposal in proposals {
            self.resolve_candidate(ctx, traveller, previous, proposal, &mut resolution)?;
        }
        debug!(
            agent = traveller.name,
            stages = resolution.stages.len(),
            vehicles = resolution.vehicles_added.len(),
            teleported = resolution.teleported,
            "trip resolved"
        );
        Ok(resolution)
    }

    /// `(vehicle id, vehicle type)` per candidate; `None` for "no vehicle".
    fn vehicle_proposals(&self, config: &EngineConfig, agent: &str) -> Vec<Option<(String, String)>> {
        if !self.vtypes.is_empty() {
            return self
                .vtypes
                .iter()
                .enumerate()
                .map(|(i, vtype)| Some((format!("{agent}_{i}"), vtype.clone())))
                .collect();
        }
        let default = if self.modes.contains(ModeSet::PASSENGER) {
            Some((format!("{agent}_0"), config.default_vtype.clone()))
        } else if self.modes.contains(ModeSet::BICYCLE) {
            Some((format!("{agent}_b0"), config.default_bike_type.clone()))
        } else {
            None
        };
        vec![default]
    }

    fn resolve_candidate(
        &self,
        ctx:        &mut StageContext<'_>,
        traveller:  &Traveller<'_>,
        previous:   &Previous,
        proposal:   Option<(String, String)>,
        resolution: &mut Resolution,
    ) -> StageResult<()> {
        let mut vehicle = match proposal {
            Some((id, vtype)) => self.build_placeholder(ctx, traveller, previous, &id, &vtype, resolution)?,
            None => None,
        };
        let placeholder_id = vehicle.as_ref().map(|v| v.id().to_owned());

        let network = ctx.network;
        let dest_stop = self
            .core
            .destination_stop
            .map(|s| network.stop(s).name.as_str())
            .unwrap_or("");
        let walk_factor = if self.walk_factor >= 0.0 { self.walk_factor } else { ctx.config.walk_factor };
        let request = TripRequest {
            origin:      self.origin,
            destination: self.core.destination,
            depart_pos:  previous.arrival_pos,
            arrival_pos: self.core.arrival_pos.abs(),
            dest_stop,
            speed:       traveller.max_speed * walk_factor,
            vehicle:     vehicle.as_ref().map(|v| VehicleProposal {
                id:        v.id(),
                vclass:    v.vclass,
                max_speed: v.max_speed,
            }),
            modes:       self.modes,
            depart:      traveller.depart,
        };

        match ctx.router.compute(network, &request) {
            Ok(items) => {
                let mut prev = *previous;
                let last = items.iter().rposition(|item| !item.edges.is_empty());
                for (i, item) in items.iter().enumerate() {
                    let (Some(&first), Some(&last_edge)) = (item.edges.first(), item.edges.last()) else {
                        continue;
                    };
                    let leg = Leg { item, first, last: last_edge, is_last: Some(i) == last };
                    let own = placeholder_id.as_deref();
                    let stage = self.translate_leg(ctx, traveller.name, &leg, &prev, own, &mut vehicle, resolution);
                    prev = Previous::of(&stage);
                    resolution.stages.push(stage);
                }
            }
            Err(err) => {
                if ctx.config.strict_routes {
                    if let Some(unused) = vehicle.take() {
                        ctx.vehicles.delete_vehicle(unused, true);
                    }
                    let destination = match self.core.destination_stop {
                        Some(stop) => network.stop(stop).name.clone(),
                        None => network.edge_name(self.core.destination).to_owned(),
                    };
                    return Err(StageError::NoConnection {
                        origin: network.edge_name(self.origin).to_owned(),
                        destination,
                        agent: traveller.name.to_owned(),
                    });
                }
                debug!(agent = traveller.name, %err, "no route, teleporting");
                resolution.teleported = true;
                resolution.stages.push(Stage::Walking(WalkingStage::new(
                    vec![self.origin, self.core.destination],
                    self.core.destination_stop,
                    self.duration,
                    self.speed,
                    previous.arrival_pos,
                    self.core.arrival_pos.abs(),
                    self.depart_pos_lat,
                )));
            }
        }

        if let Some(unused) = vehicle {
            debug!(agent = traveller.name, vehicle = unused.id(), "discarding unused vehicle");
            ctx.vehicles.delete_vehicle(unused, true);
        }
        Ok(())
    }

    /// Build the placeholder vehicle, or `None` if its type may not use the
    /// origin edge.
    fn build_placeholder(
        &self,
        ctx:        &mut StageContext<'_>,
        traveller:  &Traveller<'_>,
        previous:   &Previous,
        id:         &str,
        vtype:      &str,
        resolution: &mut Resolution,
    ) -> StageResult<Option<Vehicle>> {
        let vclass = ctx
            .vehicles
            .vehicle_type(vtype)
            .map(|t| t.vclass)
            .ok_or_else(|| StageError::UnknownVehicleType {
                vtype: vtype.to_owned(),
                agent: traveller.name.to_owned(),
            })?;
        if !vclass.is_empty() && !ctx.network.permissions(self.origin).intersects(vclass) {
            warn!(
                "Ignoring vehicle type '{}' when routing person '{}' because it is not allowed on the start edge.",
                vtype, traveller.name
            );
            resolution.warnings.push(ResolveWarning::VehicleTypeNotAllowed {
                vtype: vtype.to_owned(),
                agent: traveller.name.to_owned(),
            });
            return Ok(None);
        }
        let id = free_vehicle_id(&*ctx.vehicles, id);
        let params = VehicleParams::triggered(&id, vtype);
        let mut vehicle = ctx
            .vehicles
            .build_vehicle(params, vec![self.origin], ctx.network, ctx.config.strict_routes)?;
        place_at_start(&mut vehicle, ctx.network, previous.arrival_pos);
        Ok(Some(vehicle))
    }

    /// Turn one routed leg into a stage.
    fn translate_leg(
        &self,
        ctx:            &mut StageContext<'_>,
        agent:          &str,
        leg:            &Leg<'_>,
        prev:           &Previous,
        placeholder_id: Option<&str>,
        vehicle:        &mut Option<Vehicle>,
        resolution:     &mut Resolution,
    ) -> Stage {
        let network = ctx.network;
        let Leg { item, first, last, is_last } = *leg;
        let stop = network.stop_by_name(&item.dest_stop, StopKind::BusStop);
        let mut arrival_pos = stop
            .and_then(|s| network.stop(s).access_pos(last))
            .unwrap_or_else(|| network.length(last) / 2.0);
        if is_last && self.core.arrival_pos >= 0.0 {
            arrival_pos = self.core.arrival_pos;
        }

        if item.is_walk() {
            trace!(edges = item.edges.len(), arrival_pos, "walk leg");
            return self.walk_leg(network, item, prev, first, stop, arrival_pos);
        }

        if placeholder_id == Some(item.line.as_str()) {
            if stop.is_none() && !is_last {
                // Mid-trip without a fixed end: ride as far as useful.
                arrival_pos = network.length(last);
            }
            trace!(line = %item.line, arrival_pos, "ride leg on own vehicle");
            if let Some(v) = vehicle.take() {
                let start_pos = if prev.edge == first { prev.arrival_pos } else { 0.0 };
                let launch = OwnLeg { edges: &item.edges, start_pos, arrival_pos };
                if let Err(warning) = launch_own_vehicle(ctx, agent, v, &launch, resolution) {
                    warn!(agent, vehicle = %item.line, ?warning, "own vehicle unusable, walking the leg");
                    resolution.warnings.push(warning);
                    return self.walk_leg(network, item, prev, first, stop, arrival_pos);
                }
            }
            return Stage::Driving(DrivingStage::new(last, stop, arrival_pos, [item.line.as_str()]));
        }

        trace!(line = %item.line, intended = %item.intended, "ride leg on line");
        Stage::Driving(
            DrivingStage::new(last, stop, arrival_pos, [item.line.as_str()])
                .with_intended(&item.intended, item.depart),
        )
    }

    fn walk_leg(
        &self,
        network:     &Network,
        item:        &TripItem,
        prev:        &Previous,
        first:       EdgeId,
        stop:        Option<StopId>,
        arrival_pos: f64,
    ) -> Stage {
        let depart_pos = match prev.stop {
            Some(s) => network.stop(s).access_pos(first).unwrap_or(0.0),
            None if prev.edge != first => 0.0,
            None => prev.arrival_pos,
        };
        Stage::Walking(WalkingStage::new(
            item.edges.clone(),
            stop,
            self.duration,
            self.speed,
            depart_pos,
            arrival_pos,
            self.depart_pos_lat,
        ))
    }
}

/// The stretch an own vehicle is driven on.
pub(crate) struct OwnLeg<'a> {
    pub(crate) edges:       &'a [EdgeId],
    /// Where the vehicle stands on the first edge.
    pub(crate) start_pos:   f64,
    pub(crate) arrival_pos: f64,
}

/// Put the placeholder on the leg's route and make it live.  A vehicle that
/// cannot be used is discarded and the reason returned.
pub(crate) fn launch_own_vehicle(
    ctx:         &mut StageContext<'_>,
    agent:       &str,
    mut vehicle: Vehicle,
    leg:         &OwnLeg<'_>,
    resolution:  &mut Resolution,
) -> Result<(), ResolveWarning> {
    let id = vehicle.id().to_owned();
    let rejected = |vehicle: String| ResolveWarning::VehicleNotInserted { vehicle, agent: agent.to_owned() };
    if !vehicle.replace_route(leg.edges) {
        ctx.vehicles.delete_vehicle(vehicle, true);
        return Err(ResolveWarning::RouteRejected { vehicle: id, agent: agent.to_owned() });
    }
    place_at_start(&mut vehicle, ctx.network, leg.start_pos);
    vehicle.set_arrival_pos(leg.arrival_pos);
    if ctx.vehicles.vehicle(&id).is_some() {
        ctx.vehicles.delete_vehicle(vehicle, true);
        return Err(rejected(id));
    }
    if let Err(err) = ctx.vehicles.add_vehicle(vehicle) {
        debug!(%err, "vehicle insertion failed");
        return Err(rejected(id));
    }
    resolution.vehicles_added.push(id);
    Ok(())
}

/// Stand `vehicle` at `pos` on the first edge of its route.
fn place_at_start(vehicle: &mut Vehicle, network: &Network, pos: f64) {
    let Some(&edge) = vehicle.route.first() else {
        return;
    };
    let position = network.edge_position(edge, pos, 0.0);
    let angle = network.edge_angle(edge, pos);
    vehicle.depart_pos = pos;
    vehicle.move_to(0, pos, position, angle, 0.0);
}

/// `base`, or `base` with the lowest free numeric suffix if a live vehicle
/// already has that id.
fn free_vehicle_id(vehicles: &dyn VehicleRegistry, base: &str) -> String {
    if vehicles.vehicle(base).is_none() {
        return base.to_owned();
    }
    (1u32..)
        .map(|n| format!("{base}.{n}"))
        .find(|id| vehicles.vehicle(id).is_none())
        .unwrap_or_else(|| base.to_owned())
}

/// A non-empty routed leg.
#[derive(Copy, Clone)]
struct Leg<'a> {
    item:    &'a TripItem,
    first:   EdgeId,
    last:    EdgeId,
    /// Final leg of the trip.
    is_last: bool,
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// Outcome of resolving a trip.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Concrete stages, in plan order.
    pub stages:         Vec<Stage>,
    /// Placeholder vehicles that became live.
    pub vehicles_added: Vec<String>,
    /// Conditions that were worked around.
    pub warnings:       Vec<ResolveWarning>,
    /// No route existed and the agent teleports.
    pub teleported:     bool,
}

/// A recoverable problem met while resolving.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveWarning {
    /// The vehicle type may not use the trip's origin edge and was skipped.
    VehicleTypeNotAllowed { vtype: String, agent: String },
    /// The own vehicle could not take the routed leg; the agent walks it.
    RouteRejected { vehicle: String, agent: String },
    /// The own vehicle's id was taken in the registry; the agent walks the
    /// leg.
    VehicleNotInserted { vehicle: String, agent: String },
}
