//! A transportable and its plan.
//!
//! # Cursor
//!
//! `cursor` indexes the current stage.  Stages before it are done, stages
//! after it are still to come, and `cursor == plan.len()` means the agent
//! has arrived.  Insertions and removals never touch the stages before the
//! cursor, so the index stays valid across plan edits.
//!
//! # Trips
//!
//! When the cursor reaches a trip stage, the trip is resolved on the spot
//! and its concrete stages are spliced in right behind it.  The cursor then
//! moves on to the first of them within the same call.  A resolved trip
//! stays in the plan as a record and is passed over if reached again.

use std::f64::consts::FRAC_PI_2;

use tp_core::{AgentId, AgentRng, EdgeId, Position, StopId, Tick};
use tp_network::{Network, PedestrianRouter};
use tp_stage::{
    Activation, Previous, SimView, Stage, StageContext, StageKind, Traveller, WaitingStage,
    WalkingStage,
};
use tp_vehicle::{VehicleRegistry, VehicleType};
use tracing::{debug, trace, warn};

use crate::{AgentError, AgentResult, TransportableKind, TransportableParams};

/// Result of [`Transportable::reroute_parking_area`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The agent is not riding toward the reassigned parking area.
    NotAffected,
    /// The ride was redirected; no walk followed it.
    Redirected,
    /// The ride was redirected and the following walk recomputed.
    WalkRerouted,
    /// The ride was redirected but no walk from the new parking area was
    /// found; the old walk is kept.
    WalkKept,
}

pub struct Transportable {
    id:     AgentId,
    params: TransportableParams,
    /// Id of the vehicle type currently in use.  Starts as `params.vtype`
    /// and changes when a singular copy is made.
    vtype:  String,
    plan:   Vec<Stage>,
    cursor: usize,
}

impl Transportable {
    /// Build an agent with `stages` as its plan, preceded by the initial
    /// wait for `params.depart`.
    pub fn new(
        id:      AgentId,
        params:  TransportableParams,
        stages:  Vec<Stage>,
        network: &Network,
        rng:     &mut AgentRng,
    ) -> AgentResult<Self> {
        let Some(first) = stages.first() else {
            return Err(AgentError::EmptyPlan(params.id));
        };
        let origin = first.from_edge();
        if origin == EdgeId::INVALID {
            return Err(AgentError::NoOrigin(params.id));
        }
        let depart_pos = params.depart_pos.resolve(network.length(origin), rng);
        let initial = WaitingStage::initial(network, origin, params.depart, depart_pos);

        let mut plan = Vec::with_capacity(stages.len() + 1);
        plan.push(Stage::from(initial));
        plan.extend(stages);
        Ok(Self { id, vtype: params.vtype.clone(), params, plan, cursor: 0 })
    }

    // ── Identity ──────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.params.id
    }

    #[inline]
    pub fn kind(&self) -> TransportableKind {
        self.params.kind
    }

    #[inline]
    pub fn params(&self) -> &TransportableParams {
        &self.params
    }

    #[inline]
    pub fn vtype_id(&self) -> &str {
        &self.vtype
    }

    #[inline]
    pub fn desired_depart(&self) -> Tick {
        self.params.depart
    }

    // ── Plan access ───────────────────────────────────────────────────────

    #[inline]
    pub fn plan(&self) -> &[Stage] {
        &self.plan
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn num_stages(&self) -> usize {
        self.plan.len()
    }

    #[inline]
    pub fn num_remaining_stages(&self) -> usize {
        self.plan.len() - self.cursor
    }

    #[inline]
    pub fn has_arrived(&self) -> bool {
        self.cursor == self.plan.len()
    }

    pub fn current_stage(&self) -> Option<&Stage> {
        self.plan.get(self.cursor)
    }

    pub fn current_stage_mut(&mut self) -> Option<&mut Stage> {
        self.plan.get_mut(self.cursor)
    }

    /// Stage `offset` positions after the current one.
    pub fn stage(&self, offset: usize) -> Option<&Stage> {
        self.plan.get(self.cursor + offset)
    }

    pub fn stage_summary(&self, offset: usize, network: &Network) -> Option<String> {
        self.stage(offset).map(|s| s.stage_summary(network))
    }

    pub fn current_stage_kind(&self) -> Option<StageKind> {
        self.current_stage().map(Stage::kind)
    }

    /// The current stage, or the last one after arrival.
    fn anchor(&self) -> &Stage {
        let i = self.cursor.min(self.plan.len() - 1);
        &self.plan[i]
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn edge(&self, view: &SimView<'_>) -> EdgeId {
        self.anchor().edge(view)
    }

    pub fn edge_pos(&self, view: &SimView<'_>) -> f64 {
        self.anchor().edge_pos(view)
    }

    pub fn position(&self, view: &SimView<'_>) -> Position {
        self.anchor().position(view)
    }

    pub fn angle(&self, view: &SimView<'_>) -> f64 {
        self.anchor().angle(view)
    }

    pub fn speed(&self, view: &SimView<'_>) -> f64 {
        self.anchor().speed(view)
    }

    pub fn waiting_seconds(&self, view: &SimView<'_>) -> f64 {
        let ticks = self.current_stage().map_or(0, |s| s.waiting_time(view.now));
        ticks as f64 * view.tick_duration_secs as f64
    }

    /// Destination of the current stage.
    pub fn destination(&self) -> EdgeId {
        self.anchor().destination()
    }

    pub fn is_waiting_for(&self, line: &str) -> bool {
        self.current_stage().is_some_and(|s| s.is_waiting_for(line))
    }

    pub fn vehicle_type<'r>(&self, vehicles: &'r dyn VehicleRegistry) -> AgentResult<&'r VehicleType> {
        vehicles.vehicle_type(&self.vtype).ok_or_else(|| AgentError::UnknownVehicleType {
            vtype: self.vtype.clone(),
            agent: self.params.id.clone(),
        })
    }

    /// Footprint corners: front right, back right, back left, front left.
    pub fn bounding_box(&self, view: &SimView<'_>) -> AgentResult<[Position; 4]> {
        let vtype = self.vehicle_type(view.vehicles)?;
        let front = self.position(view);
        let angle = self.angle(view);
        let back = front.moved(angle, -vtype.length);
        let half = vtype.width / 2.0;
        let right = angle - FRAC_PI_2;
        Ok([
            front.moved(right, half),
            back.moved(right, half),
            back.moved(right, -half),
            front.moved(right, -half),
        ])
    }

    // ── Advancing ─────────────────────────────────────────────────────────

    /// Activate the initial wait.  Called once, at the departure tick.
    pub fn start(&mut self, ctx: &mut StageContext<'_>) -> AgentResult<()> {
        if self.cursor != 0 {
            return Ok(());
        }
        let max_speed = self.vehicle_type(&*ctx.vehicles)?.max_speed;
        let traveller = Traveller { id: self.id, name: &self.params.id, max_speed, depart: self.params.depart };
        let initial = &mut self.plan[0];
        let previous = Previous::of(initial);
        initial.proceed(ctx, &traveller, &previous);
        debug!(agent = %self.params.id, "departing");
        Ok(())
    }

    /// Finish the current stage and start the next one.  Returns `false`
    /// once the plan is complete.
    ///
    /// A trip inserted at the current position was never activated; it is
    /// resolved here and its stages follow.
    pub fn proceed(&mut self, ctx: &mut StageContext<'_>) -> AgentResult<bool> {
        let max_speed = self.vehicle_type(&*ctx.vehicles)?.max_speed;
        if self.cursor > 0 && self.current_trip_unresolved() {
            self.resolve_current_trip(ctx, max_speed)?;
        } else if let Some(stage) = self.plan.get_mut(self.cursor) {
            stage.mark_arrived(&ctx.view());
        }
        loop {
            self.cursor = (self.cursor + 1).min(self.plan.len());
            if self.has_arrived() {
                debug!(agent = %self.params.id, "arrived");
                return Ok(false);
            }
            let previous = Previous::of(&self.plan[self.cursor - 1]);
            let traveller = Traveller { id: self.id, name: &self.params.id, max_speed, depart: self.params.depart };
            let stage = &mut self.plan[self.cursor];
            if stage.proceed(ctx, &traveller, &previous) == Activation::Active {
                trace!(agent = %self.params.id, stage = self.cursor, kind = ?stage.kind(), "stage started");
                return Ok(true);
            }
            if self.current_trip_unresolved() {
                self.resolve_current_trip(ctx, max_speed)?;
            }
        }
    }

    fn current_trip_unresolved(&self) -> bool {
        matches!(self.plan.get(self.cursor), Some(Stage::Trip(trip)) if !trip.is_resolved())
    }

    /// Resolve the trip at the cursor and splice its stages in behind it.
    /// The cursor must not be on the initial wait.
    fn resolve_current_trip(&mut self, ctx: &mut StageContext<'_>, max_speed: f64) -> AgentResult<()> {
        let previous = Previous::of(&self.plan[self.cursor - 1]);
        let traveller = Traveller { id: self.id, name: &self.params.id, max_speed, depart: self.params.depart };
        let Some(stage) = self.plan.get_mut(self.cursor) else {
            return Ok(());
        };
        stage.mark_departed(ctx.now);
        if let Stage::Trip(trip) = stage {
            let resolution = trip.resolve(ctx, &traveller, &previous)?;
            let at = self.cursor + 1;
            self.plan.splice(at..at, resolution.stages);
        }
        Ok(())
    }

    // ── Plan edits ────────────────────────────────────────────────────────

    /// Insert `stage` `offset` positions after the current one, or append it
    /// when `offset` is `None`.
    pub fn append_stage(&mut self, stage: Stage, offset: Option<usize>) -> AgentResult<()> {
        match offset {
            None => self.plan.push(stage),
            Some(offset) => {
                let index = self.cursor + offset;
                if index > self.plan.len() {
                    return Err(AgentError::InvalidStageIndex { index: offset, agent: self.params.id.clone() });
                }
                self.plan.insert(index, stage);
            }
        }
        Ok(())
    }

    /// Remove the stage `offset` positions after the current one.
    ///
    /// Removing the current stage aborts it and moves on.  If it was the
    /// last one, a zero-length wait is appended first so the agent stays in
    /// the simulation for another step and can still get new stages.
    /// Returns `false` if the agent has arrived afterwards.
    pub fn remove_stage(&mut self, ctx: &mut StageContext<'_>, offset: usize) -> AgentResult<bool> {
        let index = self.cursor + offset;
        if index >= self.plan.len() {
            return Err(AgentError::InvalidStageIndex { index: offset, agent: self.params.id.clone() });
        }
        if offset > 0 {
            self.plan.remove(index);
            return Ok(true);
        }
        if index + 1 == self.plan.len() {
            let view = ctx.view();
            let edge = self.edge(&view);
            let pos = self.edge_pos(&view);
            let placeholder = WaitingStage::new(ctx.network, edge, Some(0), None, pos, "last stage removed");
            self.plan.push(Stage::from(placeholder));
        }
        self.plan[index].abort(ctx, self.id);
        self.proceed(ctx)
    }

    // ── Vehicle type ──────────────────────────────────────────────────────

    /// Switch to `vtype`, registering it.  A singular type the agent used
    /// before is dropped from the registry.
    pub fn replace_vehicle_type(&mut self, vehicles: &mut dyn VehicleRegistry, vtype: VehicleType) {
        if vehicles.vehicle_type(&self.vtype).is_some_and(VehicleType::is_vehicle_specific) {
            vehicles.remove_vehicle_type(&self.vtype);
        }
        self.vtype = vtype.id.clone();
        vehicles.add_vehicle_type(vtype);
    }

    /// The agent's own copy of its vehicle type, made on first use.
    pub fn singular_type<'r>(&mut self, vehicles: &'r mut dyn VehicleRegistry) -> AgentResult<&'r mut VehicleType> {
        let current = self.vehicle_type(&*vehicles)?;
        if !current.is_vehicle_specific() {
            let singular = current.build_singular(format!("{}@{}", current.id, self.params.id));
            self.replace_vehicle_type(vehicles, singular);
        }
        vehicles.vehicle_type_mut(&self.vtype).ok_or_else(|| AgentError::UnknownVehicleType {
            vtype: self.vtype.clone(),
            agent: self.params.id.clone(),
        })
    }

    /// New walking speed for every remaining stage and the agent's type.
    pub fn set_speed(&mut self, vehicles: &mut dyn VehicleRegistry, speed: f64) -> AgentResult<()> {
        for stage in self.plan.iter_mut().skip(self.cursor) {
            stage.set_speed(speed);
        }
        self.singular_type(vehicles)?.max_speed = speed;
        Ok(())
    }

    // ── Plan repair ───────────────────────────────────────────────────────

    /// React to the vehicle being sent from parking area `orig` to
    /// `replacement`.
    ///
    /// Only a current ride toward `orig`'s edge is affected.  Its target
    /// moves to the replacement, and a walk right after it is recomputed from
    /// there.  If no walk is found the old one stays.
    pub fn reroute_parking_area(
        &mut self,
        view:        &SimView<'_>,
        orig:        StopId,
        replacement: StopId,
        router:      &dyn PedestrianRouter,
    ) -> AgentResult<RepairOutcome> {
        let network = view.network;
        let orig_edge = network.stop(orig).edge;
        let new_edge = network.stop(replacement).edge;
        let cursor = self.cursor;

        match self.plan.get(cursor) {
            Some(stage @ Stage::Driving(_)) if stage.destination() == orig_edge => {}
            _ => return Ok(RepairOutcome::NotAffected),
        }
        let Some(Stage::Driving(ride)) = self.plan.get_mut(cursor) else {
            return Ok(RepairOutcome::NotAffected);
        };
        ride.set_destination(network, new_edge, Some(replacement));
        let vehicle = ride.vehicle_id().unwrap_or_default().to_owned();
        let depart_pos = self.plan[cursor].arrival_pos();

        let Some(Stage::Walking(walk)) = self.plan.get(cursor + 1) else {
            return Ok(RepairOutcome::Redirected);
        };
        let walk_dest = self.plan[cursor + 1].destination();
        let arrival_pos = self.plan[cursor + 1].arrival_pos();
        let to_stop = self.plan[cursor + 1].destination_stop();
        let requested = walk.requested_speed();
        let speed = match requested {
            Some(speed) => speed,
            None => self.vehicle_type(view.vehicles)?.max_speed,
        };

        match router.compute_walk(network, new_edge, walk_dest, depart_pos, arrival_pos, speed) {
            Ok(route) if !route.is_empty() => {
                let walk = WalkingStage::new(route, to_stop, None, requested, depart_pos, arrival_pos, 0.0);
                self.plan[cursor + 1] = Stage::from(walk);
                debug!(agent = %self.params.id, vehicle = %vehicle, "walk rerouted from new parking area");
                Ok(RepairOutcome::WalkRerouted)
            }
            _ => {
                warn!(
                    "Could not reroute person '{}' when rerouting vehicle '{}' to new parkingArea '{}'.",
                    self.params.id,
                    vehicle,
                    network.stop(replacement).name
                );
                Ok(RepairOutcome::WalkKept)
            }
        }
    }
}
