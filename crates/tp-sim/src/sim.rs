//! The `Sim` struct and its step loop.

use std::collections::HashMap;

use tp_agent::{RepairOutcome, Transportable, TransportableKind};
use tp_core::{AgentId, EdgeId, EngineConfig, SimClock, SimConfig, StopId, Tick};
use tp_network::{IntermodalRouter, Network, PedestrianRouter};
use tp_schedule::{Controls, WakeQueue};
use tp_stage::{SimView, Stage, StageContext};
use tp_vehicle::{VehicleControl, VehicleRegistry};
use tracing::{debug, trace, warn};

use crate::{SimError, SimObserver, SimResult};

/// Registries are drained in this order every step.
const KINDS: [TransportableKind; 2] = [TransportableKind::Person, TransportableKind::Container];

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<R>` holds all simulation state and drives the step loop:
///
/// 1. **Depart**: agents whose requested departure is due activate their
///    initial wait, which ends at once.
/// 2. **Release**: drain the person and container registries and call
///    [`Transportable::proceed`] for each released agent, in release order.
/// 3. **Observe**: every stage change and arrival is reported to the
///    [`SimObserver`] as it happens.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R> {
    /// Global configuration (total ticks, seed, tick duration, …).
    pub config: SimConfig,

    /// Current tick and its wall-clock mapping.
    pub clock: SimClock,

    /// Routing and roadside options shared by every stage.
    pub engine: EngineConfig,

    pub network: Network,

    /// Resolves trips and repairs walks.
    pub router: R,

    /// Vehicle types and live vehicles.  The external vehicle model moves
    /// vehicles through this registry.
    pub vehicles: VehicleControl,

    /// Waiting registries, one per agent kind.
    pub controls: Controls,

    /// Indexed by `AgentId`.
    pub agents: Vec<Transportable>,

    /// Pending departures, keyed by requested departure tick.
    pub departures: WakeQueue,

    pub(crate) names: HashMap<String, AgentId>,
}

impl<R: IntermodalRouter + PedestrianRouter> Sim<R> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and for interleaving with a vehicle model.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Process the current tick and advance the clock.  Returns the number
    /// of agents released this tick.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<usize> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        // ── Phase 1: departures ───────────────────────────────────────────
        for agent in self.departures.drain_until(now) {
            self.depart(agent, now)?;
        }

        // ── Phase 2: release waits and walks ──────────────────────────────
        //
        // A release scheduled for `now` while this phase runs is picked up
        // on the next step.
        let mut advanced = 0;
        for kind in KINDS {
            let due = kind.control_mut(&mut self.controls).drain_due(now);
            for agent in due {
                self.advance(agent, now, observer)?;
                advanced += 1;
            }
        }

        observer.on_tick_end(now, advanced);
        if self.config.output_interval_ticks > 0 && now.0.is_multiple_of(self.config.output_interval_ticks) {
            observer.on_snapshot(now, &self.agents, &self.view());
        }
        if advanced > 0 {
            trace!(tick = now.0, advanced, "step done");
        }
        self.clock.advance();
        Ok(advanced)
    }

    /// `true` once every agent has finished its plan.
    pub fn is_finished(&self) -> bool {
        self.agents.iter().all(Transportable::has_arrived)
    }

    pub fn view(&self) -> SimView<'_> {
        SimView {
            now:                self.clock.current_tick,
            tick_duration_secs: self.config.tick_duration_secs,
            config:             &self.engine,
            network:            &self.network,
            vehicles:           &self.vehicles,
        }
    }

    pub fn agent(&self, name: &str) -> Option<&Transportable> {
        self.names.get(name).and_then(|id| self.agents.get(id.index()))
    }

    pub fn agent_id(&self, name: &str) -> SimResult<AgentId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownAgent(name.to_owned()))
    }

    // ── Vehicle model hooks ───────────────────────────────────────────────

    /// Put every agent waiting on the vehicle's current edge for this
    /// vehicle or its line on board.  Returns them in boarding order.
    pub fn board(&mut self, vehicle_id: &str) -> SimResult<Vec<AgentId>> {
        let now = self.clock.current_tick;
        let network = &self.network;
        let vehicle = self
            .vehicles
            .vehicle(vehicle_id)
            .ok_or_else(|| SimError::UnknownVehicle(vehicle_id.to_owned()))?;
        let edge = vehicle.edge();

        let mut boarded = Vec::new();
        for kind in KINDS {
            let control = kind.control_mut(&mut self.controls);
            for id in control.waiting_on(edge).to_vec() {
                let Some(agent) = self.agents.get_mut(id.index()) else {
                    continue;
                };
                let Some(Stage::Driving(ride)) = agent.current_stage_mut() else {
                    continue;
                };
                let wanted = ride.is_waiting_for(vehicle.id()) || ride.is_waiting_for(vehicle.line());
                if !ride.is_waiting_for_vehicle() || !wanted {
                    continue;
                }
                ride.set_vehicle(vehicle, network, now);
                control.remove_waiting(edge, id);
                boarded.push(id);
            }
        }

        if let Some(vehicle) = self.vehicles.vehicle_mut(vehicle_id) {
            for &id in &boarded {
                vehicle.add_transportable(id);
            }
        }
        if !boarded.is_empty() {
            debug!(vehicle = vehicle_id, count = boarded.len(), "boarded");
        }
        Ok(boarded)
    }

    /// Let off every agent on board whose ride ends on the vehicle's current
    /// edge.  Each one proceeds to its next stage.
    pub fn alight<O: SimObserver>(&mut self, vehicle_id: &str, observer: &mut O) -> SimResult<Vec<AgentId>> {
        let now = self.clock.current_tick;
        let vehicle = self
            .vehicles
            .vehicle(vehicle_id)
            .ok_or_else(|| SimError::UnknownVehicle(vehicle_id.to_owned()))?;
        let leaving = self.leaving(vehicle_id, vehicle.edge(), &vehicle.transportables);

        for &id in &leaving {
            if let Some(vehicle) = self.vehicles.vehicle_mut(vehicle_id) {
                vehicle.remove_transportable(id);
            }
            self.advance(id, now, observer)?;
        }
        if !leaving.is_empty() {
            debug!(vehicle = vehicle_id, count = leaving.len(), "alighted");
        }
        Ok(leaving)
    }

    /// The vehicle reached the end of its route: take it off the road and
    /// let everyone off whose ride ends here.  The vehicle is gone before
    /// the riders proceed, so a follow-up trip may reuse its id.
    pub fn vehicle_arrived<O: SimObserver>(
        &mut self,
        vehicle_id: &str,
        observer:   &mut O,
    ) -> SimResult<Vec<AgentId>> {
        let now = self.clock.current_tick;
        let mut vehicle = self
            .vehicles
            .remove_vehicle(vehicle_id)
            .ok_or_else(|| SimError::UnknownVehicle(vehicle_id.to_owned()))?;
        let leaving = self.leaving(vehicle_id, vehicle.edge(), &vehicle.transportables);
        for &id in &leaving {
            vehicle.remove_transportable(id);
            let stage = self.agents.get_mut(id.index()).and_then(Transportable::current_stage_mut);
            if let Some(Stage::Driving(ride)) = stage {
                ride.settle_distance(&vehicle, &self.network);
            }
        }
        if !vehicle.transportables.is_empty() {
            warn!(
                vehicle = vehicle_id,
                remaining = vehicle.transportables.len(),
                "vehicle left the network with transportables on board"
            );
        }
        self.vehicles.delete_vehicle(vehicle, false);

        for &id in &leaving {
            self.advance(id, now, observer)?;
        }
        if !leaving.is_empty() {
            debug!(vehicle = vehicle_id, count = leaving.len(), "alighted");
        }
        Ok(leaving)
    }

    /// Riders of `vehicle_id` whose ride ends on `edge`.
    fn leaving(&self, vehicle_id: &str, edge: EdgeId, riders: &[AgentId]) -> Vec<AgentId> {
        riders
            .iter()
            .copied()
            .filter(|id| {
                self.agents
                    .get(id.index())
                    .and_then(Transportable::current_stage)
                    .is_some_and(|stage| match stage {
                        Stage::Driving(ride) => {
                            ride.vehicle_id() == Some(vehicle_id) && stage.destination() == edge
                        }
                        _ => false,
                    })
            })
            .collect()
    }

    /// A parking search sent vehicles bound for `orig` to `replacement`.
    /// Repairs the plan of every agent currently riding.  Agents whose plan
    /// was not affected are left out of the result.
    pub fn reroute_parking_area(
        &mut self,
        orig:        StopId,
        replacement: StopId,
    ) -> SimResult<Vec<(AgentId, RepairOutcome)>> {
        let view = SimView {
            now:                self.clock.current_tick,
            tick_duration_secs: self.config.tick_duration_secs,
            config:             &self.engine,
            network:            &self.network,
            vehicles:           &self.vehicles,
        };
        let mut outcomes = Vec::new();
        for agent in &mut self.agents {
            let riding = matches!(
                agent.current_stage(),
                Some(Stage::Driving(ride)) if !ride.is_waiting_for_vehicle()
            );
            if !riding {
                continue;
            }
            let outcome = agent.reroute_parking_area(&view, orig, replacement, &self.router)?;
            if outcome != RepairOutcome::NotAffected {
                outcomes.push((agent.id(), outcome));
            }
        }
        Ok(outcomes)
    }

    // ── Plan edits ────────────────────────────────────────────────────────

    /// See [`Transportable::append_stage`].
    pub fn append_stage(&mut self, name: &str, stage: Stage, offset: Option<usize>) -> SimResult<()> {
        let id = self.agent_id(name)?;
        let agent = self
            .agents
            .get_mut(id.index())
            .ok_or_else(|| SimError::UnknownAgent(name.to_owned()))?;
        agent.append_stage(stage, offset)?;
        Ok(())
    }

    /// See [`Transportable::remove_stage`].  Returns `false` if the agent
    /// has no stages left.
    pub fn remove_stage(&mut self, name: &str, offset: usize) -> SimResult<bool> {
        let id = self.agent_id(name)?;
        let now = self.clock.current_tick;
        let agent = self
            .agents
            .get_mut(id.index())
            .ok_or_else(|| SimError::UnknownAgent(name.to_owned()))?;
        let mut ctx = StageContext {
            now,
            tick_duration_secs: self.config.tick_duration_secs,
            config:             &self.engine,
            network:            &self.network,
            router:             &self.router,
            vehicles:           &mut self.vehicles,
            control:            agent.kind().control_mut(&mut self.controls),
        };
        Ok(agent.remove_stage(&mut ctx, offset)?)
    }

    // ── Agent transitions ─────────────────────────────────────────────────

    fn depart(&mut self, id: AgentId, now: Tick) -> SimResult<()> {
        let Some(agent) = self.agents.get_mut(id.index()) else {
            return Ok(());
        };
        let mut ctx = StageContext {
            now,
            tick_duration_secs: self.config.tick_duration_secs,
            config:             &self.engine,
            network:            &self.network,
            router:             &self.router,
            vehicles:           &mut self.vehicles,
            control:            agent.kind().control_mut(&mut self.controls),
        };
        agent.start(&mut ctx)?;
        Ok(())
    }

    /// Move `id` on to its next stage and report it.  Returns `false` if the
    /// agent is done.
    fn advance<O: SimObserver>(&mut self, id: AgentId, now: Tick, observer: &mut O) -> SimResult<bool> {
        let Some(agent) = self.agents.get_mut(id.index()) else {
            return Ok(false);
        };
        if agent.has_arrived() {
            return Ok(false);
        }
        let from = agent.cursor();
        let mut ctx = StageContext {
            now,
            tick_duration_secs: self.config.tick_duration_secs,
            config:             &self.engine,
            network:            &self.network,
            router:             &self.router,
            vehicles:           &mut self.vehicles,
            control:            agent.kind().control_mut(&mut self.controls),
        };
        let moving = agent.proceed(&mut ctx)?;

        let view = SimView {
            now,
            tick_duration_secs: self.config.tick_duration_secs,
            config:             &self.engine,
            network:            &self.network,
            vehicles:           &self.vehicles,
        };
        observer.on_stage_advance(agent, from, &view);
        if !moving {
            observer.on_arrival(agent, &view);
        }
        Ok(moving)
    }
}
