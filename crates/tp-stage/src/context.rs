//! State threaded through every stage operation.
//!
//! Stages never reach for global simulation state.  Everything they read or
//! mutate arrives through one of these values, built by the caller for the
//! duration of a single call.

use tp_core::{AgentId, EdgeId, EngineConfig, StopId, Tick};
use tp_network::{IntermodalRouter, Network};
use tp_schedule::TransportableControl;
use tp_vehicle::VehicleRegistry;

use crate::Stage;

/// Read-only view used by position, speed and output queries.
#[derive(Copy, Clone)]
pub struct SimView<'a> {
    pub now: Tick,

    /// How many seconds one tick represents.
    pub tick_duration_secs: u32,

    pub config:   &'a EngineConfig,
    pub network:  &'a Network,
    pub vehicles: &'a dyn VehicleRegistry,
}

/// Mutable context for activating, resolving and aborting stages.
///
/// `control` is the waiting registry for the agent's kind; the caller picks
/// it, so stages never need to know what kind of agent they belong to.
pub struct StageContext<'a> {
    pub now:                Tick,
    pub tick_duration_secs: u32,
    pub config:             &'a EngineConfig,
    pub network:            &'a Network,
    pub router:             &'a dyn IntermodalRouter,
    pub vehicles:           &'a mut dyn VehicleRegistry,
    pub control:            &'a mut TransportableControl,
}

impl StageContext<'_> {
    /// Borrow as a read-only view.
    pub fn view(&self) -> SimView<'_> {
        SimView {
            now:                self.now,
            tick_duration_secs: self.tick_duration_secs,
            config:             self.config,
            network:            self.network,
            vehicles:           &*self.vehicles,
        }
    }
}

/// The agent a stage operation is performed for.
#[derive(Copy, Clone, Debug)]
pub struct Traveller<'a> {
    pub id:        AgentId,
    pub name:      &'a str,
    /// Maximum speed of the agent's own vehicle type (m/s).
    pub max_speed: f64,
    /// Requested departure.
    pub depart:    Tick,
}

/// Where the preceding stage left the agent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Previous {
    pub edge:        EdgeId,
    pub arrival_pos: f64,
    pub stop:        Option<StopId>,
}

impl Previous {
    /// A trip that was passed through leaves the agent where it started.
    pub fn of(stage: &Stage) -> Self {
        if let Stage::Trip(trip) = stage {
            return Self { edge: trip.origin(), arrival_pos: trip.depart_pos(), stop: None };
        }
        Self {
            edge:        stage.destination(),
            arrival_pos: stage.arrival_pos(),
            stop:        stage.destination_stop(),
        }
    }
}
