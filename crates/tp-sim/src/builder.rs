//! Fluent builder for constructing a [`Sim`].

use std::collections::HashMap;

use tp_agent::{PlanDef, Transportable};
use tp_core::{AgentId, AgentRng, EngineConfig, SimConfig};
use tp_network::{IntermodalRouter, Network, PedestrianRouter};
use tp_schedule::{Controls, WakeQueue};
use tp_vehicle::VehicleControl;
use tracing::debug;

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — total ticks, seed, tick duration, …
/// - [`Network`] — edges and stops the plans refer to
/// - `R` — the router, used both for trips and for walk repair
///   (e.g. [`tp_network::DijkstraRouter`])
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                        |
/// |-----------------|------------------------------------------------|
/// | `.engine(e)`    | `EngineConfig::default()`                      |
/// | `.plans(v)`     | No agents                                      |
/// | `.vehicles(v)`  | `VehicleControl::with_default_types(&engine)`  |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, network, DijkstraRouter)
///     .plans(load_plans_csv(path, &network, &engine)?)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<R> {
    config:   SimConfig,
    engine:   Option<EngineConfig>,
    network:  Network,
    router:   R,
    plans:    Vec<PlanDef>,
    vehicles: Option<VehicleControl>,
}

impl<R: IntermodalRouter + PedestrianRouter> SimBuilder<R> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, network: Network, router: R) -> Self {
        Self {
            config,
            engine:   None,
            network,
            router,
            plans:    Vec::new(),
            vehicles: None,
        }
    }

    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Supply the agents.  Agent ids follow the order of `plans`.
    pub fn plans(mut self, plans: Vec<PlanDef>) -> Self {
        self.plans = plans;
        self
    }

    /// Supply a vehicle registry, e.g. with extra vehicle types or vehicles
    /// already on the road.
    pub fn vehicles(mut self, vehicles: VehicleControl) -> Self {
        self.vehicles = Some(vehicles);
        self
    }

    /// Validate the plans, build every agent and its departure, and return a
    /// ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<R>> {
        let engine = self.engine.unwrap_or_default();
        let vehicles = self
            .vehicles
            .unwrap_or_else(|| VehicleControl::with_default_types(&engine));

        // ── Build agents ──────────────────────────────────────────────────
        let mut agents = Vec::with_capacity(self.plans.len());
        let mut names: HashMap<String, AgentId> = HashMap::with_capacity(self.plans.len());
        let mut departures = WakeQueue::new();
        for (i, def) in self.plans.into_iter().enumerate() {
            let id = AgentId(i as u32);
            if names.insert(def.params.id.clone(), id).is_some() {
                return Err(SimError::DuplicateAgent(def.params.id));
            }
            let mut rng = AgentRng::new(self.config.seed, id);
            let agent = Transportable::new(id, def.params, def.stages, &self.network, &mut rng)?;
            // Unknown types would otherwise surface only at departure.
            agent.vehicle_type(&vehicles)?;
            departures.push(agent.desired_depart(), id);
            agents.push(agent);
        }
        debug!(agents = agents.len(), "simulation built");

        Ok(Sim {
            clock:    self.config.make_clock(),
            config:   self.config,
            engine,
            network:  self.network,
            router:   self.router,
            vehicles,
            controls: Controls::new(),
            agents,
            names,
            departures,
        })
    }
}
