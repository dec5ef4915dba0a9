//! `tp-sim` — step loop orchestrator for transportables.
//!
//! # One step
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Depart   — agents whose requested departure is due start their plan.
//!   ② Release  — drain the person and container registries of agents whose
//!                wait or walk ends now; each proceeds to its next stage.
//!   ③ Observe  — observer hooks see every stage change and arrival.
//!   ④ Advance  — the clock moves on by one tick.
//! ```
//!
//! Vehicles are moved by an external model.  Between steps it reports back
//! through [`Sim::board`], [`Sim::alight`] and [`Sim::vehicle_arrived`], and
//! a parking search that sends a vehicle elsewhere calls
//! [`Sim::reroute_parking_area`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tp_agent::load_plans_csv;
//! use tp_network::DijkstraRouter;
//! use tp_sim::{NoopObserver, SimBuilder};
//!
//! let plans = load_plans_csv(path, &network, &engine)?;
//! let mut sim = SimBuilder::new(config, network, DijkstraRouter)
//!     .engine(engine)
//!     .plans(plans)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
