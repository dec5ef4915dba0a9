//! `tp-core` — foundational types for the transportable stage-plan engine.
//!
//! This crate is a dependency of every other `tp-*` crate.  It has no `tp-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `NodeId`, `EdgeId`, `StopId`               |
//! | [`geo`]         | `Position`, `Shape` (polyline with lateral offsets)   |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]         | `AgentRng` (per-agent)                                |
//! | [`modes`]       | `ModeSet` permission / vehicle-class bitset           |
//! | [`config`]      | `EngineConfig` (strict routing, driving side, …)      |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod modes;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::EngineConfig;
pub use error::{CoreError, CoreResult};
pub use geo::{Position, Shape};
pub use ids::{AgentId, EdgeId, NodeId, StopId};
pub use modes::ModeSet;
pub use rng::AgentRng;
pub use time::{SimClock, SimConfig, Tick};
