//! `tp-agent` — persons and containers following a travel plan.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                    |
//! |-------------------|-------------------------------------------------------------|
//! | [`params`]        | `TransportableParams`, `TransportableKind`, `DepartPos`     |
//! | [`transportable`] | `Transportable` (plan + cursor), `RepairOutcome`            |
//! | [`loader`]        | CSV plan loader producing `PlanDef`s                         |
//! | [`error`]         | `AgentError`, `AgentResult<T>`                              |
//!
//! # Plans
//!
//! A plan always opens with an initial wait for the requested departure, so
//! every later stage has a predecessor that says where the agent stands.
//! The cursor only moves forward; inserting and removing stages keeps it
//! pointing at the same stage.

pub mod error;
pub mod loader;
pub mod params;
pub mod transportable;

#[cfg(test)]
mod tests;

pub use error::{AgentError, AgentResult};
pub use loader::{load_plans_csv, load_plans_reader, PlanDef};
pub use params::{DepartPos, TransportableKind, TransportableParams};
pub use transportable::{RepairOutcome, Transportable};
