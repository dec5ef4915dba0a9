//! `tp-stage` — the stages a transportable's plan is made of.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`stage`]    | `Stage` enum, `StageCore`, `StageKind`, `Activation`            |
//! | [`waiting`]  | `WaitingStage` — stand still for a duration or until a deadline |
//! | [`walking`]  | `WalkingStage` — teleport-at-arrival walk along a route         |
//! | [`driving`]  | `DrivingStage` — wait for and ride a vehicle                    |
//! | [`trip`]     | `TripStage`, `Resolution`, `ResolveWarning` — route on demand   |
//! | [`context`]  | `StageContext`, `SimView`, `Traveller`, `Previous`              |
//! | [`output`]   | `TripInfo`, `StageEvent`, `RouteEntry` output records           |
//! | [`error`]    | `StageError`, `StageResult<T>`                                 |
//!
//! # Life of a stage
//!
//! ```text
//! created ──proceed──▶ active (departed set) ──mark_arrived──▶ done
//! ```
//!
//! A trip stage never stays active: its `proceed` passes straight through
//! and its owner resolves it into concrete stages that are spliced in right
//! behind it.

pub mod context;
pub mod driving;
pub mod error;
pub mod output;
pub mod stage;
pub mod trip;
pub mod waiting;
pub mod walking;


pub use context::{Previous, SimView, StageContext, Traveller};
pub use driving::DrivingStage;
pub use error::{StageError, StageResult};
pub use output::{RouteEntry, StageEvent, TripInfo};
pub use stage::{Activation, Stage, StageCore, StageKind};
pub use trip::{Resolution, ResolveWarning, TripStage};
pub use waiting::WaitingStage;
pub use walking::WalkingStage;
