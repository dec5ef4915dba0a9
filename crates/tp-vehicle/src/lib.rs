//! `tp-vehicle` — vehicle types, vehicles, and the vehicle registry.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                         |
//! |--------------|------------------------------------------------------------------|
//! | [`vtype`]    | `VehicleType` (shared or singular copy-on-write)                 |
//! | [`vehicle`]  | `VehicleParams`, `DepartProcedure`, `Vehicle`                    |
//! | [`registry`] | `VehicleRegistry` trait, `VehicleControl` default implementation |
//! | [`error`]    | `VehicleError`, `VehicleResult<T>`                               |
//!
//! # Ownership
//!
//! Vehicles are owned by the registry once added.  Stages refer to them by
//! id only and look them up through the registry when they need position or
//! speed, so a stage never outlives the vehicle it points at.

pub mod error;
pub mod registry;
pub mod vehicle;
pub mod vtype;


pub use error::{VehicleError, VehicleResult};
pub use registry::{VehicleControl, VehicleRegistry, VehicleStats};
pub use vehicle::{DepartProcedure, Vehicle, VehicleParams};
pub use vtype::VehicleType;
