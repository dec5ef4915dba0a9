//! `tp-network` — network edges, stopping places, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`network`] | `Network` (CSR junction graph of named edges), `NetworkBuilder` |
//! | [`stop`]    | `Stop`, `StopKind`, `StopDef` — named stopping places           |
//! | [`router`]  | `PedestrianRouter`, `IntermodalRouter`, `TripItem`, `DijkstraRouter` |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod error;
pub mod network;
pub mod router;
pub mod stop;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use network::{Network, NetworkBuilder};
pub use router::{
    DijkstraRouter, IntermodalRouter, PedestrianRouter, TripItem, TripRequest, VehicleProposal,
};
pub use stop::{Stop, StopDef, StopKind};
