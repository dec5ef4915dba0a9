//! `tp-schedule` — when agents need attention, and where they are waiting.
//!
//! # Crate layout
//!
//! | Module         | Contents                                               |
//! |----------------|--------------------------------------------------------|
//! | [`wake_queue`] | `WakeQueue` (`BTreeMap<Tick, Vec<AgentId>>`)           |
//! | [`control`]    | `TransportableControl`, `Controls`                     |
//!
//! Persons and containers are registered with separate controls.  Stages
//! never pick one themselves; the caller hands them the right one through
//! the stage context.

pub mod control;
pub mod wake_queue;


pub use control::{Controls, TransportableControl};
pub use wake_queue::WakeQueue;
