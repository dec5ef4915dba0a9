//! Output records produced by stages.
//!
//! Stages only describe what happened; `tp-output` decides how it is
//! written.  Times are ticks, positions metres, names the network's edge,
//! stop and vehicle ids.

use tp_core::Tick;

/// One entry of an agent's trip summary.
#[derive(Clone, Debug, PartialEq)]
pub enum TripInfo {
    Stop {
        duration:    u64,
        arrival:     Tick,
        arrival_pos: f64,
        act_type:    String,
    },
    Ride {
        /// Ticks spent waiting for the vehicle.
        waiting_time: u64,
        vehicle:      String,
        /// Boarding tick.
        depart:       Option<Tick>,
        arrival:      Option<Tick>,
        arrival_pos:  f64,
        duration:     u64,
        /// Distance ridden; `None` if the stage never boarded.
        route_length: Option<f64>,
        intended:     String,
    },
    Walk {
        depart:       Tick,
        depart_pos:   f64,
        arrival:      Option<Tick>,
        arrival_pos:  f64,
        duration:     u64,
        route_length: f64,
    },
}

impl TripInfo {
    pub fn tag(&self) -> &'static str {
        match self {
            TripInfo::Stop { .. } => "stop",
            TripInfo::Ride { .. } => "ride",
            TripInfo::Walk { .. } => "walk",
        }
    }
}

/// A begin or end event of a stage.
#[derive(Clone, Debug, PartialEq)]
pub struct StageEvent {
    pub time: Tick,
    /// `"actstart work"`, `"departure"`, `"arrival"`, …
    pub kind: String,
    /// Edge the agent was on.
    pub link: String,
}

/// One stage of a persisted plan, enough to replay it.
#[derive(Clone, Debug, PartialEq)]
pub enum RouteEntry {
    Stop {
        edge:     String,
        duration: Option<u64>,
        until:    Option<Tick>,
        act_type: String,
    },
    Ride {
        from:     String,
        to:       String,
        to_stop:  String,
        /// Space separated.
        lines:    String,
        intended: String,
    },
    Walk {
        edges:        Vec<String>,
        to_stop:      String,
        arrival_pos:  f64,
        route_length: f64,
    },
}
