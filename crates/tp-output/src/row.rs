//! Plain data row types written by output backends.
//!
//! Times are ticks.  Optional numbers stay `None` when the stage never got
//! that far; backends write them as empty cells or `NULL`.

use tp_stage::{RouteEntry, StageEvent, TripInfo};

/// One stop, ride or walk of an arrived agent.
#[derive(Debug, Clone, PartialEq)]
pub struct TripInfoRow {
    pub agent:        String,
    /// Position of the stage in the agent's plan.
    pub stage:        u32,
    /// `"stop"`, `"ride"` or `"walk"`.
    pub kind:         &'static str,
    pub depart:       Option<u64>,
    pub arrival:      Option<u64>,
    pub duration:     u64,
    /// Ticks spent waiting for a vehicle; 0 for stops and walks.
    pub waiting_time: u64,
    pub vehicle:      String,
    pub route_length: Option<f64>,
    pub arrival_pos:  f64,
    pub act_type:     String,
}

impl TripInfoRow {
    pub fn new(agent: &str, stage: u32, info: &TripInfo) -> Self {
        let base = Self {
            agent:        agent.to_owned(),
            stage,
            kind:         info.tag(),
            depart:       None,
            arrival:      None,
            duration:     0,
            waiting_time: 0,
            vehicle:      String::new(),
            route_length: None,
            arrival_pos:  0.0,
            act_type:     String::new(),
        };
        match info {
            TripInfo::Stop { duration, arrival, arrival_pos, act_type } => Self {
                arrival:     Some(arrival.0),
                duration:    *duration,
                arrival_pos: *arrival_pos,
                act_type:    act_type.clone(),
                ..base
            },
            TripInfo::Ride { waiting_time, vehicle, depart, arrival, arrival_pos, duration, route_length, .. } => {
                Self {
                    depart:       depart.map(|t| t.0),
                    arrival:      arrival.map(|t| t.0),
                    duration:     *duration,
                    waiting_time: *waiting_time,
                    vehicle:      vehicle.clone(),
                    route_length: *route_length,
                    arrival_pos:  *arrival_pos,
                    ..base
                }
            }
            TripInfo::Walk { depart, arrival, arrival_pos, duration, route_length, .. } => Self {
                depart:       Some(depart.0),
                arrival:      arrival.map(|t| t.0),
                duration:     *duration,
                route_length: Some(*route_length),
                arrival_pos:  *arrival_pos,
                ..base
            },
        }
    }
}

/// A stage beginning or ending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub time:  u64,
    pub agent: String,
    /// `"actstart work"`, `"departure"`, `"arrival"`, …
    pub kind:  String,
    pub link:  String,
}

impl EventRow {
    pub fn new(agent: &str, event: &StageEvent) -> Self {
        Self {
            time:  event.time.0,
            agent: agent.to_owned(),
            kind:  event.kind.clone(),
            link:  event.link.clone(),
        }
    }
}

/// One stage of a persisted plan.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub agent:       String,
    pub stage:       u32,
    /// `"stop"`, `"ride"` or `"walk"`.
    pub kind:        &'static str,
    /// Space separated edge names: the stop edge, a ride's origin and
    /// destination, or a walk's route.
    pub edges:       String,
    pub to_stop:     String,
    /// Space separated.
    pub lines:       String,
    pub duration:    Option<u64>,
    pub until:       Option<u64>,
    pub act_type:    String,
    pub arrival_pos: Option<f64>,
    pub intended:    String,
}

impl RouteRow {
    pub fn new(agent: &str, stage: u32, entry: &RouteEntry) -> Self {
        let base = Self {
            agent:       agent.to_owned(),
            stage,
            kind:        "",
            edges:       String::new(),
            to_stop:     String::new(),
            lines:       String::new(),
            duration:    None,
            until:       None,
            act_type:    String::new(),
            arrival_pos: None,
            intended:    String::new(),
        };
        match entry {
            RouteEntry::Stop { edge, duration, until, act_type } => Self {
                kind:     "stop",
                edges:    edge.clone(),
                duration: *duration,
                until:    until.map(|t| t.0),
                act_type: act_type.clone(),
                ..base
            },
            RouteEntry::Ride { from, to, to_stop, lines, intended } => Self {
                kind:     "ride",
                edges:    if from.is_empty() { to.clone() } else { format!("{from} {to}") },
                to_stop:  to_stop.clone(),
                lines:    lines.clone(),
                intended: intended.clone(),
                ..base
            },
            RouteEntry::Walk { edges, to_stop, arrival_pos, .. } => Self {
                kind:        "walk",
                edges:       edges.join(" "),
                to_stop:     to_stop.clone(),
                arrival_pos: Some(*arrival_pos),
                ..base
            },
        }
    }
}

/// Where one agent stands at a snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub tick:   u64,
    pub agent:  String,
    /// Plan index of the current stage.
    pub stage:  u32,
    /// [`StageKind::as_str`][tp_stage::StageKind::as_str]; `"arrived"` once
    /// the plan is done.
    pub kind:   &'static str,
    pub edge:   String,
    pub pos:    f64,
    pub x:      f64,
    pub y:      f64,
    pub speed:  f64,
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:            u64,
    pub unix_time_secs:  i64,
    pub advanced_agents: u64,
}
