//! CSV plan loader.
//!
//! # CSV format
//!
//! One row per stage, in plan order.  The agent columns (`kind`, `depart`,
//! `depart_pos`) are taken from an agent's first row.
//!
//! ```csv
//! agent,kind,depart,depart_pos,stage,from,to,to_stop,duration,until,act_type,modes,vtypes,lines,arrival_pos,walk_factor
//! anna,person,0,,stop,,E1,,60,,home,,,,10,
//! anna,person,0,,trip,E1,E5,,,,,passenger,,,-1,
//! box1,container,30,random,ride,E2,,contB,,,,,,ship1,,
//! ```
//!
//! **`stage`** field:
//!
//! | Value  | Stage built                                                  |
//! |--------|--------------------------------------------------------------|
//! | `stop` | `WaitingStage` on `to` (or `to_stop`'s edge)                 |
//! | `walk` | `TripStage` without modes, resolved into walks when due       |
//! | `ride` | `DrivingStage` to `to`/`to_stop` on one of `lines`           |
//! | `trip` | `TripStage` with `modes`, `vtypes` and `walk_factor`         |
//!
//! Empty `from` means the previous stage's destination.  `lines`, `modes`
//! and `vtypes` are space separated.  Stops are looked up by name among bus,
//! train and container stops, then parking areas.
//!
//! Agents come out in order of first appearance.  Persons get the
//! configured default pedestrian type, containers the default container
//! type.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use tp_core::{EdgeId, EngineConfig, ModeSet, StopId, Tick};
use tp_network::{Network, StopKind};
use tp_stage::{DrivingStage, Stage, TripStage, WaitingStage};

use crate::{AgentError, AgentResult, DepartPos, TransportableParams};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PlanRecord {
    agent:       String,
    kind:        String,
    depart:      u64,
    depart_pos:  Option<String>,
    stage:       String,
    from:        Option<String>,
    to:          Option<String>,
    to_stop:     Option<String>,
    duration:    Option<u64>,
    until:       Option<u64>,
    act_type:    Option<String>,
    modes:       Option<String>,
    vtypes:      Option<String>,
    lines:       Option<String>,
    arrival_pos: Option<f64>,
    walk_factor: Option<f64>,
}

/// A loaded agent, ready for `Transportable::new`.
#[derive(Debug)]
pub struct PlanDef {
    pub params: TransportableParams,
    pub stages: Vec<Stage>,
}

// ── Public API ────────────────────────────────────────────────────────────────

pub fn load_plans_csv(path: &Path, network: &Network, config: &EngineConfig) -> AgentResult<Vec<PlanDef>> {
    let file = std::fs::File::open(path)?;
    load_plans_reader(file, network, config)
}

/// Like [`load_plans_csv`] but accepts any `Read` source.
pub fn load_plans_reader<R: Read>(
    reader:  R,
    network: &Network,
    config:  &EngineConfig,
) -> AgentResult<Vec<PlanDef>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut plans: Vec<PlanDef> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in csv_reader.deserialize::<PlanRecord>() {
        let row = result.map_err(|e| AgentError::Parse(e.to_string()))?;
        let slot = match index.get(&row.agent) {
            Some(&i) => i,
            None => {
                index.insert(row.agent.clone(), plans.len());
                plans.push(PlanDef { params: parse_params(&row, config)?, stages: Vec::new() });
                plans.len() - 1
            }
        };
        let plan = &mut plans[slot];
        let previous = plan.stages.last().map(Stage::destination);
        plan.stages.push(parse_stage(&row, previous, network)?);
    }

    Ok(plans)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_params(row: &PlanRecord, config: &EngineConfig) -> AgentResult<TransportableParams> {
    let depart = Tick(row.depart);
    let params = match row.kind.trim() {
        "person" => TransportableParams::person(&row.agent, &config.default_ped_type, depart),
        "container" => TransportableParams::container(&row.agent, &config.default_container_type, depart),
        other => {
            return Err(AgentError::Parse(format!(
                "invalid kind {other:?} for '{}': expected \"person\" or \"container\"",
                row.agent
            )));
        }
    };
    Ok(params.with_depart_pos(parse_depart_pos(row.depart_pos.as_deref())?))
}

fn parse_depart_pos(s: Option<&str>) -> AgentResult<DepartPos> {
    match s.map(str::trim) {
        None | Some("") => Ok(DepartPos::Default),
        Some("random") => Ok(DepartPos::Random),
        Some(n) => n
            .parse::<f64>()
            .map(DepartPos::Given)
            .map_err(|_| AgentError::Parse(format!("invalid depart_pos {n:?}: expected \"random\" or metres"))),
    }
}

fn parse_stage(row: &PlanRecord, previous: Option<EdgeId>, network: &Network) -> AgentResult<Stage> {
    let stop = non_empty(&row.to_stop).map(|name| find_stop(network, name)).transpose()?;
    let to = match (non_empty(&row.to), stop) {
        (Some(name), _) => network.require_edge(name)?,
        (None, Some(stop)) => network.stop(stop).edge,
        (None, None) => {
            return Err(AgentError::Parse(format!("{} stage of '{}' has no destination", row.stage, row.agent)));
        }
    };
    let from = match non_empty(&row.from) {
        Some(name) => Some(network.require_edge(name)?),
        None => previous,
    };

    let stage = match row.stage.trim() {
        "stop" => {
            let pos = row.arrival_pos.or_else(|| stop.map(|s| network.stop(s).mid_pos())).unwrap_or(0.0);
            let act_type = row.act_type.as_deref().unwrap_or("");
            Stage::from(WaitingStage::new(network, to, row.duration, row.until.map(Tick), pos, act_type))
        }
        "walk" => {
            let from = require_from(from, row)?;
            let trip = TripStage::new(from, to, stop, row.arrival_pos.unwrap_or(-1.0))
                .with_walking(None, row.duration);
            Stage::from(trip)
        }
        "ride" => {
            let lines: Vec<&str> = non_empty(&row.lines).map(|l| l.split_whitespace().collect()).unwrap_or_default();
            if lines.is_empty() {
                return Err(AgentError::Parse(format!("ride of '{}' names no lines", row.agent)));
            }
            let length = network.length(to);
            let arrival_pos = match (row.arrival_pos, stop) {
                (Some(p), _) if p < 0.0 => (p + length).max(0.0),
                (Some(p), _) => p.min(length),
                (None, Some(s)) => network.stop(s).mid_pos(),
                (None, None) => length,
            };
            let mut ride = DrivingStage::new(to, stop, arrival_pos, lines);
            if let Some(from) = from {
                ride = ride.with_origin(from);
            }
            Stage::from(ride)
        }
        "trip" => {
            let from = require_from(from, row)?;
            let modes = match non_empty(&row.modes) {
                Some(m) => ModeSet::parse(m).map_err(|e| AgentError::Parse(e.to_string()))?,
                None => ModeSet::IGNORING,
            };
            let vtypes: Vec<&str> = non_empty(&row.vtypes).map(|v| v.split_whitespace().collect()).unwrap_or_default();
            let trip = TripStage::new(from, to, stop, row.arrival_pos.unwrap_or(-1.0))
                .with_modes(modes)
                .with_vtypes(vtypes)
                .with_walk_factor(row.walk_factor.unwrap_or(-1.0));
            Stage::from(trip)
        }
        other => {
            return Err(AgentError::Parse(format!(
                "invalid stage {other:?}: expected \"stop\", \"walk\", \"ride\" or \"trip\""
            )));
        }
    };
    Ok(stage)
}

fn require_from(from: Option<EdgeId>, row: &PlanRecord) -> AgentResult<EdgeId> {
    from.ok_or_else(|| AgentError::Parse(format!("{} stage of '{}' has no origin", row.stage, row.agent)))
}

fn find_stop(network: &Network, name: &str) -> AgentResult<StopId> {
    [StopKind::BusStop, StopKind::TrainStop, StopKind::ContainerStop, StopKind::ParkingArea]
        .into_iter()
        .find_map(|kind| network.stop_by_name(name, kind))
        .ok_or_else(|| AgentError::Parse(format!("unknown stop '{name}'")))
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
