//! commute — smallest end-to-end run of the transportable stage engine.
//!
//! Two persons and a container on a four-edge corridor:
//!
//! - `anna` stops at home, drives to parking area `parkE3` and works on E4.
//!   On the way the parking area is full and her car is sent on to
//!   `parkE4`, so her plan is repaired mid-ride.
//! - `bob` walks to bus stop `busB`, rides line `bus1` and shops on E4.
//! - `box1` waits to be loaded on E2.
//!
//! Vehicles are moved by the toy model in this file.  Set `RUST_LOG=debug`
//! to watch trip resolution and boarding.

mod network;

use std::io::Cursor;
use std::path::Path;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tp_agent::load_plans_reader;
use tp_core::{EngineConfig, ModeSet, SimConfig, Tick};
use tp_network::{DijkstraRouter, StopKind};
use tp_output::{CsvWriter, PlanOutputObserver};
use tp_sim::{Sim, SimBuilder, SimObserver, SimResult};
use tp_vehicle::{DepartProcedure, VehicleControl, VehicleParams, VehicleRegistry, VehicleType};

use network::build_network;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:               u64 = 42;
const TICK_DURATION_SECS: u32 = 1;
const TOTAL_TICKS:        u64 = 1_200;
const BUS_DEPART:         Tick = Tick(240);

// ── Plans ─────────────────────────────────────────────────────────────────────

const PLANS_CSV: &str = "\
agent,kind,depart,depart_pos,stage,from,to,to_stop,duration,until,act_type,modes,vtypes,lines,arrival_pos,walk_factor\n\
anna,person,0,,stop,,E1,,60,,home,,,,10,\n\
anna,person,0,,trip,E1,E3,parkE3,,,,car,,,,\n\
anna,person,0,,walk,,E4,,,,,,,,80,\n\
anna,person,0,,stop,,E4,,300,,work,,,,80,\n\
bob,person,30,,walk,E1,E2,busB,,,,,,,,\n\
bob,person,30,,ride,,E4,,,,,,,bus1,40,\n\
bob,person,30,,stop,,E4,,120,,shop,,,,40,\n\
box1,container,0,20,stop,,E2,,30,,load,,,,20,\n\
";

// ── Vehicle model ─────────────────────────────────────────────────────────────

/// Drives every vehicle that is ready at its type's maximum speed, lets
/// agents on and off, and retires vehicles at the end of their route.
fn move_vehicles<O: SimObserver>(sim: &mut Sim<DijkstraRouter>, observer: &mut O) -> SimResult<()> {
    let now = sim.clock.current_tick;
    let secs = sim.config.tick_duration_secs as f64;
    let ids: Vec<String> = sim.vehicles.vehicle_ids().into_iter().map(str::to_owned).collect();

    for id in ids {
        sim.board(&id)?;
        let network = &sim.network;
        let Some(vehicle) = sim.vehicles.vehicle_mut(&id) else {
            continue;
        };
        let ready = match vehicle.params.depart {
            DepartProcedure::Given(t) => now >= t,
            DepartProcedure::Triggered => !vehicle.transportables.is_empty(),
        };
        if !ready {
            continue;
        }

        let last = vehicle.route.len() - 1;
        let speed = vehicle.max_speed;
        let mut index = vehicle.route_index;
        let mut pos = vehicle.pos_on_edge + speed * secs;
        while index < last && pos >= network.length(vehicle.route[index]) {
            pos -= network.length(vehicle.route[index]);
            index += 1;
        }
        let end = vehicle
            .arrival_pos
            .unwrap_or_else(|| network.length(vehicle.route[last]));
        let arrived = index == last && pos >= end;
        if arrived {
            pos = end;
        }
        let edge = vehicle.route[index];
        let position = network.edge_position(edge, pos, 0.0);
        let angle = network.edge_angle(edge, pos);
        vehicle.move_to(index, pos, position, angle, if arrived { 0.0 } else { speed });

        if arrived {
            sim.vehicle_arrived(&id, observer)?;
        } else {
            sim.alight(&id, observer)?;
        }
    }
    Ok(())
}

/// Parking area `parkE3` fills up: the car heading there continues to
/// `parkE4` and its driver's plan is repaired.
fn close_parking(sim: &mut Sim<DijkstraRouter>, car: &str) -> SimResult<bool> {
    let (Some(full), Some(free)) = (
        sim.network.stop_by_name("parkE3", StopKind::ParkingArea),
        sim.network.stop_by_name("parkE4", StopKind::ParkingArea),
    ) else {
        return Ok(false);
    };
    let (Some(e2), Some(e3), Some(e4)) = (sim.network.edge("E2"), sim.network.edge("E3"), sim.network.edge("E4")) else {
        return Ok(false);
    };
    let arrival = sim.network.stop(free).mid_pos();
    let Some(vehicle) = sim.vehicles.vehicle_mut(car) else {
        return Ok(false);
    };
    if vehicle.edge() != e2 || !vehicle.replace_route(&[e2, e3, e4]) {
        return Ok(false);
    }
    vehicle.set_arrival_pos(arrival);

    for (agent, outcome) in sim.reroute_parking_area(full, free)? {
        info!(agent = agent.0, ?outcome, "parking area closed, plan repaired");
    }
    Ok(true)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== commute — transportable stage engine ===");

    // 1. Network and configuration.
    let network = build_network()?;
    println!("Network: {} nodes, {} edges", network.node_count(), network.edge_count());
    let engine = EngineConfig::default();
    let config = SimConfig {
        start_unix_secs:       1_700_000_000,
        tick_duration_secs:    TICK_DURATION_SECS,
        total_ticks:           TOTAL_TICKS,
        seed:                  SEED,
        output_interval_ticks: 60,
    };

    // 2. Vehicles: the default types plus a bus on line bus1, waiting at busB.
    let mut vehicles = VehicleControl::with_default_types(&engine);
    vehicles.add_vehicle_type(VehicleType::new("bus", ModeSet::BUS, 13.9).with_size(12.0, 2.5));
    let route: Vec<_> = ["E2", "E3", "E4"].iter().filter_map(|e| network.edge(e)).collect();
    let mut bus = vehicles.build_vehicle(
        VehicleParams::scheduled("bus1_0", "bus", "bus1", BUS_DEPART),
        route,
        &network,
        false,
    )?;
    bus.move_to(0, 50.0, network.edge_position(bus.edge(), 50.0, 0.0), network.edge_angle(bus.edge(), 50.0), 0.0);
    vehicles.add_vehicle(bus)?;

    // 3. Plans.
    let plans = load_plans_reader(Cursor::new(PLANS_CSV), &network, &engine)?;
    println!("Loaded {} plans", plans.len());

    // 4. Build and run.
    let mut sim = SimBuilder::new(config.clone(), network, DijkstraRouter)
        .engine(engine)
        .vehicles(vehicles)
        .plans(plans)
        .build()?;

    let out_dir = Path::new("./output");
    std::fs::create_dir_all(out_dir)?;
    let mut obs = PlanOutputObserver::new(CsvWriter::new(out_dir)?, &config);

    let mut parking_closed = false;
    while sim.clock.current_tick < config.end_tick() && !sim.is_finished() {
        move_vehicles(&mut sim, &mut obs)?;
        if !parking_closed {
            parking_closed = close_parking(&mut sim, "anna_0")?;
        }
        sim.step(&mut obs)?;
    }
    obs.on_sim_end(sim.clock.current_tick);
    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Report.
    println!();
    println!("Finished at tick {}", sim.clock.current_tick.0);
    for agent in &sim.agents {
        let state = if agent.has_arrived() { "arrived" } else { "en route" };
        println!("{} ({}): {state}", agent.name(), agent.kind().as_str());
        for stage in agent.plan().iter().skip(1) {
            println!("    {}", stage.stage_summary(&sim.network));
        }
    }
    let stats = sim.vehicles.stats();
    println!(
        "Vehicles: {} built, {} added, {} retired, {} discarded",
        stats.built, stats.added, stats.deleted, stats.discarded
    );
    println!("Output written to {}", out_dir.display());
    Ok(())
}
