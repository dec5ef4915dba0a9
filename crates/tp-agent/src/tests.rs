//! Unit tests for tp-agent.

use std::io::Cursor;

use tp_core::{AgentId, AgentRng, EdgeId, EngineConfig, ModeSet, Position, StopId, Tick};
use tp_network::{
    DijkstraRouter, IntermodalRouter, Network, NetworkBuilder, NetworkError, PedestrianRouter,
    StopDef, StopKind,
};
use tp_schedule::Controls;
use tp_stage::{DrivingStage, SimView, Stage, StageContext, StageKind, TripStage, WaitingStage, WalkingStage};
use tp_vehicle::{VehicleControl, VehicleParams, VehicleRegistry, VehicleType};

use crate::{
    load_plans_reader, AgentError, DepartPos, RepairOutcome, Transportable, TransportableKind,
    TransportableParams,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `E1`..`E4` in a line, 100 m each.  Parking areas on `E3` and `E4`
/// (10–30 m), container stop `contB` on `E2` (40–60 m).
fn corridor() -> Network {
    let mut b = NetworkBuilder::new();
    let n: Vec<_> = (0..5).map(|i| b.add_node(Position::new(i as f64 * 100.0, 0.0))).collect();
    for i in 0..4 {
        b.add_edge(&format!("E{}", i + 1), n[i], n[i + 1], 100.0, ModeSet::ALL);
    }
    b.add_stop(StopDef::new("parkE3", StopKind::ParkingArea, "E3", 10.0, 30.0));
    b.add_stop(StopDef::new("parkE4", StopKind::ParkingArea, "E4", 10.0, 30.0));
    b.add_stop(StopDef::new("contB", StopKind::ContainerStop, "E2", 40.0, 60.0));
    b.build().unwrap()
}

/// A pedestrian router that never finds anything.
struct Blocked;

impl PedestrianRouter for Blocked {
    fn compute_walk(
        &self,
        network: &Network,
        from:    EdgeId,
        to:      EdgeId,
        _:       f64,
        _:       f64,
        _:       f64,
    ) -> Result<Vec<EdgeId>, NetworkError> {
        Err(NetworkError::NoRoute {
            from: network.edge_name(from).to_owned(),
            to:   network.edge_name(to).to_owned(),
        })
    }
}

struct Fixture {
    net:      Network,
    config:   EngineConfig,
    vehicles: VehicleControl,
    controls: Controls,
    router:   DijkstraRouter,
}

impl Fixture {
    fn new() -> Self {
        let config = EngineConfig::default();
        Self {
            net:      corridor(),
            vehicles: VehicleControl::with_default_types(&config),
            controls: Controls::new(),
            router:   DijkstraRouter,
            config,
        }
    }

    fn edge(&self, name: &str) -> EdgeId {
        self.net.edge(name).unwrap()
    }

    fn ctx(&mut self, now: Tick, kind: TransportableKind) -> StageContext<'_> {
        StageContext {
            now,
            tick_duration_secs: 1,
            config:   &self.config,
            network:  &self.net,
            router:   &self.router as &dyn IntermodalRouter,
            vehicles: &mut self.vehicles,
            control:  kind.control_mut(&mut self.controls),
        }
    }

    fn view(&self, now: Tick) -> SimView<'_> {
        SimView {
            now,
            tick_duration_secs: 1,
            config:   &self.config,
            network:  &self.net,
            vehicles: &self.vehicles,
        }
    }

    fn person(&self, stages: Vec<Stage>) -> Transportable {
        let params = TransportableParams::person("anna", "DEFAULT_PEDTYPE", Tick(5));
        Transportable::new(AgentId(0), params, stages, &self.net, &mut AgentRng::new(1, AgentId(0))).unwrap()
    }

    fn stop(&self, edge: &str, secs: u64) -> Stage {
        Stage::from(WaitingStage::new(&self.net, self.edge(edge), Some(secs), None, 50.0, "work"))
    }

    /// Start `agent` and move it onto its first real stage.
    fn depart(&mut self, agent: &mut Transportable) {
        let now = agent.desired_depart();
        let kind = agent.kind();
        agent.start(&mut self.ctx(now, kind)).unwrap();
        assert_eq!(kind.control_mut(&mut self.controls).drain_due(now), vec![agent.id()]);
        assert!(agent.proceed(&mut self.ctx(now, kind)).unwrap());
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod construction_tests {
    use super::*;

    #[test]
    fn plan_opens_with_initial_wait() {
        let f = Fixture::new();
        let agent = f.person(vec![f.stop("E2", 60)]);
        assert_eq!(agent.num_stages(), 2);
        assert_eq!(agent.cursor(), 0);
        assert_eq!(agent.current_stage_kind(), Some(StageKind::WaitingForDepart));
        assert!(!agent.has_arrived());
        assert_eq!(agent.edge(&f.view(Tick(0))), f.edge("E2"));
        assert_eq!(agent.desired_depart(), Tick(5));
        assert_eq!(agent.vtype_id(), "DEFAULT_PEDTYPE");
    }

    #[test]
    fn empty_plan_is_rejected() {
        let f = Fixture::new();
        let params = TransportableParams::person("anna", "DEFAULT_PEDTYPE", Tick(0));
        let err = Transportable::new(AgentId(0), params, Vec::new(), &f.net, &mut AgentRng::new(1, AgentId(0)));
        assert!(matches!(err, Err(AgentError::EmptyPlan(name)) if name == "anna"));
    }

    #[test]
    fn ride_first_needs_an_origin() {
        let f = Fixture::new();
        let params = TransportableParams::person("anna", "DEFAULT_PEDTYPE", Tick(0));
        let ride = Stage::from(DrivingStage::new(f.edge("E3"), None, 50.0, ["bus"]));
        let err = Transportable::new(AgentId(0), params.clone(), vec![ride], &f.net, &mut AgentRng::new(1, AgentId(0)));
        assert!(matches!(err, Err(AgentError::NoOrigin(_))));

        let ride = Stage::from(DrivingStage::new(f.edge("E3"), None, 50.0, ["bus"]).with_origin(f.edge("E2")));
        let agent = Transportable::new(AgentId(0), params, vec![ride], &f.net, &mut AgentRng::new(1, AgentId(0))).unwrap();
        assert_eq!(agent.edge(&f.view(Tick(0))), f.edge("E2"));
    }

    #[test]
    fn depart_pos_variants() {
        let f = Fixture::new();
        let build = |pos| {
            let params = TransportableParams::person("anna", "DEFAULT_PEDTYPE", Tick(0)).with_depart_pos(pos);
            Transportable::new(AgentId(3), params, vec![f.stop("E1", 1)], &f.net, &mut AgentRng::new(9, AgentId(3)))
                .unwrap()
        };
        assert_eq!(build(DepartPos::Default).edge_pos(&f.view(Tick(0))), 0.0);
        assert_eq!(build(DepartPos::Given(-10.0)).edge_pos(&f.view(Tick(0))), 90.0);
        let random = build(DepartPos::Random).edge_pos(&f.view(Tick(0)));
        assert!((0.0..100.0).contains(&random));
        assert_eq!(build(DepartPos::Random).edge_pos(&f.view(Tick(0))), random, "seeded per agent");
    }
}

// ── Advancing ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod proceed_tests {
    use super::*;

    #[test]
    fn start_schedules_departure() {
        let mut f = Fixture::new();
        let mut agent = f.person(vec![f.stop("E2", 60)]);
        agent.start(&mut f.ctx(Tick(5), TransportableKind::Person)).unwrap();
        assert_eq!(f.controls.persons.next_wait_end(), Some(Tick(5)));
        assert!(f.controls.containers.next_wait_end().is_none());
    }

    #[test]
    fn walks_through_plan_to_arrival() {
        let mut f = Fixture::new();
        let mut agent = f.person(vec![f.stop("E2", 60), f.stop("E3", 10)]);
        f.depart(&mut agent);
        assert_eq!(agent.cursor(), 1);
        assert_eq!(agent.current_stage_kind(), Some(StageKind::Waiting));
        assert_eq!(f.controls.persons.next_wait_end(), Some(Tick(65)));
        assert_eq!(agent.plan()[0].arrived(), Some(Tick(5)));

        assert!(agent.proceed(&mut f.ctx(Tick(65), TransportableKind::Person)).unwrap());
        assert_eq!(agent.num_remaining_stages(), 1);
        assert!(!agent.proceed(&mut f.ctx(Tick(75), TransportableKind::Person)).unwrap());
        assert!(agent.has_arrived());
        assert_eq!(agent.cursor(), agent.num_stages());
        assert_eq!(agent.num_remaining_stages(), 0);
        assert!(agent.current_stage().is_none());
        assert_eq!(agent.edge(&f.view(Tick(75))), f.edge("E3"));

        // Cursor never runs past the end.
        assert!(!agent.proceed(&mut f.ctx(Tick(76), TransportableKind::Person)).unwrap());
        assert_eq!(agent.cursor(), agent.num_stages());
    }

    #[test]
    fn trip_is_resolved_and_spliced() {
        let mut f = Fixture::new();
        let trip = TripStage::new(f.edge("E1"), f.edge("E3"), None, 40.0);
        let mut agent = f.person(vec![Stage::from(trip)]);
        f.depart(&mut agent);

        assert_eq!(agent.num_stages(), 3);
        assert_eq!(agent.cursor(), 2);
        assert_eq!(agent.current_stage_kind(), Some(StageKind::MovingWithoutVehicle));
        match &agent.plan()[1] {
            Stage::Trip(t) => assert!(t.is_resolved()),
            other => panic!("expected trip, got {other:?}"),
        }
        match agent.current_stage() {
            Some(Stage::Walking(w)) => {
                assert_eq!(w.route(), &[f.edge("E1"), f.edge("E2"), f.edge("E3")]);
                assert_eq!(w.depart_pos(), 0.0);
            }
            other => panic!("expected walk, got {other:?}"),
        }
        assert_eq!(agent.destination(), f.edge("E3"));

        let end = f.controls.persons.next_wait_end().unwrap();
        assert!(!agent.proceed(&mut f.ctx(end, TransportableKind::Person)).unwrap());
        assert_eq!(agent.num_stages(), 3, "a resolved trip is not resolved again");
    }

    #[test]
    fn strict_routing_failure_surfaces() {
        let mut f = Fixture::new();
        f.config.strict_routes = true;
        // E3 → E1 runs against every edge.
        let trip = TripStage::new(f.edge("E3"), f.edge("E1"), None, -1.0);
        let mut agent = f.person(vec![Stage::from(trip)]);
        agent.start(&mut f.ctx(Tick(5), TransportableKind::Person)).unwrap();
        f.controls.persons.drain_due(Tick(5));
        let err = agent.proceed(&mut f.ctx(Tick(5), TransportableKind::Person)).unwrap_err();
        assert_eq!(err.to_string(), "No connection found between 'E3' and 'E1' for person 'anna'.");
    }

    #[test]
    fn containers_wait_in_their_own_registry() {
        let mut f = Fixture::new();
        let params = TransportableParams::container("box1", "DEFAULT_CONTAINERTYPE", Tick(0));
        let ride = DrivingStage::new(f.edge("E3"), None, 50.0, ["ship1"]).with_origin(f.edge("E2"));
        let mut agent =
            Transportable::new(AgentId(7), params, vec![Stage::from(ride)], &f.net, &mut AgentRng::new(1, AgentId(7)))
                .unwrap();
        f.depart(&mut agent);
        assert_eq!(f.controls.containers.waiting_on(f.edge("E2")), &[AgentId(7)]);
        assert!(f.controls.persons.waiting_on(f.edge("E2")).is_empty());
        assert!(agent.is_waiting_for("ship1"));
        assert_eq!(agent.waiting_seconds(&f.view(Tick(12))), 12.0);
        assert_eq!(agent.speed(&f.view(Tick(12))), 0.0);
    }
}

// ── Plan edits ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod edit_tests {
    use super::*;

    #[test]
    fn append_and_insert() {
        let mut f = Fixture::new();
        let mut agent = f.person(vec![f.stop("E2", 60)]);
        f.depart(&mut agent);

        agent.append_stage(f.stop("E4", 1), None).unwrap();
        assert_eq!(agent.plan()[2].destination(), f.edge("E4"));

        agent.append_stage(f.stop("E3", 1), Some(1)).unwrap();
        assert_eq!(agent.stage(1).unwrap().destination(), f.edge("E3"));
        assert_eq!(agent.stage_summary(2, &f.net).unwrap(), "stopping at edge 'E4'  duration 1 (work)");

        // Right after the last stage is still fine.
        agent.append_stage(f.stop("E1", 1), Some(3)).unwrap();
        assert_eq!(agent.num_stages(), 5);

        let err = agent.append_stage(f.stop("E1", 1), Some(5)).unwrap_err();
        assert!(matches!(err, AgentError::InvalidStageIndex { index: 5, .. }));
        assert_eq!(err.to_string(), "invalid index '5' for inserting new stage into plan of 'anna'");
        assert_eq!(agent.cursor(), 1);
    }

    #[test]
    fn remove_future_stage() {
        let mut f = Fixture::new();
        let mut agent = f.person(vec![f.stop("E2", 60), f.stop("E3", 1), f.stop("E4", 1)]);
        f.depart(&mut agent);
        assert!(agent.remove_stage(&mut f.ctx(Tick(10), TransportableKind::Person), 1).unwrap());
        assert_eq!(agent.num_stages(), 3);
        assert_eq!(agent.stage(1).unwrap().destination(), f.edge("E4"));
        assert_eq!(agent.cursor(), 1);

        let err = agent.remove_stage(&mut f.ctx(Tick(10), TransportableKind::Person), 2);
        assert!(matches!(err, Err(AgentError::InvalidStageIndex { .. })));
    }

    #[test]
    fn remove_current_moves_on() {
        let mut f = Fixture::new();
        let mut agent = f.person(vec![f.stop("E2", 60), f.stop("E3", 30)]);
        f.depart(&mut agent);
        assert!(agent.remove_stage(&mut f.ctx(Tick(10), TransportableKind::Person), 0).unwrap());
        assert_eq!(agent.cursor(), 2);
        assert_eq!(agent.plan()[1].arrived(), Some(Tick(10)));
        // Only the new stop's release is left.
        assert_eq!(f.controls.persons.next_wait_end(), Some(Tick(40)));
    }

    #[test]
    fn removing_last_stage_keeps_agent_for_a_step() {
        let mut f = Fixture::new();
        let mut agent = f.person(vec![f.stop("E2", 60)]);
        f.depart(&mut agent);
        assert!(agent.remove_stage(&mut f.ctx(Tick(10), TransportableKind::Person), 0).unwrap());

        assert!(!agent.has_arrived());
        assert_eq!(agent.num_stages(), 3);
        match agent.current_stage() {
            Some(Stage::Waiting(w)) => {
                assert_eq!(w.act_type(), "last stage removed");
                assert_eq!(w.duration(), Some(0));
            }
            other => panic!("expected placeholder wait, got {other:?}"),
        }
        assert_eq!(agent.current_stage().unwrap().arrival_pos(), 50.0);

        // The aborted stop's release is gone; the placeholder's is due now.
        assert_eq!(f.controls.persons.drain_due(Tick(10)), vec![AgentId(0)]);
        assert!(f.controls.persons.next_wait_end().is_none());

        // New stages can still be added before the agent leaves.
        agent.append_stage(f.stop("E3", 5), None).unwrap();
        assert!(agent.proceed(&mut f.ctx(Tick(11), TransportableKind::Person)).unwrap());
        assert_eq!(agent.destination(), f.edge("E3"));
    }

    #[test]
    fn trip_inserted_at_cursor_is_resolved() {
        let mut f = Fixture::new();
        let mut agent = f.person(vec![f.stop("E2", 60)]);
        f.depart(&mut agent);

        let trip = TripStage::new(f.edge("E2"), f.edge("E4"), None, 50.0);
        agent.append_stage(Stage::from(trip), Some(0)).unwrap();
        assert_eq!(agent.current_stage_kind(), Some(StageKind::Trip));

        assert!(agent.proceed(&mut f.ctx(Tick(65), TransportableKind::Person)).unwrap());
        match &agent.plan()[1] {
            Stage::Trip(t) => assert!(t.is_resolved()),
            other => panic!("expected trip, got {other:?}"),
        }
        assert_eq!(agent.cursor(), 2);
        match agent.current_stage() {
            Some(Stage::Walking(w)) => {
                assert_eq!(w.route(), &[f.edge("E2"), f.edge("E3"), f.edge("E4")]);
            }
            other => panic!("expected walk, got {other:?}"),
        }
        assert_eq!(agent.destination(), f.edge("E4"));
        // The displaced stop still follows.
        assert_eq!(agent.num_stages(), 4);
        assert_eq!(agent.plan()[3].destination(), f.edge("E2"));
    }
}

// ── Vehicle type ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod vtype_tests {
    use super::*;

    #[test]
    fn singular_type_is_made_once() {
        let mut f = Fixture::new();
        let mut agent = f.person(vec![f.stop("E2", 60)]);
        let singular = agent.singular_type(&mut f.vehicles).unwrap();
        assert_eq!(singular.id, "DEFAULT_PEDTYPE@anna");
        assert!(singular.is_vehicle_specific());
        singular.max_speed = 2.5;

        assert_eq!(agent.vtype_id(), "DEFAULT_PEDTYPE@anna");
        let types = f.vehicles.type_count();
        assert_eq!(agent.singular_type(&mut f.vehicles).unwrap().max_speed, 2.5);
        assert_eq!(f.vehicles.type_count(), types);
        assert!(f.vehicles.vehicle_type("DEFAULT_PEDTYPE").is_some());
    }

    #[test]
    fn replacing_drops_singular_copy() {
        let mut f = Fixture::new();
        let mut agent = f.person(vec![f.stop("E2", 60)]);
        agent.singular_type(&mut f.vehicles).unwrap();
        agent.replace_vehicle_type(&mut f.vehicles, VehicleType::pedestrian("runner"));
        assert_eq!(agent.vtype_id(), "runner");
        assert!(f.vehicles.vehicle_type("DEFAULT_PEDTYPE@anna").is_none());
        assert!(f.vehicles.vehicle_type("runner").is_some());

        agent.replace_vehicle_type(&mut f.vehicles, VehicleType::pedestrian("DEFAULT_PEDTYPE"));
        assert!(f.vehicles.vehicle_type("runner").is_some(), "shared types stay registered");
    }

    #[test]
    fn set_speed_reaches_walks_and_type() {
        let mut f = Fixture::new();
        let walk = WalkingStage::new(vec![f.edge("E1"), f.edge("E2")], None, None, None, 0.0, 50.0, 0.0);
        let mut agent = f.person(vec![Stage::from(walk)]);
        agent.set_speed(&mut f.vehicles, 3.0).unwrap();
        assert_eq!(agent.vehicle_type(&f.vehicles).unwrap().max_speed, 3.0);
        f.depart(&mut agent);
        // 150 m at 3 m/s.
        assert_eq!(f.controls.persons.next_wait_end(), Some(Tick(55)));
    }

    #[test]
    fn bounding_box_faces_the_road() {
        let mut f = Fixture::new();
        let mut agent = f.person(vec![f.stop("E1", 60)]);
        f.depart(&mut agent);
        let corners = agent.bounding_box(&f.view(Tick(6))).unwrap();
        let expect = [(50.239, -3.0), (50.239, -3.215), (49.761, -3.215), (49.761, -3.0)];
        for (c, (x, y)) in corners.iter().zip(expect) {
            assert!((c.x - x).abs() < 1e-9 && (c.y - y).abs() < 1e-9, "{c} != ({x}, {y})");
        }
    }

    #[test]
    fn unknown_type_is_reported() {
        let mut f = Fixture::new();
        let params = TransportableParams::person("anna", "nope", Tick(0));
        let mut agent =
            Transportable::new(AgentId(0), params, vec![f.stop("E1", 1)], &f.net, &mut AgentRng::new(1, AgentId(0)))
                .unwrap();
        let err = agent.start(&mut f.ctx(Tick(0), TransportableKind::Person)).unwrap_err();
        assert!(matches!(err, AgentError::UnknownVehicleType { vtype, .. } if vtype == "nope"));
    }
}

// ── Parking-area repair ───────────────────────────────────────────────────────

#[cfg(test)]
mod repair_tests {
    use super::*;

    /// Anna rides `car1` from E2 to parking area `parkE3`, then walks on to
    /// E4 at 40 m.  The car is already on E2, so she boards at once.
    fn riding(f: &mut Fixture, then_walk: bool) -> Transportable {
        let route = vec![f.edge("E2"), f.edge("E3"), f.edge("E4")];
        let car = f
            .vehicles
            .build_vehicle(VehicleParams::triggered("car1", "DEFAULT_VEHTYPE"), route, &f.net, false)
            .unwrap();
        f.vehicles.add_vehicle(car).unwrap();

        let park = f.net.stop_by_name("parkE3", StopKind::ParkingArea);
        let ride = DrivingStage::new(f.edge("E3"), park, 20.0, ["car1"]).with_origin(f.edge("E2"));
        let mut stages = vec![Stage::from(ride)];
        if then_walk {
            let walk = WalkingStage::new(vec![f.edge("E3"), f.edge("E4")], None, None, None, 20.0, 40.0, 0.0);
            stages.push(Stage::from(walk));
        }
        let mut agent = f.person(stages);
        f.depart(&mut agent);
        assert_eq!(f.vehicles.vehicle("car1").unwrap().transportables, vec![agent.id()]);
        agent
    }

    fn stops(f: &Fixture) -> (StopId, StopId) {
        (
            f.net.stop_by_name("parkE3", StopKind::ParkingArea).unwrap(),
            f.net.stop_by_name("parkE4", StopKind::ParkingArea).unwrap(),
        )
    }

    #[test]
    fn walk_is_recomputed_from_new_parking_area() {
        let mut f = Fixture::new();
        let mut agent = riding(&mut f, true);
        let (orig, repl) = stops(&f);
        let outcome = agent.reroute_parking_area(&f.view(Tick(20)), orig, repl, &DijkstraRouter).unwrap();
        assert_eq!(outcome, RepairOutcome::WalkRerouted);

        let ride = agent.current_stage().unwrap();
        assert_eq!(ride.destination(), f.edge("E4"));
        assert_eq!(ride.destination_stop(), Some(repl));
        assert_eq!(ride.arrival_pos(), 20.0);
        match agent.stage(1) {
            Some(Stage::Walking(w)) => {
                assert_eq!(w.route(), &[f.edge("E4")]);
                assert_eq!(w.depart_pos(), 20.0);
            }
            other => panic!("expected walk, got {other:?}"),
        }
        assert_eq!(agent.stage(1).unwrap().arrival_pos(), 40.0);
    }

    #[test]
    fn walk_kept_when_no_route() {
        let mut f = Fixture::new();
        let mut agent = riding(&mut f, true);
        let (orig, repl) = stops(&f);
        let outcome = agent.reroute_parking_area(&f.view(Tick(20)), orig, repl, &Blocked).unwrap();
        assert_eq!(outcome, RepairOutcome::WalkKept);
        assert_eq!(agent.current_stage().unwrap().destination(), f.edge("E4"));
        match agent.stage(1) {
            Some(Stage::Walking(w)) => assert_eq!(w.route(), &[f.edge("E3"), f.edge("E4")]),
            other => panic!("expected walk, got {other:?}"),
        }
    }

    #[test]
    fn ride_without_walk_is_only_redirected() {
        let mut f = Fixture::new();
        let mut agent = riding(&mut f, false);
        let (orig, repl) = stops(&f);
        let outcome = agent.reroute_parking_area(&f.view(Tick(20)), orig, repl, &DijkstraRouter).unwrap();
        assert_eq!(outcome, RepairOutcome::Redirected);
        assert_eq!(agent.destination(), f.edge("E4"));
    }

    #[test]
    fn other_parking_area_is_ignored() {
        let mut f = Fixture::new();
        let mut agent = riding(&mut f, true);
        let (orig, repl) = stops(&f);
        let outcome = agent.reroute_parking_area(&f.view(Tick(20)), repl, orig, &DijkstraRouter).unwrap();
        assert_eq!(outcome, RepairOutcome::NotAffected);
        assert_eq!(agent.destination(), f.edge("E3"));
    }

    #[test]
    fn waiting_agent_is_ignored() {
        let mut f = Fixture::new();
        let mut agent = f.person(vec![f.stop("E3", 60)]);
        f.depart(&mut agent);
        let (orig, repl) = stops(&f);
        let outcome = agent.reroute_parking_area(&f.view(Tick(20)), orig, repl, &DijkstraRouter).unwrap();
        assert_eq!(outcome, RepairOutcome::NotAffected);
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader_tests {
    use super::*;

    const HEADER: &str =
        "agent,kind,depart,depart_pos,stage,from,to,to_stop,duration,until,act_type,modes,vtypes,lines,arrival_pos,walk_factor\n";

    fn load(rows: &str) -> Result<Vec<crate::PlanDef>, AgentError> {
        let f = Fixture::new();
        load_plans_reader(Cursor::new(format!("{HEADER}{rows}")), &f.net, &f.config)
    }

    #[test]
    fn loads_mixed_plans() {
        let plans = load(
            "anna,person,0,,stop,,E1,,60,,home,,,,10,\n\
             box1,container,30,random,ride,E2,,contB,,,,,,ship1,,\n\
             anna,person,0,,trip,,E4,,,,,passenger bicycle,,,-1,0.5\n",
        )
        .unwrap();
        assert_eq!(plans.len(), 2);

        let anna = &plans[0];
        assert_eq!(anna.params.id, "anna");
        assert_eq!(anna.params.kind, TransportableKind::Person);
        assert_eq!(anna.params.vtype, "DEFAULT_PEDTYPE");
        assert_eq!(anna.params.depart_pos, DepartPos::Default);
        assert_eq!(anna.stages.len(), 2);
        match &anna.stages[0] {
            Stage::Waiting(w) => {
                assert_eq!(w.duration(), Some(60));
                assert_eq!(w.act_type(), "home");
            }
            other => panic!("expected stop, got {other:?}"),
        }
        assert_eq!(anna.stages[0].arrival_pos(), 10.0);
        match &anna.stages[1] {
            Stage::Trip(t) => {
                assert_eq!(t.modes(), ModeSet::PASSENGER | ModeSet::BICYCLE);
                // Empty `from` continues where the stop left off.
                assert_eq!(t.origin(), Fixture::new().edge("E1"));
            }
            other => panic!("expected trip, got {other:?}"),
        }

        let box1 = &plans[1];
        assert_eq!(box1.params.kind, TransportableKind::Container);
        assert_eq!(box1.params.vtype, "DEFAULT_CONTAINERTYPE");
        assert_eq!(box1.params.depart, Tick(30));
        assert_eq!(box1.params.depart_pos, DepartPos::Random);
        match &box1.stages[0] {
            Stage::Driving(d) => {
                assert!(d.is_waiting_for("ship1"));
                assert_eq!(d.from_edge(), Fixture::new().edge("E2"));
            }
            other => panic!("expected ride, got {other:?}"),
        }
        assert_eq!(box1.stages[0].destination(), Fixture::new().edge("E2"));
        assert_eq!(box1.stages[0].arrival_pos(), 50.0);
    }

    #[test]
    fn walk_rows_become_walking_trips() {
        let plans = load("anna,person,0,12.5,walk,E1,E3,,90,,,,,,-1,\n").unwrap();
        assert_eq!(plans[0].params.depart_pos, DepartPos::Given(12.5));
        match &plans[0].stages[0] {
            Stage::Trip(t) => {
                assert_eq!(t.modes(), ModeSet::IGNORING);
                assert!(t.vtypes().is_empty());
            }
            other => panic!("expected trip, got {other:?}"),
        }
    }

    #[test]
    fn loaded_plan_builds_an_agent() {
        let f = Fixture::new();
        let mut plans =
            load_plans_reader(Cursor::new(format!("{HEADER}anna,person,3,,trip,E1,E4,,,,,,,,,\n")), &f.net, &f.config)
                .unwrap();
        let def = plans.remove(0);
        let agent = Transportable::new(AgentId(0), def.params, def.stages, &f.net, &mut AgentRng::new(1, AgentId(0)))
            .unwrap();
        assert_eq!(agent.num_stages(), 2);
        assert_eq!(agent.desired_depart(), Tick(3));
    }

    #[test]
    fn bad_rows_are_rejected() {
        assert!(matches!(load("anna,person,0,,stop,,E9,,1,,,,,,,\n"), Err(AgentError::Network(_))));
        assert!(matches!(load("anna,person,0,,fly,E1,E2,,,,,,,,,\n"), Err(AgentError::Parse(_))));
        assert!(matches!(load("anna,robot,0,,stop,,E1,,1,,,,,,,\n"), Err(AgentError::Parse(_))));
        assert!(matches!(load("anna,person,0,,ride,E1,E2,,,,,,,,,\n"), Err(AgentError::Parse(_))));
        assert!(matches!(load("anna,person,0,,trip,,E2,,,,,,,,,\n"), Err(AgentError::Parse(_))));
        assert!(matches!(load("anna,person,0,,stop,,,nowhere,1,,,,,,,\n"), Err(AgentError::Parse(_))));
        assert!(matches!(load("anna,person,x,,stop,,E1,,1,,,,,,,\n"), Err(AgentError::Parse(_))));
    }
}
