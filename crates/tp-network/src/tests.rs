//! Unit tests for tp-network.

use tp_core::{ModeSet, Position, Shape, Tick};

use crate::{
    DijkstraRouter, IntermodalRouter, Network, NetworkBuilder, NetworkError, PedestrianRouter,
    StopDef, StopKind, TripRequest, VehicleProposal,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Four junctions on a line, 100 m apart, joined by two-way roads:
///
/// ```text
/// n0 ─E1─▶ n1 ─E2─▶ n2 ─E3─▶ n3
///    ◀─-E1─   ◀─-E2─   ◀─-E3─
/// ```
///
/// `E3` is a motorway (no pedestrians); a bus stop sits on `E2`.
fn line_network() -> Network {
    let mut b = NetworkBuilder::new();
    let n: Vec<_> = (0..4)
        .map(|i| b.add_node(Position::new(i as f64 * 100.0, 0.0)))
        .collect();
    b.add_road("E1", "-E1", n[0], n[1], 100.0, ModeSet::ALL);
    b.add_road("E2", "-E2", n[1], n[2], 100.0, ModeSet::ALL);
    b.add_road("E3", "-E3", n[2], n[3], 100.0, ModeSet::PASSENGER);
    b.add_stop(StopDef::new("stopA", StopKind::BusStop, "E2", 40.0, 60.0).with_access("E1", 90.0));
    b.build().unwrap()
}

fn request(net: &Network, from: &str, to: &str) -> TripRequest<'static> {
    TripRequest {
        origin:      net.edge(from).unwrap(),
        destination: net.edge(to).unwrap(),
        depart_pos:  0.0,
        arrival_pos: 50.0,
        dest_stop:   "",
        speed:       1.4,
        vehicle:     None,
        modes:       ModeSet::IGNORING,
        depart:      Tick(0),
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod network_tests {
    use super::*;

    #[test]
    fn edges_resolve_by_name() {
        let net = line_network();
        assert_eq!(net.edge_count(), 6);
        let e2 = net.edge("E2").unwrap();
        assert_eq!(net.edge_name(e2), "E2");
        assert_eq!(net.length(e2), 100.0);
        assert!(net.edge("nope").is_none());
        assert!(matches!(net.require_edge("nope"), Err(NetworkError::UnknownEdge(_))));
    }

    #[test]
    fn successors_follow_junctions() {
        let net = line_network();
        let e1 = net.edge("E1").unwrap();
        let next: Vec<&str> = net.successors(e1).map(|e| net.edge_name(e)).collect();
        assert!(next.contains(&"E2"));
        assert!(next.contains(&"-E1"));
    }

    #[test]
    fn edge_position_uses_shape() {
        let net = line_network();
        let e2 = net.edge("E2").unwrap();
        let p = net.edge_position(e2, 50.0, 0.0);
        assert!((p.x - 150.0).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
        assert!(net.edge_angle(e2, 10.0).abs() < 1e-9);
    }

    #[test]
    fn geometry_scaled_to_nominal_length() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node(Position::new(0.0, 0.0));
        let c = b.add_node(Position::new(50.0, 0.0));
        // Drawn 50 m long, nominally 100 m.
        b.add_edge("short", a, c, 100.0, ModeSet::ALL);
        let net = b.build().unwrap();
        let p = net.edge_position(net.edge("short").unwrap(), 100.0, 0.0);
        assert!((p.x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn bent_edge_follows_its_shape() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node(Position::new(0.0, 0.0));
        let c = b.add_node(Position::new(100.0, 100.0));
        let shape = Shape::new(vec![
            Position::new(0.0, 0.0),
            Position::new(100.0, 0.0),
            Position::new(100.0, 100.0),
        ]);
        b.add_edge_with_shape("bend", a, c, 200.0, ModeSet::ALL, shape);
        let net = b.build().unwrap();
        let p = net.edge_position(net.edge("bend").unwrap(), 150.0, 0.0);
        assert!((p.x - 100.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn stops_by_name_and_kind() {
        let net = line_network();
        let id = net.stop_by_name("stopA", StopKind::BusStop).unwrap();
        assert!(net.stop_by_name("stopA", StopKind::ParkingArea).is_none());
        assert!(net.stop_by_name("", StopKind::BusStop).is_none());
        let stop = net.stop(id);
        assert_eq!(stop.mid_pos(), 50.0);
        assert_eq!(stop.access_pos(net.edge("E2").unwrap()), Some(50.0));
        assert_eq!(stop.access_pos(net.edge("E1").unwrap()), Some(90.0));
        assert_eq!(stop.access_pos(net.edge("E3").unwrap()), None);
    }

    #[test]
    fn duplicate_edge_rejected() {
        let mut b = NetworkBuilder::new();
        let a = b.add_node(Position::new(0.0, 0.0));
        let c = b.add_node(Position::new(1.0, 0.0));
        b.add_edge("x", a, c, 1.0, ModeSet::ALL);
        b.add_edge("x", c, a, 1.0, ModeSet::ALL);
        assert!(matches!(b.build(), Err(NetworkError::Duplicate { what: "edge", .. })));
    }

    #[test]
    fn stop_on_unknown_edge_rejected() {
        let mut b = NetworkBuilder::new();
        b.add_stop(StopDef::new("s", StopKind::BusStop, "ghost", 0.0, 1.0));
        assert!(matches!(b.build(), Err(NetworkError::UnknownEdge(name)) if name == "ghost"));
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

#[cfg(test)]
mod router_tests {
    use super::*;

    #[test]
    fn walk_along_line() {
        let net = line_network();
        let route = DijkstraRouter
            .compute_walk(&net, net.edge("E1").unwrap(), net.edge("E2").unwrap(), 0.0, 50.0, 1.4)
            .unwrap();
        let names: Vec<&str> = route.iter().map(|&e| net.edge_name(e)).collect();
        assert_eq!(names, ["E1", "E2"]);
    }

    #[test]
    fn same_edge_is_single_edge_route() {
        let net = line_network();
        let e = net.edge("E2").unwrap();
        assert_eq!(DijkstraRouter.compute_walk(&net, e, e, 0.0, 1.0, 1.4).unwrap(), vec![e]);
    }

    #[test]
    fn pedestrians_cannot_use_motorway() {
        let net = line_network();
        let err = DijkstraRouter
            .compute_walk(&net, net.edge("E1").unwrap(), net.edge("E3").unwrap(), 0.0, 1.0, 1.4)
            .unwrap_err();
        assert!(matches!(err, NetworkError::NoRoute { .. }));
    }

    #[test]
    fn intermodal_walks_without_vehicle() {
        let net = line_network();
        let items = DijkstraRouter.compute(&net, &request(&net, "E1", "E2")).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_walk());
    }

    #[test]
    fn intermodal_drives_proposed_vehicle() {
        let net = line_network();
        let mut req = request(&net, "E1", "E3");
        req.vehicle = Some(VehicleProposal { id: "p_0", vclass: ModeSet::PASSENGER, max_speed: 13.9 });
        req.modes = ModeSet::PASSENGER;
        let items = DijkstraRouter.compute(&net, &req).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line, "p_0");
        assert_eq!(items[0].edges.len(), 3);
    }

    #[test]
    fn intermodal_reports_no_route() {
        let net = line_network();
        let result = DijkstraRouter.compute(&net, &request(&net, "E1", "E3"));
        assert!(matches!(result, Err(NetworkError::NoRoute { from, to }) if from == "E1" && to == "E3"));
    }
}
