//! The demo corridor.
//!
//! ```text
//!  n0 ──E1── n1 ──E2── n2 ──E3── n3 ──E4── n4
//!                 busB        parkE3     parkE4
//! ```
//!
//! Every edge is 200 m and open to all modes.

use tp_core::{ModeSet, Position};
use tp_network::{Network, NetworkBuilder, NetworkResult, StopDef, StopKind};

pub fn build_network() -> NetworkResult<Network> {
    let mut b = NetworkBuilder::new();
    let nodes: Vec<_> = (0..5).map(|i| b.add_node(Position::new(i as f64 * 200.0, 0.0))).collect();
    for (i, pair) in nodes.windows(2).enumerate() {
        b.add_edge(&format!("E{}", i + 1), pair[0], pair[1], 200.0, ModeSet::ALL);
    }

    b.add_stop(StopDef::new("busB", StopKind::BusStop, "E2", 40.0, 60.0));
    b.add_stop(StopDef::new("parkE3", StopKind::ParkingArea, "E3", 120.0, 160.0));
    b.add_stop(StopDef::new("parkE4", StopKind::ParkingArea, "E4", 20.0, 60.0));
    b.build()
}
