//! Stopping places: bus stops, parking areas, container stops.
//!
//! A stop occupies `[begin_pos, end_pos]` on one edge.  Agents may also reach
//! it from neighbouring edges through **access** entries (a footpath that
//! enters the stop from another edge at a given position).

use tp_core::EdgeId;

/// What a stopping place is used for.  Lookups are per kind, so a bus stop
/// and a parking area may share a name.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopKind {
    BusStop,
    TrainStop,
    ContainerStop,
    ParkingArea,
}

impl StopKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StopKind::BusStop       => "busStop",
            StopKind::TrainStop     => "trainStop",
            StopKind::ContainerStop => "containerStop",
            StopKind::ParkingArea   => "parkingArea",
        }
    }
}

/// A resolved stopping place inside a [`Network`][crate::Network].
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub name:      String,
    pub kind:      StopKind,
    pub edge:      EdgeId,
    pub begin_pos: f64,
    pub end_pos:   f64,
    /// Additional entry points from other edges: `(edge, position on it)`.
    pub access:    Vec<(EdgeId, f64)>,
}

impl Stop {
    /// Midpoint of the stop's extent on its own edge.
    #[inline]
    pub fn mid_pos(&self) -> f64 {
        (self.begin_pos + self.end_pos) / 2.0
    }

    /// Position at which the stop is reached from `edge`, if it can be.
    ///
    /// On the stop's own edge this is the midpoint; on other edges it is the
    /// first matching access entry.
    pub fn access_pos(&self, edge: EdgeId) -> Option<f64> {
        if edge == self.edge {
            return Some(self.mid_pos());
        }
        self.access
            .iter()
            .find(|(e, _)| *e == edge)
            .map(|(_, pos)| *pos)
    }
}

/// Builder-side description of a stop; edges are referenced by name and
/// resolved in [`NetworkBuilder::build`][crate::NetworkBuilder::build].
#[derive(Clone, Debug)]
pub struct StopDef {
    pub name:      String,
    pub kind:      StopKind,
    pub edge:      String,
    pub begin_pos: f64,
    pub end_pos:   f64,
    pub access:    Vec<(String, f64)>,
}

impl StopDef {
    pub fn new(name: &str, kind: StopKind, edge: &str, begin_pos: f64, end_pos: f64) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            edge: edge.to_owned(),
            begin_pos,
            end_pos,
            access: Vec::new(),
        }
    }

    /// Add an access entry from `edge` at `pos`.
    pub fn with_access(mut self, edge: &str, pos: f64) -> Self {
        self.access.push((edge.to_owned(), pos));
        self
    }
}
