//! Network representation and builder.
//!
//! # Data layout
//!
//! Junctions are nodes, edges are the directed "locations" stages refer to.
//! Outgoing edges are stored in **Compressed Sparse Row (CSR)** format: given
//! a `NodeId n`, its outgoing edges are the contiguous `EdgeId` range
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! All per-edge arrays are indexed by `EdgeId`.  The successors of edge `e`
//! are simply the outgoing edges of `edge_to[e]`.
//!
//! # Lane geometry
//!
//! Each edge carries one reference `Shape`.  Positions along the edge are in
//! edge-length metres; when the drawn shape is longer or shorter than the
//! nominal length, offsets are scaled onto the geometry before lookup.

use std::collections::HashMap;

use tp_core::{EdgeId, ModeSet, NodeId, Position, Shape, StopId};

use crate::stop::{Stop, StopDef, StopKind};
use crate::{NetworkError, NetworkResult};

// ── Network ───────────────────────────────────────────────────────────────────

/// Directed edge graph in CSR format plus the stopping-place registry.
///
/// Do not construct directly; use [`NetworkBuilder`].
pub struct Network {
    // ── Node data ─────────────────────────────────────────────────────────
    pub node_pos: Vec<Position>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_name:        Vec<String>,
    pub edge_from:        Vec<NodeId>,
    pub edge_to:          Vec<NodeId>,
    pub edge_length:      Vec<f64>,
    pub edge_permissions: Vec<ModeSet>,
    pub edge_shape:       Vec<Shape>,

    // ── Stopping places ───────────────────────────────────────────────────
    pub stops: Vec<Stop>,

    edge_index: HashMap<String, EdgeId>,
    stop_index: HashMap<(StopKind, String), StopId>,
}

impl Network {
    pub fn empty() -> Self {
        NetworkBuilder::new()
            .build()
            .unwrap_or_else(|_| unreachable!("an empty network has nothing to resolve"))
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn edge(&self, name: &str) -> Option<EdgeId> {
        self.edge_index.get(name).copied()
    }

    /// Like [`edge`](Self::edge) but an error naming the missing edge.
    pub fn require_edge(&self, name: &str) -> NetworkResult<EdgeId> {
        self.edge(name).ok_or_else(|| NetworkError::UnknownEdge(name.to_owned()))
    }

    #[inline]
    pub fn edge_name(&self, edge: EdgeId) -> &str {
        &self.edge_name[edge.index()]
    }

    #[inline]
    pub fn length(&self, edge: EdgeId) -> f64 {
        self.edge_length[edge.index()]
    }

    #[inline]
    pub fn permissions(&self, edge: EdgeId) -> ModeSet {
        self.edge_permissions[edge.index()]
    }

    /// Stop named `name` of the given kind.  Empty names never match.
    pub fn stop_by_name(&self, name: &str, kind: StopKind) -> Option<StopId> {
        if name.is_empty() {
            return None;
        }
        self.stop_index.get(&(kind, name.to_owned())).copied()
    }

    #[inline]
    pub fn stop(&self, id: StopId) -> &Stop {
        &self.stops[id.index()]
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// Outgoing edges of `node`: a contiguous index range.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Edges that can follow `edge` on a route.
    #[inline]
    pub fn successors(&self, edge: EdgeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_edges(self.edge_to[edge.index()])
    }

    /// Sum of the lengths of `edges`.
    pub fn route_length(&self, edges: &[EdgeId]) -> f64 {
        edges.iter().map(|&e| self.length(e)).sum()
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// Map an edge-length offset onto the edge's drawn shape.
    #[inline]
    pub fn geometry_pos(&self, edge: EdgeId, pos: f64) -> f64 {
        let length = self.length(edge);
        if length <= 0.0 {
            return 0.0;
        }
        pos * self.edge_shape[edge.index()].length() / length
    }

    /// Point `at` metres along `edge`, shifted `lateral` metres to the right.
    pub fn edge_position(&self, edge: EdgeId, at: f64, lateral: f64) -> Position {
        self.edge_shape[edge.index()].position_at_offset(self.geometry_pos(edge, at), lateral)
    }

    /// Heading of `edge` at `at` metres.
    pub fn edge_angle(&self, edge: EdgeId, at: f64) -> f64 {
        self.edge_shape[edge.index()].rotation_at_offset(self.geometry_pos(edge, at))
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Construct a [`Network`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use tp_core::{ModeSet, Position};
/// use tp_network::NetworkBuilder;
///
/// let mut b = NetworkBuilder::new();
/// let a = b.add_node(Position::new(0.0, 0.0));
/// let c = b.add_node(Position::new(100.0, 0.0));
/// b.add_road("ac", "ca", a, c, 100.0, ModeSet::ALL);
/// let net = b.build().unwrap();
/// assert_eq!(net.edge_count(), 2);
/// assert_eq!(net.length(net.edge("ac").unwrap()), 100.0);
/// ```
pub struct NetworkBuilder {
    nodes:     Vec<Position>,
    raw_edges: Vec<RawEdge>,
    stops:     Vec<StopDef>,
}

struct RawEdge {
    name:        String,
    from:        NodeId,
    to:          NodeId,
    length:      f64,
    permissions: ModeSet,
    shape:       Option<Shape>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new(), stops: Vec::new() }
    }

    /// Add a junction and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Position) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** edge drawn as a straight line between its junctions.
    pub fn add_edge(
        &mut self,
        name:        &str,
        from:        NodeId,
        to:          NodeId,
        length:      f64,
        permissions: ModeSet,
    ) {
        self.raw_edges.push(RawEdge {
            name: name.to_owned(),
            from,
            to,
            length,
            permissions,
            shape: None,
        });
    }

    /// Add a directed edge with an explicit reference shape.
    pub fn add_edge_with_shape(
        &mut self,
        name:        &str,
        from:        NodeId,
        to:          NodeId,
        length:      f64,
        permissions: ModeSet,
        shape:       Shape,
    ) {
        self.raw_edges.push(RawEdge {
            name: name.to_owned(),
            from,
            to,
            length,
            permissions,
            shape: Some(shape),
        });
    }

    /// Convenience: a pair of opposite edges for a two-way road.
    pub fn add_road(
        &mut self,
        forward:     &str,
        backward:    &str,
        a:           NodeId,
        b:           NodeId,
        length:      f64,
        permissions: ModeSet,
    ) {
        self.add_edge(forward, a, b, length, permissions);
        self.add_edge(backward, b, a, length, permissions);
    }

    pub fn add_stop(&mut self, stop: StopDef) {
        self.stops.push(stop);
    }

    /// Consume the builder and produce a [`Network`].
    ///
    /// Fails on duplicate edge/stop names and on stops referring to edges
    /// that were never added.
    pub fn build(self) -> NetworkResult<Network> {
        let node_count = self.nodes.len();

        // Stable sort keeps insertion order among a node's outgoing edges.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }

        let mut edge_index = HashMap::with_capacity(raw.len());
        for (i, e) in raw.iter().enumerate() {
            if edge_index.insert(e.name.clone(), EdgeId(i as u32)).is_some() {
                return Err(NetworkError::Duplicate { what: "edge", name: e.name.clone() });
            }
        }

        let mut edge_name        = Vec::with_capacity(raw.len());
        let mut edge_from        = Vec::with_capacity(raw.len());
        let mut edge_to          = Vec::with_capacity(raw.len());
        let mut edge_length      = Vec::with_capacity(raw.len());
        let mut edge_permissions = Vec::with_capacity(raw.len());
        let mut edge_shape       = Vec::with_capacity(raw.len());
        for e in raw {
            let shape = e.shape.unwrap_or_else(|| {
                Shape::line(self.nodes[e.from.index()], self.nodes[e.to.index()])
            });
            edge_name.push(e.name);
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_length.push(e.length);
            edge_permissions.push(e.permissions);
            edge_shape.push(shape);
        }

        let resolve = |name: &str| {
            edge_index
                .get(name)
                .copied()
                .ok_or_else(|| NetworkError::UnknownEdge(name.to_owned()))
        };

        let mut stops = Vec::with_capacity(self.stops.len());
        let mut stop_index = HashMap::with_capacity(self.stops.len());
        for def in self.stops {
            let id = StopId(stops.len() as u32);
            if stop_index.insert((def.kind, def.name.clone()), id).is_some() {
                return Err(NetworkError::Duplicate { what: def.kind.as_str(), name: def.name });
            }
            let access = def
                .access
                .iter()
                .map(|(edge, pos)| resolve(edge).map(|e| (e, *pos)))
                .collect::<NetworkResult<Vec<_>>>()?;
            stops.push(Stop {
                edge: resolve(&def.edge)?,
                name: def.name,
                kind: def.kind,
                begin_pos: def.begin_pos,
                end_pos: def.end_pos,
                access,
            });
        }

        Ok(Network {
            node_pos: self.nodes,
            node_out_start,
            edge_name,
            edge_from,
            edge_to,
            edge_length,
            edge_permissions,
            edge_shape,
            stops,
            edge_index,
            stop_index,
        })
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
