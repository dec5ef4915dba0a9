//! The `Stage` enum and the state every stage shares.

use std::f64::consts::FRAC_PI_2;

use tp_core::{AgentId, EdgeId, Position, StopId, Tick};
use tp_network::Network;

use crate::{
    DrivingStage, Previous, RouteEntry, SimView, StageContext, StageEvent, Traveller, TripInfo,
    TripStage, WaitingStage, WalkingStage,
};

// ── StageKind ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum StageKind {
    /// The bookkeeping wait before an agent's requested departure.
    WaitingForDepart,
    Waiting,
    MovingWithoutVehicle,
    Driving,
    Trip,
}

impl StageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::WaitingForDepart     => "waiting_for_depart",
            StageKind::Waiting              => "waiting",
            StageKind::MovingWithoutVehicle => "walking",
            StageKind::Driving              => "driving",
            StageKind::Trip                 => "trip",
        }
    }
}

// ── StageCore ─────────────────────────────────────────────────────────────────

/// Fields common to all stages.
///
/// `arrived` is only ever set after `departed`; a stage is active while
/// `departed` is set and `arrived` is not.
#[derive(Clone, Debug, PartialEq)]
pub struct StageCore {
    pub destination:      EdgeId,
    pub destination_stop: Option<StopId>,
    /// Target position on `destination`.  Negative means unspecified.
    pub arrival_pos:      f64,
    pub departed:         Option<Tick>,
    pub arrived:          Option<Tick>,
}

impl StageCore {
    pub fn new(destination: EdgeId, destination_stop: Option<StopId>, arrival_pos: f64) -> Self {
        Self { destination, destination_stop, arrival_pos, departed: None, arrived: None }
    }

    /// Set `departed` unless it already is.
    #[inline]
    pub fn mark_departed(&mut self, now: Tick) {
        self.departed.get_or_insert(now);
    }

    #[inline]
    pub fn mark_arrived(&mut self, now: Tick) {
        self.arrived = Some(now);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.departed.is_some() && self.arrived.is_none()
    }

    /// Ticks between departure and arrival, zero if either is unset.
    pub fn duration(&self) -> u64 {
        match (self.departed, self.arrived) {
            (Some(d), Some(a)) => a.since(d),
            _ => 0,
        }
    }
}

// ── Activation ────────────────────────────────────────────────────────────────

/// What the owner must do after calling [`Stage::proceed`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Activation {
    /// The stage is running and will hand control back later.
    Active,
    /// The stage is a placeholder: resolve it and advance immediately.
    PassThrough,
}

// ── Stage ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub enum Stage {
    Waiting(WaitingStage),
    Walking(WalkingStage),
    Driving(DrivingStage),
    Trip(TripStage),
}

impl Stage {
    pub fn core(&self) -> &StageCore {
        match self {
            Stage::Waiting(s) => &s.core,
            Stage::Walking(s) => &s.core,
            Stage::Driving(s) => &s.core,
            Stage::Trip(s)    => &s.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut StageCore {
        match self {
            Stage::Waiting(s) => &mut s.core,
            Stage::Walking(s) => &mut s.core,
            Stage::Driving(s) => &mut s.core,
            Stage::Trip(s)    => &mut s.core,
        }
    }

    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Waiting(s) if s.is_initial() => StageKind::WaitingForDepart,
            Stage::Waiting(_) => StageKind::Waiting,
            Stage::Walking(_) => StageKind::MovingWithoutVehicle,
            Stage::Driving(_) => StageKind::Driving,
            Stage::Trip(_)    => StageKind::Trip,
        }
    }

    #[inline]
    pub fn destination(&self) -> EdgeId {
        self.core().destination
    }

    #[inline]
    pub fn destination_stop(&self) -> Option<StopId> {
        self.core().destination_stop
    }

    #[inline]
    pub fn arrival_pos(&self) -> f64 {
        self.core().arrival_pos
    }

    #[inline]
    pub fn departed(&self) -> Option<Tick> {
        self.core().departed
    }

    #[inline]
    pub fn arrived(&self) -> Option<Tick> {
        self.core().arrived
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn position(&self, view: &SimView<'_>) -> Position {
        match self {
            Stage::Waiting(s) => s.position(view),
            Stage::Walking(s) => s.position(view),
            Stage::Driving(s) => s.position(view),
            Stage::Trip(s)    => s.position(view),
        }
    }

    /// Heading in radians.
    pub fn angle(&self, view: &SimView<'_>) -> f64 {
        match self {
            Stage::Waiting(s) => s.angle(view),
            Stage::Walking(s) => s.angle(view),
            Stage::Driving(s) => s.angle(view),
            Stage::Trip(s)    => s.angle(view),
        }
    }

    /// Offset along the current edge.
    pub fn edge_pos(&self, view: &SimView<'_>) -> f64 {
        match self {
            Stage::Walking(s) => s.edge_pos(view),
            Stage::Driving(s) => s.edge_pos(view),
            Stage::Trip(s)    => s.depart_pos(),
            Stage::Waiting(_) => self.arrival_pos(),
        }
    }

    /// Ticks spent waiting so far.
    pub fn waiting_time(&self, now: Tick) -> u64 {
        match self {
            Stage::Waiting(s) => s.waiting_time(now),
            Stage::Driving(s) => s.waiting_time(now),
            Stage::Walking(_) | Stage::Trip(_) => 0,
        }
    }

    /// m/s
    pub fn speed(&self, view: &SimView<'_>) -> f64 {
        match self {
            Stage::Walking(s) => s.speed(view),
            Stage::Driving(s) => s.speed(view),
            Stage::Waiting(_) | Stage::Trip(_) => 0.0,
        }
    }

    /// The edges this stage covers.
    pub fn edges(&self) -> Vec<EdgeId> {
        match self {
            Stage::Walking(s) => s.route().to_vec(),
            Stage::Driving(s) => vec![s.from_edge(), self.destination()],
            Stage::Waiting(_) | Stage::Trip(_) => vec![self.destination()],
        }
    }

    /// Where the stage starts.
    pub fn from_edge(&self) -> EdgeId {
        match self {
            Stage::Walking(s) => s.from_edge(),
            Stage::Driving(s) => s.from_edge(),
            Stage::Trip(s)    => s.origin(),
            Stage::Waiting(_) => self.destination(),
        }
    }

    /// The edge the agent is on now.
    pub fn edge(&self, view: &SimView<'_>) -> EdgeId {
        match self {
            Stage::Walking(s) => s.edge(view),
            Stage::Driving(s) => s.edge(view),
            Stage::Trip(s)    => s.origin(),
            Stage::Waiting(_) => self.destination(),
        }
    }

    pub fn is_waiting_for(&self, line: &str) -> bool {
        match self {
            Stage::Driving(s) => s.is_waiting_for(line),
            _ => false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    #[inline]
    pub fn mark_departed(&mut self, now: Tick) {
        self.core_mut().mark_departed(now);
    }

    /// Record arrival at `view.now`.  A driving stage also settles the
    /// distance it rode.
    pub fn mark_arrived(&mut self, view: &SimView<'_>) {
        match self {
            Stage::Driving(s) => s.mark_arrived(view),
            _ => self.core_mut().mark_arrived(view.now),
        }
    }

    /// Start the stage for `traveller`, who was left by the preceding stage
    /// as described by `previous`.
    pub fn proceed(
        &mut self,
        ctx:       &mut StageContext<'_>,
        traveller: &Traveller<'_>,
        previous:  &Previous,
    ) -> Activation {
        match self {
            Stage::Waiting(s) => s.proceed(ctx, traveller.id),
            Stage::Walking(s) => s.proceed(ctx, traveller),
            Stage::Driving(s) => s.proceed(ctx, traveller.id, previous),
            Stage::Trip(s)    => {
                s.core.mark_departed(ctx.now);
                return Activation::PassThrough;
            }
        }
        Activation::Active
    }

    /// Leave the stage immediately, undoing any registrations.
    pub fn abort(&mut self, ctx: &mut StageContext<'_>, agent: AgentId) {
        match self {
            Stage::Driving(s) => s.abort(ctx, agent),
            Stage::Waiting(_) | Stage::Walking(_) => ctx.control.abort_waiting(agent),
            Stage::Trip(_) => {}
        }
    }

    /// Change the walking speed; stages that do not walk ignore it.
    pub fn set_speed(&mut self, speed: f64) {
        if let Stage::Walking(s) = self {
            s.set_speed(speed);
        }
    }

    // ── Output ────────────────────────────────────────────────────────────

    pub fn trip_info(&self) -> Option<TripInfo> {
        match self {
            Stage::Waiting(s) => s.trip_info(),
            Stage::Walking(s) => s.trip_info(),
            Stage::Driving(s) => Some(s.trip_info()),
            Stage::Trip(_)    => None,
        }
    }

    pub fn begin_event(&self, view: &SimView<'_>, time: Tick) -> Option<StageEvent> {
        let kind = match self {
            Stage::Waiting(s) => format!("actstart {}", s.act_type()),
            Stage::Walking(_) => "departure".to_owned(),
            Stage::Driving(_) => "arrival".to_owned(),
            Stage::Trip(_)    => return None,
        };
        Some(self.event(view, time, kind))
    }

    pub fn end_event(&self, view: &SimView<'_>, time: Tick) -> Option<StageEvent> {
        let kind = match self {
            Stage::Waiting(s) => format!("actend {}", s.act_type()),
            Stage::Walking(_) | Stage::Driving(_) => "arrival".to_owned(),
            Stage::Trip(_)    => return None,
        };
        Some(self.event(view, time, kind))
    }

    fn event(&self, view: &SimView<'_>, time: Tick, kind: String) -> StageEvent {
        StageEvent {
            time,
            kind,
            link: view.network.edge_name(self.edge(view)).to_owned(),
        }
    }

    pub fn route_entry(&self, network: &Network) -> Option<RouteEntry> {
        match self {
            Stage::Waiting(s) => s.route_entry(network),
            Stage::Walking(s) => Some(s.route_entry(network)),
            Stage::Driving(s) => Some(s.route_entry(network)),
            Stage::Trip(_)    => None,
        }
    }

    /// One-line human readable description.
    pub fn stage_summary(&self, network: &Network) -> String {
        match self {
            Stage::Waiting(s) => s.stage_summary(network),
            Stage::Walking(s) => s.stage_summary(network),
            Stage::Driving(s) => s.stage_summary(network),
            Stage::Trip(s)    => s.stage_summary(network),
        }
    }
}

impl From<WaitingStage> for Stage {
    fn from(s: WaitingStage) -> Self {
        Stage::Waiting(s)
    }
}

impl From<WalkingStage> for Stage {
    fn from(s: WalkingStage) -> Self {
        Stage::Walking(s)
    }
}

impl From<DrivingStage> for Stage {
    fn from(s: DrivingStage) -> Self {
        Stage::Driving(s)
    }
}

impl From<TripStage> for Stage {
    fn from(s: TripStage) -> Self {
        Stage::Trip(s)
    }
}

// ── Shared geometry ───────────────────────────────────────────────────────────

/// Point beside `edge` at `at`, on the driving side.
pub(crate) fn roadside_position(view: &SimView<'_>, edge: EdgeId, at: f64) -> Position {
    view.network.edge_position(edge, at, view.config.side_offset())
}

/// Heading of an agent standing beside `edge`, facing the road.
pub(crate) fn roadside_angle(view: &SimView<'_>, edge: EdgeId, at: f64) -> f64 {
    view.network.edge_angle(edge, at) + FRAC_PI_2 * view.config.side()
}

/// `"busStop 'S'"` or `"edge 'E'"`.
pub(crate) fn describe_target(network: &Network, edge: EdgeId, stop: Option<StopId>) -> String {
    match stop {
        Some(id) => {
            let stop = network.stop(id);
            format!("{} '{}'", stop.kind.as_str(), stop.name)
        }
        None => format!("edge '{}'", network.edge_name(edge)),
    }
}

/// Clamp a possibly negative (from-the-end) position onto an edge of
/// `length` metres.
pub(crate) fn interpret_edge_pos(pos: f64, length: f64) -> f64 {
    let pos = if pos < 0.0 { pos + length } else { pos };
    pos.clamp(0.0, length.max(0.0))
}
