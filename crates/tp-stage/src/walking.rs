//! Walking along a route.
//!
//! Pedestrian dynamics are not modelled.  The walk uses a
//! **teleport-at-arrival** model: once started, the agent is released at the
//! destination after `duration` ticks, or after the time needed to cover the
//! route at its walking speed.  In between, position is interpolated along
//! the route by elapsed time, which is enough for output and visualisation.

use tp_core::time::ticks_for_secs;
use tp_core::{EdgeId, Position, StopId, Tick};
use tp_network::Network;

use crate::stage::describe_target;
use crate::{RouteEntry, SimView, StageContext, StageCore, Traveller, TripInfo};

#[derive(Clone, Debug)]
pub struct WalkingStage {
    pub(crate) core: StageCore,
    route:          Vec<EdgeId>,
    depart_pos:     f64,
    /// Lateral offset from the edge centre line (m, positive right).
    depart_pos_lat: f64,
    /// Fixed walking time in ticks, if given.
    duration:       Option<u64>,
    /// Walking speed (m/s); the agent's maximum speed if unset.
    speed:          Option<f64>,

    // Set when the walk starts.
    walk_speed:  f64,
    walk_length: f64,
    end:         Option<Tick>,
}

impl WalkingStage {
    /// Walk `route` from `depart_pos` on its first edge to `arrival_pos` on
    /// its last.  `route` must not be empty.
    pub fn new(
        route:          Vec<EdgeId>,
        to_stop:        Option<StopId>,
        duration:       Option<u64>,
        speed:          Option<f64>,
        depart_pos:     f64,
        arrival_pos:    f64,
        depart_pos_lat: f64,
    ) -> Self {
        let destination = route.last().copied().unwrap_or_default();
        Self {
            core: StageCore::new(destination, to_stop, arrival_pos),
            route,
            depart_pos,
            depart_pos_lat,
            duration,
            speed,
            walk_speed:  0.0,
            walk_length: 0.0,
            end:         None,
        }
    }

    #[inline]
    pub fn route(&self) -> &[EdgeId] {
        &self.route
    }

    #[inline]
    pub fn depart_pos(&self) -> f64 {
        self.depart_pos
    }

    #[inline]
    pub fn from_edge(&self) -> EdgeId {
        self.route.first().copied().unwrap_or_default()
    }

    /// Release tick, once started.
    #[inline]
    pub fn end(&self) -> Option<Tick> {
        self.end
    }

    /// Walking speed asked for, if any.
    #[inline]
    pub fn requested_speed(&self) -> Option<f64> {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = Some(speed);
    }

    /// Distance from `depart_pos` to `arrival_pos` along the route (m).
    pub fn length(&self, network: &Network) -> f64 {
        match self.route.as_slice() {
            [] => 0.0,
            [_] => (self.core.arrival_pos - self.depart_pos).abs(),
            [.., last] => {
                let total = network.route_length(&self.route);
                (total - self.depart_pos - (network.length(*last) - self.core.arrival_pos)).max(0.0)
            }
        }
    }

    pub(crate) fn proceed(&mut self, ctx: &mut StageContext<'_>, traveller: &Traveller<'_>) {
        self.core.mark_departed(ctx.now);
        self.walk_length = self.length(ctx.network);
        self.walk_speed = self
            .speed
            .filter(|&s| s > 0.0)
            .unwrap_or(traveller.max_speed)
            .max(0.01);
        let ticks = match self.duration {
            Some(ticks) => {
                if ticks > 0 {
                    let secs = ticks as f64 * ctx.tick_duration_secs as f64;
                    self.walk_speed = self.walk_length / secs;
                }
                ticks
            }
            None => ticks_for_secs(self.walk_length / self.walk_speed, ctx.tick_duration_secs),
        };
        let end = ctx.now + ticks;
        self.end = Some(end);
        ctx.control.schedule(end, traveller.id);
    }

    /// Fraction of the walk completed at `now`, in `[0.0, 1.0]`.
    pub fn progress(&self, now: Tick) -> f64 {
        let (Some(start), Some(end)) = (self.core.departed, self.end) else {
            return 0.0;
        };
        if end <= start {
            return 1.0;
        }
        (now.since(start) as f64 / (end - start) as f64).min(1.0)
    }

    /// Route index and offset on that edge at `now`.
    fn locate(&self, network: &Network, now: Tick) -> (usize, f64) {
        let progress = self.progress(now);
        if self.route.len() <= 1 {
            let pos = self.depart_pos + (self.core.arrival_pos - self.depart_pos) * progress;
            return (0, pos);
        }
        let mut pos = self.depart_pos + progress * self.walk_length;
        let last = self.route.len() - 1;
        for (i, &edge) in self.route.iter().enumerate() {
            let len = network.length(edge);
            if pos <= len || i == last {
                return (i, pos.min(len));
            }
            pos -= len;
        }
        (last, self.core.arrival_pos)
    }

    pub(crate) fn edge(&self, view: &SimView<'_>) -> EdgeId {
        let (i, _) = self.locate(view.network, view.now);
        self.route.get(i).copied().unwrap_or(self.core.destination)
    }

    pub(crate) fn edge_pos(&self, view: &SimView<'_>) -> f64 {
        self.locate(view.network, view.now).1
    }

    pub(crate) fn position(&self, view: &SimView<'_>) -> Position {
        let (i, pos) = self.locate(view.network, view.now);
        let edge = self.route.get(i).copied().unwrap_or(self.core.destination);
        view.network.edge_position(edge, pos, self.depart_pos_lat)
    }

    pub(crate) fn angle(&self, view: &SimView<'_>) -> f64 {
        let (i, pos) = self.locate(view.network, view.now);
        let edge = self.route.get(i).copied().unwrap_or(self.core.destination);
        view.network.edge_angle(edge, pos)
    }

    pub(crate) fn speed(&self, _view: &SimView<'_>) -> f64 {
        if self.core.is_active() { self.walk_speed } else { 0.0 }
    }

    pub(crate) fn trip_info(&self) -> Option<TripInfo> {
        Some(TripInfo::Walk {
            depart:       self.core.departed?,
            depart_pos:   self.depart_pos,
            arrival:      self.core.arrived,
            arrival_pos:  self.core.arrival_pos,
            duration:     self.core.duration(),
            route_length: self.walk_length,
        })
    }

    pub(crate) fn route_entry(&self, network: &Network) -> RouteEntry {
        RouteEntry::Walk {
            edges:        self.route.iter().map(|&e| network.edge_name(e).to_owned()).collect(),
            to_stop:      self
                .core
                .destination_stop
                .map(|s| network.stop(s).name.clone())
                .unwrap_or_default(),
            arrival_pos:  self.core.arrival_pos,
            route_length: self.length(network),
        }
    }

    pub(crate) fn stage_summary(&self, network: &Network) -> String {
        format!(
            "walking to {}",
            describe_target(network, self.core.destination, self.core.destination_stop)
        )
    }
}
