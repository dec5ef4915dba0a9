//! Standing still.

use tp_core::{AgentId, EdgeId, Position, Tick};
use tp_network::Network;

use crate::stage::{interpret_edge_pos, roadside_angle, roadside_position};
use crate::{RouteEntry, SimView, StageContext, StageCore, TripInfo};

#[derive(Clone, Debug)]
pub struct WaitingStage {
    pub(crate) core: StageCore,
    /// Ticks to wait, if given.
    duration: Option<u64>,
    /// Wait at least until this tick, if given.
    until:    Option<Tick>,
    act_type: String,
    /// Bookkeeping wait before departure rather than a real stop.
    initial:  bool,
}

impl WaitingStage {
    /// Wait on `edge` at `pos` (negative counts from the end of the edge).
    pub fn new(
        network:  &Network,
        edge:     EdgeId,
        duration: Option<u64>,
        until:    Option<Tick>,
        pos:      f64,
        act_type: &str,
    ) -> Self {
        let pos = interpret_edge_pos(pos, network.length(edge));
        Self {
            core: StageCore::new(edge, None, pos),
            duration,
            until,
            act_type: act_type.to_owned(),
            initial: false,
        }
    }

    /// The wait for an agent's requested departure.  Stands in for the
    /// stage before the first one of a plan.
    pub fn initial(network: &Network, edge: EdgeId, depart: Tick, pos: f64) -> Self {
        Self { initial: true, ..Self::new(network, edge, None, Some(depart), pos, "start") }
    }

    #[inline]
    pub fn is_initial(&self) -> bool {
        self.initial
    }

    #[inline]
    pub fn until(&self) -> Option<Tick> {
        self.until
    }

    #[inline]
    pub fn duration(&self) -> Option<u64> {
        self.duration
    }

    #[inline]
    pub fn act_type(&self) -> &str {
        &self.act_type
    }

    /// Release tick when started at `now`.
    pub fn release_tick(&self, now: Tick) -> Tick {
        let after = now + self.duration.unwrap_or(0);
        after.max(self.until.unwrap_or(now))
    }

    pub(crate) fn proceed(&mut self, ctx: &mut StageContext<'_>, agent: AgentId) {
        self.core.departed = Some(ctx.now);
        let until = self.release_tick(ctx.now);
        ctx.control.set_wait_end(until, agent, self.core.destination);
    }

    pub(crate) fn position(&self, view: &SimView<'_>) -> Position {
        roadside_position(view, self.core.destination, self.core.arrival_pos)
    }

    pub(crate) fn angle(&self, view: &SimView<'_>) -> f64 {
        roadside_angle(view, self.core.destination, self.core.arrival_pos)
    }

    pub(crate) fn waiting_time(&self, now: Tick) -> u64 {
        self.core.departed.map_or(0, |d| now.since(d))
    }

    pub(crate) fn trip_info(&self) -> Option<TripInfo> {
        if self.initial {
            return None;
        }
        Some(TripInfo::Stop {
            duration:    self.core.duration(),
            arrival:     self.core.arrived.unwrap_or_default(),
            arrival_pos: self.core.arrival_pos,
            act_type:    self.act_type.clone(),
        })
    }

    pub(crate) fn route_entry(&self, network: &Network) -> Option<RouteEntry> {
        if self.initial {
            return None;
        }
        Some(RouteEntry::Stop {
            edge:     network.edge_name(self.core.destination).to_owned(),
            duration: self.duration,
            until:    self.until,
            act_type: self.act_type.clone(),
        })
    }

    pub(crate) fn stage_summary(&self, network: &Network) -> String {
        let mut time_info = String::new();
        if let Some(until) = self.until {
            time_info += &format!(" until {}", until.0);
        }
        if let Some(duration) = self.duration {
            time_info += &format!(" duration {duration}");
        }
        format!(
            "stopping at edge '{}' {} ({})",
            network.edge_name(self.core.destination),
            time_info,
            self.act_type
        )
    }
}
