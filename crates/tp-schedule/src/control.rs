//! Waiting registries.
//!
//! A [`TransportableControl`] tracks, for one kind of agent:
//!
//! - when agents are due to move on (`set_wait_end`, `schedule`),
//! - which stationary agents stand on which edge until then,
//! - which agents wait on an edge for a vehicle to board (`add_waiting`).
//!
//! Aborting a stage must leave no trace in any of these.

use std::collections::HashMap;

use tp_core::{AgentId, EdgeId, Tick};
use tracing::trace;

use crate::WakeQueue;

#[derive(Default, Debug)]
pub struct TransportableControl {
    wait_ends: WakeQueue,
    /// Edge each stationary agent stands on.
    present:   HashMap<AgentId, EdgeId>,
    /// Agents waiting for a vehicle, per edge, in arrival order.
    waiting:   HashMap<EdgeId, Vec<AgentId>>,
}

impl TransportableControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release `agent`, standing on `edge`, at `until`.
    pub fn set_wait_end(&mut self, until: Tick, agent: AgentId, edge: EdgeId) {
        self.schedule(until, agent);
        self.present.insert(agent, edge);
    }

    /// Release a moving `agent` at `until`.
    pub fn schedule(&mut self, until: Tick, agent: AgentId) {
        trace!(agent = agent.0, tick = until.0, "release scheduled");
        self.wait_ends.push(until, agent);
    }

    /// Agents due at or before `now`, earliest first.  They no longer count
    /// as present.
    pub fn drain_due(&mut self, now: Tick) -> Vec<AgentId> {
        let agents = self.wait_ends.drain_until(now);
        for agent in &agents {
            self.present.remove(agent);
        }
        agents
    }

    pub fn next_wait_end(&self) -> Option<Tick> {
        self.wait_ends.next_tick()
    }

    /// Stationary agents on `edge`, sorted by id.
    pub fn present_on(&self, edge: EdgeId) -> Vec<AgentId> {
        let mut agents: Vec<AgentId> = self
            .present
            .iter()
            .filter(|&(_, &e)| e == edge)
            .map(|(&a, _)| a)
            .collect();
        agents.sort_unstable();
        agents
    }

    /// Register `agent` as waiting on `edge` for a vehicle.
    pub fn add_waiting(&mut self, edge: EdgeId, agent: AgentId) {
        let list = self.waiting.entry(edge).or_default();
        if !list.contains(&agent) {
            list.push(agent);
        }
    }

    /// Remove `agent` from the vehicle queue on `edge`, e.g. after boarding.
    pub fn remove_waiting(&mut self, edge: EdgeId, agent: AgentId) -> bool {
        let Some(list) = self.waiting.get_mut(&edge) else {
            return false;
        };
        let before = list.len();
        list.retain(|&a| a != agent);
        let removed = list.len() != before;
        if list.is_empty() {
            self.waiting.remove(&edge);
        }
        removed
    }

    /// Agents waiting for a vehicle on `edge`.
    pub fn waiting_on(&self, edge: EdgeId) -> &[AgentId] {
        self.waiting.get(&edge).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_waiting(&self, agent: AgentId) -> bool {
        self.present.contains_key(&agent) || self.waiting.values().any(|l| l.contains(&agent))
    }

    /// Forget `agent` entirely.
    pub fn abort_waiting(&mut self, agent: AgentId) {
        self.wait_ends.remove(agent);
        self.present.remove(&agent);
        self.waiting.retain(|_, list| {
            list.retain(|&a| a != agent);
            !list.is_empty()
        });
    }
}

/// One registry per agent kind.
#[derive(Default, Debug)]
pub struct Controls {
    pub persons:    TransportableControl,
    pub containers: TransportableControl,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }
}
