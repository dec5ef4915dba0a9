//! `WakeQueue` — sparse per-tick agent release queue.
//!
//! A waiting stage registers the tick at which its agent must move on.  Each
//! tick the simulation drains only the agents scheduled for that tick, so
//! idle agents cost nothing.

use std::collections::BTreeMap;

use tp_core::{AgentId, Tick};

/// Maps simulation ticks to the agents that must wake at that tick.
#[derive(Default, Debug)]
pub struct WakeQueue {
    inner: BTreeMap<Tick, Vec<AgentId>>,
    /// Cached total agent count for O(1) `len()`.
    total: usize,
}

impl WakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `agent` to wake at `tick`.
    pub fn push(&mut self, tick: Tick, agent: AgentId) {
        self.inner.entry(tick).or_default().push(agent);
        self.total += 1;
    }

    /// Remove and return every agent scheduled at or before `tick`, earliest
    /// first.
    pub fn drain_until(&mut self, tick: Tick) -> Vec<AgentId> {
        let later = self.inner.split_off(&Tick(tick.0 + 1));
        let due = std::mem::replace(&mut self.inner, later);
        let agents: Vec<AgentId> = due.into_values().flatten().collect();
        self.total -= agents.len();
        agents
    }

    /// Drop every entry of `agent`.  Returns how many were removed.
    pub fn remove(&mut self, agent: AgentId) -> usize {
        let mut removed = 0;
        self.inner.retain(|_, agents| {
            let before = agents.len();
            agents.retain(|&a| a != agent);
            removed += before - agents.len();
            !agents.is_empty()
        });
        self.total -= removed;
        removed
    }

    /// The earliest tick with at least one queued agent, or `None` if empty.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
