//! Simulation observer trait for progress reporting and data collection.

use tp_agent::Transportable;
use tp_core::Tick;
use tp_stage::SimView;

/// Callbacks invoked by [`Sim`][crate::Sim] while it moves agents along
/// their plans.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — arrival counter
///
/// ```rust,ignore
/// struct Arrivals(usize);
///
/// impl SimObserver for Arrivals {
///     fn on_arrival(&mut self, _agent: &Transportable, _view: &SimView<'_>) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each step, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each step.
    ///
    /// `advanced` is the number of agents released from a wait or walk this
    /// step.
    fn on_tick_end(&mut self, _tick: Tick, _advanced: usize) {}

    /// `agent` left plan stage `from` and now stands at its cursor.  Trip
    /// stages resolved on the way lie in between.
    fn on_stage_advance(&mut self, _agent: &Transportable, _from: usize, _view: &SimView<'_>) {}

    /// `agent` finished its last stage.
    fn on_arrival(&mut self, _agent: &Transportable, _view: &SimView<'_>) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks), after `on_tick_end`.
    ///
    /// Gives read-only access to every agent so that output writers can
    /// record where each one is without the sim knowing any output format.
    fn on_snapshot(&mut self, _tick: Tick, _agents: &[Transportable], _view: &SimView<'_>) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
