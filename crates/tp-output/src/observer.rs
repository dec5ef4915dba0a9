//! `PlanOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use tp_agent::Transportable;
use tp_core::{SimConfig, Tick};
use tp_sim::SimObserver;
use tp_stage::{SimView, StageKind};

use crate::row::{EventRow, RouteRow, SnapshotRow, TickSummaryRow, TripInfoRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes trip summaries, stage events and plans to
/// any [`OutputWriter`] backend (CSV, SQLite, …).
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct PlanOutputObserver<W: OutputWriter> {
    writer:             W,
    start_unix_secs:    i64,
    tick_duration_secs: u32,
    last_error:         Option<OutputError>,
}

impl<W: OutputWriter> PlanOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for wall-clock
    /// conversion.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            start_unix_secs:    config.start_unix_secs,
            tick_duration_secs: config.tick_duration_secs,
            last_error:         None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn unix_time(&self, tick: Tick) -> i64 {
        self.start_unix_secs + tick.0 as i64 * self.tick_duration_secs as i64
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for PlanOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, advanced: usize) {
        let row = TickSummaryRow {
            tick:            tick.0,
            unix_time_secs:  self.unix_time(tick),
            advanced_agents: advanced as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_stage_advance(&mut self, agent: &Transportable, from: usize, view: &SimView<'_>) {
        let name = agent.name();
        let plan = agent.plan();
        let mut rows = Vec::with_capacity(2);
        // Stage 0 is the wait for departure.
        if from > 0 {
            if let Some(event) = plan.get(from).and_then(|s| s.end_event(view, view.now)) {
                rows.push(EventRow::new(name, &event));
            }
        }
        if let Some(event) = agent.current_stage().and_then(|s| s.begin_event(view, view.now)) {
            rows.push(EventRow::new(name, &event));
        }
        if !rows.is_empty() {
            let result = self.writer.write_events(&rows);
            self.store_err(result);
        }
    }

    fn on_arrival(&mut self, agent: &Transportable, view: &SimView<'_>) {
        let name = agent.name();
        let trip_infos: Vec<TripInfoRow> = agent
            .plan()
            .iter()
            .enumerate()
            .filter_map(|(i, stage)| stage.trip_info().map(|info| TripInfoRow::new(name, i as u32, &info)))
            .collect();
        let routes: Vec<RouteRow> = agent
            .plan()
            .iter()
            .enumerate()
            .filter_map(|(i, stage)| {
                stage
                    .route_entry(view.network)
                    .map(|entry| RouteRow::new(name, i as u32, &entry))
            })
            .collect();

        let result = self.writer.write_trip_infos(&trip_infos);
        self.store_err(result);
        let result = self.writer.write_routes(&routes);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &[Transportable], view: &SimView<'_>) {
        let rows: Vec<SnapshotRow> = agents
            .iter()
            .map(|agent| {
                let position = agent.position(view);
                SnapshotRow {
                    tick:  tick.0,
                    agent: agent.name().to_owned(),
                    stage: agent.cursor() as u32,
                    kind:  agent.current_stage_kind().map_or("arrived", StageKind::as_str),
                    edge:  view.network.edge_name(agent.edge(view)).to_owned(),
                    pos:   agent.edge_pos(view),
                    x:     position.x,
                    y:     position.y,
                    speed: agent.speed(view),
                }
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
