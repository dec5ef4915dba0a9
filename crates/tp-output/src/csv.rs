//! CSV output backend.
//!
//! Creates five files in the configured output directory:
//! - `tripinfos.csv`
//! - `events.csv`
//! - `routes.csv`
//! - `snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{EventRow, OutputResult, RouteRow, SnapshotRow, TickSummaryRow, TripInfoRow};

pub const TRIPINFO_HEADER: [&str; 11] = [
    "agent", "stage", "kind", "depart", "arrival", "duration", "waiting_time", "vehicle", "route_length",
    "arrival_pos", "act_type",
];

pub const EVENT_HEADER: [&str; 4] = ["time", "agent", "kind", "link"];

pub const ROUTE_HEADER: [&str; 11] = [
    "agent", "stage", "kind", "edges", "to_stop", "lines", "duration", "until", "act_type", "arrival_pos",
    "intended",
];

pub const SNAPSHOT_HEADER: [&str; 9] = ["tick", "agent", "stage", "kind", "edge", "pos", "x", "y", "speed"];

/// Writes simulation output to five CSV files.
pub struct CsvWriter {
    trip_infos: Writer<File>,
    events:     Writer<File>,
    routes:     Writer<File>,
    snapshots:  Writer<File>,
    summaries:  Writer<File>,
    finished:   bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut trip_infos = Writer::from_path(dir.join("tripinfos.csv"))?;
        trip_infos.write_record(TRIPINFO_HEADER)?;

        let mut events = Writer::from_path(dir.join("events.csv"))?;
        events.write_record(EVENT_HEADER)?;

        let mut routes = Writer::from_path(dir.join("routes.csv"))?;
        routes.write_record(ROUTE_HEADER)?;

        let mut snapshots = Writer::from_path(dir.join("snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(["tick", "unix_time_secs", "advanced_agents"])?;

        Ok(Self {
            trip_infos,
            events,
            routes,
            snapshots,
            summaries,
            finished: false,
        })
    }
}

/// Empty cell for `None`.
fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_trip_infos(&mut self, rows: &[TripInfoRow]) -> OutputResult<()> {
        for row in rows {
            self.trip_infos.write_record(&[
                row.agent.clone(),
                row.stage.to_string(),
                row.kind.to_owned(),
                opt(row.depart),
                opt(row.arrival),
                row.duration.to_string(),
                row.waiting_time.to_string(),
                row.vehicle.clone(),
                opt(row.route_length),
                row.arrival_pos.to_string(),
                row.act_type.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record(&[
                row.time.to_string(),
                row.agent.clone(),
                row.kind.clone(),
                row.link.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_routes(&mut self, rows: &[RouteRow]) -> OutputResult<()> {
        for row in rows {
            self.routes.write_record(&[
                row.agent.clone(),
                row.stage.to_string(),
                row.kind.to_owned(),
                row.edges.clone(),
                row.to_stop.clone(),
                row.lines.clone(),
                opt(row.duration),
                opt(row.until),
                row.act_type.clone(),
                opt(row.arrival_pos),
                row.intended.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_snapshots(&mut self, rows: &[SnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.agent.clone(),
                row.stage.to_string(),
                row.kind.to_owned(),
                row.edge.clone(),
                row.pos.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.speed.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            row.advanced_agents.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.trip_infos.flush()?;
        self.events.flush()?;
        self.routes.flush()?;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
