//! The `OutputWriter` trait implemented by all backend writers.

use crate::{EventRow, OutputResult, RouteRow, SnapshotRow, TickSummaryRow, TripInfoRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// All methods are infallible from the observer's perspective; errors are
/// stored internally and retrieved with
/// [`PlanOutputObserver::take_error`][crate::PlanOutputObserver::take_error].
pub trait OutputWriter {
    /// Write the trip summary of one arrived agent.
    fn write_trip_infos(&mut self, rows: &[TripInfoRow]) -> OutputResult<()>;

    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()>;

    /// Write the persisted plan of one arrived agent.
    fn write_routes(&mut self, rows: &[RouteRow]) -> OutputResult<()>;

    /// Write the agent positions of one snapshot tick.
    fn write_snapshots(&mut self, rows: &[SnapshotRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
