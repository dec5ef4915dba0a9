//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! five tables: `tripinfos`, `events`, `routes`, `snapshots` and
//! `tick_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{EventRow, OutputResult, RouteRow, SnapshotRow, TickSummaryRow, TripInfoRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS tripinfos (
                 agent        TEXT    NOT NULL,
                 stage        INTEGER NOT NULL,
                 kind         TEXT    NOT NULL,
                 depart       INTEGER,
                 arrival      INTEGER,
                 duration     INTEGER NOT NULL,
                 waiting_time INTEGER NOT NULL,
                 vehicle      TEXT    NOT NULL,
                 route_length REAL,
                 arrival_pos  REAL    NOT NULL,
                 act_type     TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS events (
                 time  INTEGER NOT NULL,
                 agent TEXT    NOT NULL,
                 kind  TEXT    NOT NULL,
                 link  TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS routes (
                 agent       TEXT    NOT NULL,
                 stage       INTEGER NOT NULL,
                 kind        TEXT    NOT NULL,
                 edges       TEXT    NOT NULL,
                 to_stop     TEXT    NOT NULL,
                 lines       TEXT    NOT NULL,
                 duration    INTEGER,
                 until       INTEGER,
                 act_type    TEXT    NOT NULL,
                 arrival_pos REAL,
                 intended    TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS snapshots (
                 tick  INTEGER NOT NULL,
                 agent TEXT    NOT NULL,
                 stage INTEGER NOT NULL,
                 kind  TEXT    NOT NULL,
                 edge  TEXT    NOT NULL,
                 pos   REAL    NOT NULL,
                 x     REAL    NOT NULL,
                 y     REAL    NOT NULL,
                 speed REAL    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick            INTEGER PRIMARY KEY,
                 unix_time_secs  INTEGER NOT NULL,
                 advanced_agents INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_trip_infos(&mut self, rows: &[TripInfoRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO tripinfos \
                 (agent, stage, kind, depart, arrival, duration, waiting_time, vehicle, route_length, arrival_pos, act_type) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.agent,
                    row.stage,
                    row.kind,
                    row.depart,
                    row.arrival,
                    row.duration,
                    row.waiting_time,
                    row.vehicle,
                    row.route_length,
                    row.arrival_pos,
                    row.act_type,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached("INSERT INTO events (time, agent, kind, link) VALUES (?1, ?2, ?3, ?4)")?;
            for row in rows {
                stmt.execute(rusqlite::params![row.time, row.agent, row.kind, row.link])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_routes(&mut self, rows: &[RouteRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO routes \
                 (agent, stage, kind, edges, to_stop, lines, duration, until, act_type, arrival_pos, intended) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.agent,
                    row.stage,
                    row.kind,
                    row.edges,
                    row.to_stop,
                    row.lines,
                    row.duration,
                    row.until,
                    row.act_type,
                    row.arrival_pos,
                    row.intended,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_snapshots(&mut self, rows: &[SnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO snapshots (tick, agent, stage, kind, edge, pos, x, y, speed) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick, row.agent, row.stage, row.kind, row.edge, row.pos, row.x, row.y, row.speed,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries (tick, unix_time_secs, advanced_agents) \
             VALUES (?1, ?2, ?3)",
            rusqlite::params![row.tick, row.unix_time_secs, row.advanced_agents],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
