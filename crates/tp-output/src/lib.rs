//! `tp-output` — output writers for transportable plans.
//!
//! Two backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                                   |
//! |-----------|---------|-----------------------------------------------------------------|
//! | *(none)*  | CSV     | `tripinfos.csv`, `events.csv`, `routes.csv`, `snapshots.csv`, `tick_summaries.csv` |
//! | `sqlite`  | SQLite  | `output.db`                                                     |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`PlanOutputObserver`], which implements `tp_sim::SimObserver`.
//!
//! | Output      | Written when            | One row per                         |
//! |-------------|-------------------------|-------------------------------------|
//! | tripinfos   | an agent arrives        | stop, ride and walk of its plan     |
//! | events      | a stage begins or ends  | `actstart`/`actend`, departure, arrival |
//! | routes      | an agent arrives        | stage of its plan, enough to replay |
//! | snapshots   | every `output_interval_ticks` | agent, with its stage and position |
//!
//! # Usage
//!
//! ```rust,ignore
//! use tp_output::{CsvWriter, PlanOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = PlanOutputObserver::new(writer, &config);
//! sim.run(&mut obs).unwrap();
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::PlanOutputObserver;
pub use row::{EventRow, RouteRow, SnapshotRow, TickSummaryRow, TripInfoRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
