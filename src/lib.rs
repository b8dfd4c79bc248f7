//! pgmig applies an ordered catalog of raw SQL migration scripts to a
//! PostgreSQL database exactly once each, records what it applied in a
//! durable ledger, absorbs benign "already exists" re-application errors,
//! and verifies afterwards that the expected tables, views, and functions
//! exist.
//!
//! The catalog is declared explicitly in `pgmig.toml` (order matters and is
//! never inferred from the filesystem). Runs are resumable: an interrupted
//! run leaves the ledger valid and the next run picks up at the first
//! unapplied unit. The tool provides no mutual exclusion against a second
//! concurrent runner; callers must ensure only one migration process
//! targets a database at a time.

pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod runner;
pub mod sql;
pub mod verifier;

pub use catalog::{Catalog, MigrationUnit};
pub use config::PgmigConfig;
pub use error::{PgmigError, Result};
pub use runner::{run, FailedUnit, RunReport, UnitOutcome};
pub use sql::split_sql;
pub use verifier::{verify, VerificationReport};
