use crate::catalog::{Catalog, MigrationUnit};
use crate::db::Ledger;
use crate::error::{database_error_message, is_benign_execution_error, Result};
use crate::logging::format_duration;
use crate::sql::split_sql;
use crate::verifier::VerificationReport;
use std::path::Path;
use std::time::Instant;
use tokio_postgres::Client;
use tracing::{error, info, warn};

/// Identity and error text of the unit that aborted a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUnit {
    pub filename: String,
    pub error: String,
}

/// Terminal outcome of a single migration unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Ledger already holds this unit; its SQL was not re-executed
    AlreadyApplied,
    /// The catalog entry's SQL file is absent; unit skipped with a warning
    Missing,
    /// Executed cleanly and recorded in the ledger
    Applied,
    /// Execution raised "already exists"; recorded in the ledger anyway
    BenignFailure,
    /// Any other execution error; the run stops here
    FatalFailure,
}

/// What one invocation of the runner did, plus the post-run schema check
#[derive(Debug, Default)]
pub struct RunReport {
    /// Units executed (or benignly absorbed) and recorded this run
    pub applied: Vec<String>,
    /// Units skipped because the ledger already held them
    pub skipped: Vec<String>,
    /// Units skipped because their SQL source was missing
    pub missing: Vec<String>,
    /// Set when a fatal execution error aborted the run
    pub failed: Option<FailedUnit>,
    /// Filled by the verifier after the run, when a connection exists
    pub verification: Option<VerificationReport>,
}

impl RunReport {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn all_critical_objects_present(&self) -> bool {
        self.verification
            .as_ref()
            .map(VerificationReport::all_present)
            .unwrap_or(false)
    }

    /// Overall success: no fatal failure and every expected object present
    pub fn is_success(&self) -> bool {
        self.failed.is_none() && self.all_critical_objects_present()
    }
}

/// Apply the catalog to the database, in order, exactly once per unit.
///
/// Strictly sequential: each unit reaches a terminal state before the next
/// is considered, and statements within a unit execute in split order. The
/// ledger schema is ensured first, so a fresh database works without any
/// manual setup. A fatal failure is returned inside the report rather than
/// as an `Err` so the caller can still run the verifier and print a
/// summary before propagating it.
pub async fn run(catalog: &Catalog, migrations_dir: &Path, client: &Client) -> Result<RunReport> {
    let ledger = Ledger::new(client);
    ledger.ensure_schema().await?;

    let mut report = RunReport::default();

    for unit in catalog.units() {
        let outcome = run_unit(catalog, migrations_dir, client, &ledger, unit, &mut report).await?;
        if outcome == UnitOutcome::FatalFailure {
            break;
        }
    }

    Ok(report)
}

async fn run_unit(
    catalog: &Catalog,
    migrations_dir: &Path,
    client: &Client,
    ledger: &Ledger<'_>,
    unit: &MigrationUnit,
    report: &mut RunReport,
) -> Result<UnitOutcome> {
    if ledger.has_applied(&unit.file).await? {
        info!(migration = %unit.file, "skipped (already applied)");
        report.skipped.push(unit.file.clone());
        return Ok(UnitOutcome::AlreadyApplied);
    }

    let source = match catalog.load_source(migrations_dir, unit)? {
        Some(source) => source,
        None => {
            warn!(
                migration = %unit.file,
                dir = %migrations_dir.display(),
                "migration source missing, skipping"
            );
            report.missing.push(unit.file.clone());
            return Ok(UnitOutcome::Missing);
        }
    };

    info!(migration = %unit.file, description = %unit.description, "applying");
    let started = Instant::now();

    for statement in split_sql(&source) {
        if let Err(e) = client.execute(&statement, &[]).await {
            let message = database_error_message(&e);
            let elapsed = format_duration(started.elapsed());

            if is_benign_execution_error(&e) {
                warn!(
                    migration = %unit.file,
                    error = %message,
                    elapsed = %elapsed,
                    "benign failure, marking applied"
                );
                ledger.record_applied(&unit.file).await?;
                report.applied.push(unit.file.clone());
                return Ok(UnitOutcome::BenignFailure);
            }

            error!(
                migration = %unit.file,
                error = %message,
                elapsed = %elapsed,
                "migration failed, aborting run"
            );
            report.failed = Some(FailedUnit {
                filename: unit.file.clone(),
                error: message,
            });
            return Ok(UnitOutcome::FatalFailure);
        }
    }

    ledger.record_applied(&unit.file).await?;
    info!(
        migration = %unit.file,
        elapsed = %format_duration(started.elapsed()),
        "applied"
    );
    report.applied.push(unit.file.clone());
    Ok(UnitOutcome::Applied)
}
