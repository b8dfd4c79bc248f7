use crate::config::PgmigConfig;
use crate::db::{connect_to_database, DatabaseConfig};
use crate::error::Result;
use crate::runner::{self, RunReport};
use crate::verifier;
#[cfg(feature = "cli")]
use owo_colors::OwoColorize;
use tracing::info;

/// Run the full migration pass: connect, apply the catalog in order, then
/// verify the expected schema objects.
///
/// Connection parameters are a precondition: resolution or connection
/// failure returns before anything touches the database, and the verifier
/// is skipped because there is no connection to inspect. Once a connection
/// exists the verifier always runs, even when a unit failed mid-run or the
/// run itself aborted with an error, so operators get a schema snapshot on
/// partial failures too.
pub async fn execute_migrate(config: &PgmigConfig) -> Result<RunReport> {
    let db_config = DatabaseConfig::resolve(config)?;
    let catalog = config.catalog()?;
    let migrations_dir = config.migrations_dir();

    let client = connect_to_database(&db_config).await?;
    info!(
        host = %db_config.host,
        database = %db_config.database,
        migrations = catalog.len(),
        "starting migration run"
    );

    let run_result = runner::run(&catalog, &migrations_dir, &client).await;

    // The verifier runs whether or not the run errored out: the connection
    // is live, and its logged snapshot helps diagnose a partial run. A run
    // error still takes precedence over a verification error.
    let expected = config.verify.clone().unwrap_or_default();
    let verification = verifier::verify(&client, &expected).await;

    let mut report = run_result?;
    report.verification = Some(verification?);

    Ok(report)
}

/// Process exit code for a finished run: 0 success, 1 fatal failure,
/// 2 completed but expected schema objects are missing.
pub fn exit_code(report: &RunReport) -> i32 {
    if report.failed.is_some() {
        1
    } else if report.all_critical_objects_present() {
        0
    } else {
        2
    }
}

#[cfg(feature = "cli")]
pub fn print_migrate_summary(report: &RunReport) {
    println!("\n{}", "=== Migration Summary ===".bold().blue());

    println!(
        "  Applied: {}   Skipped: {}   Missing source: {}",
        report.applied_count().to_string().green(),
        report.skipped_count().to_string().yellow(),
        report.missing.len().to_string().yellow(),
    );

    for filename in &report.applied {
        println!("  {} {}", "✓".green().bold(), filename.cyan());
    }
    for filename in &report.missing {
        println!("  {} {} (source file missing)", "⚠".yellow().bold(), filename.cyan());
    }

    if let Some(failed) = &report.failed {
        println!(
            "  {} {} - {}",
            "✗".red().bold(),
            failed.filename.cyan(),
            failed.error.red()
        );
    }

    if let Some(verification) = &report.verification {
        println!("\n{}", "=== Schema Verification ===".bold().blue());
        for check in verification.checks() {
            if check.present {
                println!(
                    "  {} {} {}",
                    "✓".green().bold(),
                    check.kind.as_str().yellow(),
                    check.name.cyan()
                );
            } else {
                println!(
                    "  {} {} {} {}",
                    "✗".red().bold(),
                    check.kind.as_str().yellow(),
                    check.name.cyan(),
                    "MISSING".red().bold()
                );
            }
        }
    }

    if report.failed.is_some() {
        println!("\n{}", "Migration run aborted.".red().bold());
    } else if report.all_critical_objects_present() {
        println!("\n{}", "Migration run completed successfully.".green().bold());
    } else {
        println!(
            "\n{}",
            "Migration run completed with warnings: expected schema objects are missing."
                .yellow()
                .bold()
        );
    }
}
