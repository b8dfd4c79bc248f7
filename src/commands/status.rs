use crate::config::PgmigConfig;
use crate::db::{connect_to_database, DatabaseConfig, Ledger, LedgerEntry};
use crate::error::Result;
#[cfg(feature = "cli")]
use owo_colors::OwoColorize;

/// Applied and pending state of the configured catalog
#[derive(Debug)]
pub struct StatusResult {
    pub applied: Vec<LedgerEntry>,
    pub pending: Vec<String>,
}

/// List what the ledger holds and which catalog units are still pending
pub async fn execute_status(config: &PgmigConfig) -> Result<StatusResult> {
    let db_config = DatabaseConfig::resolve(config)?;
    let catalog = config.catalog()?;

    let client = connect_to_database(&db_config).await?;
    let ledger = Ledger::new(&client);
    ledger.ensure_schema().await?;

    let applied = ledger.applied_migrations().await?;
    let applied_names = ledger.applied_filenames().await?;

    let pending = catalog
        .units()
        .iter()
        .filter(|unit| !applied_names.contains(&unit.file))
        .map(|unit| unit.file.clone())
        .collect();

    Ok(StatusResult { applied, pending })
}

#[cfg(feature = "cli")]
pub fn print_status_summary(result: &StatusResult) {
    println!("\n{}", "=== Migration Status ===".bold().blue());

    if result.applied.is_empty() {
        println!("  {}", "No migrations recorded in the ledger.".yellow());
    } else {
        println!("\n{}:", "Applied".bold().green());
        for entry in &result.applied {
            println!(
                "  {} {} ({})",
                "✓".green().bold(),
                entry.filename.cyan(),
                entry.applied_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }

    if !result.pending.is_empty() {
        println!("\n{}:", "Pending".bold().yellow());
        for filename in &result.pending {
            println!("  {} {}", "→".cyan(), filename.cyan());
        }
    } else {
        println!("\n{}", "Ledger is up to date with the catalog.".green());
    }
}
