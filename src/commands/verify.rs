use crate::config::PgmigConfig;
use crate::db::{connect_to_database, DatabaseConfig};
use crate::error::Result;
use crate::verifier::{self, VerificationReport};
#[cfg(feature = "cli")]
use owo_colors::OwoColorize;

/// Run the schema presence check on its own, without applying anything
pub async fn execute_verify(config: &PgmigConfig) -> Result<VerificationReport> {
    let db_config = DatabaseConfig::resolve(config)?;
    let client = connect_to_database(&db_config).await?;

    let expected = config.verify.clone().unwrap_or_default();
    verifier::verify(&client, &expected).await
}

#[cfg(feature = "cli")]
pub fn print_verify_summary(report: &VerificationReport) {
    println!("\n{}", "=== Schema Verification ===".bold().blue());

    if report.checks().is_empty() {
        println!("  {}", "No expected objects configured under [verify].".yellow());
        return;
    }

    for check in report.checks() {
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

    if report.all_present() {
        println!("\n{}", "All expected schema objects are present.".green().bold());
    } else {
        println!(
            "\n{} {} {}",
            "✗".red().bold(),
            report.missing().len().to_string().yellow(),
            "expected schema objects are missing.".red().bold()
        );
    }
}
