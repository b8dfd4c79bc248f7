use pgmig::cli::{Cli, Commands};
use pgmig::commands;
use pgmig::config::PgmigConfig;
use pgmig::error::{format_error_chain, suggest_fix, PgmigError};
use pgmig::logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run_command(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format_error_chain(&e));
            if let Some(suggestion) = suggest_fix(&e) {
                eprintln!("\n{}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run_command(cli: Cli) -> Result<ExitCode, PgmigError> {
    let config_file = PgmigConfig::load_from_file(&cli.config)?;

    match cli.command {
        Commands::Init => {
            logging::init(cli.verbose, None)
                .map_err(|e| PgmigError::Other(e.to_string()))?;
            commands::execute_init(&cli.config)?;
            println!("Wrote sample configuration to {}", cli.config.display());
            Ok(ExitCode::SUCCESS)
        }

        Commands::Migrate {
            migrations_dir,
            connection_string,
            audit_log,
        } => {
            let config = PgmigConfig::merge_with_cli(
                config_file,
                migrations_dir,
                connection_string,
                audit_log,
            );
            logging::init(cli.verbose, config.audit_log.as_deref())
                .map_err(|e| PgmigError::Other(e.to_string()))?;

            let report = commands::execute_migrate(&config).await?;
            commands::print_migrate_summary(&report);

            match commands::exit_code(&report) {
                0 => Ok(ExitCode::SUCCESS),
                code => Ok(ExitCode::from(code as u8)),
            }
        }

        Commands::Verify { connection_string } => {
            let config =
                PgmigConfig::merge_with_cli(config_file, None, connection_string, None);
            logging::init(cli.verbose, config.audit_log.as_deref())
                .map_err(|e| PgmigError::Other(e.to_string()))?;

            let report = commands::execute_verify(&config).await?;
            commands::print_verify_summary(&report);

            if report.all_present() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(2))
            }
        }

        Commands::Status { connection_string } => {
            let config =
                PgmigConfig::merge_with_cli(config_file, None, connection_string, None);
            logging::init(cli.verbose, config.audit_log.as_deref())
                .map_err(|e| PgmigError::Other(e.to_string()))?;

            let result = commands::execute_status(&config).await?;
            commands::print_status_summary(&result);
            Ok(ExitCode::SUCCESS)
        }
    }
}
