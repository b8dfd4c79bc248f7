use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{
    fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Initialize the logging and error reporting infrastructure.
///
/// Operator-facing output goes to stdout; when `audit_log` is set, the same
/// events are appended (never truncated) to the given file so a historical
/// audit trail accumulates across runs.
pub fn init(
    verbosity: u8,
    audit_log: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    #[cfg(feature = "cli")]
    color_eyre::install()?;

    let log_level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Allow RUST_LOG to override the verbosity flag
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pgmig={},tokio_postgres=warn", log_level)));

    let is_terminal = std::io::stdout().is_terminal();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(is_terminal)
        .with_timer(UtcTime::rfc_3339());

    let audit_layer = match audit_log {
        Some(path) => {
            let file = OpenOptions::new().append(true).create(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(Arc::new(file))
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(audit_layer)
        .init();

    Ok(())
}

/// Format durations for log lines and summaries
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{:03}s", secs, millis)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}
