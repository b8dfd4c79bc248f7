use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pgmig
#[derive(Error, Debug)]
pub enum PgmigError {
    // Configuration Errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to load configuration from {path}: {message}")]
    ConfigLoad { path: PathBuf, message: String },

    #[error("No database connection parameters configured")]
    MissingConnection,

    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    // Database Errors
    #[error("Failed to connect to database: {message}")]
    DatabaseConnection {
        message: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: tokio_postgres::Error,
    },

    // Ledger Errors
    #[error("Failed to initialize migration ledger: {0}")]
    LedgerInitialization(String),

    // Migration Errors
    #[error("Migration {filename} failed: {message}")]
    MigrationFailed {
        filename: String,
        message: String,
        #[source]
        source: Option<tokio_postgres::Error>,
    },

    #[error("Duplicate migration filename in catalog: {0}")]
    DuplicateMigration(String),

    // File System Errors
    #[error("Failed to read {path}: {message}")]
    FileRead {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {message}")]
    FileWrite {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl From<tokio_postgres::Error> for PgmigError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.to_string().contains("connect") {
            PgmigError::DatabaseConnection {
                message: err.to_string(),
                source: err,
            }
        } else {
            PgmigError::Database {
                message: err.to_string(),
                source: err,
            }
        }
    }
}

impl From<std::io::Error> for PgmigError {
    fn from(err: std::io::Error) -> Self {
        PgmigError::Other(err.to_string())
    }
}

/// Result type alias for pgmig operations
pub type Result<T> = std::result::Result<T, PgmigError>;

/// Message returned by the server when the object a statement creates is
/// already present.
const ALREADY_EXISTS: &str = "already exists";

/// Classify an execution error as benign.
///
/// A benign error means the migration's intended end state is already in
/// place (a prior partial run, manual intervention, or schema drift), so
/// the unit can be marked applied and the run continues. Classification is
/// by message substring: the server reports duplicate objects as
/// `relation "x" already exists`, `type "y" already exists`, and so on.
pub fn is_benign_execution_error(err: &tokio_postgres::Error) -> bool {
    database_error_message(err).contains(ALREADY_EXISTS)
}

/// Extract the server-side error message when one exists, falling back to
/// the client-side rendering for transport-level failures.
pub fn database_error_message(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db_err) => db_err.message().to_string(),
        None => err.to_string(),
    }
}

/// Format an error together with all of its causes
pub fn format_error_chain(err: &PgmigError) -> String {
    use std::error::Error;

    let mut output = format!("Error: {}", err);

    let mut current_err: &dyn Error = err;
    while let Some(source) = current_err.source() {
        output.push_str(&format!("\n  Caused by: {}", source));
        current_err = source;
    }

    output
}

/// Suggest fixes for common operator mistakes
pub fn suggest_fix(err: &PgmigError) -> Option<String> {
    match err {
        PgmigError::DatabaseConnection { .. } => Some(
            "Suggestions:\n\
             - Check if PostgreSQL is running\n\
             - Verify the connection string is correct\n\
             - Ensure the database exists and you have permission to access it\n\
             - Try: psql <your-connection-string> to test the connection"
                .to_string(),
        ),
        PgmigError::MissingConnection => Some(
            "Provide connection parameters via --connection-string, the \
             connection_string or [database] section of pgmig.toml, or the \
             PGHOST/PGUSER/PGPASSWORD/PGDATABASE environment variables"
                .to_string(),
        ),
        PgmigError::InvalidConnectionString(_) => Some(
            "Connection string should be in format:\n\
             postgres://[user[:password]@][host][:port][/dbname][?param1=value1&...]"
                .to_string(),
        ),
        PgmigError::FileRead { path, .. } => Some(format!(
            "Could not read: {}\n\
             - Check if the path is correct\n\
             - Ensure you're running pgmig from the right directory",
            path.display()
        )),
        _ => None,
    }
}
