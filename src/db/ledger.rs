use crate::error::{PgmigError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio_postgres::Client;

/// A persisted record proving a migration unit was applied
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub filename: String,
    pub applied_at: DateTime<Utc>,
}

/// The durable applied-migration ledger.
///
/// Entries are insert-only from this subsystem: the ledger is never updated
/// or truncated here. The primary key on `filename` absorbs duplicate
/// inserts, which is the last line of defense when a prior partial run (or
/// a concurrent runner, which the tool otherwise does not guard against)
/// already recorded the same unit.
pub struct Ledger<'a> {
    client: &'a Client,
}

impl<'a> Ledger<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create the ledger table if absent. Safe to call on every run.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.client
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS schema_migrations (
                    filename TEXT PRIMARY KEY,
                    applied_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
                )
                "#,
                &[],
            )
            .await
            .map_err(|e| PgmigError::LedgerInitialization(e.to_string()))?;

        Ok(())
    }

    /// Whether the named unit has already been applied to this database
    pub async fn has_applied(&self, filename: &str) -> Result<bool> {
        let row = self
            .client
            .query_one(
                "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE filename = $1)",
                &[&filename],
            )
            .await?;

        Ok(row.get(0))
    }

    /// Record a unit as applied; duplicate inserts are silently absorbed
    pub async fn record_applied(&self, filename: &str) -> Result<()> {
        self.client
            .execute(
                "INSERT INTO schema_migrations (filename) VALUES ($1) ON CONFLICT (filename) DO NOTHING",
                &[&filename],
            )
            .await?;

        Ok(())
    }

    /// All ledger entries in application order
    pub async fn applied_migrations(&self) -> Result<Vec<LedgerEntry>> {
        let rows = self
            .client
            .query(
                "SELECT filename, applied_at FROM schema_migrations ORDER BY applied_at, filename",
                &[],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| LedgerEntry {
                filename: row.get(0),
                applied_at: row.get(1),
            })
            .collect())
    }

    /// Applied filenames as a set, for bulk skip checks
    pub async fn applied_filenames(&self) -> Result<HashSet<String>> {
        let rows = self
            .client
            .query("SELECT filename FROM schema_migrations", &[])
            .await?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }
}
