use crate::config::VerifySection;
use crate::error::Result;
use tokio_postgres::Client;
use tracing::{info, warn};

/// Kind of schema object the verifier checks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Table,
    View,
    Function,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Table => "table",
            ObjectKind::View => "view",
            ObjectKind::Function => "function",
        }
    }
}

/// Presence result for one expected schema object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaObjectCheck {
    pub name: String,
    pub kind: ObjectKind,
    pub present: bool,
}

/// The post-run schema snapshot
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    checks: Vec<SchemaObjectCheck>,
}

impl VerificationReport {
    pub fn new(checks: Vec<SchemaObjectCheck>) -> Self {
        Self { checks }
    }

    pub fn checks(&self) -> &[SchemaObjectCheck] {
        &self.checks
    }

    pub fn all_present(&self) -> bool {
        self.checks.iter().all(|check| check.present)
    }

    pub fn missing(&self) -> Vec<&SchemaObjectCheck> {
        self.checks.iter().filter(|check| !check.present).collect()
    }
}

/// Check that the expected tables, views, and functions exist.
///
/// Read-only: presence is established through information_schema catalog
/// metadata, never by executing DML against the objects. Runs after the
/// runner so operators get a schema snapshot even on partial-failure runs.
pub async fn verify(client: &Client, expected: &VerifySection) -> Result<VerificationReport> {
    let mut checks = Vec::new();

    for table in &expected.tables {
        let present = table_exists(client, table).await?;
        checks.push(SchemaObjectCheck {
            name: table.clone(),
            kind: ObjectKind::Table,
            present,
        });
    }

    for view in &expected.views {
        let present = view_exists(client, view).await?;
        checks.push(SchemaObjectCheck {
            name: view.clone(),
            kind: ObjectKind::View,
            present,
        });
    }

    for function in &expected.functions {
        let present = function_exists(client, function).await?;
        checks.push(SchemaObjectCheck {
            name: function.clone(),
            kind: ObjectKind::Function,
            present,
        });
    }

    for check in &checks {
        if check.present {
            info!(kind = check.kind.as_str(), name = %check.name, "present");
        } else {
            warn!(kind = check.kind.as_str(), name = %check.name, "MISSING");
        }
    }

    Ok(VerificationReport::new(checks))
}

async fn table_exists(client: &Client, name: &str) -> Result<bool> {
    let row = client
        .query_one(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public'
                AND table_name = $1
                AND table_type = 'BASE TABLE'
            )
            "#,
            &[&name],
        )
        .await?;
    Ok(row.get(0))
}

async fn view_exists(client: &Client, name: &str) -> Result<bool> {
    let row = client
        .query_one(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM information_schema.views
                WHERE table_schema = 'public'
                AND table_name = $1
            )
            "#,
            &[&name],
        )
        .await?;
    Ok(row.get(0))
}

async fn function_exists(client: &Client, name: &str) -> Result<bool> {
    let row = client
        .query_one(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM information_schema.routines
                WHERE routine_schema = 'public'
                AND routine_name = $1
            )
            "#,
            &[&name],
        )
        .await?;
    Ok(row.get(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str, kind: ObjectKind, present: bool) -> SchemaObjectCheck {
        SchemaObjectCheck {
            name: name.to_string(),
            kind,
            present,
        }
    }

    #[test]
    fn test_all_present() {
        let report = VerificationReport::new(vec![
            check("users", ObjectKind::Table, true),
            check("user_stats", ObjectKind::View, true),
        ]);

        assert!(report.all_present());
        assert!(report.missing().is_empty());
    }

    #[test]
    fn test_exactly_the_absent_object_is_flagged() {
        let report = VerificationReport::new(vec![
            check("users", ObjectKind::Table, true),
            check("sessions", ObjectKind::Table, false),
            check("jobs", ObjectKind::Table, true),
        ]);

        assert!(!report.all_present());
        let missing = report.missing();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].name, "sessions");
    }

    #[test]
    fn test_empty_expectations_are_trivially_present() {
        let report = VerificationReport::default();
        assert!(report.all_present());
    }

    #[test]
    fn test_object_kind_labels() {
        assert_eq!(ObjectKind::Table.as_str(), "table");
        assert_eq!(ObjectKind::View.as_str(), "view");
        assert_eq!(ObjectKind::Function.as_str(), "function");
    }
}
