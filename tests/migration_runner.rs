//! End-to-end runner tests against a live PostgreSQL container.
//!
//! These need a Docker daemon, so they are ignored by default:
//!
//! ```sh
//! cargo test --test migration_runner -- --ignored
//! ```

mod common;

use common::TestEnvironment;
use indoc::indoc;
use pgmig::catalog::{Catalog, MigrationUnit};
use pgmig::commands;
use pgmig::config::{PgmigConfig, VerifySection};
use pgmig::db::{connect_to_database, DatabaseConfig, Ledger};
use pgmig::error::PgmigError;
use pgmig::runner::{self, FailedUnit};
use pgmig::verifier;

fn unit(file: &str, description: &str) -> MigrationUnit {
    MigrationUnit {
        file: file.to_string(),
        description: description.to_string(),
    }
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn fresh_run_applies_every_unit_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnvironment::new().await?;

    env.write_migration(
        "001_users.sql",
        indoc! {"
            CREATE TABLE users (
                id SERIAL PRIMARY KEY,
                email TEXT NOT NULL UNIQUE
            );
        "},
    )?;
    env.write_migration(
        "002_sessions.sql",
        indoc! {"
            -- sessions reference users, so this must run second
            CREATE TABLE sessions (
                id SERIAL PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id)
            );
            CREATE INDEX sessions_user_id_idx ON sessions(user_id);
        "},
    )?;

    let catalog = Catalog::new(vec![
        unit("001_users.sql", "users table"),
        unit("002_sessions.sql", "sessions table and index"),
    ])?;

    let report = runner::run(&catalog, &env.migrations_dir, &env.client).await?;

    assert_eq!(report.applied, vec!["001_users.sql", "002_sessions.sql"]);
    assert!(report.skipped.is_empty());
    assert!(report.missing.is_empty());
    assert!(report.failed.is_none());
    assert_eq!(
        env.ledger_filenames().await,
        vec!["001_users.sql", "002_sessions.sql"]
    );

    // Both statements of the second unit ran
    let row = env
        .client
        .query_one(
            "SELECT EXISTS (SELECT 1 FROM pg_indexes WHERE indexname = 'sessions_user_id_idx')",
            &[],
        )
        .await?;
    assert!(row.get::<_, bool>(0));

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn second_run_skips_everything() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnvironment::new().await?;

    env.write_migration("001_counters.sql", "CREATE TABLE counters (n INTEGER);")?;
    let catalog = Catalog::new(vec![unit("001_counters.sql", "counters")])?;

    let first = runner::run(&catalog, &env.migrations_dir, &env.client).await?;
    assert_eq!(first.applied_count(), 1);

    let second = runner::run(&catalog, &env.migrations_dir, &env.client).await?;
    assert_eq!(second.applied_count(), 0);
    assert_eq!(second.skipped, vec!["001_counters.sql"]);

    // Exactly one ledger row, even after two runs
    assert_eq!(env.ledger_filenames().await, vec!["001_counters.sql"]);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn fatal_error_aborts_without_recording() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnvironment::new().await?;

    env.write_migration("001_ok.sql", "CREATE TABLE a (id INTEGER);")?;
    env.write_migration("002_broken.sql", "CREATE TABEL b (id INTEGER);")?;
    env.write_migration("003_never_reached.sql", "CREATE TABLE c (id INTEGER);")?;

    let catalog = Catalog::new(vec![
        unit("001_ok.sql", "fine"),
        unit("002_broken.sql", "typo in CREATE TABLE"),
        unit("003_never_reached.sql", "after the failure"),
    ])?;

    let report = runner::run(&catalog, &env.migrations_dir, &env.client).await?;

    assert_eq!(report.applied, vec!["001_ok.sql"]);
    let FailedUnit { filename, error } = report.failed.expect("run should have failed");
    assert_eq!(filename, "002_broken.sql");
    assert!(error.contains("syntax error"), "got: {error}");

    // The failed unit and everything after it stay out of the ledger
    assert_eq!(env.ledger_filenames().await, vec!["001_ok.sql"]);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn rerun_after_fixing_a_fatal_unit_resumes_where_it_stopped(
) -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnvironment::new().await?;

    env.write_migration("001_first.sql", "CREATE TABLE first (id INTEGER);")?;
    env.write_migration("002_second.sql", "THIS IS NOT SQL;")?;
    env.write_migration("003_third.sql", "CREATE TABLE third (id INTEGER);")?;

    let catalog = Catalog::new(vec![
        unit("001_first.sql", "first"),
        unit("002_second.sql", "second"),
        unit("003_third.sql", "third"),
    ])?;

    let broken = runner::run(&catalog, &env.migrations_dir, &env.client).await?;
    assert!(broken.failed.is_some());
    assert_eq!(env.ledger_filenames().await, vec!["001_first.sql"]);

    // Fix the file and run again; only the unapplied tail executes
    env.write_migration("002_second.sql", "CREATE TABLE second (id INTEGER);")?;
    let resumed = runner::run(&catalog, &env.migrations_dir, &env.client).await?;

    assert_eq!(resumed.skipped, vec!["001_first.sql"]);
    assert_eq!(resumed.applied, vec!["002_second.sql", "003_third.sql"]);
    assert!(resumed.failed.is_none());
    assert_eq!(
        env.ledger_filenames().await,
        vec!["001_first.sql", "002_second.sql", "003_third.sql"]
    );

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn already_exists_error_is_absorbed_and_recorded() -> Result<(), Box<dyn std::error::Error>>
{
    let env = TestEnvironment::new().await?;

    // The table exists before the migration system ever sees it, a schema
    // that predates ledger tracking
    env.client
        .execute("CREATE TABLE legacy (id INTEGER)", &[])
        .await?;

    env.write_migration("001_legacy.sql", "CREATE TABLE legacy (id INTEGER);")?;
    env.write_migration("002_next.sql", "CREATE TABLE brand_new (id INTEGER);")?;

    let catalog = Catalog::new(vec![
        unit("001_legacy.sql", "collides with pre-existing table"),
        unit("002_next.sql", "runs despite the collision"),
    ])?;

    let report = runner::run(&catalog, &env.migrations_dir, &env.client).await?;

    assert_eq!(report.applied, vec!["001_legacy.sql", "002_next.sql"]);
    assert!(report.failed.is_none());
    assert_eq!(
        env.ledger_filenames().await,
        vec!["001_legacy.sql", "002_next.sql"]
    );

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn missing_source_file_warns_and_continues() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnvironment::new().await?;

    env.write_migration("002_present.sql", "CREATE TABLE present (id INTEGER);")?;

    let catalog = Catalog::new(vec![
        unit("001_absent.sql", "file never written"),
        unit("002_present.sql", "file on disk"),
    ])?;

    let report = runner::run(&catalog, &env.migrations_dir, &env.client).await?;

    assert_eq!(report.missing, vec!["001_absent.sql"]);
    assert_eq!(report.applied, vec!["002_present.sql"]);
    assert!(report.failed.is_none());
    // Missing units leave no ledger trace, so they retry on a later run
    assert_eq!(env.ledger_filenames().await, vec!["002_present.sql"]);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn verifier_flags_exactly_the_absent_objects() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnvironment::new().await?;

    env.write_migration(
        "001_schema.sql",
        indoc! {"
            CREATE TABLE accounts (id SERIAL PRIMARY KEY, balance BIGINT NOT NULL);
            CREATE VIEW positive_accounts AS SELECT * FROM accounts WHERE balance > 0;
        "},
    )?;

    let catalog = Catalog::new(vec![unit("001_schema.sql", "accounts plus view")])?;
    let report = runner::run(&catalog, &env.migrations_dir, &env.client).await?;
    assert!(report.failed.is_none());

    let expected = VerifySection {
        tables: vec!["accounts".to_string(), "ghost_table".to_string()],
        views: vec!["positive_accounts".to_string()],
        functions: vec![],
    };
    let verification = verifier::verify(&env.client, &expected).await?;

    assert!(!verification.all_present());
    let missing: Vec<&str> = verification
        .missing()
        .iter()
        .map(|check| check.name.as_str())
        .collect();
    assert_eq!(missing, vec!["ghost_table"]);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn connection_string_resolution_reaches_the_database(
) -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnvironment::new().await?;

    let db_config = DatabaseConfig::from_url(&env.connection_string)?;
    let client = connect_to_database(&db_config).await?;

    let row = client.query_one("SELECT current_database()", &[]).await?;
    assert_eq!(row.get::<_, String>(0), "postgres");

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn full_migrate_pass_verifies_even_when_a_source_is_unreadable(
) -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnvironment::new().await?;

    env.write_migration("001_ok.sql", "CREATE TABLE readable (id INTEGER);")?;
    // A directory where a migration file should be is a read error, not a
    // missing file, so the run aborts with Err instead of a report entry
    std::fs::create_dir(env.migrations_dir.join("002_dir.sql"))?;

    let config = PgmigConfig {
        connection_string: Some(env.connection_string.clone()),
        migrations_dir: Some(env.migrations_dir.clone()),
        migrations: vec![
            unit("001_ok.sql", "fine"),
            unit("002_dir.sql", "a directory, not a file"),
        ],
        verify: Some(VerifySection {
            tables: vec!["readable".to_string()],
            views: vec![],
            functions: vec![],
        }),
        ..Default::default()
    };

    let result = commands::execute_migrate(&config).await;
    assert!(matches!(result, Err(PgmigError::FileRead { .. })));

    // The first unit landed and stayed in the ledger despite the abort,
    // and the expected table it created really exists
    assert_eq!(env.ledger_filenames().await, vec!["001_ok.sql"]);
    let expected = config.verify.clone().unwrap_or_default();
    let verification = verifier::verify(&env.client, &expected).await?;
    assert!(verification.all_present());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn ledger_record_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnvironment::new().await?;

    let ledger = Ledger::new(&env.client);
    ledger.ensure_schema().await?;
    ledger.record_applied("001_once.sql").await?;
    ledger.record_applied("001_once.sql").await?;
    ledger.record_applied("002_later.sql").await?;

    assert_eq!(
        env.ledger_filenames().await,
        vec!["001_once.sql", "002_later.sql"]
    );
    assert!(ledger.has_applied("001_once.sql").await?);
    assert!(!ledger.has_applied("003_never.sql").await?);

    let entries = ledger.applied_migrations().await?;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].filename, "001_once.sql");
    assert_eq!(entries[1].filename, "002_later.sql");
    // applied_at comes back as a real timestamp in insertion order
    assert!(entries[0].applied_at <= entries[1].applied_at);

    Ok(())
}
