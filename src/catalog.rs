use crate::error::{PgmigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One named, ordered schema change script.
///
/// `filename` is the stable identity of the unit: it keys the ledger, so it
/// must never change once the unit has been applied anywhere. The SQL
/// source itself is loaded from disk at apply time and not retained here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationUnit {
    /// SQL file name relative to the migrations directory
    pub file: String,

    /// Human-readable label for log lines and summaries
    pub description: String,
}

/// The fixed, ordered list of migration units.
///
/// Declaration order is application order. The catalog is declared
/// explicitly in configuration rather than discovered by directory
/// scanning, so the order stays deterministic and auditable. Reordering
/// entries after any of them has been applied to a live environment is a
/// correctness hazard the runner does not detect.
#[derive(Debug, Clone)]
pub struct Catalog {
    units: Vec<MigrationUnit>,
}

impl Catalog {
    /// Build a catalog from an ordered list of units, rejecting duplicate
    /// filenames (the ledger key must be unique within the catalog).
    pub fn new(units: Vec<MigrationUnit>) -> Result<Self> {
        let mut seen = HashSet::new();
        for unit in &units {
            if !seen.insert(unit.file.as_str()) {
                return Err(PgmigError::DuplicateMigration(unit.file.clone()));
            }
        }
        Ok(Self { units })
    }

    pub fn units(&self) -> &[MigrationUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Load a unit's SQL source from the migrations directory.
    ///
    /// A missing file is reported as `Ok(None)` rather than an error: the
    /// runner logs a warning for that unit and continues with the rest of
    /// the catalog. Any other I/O failure is surfaced.
    pub fn load_source(&self, migrations_dir: &Path, unit: &MigrationUnit) -> Result<Option<String>> {
        let path = migrations_dir.join(&unit.file);
        match std::fs::read_to_string(&path) {
            Ok(source) => Ok(Some(source)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PgmigError::FileRead {
                path,
                message: e.to_string(),
                source: e,
            }),
        }
    }
}
