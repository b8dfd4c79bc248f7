use crate::config::PgmigConfig;
use crate::error::{PgmigError, Result};
use std::path::Path;

/// Write a commented sample configuration next to the requested config
/// path, refusing to overwrite an existing file.
pub fn execute_init(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        return Err(PgmigError::Configuration(format!(
            "{} already exists, not overwriting",
            config_path.display()
        )));
    }

    PgmigConfig::write_sample_config(config_path)
}
