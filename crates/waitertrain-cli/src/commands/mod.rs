pub mod categories;
pub mod init;
pub mod progress;
pub mod prompt;
pub mod train;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use waitertrain_core::ScenarioCatalog;
use waitertrain_providers::{load_catalog, load_config_from};

/// Catalog from an explicit file, else whatever the config names, else the
/// built-in one.
pub(crate) fn resolve_catalog(override_path: Option<&Path>) -> Result<ScenarioCatalog> {
    if let Some(path) = override_path {
        return waitertrain_core::parser::parse_catalog(path);
    }
    let config = load_config_from(None)?;
    load_catalog(&config, None)
}
