//! `ledgercap init`: write the commented default config.
//!
//! An existing file is checked with the same parser `load_config` uses, so
//! the caller can tell the human whether the config they have still loads.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::defaults::DEFAULT_CONFIG_TEMPLATE;
use super::sources::default_global_config_path;
use super::types::FileConfig;
use super::{resolve_config_from_file_config, ConfigInitResult};

/// Initialize `~/.config/ledgercap/ledgercap.toml`.
pub fn initialize_default_global_config(force: bool) -> Result<ConfigInitResult, ConfigError> {
    let path = default_global_config_path().ok_or_else(|| {
        ConfigError::Invalid("unable to resolve a config directory for ledgercap.toml".to_string())
    })?;
    initialize_config_at_path(&path, force)
}

/// Without `force` an existing file is left alone. With `force` it is copied
/// to `<name>.bak` and replaced by the template, unless it already is the
/// template.
pub(super) fn initialize_config_at_path(
    path: &Path,
    force: bool,
) -> Result<ConfigInitResult, ConfigError> {
    let existing = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
            return Ok(ConfigInitResult::Created {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };

    let path = path.to_path_buf();
    if existing == DEFAULT_CONFIG_TEMPLATE {
        return Ok(ConfigInitResult::Unchanged { path });
    }
    let problem = load_problem(&existing);
    if !force {
        return Ok(ConfigInitResult::AlreadyInitialized { path, problem });
    }

    let backup_path = backup_path(&path);
    fs::write(&backup_path, &existing)?;
    fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
    Ok(ConfigInitResult::Overwritten {
        path,
        backup_path,
        problem,
    })
}

/// Why `text` would not load, or `None` if it would.
fn load_problem(text: &str) -> Option<String> {
    toml::from_str::<FileConfig>(text)
        .map_err(ConfigError::from)
        .and_then(resolve_config_from_file_config)
        .err()
        .map(|e| e.to_string())
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}
