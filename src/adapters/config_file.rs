//! Client configuration loading from `collabflow.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::configuration::{CONFIG_FILE_NAME, CONFIG_PATH_ENV};
use crate::domain::{AppError, ClientConfig};

/// Resolve which config file to read.
///
/// An explicit path wins, then `COLLABFLOW_CONFIG`, then `collabflow.toml` in
/// `work_dir`. Explicit and environment paths must exist; the default file is
/// optional.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    work_dir: &Path,
) -> Result<Option<PathBuf>, AppError> {
    if let Some(path) = explicit {
        return require_existing(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|value| !value.is_empty()) {
        return require_existing(PathBuf::from(path));
    }
    let default_path = work_dir.join(CONFIG_FILE_NAME);
    Ok(default_path.is_file().then_some(default_path))
}

fn require_existing(path: PathBuf) -> Result<Option<PathBuf>, AppError> {
    if !path.is_file() {
        return Err(AppError::config_error(format!("Config file not found: {}", path.display())));
    }
    Ok(Some(path))
}

/// Load and validate configuration, falling back to defaults when no file is present.
pub fn load_config(explicit: Option<&Path>, work_dir: &Path) -> Result<ClientConfig, AppError> {
    let config = match resolve_config_path(explicit, work_dir)? {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            parse_config_content(&fs::read_to_string(&path)?)?
        }
        None => ClientConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

pub fn parse_config_content(content: &str) -> Result<ClientConfig, AppError> {
    Ok(toml::from_str(content)?)
}
