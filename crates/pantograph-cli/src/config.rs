//! Configuration file loading for the Pantograph CLI.
//!
//! An explicit `--config` path wins; otherwise the user configuration
//! directory is consulted (`pantograph/config.toml`), and when neither
//! exists the built-in defaults apply.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use log::{debug, info};

use pantograph::PantographError;
use pantograph::config::AppConfig;

/// Loads the application configuration.
///
/// # Errors
///
/// Returns [`PantographError::Config`] when an explicitly requested file
/// cannot be read or parsed. A missing default-location file is not an
/// error; the defaults are used instead.
pub fn load_config(path: Option<&String>) -> Result<AppConfig, PantographError> {
    let path = match path {
        Some(path) => PathBuf::from(path),
        None => {
            let Some(default_path) = default_config_path() else {
                debug!("no user configuration directory, using defaults");
                return Ok(AppConfig::default());
            };
            if !default_path.exists() {
                debug!(path:? = default_path; "no configuration file, using defaults");
                return Ok(AppConfig::default());
            }
            default_path
        }
    };

    let contents = fs::read_to_string(&path).map_err(|err| {
        PantographError::Config(format!("cannot read `{}`: {err}", path.display()))
    })?;
    let config = toml::from_str(&contents).map_err(|err| {
        PantographError::Config(format!("cannot parse `{}`: {err}", path.display()))
    })?;

    info!(path:? = path; "configuration loaded");
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pantograph")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
