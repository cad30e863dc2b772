use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use tilebrot_core::RenderConfig;

const CONFIG_FILE_NAME: &str = "tilebrot.json";

/// Default config location: next to the executable.
pub fn config_path() -> PathBuf {
    crate::app_dir::exe_directory().join(CONFIG_FILE_NAME)
}

/// Load and validate the config at `path`, falling back to defaults.
///
/// A missing file is normal; an unreadable, malformed or invalid one is
/// logged and ignored.
pub fn load_config(path: &Path) -> RenderConfig {
    if !path.exists() {
        debug!("No config file at {}", path.display());
        return RenderConfig::default();
    }
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to read config file {}: {e}", path.display());
            return RenderConfig::default();
        }
    };
    match parse_config(&json) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(reason) => {
            error!("Ignoring config file {}: {reason}", path.display());
            RenderConfig::default()
        }
    }
}

fn parse_config(json: &str) -> Result<RenderConfig, String> {
    let config: RenderConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}
