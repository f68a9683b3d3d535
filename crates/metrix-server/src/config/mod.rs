//! Server config loader (strict parsing + env overrides).
//!
//! Precedence: defaults < YAML file < environment. A missing file is not an
//! error; a file with unknown keys is.

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use metrix_core::error::{MetrixError, Result};

pub use schema::{ServerConfig, ServerSection, StorageSection};

/// Used when `METRIX_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "metrix.yaml";

/// Load `path` (if present), apply process env overrides, validate.
pub fn load(path: &str) -> Result<ServerConfig> {
    let mut cfg = match fs::read_to_string(path) {
        Ok(s) => parse(&s)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path, "config file not found, using defaults");
            ServerConfig::default()
        }
        Err(e) => return Err(MetrixError::Internal(format!("read config failed: {e}"))),
    };
    cfg.apply_env(|key| std::env::var(key).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetrixError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg = parse(s)?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse(s: &str) -> Result<ServerConfig> {
    serde_yaml::from_str(s).map_err(|e| MetrixError::BadRequest(format!("invalid yaml: {e}")))
}
