use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use metrix_core::error::{MetrixError, Result};

use crate::persistence::SnapshotPolicy;

/// Upper bound for `storage.store_interval_secs` (one day).
const MAX_STORE_INTERVAL_SECS: u64 = 86_400;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            storage: StorageSection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetrixError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    /// Overlay environment variables. `lookup` is injected so tests don't
    /// have to mutate the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ADDRESS") {
            self.server.listen = v;
        }
        if let Some(v) = lookup("STORE_INTERVAL") {
            self.storage.store_interval_secs = v.trim().parse().map_err(|_| {
                MetrixError::BadRequest(format!("STORE_INTERVAL must be seconds, got {v:?}"))
            })?;
        }
        if let Some(v) = lookup("FILE_STORAGE_PATH") {
            self.storage.file_storage_path = v;
        }
        if let Some(v) = lookup("RESTORE") {
            self.storage.restore = parse_bool(&v)
                .ok_or_else(|| MetrixError::BadRequest(format!("RESTORE must be a bool, got {v:?}")))?;
        }
        if let Some(v) = lookup("DATABASE_DSN") {
            self.storage.database_dsn = v;
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            MetrixError::BadRequest(format!(
                "server.listen must be a valid SocketAddr, got {:?}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    /// Snapshot file. Empty disables persistence.
    #[serde(default = "default_file_storage_path")]
    pub file_storage_path: String,

    /// 0 snapshots after every mutation; otherwise the periodic interval.
    #[serde(default = "default_store_interval_secs")]
    pub store_interval_secs: u64,

    /// Load the snapshot at startup.
    #[serde(default = "default_restore")]
    pub restore: bool,

    /// Relational backend DSN. Accepted for compatibility; not supported.
    #[serde(default)]
    pub database_dsn: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            file_storage_path: default_file_storage_path(),
            store_interval_secs: default_store_interval_secs(),
            restore: default_restore(),
            database_dsn: String::new(),
        }
    }
}

impl StorageSection {
    pub fn validate(&self) -> Result<()> {
        if self.store_interval_secs > MAX_STORE_INTERVAL_SECS {
            return Err(MetrixError::BadRequest(format!(
                "storage.store_interval_secs must be at most {MAX_STORE_INTERVAL_SECS}"
            )));
        }
        Ok(())
    }

    pub fn snapshot_path(&self) -> Option<PathBuf> {
        let p = self.file_storage_path.trim();
        (!p.is_empty()).then(|| PathBuf::from(p))
    }

    pub fn snapshot_policy(&self) -> SnapshotPolicy {
        match self.store_interval_secs {
            0 => SnapshotPolicy::Synchronous,
            secs => SnapshotPolicy::Periodic(Duration::from_secs(secs)),
        }
    }
}

fn default_file_storage_path() -> String {
    "/tmp/metrics-db.json".into()
}
fn default_store_interval_secs() -> u64 {
    300
}
fn default_restore() -> bool {
    true
}
