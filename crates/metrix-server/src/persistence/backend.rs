use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use metrix_core::error::{MetrixError, Result};
use metrix_core::snapshot::{DecodedSnapshot, Snapshot};

/// Durable medium for snapshots. A relational backend would implement this
/// same contract.
#[async_trait]
pub trait SnapshotBackend: Send + Sync {
    /// Human-readable target for logs.
    fn describe(&self) -> String;

    /// `Ok(None)` when no snapshot was ever written.
    async fn load(&self) -> Result<Option<DecodedSnapshot>>;

    /// Replace the stored snapshot atomically.
    async fn store(&self, snapshot: &Snapshot) -> Result<()>;

    /// Cheap reachability check.
    async fn ping(&self) -> Result<()>;
}

/// JSON Lines file, replaced via write-to-temp + rename.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut s: OsString = self.path.clone().into_os_string();
        s.push(".tmp");
        PathBuf::from(s)
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    async fn write_tmp(&self, tmp: &Path, payload: Bytes) -> Result<()> {
        let mut f = tokio::fs::File::create(tmp).await?;
        f.write_all(&payload).await?;
        f.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotBackend for FileBackend {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    async fn load(&self) -> Result<Option<DecodedSnapshot>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MetrixError::Io(e)),
        };
        // lossy: a few bad bytes should only cost the lines they sit on
        let text = String::from_utf8_lossy(&raw);
        Ok(Some(Snapshot::decode(&text)))
    }

    async fn store(&self, snapshot: &Snapshot) -> Result<()> {
        let payload = snapshot.encode()?;

        if let Some(parent) = self.parent_dir() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.tmp_path();
        if let Err(e) = self.write_tmp(&tmp, payload).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let Some(parent) = self.parent_dir() else {
            return Ok(());
        };
        match tokio::fs::metadata(parent).await {
            Ok(m) if m.is_dir() => Ok(()),
            Ok(_) => Err(MetrixError::Internal(format!(
                "{} is not a directory",
                parent.display()
            ))),
            // store() creates it on first write
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MetrixError::Io(e)),
        }
    }
}
