//! Remote shard access.
//!
//! The dataset lives in a Google Cloud Storage bucket with one prefix per
//! split. Listing and downloading go through the `gsutil` command-line tool.
//! Command failures are detected and reported by [`GsutilStore`], while
//! [`list_shards`] and [`fetch_shard`] only log them: an unreadable listing
//! yields no shards, and a failed download is left to fail at decode time.

use crate::config::StorageConfig;
use async_trait::async_trait;
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Errors reported by an object store backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Dataset split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Split {
    #[default]
    Training,
    Testing,
    Validation,
}

impl Split {
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Training => "training",
            Split::Testing => "testing",
            Split::Validation => "validation",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object store holding the dataset shards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List the objects under `prefix`, one location per entry.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Copy the object at `url` to the local file `dest`.
    async fn copy_to_local(&self, url: &str, dest: &Path) -> Result<(), StorageError>;
}

/// Object store backed by the `gsutil` command-line tool.
#[derive(Debug, Clone)]
pub struct GsutilStore {
    program: String,
}

impl GsutilStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            program: config.gsutil_path.clone(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String, StorageError> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| StorageError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(StorageError::CommandFailed {
                command: format!("{} {}", self.program, args.join(" ")),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ObjectStore for GsutilStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let stdout = self.run(&["ls", prefix]).await?;
        Ok(parse_listing(&stdout))
    }

    async fn copy_to_local(&self, url: &str, dest: &Path) -> Result<(), StorageError> {
        let dest = dest.to_string_lossy();
        self.run(&["cp", url, dest.as_ref()]).await?;
        Ok(())
    }
}

/// Non-empty lines of a listing, in order.
fn parse_listing(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// List the shard locations of a split.
///
/// A failed listing is logged and treated as an empty split.
#[instrument(skip(store))]
pub async fn list_shards(store: &dyn ObjectStore, bucket: &str, split: Split) -> Vec<String> {
    let prefix = format!("{}/{}", bucket.trim_end_matches('/'), split);

    match store.list(&prefix).await {
        Ok(shards) => {
            debug!(prefix = %prefix, count = shards.len(), "Listed shards");
            shards
        }
        Err(e) => {
            warn!(prefix = %prefix, error = %e, "Shard listing failed, treating split as empty");
            Vec::new()
        }
    }
}

/// Download a shard into `temp_dir`.
///
/// The copy's outcome is only logged; decoding a failed download fails
/// downstream.
#[instrument(skip(store, temp_dir))]
pub async fn fetch_shard(store: &dyn ObjectStore, url: &str, temp_dir: &Path) -> LocalShard {
    let shard = LocalShard::new_in(temp_dir);

    if let Err(e) = store.copy_to_local(url, shard.path()).await {
        warn!(
            url = %url,
            path = %shard.path().display(),
            error = %e,
            "Shard download failed"
        );
    }

    shard
}

/// Temporary local copy of one shard, removed when dropped.
#[derive(Debug)]
pub struct LocalShard {
    path: PathBuf,
}

impl LocalShard {
    /// Pick a fresh path in `dir`. No file is created.
    pub fn new_in(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("waymo-shard-{}.tfrecord", Uuid::new_v4().simple())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LocalShard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "Shard cleanup failed");
        }
    }
}

/// Shard file name, for logging.
pub fn shard_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
