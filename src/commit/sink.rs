//! Destinations for committed component documents

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::CommitError;
use crate::identity::InstanceId;

/// The engine side of the commit pipeline.
///
/// Pushes run on the async runtime, off the thread that owns the instances,
/// so a sink only ever sees plain encoded text.
#[async_trait]
pub trait EngineCommitSink: Send + Sync {
    /// Deliver one encoded component document.
    async fn push(&self, instance_id: &InstanceId, document: &str) -> Result<(), CommitError>;
}

/// A document accepted by a `MemoryCommitSink`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedDocument {
    pub instance_id: InstanceId,
    pub document: String,
    pub committed_at: DateTime<Utc>,
}

/// Records pushes in memory. Failures and latency can be injected.
#[derive(Debug, Default)]
pub struct MemoryCommitSink {
    pushes: Mutex<Vec<CommittedDocument>>,
    failures: Mutex<VecDeque<CommitError>>,
    latency: Duration,
}

impl MemoryCommitSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every push waits `latency` before completing.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Make the next push fail with `error`.
    pub async fn fail_next(&self, error: CommitError) {
        self.failures.lock().await.push_back(error);
    }

    pub async fn pushes(&self) -> Vec<CommittedDocument> {
        self.pushes.lock().await.clone()
    }

    pub async fn push_count(&self) -> usize {
        self.pushes.lock().await.len()
    }
}

#[async_trait]
impl EngineCommitSink for MemoryCommitSink {
    async fn push(&self, instance_id: &InstanceId, document: &str) -> Result<(), CommitError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(error) = self.failures.lock().await.pop_front() {
            return Err(error);
        }
        self.pushes.lock().await.push(CommittedDocument {
            instance_id: instance_id.clone(),
            document: document.to_string(),
            committed_at: Utc::now(),
        });
        Ok(())
    }
}

/// Writes each committed document to `<root>/<instanceId>.yaml`.
#[derive(Debug, Clone)]
pub struct DirectoryCommitSink {
    root: PathBuf,
}

impl DirectoryCommitSink {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, instance_id: &InstanceId) -> PathBuf {
        self.root.join(format!("{}.yaml", instance_id))
    }
}

/// The id must name a file directly inside the root.
fn is_plain_file_stem(id: &str) -> bool {
    !id.contains(|c: char| matches!(c, '/' | '\\')) && !id.contains("..")
}

#[async_trait]
impl EngineCommitSink for DirectoryCommitSink {
    async fn push(&self, instance_id: &InstanceId, document: &str) -> Result<(), CommitError> {
        if instance_id.is_empty() {
            return Err(CommitError::Rejected(
                "component has no instance id".to_string(),
            ));
        }
        if !is_plain_file_stem(instance_id.as_str()) {
            return Err(CommitError::Rejected(format!(
                "instance id {} is not a plain file name",
                instance_id
            )));
        }
        tokio::fs::create_dir_all(&self.root).await?;

        // Staged write: readers never see a partial document
        let path = self.path_for(instance_id);
        let staging = path.with_extension("yaml.tmp");
        tokio::fs::write(&staging, document).await?;
        tokio::fs::rename(&staging, &path).await?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}
