//! Run-scoped transient storage
//!
//! Every intermediate file of one orchestrator run lives in its own
//! directory. The directory is removed when the run ends, entry by entry,
//! so a single stubborn file does not keep the rest on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::model::{MediaAsset, MediaInput, MediaKind, PipelineSettings};
use crate::error::{FailureKind, StillcastError, StillcastResult};

const WORKSPACE_PREFIX: &str = "stillcast-";
const SEGMENTS_DIR: &str = "segments";

/// Summary of a workspace removal
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupReport {
    /// Entries removed, files and directories
    pub removed: usize,
    /// Entries that could not be removed
    pub failures: Vec<String>,
}

impl CleanupReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Exclusive transient directory of one run
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a fresh, uniquely named workspace under `root` (system temp dir when `None`)
    pub fn create(root: Option<&Path>) -> StillcastResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(|e| StillcastError::WorkspaceError {
                    message: format!("cannot create workspace root {}: {}", root.display(), e),
                })?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| StillcastError::WorkspaceError {
            message: format!("cannot create workspace: {}", e),
        })?;

        let path = dir.path().to_path_buf();
        debug!("Created workspace {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// [`Workspace::create`] on the blocking pool
    pub async fn open(root: Option<PathBuf>) -> StillcastResult<Self> {
        tokio::task::spawn_blocking(move || Self::create(root.as_deref()))
            .await
            .map_err(|e| StillcastError::WorkspaceError {
                message: format!("workspace creation task failed: {}", e),
            })?
    }

    /// [`Workspace::cleanup`] on the blocking pool, inside the caller's span
    pub async fn close(self) -> CleanupReport {
        let span = tracing::Span::current();
        let path = self.path.clone();
        match tokio::task::spawn_blocking(move || span.in_scope(|| self.cleanup())).await {
            Ok(report) => report,
            Err(e) => {
                warn!(
                    kind = %FailureKind::WorkspaceCleanupPartial,
                    "Cleanup task for {} failed: {}",
                    path.display(),
                    e
                );
                CleanupReport {
                    removed: 0,
                    failures: vec![format!("{}: {}", path.display(), e)],
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unique identifier of the run owning this workspace
    pub fn run_id(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().trim_start_matches(WORKSPACE_PREFIX).to_string())
            .unwrap_or_default()
    }

    /// Path of a named file inside the workspace
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Copy or write caller-supplied media into the workspace
    pub async fn import(&self, kind: MediaKind, input: &MediaInput) -> StillcastResult<MediaAsset> {
        let name = match input.extension() {
            Some(ext) => format!("{}_source.{}", kind.file_stem(), ext),
            None => format!("{}_source", kind.file_stem()),
        };
        let path = self.file(&name);

        match input {
            MediaInput::File(source) => {
                if !source.is_file() {
                    return Err(StillcastError::InputFileNotFound {
                        path: source.display().to_string(),
                    });
                }
                tokio::fs::copy(source, &path).await?;
            }
            MediaInput::Bytes { data, .. } => {
                tokio::fs::write(&path, data).await?;
            }
        }

        debug!("Imported {:?} {} as {}", kind, input.describe(), path.display());
        Ok(MediaAsset { kind, path })
    }

    /// Remove every entry, then the directory itself. Failures are logged, never raised.
    pub fn cleanup(mut self) -> CleanupReport {
        let mut report = CleanupReport::default();

        for entry in WalkDir::new(&self.path).min_depth(1).contents_first(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(kind = %FailureKind::WorkspaceCleanupPartial, "Cannot walk workspace: {}", e);
                    report.failures.push(e.to_string());
                    continue;
                }
            };
            let result = if entry.file_type().is_dir() {
                std::fs::remove_dir(entry.path())
            } else {
                std::fs::remove_file(entry.path())
            };
            match result {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    warn!(
                        kind = %FailureKind::WorkspaceCleanupPartial,
                        "Cannot remove {}: {}",
                        entry.path().display(),
                        e
                    );
                    report.failures.push(format!("{}: {}", entry.path().display(), e));
                }
            }
        }

        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                warn!(
                    kind = %FailureKind::WorkspaceCleanupPartial,
                    "Cannot remove workspace {}: {}",
                    self.path.display(),
                    e
                );
                report.failures.push(format!("{}: {}", self.path.display(), e));
            }
        }

        debug!(
            "Workspace {} cleaned: {} entries removed, {} failures",
            self.path.display(),
            report.removed,
            report.failures.len()
        );
        report
    }
}

/// Run-scoped context handed to every component call
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: String,
    workspace_dir: PathBuf,
    settings: Arc<PipelineSettings>,
}

impl RunContext {
    pub fn new(workspace: &Workspace, settings: Arc<PipelineSettings>) -> Self {
        Self {
            run_id: workspace.run_id(),
            workspace_dir: workspace.path().to_path_buf(),
            settings,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    /// Path of a named file in the run's workspace
    pub fn path(&self, name: &str) -> PathBuf {
        self.workspace_dir.join(name)
    }

    /// Directory for the segments of one encode attempt, created on demand
    pub async fn segments_dir(&self, attempt: &str) -> StillcastResult<PathBuf> {
        let dir = self.workspace_dir.join(SEGMENTS_DIR).join(attempt);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }
}
