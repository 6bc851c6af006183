//! Output file writer

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{StillcastError, StillcastResult};
use crate::output::OverwritePolicy;

/// Moves finished files from the workspace to their final location
pub struct OutputWriter;

impl OutputWriter {
    /// Refuse early when the policy forbids replacing an existing output
    pub fn check_overwrite_policy(dest: &Path, policy: OverwritePolicy) -> StillcastResult<()> {
        if policy == OverwritePolicy::Never && dest.exists() {
            return Err(StillcastError::OutputExists {
                path: dest.display().to_string(),
            });
        }
        Ok(())
    }

    /// Hidden sibling the output is staged into before the final rename
    pub fn staging_path(dest: &Path) -> PathBuf {
        let name = dest
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        dest.with_file_name(format!(".{}.partial", name))
    }

    /// Publish `source` at `dest`. A reader of `dest` sees either the old file or
    /// the complete new one, never a partial write.
    pub async fn publish(source: &Path, dest: &Path, policy: OverwritePolicy) -> StillcastResult<u64> {
        Self::check_overwrite_policy(dest, policy)?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StillcastError::OutputError {
                    message: format!("cannot create {}: {}", parent.display(), e),
                })?;
        }

        let staging = Self::staging_path(dest);
        if tokio::fs::rename(source, &staging).await.is_err() {
            debug!("Rename across filesystems failed, copying {}", source.display());
            if let Err(e) = tokio::fs::copy(source, &staging).await {
                let _ = tokio::fs::remove_file(&staging).await;
                return Err(StillcastError::OutputError {
                    message: format!("cannot stage {}: {}", staging.display(), e),
                });
            }
        }

        if let Err(e) = tokio::fs::rename(&staging, dest).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(StillcastError::OutputError {
                message: format!("cannot move output into place at {}: {}", dest.display(), e),
            });
        }

        let size = tokio::fs::metadata(dest).await?.len();
        info!("Output written: {} ({} bytes)", dest.display(), size);
        Ok(size)
    }
}
