//! Core encoding engine module

use std::path::Path;

use crate::error::{FailureKind, StageFailure};
use crate::ports::ProcessOutcome;

pub mod chunked;
pub mod command;
pub mod concat;
pub mod enhance;
pub mod segment;

pub use chunked::{ChunkedEncoder, JobOutput};
pub use concat::Concatenator;
pub use enhance::{AudioEnhancer, EnhancedAudio, EnhancementLevel};
pub use segment::{SegmentEncoder, SegmentRequest};

/// Size of a produced file if it exists and reaches `min_bytes`
pub async fn validate_output(path: &Path, min_bytes: u64) -> Result<u64, String> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if !meta.is_file() => Err(format!("{} is not a regular file", path.display())),
        Ok(meta) if meta.len() == 0 || meta.len() < min_bytes => Err(format!(
            "{} is {} bytes, below the {} byte minimum",
            path.display(),
            meta.len(),
            min_bytes.max(1)
        )),
        Ok(meta) => Ok(meta.len()),
        Err(e) => Err(format!("{} was not produced: {}", path.display(), e)),
    }
}

/// Check a process outcome and its produced file together.
///
/// A zero exit code with a missing or undersized file is a failure of `kind`.
pub async fn check_produced(
    outcome: &ProcessOutcome,
    output: &Path,
    min_bytes: u64,
    kind: FailureKind,
) -> Result<u64, StageFailure> {
    match outcome {
        ProcessOutcome::Success { .. } => validate_output(output, min_bytes)
            .await
            .map_err(|reason| StageFailure::new(kind, reason)),
        ProcessOutcome::TimedOut { .. } => {
            Err(StageFailure::new(FailureKind::Timeout, outcome.diagnostic()))
        }
        _ => Err(StageFailure::new(kind, outcome.diagnostic())),
    }
}

/// Remove a partial output; a missing file is fine
pub async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Cannot remove partial output {}: {}", path.display(), e);
        }
    }
}
