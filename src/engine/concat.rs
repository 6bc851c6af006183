//! Stream-copy concatenation of encoded segments

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::model::Segment;
use crate::engine::command::FfmpegCommand;
use crate::engine::{check_produced, discard, validate_output};
use crate::error::{FailureKind, StageFailure};
use crate::ports::{ExecutePort, Invocation};
use crate::workspace::RunContext;

const LIST_FILE: &str = "concat_list.txt";

/// Quote a path for the concat demuxer list format
pub fn quote_entry(path: &str) -> String {
    format!("file '{}'", path.replace('\'', "'\\''"))
}

/// Body of a concat list, one entry per segment in the given order.
///
/// Entries are file names relative to the list, which lives next to the segments.
pub fn list_contents(segments: &[Segment]) -> String {
    let mut body = String::new();
    for segment in segments {
        let name = segment
            .output_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| segment.output_path.to_string_lossy().into_owned());
        body.push_str(&quote_entry(&name));
        body.push('\n');
    }
    body
}

/// Concat demuxer invocation copying streams without re-encoding
pub fn concat_invocation(list: &Path, output: &Path) -> Invocation {
    FfmpegCommand::new()
        .flag("-f", "concat")
        .flag("-safe", "0")
        .input(list)
        .flag("-c", "copy")
        .flag("-movflags", "+faststart")
        .into_invocation("concat", output)
}

/// Joins encoded segments into one file
#[derive(Clone)]
pub struct Concatenator {
    executor: Arc<dyn ExecutePort>,
}

impl Concatenator {
    pub fn new(executor: Arc<dyn ExecutePort>) -> Self {
        Self { executor }
    }

    /// Join `segments` in index order into `output`
    pub async fn concatenate(
        &self,
        ctx: &RunContext,
        segments: &[Segment],
        output: &Path,
    ) -> Result<u64, StageFailure> {
        let settings = ctx.settings();
        let mut ordered: Vec<Segment> = segments.to_vec();
        ordered.sort_by_key(|segment| segment.index);

        let first = match ordered.first() {
            Some(first) => first.clone(),
            None => {
                return Err(StageFailure::new(
                    FailureKind::ConcatenationFailed,
                    "no segments to concatenate",
                ))
            }
        };

        if ordered.len() == 1 {
            debug!("Single segment, moving it into place");
            return self.adopt(&first.output_path, output, settings.min_output_bytes).await;
        }

        let list_dir = first
            .output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| ctx.workspace_dir().to_path_buf());
        let list = list_dir.join(LIST_FILE);
        tokio::fs::write(&list, list_contents(&ordered))
            .await
            .map_err(|e| {
                StageFailure::new(
                    FailureKind::ConcatenationFailed,
                    format!("cannot write concat list {}: {}", list.display(), e),
                )
            })?;

        let invocation = concat_invocation(&list, output);
        let outcome = self.executor.run(&invocation, settings.concat_timeout()).await;
        let result = check_produced(
            &outcome,
            output,
            settings.min_output_bytes,
            FailureKind::ConcatenationFailed,
        )
        .await;

        match &result {
            Ok(bytes) => info!("Concatenated {} segments, {} bytes", ordered.len(), bytes),
            Err(_) => discard(output).await,
        }
        result
    }

    async fn adopt(&self, source: &Path, output: &Path, min_bytes: u64) -> Result<u64, StageFailure> {
        let to_failure = |reason: String| StageFailure::new(FailureKind::ConcatenationFailed, reason);

        if tokio::fs::rename(source, output).await.is_err() {
            tokio::fs::copy(source, output).await.map_err(|e| {
                to_failure(format!(
                    "cannot move {} to {}: {}",
                    source.display(),
                    output.display(),
                    e
                ))
            })?;
        }
        validate_output(output, min_bytes).await.map_err(to_failure)
    }
}
