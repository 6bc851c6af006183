//! FFprobe adapter for media duration probing
//!
//! Fails soft: any non-zero exit, timeout or unparsable output yields
//! `ProbedDuration::Unknown`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::model::ProbedDuration;
use crate::error::FailureKind;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    executor: Arc<dyn ExecutePort>,
    timeout: Duration,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter running through the given executor
    pub fn new(executor: Arc<dyn ExecutePort>, timeout: Duration) -> Self {
        Self { executor, timeout }
    }

    /// Invocation printing the first audio stream's duration as a bare number
    pub fn duration_invocation(path: &Path) -> Invocation {
        Invocation {
            tool: Tool::Ffprobe,
            label: "probe-duration".to_string(),
            args: vec![
                "-v".into(),
                "error".into(),
                "-select_streams".into(),
                "a:0".into(),
                "-show_entries".into(),
                "stream=duration".into(),
                "-of".into(),
                "default=noprint_wrappers=1:nokey=1".into(),
                path.as_os_str().to_owned(),
            ],
            output: None,
        }
    }
}

/// Parse the probe's standard output: exactly one finite, non-negative number
pub fn parse_duration_output(stdout: &str) -> ProbedDuration {
    let mut lines = stdout.lines().map(str::trim).filter(|line| !line.is_empty());
    match (lines.next(), lines.next()) {
        (Some(value), None) => value
            .parse::<f64>()
            .map(ProbedDuration::from_seconds)
            .unwrap_or(ProbedDuration::Unknown),
        _ => ProbedDuration::Unknown,
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_duration(&self, path: &Path) -> ProbedDuration {
        let invocation = Self::duration_invocation(path);
        let outcome = self.executor.run(&invocation, self.timeout).await;

        let duration = match &outcome {
            ProcessOutcome::Success { stdout, .. } => parse_duration_output(stdout),
            _ => ProbedDuration::Unknown,
        };

        match duration {
            ProbedDuration::Known(seconds) => {
                debug!("Probed {}: {:.3}s", path.display(), seconds);
            }
            ProbedDuration::Unknown => {
                warn!(
                    kind = %FailureKind::ProbeUnavailable,
                    "Duration of {} is unknown ({})",
                    path.display(),
                    outcome.diagnostic()
                );
            }
        }
        duration
    }
}
