//! FFmpeg execution adapter
//!
//! Runs ffmpeg/ffprobe as child processes under a wall-clock timeout. A
//! timed-out child is killed when its future is dropped (`kill_on_drop`).

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::model::PipelineSettings;
use crate::ports::*;

/// Subprocess-based execution adapter
#[derive(Debug, Clone)]
pub struct FFmpegAdapter {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
}

impl FFmpegAdapter {
    /// Create adapter with explicit binary paths
    pub fn new(ffmpeg_path: impl Into<PathBuf>, ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Create adapter from pipeline settings
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::new(&settings.ffmpeg_path, &settings.ffprobe_path)
    }

    fn program(&self, tool: Tool) -> &PathBuf {
        match tool {
            Tool::Ffmpeg => &self.ffmpeg_path,
            Tool::Ffprobe => &self.ffprobe_path,
        }
    }
}

#[async_trait]
impl ExecutePort for FFmpegAdapter {
    async fn run(&self, invocation: &Invocation, timeout: Duration) -> ProcessOutcome {
        let program = self.program(invocation.tool);
        debug!(
            label = %invocation.label,
            timeout_secs = timeout.as_secs_f64(),
            "{} {}",
            program.display(),
            invocation.display_args()
        );

        let child = Command::new(program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!(label = %invocation.label, "Failed to start {}: {}", program.display(), e);
                return ProcessOutcome::SpawnFailed {
                    message: format!("{}: {}", program.display(), e),
                };
            }
        };

        let started = Instant::now();
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                debug!(
                    label = %invocation.label,
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    status = %output.status,
                    "Process finished"
                );
                if output.status.success() {
                    ProcessOutcome::Success { stdout, stderr }
                } else {
                    ProcessOutcome::Failed {
                        code: output.status.code(),
                        stderr,
                    }
                }
            }
            Ok(Err(e)) => ProcessOutcome::Failed {
                code: None,
                stderr: format!("failed to collect process output: {}", e),
            },
            Err(_) => {
                warn!(
                    label = %invocation.label,
                    "Process exceeded {:.1}s timeout, killing it",
                    timeout.as_secs_f64()
                );
                ProcessOutcome::TimedOut { after: timeout }
            }
        }
    }
}
