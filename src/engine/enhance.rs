//! Audio enhancement stage
//!
//! Ordered fallback: advanced filter chain, then a single dynamic
//! normalisation filter, then a byte copy. The stage always yields a usable
//! audio file and never touches its input.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::engine::command::FfmpegCommand;
use crate::engine::{check_produced, discard};
use crate::error::{FailureKind, StageFailure};
use crate::ports::ExecutePort;
use crate::workspace::RunContext;

/// Quality level the enhancement stage reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementLevel {
    /// Gain, high-pass and loudness normalisation
    Advanced,
    /// Dynamic normalisation only
    Basic,
    /// Unmodified copy of the input
    PassThrough,
}

impl EnhancementLevel {
    fn as_str(&self) -> &'static str {
        match self {
            EnhancementLevel::Advanced => "advanced",
            EnhancementLevel::Basic => "basic",
            EnhancementLevel::PassThrough => "pass-through",
        }
    }
}

impl std::fmt::Display for EnhancementLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the enhancement stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedAudio {
    pub path: PathBuf,
    pub level: EnhancementLevel,
    /// Failures of the stages that were skipped over
    pub degradations: Vec<StageFailure>,
}

/// Audio enhancement stage
#[derive(Clone)]
pub struct AudioEnhancer {
    executor: Arc<dyn ExecutePort>,
}

impl AudioEnhancer {
    pub fn new(executor: Arc<dyn ExecutePort>) -> Self {
        Self { executor }
    }

    /// Enhance `input`, writing exactly one new file into the workspace
    pub async fn enhance(&self, ctx: &RunContext, input: &Path) -> EnhancedAudio {
        let settings = ctx.settings();
        let filters = [
            (EnhancementLevel::Advanced, settings.advanced_audio_filter.as_str()),
            (EnhancementLevel::Basic, settings.basic_audio_filter.as_str()),
        ];
        let mut degradations = Vec::new();

        for (level, filter) in filters {
            let output = ctx.path(&format!("enhanced_{}.wav", level.as_str()));
            let started = Instant::now();
            match self.apply_filter(ctx, level, filter, input, &output).await {
                Ok(bytes) => {
                    info!(
                        "Audio enhanced ({}) in {:.2}s, {} bytes",
                        level,
                        started.elapsed().as_secs_f64(),
                        bytes
                    );
                    return EnhancedAudio {
                        path: output,
                        level,
                        degradations,
                    };
                }
                Err(failure) => {
                    discard(&output).await;
                    warn!(
                        kind = %FailureKind::EnhancementDegraded,
                        "{} enhancement failed ({}), falling back",
                        level,
                        failure
                    );
                    degradations.push(StageFailure::new(
                        FailureKind::EnhancementDegraded,
                        format!("{}: {}", level, failure),
                    ));
                }
            }
        }

        let path = self.pass_through(ctx, input).await;
        EnhancedAudio {
            path,
            level: EnhancementLevel::PassThrough,
            degradations,
        }
    }

    async fn apply_filter(
        &self,
        ctx: &RunContext,
        level: EnhancementLevel,
        filter: &str,
        input: &Path,
        output: &Path,
    ) -> Result<u64, StageFailure> {
        let settings = ctx.settings();
        let invocation = FfmpegCommand::new()
            .input(input)
            .arg("-vn")
            .flag("-af", filter)
            .flag("-ar", settings.sample_rate.to_string())
            .flag("-ac", settings.channels.to_string())
            .flag("-c:a", "pcm_s16le")
            .into_invocation(format!("enhance-{}", level.as_str()), output);

        let outcome = self.executor.run(&invocation, settings.enhance_timeout()).await;
        check_produced(
            &outcome,
            output,
            settings.min_output_bytes,
            FailureKind::EnhancementDegraded,
        )
        .await
    }

    /// Terminal stage: copy the input unchanged. If even the copy fails the
    /// imported input itself is used, so the stage cannot fail the run.
    async fn pass_through(&self, ctx: &RunContext, input: &Path) -> PathBuf {
        let name = match input.extension() {
            Some(ext) => format!("enhanced_passthrough.{}", ext.to_string_lossy()),
            None => "enhanced_passthrough".to_string(),
        };
        let output = ctx.path(&name);

        match tokio::fs::copy(input, &output).await {
            Ok(_) => {
                info!("Audio passed through unmodified");
                output
            }
            Err(e) => {
                discard(&output).await;
                warn!(
                    kind = %FailureKind::EnhancementDegraded,
                    "Pass-through copy failed ({}), using imported audio directly",
                    e
                );
                input.to_path_buf()
            }
        }
    }
}
