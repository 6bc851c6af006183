//! Encoding strategy planning

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::{
    AudioChoice, EncodeAttempt, EncodeProfile, EncodingJob, EncodingStrategy, PipelineSettings,
    ProbedDuration, ScaleMode,
};
use crate::domain::rules;

/// Attempt names, in ladder order
pub const PRIMARY_ATTEMPT: &str = "primary";
pub const ORIGINAL_AUDIO_ATTEMPT: &str = "original-audio";
pub const MINIMAL_ATTEMPT: &str = "minimal";

/// Strategy planner for the encoding fallback ladder
pub struct StrategyPlanner;

impl StrategyPlanner {
    /// The ordered encoding attempts tried until one succeeds
    pub fn ladder(settings: &PipelineSettings) -> Vec<EncodeAttempt> {
        vec![
            EncodeAttempt {
                name: PRIMARY_ATTEMPT.to_string(),
                audio: AudioChoice::Enhanced,
                scale: ScaleMode::EvenSource,
                profile: EncodeProfile::Full,
            },
            EncodeAttempt {
                name: ORIGINAL_AUDIO_ATTEMPT.to_string(),
                audio: AudioChoice::Original,
                scale: rules::explicit_scale(settings.fallback_width, settings.fallback_height),
                profile: EncodeProfile::Full,
            },
            EncodeAttempt {
                name: MINIMAL_ATTEMPT.to_string(),
                audio: AudioChoice::Original,
                scale: ScaleMode::EvenSource,
                profile: EncodeProfile::Minimal,
            },
        ]
    }

    /// Strategy for one attempt. Minimal invocations never chunk.
    pub fn strategy_for(
        attempt: &EncodeAttempt,
        duration: ProbedDuration,
        settings: &PipelineSettings,
    ) -> EncodingStrategy {
        match attempt.profile {
            EncodeProfile::Minimal => EncodingStrategy::SingleShot,
            EncodeProfile::Full => rules::select_strategy(duration, settings.chunk_threshold_secs),
        }
    }

    /// Wall-clock budget of one encoder invocation under `strategy`
    pub fn time_budget(
        strategy: EncodingStrategy,
        duration: ProbedDuration,
        settings: &PipelineSettings,
    ) -> Duration {
        match strategy {
            EncodingStrategy::SingleShot => rules::encode_timeout(duration, settings),
            EncodingStrategy::Chunked => rules::encode_timeout(
                ProbedDuration::Known(settings.chunk_size_secs),
                settings,
            ),
        }
    }

    /// Build the job for one ladder rung
    pub fn plan_job(
        attempt: &EncodeAttempt,
        image: &Path,
        audio: &Path,
        output: &Path,
        duration: ProbedDuration,
        settings: &PipelineSettings,
    ) -> Result<EncodingJob, DomainError> {
        let strategy = Self::strategy_for(attempt, duration, settings);
        let budget = Self::time_budget(strategy, duration, settings);
        info!(
            "Attempt '{}': {} encoding, duration {}, budget {}s per invocation",
            attempt.name,
            strategy,
            duration,
            budget.as_secs()
        );
        debug!("Attempt settings: {:?}", attempt);

        EncodingJob::new(
            image.to_path_buf(),
            audio.to_path_buf(),
            output.to_path_buf(),
            budget,
            strategy,
            duration,
            attempt.clone(),
        )
    }
}
