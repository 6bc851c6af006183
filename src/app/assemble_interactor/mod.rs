// Assemble interactor - Orchestrates the still image + audio to video use case

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};

use crate::domain::model::{
    AudioChoice, EncodingStrategy, MediaInput, MediaKind, PipelineSettings, ProbedDuration,
};
use crate::engine::{discard, AudioEnhancer, ChunkedEncoder, EnhancedAudio, EnhancementLevel};
use crate::error::{
    AttemptRecord, FailureKind, PipelineFailure, PipelineStage, StageFailure, StillcastResult,
};
use crate::output::{OutputVerifier, OutputWriter, OverwritePolicy, VerificationResult};
use crate::planner::StrategyPlanner;
use crate::ports::{ExecutePort, ProbePort};
use crate::workspace::{CleanupReport, RunContext, Workspace};

/// One assembly request
#[derive(Debug, Clone)]
pub struct AssemblyRequest {
    pub image: MediaInput,
    pub audio: MediaInput,
    pub output_path: PathBuf,
    pub overwrite: OverwritePolicy,
}

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Init,
    Enhancing,
    Encoding,
    Done,
    Failed,
}

impl PipelineState {
    /// Forward-only transitions; any non-terminal state may fail
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Init, Enhancing) | (Enhancing, Encoding) | (Encoding, Done) | (Init | Enhancing | Encoding, Failed)
        )
    }
}

/// States a run went through, in order
#[derive(Debug, Clone)]
struct StateTrail {
    states: Vec<PipelineState>,
}

impl StateTrail {
    fn new() -> Self {
        Self {
            states: vec![PipelineState::Init],
        }
    }

    fn current(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Init)
    }

    fn advance(&mut self, next: PipelineState) {
        let current = self.current();
        if !current.can_transition_to(next) {
            warn!("Ignoring invalid state transition {:?} -> {:?}", current, next);
            return;
        }
        info!("State: {:?} -> {:?}", current, next);
        self.states.push(next);
    }
}

/// Report of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct AssemblyReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub output_path: PathBuf,
    pub output_bytes: u64,
    pub enhancement: EnhancementLevel,
    pub degradations: Vec<StageFailure>,
    /// Ladder rung that produced the output
    pub attempt: String,
    pub strategy: EncodingStrategy,
    pub segment_count: usize,
    pub duration: ProbedDuration,
    pub elapsed_secs: f64,
    pub attempts: Vec<AttemptRecord>,
    pub states: Vec<PipelineState>,
    pub verification: Option<VerificationResult>,
    pub cleanup: CleanupReport,
}

/// Everything `drive` learned on the way to a published output
struct RunOutcome {
    output_bytes: u64,
    enhanced: EnhancedAudio,
    attempt: String,
    strategy: EncodingStrategy,
    segment_count: usize,
    duration: ProbedDuration,
    attempts: Vec<AttemptRecord>,
    verification: Option<VerificationResult>,
}

/// Interactor for the assembly use case
pub struct AssembleInteractor {
    settings: Arc<PipelineSettings>,
    probe_port: Arc<dyn ProbePort>,
    enhancer: AudioEnhancer,
    encoder: ChunkedEncoder,
    verifier: OutputVerifier,
}

impl AssembleInteractor {
    /// Create new assemble interactor with injected ports
    pub fn new(
        settings: Arc<PipelineSettings>,
        execute_port: Arc<dyn ExecutePort>,
        probe_port: Arc<dyn ProbePort>,
    ) -> Self {
        Self {
            settings,
            enhancer: AudioEnhancer::new(Arc::clone(&execute_port)),
            encoder: ChunkedEncoder::new(execute_port),
            verifier: OutputVerifier::new(Arc::clone(&probe_port)),
            probe_port,
        }
    }

    /// Run the whole pipeline. The workspace is removed whatever the outcome.
    pub async fn execute(&self, request: AssemblyRequest) -> StillcastResult<AssemblyReport> {
        self.settings.validate()?;
        OutputWriter::check_overwrite_policy(&request.output_path, request.overwrite)?;

        let started_at = Utc::now();
        let started = Instant::now();
        let workspace = Workspace::open(self.settings.workspace_root.clone())
            .await
            .map_err(|e| e.at_stage(PipelineStage::Init, None))?;
        let ctx = RunContext::new(&workspace, Arc::clone(&self.settings));
        let span = info_span!("run", run_id = %ctx.run_id());

        info!(
            parent: &span,
            "Assembling {} + {} -> {}",
            request.image.describe(),
            request.audio.describe(),
            request.output_path.display()
        );

        let mut trail = StateTrail::new();
        let result = self
            .drive(&workspace, &ctx, &request, &mut trail)
            .instrument(span.clone())
            .await;
        let cleanup = workspace.close().instrument(span.clone()).await;

        let _guard = span.enter();
        match result {
            Ok(outcome) => {
                trail.advance(PipelineState::Done);
                let elapsed_secs = started.elapsed().as_secs_f64();
                info!(
                    "Done in {:.2}s via '{}' ({}, {} segment(s), {} audio)",
                    elapsed_secs,
                    outcome.attempt,
                    outcome.strategy,
                    outcome.segment_count,
                    outcome.enhanced.level
                );
                Ok(AssemblyReport {
                    run_id: ctx.run_id().to_string(),
                    started_at,
                    output_path: request.output_path,
                    output_bytes: outcome.output_bytes,
                    enhancement: outcome.enhanced.level,
                    degradations: outcome.enhanced.degradations,
                    attempt: outcome.attempt,
                    strategy: outcome.strategy,
                    segment_count: outcome.segment_count,
                    duration: outcome.duration,
                    elapsed_secs,
                    attempts: outcome.attempts,
                    states: trail.states,
                    verification: outcome.verification,
                    cleanup,
                })
            }
            Err(e) => {
                trail.advance(PipelineState::Failed);
                error!(
                    states = ?trail.states,
                    "Failed after {:.2}s: {}",
                    started.elapsed().as_secs_f64(),
                    e
                );
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        workspace: &Workspace,
        ctx: &RunContext,
        request: &AssemblyRequest,
        trail: &mut StateTrail,
    ) -> StillcastResult<RunOutcome> {
        let settings = ctx.settings();

        let image = workspace
            .import(MediaKind::Image, &request.image)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Init, None))?;
        let audio = workspace
            .import(MediaKind::Audio, &request.audio)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Init, None))?;

        trail.advance(PipelineState::Enhancing);
        let enhanced = self.enhancer.enhance(ctx, &audio.path).await;

        trail.advance(PipelineState::Encoding);
        let mut probed: Vec<(AudioChoice, ProbedDuration)> = Vec::new();
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut produced = None;

        for attempt in StrategyPlanner::ladder(settings) {
            let audio_path = match attempt.audio {
                AudioChoice::Enhanced => enhanced.path.as_path(),
                AudioChoice::Original => audio.path.as_path(),
            };
            let duration = match probed.iter().find(|(choice, _)| *choice == attempt.audio) {
                Some((_, duration)) => *duration,
                None => {
                    let duration = self.probe_port.probe_duration(audio_path).await;
                    probed.push((attempt.audio, duration));
                    duration
                }
            };

            let attempt_output = ctx.path(&format!("output_{}.mp4", attempt.name));
            let attempt_started = Instant::now();
            let planned = StrategyPlanner::plan_job(
                &attempt,
                &image.path,
                audio_path,
                &attempt_output,
                duration,
                settings,
            );
            let strategy = StrategyPlanner::strategy_for(&attempt, duration, settings);

            let result = match planned {
                Ok(job) => self.encoder.encode_job(ctx, &job).await,
                Err(e) => Err(StageFailure::new(FailureKind::SegmentEncodeFailed, e.to_string())),
            };
            let elapsed_secs = attempt_started.elapsed().as_secs_f64();

            match result {
                Ok(output) => {
                    attempts.push(AttemptRecord {
                        attempt: attempt.name.clone(),
                        strategy: strategy.to_string(),
                        outcome: Ok(()),
                        elapsed_secs,
                    });
                    produced = Some((attempt.name, strategy, duration, attempt_output, output));
                    break;
                }
                Err(failure) => {
                    warn!(
                        kind = %failure.kind,
                        "Attempt '{}' failed after {:.2}s: {}",
                        attempt.name,
                        elapsed_secs,
                        failure.diagnostic
                    );
                    discard(&attempt_output).await;
                    attempts.push(AttemptRecord {
                        attempt: attempt.name,
                        strategy: strategy.to_string(),
                        outcome: Err(failure),
                        elapsed_secs,
                    });
                }
            }
        }

        let (attempt, strategy, duration, attempt_output, output) = match produced {
            Some(produced) => produced,
            None => return Err(Self::exhausted(attempts).into()),
        };

        info!("Encoded {} bytes, publishing", output.bytes);
        let output_bytes =
            OutputWriter::publish(&attempt_output, &request.output_path, request.overwrite)
                .await
                .map_err(|e| e.at_stage(PipelineStage::Publishing, Some(attempt.clone())))?;

        let verification = if settings.verify_output {
            Some(
                self.verifier
                    .verify(
                        &request.output_path,
                        duration,
                        output.segment_count,
                        settings.duration_tolerance_secs,
                    )
                    .await,
            )
        } else {
            None
        };

        Ok(RunOutcome {
            output_bytes,
            enhanced,
            attempt,
            strategy,
            segment_count: output.segment_count,
            duration,
            attempts,
            verification,
        })
    }

    /// Terminal failure once every ladder rung has failed
    fn exhausted(attempts: Vec<AttemptRecord>) -> PipelineFailure {
        let last = attempts.last().and_then(|record| {
            record
                .outcome
                .as_ref()
                .err()
                .map(|failure| (record.attempt.clone(), failure.clone()))
        });
        let (attempt, failure) = match last {
            Some((attempt, failure)) => (Some(attempt), failure),
            None => (
                None,
                StageFailure::new(FailureKind::SegmentEncodeFailed, "no encode attempt was made"),
            ),
        };
        PipelineFailure {
            stage: PipelineStage::Encoding,
            attempt,
            kind: failure.kind,
            diagnostic: failure.diagnostic,
            attempts,
        }
    }
}

/// Convenience for callers holding plain paths
impl AssemblyRequest {
    pub fn from_paths(image: &Path, audio: &Path, output: &Path, overwrite: OverwritePolicy) -> Self {
        Self {
            image: MediaInput::File(image.to_path_buf()),
            audio: MediaInput::File(audio.to_path_buf()),
            output_path: output.to_path_buf(),
            overwrite,
        }
    }
}
