//! Job execution: single-shot or chunked with bounded parallelism

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::domain::model::{EncodeProfile, EncodingJob, EncodingStrategy, Segment};
use crate::engine::concat::Concatenator;
use crate::engine::segment::{SegmentEncoder, SegmentRequest};
use crate::error::{FailureKind, StageFailure};
use crate::planner::chunks;
use crate::ports::ExecutePort;
use crate::workspace::RunContext;

/// What a successful job produced
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutput {
    pub bytes: u64,
    /// Segments joined into the output; 1 for single-shot
    pub segment_count: usize,
}

/// Runs an [`EncodingJob`] to exactly one output file
#[derive(Clone)]
pub struct ChunkedEncoder {
    segments: SegmentEncoder,
    concatenator: Concatenator,
}

impl ChunkedEncoder {
    pub fn new(executor: Arc<dyn ExecutePort>) -> Self {
        Self {
            segments: SegmentEncoder::new(executor.clone()),
            concatenator: Concatenator::new(executor),
        }
    }

    /// Encode `job` into its output path
    pub async fn encode_job(&self, ctx: &RunContext, job: &EncodingJob) -> Result<JobOutput, StageFailure> {
        match job.strategy() {
            EncodingStrategy::SingleShot => self.encode_single(ctx, job).await,
            EncodingStrategy::Chunked => self.encode_chunked(ctx, job).await,
        }
    }

    async fn encode_single(&self, ctx: &RunContext, job: &EncodingJob) -> Result<JobOutput, StageFailure> {
        let attempt = job.attempt();
        let length = match attempt.profile {
            EncodeProfile::Minimal => job.duration().seconds(),
            EncodeProfile::Full => None,
        };
        let request = SegmentRequest {
            label: attempt.name.clone(),
            image: job.source_image().to_path_buf(),
            audio: job.source_audio().to_path_buf(),
            start_offset: None,
            length,
            output: job.output_path().to_path_buf(),
            timeout: job.time_budget(),
            scale: attempt.scale,
            profile: attempt.profile,
        };
        let bytes = self.segments.encode_segment(ctx, &request).await?;
        Ok(JobOutput {
            bytes,
            segment_count: 1,
        })
    }

    async fn encode_chunked(&self, ctx: &RunContext, job: &EncodingJob) -> Result<JobOutput, StageFailure> {
        let settings = ctx.settings();
        let attempt = job.attempt();
        let total = job.duration().seconds().ok_or_else(|| {
            StageFailure::new(
                FailureKind::SegmentEncodeFailed,
                "chunked encoding without a known duration",
            )
        })?;

        let dir = ctx.segments_dir(&attempt.name).await.map_err(|e| {
            StageFailure::new(FailureKind::SegmentEncodeFailed, e.to_string())
        })?;
        let segments = chunks::plan_segments(total, settings.chunk_size_secs, &dir)
            .map_err(|e| StageFailure::new(FailureKind::SegmentEncodeFailed, e.to_string()))?;

        info!(
            "Encoding {:.1}s in {} segments of {:.0}s with {} workers",
            total,
            segments.len(),
            settings.chunk_size_secs,
            settings.workers
        );
        let started = Instant::now();
        self.encode_segments(ctx, job, &segments).await?;
        info!(
            "All {} segments encoded in {:.2}s",
            segments.len(),
            started.elapsed().as_secs_f64()
        );

        let bytes = self
            .concatenator
            .concatenate(ctx, &segments, job.output_path())
            .await?;
        Ok(JobOutput {
            bytes,
            segment_count: segments.len(),
        })
    }

    /// Encode every segment, at most `workers` at a time. The first failure
    /// aborts the segments still queued or running.
    async fn encode_segments(
        &self,
        ctx: &RunContext,
        job: &EncodingJob,
        segments: &[Segment],
    ) -> Result<(), StageFailure> {
        let attempt = job.attempt();
        let semaphore = Arc::new(Semaphore::new(ctx.settings().workers.max(1)));
        let mut tasks = JoinSet::new();

        for segment in segments {
            let request = SegmentRequest {
                label: format!("{}-segment-{:04}", attempt.name, segment.index),
                image: job.source_image().to_path_buf(),
                audio: job.source_audio().to_path_buf(),
                start_offset: Some(segment.start_offset),
                length: Some(segment.length),
                output: segment.output_path.clone(),
                timeout: job.time_budget(),
                scale: attempt.scale,
                profile: attempt.profile,
            };
            let encoder = self.segments.clone();
            let ctx = ctx.clone();
            let semaphore = semaphore.clone();
            let index = segment.index;

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| {
                    StageFailure::new(FailureKind::SegmentEncodeFailed, e.to_string())
                })?;
                encoder.encode_segment(&ctx, &request).await.map(|_| index)
            });
        }

        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(index)) => debug!("Segment {} done", index),
                Ok(Err(stage_failure)) => {
                    failure = Some(stage_failure);
                    break;
                }
                Err(e) => {
                    failure = Some(StageFailure::new(
                        FailureKind::SegmentEncodeFailed,
                        format!("segment task failed: {}", e),
                    ));
                    break;
                }
            }
        }

        match failure {
            Some(failure) => {
                warn!("Segment failed, cancelling the rest: {}", failure);
                tasks.abort_all();
                while tasks.join_next().await.is_some() {}
                Err(failure)
            }
            None => Ok(()),
        }
    }
}
