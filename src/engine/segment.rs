//! Segment encoder: one image plus one audio slice into one video file

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::domain::model::{EncodeProfile, PipelineSettings, ScaleMode};
use crate::engine::command::{format_seconds, FfmpegCommand};
use crate::engine::{check_produced, discard};
use crate::error::{FailureKind, StageFailure};
use crate::ports::{ExecutePort, Invocation};
use crate::workspace::RunContext;

/// Everything one encoder invocation needs
#[derive(Debug, Clone)]
pub struct SegmentRequest {
    pub label: String,
    pub image: PathBuf,
    pub audio: PathBuf,
    /// Offset into the audio, for chunked encoding
    pub start_offset: Option<f64>,
    /// Upper bound on the encoded duration
    pub length: Option<f64>,
    pub output: PathBuf,
    pub timeout: Duration,
    pub scale: ScaleMode,
    pub profile: EncodeProfile,
}

/// Video filter forcing even output dimensions
pub fn scale_filter(scale: ScaleMode) -> String {
    match scale {
        ScaleMode::EvenSource => "scale=trunc(iw/2)*2:trunc(ih/2)*2".to_string(),
        ScaleMode::Explicit { width, height } => format!("scale={}:{},setsar=1", width, height),
    }
}

/// Build the video assembly command for a request
pub fn assembly_invocation(settings: &PipelineSettings, request: &SegmentRequest) -> Invocation {
    let fps = settings.fps.to_string();
    let mut command = FfmpegCommand::new()
        .flag("-loop", "1")
        .flag("-framerate", fps.as_str())
        .input(&request.image);

    if let Some(start) = request.start_offset {
        command = command.flag("-ss", format_seconds(start));
    }
    if let Some(length) = request.length {
        command = command.flag("-t", format_seconds(length));
    }

    command = command
        .input(&request.audio)
        .flag("-map", "0:v:0")
        .flag("-map", "1:a:0")
        .flag("-c:v", settings.video_codec.as_str());

    command = match request.profile {
        EncodeProfile::Full => {
            let mut command = command.flag("-preset", settings.preset.as_str());
            if settings.video_codec == "libx264" {
                command = command.flag("-tune", "stillimage");
            }
            command
        }
        EncodeProfile::Minimal => command.flag("-preset", "ultrafast"),
    };

    command = command
        .flag("-vf", scale_filter(request.scale))
        .flag("-pix_fmt", settings.pixel_format.as_str())
        .flag("-r", fps.as_str());

    command = match request.profile {
        EncodeProfile::Full => command
            .flag("-c:a", settings.audio_codec.as_str())
            .flag("-b:a", settings.audio_bitrate.as_str())
            .flag("-ar", settings.sample_rate.to_string()),
        EncodeProfile::Minimal => command.flag("-c:a", "copy"),
    };

    command = command.arg("-shortest");
    if let Some(length) = request.length {
        command = command.flag("-t", format_seconds(length));
    }

    command
        .flag("-movflags", "+faststart")
        .into_invocation(request.label.clone(), &request.output)
}

/// Segment encoder
#[derive(Clone)]
pub struct SegmentEncoder {
    executor: Arc<dyn ExecutePort>,
}

impl SegmentEncoder {
    pub fn new(executor: Arc<dyn ExecutePort>) -> Self {
        Self { executor }
    }

    /// Encode one segment. Success means a zero exit code *and* a non-trivial output file.
    pub async fn encode_segment(
        &self,
        ctx: &RunContext,
        request: &SegmentRequest,
    ) -> Result<u64, StageFailure> {
        let settings = ctx.settings();
        let invocation = assembly_invocation(settings, request);
        debug!(
            label = %request.label,
            start = ?request.start_offset,
            length = ?request.length,
            "Encoding segment"
        );

        let started = Instant::now();
        let outcome = self.executor.run(&invocation, request.timeout).await;
        let result = check_produced(
            &outcome,
            &request.output,
            settings.min_output_bytes,
            FailureKind::SegmentEncodeFailed,
        )
        .await;

        match &result {
            Ok(bytes) => info!(
                label = %request.label,
                "Encoded in {:.2}s, {} bytes",
                started.elapsed().as_secs_f64(),
                bytes
            ),
            Err(_) => discard(&request.output).await,
        }
        result.map_err(|failure| {
            StageFailure::new(
                failure.kind,
                format!("{}: {}", request.label, failure.diagnostic),
            )
        })
    }
}
