// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Time specification with precision - represents time in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Parse time string in various formats
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        // Plain seconds
        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(DomainError::BadArgs(format!(
                    "Time must be a non-negative number: {}",
                    trimmed
                )));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        let (hours, minutes, seconds_part) = match parts.as_slice() {
            [m, s] => (0u32, parse_component(m, "minutes")?, *s),
            [h, m, s] => {
                let minutes = parse_component(m, "minutes")?;
                if minutes >= 60 {
                    return Err(DomainError::BadArgs("Minutes must be less than 60".to_string()));
                }
                (parse_component(h, "hours")?, minutes, *s)
            }
            _ => {
                return Err(DomainError::BadArgs(
                    "Invalid time format. Supported formats: seconds (e.g., 600), MM:SS.ms (e.g., 10:00), HH:MM:SS.ms (e.g., 1:00:00)".to_string(),
                ))
            }
        };

        let seconds = seconds_part
            .parse::<f64>()
            .map_err(|_| DomainError::BadArgs("Invalid seconds format".to_string()))?;
        if !(0.0..60.0).contains(&seconds) {
            return Err(DomainError::BadArgs("Seconds must be less than 60".to_string()));
        }

        Ok(Self::from_seconds(
            hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
        ))
    }

    /// Format as HH:MM:SS.ms
    pub fn format_hms(&self) -> String {
        let total_millis = (self.seconds.max(0.0) * 1000.0).round() as u64;
        let hours = total_millis / 3_600_000;
        let minutes = (total_millis % 3_600_000) / 60_000;
        let seconds = (total_millis % 60_000) / 1000;
        let millis = total_millis % 1000;

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, seconds, millis)
        }
    }
}

fn parse_component(value: &str, name: &str) -> Result<u32, DomainError> {
    value
        .parse::<u32>()
        .map_err(|_| DomainError::BadArgs(format!("Invalid {} format", name)))
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// Kind tag of a media asset held in the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    /// Stem used for files of this kind inside a workspace
    pub fn file_stem(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

/// Caller-supplied media source
#[derive(Debug, Clone)]
pub enum MediaInput {
    /// Existing file on disk; copied into the workspace, never modified
    File(PathBuf),
    /// In-memory bytes, e.g. from an upload
    Bytes { file_name: String, data: Vec<u8> },
}

impl MediaInput {
    /// Extension hint used when naming the workspace copy
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            MediaInput::File(path) => path.as_path(),
            MediaInput::Bytes { file_name, .. } => Path::new(file_name.as_str()),
        };
        name.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    /// Human-readable description for logs
    pub fn describe(&self) -> String {
        match self {
            MediaInput::File(path) => path.display().to_string(),
            MediaInput::Bytes { file_name, data } => {
                format!("{} ({} bytes in memory)", file_name, data.len())
            }
        }
    }
}

/// A file owned by one orchestrator run inside its workspace
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAsset {
    pub kind: MediaKind,
    pub path: PathBuf,
}

/// Audio duration as reported by the probe.
///
/// `Unknown` is a valid state distinct from a zero-length track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "seconds", rename_all = "lowercase")]
pub enum ProbedDuration {
    Known(f64),
    Unknown,
}

impl ProbedDuration {
    /// Build from a raw value, rejecting NaN, infinities and negatives
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds.is_finite() && seconds >= 0.0 {
            ProbedDuration::Known(seconds)
        } else {
            ProbedDuration::Unknown
        }
    }

    pub fn seconds(&self) -> Option<f64> {
        match self {
            ProbedDuration::Known(seconds) => Some(*seconds),
            ProbedDuration::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, ProbedDuration::Known(_))
    }
}

impl fmt::Display for ProbedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbedDuration::Known(seconds) => write!(f, "{:.3}s", seconds),
            ProbedDuration::Unknown => write!(f, "unknown"),
        }
    }
}

/// How a job turns audio into video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingStrategy {
    /// One encoder invocation for the whole track
    SingleShot,
    /// Fixed-size windows encoded independently, then joined losslessly
    Chunked,
}

impl fmt::Display for EncodingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingStrategy::SingleShot => write!(f, "single-shot"),
            EncodingStrategy::Chunked => write!(f, "chunked"),
        }
    }
}

/// Which audio file an encode attempt consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioChoice {
    Enhanced,
    Original,
}

/// Scale target for the video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Keep source dimensions, rounded down to even numbers
    EvenSource,
    /// Force an explicit (even) frame size
    Explicit { width: u32, height: u32 },
}

/// Feature level of an encoder invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeProfile {
    /// Re-encode audio with explicit codec, bit-rate and sample rate
    Full,
    /// Duration-capped, stream-copied audio, fastest preset; single-shot only
    Minimal,
}

/// One rung of the encoding fallback ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeAttempt {
    pub name: String,
    pub audio: AudioChoice,
    pub scale: ScaleMode,
    pub profile: EncodeProfile,
}

/// Immutable description of one encode: exactly one output file or a failure
#[derive(Debug, Clone)]
pub struct EncodingJob {
    source_image: PathBuf,
    source_audio: PathBuf,
    output_path: PathBuf,
    time_budget: Duration,
    strategy: EncodingStrategy,
    duration: ProbedDuration,
    attempt: EncodeAttempt,
}

impl EncodingJob {
    /// Create a job, rejecting combinations the encoder cannot honour
    pub fn new(
        source_image: PathBuf,
        source_audio: PathBuf,
        output_path: PathBuf,
        time_budget: Duration,
        strategy: EncodingStrategy,
        duration: ProbedDuration,
        attempt: EncodeAttempt,
    ) -> Result<Self, DomainError> {
        if strategy == EncodingStrategy::Chunked && !duration.is_known() {
            return Err(DomainError::InvalidDuration(
                "chunked encoding requires a known duration".to_string(),
            ));
        }
        if strategy == EncodingStrategy::Chunked && attempt.profile == EncodeProfile::Minimal {
            return Err(DomainError::BadArgs(
                "minimal invocations are single-shot only".to_string(),
            ));
        }
        Ok(Self {
            source_image,
            source_audio,
            output_path,
            time_budget,
            strategy,
            duration,
            attempt,
        })
    }

    pub fn source_image(&self) -> &Path {
        &self.source_image
    }

    pub fn source_audio(&self) -> &Path {
        &self.source_audio
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn time_budget(&self) -> Duration {
        self.time_budget
    }

    pub fn strategy(&self) -> EncodingStrategy {
        self.strategy
    }

    pub fn duration(&self) -> ProbedDuration {
        self.duration
    }

    pub fn attempt(&self) -> &EncodeAttempt {
        &self.attempt
    }
}

/// One time-bounded slice of the final video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub start_offset: f64,
    pub length: f64,
    pub output_path: PathBuf,
}

/// Every tunable of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Transcoder binary
    pub ffmpeg_path: PathBuf,
    /// Probe binary
    pub ffprobe_path: PathBuf,
    /// Parent directory for run workspaces; system temp dir when unset
    pub workspace_root: Option<PathBuf>,
    /// Durations strictly above this take the chunked path
    pub chunk_threshold_secs: f64,
    pub chunk_size_secs: f64,
    /// Concurrent segment encodes
    pub workers: usize,
    /// Lower bound of any encode timeout
    pub min_encode_timeout_secs: u64,
    /// Encode wall-clock budget per second of audio
    pub timeout_factor: f64,
    pub enhance_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub concat_timeout_secs: u64,
    pub fps: u32,
    pub video_codec: String,
    pub preset: String,
    pub pixel_format: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub sample_rate: u32,
    pub channels: u32,
    /// Advanced enhancement filter graph (gain, high-pass, loudness normalisation)
    pub advanced_audio_filter: String,
    /// Basic enhancement filter graph
    pub basic_audio_filter: String,
    pub fallback_width: u32,
    pub fallback_height: u32,
    /// Outputs smaller than this are treated as failed
    pub min_output_bytes: u64,
    pub verify_output: bool,
    /// Allowed duration drift per encoded segment
    pub duration_tolerance_secs: f64,
}

/// Default worker pool size: logical CPUs capped at 4
pub fn default_workers() -> usize {
    num_cpus::get().clamp(1, 4)
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            workspace_root: None,
            chunk_threshold_secs: 600.0,
            chunk_size_secs: 600.0,
            workers: default_workers(),
            min_encode_timeout_secs: 600,
            timeout_factor: 3.0,
            enhance_timeout_secs: 60,
            probe_timeout_secs: 30,
            concat_timeout_secs: 300,
            fps: 24,
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            pixel_format: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            sample_rate: 44_100,
            channels: 1,
            advanced_audio_filter: "volume=2dB,highpass=f=80,loudnorm=I=-16:TP=-1.5:LRA=11"
                .to_string(),
            basic_audio_filter: "dynaudnorm".to_string(),
            fallback_width: 1280,
            fallback_height: 720,
            min_output_bytes: 1024,
            verify_output: true,
            duration_tolerance_secs: 0.1,
        }
    }
}

impl PipelineSettings {
    /// Validate settings before a run starts
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.chunk_size_secs.is_finite() || self.chunk_size_secs <= 0.0 {
            return Err(DomainError::InvalidSettings(format!(
                "chunk size must be positive, got {}",
                self.chunk_size_secs
            )));
        }
        if !self.chunk_threshold_secs.is_finite() || self.chunk_threshold_secs < 0.0 {
            return Err(DomainError::InvalidSettings(format!(
                "chunk threshold cannot be negative, got {}",
                self.chunk_threshold_secs
            )));
        }
        if self.workers == 0 {
            return Err(DomainError::InvalidSettings("workers must be at least 1".to_string()));
        }
        if self.fps == 0 {
            return Err(DomainError::InvalidSettings("fps must be at least 1".to_string()));
        }
        if self.fallback_width < 2 || self.fallback_height < 2 {
            return Err(DomainError::InvalidSettings(format!(
                "fallback frame size {}x{} is too small",
                self.fallback_width, self.fallback_height
            )));
        }
        if !self.timeout_factor.is_finite() || self.timeout_factor <= 0.0 {
            return Err(DomainError::InvalidSettings(format!(
                "timeout factor must be positive, got {}",
                self.timeout_factor
            )));
        }
        if self.sample_rate == 0 || self.channels == 0 {
            return Err(DomainError::InvalidSettings(
                "sample rate and channel count must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn enhance_timeout(&self) -> Duration {
        Duration::from_secs(self.enhance_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn concat_timeout(&self) -> Duration {
        Duration::from_secs(self.concat_timeout_secs)
    }
}
