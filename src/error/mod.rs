//! Error handling module for Stillcast

use serde::Serialize;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// Failure taxonomy shared by every pipeline component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Probe could not report a duration; conservative defaults apply
    ProbeUnavailable,
    /// Enhancement fell back to a lower-quality stage
    EnhancementDegraded,
    /// An encoder invocation failed or produced no usable output
    SegmentEncodeFailed,
    /// The lossless join of segments failed
    ConcatenationFailed,
    /// A subprocess exceeded its wall-clock budget and was killed
    Timeout,
    /// Some workspace entries could not be removed
    WorkspaceCleanupPartial,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::ProbeUnavailable => "probe unavailable",
            FailureKind::EnhancementDegraded => "enhancement degraded",
            FailureKind::SegmentEncodeFailed => "segment encode failed",
            FailureKind::ConcatenationFailed => "concatenation failed",
            FailureKind::Timeout => "timeout",
            FailureKind::WorkspaceCleanupPartial => "workspace cleanup partial",
        };
        f.write_str(name)
    }
}

/// Failure of a single component call, before the orchestrator decides what to do with it
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{kind}: {diagnostic}")]
pub struct StageFailure {
    pub kind: FailureKind,
    pub diagnostic: String,
}

impl StageFailure {
    pub fn new(kind: FailureKind, diagnostic: impl Into<String>) -> Self {
        Self {
            kind,
            diagnostic: diagnostic.into(),
        }
    }
}

/// Pipeline stage a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Init,
    Encoding,
    Publishing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Init => "init",
            PipelineStage::Encoding => "encoding",
            PipelineStage::Publishing => "publishing",
        };
        f.write_str(name)
    }
}

/// Outcome of one encode attempt, kept for the failure trail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    pub attempt: String,
    pub strategy: String,
    pub outcome: Result<(), StageFailure>,
    pub elapsed_secs: f64,
}

/// Terminal failure of a pipeline run
#[derive(Error, Debug, Clone, Serialize)]
#[error("pipeline failed during {stage} ({}): {kind}: {diagnostic}", .attempt.as_deref().unwrap_or("no attempt"))]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    pub attempt: Option<String>,
    pub kind: FailureKind,
    pub diagnostic: String,
    pub attempts: Vec<AttemptRecord>,
}

/// Main error type for Stillcast operations
#[derive(Error, Debug)]
pub enum StillcastError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputFileNotFound { path: String },

    /// Output already exists and the overwrite policy forbids replacing it
    #[error("Output file already exists: {path}")]
    OutputExists { path: String },

    /// Workspace could not be created or populated
    #[error("Workspace error: {message}")]
    WorkspaceError { message: String },

    /// Output publication failed
    #[error("Failed to write output file: {message}")]
    OutputError { message: String },

    /// Settings file problem
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Domain validation error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Terminal pipeline failure
    #[error(transparent)]
    Pipeline(#[from] PipelineFailure),

    /// A started run failed outside the encode ladder
    #[error("pipeline failed during {stage}: {source}")]
    Stage {
        stage: PipelineStage,
        /// Ladder rung whose output was being published, if any
        attempt: Option<String>,
        source: Box<StillcastError>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StillcastError {
    /// Attribute `self` to a pipeline stage
    pub fn at_stage(self, stage: PipelineStage, attempt: Option<String>) -> Self {
        StillcastError::Stage {
            stage,
            attempt,
            source: Box::new(self),
        }
    }

    /// Stage a run failed in; `None` for errors raised before any work started
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            StillcastError::Pipeline(failure) => Some(failure.stage),
            StillcastError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result type alias for Stillcast operations
pub type StillcastResult<T> = std::result::Result<T, StillcastError>;
