//! Stillcast Library
//!
//! Assembles a video from a single still image and an audio track. The audio
//! is cleaned up first, long tracks are split into segments that are encoded
//! independently and joined losslessly, and every encoder call sits behind a
//! wall-clock timeout and an ordered fallback ladder.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;
pub mod workspace;

// Re-export commonly used types
pub use app::{AssembleInteractor, AssemblyReport, AssemblyRequest, PipelineState};
pub use domain::errors::DomainError;
pub use domain::model::{MediaInput, PipelineSettings, ProbedDuration};
pub use error::{FailureKind, PipelineFailure, StillcastError, StillcastResult};
pub use output::OverwritePolicy;
