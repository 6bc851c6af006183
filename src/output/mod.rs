//! Output publication and verification module

use serde::{Deserialize, Serialize};

pub mod verifier;
pub mod writer;

pub use verifier::OutputVerifier;
pub use writer::OutputWriter;

/// What to do when the output path already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Replace the existing file once the new one is complete
    Always,
    /// Refuse to run
    #[default]
    Never,
}

/// Output verification result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    /// `None` when the output duration could not be measured
    pub passed: Option<bool>,
    pub expected_secs: Option<f64>,
    pub actual_secs: Option<f64>,
    pub tolerance_secs: f64,
    pub size_bytes: u64,
}
