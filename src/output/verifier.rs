//! Output verification

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::model::ProbedDuration;
use crate::domain::rules;
use crate::output::VerificationResult;
use crate::ports::ProbePort;

/// Re-probes a published output and compares its duration with the source audio
pub struct OutputVerifier {
    probe: Arc<dyn ProbePort>,
}

impl OutputVerifier {
    pub fn new(probe: Arc<dyn ProbePort>) -> Self {
        Self { probe }
    }

    /// Verify `output`. Mismatches are reported, not raised.
    pub async fn verify(
        &self,
        output: &Path,
        expected: ProbedDuration,
        segment_count: usize,
        per_segment_tolerance: f64,
    ) -> VerificationResult {
        let size_bytes = tokio::fs::metadata(output)
            .await
            .map(|meta| meta.len())
            .unwrap_or(0);
        let tolerance_secs = rules::duration_tolerance(segment_count, per_segment_tolerance);
        let actual = self.probe.probe_duration(output).await;

        let passed = match (expected, actual) {
            (ProbedDuration::Known(expected), ProbedDuration::Known(actual)) => {
                Some((expected - actual).abs() <= tolerance_secs)
            }
            _ => None,
        };

        match passed {
            Some(true) => info!(
                "Output verified: {} vs {} expected",
                actual, expected
            ),
            Some(false) => warn!(
                "Output duration {} differs from expected {} by more than {:.2}s",
                actual, expected, tolerance_secs
            ),
            None => warn!("Output duration could not be verified ({})", actual),
        }

        VerificationResult {
            passed,
            expected_secs: expected.seconds(),
            actual_secs: actual.seconds(),
            tolerance_secs,
            size_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedProbe(ProbedDuration);

    #[async_trait]
    impl ProbePort for FixedProbe {
        async fn probe_duration(&self, _path: &Path) -> ProbedDuration {
            self.0
        }
    }

    fn verifier(duration: ProbedDuration) -> OutputVerifier {
        OutputVerifier::new(Arc::new(FixedProbe(duration)))
    }

    #[tokio::test]
    async fn test_within_tolerance_passes() {
        let result = verifier(ProbedDuration::Known(1800.2))
            .verify(Path::new("/nonexistent.mp4"), ProbedDuration::Known(1800.0), 3, 0.1)
            .await;
        assert_eq!(result.passed, Some(true));
        assert!((result.tolerance_secs - 0.3).abs() < 1e-9);
        assert_eq!(result.size_bytes, 0);
    }

    #[tokio::test]
    async fn test_outside_tolerance_fails() {
        let result = verifier(ProbedDuration::Known(1795.0))
            .verify(Path::new("/nonexistent.mp4"), ProbedDuration::Known(1800.0), 3, 0.1)
            .await;
        assert_eq!(result.passed, Some(false));
    }

    #[tokio::test]
    async fn test_unknown_is_inconclusive() {
        let result = verifier(ProbedDuration::Known(10.0))
            .verify(Path::new("/nonexistent.mp4"), ProbedDuration::Unknown, 1, 0.1)
            .await;
        assert_eq!(result.passed, None);
        assert_eq!(result.actual_secs, Some(10.0));
    }
}
