// Inspect interactor - Probe and plan preview use cases

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::model::{PipelineSettings, ProbedDuration};
use crate::error::{StillcastError, StillcastResult};
use crate::planner::PlanPreview;
use crate::ports::ProbePort;

/// Probe result for one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub path: PathBuf,
    pub duration: ProbedDuration,
}

/// Interactor for read-only inspection of audio inputs
pub struct InspectInteractor {
    settings: Arc<PipelineSettings>,
    probe_port: Arc<dyn ProbePort>,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(settings: Arc<PipelineSettings>, probe_port: Arc<dyn ProbePort>) -> Self {
        Self {
            settings,
            probe_port,
        }
    }

    /// Report the audio duration of `path`
    pub async fn probe(&self, path: &Path) -> StillcastResult<ProbeReport> {
        if !path.is_file() {
            return Err(StillcastError::InputFileNotFound {
                path: path.display().to_string(),
            });
        }
        let duration = self.probe_port.probe_duration(path).await;
        info!("Probed {}: {}", path.display(), duration);
        Ok(ProbeReport {
            path: path.to_path_buf(),
            duration,
        })
    }

    /// Show how the primary attempt would encode `path`, without encoding anything
    pub async fn plan(&self, path: &Path) -> StillcastResult<PlanPreview> {
        self.settings.validate()?;
        let report = self.probe(path).await?;
        Ok(PlanPreview::build(report.duration, &self.settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::EncodingStrategy;
    use async_trait::async_trait;

    struct FixedProbe(ProbedDuration);

    #[async_trait]
    impl ProbePort for FixedProbe {
        async fn probe_duration(&self, _path: &Path) -> ProbedDuration {
            self.0
        }
    }

    fn interactor(duration: ProbedDuration) -> InspectInteractor {
        InspectInteractor::new(
            Arc::new(PipelineSettings::default()),
            Arc::new(FixedProbe(duration)),
        )
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let result = interactor(ProbedDuration::Known(1.0))
            .probe(Path::new("/nonexistent/voice.wav"))
            .await;
        assert!(matches!(result, Err(StillcastError::InputFileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_plan_long_track() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let preview = interactor(ProbedDuration::Known(3600.0))
            .plan(file.path())
            .await
            .unwrap();
        assert_eq!(preview.strategy, EncodingStrategy::Chunked);
        assert_eq!(preview.segments.len(), 6);
    }
}
