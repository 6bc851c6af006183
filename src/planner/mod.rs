//! Encoding strategy and chunk planning module

use std::path::Path;

use serde::Serialize;

use crate::domain::model::{EncodingStrategy, PipelineSettings, ProbedDuration, Segment};

pub mod chunks;
pub mod strategy;

pub use strategy::StrategyPlanner;

/// Planned segment window, as shown by `stillcast plan`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentWindow {
    pub index: usize,
    pub start_offset: f64,
    pub length: f64,
}

impl From<&Segment> for SegmentWindow {
    fn from(segment: &Segment) -> Self {
        Self {
            index: segment.index,
            start_offset: segment.start_offset,
            length: segment.length,
        }
    }
}

/// Dry-run view of how the primary attempt would encode a track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanPreview {
    pub duration: Option<f64>,
    pub strategy: EncodingStrategy,
    /// Per-invocation timeout in seconds
    pub timeout_secs: u64,
    pub workers: usize,
    pub segments: Vec<SegmentWindow>,
}

impl PlanPreview {
    /// Preview the primary attempt for `duration` without touching the filesystem
    pub fn build(duration: ProbedDuration, settings: &PipelineSettings) -> Self {
        let ladder = StrategyPlanner::ladder(settings);
        let strategy = ladder
            .first()
            .map(|attempt| StrategyPlanner::strategy_for(attempt, duration, settings))
            .unwrap_or(EncodingStrategy::SingleShot);
        let timeout_secs = StrategyPlanner::time_budget(strategy, duration, settings).as_secs();

        let segments = match (strategy, duration) {
            (EncodingStrategy::Chunked, ProbedDuration::Known(total)) => {
                chunks::plan_segments(total, settings.chunk_size_secs, Path::new(""))
                    .map(|segments| segments.iter().map(SegmentWindow::from).collect())
                    .unwrap_or_default()
            }
            _ => Vec::new(),
        };

        Self {
            duration: duration.seconds(),
            strategy,
            timeout_secs,
            workers: settings.workers,
            segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_for_long_track() {
        let preview = PlanPreview::build(ProbedDuration::Known(1800.0), &PipelineSettings::default());
        assert_eq!(preview.strategy, EncodingStrategy::Chunked);
        assert_eq!(preview.segments.len(), 3);
        assert_eq!(preview.segments[2].start_offset, 1200.0);
    }

    #[test]
    fn test_preview_at_threshold_is_single_shot() {
        let preview = PlanPreview::build(ProbedDuration::Known(600.0), &PipelineSettings::default());
        assert_eq!(preview.strategy, EncodingStrategy::SingleShot);
        assert!(preview.segments.is_empty());
        assert_eq!(preview.timeout_secs, 1800);
    }

    #[test]
    fn test_preview_for_unknown_duration() {
        let preview = PlanPreview::build(ProbedDuration::Unknown, &PipelineSettings::default());
        assert_eq!(preview.strategy, EncodingStrategy::SingleShot);
        assert_eq!(preview.duration, None);
        assert_eq!(preview.timeout_secs, 600);
    }
}
