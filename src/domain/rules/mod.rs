// Domain rules - Pure routing and budgeting decisions

use std::time::Duration;

use crate::domain::model::{EncodingStrategy, PipelineSettings, ProbedDuration, ScaleMode};

/// Pick single-shot or chunked encoding for a probed duration.
///
/// Unknown durations and durations at or below the threshold are single-shot.
pub fn select_strategy(duration: ProbedDuration, threshold_secs: f64) -> EncodingStrategy {
    match duration {
        ProbedDuration::Known(seconds) if seconds > threshold_secs => EncodingStrategy::Chunked,
        _ => EncodingStrategy::SingleShot,
    }
}

/// Wall-clock budget for one encoder invocation covering `duration` of audio
pub fn encode_timeout(duration: ProbedDuration, settings: &PipelineSettings) -> Duration {
    let floor = Duration::from_secs(settings.min_encode_timeout_secs);
    match duration {
        ProbedDuration::Known(seconds) => {
            // absurd probe values saturate instead of overflowing
            let scaled = Duration::try_from_secs_f64(seconds * settings.timeout_factor)
                .unwrap_or(Duration::MAX);
            scaled.max(floor)
        }
        ProbedDuration::Unknown => floor,
    }
}

/// Round a dimension down to the nearest even number, never below 2
pub fn even_floor(value: u32) -> u32 {
    (value & !1).max(2)
}

/// Explicit scale target with both dimensions forced even
pub fn explicit_scale(width: u32, height: u32) -> ScaleMode {
    ScaleMode::Explicit {
        width: even_floor(width),
        height: even_floor(height),
    }
}

/// Allowed difference between encoded and expected duration
pub fn duration_tolerance(segment_count: usize, per_segment_secs: f64) -> f64 {
    segment_count.max(1) as f64 * per_segment_secs
}
