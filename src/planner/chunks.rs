//! Chunk planning: fixed-size windows over a known duration

use std::path::Path;

use crate::domain::errors::DomainError;
use crate::domain::model::Segment;

/// Upper bound on segments for one job; more than this is a bogus duration
pub const MAX_SEGMENTS: usize = 100_000;

/// Number of windows of `chunk_secs` needed to cover `total_secs`.
///
/// Saturates at `usize::MAX`; callers planning real work check it against
/// [`MAX_SEGMENTS`].
pub fn segment_count(total_secs: f64, chunk_secs: f64) -> usize {
    if total_secs.is_nan() || chunk_secs.is_nan() || total_secs <= 0.0 || chunk_secs <= 0.0 {
        return 0;
    }
    (total_secs / chunk_secs).ceil() as usize
}

/// File name of a segment, zero-padded so lexical and index order agree
pub fn segment_file_name(index: usize) -> String {
    format!("segment_{:04}.mp4", index)
}

/// Partition `[0, total_secs)` into contiguous segments written under `dir`.
///
/// Every segment but the last is exactly `chunk_secs` long; the last one
/// covers the remainder.
pub fn plan_segments(total_secs: f64, chunk_secs: f64, dir: &Path) -> Result<Vec<Segment>, DomainError> {
    if !total_secs.is_finite() || total_secs <= 0.0 {
        return Err(DomainError::InvalidDuration(format!(
            "cannot plan segments for a duration of {}s",
            total_secs
        )));
    }
    if !chunk_secs.is_finite() || chunk_secs <= 0.0 {
        return Err(DomainError::InvalidSettings(format!(
            "chunk size must be positive, got {}s",
            chunk_secs
        )));
    }

    let count = segment_count(total_secs, chunk_secs);
    if count > MAX_SEGMENTS {
        return Err(DomainError::InvalidDuration(format!(
            "{}s would need {} segments of {}s, more than the {} allowed",
            total_secs, count, chunk_secs, MAX_SEGMENTS
        )));
    }
    let segments = (0..count)
        .map(|index| {
            let start_offset = index as f64 * chunk_secs;
            let length = chunk_secs.min(total_secs - start_offset);
            Segment {
                index,
                start_offset,
                length,
                output_path: dir.join(segment_file_name(index)),
            }
        })
        .collect();
    Ok(segments)
}
