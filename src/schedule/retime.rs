use crate::config::DriftPolicy;
use crate::foundation::core::{Fps, FrameIndex, FrameWindow};
use crate::story::model::TranscriptSegment;

/// Reasons a set of segments cannot be retimed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RetimeError {
    /// Every segment spans zero source frames.
    #[error("segments have zero total source duration")]
    ZeroSourceDuration,
    /// The requested output length is zero frames.
    #[error("target duration is zero frames")]
    ZeroTarget,
    /// Summed source frames do not fit in a frame index.
    #[error("total source duration overflows the frame range")]
    SourceOverflow,
}

/// One transcript segment mapped onto output frames.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RetimedSegment {
    /// Segment id.
    pub segment: String,
    /// Source frames `[floor(start * fps), ceil(end * fps))`.
    pub source: FrameWindow,
    /// Output frames relative to the start of the retimed video.
    pub placement: FrameWindow,
    /// `source / placement` length ratio.
    pub speed_factor: f64,
}

/// Output of [`retime`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Retimed {
    /// Segments in playback order with non-overlapping placements starting at 0.
    pub segments: Vec<RetimedSegment>,
    /// Ids of zero-length segments that were skipped.
    pub skipped: Vec<String>,
}

impl Retimed {
    /// Total output length in frames.
    pub fn total_frames(&self) -> u64 {
        self.segments.last().map_or(0, |s| s.placement.end.0)
    }
}

/// Source frame interval of a transcript segment.
pub fn source_frames(segment: &TranscriptSegment, fps: Fps) -> (u64, u64) {
    (
        fps.secs_to_frames_floor(segment.start),
        fps.secs_to_frames_ceil(segment.end),
    )
}

/// Stretch or compress `segments` so they jointly fill `target_frames`.
///
/// Each segment gets `ceil(source_k * target / total)` output frames, computed in integers, so
/// the sum may overshoot the target by up to `segments - 1` frames. [`DriftPolicy::AbsorbInLast`]
/// takes the excess back from the trailing segments (never below one frame each).
pub fn retime(
    segments: &[(&str, TranscriptSegment)],
    fps: Fps,
    target_frames: u64,
    drift: DriftPolicy,
) -> Result<Retimed, RetimeError> {
    let sources: Vec<(&str, u64, u64)> = segments
        .iter()
        .map(|(id, seg)| {
            let (start, end) = source_frames(seg, fps);
            (*id, start, end.max(start))
        })
        .collect();

    let total = sources
        .iter()
        .try_fold(0u64, |acc, (_, s, e)| acc.checked_add(e - s))
        .ok_or(RetimeError::SourceOverflow)?;
    if total == 0 {
        return Err(RetimeError::ZeroSourceDuration);
    }
    if target_frames == 0 {
        return Err(RetimeError::ZeroTarget);
    }

    let mut out = Retimed::default();
    let mut lengths: Vec<u64> = Vec::with_capacity(sources.len());
    let mut kept: Vec<(&str, u64, u64)> = Vec::with_capacity(sources.len());
    for &(id, start, end) in &sources {
        let src = end - start;
        if src == 0 {
            out.skipped.push(id.to_owned());
            continue;
        }
        let num = u128::from(src) * u128::from(target_frames);
        let den = u128::from(total);
        lengths.push(num.div_ceil(den) as u64);
        kept.push((id, start, end));
    }

    if drift == DriftPolicy::AbsorbInLast {
        let mut excess = lengths.iter().sum::<u64>().saturating_sub(target_frames);
        for len in lengths.iter_mut().rev() {
            if excess == 0 {
                break;
            }
            let take = excess.min(len.saturating_sub(1));
            *len -= take;
            excess -= take;
        }
    }

    let mut cursor = 0u64;
    for ((id, start, end), len) in kept.into_iter().zip(lengths) {
        let placement = FrameWindow {
            start: FrameIndex(cursor),
            end: FrameIndex(cursor.saturating_add(len)),
        };
        cursor = placement.end.0;
        out.segments.push(RetimedSegment {
            segment: id.to_owned(),
            source: FrameWindow {
                start: FrameIndex(start),
                end: FrameIndex(end),
            },
            placement,
            speed_factor: (end - start) as f64 / len as f64,
        });
    }

    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/retime.rs"]
mod tests;
