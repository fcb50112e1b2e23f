use crate::foundation::core::{Fps, FrameIndex, FrameWindow};
use crate::foundation::error::{WeaverError, WeaverResult};

/// Result of placing one speech asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioPlacement {
    /// Frames covered by the speech audio.
    pub window: FrameWindow,
    /// Transition cue ending at `window.start`, absent for the first placement.
    pub transition: Option<FrameWindow>,
}

/// Place a speech asset of `duration_secs` at `cursor`.
///
/// The audio covers `ceil(duration_secs * fps)` frames. When `cursor > 1` a transition cue of
/// `lead_frames` is scheduled to end exactly at the audio start.
pub fn place_audio(
    block: &str,
    duration_secs: f64,
    fps: Fps,
    cursor: FrameIndex,
    lead_frames: u64,
) -> WeaverResult<AudioPlacement> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(WeaverError::asset_unavailable(
            block,
            format!("speech duration must be finite and > 0 (got {duration_secs})"),
        ));
    }
    let len = fps.secs_to_frames_ceil(duration_secs);
    let window = FrameWindow::with_len(cursor, len).ok_or_else(|| {
        WeaverError::asset_unavailable(block, "speech asset is shorter than one frame")
    })?;
    Ok(AudioPlacement {
        window,
        transition: transition_cue(cursor, lead_frames),
    })
}

/// Cue `[cursor - lead, cursor)` for every placement after the first.
pub fn transition_cue(cursor: FrameIndex, lead_frames: u64) -> Option<FrameWindow> {
    if cursor.0 <= 1 {
        return None;
    }
    let start = FrameIndex(cursor.0.saturating_sub(lead_frames));
    FrameWindow::new(start, cursor).ok()
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/audio.rs"]
mod tests;
