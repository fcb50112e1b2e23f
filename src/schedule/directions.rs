use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::config::SynthesisConfig;
use crate::foundation::core::{Fps, FrameIndex, FrameWindow};
use crate::schedule::text_cycle::TextPositionCycle;
use crate::schedule::warning::{SchedulingWarning, WarningKind};
use crate::story::model::{DirectionKind, Location, StageDirection, Tag};

/// Timing rules applied to a block's stage directions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionRules {
    /// Frame rate used to convert tag offsets.
    pub fps: Fps,
    /// Default window length.
    pub standard_duration_frames: u64,
    /// Gaps to the next tag above this are bridged.
    pub gap_bridge_threshold_frames: u64,
    /// Length of entry/exit cues.
    pub effect_cue_frames: u64,
    /// Exit cues need at least this much audio left after the window.
    pub exit_cue_margin_frames: u64,
}

impl DirectionRules {
    /// Rules taken from a synthesis configuration.
    pub fn from_config(cfg: &SynthesisConfig) -> Self {
        Self {
            fps: cfg.fps,
            standard_duration_frames: cfg.standard_duration_frames,
            gap_bridge_threshold_frames: cfg.gap_bridge_threshold_frames,
            effect_cue_frames: cfg.effect_cue_frames,
            exit_cue_margin_frames: cfg.exit_cue_margin_frames,
        }
    }
}

impl Default for DirectionRules {
    fn default() -> Self {
        Self::from_config(&SynthesisConfig::default())
    }
}

/// When a scheduled direction is visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// Visible over a window inside the block audio.
    Windowed(FrameWindow),
    /// Static for the whole block; no window of its own.
    Persistent,
}

/// A direction that made it onto the timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledDirection {
    /// Index of the direction in the block's authoring order.
    pub index: usize,
    /// Direction type.
    pub kind: DirectionKind,
    /// Resolved stage location.
    pub location: Location,
    /// Visibility window.
    pub visibility: Visibility,
    /// Entry sound cue, for windowed directions.
    pub entry_cue: Option<FrameWindow>,
    /// Exit sound cue, when enough audio remains after the window.
    pub exit_cue: Option<FrameWindow>,
}

/// Output of [`schedule_directions`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirectionSchedule {
    /// Scheduled directions in tag order.
    pub directions: Vec<ScheduledDirection>,
    /// Directions dropped on the way.
    pub warnings: Vec<SchedulingWarning>,
}

type Pair<'a> = (usize, &'a StageDirection, Option<Tag>);

/// Establish visibility windows for a block's stage directions.
///
/// Directions are ordered by tag offset (untagged ones sort at 0). Each tagged direction starts
/// at `audio.start + floor(offset * fps)` and lasts the standard duration, unless the next
/// tagged direction is more than the bridge threshold away (the window then runs up to it) or it
/// is the last tagged direction (the window runs to the end of the audio). Untagged background
/// directions become persistent; other untagged directions are skipped.
pub fn schedule_directions(
    block: &str,
    directions: &[StageDirection],
    tags: &BTreeMap<usize, Tag>,
    audio: FrameWindow,
    rules: &DirectionRules,
    cycle: TextPositionCycle,
) -> (DirectionSchedule, TextPositionCycle) {
    let mut pairs: SmallVec<[Pair<'_>; 8]> = directions
        .iter()
        .enumerate()
        .map(|(i, d)| (i, d, tags.get(&i).copied()))
        .collect();
    // Stable: equal offsets keep authoring order.
    pairs.sort_by(|a, b| sort_offset(a).total_cmp(&sort_offset(b)));

    let tag_frames: SmallVec<[Option<u64>; 8]> = pairs
        .iter()
        .map(|(_, _, tag)| {
            // Saturates for huge offsets, which then collapse against the audio end.
            tag.map(|t| {
                audio
                    .start
                    .0
                    .saturating_add(rules.fps.secs_to_frames_floor(t.time_offset))
            })
        })
        .collect();
    let last_tagged = tag_frames.iter().rposition(Option::is_some);

    let mut out = DirectionSchedule::default();
    let mut cycle = cycle;
    for (pos, &(index, direction, _)) in pairs.iter().enumerate() {
        let Some(tag_frame) = tag_frames[pos] else {
            if direction.is_background() {
                out.directions.push(ScheduledDirection {
                    index,
                    kind: direction.kind,
                    location: Location::Background,
                    visibility: Visibility::Persistent,
                    entry_cue: None,
                    exit_cue: None,
                });
            } else {
                tracing::trace!(block, index, "untagged direction skipped");
            }
            continue;
        };

        if tag_frame >= audio.end.0 {
            out.warnings.push(SchedulingWarning {
                block: block.to_owned(),
                direction: Some(index),
                kind: WarningKind::WindowCollapsed {
                    tag_frame,
                    audio_end: audio.end.0,
                },
            });
            continue;
        }

        let len = if Some(pos) == last_tagged {
            audio.end.0 - tag_frame
        } else {
            let next = tag_frames[pos + 1..].iter().flatten().next().copied();
            match next {
                Some(next) if next - tag_frame > rules.gap_bridge_threshold_frames => {
                    next - tag_frame
                }
                _ => rules.standard_duration_frames,
            }
        };
        let end = tag_frame.saturating_add(len).min(audio.end.0);
        let window = FrameWindow {
            start: FrameIndex(tag_frame),
            end: FrameIndex(end),
        };

        let location = match direction.location {
            Some(l) => l,
            None if direction.kind == DirectionKind::Text => {
                let (l, next) = cycle.advance();
                cycle = next;
                l
            }
            None => Location::Center,
        };

        let exit_limit = window.end.0.saturating_add(rules.exit_cue_margin_frames);
        let exit_cue = if exit_limit < audio.end.0 {
            FrameWindow::with_len(window.end, rules.effect_cue_frames)
        } else {
            None
        };

        out.directions.push(ScheduledDirection {
            index,
            kind: direction.kind,
            location,
            visibility: Visibility::Windowed(window),
            entry_cue: FrameWindow::with_len(window.start, rules.effect_cue_frames),
            exit_cue,
        });
    }

    (out, cycle)
}

fn sort_offset(pair: &Pair<'_>) -> f64 {
    pair.2.map_or(0.0, |t| t.time_offset)
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/directions.rs"]
mod tests;
