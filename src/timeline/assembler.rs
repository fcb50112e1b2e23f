use std::collections::BTreeMap;

use crate::animation::envelope::{Envelope, EnvelopeStyle};
use crate::assets::catalog::AssetCatalog;
use crate::config::{RetimeFallback, SynthesisConfig};
use crate::foundation::core::{FrameIndex, FrameWindow};
use crate::foundation::error::{WeaverError, WeaverResult};
use crate::schedule::audio::{place_audio, transition_cue};
use crate::schedule::directions::{
    DirectionRules, ScheduledDirection, Visibility, schedule_directions,
};
use crate::schedule::retime::{Retimed, retime, source_frames};
use crate::schedule::text_cycle::TextPositionCycle;
use crate::schedule::warning::{SchedulingWarning, WarningKind};
use crate::story::model::{
    Block, DirectionKind, Location, Payload, StoryDescriptor, TranscriptSegment, VideoDirection,
};
use crate::timeline::model::{
    BlockSpan, EventKind, PlacedEvent, Synthesis, Timeline, Track, VisualPayload,
};

/// Turn a story into a timeline.
///
/// Blocks are placed in order from frame 1. Each block's extent is the union of its primary-track
/// events, and the next block starts one frame after it. Any fatal error aborts the whole run;
/// recoverable problems are returned as warnings next to the timeline.
#[tracing::instrument(skip_all, fields(blocks = story.blocks.len()))]
pub fn synthesize(
    story: &StoryDescriptor,
    catalog: &AssetCatalog,
    cfg: &SynthesisConfig,
) -> WeaverResult<Synthesis> {
    cfg.validate()?;
    story.validate()?;

    let mut asm = Assembler {
        story,
        catalog,
        cfg,
        rules: DirectionRules::from_config(cfg),
        timeline: Timeline::new(cfg.fps, cfg.canvas, story.metadata.palette()),
        warnings: Vec::new(),
        cursor: FrameIndex(1),
        cycle: TextPositionCycle::new(),
    };
    for block in &story.blocks {
        asm.block(block)?;
    }
    Ok(asm.finish())
}

struct Assembler<'a> {
    story: &'a StoryDescriptor,
    catalog: &'a AssetCatalog,
    cfg: &'a SynthesisConfig,
    rules: DirectionRules,
    timeline: Timeline,
    warnings: Vec<SchedulingWarning>,
    cursor: FrameIndex,
    cycle: TextPositionCycle,
}

impl Assembler<'_> {
    fn block(&mut self, block: &Block) -> WeaverResult<()> {
        let start = self.cursor;
        let first_event = self.timeline.events.len();

        let audio = match &block.speech {
            Some(speech) => {
                let key = speech.asset.key.as_str();
                let secs = self.catalog.duration_secs(key).ok_or_else(|| {
                    WeaverError::asset_unavailable(
                        &block.id,
                        format!("no prepared duration for speech asset '{key}'"),
                    )
                })?;
                let placement = place_audio(
                    &block.id,
                    secs,
                    self.cfg.fps,
                    start,
                    self.cfg.transition_lead_frames,
                )?;
                self.push_transition(block, placement.transition);
                self.push(
                    PlacedEvent::new(
                        Track::Speech,
                        Some(block.id.as_str()),
                        EventKind::Speech {
                            asset: key.to_owned(),
                        },
                        placement.window,
                    )
                    .with_gain(1.0),
                );
                if let Some(video) = &block.video {
                    self.speech_video(block, video, placement.window)?;
                }
                placement.window
            }
            None => {
                let video = block.video.as_ref().ok_or_else(|| {
                    WeaverError::schema(format!("block '{}' has neither speech nor video", block.id))
                })?;
                self.push_transition(block, transition_cue(start, self.cfg.transition_lead_frames));
                self.native_video(block, video)?
            }
        };

        let tags = match &block.speech {
            Some(speech) => speech.tag_index()?,
            None => BTreeMap::new(),
        };
        let (schedule, cycle) = schedule_directions(
            &block.id,
            &block.stage.directions,
            &tags,
            audio,
            &self.rules,
            self.cycle,
        );
        self.cycle = cycle;
        for warning in schedule.warnings {
            self.warn(warning);
        }

        let block_end = self.timeline.events[first_event..]
            .iter()
            .filter(|e| e.track.is_primary())
            .map(|e| e.window.end)
            .max()
            .unwrap_or(audio.end);
        let window = FrameWindow {
            start,
            end: block_end,
        };

        for scheduled in &schedule.directions {
            self.push_direction(block, scheduled, window);
        }
        if self.cfg.title_overlay && !self.story.metadata.title.is_empty() {
            self.push(
                PlacedEvent::new(
                    Track::Overlay,
                    Some(block.id.as_str()),
                    EventKind::Visual {
                        direction: None,
                        kind: DirectionKind::Text,
                        location: Location::Bottom,
                        payload: VisualPayload::Text {
                            text: self.story.metadata.title.clone(),
                        },
                    },
                    window,
                )
                .with_envelope(Envelope::new(
                    window,
                    EnvelopeStyle::Persistent,
                    self.cfg.offscreen_distance,
                )),
            );
        }

        let hold_end = window
            .end
            .0
            .saturating_sub(self.cfg.stage_buffer_frames)
            .max(window.start.0);
        self.push(PlacedEvent::new(
            Track::Stage,
            Some(block.id.as_str()),
            EventKind::StageHold {
                camera_hold_end: FrameIndex(hold_end),
            },
            window,
        ));

        tracing::debug!(
            block = %block.id,
            start = window.start.0,
            end = window.end.0,
            "block placed"
        );
        self.timeline.blocks.push(BlockSpan {
            id: block.id.clone(),
            window,
        });
        self.cursor = FrameIndex(window.end.0.saturating_add(1));
        Ok(())
    }

    /// Video stretched over the speech window. Its native audio is not placed.
    fn speech_video(
        &mut self,
        block: &Block,
        video: &VideoDirection,
        speech: FrameWindow,
    ) -> WeaverResult<()> {
        let segments = resolve_segments(self.story, block, video)?;
        let asset = self.video_key(block, video)?;
        match retime(
            &segments,
            self.cfg.fps,
            speech.len_frames(),
            self.cfg.drift_policy,
        ) {
            Ok(retimed) => {
                self.warn_skipped(block, &retimed);
                for seg in retimed.segments {
                    self.push(
                        PlacedEvent::new(
                            Track::Video,
                            Some(block.id.as_str()),
                            EventKind::VideoSegment {
                                video: video.id.clone(),
                                asset: asset.clone(),
                                segment: Some(seg.segment),
                                source: Some(seg.source),
                            },
                            seg.placement.offset(speech.start.0),
                        )
                        .with_speed(seg.speed_factor),
                    );
                }
                Ok(())
            }
            Err(err) => match self.cfg.retime_fallback {
                RetimeFallback::Abort => Err(WeaverError::retime(&block.id, err.to_string())),
                RetimeFallback::Raw => {
                    self.warn(SchedulingWarning {
                        block: block.id.clone(),
                        direction: None,
                        kind: WarningKind::RetimeFallback {
                            reason: err.to_string(),
                        },
                    });
                    self.push(
                        PlacedEvent::new(
                            Track::Video,
                            Some(block.id.as_str()),
                            EventKind::VideoSegment {
                                video: video.id.clone(),
                                asset,
                                segment: None,
                                source: None,
                            },
                            speech,
                        )
                        .with_speed(1.0),
                    );
                    Ok(())
                }
            },
        }
    }

    /// Video-only block: segments play at their own length with native audio slices.
    fn native_video(&mut self, block: &Block, video: &VideoDirection) -> WeaverResult<FrameWindow> {
        let segments = resolve_segments(self.story, block, video)?;
        let asset = self.video_key(block, video)?;
        let total: u64 = segments
            .iter()
            .map(|(_, seg)| {
                let (s, e) = source_frames(seg, self.cfg.fps);
                e.saturating_sub(s)
            })
            .sum();
        let retimed = retime(&segments, self.cfg.fps, total, self.cfg.drift_policy)
            .map_err(|err| WeaverError::retime(&block.id, err.to_string()))?;
        self.warn_skipped(block, &retimed);

        let origin = self.cursor.0;
        for seg in &retimed.segments {
            let window = seg.placement.offset(origin);
            self.push(
                PlacedEvent::new(
                    Track::VideoAudio,
                    Some(block.id.as_str()),
                    EventKind::VideoAudio {
                        video: video.id.clone(),
                        asset: asset.clone(),
                        segment: seg.segment.clone(),
                        source: seg.source,
                    },
                    window,
                )
                .with_gain(1.0),
            );
            self.push(
                PlacedEvent::new(
                    Track::Video,
                    Some(block.id.as_str()),
                    EventKind::VideoSegment {
                        video: video.id.clone(),
                        asset: asset.clone(),
                        segment: Some(seg.segment.clone()),
                        source: Some(seg.source),
                    },
                    window,
                )
                .with_speed(seg.speed_factor),
            );
        }

        FrameWindow::with_len(self.cursor, retimed.total_frames())
            .ok_or_else(|| WeaverError::retime(&block.id, "video has no playable frames"))
    }

    fn video_key(&self, block: &Block, video: &VideoDirection) -> WeaverResult<String> {
        self.story
            .metadata
            .videos
            .get(&video.id)
            .map(|v| v.key.clone())
            .ok_or_else(|| {
                WeaverError::schema(format!(
                    "block '{}': unknown video '{}'",
                    block.id, video.id
                ))
            })
    }

    fn push_transition(&mut self, block: &Block, cue: Option<FrameWindow>) {
        if let Some(window) = cue {
            self.push(
                PlacedEvent::new(
                    Track::Effects,
                    Some(block.id.as_str()),
                    EventKind::TransitionCue,
                    window,
                )
                .with_gain(self.cfg.effect_gain),
            );
        }
    }

    fn push_direction(
        &mut self,
        block: &Block,
        scheduled: &ScheduledDirection,
        block_window: FrameWindow,
    ) {
        let Some(direction) = block.stage.directions.get(scheduled.index) else {
            return;
        };
        let payload = match direction.payload() {
            Some(Payload::Asset(key)) => VisualPayload::Asset {
                key: key.to_owned(),
            },
            Some(Payload::Text(text)) => VisualPayload::Text {
                text: text.to_owned(),
            },
            None => return,
        };
        let (track, window, style) = match scheduled.visibility {
            Visibility::Persistent => (Track::Background, block_window, EnvelopeStyle::Persistent),
            Visibility::Windowed(window) => {
                let track = if scheduled.location == Location::Background {
                    Track::Background
                } else {
                    Track::Overlay
                };
                let style = if scheduled.kind == DirectionKind::Text {
                    EnvelopeStyle::Scale
                } else {
                    EnvelopeStyle::Translate
                };
                (track, window, style)
            }
        };

        self.push(
            PlacedEvent::new(
                track,
                Some(block.id.as_str()),
                EventKind::Visual {
                    direction: Some(scheduled.index),
                    kind: scheduled.kind,
                    location: scheduled.location,
                    payload,
                },
                window,
            )
            .with_envelope(Envelope::new(window, style, self.cfg.offscreen_distance)),
        );

        let gain = self.cfg.effect_gain;
        if let Some(cue) = scheduled.entry_cue {
            self.push(
                PlacedEvent::new(
                    Track::Effects,
                    Some(block.id.as_str()),
                    EventKind::EntryCue {
                        direction: scheduled.index,
                    },
                    cue,
                )
                .with_gain(gain),
            );
        }
        if let Some(cue) = scheduled.exit_cue {
            self.push(
                PlacedEvent::new(
                    Track::Effects,
                    Some(block.id.as_str()),
                    EventKind::ExitCue {
                        direction: scheduled.index,
                    },
                    cue,
                )
                .with_gain(gain),
            );
        }
    }

    fn warn_skipped(&mut self, block: &Block, retimed: &Retimed) {
        for segment in &retimed.skipped {
            self.warn(SchedulingWarning {
                block: block.id.clone(),
                direction: None,
                kind: WarningKind::EmptySegment {
                    segment: segment.clone(),
                },
            });
        }
    }

    fn warn(&mut self, warning: SchedulingWarning) {
        tracing::warn!(%warning, "scheduling warning");
        self.warnings.push(warning);
    }

    fn push(&mut self, event: PlacedEvent) {
        self.timeline.push(event);
    }

    fn finish(mut self) -> Synthesis {
        let total_frames = self.cursor.0 - 1;
        self.timeline.total_frames = total_frames;
        if let Some(music) = &self.cfg.music
            && let Some(window) = FrameWindow::new(FrameIndex(1), FrameIndex(total_frames)).ok()
        {
            self.timeline.push(
                PlacedEvent::new(
                    Track::Music,
                    None,
                    EventKind::Music {
                        asset: music.key.clone(),
                    },
                    window,
                )
                .with_gain(music.gain),
            );
        }
        tracing::debug!(
            total_frames,
            events = self.timeline.events.len(),
            warnings = self.warnings.len(),
            "synthesis finished"
        );
        Synthesis {
            timeline: self.timeline,
            warnings: self.warnings,
        }
    }
}

fn resolve_segments<'v>(
    story: &StoryDescriptor,
    block: &Block,
    video: &'v VideoDirection,
) -> WeaverResult<Vec<(&'v str, TranscriptSegment)>> {
    video
        .segments
        .iter()
        .map(|id| {
            story
                .metadata
                .segment(&video.id, id)
                .map(|seg| (id.as_str(), *seg))
                .ok_or_else(|| {
                    WeaverError::schema(format!(
                        "block '{}': unknown segment '{id}' of video '{}'",
                        block.id, video.id
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/assembler.rs"]
mod tests;
