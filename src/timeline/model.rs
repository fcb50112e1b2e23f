use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::animation::envelope::Envelope;
use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameWindow};
use crate::foundation::error::{WeaverError, WeaverResult};
use crate::schedule::warning::SchedulingWarning;
use crate::story::model::{DirectionKind, Location, Palette};

/// Logical track an event is placed on.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    /// Block narration.
    Speech,
    /// Native audio of video-only blocks.
    VideoAudio,
    /// Pre-recorded video segments.
    Video,
    /// Windowed stage directions.
    Overlay,
    /// Persistent backdrops.
    Background,
    /// Transition and entry/exit sound cues.
    Effects,
    /// Per-block camera holds.
    Stage,
    /// Story-wide music bed.
    Music,
}

impl Track {
    /// Tracks whose events define block extents. Events on these never overlap across blocks.
    pub fn is_primary(self) -> bool {
        matches!(
            self,
            Self::Speech | Self::VideoAudio | Self::Video | Self::Stage
        )
    }
}

/// What a visual shows.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VisualPayload {
    /// Storage key of an image, screenshot or clip.
    Asset {
        /// Storage key.
        key: String,
    },
    /// Caption text.
    Text {
        /// Literal text.
        text: String,
    },
}

/// Typed payload of a placed event.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Block narration clip.
    Speech {
        /// Storage key of the audio.
        asset: String,
    },
    /// Sound cue leading into a block.
    TransitionCue,
    /// Sound cue when a direction appears.
    EntryCue {
        /// Direction index within the block.
        direction: usize,
    },
    /// Sound cue when a direction leaves.
    ExitCue {
        /// Direction index within the block.
        direction: usize,
    },
    /// Stage direction (or title caption, which has no direction index).
    Visual {
        /// Direction index within the block.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<usize>,
        /// Direction type.
        kind: DirectionKind,
        /// Resolved stage location.
        location: Location,
        /// What to show.
        payload: VisualPayload,
    },
    /// One segment of a pre-recorded video.
    VideoSegment {
        /// Video id.
        video: String,
        /// Storage key of the video file.
        asset: String,
        /// Segment id; absent for an unretimed fallback placement.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        segment: Option<String>,
        /// Source frames played.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<FrameWindow>,
    },
    /// Native audio slice of a video-only block.
    VideoAudio {
        /// Video id.
        video: String,
        /// Storage key of the video file.
        asset: String,
        /// Segment id.
        segment: String,
        /// Source frames played.
        source: FrameWindow,
    },
    /// Camera rest interval for the block.
    StageHold {
        /// Frame the camera starts moving on to the next block.
        camera_hold_end: FrameIndex,
    },
    /// Background music bed.
    Music {
        /// Library key of the music file.
        asset: String,
    },
}

/// One event on the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacedEvent {
    /// Track.
    pub track: Track,
    /// Lane within the track, assigned by [`Timeline::push`].
    pub channel: u32,
    /// Owning block; absent for story-wide events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    /// Payload.
    pub kind: EventKind,
    /// Frames covered.
    pub window: FrameWindow,
    /// Playback speed, for video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_factor: Option<f64>,
    /// Gain, for audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,
    /// Enter/exit animation, for visuals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<Envelope>,
}

impl PlacedEvent {
    /// Bare event on channel 0; [`Timeline::push`] picks the real channel.
    pub fn new(track: Track, block: Option<&str>, kind: EventKind, window: FrameWindow) -> Self {
        Self {
            track,
            channel: 0,
            block: block.map(str::to_owned),
            kind,
            window,
            speed_factor: None,
            gain: None,
            envelope: None,
        }
    }

    /// Set the gain.
    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = Some(gain);
        self
    }

    /// Set the speed factor.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed_factor = Some(speed);
        self
    }

    /// Attach an envelope.
    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }
}

/// Extent of one block on the timeline.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlockSpan {
    /// Block id.
    pub id: String,
    /// `[first frame, last primary-track frame + 1)`.
    pub window: FrameWindow,
}

/// A `(track, channel)` pair.
pub type Lane = (Track, u32);

/// Windows already placed on one lane.
#[derive(Clone, Debug, Default)]
struct LaneWindows {
    max_end: u64,
    windows: Vec<FrameWindow>,
}

impl LaneWindows {
    fn admits(&self, window: FrameWindow) -> bool {
        window.start.0 >= self.max_end || !self.windows.iter().any(|w| w.overlaps(window))
    }

    fn insert(&mut self, window: FrameWindow) {
        self.max_end = self.max_end.max(window.end.0);
        self.windows.push(window);
    }
}

/// Frame-accurate multi-track timeline.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    /// Frame rate.
    pub fps: Fps,
    /// Output canvas.
    pub canvas: Canvas,
    /// Story colors.
    pub palette: Palette,
    /// Number of frames in the story.
    pub total_frames: u64,
    /// Blocks in story order.
    pub blocks: Vec<BlockSpan>,
    /// Events in placement order.
    pub events: Vec<PlacedEvent>,
    /// Lane occupancy covering the first `indexed` events.
    #[serde(skip)]
    lane_index: BTreeMap<Lane, LaneWindows>,
    #[serde(skip)]
    indexed: usize,
}

impl PartialEq for Timeline {
    fn eq(&self, other: &Self) -> bool {
        self.fps == other.fps
            && self.canvas == other.canvas
            && self.palette == other.palette
            && self.total_frames == other.total_frames
            && self.blocks == other.blocks
            && self.events == other.events
    }
}

impl Timeline {
    /// Empty timeline.
    pub fn new(fps: Fps, canvas: Canvas, palette: Palette) -> Self {
        Self {
            fps,
            canvas,
            palette,
            total_frames: 0,
            blocks: Vec::new(),
            events: Vec::new(),
            lane_index: BTreeMap::new(),
            indexed: 0,
        }
    }

    /// Append an event on the lowest channel of its track where it overlaps nothing.
    ///
    /// Returns the channel used.
    pub fn push(&mut self, mut event: PlacedEvent) -> u32 {
        if self.indexed != self.events.len() {
            self.reindex();
        }
        let mut channel = 0;
        while self
            .lane_index
            .get(&(event.track, channel))
            .is_some_and(|lane| !lane.admits(event.window))
        {
            channel += 1;
        }
        event.channel = channel;
        self.lane_index
            .entry((event.track, channel))
            .or_default()
            .insert(event.window);
        self.events.push(event);
        self.indexed = self.events.len();
        channel
    }

    /// Rebuild lane occupancy, e.g. after deserializing or editing `events` directly.
    fn reindex(&mut self) {
        self.lane_index.clear();
        for e in &self.events {
            self.lane_index
                .entry((e.track, e.channel))
                .or_default()
                .insert(e.window);
        }
        self.indexed = self.events.len();
    }

    /// Events grouped by lane, each lane in placement order.
    pub fn lanes(&self) -> BTreeMap<Lane, Vec<&PlacedEvent>> {
        let mut out: BTreeMap<Lane, Vec<&PlacedEvent>> = BTreeMap::new();
        for e in &self.events {
            out.entry((e.track, e.channel)).or_default().push(e);
        }
        out
    }

    /// Events on `track`.
    pub fn on_track(&self, track: Track) -> impl Iterator<Item = &PlacedEvent> {
        self.events.iter().filter(move |e| e.track == track)
    }

    /// Events owned by `block`.
    pub fn for_block<'a>(&'a self, block: &'a str) -> impl Iterator<Item = &'a PlacedEvent> {
        self.events
            .iter()
            .filter(move |e| e.block.as_deref() == Some(block))
    }

    /// Look up a block span.
    pub fn span(&self, block: &str) -> Option<&BlockSpan> {
        self.blocks.iter().find(|b| b.id == block)
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> WeaverResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| WeaverError::serde(format!("serialize timeline: {e}")))
    }

    /// Parse a timeline from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> WeaverResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| WeaverError::serde(format!("parse timeline JSON: {e}")))
    }

    /// Parse a timeline from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> WeaverResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            WeaverError::serde(format!("open timeline JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

/// Result of a synthesis run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Synthesis {
    /// The synthesized timeline.
    pub timeline: Timeline,
    /// Recoverable problems met on the way.
    pub warnings: Vec<SchedulingWarning>,
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
