use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{WeaverError, WeaverResult};
use crate::story::validate::validate_story;

/// A complete story descriptor.
///
/// This is the JSON-facing representation of the input document. It is loaded once, validated,
/// and then only read: synthesis never mutates it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoryDescriptor {
    /// Title, palette and per-video transcript metadata.
    pub metadata: Metadata,
    /// Narrative blocks in playback order.
    pub blocks: Vec<Block>,
}

/// Story-level metadata.
///
/// Besides `title` and `colors`, every other key is a video id mapping to its storage key and
/// transcript segments.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Metadata {
    /// Story title (may be empty).
    #[serde(default)]
    pub title: String,
    /// Optional color scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Palette>,
    /// Video metadata keyed by video id.
    #[serde(flatten)]
    pub videos: BTreeMap<String, VideoMetadata>,
}

impl Metadata {
    /// Declared palette, or white background / black text.
    pub fn palette(&self) -> Palette {
        self.colors.unwrap_or_default()
    }

    /// Resolve a transcript segment of a video.
    pub fn segment(&self, video_id: &str, segment_id: &str) -> Option<&TranscriptSegment> {
        self.videos.get(video_id)?.transcription.get(segment_id)
    }
}

/// Background and text colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Palette {
    /// Scene background.
    pub background: Rgb8,
    /// Caption text.
    pub text: Rgb8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb8::WHITE,
            text: Rgb8::BLACK,
        }
    }
}

/// Storage key and transcript of a pre-recorded video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoMetadata {
    /// Storage key of the video file.
    pub key: String,
    /// Transcript segments keyed by segment id.
    #[serde(default)]
    pub transcription: BTreeMap<String, TranscriptSegment>,
}

/// Source interval of a transcript segment, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptSegment {
    /// Segment start in source seconds.
    pub start: f64,
    /// Segment end in source seconds.
    pub end: f64,
}

/// One narrative unit: speech, stage directions and optional video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    /// Unique block id.
    pub id: String,
    /// Narration for this block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech: Option<SpeechAsset>,
    /// Stage directions shown while the block plays.
    #[serde(default)]
    pub stage: Stage,
    /// Pre-recorded video cut from transcript segments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoDirection>,
}

/// Container for a block's stage directions.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stage {
    /// Directions in authoring order; tags refer to them by index.
    #[serde(default)]
    pub directions: Vec<StageDirection>,
}

/// Speech asset plus the tags that time stage directions against it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpeechAsset {
    /// Audio object in storage.
    pub asset: AssetRef,
    /// Tags keyed by direction index (decimal string).
    #[serde(default)]
    pub tags: BTreeMap<String, Tag>,
}

impl SpeechAsset {
    /// Tags keyed by parsed direction index.
    ///
    /// Keys that are not canonical decimal indices are rejected, so no two keys can name the
    /// same direction; [`crate::StoryDescriptor::validate`] reports the same problem with a path.
    pub fn tag_index(&self) -> WeaverResult<BTreeMap<usize, Tag>> {
        self.tags
            .iter()
            .map(|(k, tag)| {
                direction_index(k)
                    .map(|i| (i, *tag))
                    .ok_or_else(|| WeaverError::schema(format!("tag key '{k}' is not an index")))
            })
            .collect()
    }
}

/// Parse a tag key as a direction index. Only the canonical spelling (`"7"`, not `"07"` or
/// `"+7"`) is accepted.
pub(crate) fn direction_index(key: &str) -> Option<usize> {
    key.parse::<usize>()
        .ok()
        .filter(|i| i.to_string() == key)
}

/// Reference to an object in external storage.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssetRef {
    /// Storage key.
    pub key: String,
}

/// Moment in a block's narration.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tag {
    /// Seconds from the start of the block speech.
    #[serde(rename = "timeOffset")]
    pub time_offset: f64,
}

/// Instruction to show something on stage.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StageDirection {
    /// Direction type.
    #[serde(rename = "type")]
    pub kind: DirectionKind,
    /// Stage location. Omitted text locations rotate through top/center/bottom.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Asset for image, screenshot and video directions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetRef>,
    /// Literal text for text directions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl StageDirection {
    /// Type-specific payload, or `None` when the required field is missing.
    pub fn payload(&self) -> Option<Payload<'_>> {
        match self.kind {
            DirectionKind::Image | DirectionKind::Screenshot | DirectionKind::Video => self
                .asset
                .as_ref()
                .map(|a| Payload::Asset(a.key.as_str())),
            DirectionKind::Text => self.data.as_deref().map(Payload::Text),
        }
    }

    /// Whether this direction is a persistent background placement.
    pub fn is_background(&self) -> bool {
        self.location == Some(Location::Background)
    }
}

/// Borrowed direction payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payload<'a> {
    /// Storage key of an image/screenshot/video.
    Asset(&'a str),
    /// Caption text.
    Text(&'a str),
}

/// Stage direction type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionKind {
    /// Still image.
    Image,
    /// Web page screenshot.
    Screenshot,
    /// Caption text.
    Text,
    /// Video clip.
    Video,
}

/// Placement on the block stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Stage center.
    Center,
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
    /// Static backdrop for the whole block.
    Background,
}

/// Pre-recorded video cut from transcript segments.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoDirection {
    /// Video id (a key of [`Metadata::videos`]).
    pub id: String,
    /// Segment ids in playback order.
    pub segments: Vec<String>,
}

impl StoryDescriptor {
    /// Parse a story from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> WeaverResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| WeaverError::schema(format!("parse story JSON: {e}")))
    }

    /// Parse a story from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> WeaverResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            WeaverError::schema(format!("open story JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate structural invariants. All problems are reported at once.
    pub fn validate(&self) -> WeaverResult<()> {
        validate_story(self).map_err(|e| WeaverError::schema(format!("invalid story: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/model.rs"]
mod tests;
