//! Weaver turns a structured story descriptor into a frame-accurate, multi-track timeline.
//!
//! The engine is renderer-independent and deterministic:
//!
//! - Load and validate a [`StoryDescriptor`]
//! - Prepare speech durations into an [`AssetCatalog`]
//! - Run [`synthesize`] to get a [`Timeline`] plus [`SchedulingWarning`]s
//! - Hand the timeline to a [`RendererBinding`] with [`drive`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod assets;
/// Synthesis configuration.
pub mod config;
pub(crate) mod render;
pub(crate) mod schedule;
pub(crate) mod story;
pub(crate) mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameWindow, Rgb8};
pub use crate::foundation::error::{WeaverError, WeaverResult};

pub use crate::animation::ease::Interpolation;
pub use crate::animation::envelope::{
    COLLAPSED_SCALE, Edge, Envelope, EnvelopeKey, EnvelopeSample, EnvelopeStyle, Property,
};
pub use crate::assets::catalog::AssetCatalog;
pub use crate::assets::fetch::{AssetFetcher, LocalDirFetcher};
pub use crate::assets::probe::{DurationProbe, FfprobeProbe, is_ffprobe_on_path};
pub use crate::config::{DriftPolicy, MusicConfig, RetimeFallback, SynthesisConfig};
pub use crate::render::binding::{BindingConfig, InMemoryBinding, RendererBinding, drive};
pub use crate::schedule::audio::{AudioPlacement, place_audio, transition_cue};
pub use crate::schedule::directions::{
    DirectionRules, DirectionSchedule, ScheduledDirection, Visibility, schedule_directions,
};
pub use crate::schedule::retime::{RetimeError, RetimedSegment, Retimed, retime};
pub use crate::schedule::text_cycle::TextPositionCycle;
pub use crate::schedule::warning::{SchedulingWarning, WarningKind};
pub use crate::story::model::{
    AssetRef, Block, DirectionKind, Location, Metadata, Palette, Payload, SpeechAsset, Stage,
    StageDirection, StoryDescriptor, Tag, TranscriptSegment, VideoDirection, VideoMetadata,
};
pub use crate::story::validate::{SchemaIssue, SchemaIssues};
pub use crate::timeline::assembler::synthesize;
pub use crate::timeline::fingerprint::{TimelineFingerprint, fingerprint};
pub use crate::timeline::model::{
    BlockSpan, EventKind, Lane, PlacedEvent, Synthesis, Timeline, Track, VisualPayload,
};
