//! Synthesis configuration.
//!
//! Every constant the scheduler uses lives here with a serde default, so a partial JSON object
//! (or `{}`) yields the reference deployment settings.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{WeaverError, WeaverResult};

/// Tunables for one synthesis run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Timeline frame rate.
    pub fps: Fps,
    /// Output canvas, passed through to the timeline.
    pub canvas: Canvas,
    /// Default visibility length of a tagged direction.
    pub standard_duration_frames: u64,
    /// A gap to the next tag larger than this is bridged.
    pub gap_bridge_threshold_frames: u64,
    /// Lead of the inter-block transition cue before the block start.
    pub transition_lead_frames: u64,
    /// Length of the entry/exit sound cues placed for windowed directions.
    pub effect_cue_frames: u64,
    /// Exit cues are only placed when the window ends this far before the block audio end.
    pub exit_cue_margin_frames: u64,
    /// Gain applied to entry/exit cues.
    pub effect_gain: f64,
    /// Camera hold ends this many frames before the block end.
    pub stage_buffer_frames: u64,
    /// Outward displacement used by translate envelopes when offscreen.
    pub offscreen_distance: f64,
    /// Background music bed, placed once over the whole story.
    pub music: Option<MusicConfig>,
    /// Add the story title as a persistent bottom caption to every block.
    pub title_overlay: bool,
    /// Storage bucket holding speech assets.
    pub asset_bucket: String,
    /// What to do when a speech-backed video cannot be retimed.
    pub retime_fallback: RetimeFallback,
    /// How per-segment rounding drift is handled by the retimer.
    pub drift_policy: DriftPolicy,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            canvas: Canvas::default(),
            standard_duration_frames: 60,
            gap_bridge_threshold_frames: 60,
            transition_lead_frames: 30,
            effect_cue_frames: 10,
            exit_cue_margin_frames: 30,
            effect_gain: 0.5,
            stage_buffer_frames: 30,
            offscreen_distance: 20.0,
            music: Some(MusicConfig::default()),
            title_overlay: false,
            asset_bucket: "assets".to_owned(),
            retime_fallback: RetimeFallback::default(),
            drift_policy: DriftPolicy::default(),
        }
    }
}

/// Background music bed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MusicConfig {
    /// Library asset key of the music file.
    pub key: String,
    /// Gain applied to the bed.
    #[serde(default = "default_music_gain")]
    pub gain: f64,
}

fn default_music_gain() -> f64 {
    0.2
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            key: "music.mp3".to_owned(),
            gain: default_music_gain(),
        }
    }
}

/// Behavior when a video's segments sum to zero source frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetimeFallback {
    /// Fail the whole run with [`WeaverError::Retime`].
    #[default]
    Abort,
    /// Place the video unretimed over the block window and record a warning.
    Raw,
}

/// Per-segment rounding drift handling in the retimer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftPolicy {
    /// Keep independently ceiled segment lengths; the sum may exceed the target by up to
    /// `segments - 1` frames.
    #[default]
    Preserve,
    /// Shorten the last segment so the sum equals the target.
    AbsorbInLast,
}

impl SynthesisConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> WeaverResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| WeaverError::serde(format!("parse synthesis config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> WeaverResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            WeaverError::schema(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate numeric invariants.
    pub fn validate(&self) -> WeaverResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(WeaverError::schema("canvas width/height must be > 0"));
        }
        if self.standard_duration_frames == 0 {
            return Err(WeaverError::schema("standard_duration_frames must be > 0"));
        }
        if self.effect_cue_frames == 0 {
            return Err(WeaverError::schema("effect_cue_frames must be > 0"));
        }
        if !self.effect_gain.is_finite() || self.effect_gain < 0.0 {
            return Err(WeaverError::schema("effect_gain must be finite and >= 0"));
        }
        if !self.offscreen_distance.is_finite() {
            return Err(WeaverError::schema("offscreen_distance must be finite"));
        }
        if let Some(music) = &self.music {
            if music.key.trim().is_empty() {
                return Err(WeaverError::schema("music key must be non-empty"));
            }
            if !music.gain.is_finite() || music.gain < 0.0 {
                return Err(WeaverError::schema("music gain must be finite and >= 0"));
            }
        }
        if self.asset_bucket.trim().is_empty() {
            return Err(WeaverError::schema("asset_bucket must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
