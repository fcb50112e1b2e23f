use crate::foundation::error::{WeaverError, WeaverResult};

/// Absolute timeline frame number.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameWindow {
    /// First frame covered by the window.
    pub start: FrameIndex,
    /// First frame after the window.
    pub end: FrameIndex, // exclusive
}

impl FrameWindow {
    /// Build a non-empty window. `start` must be strictly below `end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> WeaverResult<Self> {
        if start.0 >= end.0 {
            return Err(WeaverError::schema(format!(
                "frame window start ({}) must be < end ({})",
                start.0, end.0
            )));
        }
        Ok(Self { start, end })
    }

    /// Window starting at `start` and lasting `len` frames, or `None` when `len == 0`.
    pub fn with_len(start: FrameIndex, len: u64) -> Option<Self> {
        if len == 0 {
            return None;
        }
        Some(Self {
            start,
            end: FrameIndex(start.0.saturating_add(len)),
        })
    }

    /// Number of frames covered.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Whether `f` lies inside the window.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Whether `other` lies entirely inside this window.
    pub fn encloses(self, other: Self) -> bool {
        self.start.0 <= other.start.0 && other.end.0 <= self.end.0
    }

    /// Strict overlap test: `a.start < b.end && b.start < a.end`.
    pub fn overlaps(self, other: Self) -> bool {
        self.start.0 < other.end.0 && other.start.0 < self.end.0
    }

    /// Translate the window by a non-negative frame offset.
    pub fn offset(self, by: u64) -> Self {
        Self {
            start: FrameIndex(self.start.0.saturating_add(by)),
            end: FrameIndex(self.end.0.saturating_add(by)),
        }
    }
}

/// Rational frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be > 0.
    pub den: u32,
}

impl Fps {
    /// Build a validated frame rate.
    pub fn new(num: u32, den: u32) -> WeaverResult<Self> {
        if den == 0 {
            return Err(WeaverError::schema("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(WeaverError::schema("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert a frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// `floor(secs * fps)`, clamped at zero.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }

    /// `ceil(secs * fps)`, clamped at zero.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        (secs * self.as_f64()).ceil().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Output canvas dimensions, passed through to renderer bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    // Vertical short-form video.
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

/// Straight 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb8 {
    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Opaque black.
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    /// Components normalized to `[0, 1]`, as scene builders expect them.
    pub fn to_unit_f32(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
