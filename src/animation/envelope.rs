use crate::animation::ease::Interpolation;
use crate::foundation::core::{FrameIndex, FrameWindow};

/// Collapsed scale used by scale envelopes while entering and leaving.
pub const COLLAPSED_SCALE: f64 = 0.01;

/// Entry/exit animation family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeStyle {
    /// Slide in from offscreen and back out (image, screenshot, video).
    Translate,
    /// Grow from a point with a bounce and shrink back (text).
    Scale,
    /// Static for the whole window; no keys.
    Persistent,
}

/// Window edge a key is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// `window.start`.
    Start,
    /// `window.end`.
    End,
}

/// Animated property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// 1.0 visible, 0.0 hidden. Always held.
    Visibility,
    /// Distance pushed outward from the rest position, in scene units.
    Displacement,
    /// Uniform scale factor.
    Scale,
}

/// One keyframe, anchored to a window edge.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnvelopeKey {
    /// Anchor edge.
    pub edge: Edge,
    /// Signed frame offset from the edge.
    pub offset: i64,
    /// Property this key drives.
    pub property: Property,
    /// Property value at the key.
    pub value: f64,
    /// Curve toward the next key of the same property.
    pub interpolation: Interpolation,
}

/// Keyframe schedule of one placed visual.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Envelope {
    /// Animation family.
    pub style: EnvelopeStyle,
    /// Visibility window the keys are anchored to.
    pub window: FrameWindow,
    /// Keys in emission order.
    pub keys: Vec<EnvelopeKey>,
}

/// Property values at one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeSample {
    /// Whether the visual is drawn.
    pub visible: bool,
    /// Outward displacement from the rest position.
    pub displacement: f64,
    /// Uniform scale.
    pub scale: f64,
}

impl EnvelopeSample {
    const REST: Self = Self {
        visible: true,
        displacement: 0.0,
        scale: 1.0,
    };
}

const fn key(
    edge: Edge,
    offset: i64,
    property: Property,
    value: f64,
    interpolation: Interpolation,
) -> EnvelopeKey {
    EnvelopeKey {
        edge,
        offset,
        property,
        value,
        interpolation,
    }
}

impl Envelope {
    /// Build the keys for `style` around `window`.
    ///
    /// Entry animations run before `window.start` so the visual is at rest for the whole window;
    /// exit animations run after `window.end`.
    pub fn new(window: FrameWindow, style: EnvelopeStyle, offscreen_distance: f64) -> Self {
        use Edge::{End, Start};
        use Interpolation::{Hold, Linear, OutBounce};
        use Property::{Displacement, Scale, Visibility};

        let keys = match style {
            EnvelopeStyle::Translate => vec![
                key(Start, -11, Visibility, 0.0, Hold),
                key(Start, -10, Visibility, 1.0, Hold),
                key(Start, -10, Displacement, offscreen_distance, Linear),
                key(Start, 0, Displacement, 0.0, Hold),
                key(End, 0, Displacement, 0.0, Linear),
                key(End, 10, Displacement, offscreen_distance, Hold),
                key(End, 11, Visibility, 0.0, Hold),
            ],
            EnvelopeStyle::Scale => vec![
                key(Start, -21, Visibility, 0.0, Hold),
                key(Start, -20, Visibility, 1.0, Hold),
                key(Start, -20, Scale, COLLAPSED_SCALE, OutBounce),
                key(Start, 0, Scale, 1.0, Hold),
                key(End, 0, Scale, 1.0, Linear),
                key(End, 10, Scale, COLLAPSED_SCALE, Hold),
                key(End, 11, Visibility, 0.0, Hold),
            ],
            EnvelopeStyle::Persistent => Vec::new(),
        };

        Self {
            style,
            window,
            keys,
        }
    }

    /// Absolute frame of a key. May be negative for windows starting near frame 0.
    pub fn absolute_frame(&self, key: &EnvelopeKey) -> i64 {
        let base = match key.edge {
            Edge::Start => self.window.start.0,
            Edge::End => self.window.end.0,
        };
        base as i64 + key.offset
    }

    /// Evaluate visibility, displacement and scale at `frame`.
    ///
    /// Frames outside a property's keys take the nearest key's value. Properties the style does
    /// not animate stay at rest.
    pub fn sample(&self, frame: FrameIndex) -> EnvelopeSample {
        if self.style == EnvelopeStyle::Persistent {
            return EnvelopeSample::REST;
        }
        let f = frame.0 as i64;
        let rest = EnvelopeSample::REST;
        EnvelopeSample {
            visible: self
                .sample_property(Property::Visibility, f)
                .map_or(rest.visible, |v| v >= 0.5),
            displacement: self
                .sample_property(Property::Displacement, f)
                .unwrap_or(rest.displacement),
            scale: self
                .sample_property(Property::Scale, f)
                .unwrap_or(rest.scale),
        }
    }

    fn sample_property(&self, property: Property, f: i64) -> Option<f64> {
        let keys: Vec<(i64, &EnvelopeKey)> = self
            .keys
            .iter()
            .filter(|k| k.property == property)
            .map(|k| (self.absolute_frame(k), k))
            .collect();
        if keys.is_empty() {
            return None;
        }

        let idx = keys.partition_point(|(at, _)| *at <= f);
        if idx == 0 {
            return Some(keys[0].1.value);
        }
        if idx >= keys.len() {
            return Some(keys[keys.len() - 1].1.value);
        }

        let (a_at, a) = keys[idx - 1];
        let (b_at, b) = keys[idx];
        let denom = b_at - a_at;
        if denom <= 0 {
            return Some(a.value);
        }
        let t = (f - a_at) as f64 / denom as f64;
        let te = a.interpolation.apply(t);
        Some(a.value + (b.value - a.value) * te)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/envelope.rs"]
mod tests;
