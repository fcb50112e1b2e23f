use xxhash_rust::xxh3::Xxh3;

use crate::animation::envelope::Envelope;
use crate::foundation::core::FrameWindow;
use crate::timeline::model::{EventKind, PlacedEvent, Timeline, VisualPayload};

const XXH3_SEED: u64 = 0x5eed_7a11_e0f3_91c4;

/// Stable 128-bit digest of a timeline.
///
/// Two runs over the same story, catalog and config produce the same fingerprint. Floats are
/// hashed by bit pattern, so `0.0` and `-0.0` differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TimelineFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl std::fmt::Display for TimelineFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Fingerprint a timeline.
pub fn fingerprint(timeline: &Timeline) -> TimelineFingerprint {
    let mut h = StableHasher::new();
    h.write_u32(timeline.fps.num);
    h.write_u32(timeline.fps.den);
    h.write_u32(timeline.canvas.width);
    h.write_u32(timeline.canvas.height);
    for c in [timeline.palette.background, timeline.palette.text] {
        h.write_bytes(&[c.r, c.g, c.b]);
    }
    h.write_u64(timeline.total_frames);

    h.write_u32(timeline.blocks.len() as u32);
    for b in &timeline.blocks {
        h.write_str(&b.id);
        h.write_window(b.window);
    }

    h.write_u32(timeline.events.len() as u32);
    for e in &timeline.events {
        write_event(&mut h, e);
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_i64(&mut self, v: i64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.write_bytes(s.as_bytes());
    }

    fn write_opt_str(&mut self, s: Option<&str>) {
        match s {
            Some(s) => {
                self.write_u8(1);
                self.write_str(s);
            }
            None => self.write_u8(0),
        }
    }

    fn write_opt_f64(&mut self, v: Option<f64>) {
        match v {
            Some(v) => {
                self.write_u8(1);
                self.write_f64(v);
            }
            None => self.write_u8(0),
        }
    }

    fn write_window(&mut self, w: FrameWindow) {
        self.write_u64(w.start.0);
        self.write_u64(w.end.0);
    }

    fn finish(self) -> TimelineFingerprint {
        let v = self.inner.digest128();
        TimelineFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_event(h: &mut StableHasher, e: &PlacedEvent) {
    h.write_u8(e.track as u8);
    h.write_u32(e.channel);
    h.write_opt_str(e.block.as_deref());
    h.write_window(e.window);
    h.write_opt_f64(e.speed_factor);
    h.write_opt_f64(e.gain);
    write_kind(h, &e.kind);
    match &e.envelope {
        Some(env) => {
            h.write_u8(1);
            write_envelope(h, env);
        }
        None => h.write_u8(0),
    }
}

fn write_kind(h: &mut StableHasher, kind: &EventKind) {
    match kind {
        EventKind::Speech { asset } => {
            h.write_u8(0);
            h.write_str(asset);
        }
        EventKind::TransitionCue => h.write_u8(1),
        EventKind::EntryCue { direction } => {
            h.write_u8(2);
            h.write_u64(*direction as u64);
        }
        EventKind::ExitCue { direction } => {
            h.write_u8(3);
            h.write_u64(*direction as u64);
        }
        EventKind::Visual {
            direction,
            kind,
            location,
            payload,
        } => {
            h.write_u8(4);
            match direction {
                Some(d) => {
                    h.write_u8(1);
                    h.write_u64(*d as u64);
                }
                None => h.write_u8(0),
            }
            h.write_u8(*kind as u8);
            h.write_u8(*location as u8);
            match payload {
                VisualPayload::Asset { key } => {
                    h.write_u8(0);
                    h.write_str(key);
                }
                VisualPayload::Text { text } => {
                    h.write_u8(1);
                    h.write_str(text);
                }
            }
        }
        EventKind::VideoSegment {
            video,
            asset,
            segment,
            source,
        } => {
            h.write_u8(5);
            h.write_str(video);
            h.write_str(asset);
            h.write_opt_str(segment.as_deref());
            match source {
                Some(w) => {
                    h.write_u8(1);
                    h.write_window(*w);
                }
                None => h.write_u8(0),
            }
        }
        EventKind::VideoAudio {
            video,
            asset,
            segment,
            source,
        } => {
            h.write_u8(6);
            h.write_str(video);
            h.write_str(asset);
            h.write_str(segment);
            h.write_window(*source);
        }
        EventKind::StageHold { camera_hold_end } => {
            h.write_u8(7);
            h.write_u64(camera_hold_end.0);
        }
        EventKind::Music { asset } => {
            h.write_u8(8);
            h.write_str(asset);
        }
    }
}

fn write_envelope(h: &mut StableHasher, env: &Envelope) {
    h.write_u8(env.style as u8);
    h.write_window(env.window);
    h.write_u32(env.keys.len() as u32);
    for k in &env.keys {
        h.write_u8(k.edge as u8);
        h.write_i64(k.offset);
        h.write_u8(k.property as u8);
        h.write_f64(k.value);
        h.write_u8(k.interpolation as u8);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/fingerprint.rs"]
mod tests;
