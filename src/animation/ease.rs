/// Curve applied between an envelope key and the next key of the same property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Keep the key value until the next key.
    Hold,
    /// Straight-line interpolation.
    Linear,
    /// Bounce ease-out: the value reaches the target early, drops back and rebounds with
    /// shrinking amplitude. It never overshoots past the target; the "overshoot" of a scale
    /// entrance is these rebounds.
    OutBounce,
}

impl Interpolation {
    /// Map normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Hold => 0.0,
            Self::Linear => t,
            Self::OutBounce => out_bounce(t),
        }
    }
}

fn out_bounce(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
