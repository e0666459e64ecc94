/// Easing curves for overlay fades.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Cubic ease-out.
    OutCubic,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Raised-cosine pulse: 0 at the start of each cycle, 1 half-way through.
pub fn pulse_wave(elapsed_secs: f64, period_secs: f64) -> f64 {
    if period_secs <= 0.0 {
        return 0.0;
    }
    let u = (elapsed_secs / period_secs).fract();
    0.5 * (1.0 - (std::f64::consts::TAU * u).cos())
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
