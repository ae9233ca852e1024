//! Progress curves for one keyframe segment.

/// Easing curve. Every variant maps `[0, 1]` onto `[0, 1]` with fixed endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    /// Cubic Hermite `3t² - 2t³`.
    #[default]
    SmoothStep,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t.powi(2),
            Self::OutQuad => ease_out(t, 2),
            Self::InOutQuad => ease_in_out(t, 2),
            Self::InCubic => t.powi(3),
            Self::OutCubic => ease_out(t, 3),
            Self::InOutCubic => ease_in_out(t, 3),
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }

    /// Runs the curve `speed` times faster, then holds at 1.
    pub fn apply_sped_up(self, t: f64, speed: f64) -> f64 {
        self.apply((t * speed).min(1.0))
    }
}

fn ease_out(t: f64, power: i32) -> f64 {
    1.0 - (1.0 - t).powi(power)
}

fn ease_in_out(t: f64, power: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(power - 1) * t.powi(power)
    } else {
        1.0 - (2.0 - 2.0 * t).powi(power) / 2.0
    }
}

/// Linear progress through a segment of `duration` seconds whose first `hold` seconds are
/// pinned at 0. A hold that covers the whole segment jumps to 1 once it has elapsed.
pub fn held_progress(local: f64, duration: f64, hold: f64) -> f64 {
    if local < hold {
        return 0.0;
    }
    let span = duration - hold;
    if span <= 0.0 {
        return 1.0;
    }
    ((local - hold) / span).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/ease.rs"]
mod tests;
