//! Easing curves for the growth reveal

use serde::Deserialize;

/// Easing function types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Smooth ease-in-out
    EaseInOut,
    /// Fast start, decelerate
    EaseOut,
    /// Slow start, natural acceleration, gentle finish
    #[default]
    Organic,
}

/// Apply easing function to a value t in range [0, 1]
pub fn ease(t: f32, easing: Easing) -> f32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    match easing {
        Easing::Linear => t,
        Easing::EaseOut => 1.0 - (1.0 - t).powi(2),
        Easing::EaseInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
            }
        }
        Easing::Organic => {
            // Hermite smoothstep with a slight early lift, pinned to 1 at the end
            let s = t * t * (3.0 - 2.0 * t);
            (s * (1.0 + 0.3 * (1.0 - t).sin())).min(1.0)
        }
    }
}
