use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Quadratic ease-in-out, the `power1.inOut` curve.
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Easing curves. Every curve maps 0 to 0 and 1 to 1 exactly and is
/// monotonic on [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ease {
    #[serde(rename = "linear", alias = "none")]
    Linear,
    #[default]
    #[serde(rename = "power1.inOut")]
    Power1InOut,
    #[serde(rename = "power2.inOut")]
    Power2InOut,
    #[serde(rename = "sine.inOut")]
    SineInOut,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1InOut => ease_in_out(t),
            Ease::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
            Ease::SineInOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    -((PI * t).cos() - 1.0) / 2.0
                }
            }
        }
    }
}

/// Clock-driven tween used for UI motion. Unlike the keyframe timeline this
/// one advances from wall time.
#[derive(Debug, Clone)]
pub struct Transition {
    pub start_time: f32,
    pub duration: f32,
    pub current_time: f32,
}

impl Transition {
    pub fn new(duration: f32) -> Self {
        Self {
            start_time: 0.0,
            duration,
            current_time: 0.0,
        }
    }

    /// A transition that already reports completion.
    pub fn finished(duration: f32) -> Self {
        Self {
            start_time: -duration,
            duration,
            current_time: 0.0,
        }
    }

    pub fn start(&mut self, now: f32) {
        self.start_time = now;
        self.current_time = now;
    }

    pub fn update(&mut self, now: f32) {
        self.current_time = now;
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let elapsed = self.current_time - self.start_time;
        (elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn eased_progress(&self) -> f32 {
        ease_in_out(self.progress())
    }
}
