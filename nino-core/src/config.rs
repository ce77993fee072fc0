use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Frame cadences offered by the speed selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedPreset {
    Slow,
    #[default]
    Normal,
    Fast,
    VeryFast,
}

impl SpeedPreset {
    pub fn interval(&self) -> Duration {
        match self {
            SpeedPreset::Slow => Duration::from_millis(2000),
            SpeedPreset::Normal => Duration::from_millis(1000),
            SpeedPreset::Fast => Duration::from_millis(500),
            SpeedPreset::VeryFast => Duration::from_millis(250),
        }
    }
}

/// Timing of the overlay animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatorConfig {
    /// Delay between frames
    pub speed: Duration,
    /// Opacity added per fade tick
    pub fade_step: f32,
    pub fade_tick: Duration,
    /// How long a frame's imagery may take before it is forced to full opacity
    pub load_timeout: Duration,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        AnimatorConfig {
            speed: SpeedPreset::default().interval(),
            fade_step: 0.15,
            fade_tick: Duration::from_millis(30),
            load_timeout: Duration::from_millis(1000),
        }
    }
}

impl AnimatorConfig {
    pub fn with_speed(mut self, speed: Duration) -> Self {
        self.speed = speed;
        self
    }
}
