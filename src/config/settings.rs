use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RaceConfig {
    pub roster: RosterConfig,
    #[serde(default)]
    pub random: RandomConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RosterConfig {
    /// The first player is driven by the keyboard
    pub players: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RandomConfig {
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    pub fps: u32,
    pub timing_samples: usize,
    /// Frames faster than this grow the render depth
    pub fast_frame_s: f32,
    /// Frames slower than this shrink it
    pub slow_frame_s: f32,
    pub pre_race_delay_s: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            timing_samples: 5,
            fast_frame_s: 0.031,
            slow_frame_s: 0.035,
            pre_race_delay_s: 3.5,
        }
    }
}

impl TimingConfig {
    pub fn tick_s(&self) -> f32 {
        1.0 / self.fps as f32
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { width: 800, height: 600 }
    }
}

impl Validate for RaceConfig {
    fn validate(&self) -> Result<()> {
        let players = &self.roster.players;
        if players.len() < 2 {
            return Err(anyhow!("At least two players are needed, got {}", players.len()));
        }
        if players.iter().any(|name| name.trim().is_empty()) {
            return Err(anyhow!("Player names must not be empty"));
        }

        let timing = &self.timing;
        if timing.fps == 0 {
            return Err(anyhow!("Frame rate must be greater than zero"));
        }

        if timing.timing_samples == 0 {
            return Err(anyhow!("Timing samples must be greater than zero"));
        }

        if timing.fast_frame_s <= 0.0 || timing.fast_frame_s >= timing.slow_frame_s {
            return Err(anyhow!(
                "Frame thresholds must satisfy 0 < fast ({}) < slow ({})",
                timing.fast_frame_s,
                timing.slow_frame_s
            ));
        }

        if timing.pre_race_delay_s <= 0.0 {
            return Err(anyhow!("Pre-race delay must be positive"));
        }

        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(anyhow!("Canvas dimensions must be positive"));
        }

        Ok(())
    }
}
