//! What the simulation tells the host

use serde::{Deserialize, Serialize};

use super::state::{ActivePowerUp, ActiveStatusEffect, EpisodePhase};
use super::tables::{PowerUpKind, Weather};
use crate::settings::GameMode;

/// Progress keys the host's achievement system listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AchievementKey {
    FirstFlight,
    Survivor,
    Perfectionist,
    Legendary,
    Untouchable,
    ComboKing,
    PowerMaster,
    SpeedDemon,
    WeatherWizard,
    ZenMaster,
    MilestoneHunter,
}

impl AchievementKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementKey::FirstFlight => "firstFlight",
            AchievementKey::Survivor => "survivor",
            AchievementKey::Perfectionist => "perfectionist",
            AchievementKey::Legendary => "legendary",
            AchievementKey::Untouchable => "untouchable",
            AchievementKey::ComboKing => "comboKing",
            AchievementKey::PowerMaster => "powerMaster",
            AchievementKey::SpeedDemon => "speedDemon",
            AchievementKey::WeatherWizard => "weatherWizard",
            AchievementKey::ZenMaster => "zenMaster",
            AchievementKey::MilestoneHunter => "milestoneHunter",
        }
    }
}

/// Final result of an episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub score: u32,
    pub coins: u32,
    pub perfect_run: bool,
    pub mode: GameMode,
    pub enemies_defeated: u32,
    pub power_ups_used: u32,
    pub ticks: u64,
}

/// Discrete notifications, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CoinCollected { value: u32 },
    AchievementProgress { key: AchievementKey, amount: u32 },
    PowerUpUsed(PowerUpKind),
    MilestoneReached { score: u32, coins: u32 },
    PauseStateChanged(bool),
    ContinueRunRequested,
    WeatherEncountered(Weather),
    EpisodeEnded(EpisodeReport),
}

/// Per-tick HUD data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub score: u32,
    /// Power gauge fill, 0-100
    pub gauge_percent: f32,
    pub power_up: Option<ActivePowerUp>,
    pub difficulty: f32,
    pub perfect_run: bool,
    pub combo: u32,
    pub status_effect: Option<ActiveStatusEffect>,
    pub speed: f32,
    pub scroll_speed: f32,
    pub hostile_count: usize,
    pub particle_count: usize,
    pub fps: f32,
    pub performance_mode: bool,
    pub phase: EpisodePhase,
    pub mode: GameMode,
    /// 1.0 when no scene transition is running
    pub scene_blend: f32,
    pub sky_color: [u8; 3],
    pub screen_shake: f32,
    /// Blackout vision radius, if any
    pub vision_radius: Option<f32>,
    pub capture_requested: bool,
}
