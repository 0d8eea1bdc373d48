//! Sky Pecker - side-scrolling flap-and-dodge arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, AI, collisions, episode state)
//! - `settings`: Host-supplied run configuration and quality presets

pub mod settings;
pub mod sim;

pub use settings::{ConfigError, GameMode, QualityPreset, RunConfig, SkillTier};
pub use sim::{EpisodePhase, GameEvent, HudSnapshot, Simulation, TickInput};

/// Game configuration constants
pub mod consts {
    /// Simulation ticks per second the tuning below assumes
    pub const SIM_HZ: u32 = 60;

    /// Playfield dimensions (y grows downward)
    pub const PLAYFIELD_WIDTH: f32 = 500.0;
    pub const PLAYFIELD_HEIGHT: f32 = 700.0;
    pub const GROUND_HEIGHT: f32 = 60.0;
    /// Lowest y any entity may occupy
    pub const GROUND_Y: f32 = PLAYFIELD_HEIGHT - GROUND_HEIGHT;

    /// Player defaults (per-tick units)
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_BASE_RADIUS: f32 = 25.0;
    pub const BASE_GRAVITY: f32 = 0.28;
    /// Negative = upward
    pub const BASE_THRUST: f32 = -6.8;
    /// Terminal vertical speed
    pub const BASE_SPEED_CAP: f32 = 11.0;

    /// Effective hitbox is 85% of the drawn size
    pub const COLLISION_FORGIVENESS: f32 = 0.85;

    /// Thrust input
    pub const MIN_THRUST_STRENGTH: f32 = 0.5;
    pub const MAX_THRUST_STRENGTH: f32 = 2.0;
    pub const THRUST_RETRIGGER_TICKS: u64 = 4;

    /// Gates
    pub const OBSTACLE_WIDTH: f32 = 80.0;
    pub const GAP_TOP_MARGIN: f32 = 80.0;
    pub const GAP_BOTTOM_MARGIN: f32 = GROUND_HEIGHT + 40.0;

    /// Coins
    pub const COIN_RADIUS: f32 = 12.0;
    pub const MIN_COIN_Y: f32 = 80.0;
    pub const MAX_COIN_Y: f32 = GROUND_Y - 80.0;

    /// Power gauge
    pub const POWER_GAUGE_MAX: f32 = 100.0;
    pub const GAUGE_PER_COIN: f32 = 20.0;

    /// Ticks of hit immunity granted by a forgiven hit
    pub const HIT_GRACE_TICKS: u32 = 45;
    pub const PHASE_TICKS: u32 = 20;

    /// Combo window after each coin
    pub const COMBO_WINDOW_TICKS: u32 = 90;

    /// Milestones
    pub const MILESTONE_SCORE_INTERVAL: u32 = 25;
    pub const MILESTONE_COIN_REWARD: u32 = 5;
}

/// Map a press-and-hold duration (milliseconds) to a thrust strength.
///
/// Presses shorter than 75 ms give the weakest flap, 300 ms or longer a full
/// one. The result always lies inside the thrust clamp range.
pub fn thrust_strength_for_hold(hold_ms: f32) -> f32 {
    const MIN_HOLD_MS: f32 = 75.0;
    const MAX_HOLD_MS: f32 = 300.0;
    const FULL_STRENGTH: f32 = 1.0;

    let clamped = hold_ms.clamp(MIN_HOLD_MS, MAX_HOLD_MS);
    let t = (clamped - MIN_HOLD_MS) / (MAX_HOLD_MS - MIN_HOLD_MS);
    consts::MIN_THRUST_STRENGTH + t * (FULL_STRENGTH - consts::MIN_THRUST_STRENGTH)
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_strength_range() {
        assert_eq!(thrust_strength_for_hold(0.0), consts::MIN_THRUST_STRENGTH);
        assert_eq!(thrust_strength_for_hold(10_000.0), 1.0);
        let mid = thrust_strength_for_hold(187.5);
        assert!((mid - 0.75).abs() < 0.001);
    }
}
