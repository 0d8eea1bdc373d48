//! Difficulty and world-speed ramp

use serde::{Deserialize, Serialize};

use crate::settings::{GameMode, SkillTier};

/// Ramp parameters for one mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampCurve {
    pub difficulty_start: f32,
    pub difficulty_step: f32,
    pub difficulty_every: u64,
    pub difficulty_cap: f32,
    pub speed_start: f32,
    pub speed_step: f32,
    pub speed_every: u64,
    pub speed_cap: f32,
}

impl RampCurve {
    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Normal => Self {
                difficulty_start: 1.0,
                difficulty_step: 0.15,
                difficulty_every: 400,
                difficulty_cap: 6.0,
                speed_start: 2.0,
                speed_step: 0.05,
                speed_every: 300,
                speed_cap: 3.2,
            },
            GameMode::Relaxed => Self {
                difficulty_start: 0.5,
                difficulty_step: 0.05,
                difficulty_every: 800,
                difficulty_cap: 2.0,
                speed_start: 1.5,
                speed_step: 0.02,
                speed_every: 600,
                speed_cap: 2.0,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    curve: RampCurve,
    difficulty: f32,
    speed: f32,
    ticks: u64,
}

impl Progression {
    pub fn new(mode: GameMode, skill: SkillTier) -> Self {
        let curve = RampCurve::for_mode(mode);
        let difficulty =
            (curve.difficulty_start + skill.difficulty_bias()).clamp(0.0, curve.difficulty_cap);
        Self {
            curve,
            difficulty,
            speed: curve.speed_start,
            ticks: 0,
        }
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn curve(&self) -> &RampCurve {
        &self.curve
    }

    /// Horizontal pixels per tick for world entities
    pub fn scroll_speed(&self, power_factor: f32) -> f32 {
        self.speed * (1.0 + self.difficulty * 0.1) * power_factor
    }

    /// One tick of the ramp
    pub fn advance(&mut self) {
        self.ticks += 1;
        if self.ticks % self.curve.difficulty_every == 0 {
            self.difficulty =
                (self.difficulty + self.curve.difficulty_step).min(self.curve.difficulty_cap);
        }
        if self.ticks % self.curve.speed_every == 0 {
            self.speed = (self.speed + self.curve.speed_step).min(self.curve.speed_cap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_steps_on_interval() {
        let mut progression = Progression::new(GameMode::Normal, SkillTier::Regular);
        for _ in 0..399 {
            progression.advance();
        }
        assert_eq!(progression.difficulty(), 1.0);
        progression.advance();
        assert!((progression.difficulty() - 1.15).abs() < 1e-6);
    }

    #[test]
    fn test_difficulty_at_cap_is_unchanged() {
        let mut progression = Progression::new(GameMode::Normal, SkillTier::Expert);
        progression.difficulty = 6.0;
        for _ in 0..400 {
            progression.advance();
        }
        assert_eq!(progression.difficulty(), 6.0);
    }

    #[test]
    fn test_relaxed_caps_hold_over_long_runs() {
        let mut progression = Progression::new(GameMode::Relaxed, SkillTier::Regular);
        for _ in 0..200_000 {
            progression.advance();
        }
        assert_eq!(progression.difficulty(), 2.0);
        assert_eq!(progression.speed(), 2.0);
    }

    #[test]
    fn test_skill_bias_is_clamped() {
        let progression = Progression::new(GameMode::Relaxed, SkillTier::Novice);
        assert_eq!(progression.difficulty(), 0.0);
    }

    #[test]
    fn test_scroll_speed_includes_power_factor() {
        let progression = Progression::new(GameMode::Normal, SkillTier::Regular);
        let base = progression.scroll_speed(1.0);
        assert!((base - 2.2).abs() < 1e-6);
        assert!((progression.scroll_speed(0.25) - base * 0.25).abs() < 1e-6);
    }
}
