//! Run configuration supplied by the host at reset
//!
//! Loaded from JSON by hosts that keep it on disk; persistence itself is the
//! host's job.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::tables::{ARCHETYPES, PowerUpKind, TrailStyle};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Particle cap outside performance mode
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 120,
            QualityPreset::Medium => 300,
            QualityPreset::High => 600,
        }
    }
}

/// Ruleset for an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    #[default]
    Normal,
    /// Gentler caps, no power-ups, no hostiles unless asked for
    Relaxed,
}

impl GameMode {
    pub fn is_relaxed(&self) -> bool {
        *self == GameMode::Relaxed
    }
}

/// Player skill tier, biases the starting difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SkillTier {
    Novice,
    #[default]
    Regular,
    Veteran,
    Expert,
}

impl SkillTier {
    pub fn difficulty_bias(&self) -> f32 {
        match self {
            SkillTier::Novice => -0.5,
            SkillTier::Regular => 0.0,
            SkillTier::Veteran => 0.5,
            SkillTier::Expert => 1.0,
        }
    }
}

/// Host configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid run config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown archetype index {index} (have {available})")]
    UnknownArchetype { index: usize, available: usize },
    #[error("starting power-up {0:?} is not offered at the start of a run")]
    StartingPowerUp(PowerUpKind),
}

/// Everything the driver needs to build an episode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Index into the archetype table
    pub archetype: usize,
    /// Optional power-up active from the first tick (Shield or Slow)
    pub starting_power_up: Option<PowerUpKind>,
    /// Cosmetic trail, no gameplay effect
    pub trail: Option<TrailStyle>,
    pub mode: GameMode,
    pub skill: SkillTier,
    pub quality: QualityPreset,
    /// Host can offer one continue after a fatal hit
    pub continue_available: bool,
    /// Spawn hostiles in relaxed mode too
    pub relaxed_hostiles: bool,
    /// RNG seed for the episode
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            archetype: 0,
            starting_power_up: None,
            trail: None,
            mode: GameMode::Normal,
            skill: SkillTier::Regular,
            quality: QualityPreset::Medium,
            continue_available: false,
            relaxed_hostiles: false,
            seed: 0,
        }
    }
}

impl RunConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Loaded run config: archetype={} mode={:?} quality={}",
            config.archetype,
            config.mode,
            config.quality.as_str()
        );
        Ok(config)
    }

    /// Check indices the core assumes valid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.archetype >= ARCHETYPES.len() {
            return Err(ConfigError::UnknownArchetype {
                index: self.archetype,
                available: ARCHETYPES.len(),
            });
        }
        if let Some(kind) = self.starting_power_up {
            if !kind.offered_at_start() {
                return Err(ConfigError::StartingPowerUp(kind));
            }
        }
        Ok(())
    }

    /// Whether hostiles spawn under this config
    pub fn hostiles_enabled(&self) -> bool {
        !self.mode.is_relaxed() || self.relaxed_hostiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_parse() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config = RunConfig::from_json(r#"{"archetype": 3, "mode": "Relaxed"}"#).unwrap();
        assert_eq!(config.archetype, 3);
        assert!(config.mode.is_relaxed());
        assert_eq!(config.quality, QualityPreset::Medium);
        assert!(!config.hostiles_enabled());
    }

    #[test]
    fn test_config_rejects_unknown_archetype() {
        let err = RunConfig::from_json(r#"{"archetype": 99}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownArchetype { index: 99, .. }));
    }

    #[test]
    fn test_config_rejects_bad_starting_power() {
        let config = RunConfig {
            starting_power_up: Some(PowerUpKind::Magnet),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_malformed_json() {
        assert!(matches!(
            RunConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
