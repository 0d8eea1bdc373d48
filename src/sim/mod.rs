//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one call to `Simulation::tick` = one step)
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or persistence dependencies

pub mod ai;
pub mod collision;
pub mod events;
pub mod governor;
pub mod particles;
pub mod power;
pub mod progression;
pub mod scene;
pub mod spawn;
pub mod state;
pub mod status;
pub mod tables;
pub mod tick;
pub mod tracker;

pub use collision::{DefensiveAbility, HitContext, HitOutcome, HitSource, Interception};
pub use events::{AchievementKey, EpisodeReport, GameEvent, HudSnapshot};
pub use governor::PerformanceGovernor;
pub use particles::{Particle, ParticleKind, ParticlePool};
pub use state::{
    ActivePowerUp, ActiveStatusEffect, AiState, Collectible, EpisodePhase, Hostile, Obstacle,
    Player, RunState, World,
};
pub use tables::{CoinTier, HostileKind, PowerUpKind, StatusEffectKind, TrailStyle, Weather};
pub use tick::{Simulation, TickInput};
