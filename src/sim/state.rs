//! Entities and per-episode run state

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::tables::{
    Archetype, Behavior, CoinTier, HostileKind, PowerUpKind, StatusEffectKind, Weather,
};
use crate::consts::*;

/// Lifecycle of one episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodePhase {
    /// Before the first reset; ticks do nothing
    Resetting,
    /// Active gameplay
    Running,
    /// Host asked to pause; ticks poll and return
    Paused,
    /// Fatal hit, waiting for the host to continue or decline
    AwaitingContinueDecision,
    /// Run ended, report emitted
    Terminated,
}

/// Physics parameters derived from the archetype at reset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBase {
    pub gravity: f32,
    pub thrust: f32,
    pub speed_cap: f32,
}

/// The controllable flyer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Vertical velocity (positive = falling)
    pub vel: f32,
    pub gravity: f32,
    /// Impulse set as velocity on thrust (negative = up)
    pub thrust: f32,
    pub speed_cap: f32,
    /// Radius before power-up scaling
    pub radius: f32,
    /// Tilt in radians, derived from velocity
    pub rotation: f32,
    pub archetype: usize,
    pub base: PhysicsBase,
    /// Archetype multiplier on vertical integration
    pub speed_factor: f32,
    pub gauge_multiplier: f32,
    /// Ticks left during which hits are ignored
    pub immunity_ticks: u32,
}

impl Player {
    pub fn new(archetype_index: usize, archetype: &Archetype) -> Self {
        let base = PhysicsBase {
            gravity: BASE_GRAVITY * archetype.gravity_multiplier,
            thrust: BASE_THRUST * archetype.thrust_multiplier,
            speed_cap: BASE_SPEED_CAP,
        };
        Self {
            pos: Vec2::new(PLAYER_X, PLAYFIELD_HEIGHT / 2.0),
            vel: 0.0,
            gravity: base.gravity,
            thrust: base.thrust,
            speed_cap: base.speed_cap,
            radius: PLAYER_BASE_RADIUS * archetype.size,
            rotation: 0.0,
            archetype: archetype_index,
            base,
            speed_factor: archetype.speed,
            gauge_multiplier: archetype.power_gauge_multiplier,
            immunity_ticks: 0,
        }
    }

    /// Put every modifiable parameter back to the archetype's value
    pub fn restore_base(&mut self) {
        self.gravity = self.base.gravity;
        self.thrust = self.base.thrust;
        self.speed_cap = self.base.speed_cap;
    }

    /// Set velocity to the thrust impulse scaled by `strength`
    pub fn apply_thrust(&mut self, strength: f32) {
        let strength = strength.clamp(MIN_THRUST_STRENGTH, MAX_THRUST_STRENGTH);
        self.vel = self.thrust * strength;
    }

    /// One tick of gravity and vertical motion
    pub fn integrate(&mut self) {
        self.vel = (self.vel + self.gravity).clamp(-self.speed_cap, self.speed_cap);
        self.pos.y += self.vel * self.speed_factor;
        self.rotation = (self.vel * 0.05).clamp(-0.5, 0.5);
        self.immunity_ticks = self.immunity_ticks.saturating_sub(1);
    }

    /// Drawn radius, including Shrink
    pub fn display_radius(&self, shrunk: bool) -> f32 {
        if shrunk { self.radius * 0.6 } else { self.radius }
    }

    /// Radius used for hit tests
    pub fn collision_radius(&self, shrunk: bool) -> f32 {
        self.display_radius(shrunk) * COLLISION_FORGIVENESS
    }

    pub fn grant_immunity(&mut self, ticks: u32) {
        self.immunity_ticks = self.immunity_ticks.max(ticks);
    }
}

/// A gate the player must fly through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
    pub width: f32,
    pub gap_top: f32,
    pub gap_bottom: f32,
    pub scored: bool,
    /// Iced by a freeze-on-hit; no longer collides
    pub frozen: bool,
    /// Already struck once; no longer collides
    pub spent: bool,
    /// Cosmetic style index
    pub variant: u8,
}

impl Obstacle {
    pub fn gap_height(&self) -> f32 {
        self.gap_bottom - self.gap_top
    }

    pub fn gap_center(&self) -> f32 {
        (self.gap_top + self.gap_bottom) / 2.0
    }

    pub fn is_off_screen(&self) -> bool {
        self.x + self.width < 0.0
    }
}

/// A coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub tier: CoinTier,
    pub collected: bool,
    /// Bob/spin animation phase (radians)
    pub phase: f32,
}

impl Collectible {
    pub fn is_off_screen(&self) -> bool {
        self.pos.x + self.radius < 0.0
    }
}

/// AI state of a hostile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    Idle,
    Tracking,
    Attacking,
    Retreating,
    Charging,
}

/// A hostile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hostile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub kind: HostileKind,
    pub effect: StatusEffectKind,
    pub behavior: Behavior,
    /// Multiplier on world scroll
    pub speed: f32,
    pub state: AiState,
    pub cooldown: u32,
    pub elite: bool,
    /// Tick the hostile appeared (animation offset)
    pub spawn_tick: u64,
    /// Spawn sequence number (formation slot)
    pub spawn_order: u32,
    /// Detection radius multiplier (elites see further)
    pub aggression: f32,
    /// Recorded steering target
    pub target: Option<Vec2>,
    /// Ticks spent in the current state
    pub state_ticks: u32,
}

impl Hostile {
    pub fn is_off_screen(&self) -> bool {
        self.pos.x + self.size < 0.0
    }

    pub fn enter(&mut self, state: AiState) {
        self.state = state;
        self.state_ticks = 0;
    }
}

/// All transient world entities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub hostiles: Vec<Hostile>,
    next_id: u32,
}

impl World {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.collectibles.clear();
        self.hostiles.clear();
        self.next_id = 0;
    }

    /// Drop entities that have scrolled off the left edge or were collected
    pub fn cull(&mut self) {
        self.obstacles.retain(|o| !o.is_off_screen());
        self.collectibles.retain(|c| !c.collected && !c.is_off_screen());
        self.hostiles.retain(|h| !h.is_off_screen());
    }
}

/// The single active status effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveStatusEffect {
    pub kind: StatusEffectKind,
    pub remaining: u32,
    pub magnitude: f32,
}

/// The single active power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub remaining: u32,
}

/// Counters that live for exactly one episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub score: u32,
    pub combo: u32,
    pub combo_timer: u32,
    pub coins_collected: u32,
    pub perfect_run: bool,
    /// The first infraction of the episode is forgiven
    pub first_hit_available: bool,
    pub continues_used: u32,
    pub last_milestone: u32,
    pub milestones_reached: u32,
    pub enemies_defeated: u32,
    pub power_ups_used: u32,
    pub weather_seen: HashSet<Weather>,
    pub elapsed_ticks: u64,
    /// Visual shake intensity
    pub screen_shake: f32,
    /// Set when an unmitigated hit happened this tick
    pub fatal_pending: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 0,
            combo_timer: 0,
            coins_collected: 0,
            perfect_run: true,
            first_hit_available: true,
            continues_used: 0,
            last_milestone: 0,
            milestones_reached: 0,
            enemies_defeated: 0,
            power_ups_used: 0,
            weather_seen: HashSet::new(),
            elapsed_ticks: 0,
            screen_shake: 0.0,
            fatal_pending: false,
        }
    }
}

impl RunState {
    /// Count down the combo window, dropping the combo when it closes
    pub fn advance_combo(&mut self) {
        if self.combo_timer > 0 {
            self.combo_timer -= 1;
            if self.combo_timer == 0 {
                self.combo = 0;
            }
        }
    }

    pub fn decay_shake(&mut self) {
        self.screen_shake = (self.screen_shake * 0.9 - 0.5).max(0.0);
    }

    pub fn shake(&mut self, amount: f32) {
        self.screen_shake = self.screen_shake.max(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tables::ARCHETYPES;

    #[test]
    fn test_thrust_sets_velocity_to_impulse() {
        let mut player = Player::new(0, &ARCHETYPES[0]);
        player.vel = 4.0;
        player.apply_thrust(1.0);
        assert_eq!(player.vel, BASE_THRUST);
    }

    #[test]
    fn test_thrust_strength_is_clamped() {
        let mut player = Player::new(0, &ARCHETYPES[0]);
        player.apply_thrust(10.0);
        assert_eq!(player.vel, BASE_THRUST * MAX_THRUST_STRENGTH);
        player.apply_thrust(0.0);
        assert_eq!(player.vel, BASE_THRUST * MIN_THRUST_STRENGTH);
    }

    #[test]
    fn test_integrate_respects_speed_cap() {
        let mut player = Player::new(0, &ARCHETYPES[0]);
        player.vel = 50.0;
        player.integrate();
        assert_eq!(player.vel, BASE_SPEED_CAP);
        assert!(player.rotation <= 0.5);
    }

    #[test]
    fn test_archetype_scales_base_physics() {
        let tank = Player::new(2, &ARCHETYPES[2]);
        assert_eq!(tank.base.gravity, BASE_GRAVITY * 0.9);
        assert_eq!(tank.radius, PLAYER_BASE_RADIUS * 1.3);
    }

    #[test]
    fn test_combo_resets_when_window_closes() {
        let mut run = RunState {
            combo: 4,
            combo_timer: 2,
            ..Default::default()
        };
        run.advance_combo();
        assert_eq!(run.combo, 4);
        run.advance_combo();
        assert_eq!(run.combo, 0);
    }
}
