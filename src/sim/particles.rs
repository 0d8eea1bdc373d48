//! Pooled visual particles
//!
//! Particles never affect gameplay. Each one carries a [`ParticleKind`]; how it
//! moves comes from [`ParticleKind::physics`] and how a host should draw it
//! from [`ParticleKind::visual`], so the simulation never branches on looks.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::tables::{HostileKind, StatusEffectKind, TrailStyle};
use crate::consts::GROUND_Y;

/// Weather particle flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherParticle {
    Rain,
    Snow,
    Sand,
    Petal,
    Ash,
}

/// What a particle is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Coin pickup sparkle
    Burst,
    /// Hostile hit, tinted by the effect it applied
    Debuff(StatusEffectKind),
    Revive,
    Milestone,
    Phase,
    Freeze,
    Trail(TrailStyle),
    Weather(WeatherParticle),
    HostileTrail(HostileKind),
}

/// Per-kind motion parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticlePhysics {
    /// Added to vertical velocity each tick
    pub gravity: f32,
    /// Velocity multiplier each tick
    pub drag: f32,
    /// Bounces off the ground instead of passing through
    pub bounce: bool,
    /// Sideways sway amplitude
    pub sway: f32,
}

/// Per-kind presentation hints for the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleVisual {
    pub color: [u8; 3],
    /// Alpha follows remaining life
    pub fade: bool,
    /// Size follows remaining life
    pub shrink: bool,
}

impl ParticleKind {
    pub fn physics(&self) -> ParticlePhysics {
        let (gravity, drag, bounce, sway) = match self {
            ParticleKind::Burst => (0.15, 0.96, false, 0.0),
            ParticleKind::Debuff(_) => (0.05, 0.94, false, 0.0),
            ParticleKind::Revive => (-0.05, 0.95, false, 0.0),
            ParticleKind::Milestone => (0.1, 0.97, true, 0.0),
            ParticleKind::Phase => (0.0, 0.9, false, 0.0),
            ParticleKind::Freeze => (0.2, 0.98, true, 0.0),
            ParticleKind::Trail(_) => (0.0, 0.92, false, 0.0),
            ParticleKind::Weather(WeatherParticle::Rain) => (0.3, 1.0, false, 0.0),
            ParticleKind::Weather(WeatherParticle::Snow) => (0.02, 0.99, false, 0.6),
            ParticleKind::Weather(WeatherParticle::Sand) => (0.01, 1.0, false, 0.2),
            ParticleKind::Weather(WeatherParticle::Petal) => (0.015, 0.99, false, 0.8),
            ParticleKind::Weather(WeatherParticle::Ash) => (-0.01, 0.99, false, 0.3),
            ParticleKind::HostileTrail(_) => (0.0, 0.9, false, 0.0),
        };
        ParticlePhysics {
            gravity,
            drag,
            bounce,
            sway,
        }
    }

    pub fn visual(&self) -> ParticleVisual {
        let (color, fade, shrink) = match self {
            ParticleKind::Burst => ([0xFF, 0xD7, 0x00], true, true),
            ParticleKind::Debuff(effect) => (debuff_color(*effect), true, true),
            ParticleKind::Revive => ([0xFF, 0x45, 0x00], true, false),
            ParticleKind::Milestone => ([0xFF, 0xFF, 0xFF], true, true),
            ParticleKind::Phase => ([0xB0, 0x8C, 0xFF], true, false),
            ParticleKind::Freeze => ([0x9F, 0xE8, 0xFF], true, true),
            ParticleKind::Trail(TrailStyle::Basic) => ([0xFF, 0xFF, 0xFF], true, true),
            ParticleKind::Trail(TrailStyle::Sparkle) => ([0xFF, 0xF5, 0x9D], true, false),
            ParticleKind::Trail(TrailStyle::Bubble) => ([0xAD, 0xD8, 0xE6], true, false),
            ParticleKind::Weather(WeatherParticle::Rain) => ([0x9C, 0xB4, 0xD8], false, false),
            ParticleKind::Weather(WeatherParticle::Snow) => ([0xFF, 0xFF, 0xFF], false, false),
            ParticleKind::Weather(WeatherParticle::Sand) => ([0xD2, 0xB4, 0x8C], true, false),
            ParticleKind::Weather(WeatherParticle::Petal) => ([0xFF, 0xB7, 0xC5], true, false),
            ParticleKind::Weather(WeatherParticle::Ash) => ([0x55, 0x55, 0x55], true, false),
            ParticleKind::HostileTrail(HostileKind::Sprite) => ([0x7C, 0xFC, 0x00], true, true),
            ParticleKind::HostileTrail(_) => ([0xE0, 0xFF, 0xFF], true, true),
        };
        ParticleVisual {
            color,
            fade,
            shrink,
        }
    }
}

fn debuff_color(effect: StatusEffectKind) -> [u8; 3] {
    match effect {
        StatusEffectKind::HeavyWings => [0x80, 0x80, 0x80],
        StatusEffectKind::FlapFatigue => [0xAD, 0xFF, 0x2F],
        StatusEffectKind::ScreenLurch => [0xFF, 0x63, 0x47],
        StatusEffectKind::Vertigo => [0xDA, 0x70, 0xD6],
        StatusEffectKind::Blackout => [0x20, 0x20, 0x20],
        StatusEffectKind::Downdraft => [0x87, 0xCE, 0xEB],
    }
}

/// A single particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Ticks left; removed when it reaches zero
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
    pub kind: ParticleKind,
    /// Sway phase offset
    pub seed: f32,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, life: u32, size: f32, kind: ParticleKind) -> Self {
        Self {
            pos,
            vel,
            life,
            max_life: life.max(1),
            size,
            kind,
            seed: 0.0,
        }
    }

    /// Remaining life as a fraction of the initial life
    pub fn life_fraction(&self) -> f32 {
        self.life as f32 / self.max_life as f32
    }

    fn step(&mut self) {
        let physics = self.kind.physics();
        self.vel.y += physics.gravity;
        self.vel *= physics.drag;
        self.pos += self.vel;
        if physics.sway > 0.0 {
            self.pos.x += (self.life as f32 * 0.1 + self.seed).sin() * physics.sway;
        }
        if physics.bounce && self.pos.y > GROUND_Y {
            self.pos.y = GROUND_Y;
            self.vel.y *= -0.5;
        }
        self.life = self.life.saturating_sub(1);
    }
}

/// Bounded particle collection
///
/// The cap is owned here and adjusted by the performance governor; lowering
/// it never culls live particles, it only refuses new spawns until the pool
/// drains below the new cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    cap: usize,
}

impl ParticlePool {
    pub fn new(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap),
            cap,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn set_cap(&mut self, cap: usize) {
        if cap != self.cap {
            log::debug!("Particle cap {} -> {}", self.cap, cap);
            self.cap = cap;
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Below half the cap; ambient effects only spawn while this holds
    pub fn has_headroom(&self) -> bool {
        self.particles.len() < self.cap / 2
    }

    /// Add a particle. Returns false when the pool is full or life is zero.
    pub fn spawn(&mut self, particle: Particle) -> bool {
        if particle.life == 0 || self.particles.len() >= self.cap {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Radial burst of `count` particles around `center`
    pub fn burst(
        &mut self,
        rng: &mut Pcg32,
        center: Vec2,
        count: usize,
        kind: ParticleKind,
        speed: f32,
        life: u32,
    ) -> usize {
        let mut spawned = 0;
        for _ in 0..count {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let magnitude = speed * (0.5 + rng.random::<f32>() * 0.5);
            let vel = Vec2::new(angle.cos(), angle.sin()) * magnitude;
            let size = 2.0 + rng.random::<f32>() * 3.0;
            if !self.spawn(Particle::new(center, vel, life, size, kind)) {
                break;
            }
            spawned += 1;
        }
        spawned
    }

    /// Move every particle one tick and drop the expired ones
    pub fn advance(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.step();
        }
        self.particles.retain(|p| p.life > 0);
    }

    /// Shift everything left with the world scroll
    pub fn scroll(&mut self, dx: f32) {
        for particle in self.particles.iter_mut() {
            if !matches!(particle.kind, ParticleKind::Weather(_)) {
                particle.pos.x -= dx;
            }
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn dot(life: u32) -> Particle {
        Particle::new(Vec2::ZERO, Vec2::ZERO, life, 2.0, ParticleKind::Burst)
    }

    #[test]
    fn test_particle_removed_exactly_when_life_hits_zero() {
        let mut pool = ParticlePool::new(10);
        assert!(pool.spawn(dot(3)));
        pool.advance();
        pool.advance();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.iter().next().map(|p| p.life), Some(1));
        pool.advance();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pool_refuses_spawns_at_cap() {
        let mut pool = ParticlePool::new(2);
        assert!(pool.spawn(dot(5)));
        assert!(pool.spawn(dot(5)));
        assert!(!pool.spawn(dot(5)));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_lowering_cap_keeps_live_particles() {
        let mut pool = ParticlePool::new(10);
        for _ in 0..6 {
            pool.spawn(dot(10));
        }
        pool.set_cap(3);
        assert_eq!(pool.len(), 6);
        assert!(!pool.spawn(dot(10)));
    }

    #[test]
    fn test_zero_life_is_rejected() {
        let mut pool = ParticlePool::new(10);
        assert!(!pool.spawn(dot(0)));
    }

    #[test]
    fn test_burst_stops_at_cap() {
        let mut pool = ParticlePool::new(5);
        let mut rng = Pcg32::seed_from_u64(7);
        let spawned = pool.burst(&mut rng, Vec2::ZERO, 20, ParticleKind::Burst, 3.0, 30);
        assert_eq!(spawned, 5);
    }

    #[test]
    fn test_bouncing_particle_stays_above_ground() {
        let mut p = Particle::new(
            Vec2::new(0.0, GROUND_Y - 1.0),
            Vec2::new(0.0, 5.0),
            10,
            2.0,
            ParticleKind::Freeze,
        );
        p.step();
        assert_eq!(p.pos.y, GROUND_Y);
        assert!(p.vel.y < 0.0);
    }
}
