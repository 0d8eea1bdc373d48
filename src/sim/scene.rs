//! Scene rotation and ambient weather

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::particles::{Particle, ParticleKind, ParticlePool, WeatherParticle};
use super::tables::{SCENES, Scene, SceneKind, Weather};
use crate::consts::{GROUND_Y, PLAYFIELD_WIDTH};
use crate::lerp;

/// Ticks a scene stays before the next swap
pub const SCENE_INTERVAL_TICKS: u64 = 720;
/// Ticks the cross-fade between two scenes takes
pub const SCENE_BLEND_TICKS: u32 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneManager {
    /// Indices into `SCENES` this mode may show
    pool: Vec<usize>,
    current: usize,
    previous: Option<usize>,
    /// Ticks into the current blend
    blend_ticks: u32,
    since_swap: u64,
    rotates: bool,
}

impl SceneManager {
    /// Pick a random starting scene from the mode's pool
    pub fn new(relaxed: bool, rng: &mut Pcg32) -> Self {
        let pool: Vec<usize> = SCENES
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind.is_relaxed() == relaxed)
            .map(|(i, _)| i)
            .collect();
        let current = pool[rng.random_range(0..pool.len())];
        log::info!("Starting scene: {}", SCENES[current].name);
        Self {
            pool,
            current,
            previous: None,
            blend_ticks: SCENE_BLEND_TICKS,
            since_swap: 0,
            rotates: !relaxed,
        }
    }

    pub fn current(&self) -> &'static Scene {
        &SCENES[self.current]
    }

    pub fn weather(&self) -> Weather {
        self.current().weather
    }

    pub fn is_blending(&self) -> bool {
        self.previous.is_some()
    }

    /// Blend progress toward the current scene (1.0 when settled)
    pub fn blend(&self) -> f32 {
        if self.previous.is_none() {
            return 1.0;
        }
        self.blend_ticks as f32 / SCENE_BLEND_TICKS as f32
    }

    /// Sky colour with the cross-fade applied
    pub fn sky_color(&self) -> [u8; 3] {
        let to = self.current().sky;
        let Some(previous) = self.previous else {
            return to;
        };
        let from = SCENES[previous].sky;
        let t = self.blend();
        let mut out = [0u8; 3];
        for i in 0..3 {
            out[i] = lerp(from[i] as f32, to[i] as f32, t).round() as u8;
        }
        out
    }

    /// One tick. Returns the new scene's weather when a blend completes.
    pub fn advance(&mut self) -> Option<Weather> {
        if self.previous.is_some() {
            self.blend_ticks += 1;
            if self.blend_ticks >= SCENE_BLEND_TICKS {
                self.previous = None;
                self.blend_ticks = SCENE_BLEND_TICKS;
                return Some(self.weather());
            }
            return None;
        }
        if !self.rotates {
            return None;
        }
        self.since_swap += 1;
        if self.since_swap >= SCENE_INTERVAL_TICKS {
            self.since_swap = 0;
            self.swap();
        }
        None
    }

    fn swap(&mut self) {
        let position = self.pool.iter().position(|i| *i == self.current).unwrap_or(0);
        let next = self.pool[(position + 1) % self.pool.len()];
        if next == self.current {
            return;
        }
        log::info!(
            "Scene change: {} -> {}",
            SCENES[self.current].name,
            SCENES[next].name
        );
        self.previous = Some(self.current);
        self.current = next;
        self.blend_ticks = 0;
    }

    /// Emit this tick's ambient particles; only while the pool has headroom
    pub fn spawn_weather(&self, pool: &mut ParticlePool, rng: &mut Pcg32) {
        if !pool.has_headroom() {
            return;
        }
        let scene = self.current();
        match scene.weather {
            Weather::Rain => {
                for _ in 0..2 {
                    let pos = Vec2::new(rng.random::<f32>() * PLAYFIELD_WIDTH, -10.0);
                    let vel = Vec2::new(-1.0, 8.0 + rng.random::<f32>() * 4.0);
                    pool.spawn(Particle::new(
                        pos,
                        vel,
                        90,
                        1.5,
                        ParticleKind::Weather(WeatherParticle::Rain),
                    ));
                }
            }
            Weather::Snow => {
                let pos = Vec2::new(rng.random::<f32>() * PLAYFIELD_WIDTH, -10.0);
                let vel = Vec2::new(rng.random_range(-0.5..0.5), 1.0 + rng.random::<f32>());
                let mut flake = Particle::new(
                    pos,
                    vel,
                    400,
                    2.0 + rng.random::<f32>() * 2.0,
                    ParticleKind::Weather(WeatherParticle::Snow),
                );
                flake.seed = rng.random::<f32>() * std::f32::consts::TAU;
                pool.spawn(flake);
            }
            Weather::Sandstorm => {
                if rng.random_bool(0.3) {
                    let pos = Vec2::new(PLAYFIELD_WIDTH + 10.0, rng.random::<f32>() * GROUND_Y);
                    let vel = Vec2::new(-6.0 - rng.random::<f32>() * 3.0, 0.5);
                    pool.spawn(Particle::new(
                        pos,
                        vel,
                        120,
                        1.0 + rng.random::<f32>() * 2.0,
                        ParticleKind::Weather(WeatherParticle::Sand),
                    ));
                }
            }
            Weather::Clear => match scene.kind {
                SceneKind::BloomingZen if rng.random_bool(0.1) => {
                    let pos = Vec2::new(rng.random::<f32>() * PLAYFIELD_WIDTH, -10.0);
                    let mut petal = Particle::new(
                        pos,
                        Vec2::new(-0.5, 0.8),
                        500,
                        3.0,
                        ParticleKind::Weather(WeatherParticle::Petal),
                    );
                    petal.seed = rng.random::<f32>() * std::f32::consts::TAU;
                    pool.spawn(petal);
                }
                SceneKind::VolcanicZen if rng.random_bool(0.2) => {
                    let pos = Vec2::new(rng.random::<f32>() * PLAYFIELD_WIDTH, GROUND_Y);
                    pool.spawn(Particle::new(
                        pos,
                        Vec2::new(0.0, -0.6),
                        300,
                        2.0,
                        ParticleKind::Weather(WeatherParticle::Ash),
                    ));
                }
                _ => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_relaxed_mode_never_rotates() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut scenes = SceneManager::new(true, &mut rng);
        let start = scenes.current().name;
        assert!(scenes.current().kind.is_relaxed());
        for _ in 0..5_000 {
            assert_eq!(scenes.advance(), None);
        }
        assert_eq!(scenes.current().name, start);
    }

    #[test]
    fn test_swap_blends_then_reports_weather() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut scenes = SceneManager::new(false, &mut rng);
        let start = scenes.current().name;
        for _ in 0..SCENE_INTERVAL_TICKS {
            assert_eq!(scenes.advance(), None);
        }
        assert!(scenes.is_blending());
        assert_ne!(scenes.current().name, start);
        assert!(!scenes.current().kind.is_relaxed());
        assert_eq!(scenes.blend(), 0.0);

        let mut reported = None;
        for _ in 0..SCENE_BLEND_TICKS {
            reported = scenes.advance();
        }
        assert_eq!(reported, Some(scenes.weather()));
        assert!(!scenes.is_blending());
        assert_eq!(scenes.sky_color(), scenes.current().sky);
    }

    #[test]
    fn test_weather_respects_pool_headroom() {
        let mut rng = Pcg32::seed_from_u64(3);
        let scenes = SceneManager::new(false, &mut rng);
        let mut pool = ParticlePool::new(0);
        for _ in 0..100 {
            scenes.spawn_weather(&mut pool, &mut rng);
        }
        assert!(pool.is_empty());
    }
}
