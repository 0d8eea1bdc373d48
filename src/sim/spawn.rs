//! Procedural spawning of gates, coins and hostiles

use glam::Vec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{AiState, Collectible, Hostile, Obstacle, World};
use super::tables::{CoinTier, HOSTILE_SPECS, HostileSpec};
use super::tracker::BehaviorTracker;
use crate::consts::*;
use crate::lerp;

/// Ticks between coin attempts
pub const COIN_INTERVAL_TICKS: u32 = 100;
const COIN_CHANCE: f64 = 0.7;
const GAP_BIAS_CHANCE: f64 = 0.3;
const ELITE_DIFFICULTY: f32 = 4.5;
const ELITE_CHANCE: f64 = 0.08;
/// Spawn x for everything entering from the right
const SPAWN_X: f32 = PLAYFIELD_WIDTH + 80.0;
/// Lowest allowed gap bottom
const GAP_FLOOR: f32 = PLAYFIELD_HEIGHT - GAP_BOTTOM_MARGIN;

/// Inputs the spawners read each tick
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext<'a> {
    pub tick: u64,
    pub difficulty: f32,
    pub relaxed: bool,
    pub slow_active: bool,
    pub hostiles_enabled: bool,
    pub hostile_cap: usize,
    pub tracker: &'a BehaviorTracker,
}

/// Ticks between gates
pub fn obstacle_interval(difficulty: f32, relaxed: bool, slow_active: bool) -> u32 {
    let mut interval = (100.0 - difficulty * 5.0).clamp(70.0, 120.0);
    if relaxed {
        interval *= 1.1;
    }
    if slow_active {
        interval *= 1.85;
    }
    interval.round() as u32
}

/// Ticks between hostile attempts
pub fn hostile_interval(difficulty: f32) -> u32 {
    (240.0 - difficulty * 30.0).max(60.0).round() as u32
}

/// Inclusive range the gap height is drawn from
pub fn gap_range(difficulty: f32, relaxed: bool) -> (f32, f32) {
    let d = difficulty.clamp(1.0, 6.0);
    let (m1, m2) = if relaxed { (1.3, 1.2) } else { (1.0, 1.0) };
    let min = (220.0 * m1 - 7.0 * d).max(190.0);
    let max = (280.0 * m2 - 7.0 * d).max(min + 30.0);
    (min, max)
}

/// Return a gap that satisfies the gate invariants, substituting a centred
/// default when the input does not
pub fn sanitize_gap(gap_top: f32, gap_bottom: f32, relaxed: bool) -> (f32, f32) {
    let valid = gap_top.is_finite()
        && gap_bottom.is_finite()
        && gap_top >= 0.0
        && gap_bottom <= GROUND_Y
        && gap_bottom - gap_top > 0.0;
    if valid {
        return (gap_top, gap_bottom);
    }
    let height = if relaxed { 250.0 } else { 200.0 };
    let center = (GAP_TOP_MARGIN + GAP_FLOOR) / 2.0;
    log::warn!(
        "Degenerate gap {gap_top}..{gap_bottom}; using {height} centred at {center}"
    );
    (center - height / 2.0, center + height / 2.0)
}

/// Cadence counters for the three spawners
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spawner {
    since_obstacle: u32,
    since_coin: u32,
    since_hostile: u32,
    hostiles_spawned: u32,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run all three cadences for one tick
    pub fn advance(&mut self, ctx: &SpawnContext, rng: &mut Pcg32, world: &mut World) {
        self.since_obstacle += 1;
        if self.since_obstacle >= obstacle_interval(ctx.difficulty, ctx.relaxed, ctx.slow_active)
        {
            self.since_obstacle = 0;
            let id = world.next_id();
            let obstacle = spawn_obstacle(id, ctx, rng);
            log::debug!(
                "Gate {} gap {:.0}..{:.0}",
                obstacle.id,
                obstacle.gap_top,
                obstacle.gap_bottom
            );
            world.obstacles.push(obstacle);
        }

        self.since_coin += 1;
        if self.since_coin >= COIN_INTERVAL_TICKS {
            self.since_coin = 0;
            if rng.random_bool(COIN_CHANCE) {
                let id = world.next_id();
                if let Some(coin) = spawn_collectible(id, &world.obstacles, rng) {
                    world.collectibles.push(coin);
                }
            }
        }

        if !ctx.hostiles_enabled {
            return;
        }
        self.since_hostile += 1;
        if self.since_hostile >= hostile_interval(ctx.difficulty) {
            self.since_hostile = 0;
            if world.hostiles.len() >= ctx.hostile_cap {
                return;
            }
            let id = world.next_id();
            if let Some(hostile) = spawn_hostile(id, self.hostiles_spawned, ctx, rng) {
                log::debug!(
                    "Hostile {:?} (elite: {}) at y={:.0}",
                    hostile.kind,
                    hostile.elite,
                    hostile.pos.y
                );
                self.hostiles_spawned += 1;
                world.hostiles.push(hostile);
            }
        }
    }
}

pub fn spawn_obstacle(id: u32, ctx: &SpawnContext, rng: &mut Pcg32) -> Obstacle {
    let (min, max) = gap_range(ctx.difficulty, ctx.relaxed);
    let height = rng.random_range(min..=max);
    let top_limit = (GAP_FLOOR - height).max(GAP_TOP_MARGIN);
    let mut gap_top = rng.random_range(GAP_TOP_MARGIN..=top_limit);

    if rng.random_bool(GAP_BIAS_CHANCE) {
        let center = gap_top + height / 2.0;
        let target = lerp(center, ctx.tracker.preferred_height(), 0.5);
        gap_top = (target - height / 2.0).clamp(GAP_TOP_MARGIN, top_limit);
    }

    let (gap_top, gap_bottom) = sanitize_gap(gap_top, gap_top + height, ctx.relaxed);
    Obstacle {
        id,
        x: SPAWN_X,
        width: OBSTACLE_WIDTH,
        gap_top,
        gap_bottom,
        scored: false,
        frozen: false,
        spent: false,
        variant: rng.random_range(0..4),
    }
}

/// Place a coin, avoiding the solid part of any gate it would overlap
pub fn spawn_collectible(
    id: u32,
    obstacles: &[Obstacle],
    rng: &mut Pcg32,
) -> Option<Collectible> {
    const ATTEMPTS: usize = 3;
    let x = SPAWN_X + OBSTACLE_WIDTH / 2.0;
    for _ in 0..ATTEMPTS {
        let pos = Vec2::new(x, rng.random_range(MIN_COIN_Y..=MAX_COIN_Y));
        if obstacles.iter().any(|o| overlaps_solid(o, pos, COIN_RADIUS)) {
            continue;
        }
        return Some(Collectible {
            id,
            pos,
            radius: COIN_RADIUS,
            tier: pick_tier(rng),
            collected: false,
            phase: rng.random::<f32>() * std::f32::consts::TAU,
        });
    }
    log::debug!("Coin placement rejected");
    None
}

fn overlaps_solid(obstacle: &Obstacle, pos: Vec2, radius: f32) -> bool {
    let horizontal = pos.x + radius > obstacle.x && pos.x - radius < obstacle.x + obstacle.width;
    horizontal && (pos.y - radius < obstacle.gap_top || pos.y + radius > obstacle.gap_bottom)
}

fn pick_tier(rng: &mut Pcg32) -> CoinTier {
    match WeightedIndex::new(CoinTier::ALL.iter().map(|t| t.spawn_weight())) {
        Ok(dist) => CoinTier::ALL[dist.sample(rng)],
        Err(_) => CoinTier::Bronze,
    }
}

/// Hostile types unlocked at `difficulty`
pub fn unlocked_hostiles(difficulty: f32) -> Vec<&'static HostileSpec> {
    HOSTILE_SPECS
        .iter()
        .filter(|s| s.unlock_difficulty <= difficulty)
        .collect()
}

pub fn spawn_hostile(
    id: u32,
    order: u32,
    ctx: &SpawnContext,
    rng: &mut Pcg32,
) -> Option<Hostile> {
    let candidates = unlocked_hostiles(ctx.difficulty);
    let dist = WeightedIndex::new(candidates.iter().map(|s| s.spawn_weight)).ok()?;
    let spec = candidates[dist.sample(rng)];

    let elite = ctx.difficulty >= ELITE_DIFFICULTY && rng.random_bool(ELITE_CHANCE);
    let (size, speed, aggression) = if elite {
        (spec.size * 1.4, spec.speed_multiplier * 1.3, 1.3)
    } else {
        (spec.size, spec.speed_multiplier, 1.0)
    };

    let low = size + 40.0;
    let high = GROUND_Y - size - 40.0;
    let bias = (0.2 + 0.3 * ctx.tracker.risk_tolerance()).clamp(0.0, 1.0) as f64;
    let y = if rng.random_bool(bias) {
        let zone = ctx.tracker.frequent_zone();
        (zone + rng.random_range(-40.0..=40.0)).clamp(low, high)
    } else {
        rng.random_range(low..=high)
    };

    Some(Hostile {
        id,
        pos: Vec2::new(PLAYFIELD_WIDTH + size + 20.0, y),
        vel: Vec2::ZERO,
        size,
        kind: spec.kind,
        effect: spec.effect,
        behavior: spec.behavior,
        speed,
        state: AiState::Idle,
        cooldown: 0,
        elite,
        spawn_tick: ctx.tick,
        spawn_order: order,
        aggression,
        target: None,
        state_ticks: 0,
    })
}
