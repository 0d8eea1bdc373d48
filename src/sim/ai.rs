//! Hostile movement patterns
//!
//! Each hostile scrolls with the world and layers its behavior on top:
//! - Static: sinusoidal bob
//! - Tracking: follows the player's height while close (hysteresis)
//! - Ambush: winds up, dashes at a recorded target, retreats, cools down
//! - Swarm: same-kind neighbours form a ring around the player

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::particles::{Particle, ParticleKind, ParticlePool};
use super::state::{AiState, Hostile};
use super::tables::Behavior;
use crate::consts::GROUND_Y;

pub const TRACK_ENTER_DISTANCE: f32 = 220.0;
pub const TRACK_LEAVE_DISTANCE: f32 = 260.0;
pub const TRACK_RETARGET_TICKS: u32 = 30;

pub const AMBUSH_TRIGGER_DISTANCE: f32 = 200.0;
pub const AMBUSH_WINDUP_TICKS: u32 = 15;
/// Charging (wind-up + dash) lasts this long
pub const AMBUSH_CHARGE_TICKS: u32 = 45;
pub const AMBUSH_RETREAT_TICKS: u32 = 40;
pub const AMBUSH_COOLDOWN_TICKS: u32 = 120;
const AMBUSH_DASH_SPEED: f32 = 5.0;

pub const SWARM_NEIGHBOR_DISTANCE: f32 = 150.0;
pub const SWARM_DISPERSE_DISTANCE: f32 = 250.0;
const SWARM_RING_RADIUS: f32 = 60.0;
const SWARM_SLOTS: f32 = 5.0;

/// Per-tick inputs shared by every hostile
#[derive(Debug, Clone, Copy)]
pub struct AiContext {
    pub player: Vec2,
    /// World scroll this tick
    pub scroll: f32,
    pub tick: u64,
}

/// Move every hostile one tick and emit trail particles
pub fn update_hostiles(
    hostiles: &mut [Hostile],
    ctx: &AiContext,
    pool: &mut ParticlePool,
    rng: &mut Pcg32,
) {
    // Neighbour test runs against start-of-tick positions
    let has_neighbors: Vec<bool> = hostiles
        .iter()
        .map(|h| {
            hostiles.iter().any(|other| {
                other.id != h.id
                    && other.kind == h.kind
                    && other.pos.distance(h.pos) < SWARM_NEIGHBOR_DISTANCE
            })
        })
        .collect();

    for (hostile, neighbors) in hostiles.iter_mut().zip(has_neighbors) {
        hostile.state_ticks = hostile.state_ticks.saturating_add(1);
        hostile.cooldown = hostile.cooldown.saturating_sub(1);
        hostile.pos.x -= ctx.scroll * hostile.speed;

        match hostile.behavior {
            Behavior::Static => wobble(hostile, ctx.tick),
            Behavior::Tracking => update_tracking(hostile, ctx, rng),
            Behavior::Ambush => update_ambush(hostile, ctx),
            Behavior::Swarm => update_swarm(hostile, ctx, neighbors),
        }

        hostile.pos += hostile.vel;
        hostile.pos.y = hostile
            .pos
            .y
            .clamp(hostile.size, GROUND_Y - hostile.size);

        if hostile.kind.spec().emits_trail && ctx.tick % 3 == 0 {
            let vel = Vec2::new(rng.random_range(-0.5..0.5), rng.random_range(-0.5..0.5));
            pool.spawn(Particle::new(
                hostile.pos,
                vel,
                20,
                hostile.size * 0.3,
                ParticleKind::HostileTrail(hostile.kind),
            ));
        }
    }
}

/// Idle bob around the current height
fn wobble(hostile: &mut Hostile, tick: u64) {
    let (frequency, amplitude) = hostile.kind.spec().wobble;
    let age = tick.saturating_sub(hostile.spawn_tick) as f32;
    hostile.vel = Vec2::new(0.0, (age * frequency).sin() * amplitude);
}

fn update_tracking(hostile: &mut Hostile, ctx: &AiContext, rng: &mut Pcg32) {
    let distance = hostile.pos.distance(ctx.player);
    match hostile.state {
        AiState::Tracking => {
            if distance > TRACK_LEAVE_DISTANCE * hostile.aggression {
                hostile.enter(AiState::Idle);
                hostile.target = None;
                wobble(hostile, ctx.tick);
                return;
            }
            if hostile.target.is_none() || hostile.state_ticks % TRACK_RETARGET_TICKS == 0 {
                let offset = rng.random_range(-20.0..=20.0);
                hostile.target = Some(ctx.player + Vec2::new(0.0, offset));
            }
            let target_y = hostile.target.map_or(ctx.player.y, |t| t.y);
            let limit = 2.0 * hostile.speed;
            hostile.vel = Vec2::new(0.0, ((target_y - hostile.pos.y) * 0.05).clamp(-limit, limit));
        }
        _ => {
            if distance < TRACK_ENTER_DISTANCE * hostile.aggression {
                hostile.enter(AiState::Tracking);
                hostile.target = Some(ctx.player);
            }
            wobble(hostile, ctx.tick);
        }
    }
}

fn update_ambush(hostile: &mut Hostile, ctx: &AiContext) {
    match hostile.state {
        AiState::Charging => {
            if hostile.state_ticks >= AMBUSH_CHARGE_TICKS {
                hostile.enter(AiState::Retreating);
                return;
            }
            if hostile.state_ticks <= AMBUSH_WINDUP_TICKS {
                // Wind-up: hold position, drift back slightly
                hostile.vel = Vec2::new(0.3, 0.0);
                return;
            }
            let target = hostile.target.unwrap_or(ctx.player);
            let direction = (target - hostile.pos).normalize_or_zero();
            hostile.vel = direction * AMBUSH_DASH_SPEED * hostile.speed;
        }
        AiState::Retreating => {
            if hostile.state_ticks >= AMBUSH_RETREAT_TICKS {
                hostile.enter(AiState::Idle);
                hostile.target = None;
                hostile.vel = Vec2::ZERO;
                hostile.cooldown = if hostile.elite {
                    (AMBUSH_COOLDOWN_TICKS as f32 * 0.6) as u32
                } else {
                    AMBUSH_COOLDOWN_TICKS
                };
                return;
            }
            hostile.vel = hostile.vel * 0.9 + Vec2::new(0.3, 0.0);
        }
        _ => {
            let distance = hostile.pos.distance(ctx.player);
            if hostile.cooldown == 0
                && distance < AMBUSH_TRIGGER_DISTANCE * hostile.aggression
            {
                hostile.enter(AiState::Charging);
                hostile.target = Some(ctx.player);
                hostile.vel = Vec2::ZERO;
                return;
            }
            wobble(hostile, ctx.tick);
        }
    }
}

fn update_swarm(hostile: &mut Hostile, ctx: &AiContext, neighbors: bool) {
    let distance = hostile.pos.distance(ctx.player);
    if neighbors {
        if hostile.state != AiState::Attacking {
            hostile.enter(AiState::Attacking);
        }
    } else if distance > SWARM_DISPERSE_DISTANCE && hostile.state != AiState::Idle {
        hostile.enter(AiState::Idle);
        hostile.target = None;
    }

    if hostile.state != AiState::Attacking {
        wobble(hostile, ctx.tick);
        return;
    }
    let angle = hostile.spawn_order as f32 * TAU / SWARM_SLOTS;
    let slot = ctx.player + Vec2::new(angle.cos(), angle.sin()) * SWARM_RING_RADIUS;
    hostile.target = Some(slot);
    hostile.vel = ((slot - hostile.pos) * 0.05).clamp_length_max(3.0 * hostile.speed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tables::{HostileKind, StatusEffectKind};
    use rand::SeedableRng;

    fn hostile(kind: HostileKind, pos: Vec2, order: u32) -> Hostile {
        let spec = kind.spec();
        Hostile {
            id: order,
            pos,
            vel: Vec2::ZERO,
            size: spec.size,
            kind,
            effect: spec.effect,
            behavior: spec.behavior,
            speed: spec.speed_multiplier,
            state: AiState::Idle,
            cooldown: 0,
            elite: false,
            spawn_tick: 0,
            spawn_order: order,
            aggression: 1.0,
            target: None,
            state_ticks: 0,
        }
    }

    fn ctx(player: Vec2, tick: u64) -> AiContext {
        AiContext {
            player,
            scroll: 0.0,
            tick,
        }
    }

    #[test]
    fn test_ambush_cycle() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = ParticlePool::new(100);
        let player = Vec2::new(100.0, 300.0);
        let mut hostiles = vec![hostile(HostileKind::Sprite, Vec2::new(250.0, 300.0), 0)];

        update_hostiles(&mut hostiles, &ctx(player, 0), &mut pool, &mut rng);
        assert_eq!(hostiles[0].state, AiState::Charging);

        let mut tick = 1;
        while hostiles[0].state == AiState::Charging {
            update_hostiles(&mut hostiles, &ctx(player, tick), &mut pool, &mut rng);
            tick += 1;
        }
        assert_eq!(hostiles[0].state, AiState::Retreating);
        assert_eq!(tick, 1 + AMBUSH_CHARGE_TICKS as u64);

        while hostiles[0].state == AiState::Retreating {
            update_hostiles(&mut hostiles, &ctx(player, tick), &mut pool, &mut rng);
            tick += 1;
        }
        assert_eq!(hostiles[0].state, AiState::Idle);
        assert_eq!(hostiles[0].cooldown, AMBUSH_COOLDOWN_TICKS);
    }

    #[test]
    fn test_ambush_waits_for_cooldown() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = ParticlePool::new(0);
        let player = Vec2::new(100.0, 300.0);
        let mut h = hostile(HostileKind::Sprite, Vec2::new(200.0, 300.0), 0);
        h.cooldown = 10;
        let mut hostiles = vec![h];
        update_hostiles(&mut hostiles, &ctx(player, 0), &mut pool, &mut rng);
        assert_eq!(hostiles[0].state, AiState::Idle);
    }

    #[test]
    fn test_tracking_hysteresis() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = ParticlePool::new(0);
        let mut hostiles = vec![hostile(HostileKind::Ghost, Vec2::new(300.0, 300.0), 0)];

        update_hostiles(&mut hostiles, &ctx(Vec2::new(100.0, 300.0), 0), &mut pool, &mut rng);
        assert_eq!(hostiles[0].state, AiState::Tracking);

        // Inside the hysteresis band: stays tracking
        let x = hostiles[0].pos.x;
        let player = Vec2::new(x - 240.0, hostiles[0].pos.y);
        update_hostiles(&mut hostiles, &ctx(player, 1), &mut pool, &mut rng);
        assert_eq!(hostiles[0].state, AiState::Tracking);

        let player = Vec2::new(hostiles[0].pos.x - 400.0, hostiles[0].pos.y);
        update_hostiles(&mut hostiles, &ctx(player, 2), &mut pool, &mut rng);
        assert_eq!(hostiles[0].state, AiState::Idle);
    }

    #[test]
    fn test_swarm_forms_with_neighbors() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = ParticlePool::new(0);
        let player = Vec2::new(100.0, 300.0);
        let mut hostiles = vec![
            hostile(HostileKind::Wisp, Vec2::new(400.0, 300.0), 0),
            hostile(HostileKind::Wisp, Vec2::new(450.0, 320.0), 1),
        ];
        update_hostiles(&mut hostiles, &ctx(player, 1), &mut pool, &mut rng);
        assert!(hostiles.iter().all(|h| h.state == AiState::Attacking));
        assert!(hostiles[0].target != hostiles[1].target);
    }

    #[test]
    fn test_lone_far_swarm_member_idles() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = ParticlePool::new(0);
        let mut h = hostile(HostileKind::Wisp, Vec2::new(450.0, 300.0), 0);
        h.state = AiState::Attacking;
        let mut hostiles = vec![h];
        update_hostiles(&mut hostiles, &ctx(Vec2::new(100.0, 300.0), 1), &mut pool, &mut rng);
        assert_eq!(hostiles[0].state, AiState::Idle);
    }

    #[test]
    fn test_height_clamped_and_trails_emitted() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = ParticlePool::new(100);
        let mut h = hostile(HostileKind::Wisp, Vec2::new(450.0, GROUND_Y + 50.0), 0);
        h.effect = StatusEffectKind::Vertigo;
        let mut hostiles = vec![h];
        update_hostiles(&mut hostiles, &ctx(Vec2::new(100.0, 0.0), 3), &mut pool, &mut rng);
        assert!(hostiles[0].pos.y <= GROUND_Y - hostiles[0].size);
        assert_eq!(pool.len(), 1);
    }
}
