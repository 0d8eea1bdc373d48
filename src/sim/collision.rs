//! Collision geometry and hit resolution
//!
//! Geometry is plain circle/rectangle tests against the forgiving player
//! hitbox. What a hit *means* is decided by [`resolve_hit`]: shield and
//! immunity first, then the archetype's defensive abilities in priority
//! order, then the one free hit per episode, and only then a fatal hit.

use std::fmt;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::power::PowerController;
use super::state::{Collectible, Obstacle, Player, RunState};
use super::tables::{Archetype, PowerUpKind, StatusEffectKind};
use crate::consts::*;

/// Shield granted by a revive
pub const REVIVE_SHIELD_TICKS: u32 = 120;
pub const MAGNET_RADIUS: f32 = 120.0;
const MAGNET_STRENGTH: f32 = 0.15;
/// Extra pickup reach while Magnet is active
pub const MAGNET_PICKUP_BONUS: f32 = 30.0;

/// Which edge of the playfield was touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Ceiling,
    Ground,
}

pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// Does a circle overlap the gate horizontally at all
pub fn overlaps_gate_columns(center: Vec2, radius: f32, obstacle: &Obstacle) -> bool {
    center.x + radius > obstacle.x && center.x - radius < obstacle.x + obstacle.width
}

/// Circle against the solid parts of a gate. Frozen or spent gates never
/// collide.
pub fn circle_hits_gate(center: Vec2, radius: f32, obstacle: &Obstacle) -> bool {
    if obstacle.frozen || obstacle.spent || !overlaps_gate_columns(center, radius, obstacle) {
        return false;
    }
    center.y - radius < obstacle.gap_top || center.y + radius > obstacle.gap_bottom
}

/// Pull coins within `MAGNET_RADIUS` toward `center`, harder the closer
/// they are
pub fn magnet_pull(center: Vec2, coins: &mut [Collectible]) {
    for coin in coins.iter_mut().filter(|c| !c.collected) {
        let delta = center - coin.pos;
        let distance = delta.length();
        if distance > 0.0 && distance < MAGNET_RADIUS {
            coin.pos += delta * MAGNET_STRENGTH * (1.0 - distance / MAGNET_RADIUS);
        }
    }
}

pub fn boundary_contact(y: f32, radius: f32) -> Option<Boundary> {
    if y + radius > GROUND_Y {
        Some(Boundary::Ground)
    } else if y - radius < 0.0 {
        Some(Boundary::Ceiling)
    } else {
        None
    }
}

/// What struck the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitSource {
    /// Index into the world's obstacle list
    Obstacle { index: usize },
    Boundary(Boundary),
    Hostile { effect: StatusEffectKind },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitContext {
    pub source: HitSource,
    pub tick: u64,
    /// No free hit left; this would end the run
    pub would_be_fatal: bool,
}

/// How an ability consumed a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    Phased,
    DebuffNegated,
    Froze,
    Revived,
}

/// A capability that may consume a hit before default handling
pub trait DefensiveAbility: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Return `Some` if the hit is consumed
    fn try_intercept(&mut self, ctx: &HitContext, rng: &mut Pcg32) -> Option<Interception>;
}

/// Chance to slip through a gate, with a cooldown between attempts
#[derive(Debug, Clone)]
pub struct PhaseShift {
    pub chance: f32,
    pub cooldown: u64,
    last_used: Option<u64>,
}

impl PhaseShift {
    pub fn new(chance: f32, cooldown: u32) -> Self {
        Self {
            chance: chance.clamp(0.0, 1.0),
            cooldown: cooldown as u64,
            last_used: None,
        }
    }
}

impl DefensiveAbility for PhaseShift {
    fn name(&self) -> &'static str {
        "phase"
    }

    fn try_intercept(&mut self, ctx: &HitContext, rng: &mut Pcg32) -> Option<Interception> {
        if !matches!(ctx.source, HitSource::Obstacle { .. }) {
            return None;
        }
        if let Some(last) = self.last_used {
            if ctx.tick.saturating_sub(last) < self.cooldown {
                return None;
            }
        }
        // Every attempt starts the cooldown, hit or miss
        self.last_used = Some(ctx.tick);
        rng.random_bool(self.chance as f64).then_some(Interception::Phased)
    }
}

/// Shrug off the first hostile contact
#[derive(Debug, Clone, Default)]
pub struct NegateDebuff {
    used: bool,
}

impl DefensiveAbility for NegateDebuff {
    fn name(&self) -> &'static str {
        "negate-debuff"
    }

    fn try_intercept(&mut self, ctx: &HitContext, _rng: &mut Pcg32) -> Option<Interception> {
        if self.used || !matches!(ctx.source, HitSource::Hostile { .. }) {
            return None;
        }
        self.used = true;
        Some(Interception::DebuffNegated)
    }
}

/// Freeze the first thing that hits you
#[derive(Debug, Clone, Default)]
pub struct FreezeOnHit {
    used: bool,
}

impl DefensiveAbility for FreezeOnHit {
    fn name(&self) -> &'static str {
        "freeze"
    }

    fn try_intercept(&mut self, ctx: &HitContext, _rng: &mut Pcg32) -> Option<Interception> {
        if self.used || matches!(ctx.source, HitSource::Boundary(_)) {
            return None;
        }
        self.used = true;
        Some(Interception::Froze)
    }
}

/// Survive one otherwise fatal hit
#[derive(Debug, Clone, Default)]
pub struct ReviveOnce {
    used: bool,
}

impl DefensiveAbility for ReviveOnce {
    fn name(&self) -> &'static str {
        "revive"
    }

    fn try_intercept(&mut self, ctx: &HitContext, _rng: &mut Pcg32) -> Option<Interception> {
        if self.used || !ctx.would_be_fatal {
            return None;
        }
        self.used = true;
        Some(Interception::Revived)
    }
}

/// Build the archetype's abilities in priority order. The relaxed ruleset
/// has no phasing and no revive.
pub fn abilities_for(archetype: &Archetype, relaxed: bool) -> Vec<Box<dyn DefensiveAbility>> {
    let set = archetype.abilities;
    let mut abilities: Vec<Box<dyn DefensiveAbility>> = Vec::new();
    if set.phase_chance > 0.0 && !relaxed {
        abilities.push(Box::new(PhaseShift::new(set.phase_chance, set.ability_cooldown)));
    }
    if set.negate_debuff_once {
        abilities.push(Box::new(NegateDebuff::default()));
    }
    if set.freeze_on_hit {
        abilities.push(Box::new(FreezeOnHit::default()));
    }
    if set.revive_once && !relaxed {
        abilities.push(Box::new(ReviveOnce::default()));
    }
    abilities
}

/// Result of a hit after shields and abilities had their say
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Shield or recovery immunity; not an infraction
    Absorbed,
    Intercepted(Interception),
    /// The episode's one forgiven infraction
    FreeHit,
    Fatal,
}

impl HitOutcome {
    pub fn is_fatal(&self) -> bool {
        matches!(self, HitOutcome::Fatal)
    }
}

/// Decide what a hit does and apply its effect on the player and run.
/// Source-specific consequences (freezing a gate, removing a hostile,
/// applying a status effect) are left to the caller.
pub fn resolve_hit(
    source: HitSource,
    tick: u64,
    player: &mut Player,
    run: &mut RunState,
    power: &mut PowerController,
    abilities: &mut [Box<dyn DefensiveAbility>],
    rng: &mut Pcg32,
) -> HitOutcome {
    if power.is_active(PowerUpKind::Shield) || player.immunity_ticks > 0 {
        return HitOutcome::Absorbed;
    }

    let ctx = HitContext {
        source,
        tick,
        would_be_fatal: !run.first_hit_available,
    };
    run.perfect_run = false;

    for ability in abilities.iter_mut() {
        let Some(interception) = ability.try_intercept(&ctx, rng) else {
            continue;
        };
        log::info!("Hit {:?} intercepted by {}", source, ability.name());
        match interception {
            Interception::Phased => player.grant_immunity(PHASE_TICKS),
            Interception::DebuffNegated | Interception::Froze => {
                player.grant_immunity(HIT_GRACE_TICKS)
            }
            Interception::Revived => {
                player.pos.y = GROUND_Y / 2.0;
                player.vel = player.thrust * 0.3;
                power.activate_for(PowerUpKind::Shield, REVIVE_SHIELD_TICKS);
            }
        }
        return HitOutcome::Intercepted(interception);
    }

    if run.first_hit_available {
        run.first_hit_available = false;
        player.grant_immunity(HIT_GRACE_TICKS);
        log::info!("Free hit used ({:?})", source);
        return HitOutcome::FreeHit;
    }

    HitOutcome::Fatal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tables::ARCHETYPES;
    use rand::SeedableRng;

    fn gate() -> Obstacle {
        Obstacle {
            id: 1,
            x: 90.0,
            width: OBSTACLE_WIDTH,
            gap_top: 200.0,
            gap_bottom: 400.0,
            scored: false,
            frozen: false,
            spent: false,
            variant: 0,
        }
    }

    struct Rig {
        player: Player,
        run: RunState,
        power: PowerController,
        abilities: Vec<Box<dyn DefensiveAbility>>,
        rng: Pcg32,
    }

    impl Rig {
        fn new(archetype: usize) -> Self {
            Self {
                player: Player::new(archetype, &ARCHETYPES[archetype]),
                run: RunState::default(),
                power: PowerController::new(false),
                abilities: abilities_for(&ARCHETYPES[archetype], false),
                rng: Pcg32::seed_from_u64(0),
            }
        }

        fn hit(&mut self, source: HitSource, tick: u64) -> HitOutcome {
            resolve_hit(
                source,
                tick,
                &mut self.player,
                &mut self.run,
                &mut self.power,
                &mut self.abilities,
                &mut self.rng,
            )
        }
    }

    #[test]
    fn test_gate_geometry() {
        let g = gate();
        assert!(!circle_hits_gate(Vec2::new(100.0, 300.0), 20.0, &g));
        assert!(circle_hits_gate(Vec2::new(100.0, 190.0), 20.0, &g));
        assert!(circle_hits_gate(Vec2::new(100.0, 395.0), 20.0, &g));
        assert!(!circle_hits_gate(Vec2::new(30.0, 100.0), 20.0, &g));
        let frozen = Obstacle { frozen: true, ..gate() };
        assert!(!circle_hits_gate(Vec2::new(100.0, 190.0), 20.0, &frozen));
    }

    #[test]
    fn test_magnet_pull_scales_with_distance() {
        let center = Vec2::new(100.0, 300.0);
        let coin = |x: f32| Collectible {
            id: 0,
            pos: Vec2::new(x, 300.0),
            radius: COIN_RADIUS,
            tier: crate::sim::tables::CoinTier::Bronze,
            collected: false,
            phase: 0.0,
        };
        let mut coins = vec![coin(160.0), coin(190.0), coin(300.0)];
        magnet_pull(center, &mut coins);
        // 60 away: nudged by 60 * 0.15 * 0.5
        assert!((coins[0].pos.x - 155.5).abs() < 1e-4);
        // 90 away: nudged by 90 * 0.15 * 0.25
        assert!((coins[1].pos.x - 186.625).abs() < 1e-4);
        // Out of range
        assert_eq!(coins[2].pos.x, 300.0);
    }

    #[test]
    fn test_spent_gate_never_collides() {
        let spent = Obstacle { spent: true, ..gate() };
        assert!(!circle_hits_gate(Vec2::new(100.0, 190.0), 20.0, &spent));
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(boundary_contact(GROUND_Y - 5.0, 10.0), Some(Boundary::Ground));
        assert_eq!(boundary_contact(5.0, 10.0), Some(Boundary::Ceiling));
        assert_eq!(boundary_contact(300.0, 10.0), None);
    }

    #[test]
    fn test_first_hit_is_forgiven_then_fatal() {
        let mut rig = Rig::new(0);
        let source = HitSource::Obstacle { index: 0 };

        assert_eq!(rig.hit(source, 10), HitOutcome::FreeHit);
        assert!(!rig.run.perfect_run);
        assert!(!rig.run.first_hit_available);
        assert_eq!(rig.player.immunity_ticks, HIT_GRACE_TICKS);

        // Still immune on the next tick
        assert_eq!(rig.hit(source, 11), HitOutcome::Absorbed);

        rig.player.immunity_ticks = 0;
        assert!(rig.hit(source, 90).is_fatal());
    }

    #[test]
    fn test_shield_absorbs_without_infraction() {
        let mut rig = Rig::new(0);
        rig.power.activate(PowerUpKind::Shield);
        let outcome = rig.hit(HitSource::Boundary(Boundary::Ground), 0);
        assert_eq!(outcome, HitOutcome::Absorbed);
        assert!(rig.run.perfect_run);
        assert!(rig.run.first_hit_available);
    }

    #[test]
    fn test_revive_only_on_fatal_hits() {
        let mut rig = Rig::new(4);
        let source = HitSource::Boundary(Boundary::Ground);

        assert_eq!(rig.hit(source, 0), HitOutcome::FreeHit);

        rig.player.immunity_ticks = 0;
        let outcome = rig.hit(source, 100);
        assert_eq!(outcome, HitOutcome::Intercepted(Interception::Revived));
        assert!(rig.power.is_active(PowerUpKind::Shield));
        assert_eq!(rig.player.vel, rig.player.thrust * 0.3);

        for _ in 0..=REVIVE_SHIELD_TICKS {
            rig.power.advance();
        }
        assert!(rig.hit(source, 400).is_fatal());
    }

    #[test]
    fn test_negate_only_for_hostiles() {
        let mut rig = Rig::new(2);
        let outcome = rig.hit(
            HitSource::Hostile {
                effect: StatusEffectKind::HeavyWings,
            },
            0,
        );
        assert_eq!(outcome, HitOutcome::Intercepted(Interception::DebuffNegated));
        assert!(!rig.run.perfect_run);
        assert!(rig.run.first_hit_available);
    }

    #[test]
    fn test_phase_respects_cooldown() {
        let mut phase = PhaseShift::new(1.0, 300);
        let mut rng = Pcg32::seed_from_u64(0);
        let ctx = |tick| HitContext {
            source: HitSource::Obstacle { index: 0 },
            tick,
            would_be_fatal: false,
        };
        assert_eq!(phase.try_intercept(&ctx(10), &mut rng), Some(Interception::Phased));
        assert_eq!(phase.try_intercept(&ctx(200), &mut rng), None);
        assert_eq!(phase.try_intercept(&ctx(310), &mut rng), Some(Interception::Phased));
        let boundary = HitContext {
            source: HitSource::Boundary(Boundary::Ceiling),
            tick: 1_000,
            would_be_fatal: false,
        };
        assert_eq!(phase.try_intercept(&boundary, &mut rng), None);
    }

    #[test]
    fn test_ability_order_follows_priority() {
        let names: Vec<_> = abilities_for(&ARCHETYPES[3], false)
            .iter()
            .map(|a| a.name())
            .collect();
        assert_eq!(names, vec!["phase"]);
        assert!(abilities_for(&ARCHETYPES[0], false).is_empty());
        let frost = abilities_for(&ARCHETYPES[5], false);
        assert_eq!(frost[0].name(), "freeze");
    }

    #[test]
    fn test_relaxed_drops_phase_and_revive() {
        assert!(abilities_for(&ARCHETYPES[3], true).is_empty());
        assert!(abilities_for(&ARCHETYPES[4], true).is_empty());
        let tank: Vec<_> = abilities_for(&ARCHETYPES[2], true)
            .iter()
            .map(|a| a.name())
            .collect();
        assert_eq!(tank, vec!["negate-debuff"]);
    }
}
