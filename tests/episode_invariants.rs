//! Whole-episode invariants under arbitrary seeds, configs and inputs

use proptest::prelude::*;
use sky_pecker::consts::*;
use sky_pecker::sim::tables::{ARCHETYPES, StatusEffectKind};
use sky_pecker::sim::{Player, status::StatusController};
use sky_pecker::{
    EpisodePhase, GameMode, RunConfig, Simulation, SkillTier, TickInput, thrust_strength_for_hold,
};

fn mode() -> impl Strategy<Value = GameMode> {
    prop_oneof![Just(GameMode::Normal), Just(GameMode::Relaxed)]
}

fn skill() -> impl Strategy<Value = SkillTier> {
    prop_oneof![
        Just(SkillTier::Novice),
        Just(SkillTier::Regular),
        Just(SkillTier::Veteran),
        Just(SkillTier::Expert),
    ]
}

fn config() -> impl Strategy<Value = RunConfig> {
    (any::<u64>(), 0..ARCHETYPES.len(), mode(), skill(), any::<bool>(), any::<bool>()).prop_map(
        |(seed, archetype, mode, skill, continue_available, relaxed_hostiles)| RunConfig {
            seed,
            archetype,
            mode,
            skill,
            continue_available,
            relaxed_hostiles,
            ..Default::default()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn episode_invariants_hold(
        config in config(),
        pattern in prop::collection::vec(prop::option::of(0.0f32..3.0), 1..64),
        autopilot in any::<bool>(),
    ) {
        let mut sim = Simulation::new(config);
        sim.reset();
        let curve = *sim.progression.curve();
        let mut last_score = 0;

        for i in 0..2_000 {
            if sim.phase == EpisodePhase::AwaitingContinueDecision {
                prop_assert!(sim.continue_run());
            }
            let input = TickInput {
                thrust: pattern[i % pattern.len()],
                autopilot,
                ..Default::default()
            };
            let hud = sim.tick(&input);

            prop_assert!((0.0..=100.0).contains(&hud.gauge_percent));
            prop_assert!(hud.difficulty >= 0.0 && hud.difficulty <= curve.difficulty_cap);
            prop_assert!(hud.speed >= curve.speed_start && hud.speed <= curve.speed_cap);
            prop_assert!(hud.score >= last_score);
            last_score = hud.score;

            if let Some(effect) = hud.status_effect {
                let spec = effect.kind.spec();
                prop_assert!(effect.remaining > 0);
                prop_assert!(effect.remaining <= spec.duration * 2);
            }
            if let Some(power_up) = hud.power_up {
                prop_assert!(power_up.remaining > 0);
            }
            prop_assert!(hud.particle_count <= sim.particles.cap());
            prop_assert!(hud.hostile_count <= 6);

            for gate in &sim.world.obstacles {
                prop_assert!(gate.gap_bottom - gate.gap_top > 0.0);
                prop_assert!(gate.gap_top >= 0.0);
                prop_assert!(gate.gap_bottom <= GROUND_Y);
            }
            for hostile in &sim.world.hostiles {
                prop_assert!(hostile.pos.y >= hostile.size);
                prop_assert!(hostile.pos.y <= GROUND_Y - hostile.size);
            }
            if let Some(player) = sim.player.as_ref() {
                prop_assert!(player.vel.abs() <= player.base.speed_cap);
            }

            if sim.config.mode.is_relaxed() {
                prop_assert!(hud.power_up.is_none());
                prop_assert_eq!(hud.combo, 0);
                prop_assert!(sim.abilities.iter().all(|a| !matches!(a.name(), "phase" | "revive")));
                if !sim.config.relaxed_hostiles {
                    prop_assert_eq!(hud.hostile_count, 0);
                }
            }
        }
    }

    #[test]
    fn status_effects_restore_base_exactly(
        archetype in 0..ARCHETYPES.len(),
        kind in prop::sample::select(StatusEffectKind::ALL.to_vec()),
        early_reapply in any::<bool>(),
    ) {
        let mut player = Player::new(archetype, &ARCHETYPES[archetype]);
        let base = player.base;
        let mut status = StatusController::new();
        status.try_apply(kind, &mut player);
        if early_reapply {
            status.advance(&mut player);
            status.try_apply(kind, &mut player);
        }
        for _ in 0..kind.spec().duration * 2 + 1 {
            status.advance(&mut player);
        }
        prop_assert!(!status.is_active());
        prop_assert_eq!(player.gravity, base.gravity);
        prop_assert_eq!(player.thrust, base.thrust);
        prop_assert_eq!(player.speed_cap, base.speed_cap);
    }

    #[test]
    fn hold_strength_in_thrust_range(ms in -1_000.0f32..10_000.0) {
        let strength = thrust_strength_for_hold(ms);
        prop_assert!(strength >= MIN_THRUST_STRENGTH);
        prop_assert!(strength <= 1.0);
    }
}
