//! Fixed timestep simulation driver
//!
//! Owns every controller and advances the episode one tick at a time. The
//! host drives it through [`Simulation::tick`] and the few control calls
//! below; pausing and the continue decision are phases, not blocking calls.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::ai::{AiContext, update_hostiles};
use super::collision::{
    Boundary, DefensiveAbility, HitOutcome, HitSource, Interception, MAGNET_PICKUP_BONUS,
    abilities_for, boundary_contact, circle_hits_gate, circles_overlap, magnet_pull, resolve_hit,
};
use super::events::{AchievementKey, EpisodeReport, GameEvent, HudSnapshot};
use super::governor::PerformanceGovernor;
use super::particles::{Particle, ParticleKind, ParticlePool};
use super::power::PowerController;
use super::progression::Progression;
use super::scene::SceneManager;
use super::spawn::{SpawnContext, Spawner};
use super::state::{EpisodePhase, Player, RunState, World};
use super::status::{ApplyOutcome, StatusController};
use super::tables::{ARCHETYPES, PowerUpKind, StatusEffectKind, Weather, archetype};
use super::tracker::BehaviorTracker;
use crate::consts::*;
use crate::settings::RunConfig;

/// Shield granted when the host accepts a continue
pub const CONTINUE_SHIELD_TICKS: u32 = 180;

/// Score thresholds that report achievement progress
const SCORE_ACHIEVEMENTS: [(u32, AchievementKey); 4] = [
    (1, AchievementKey::FirstFlight),
    (25, AchievementKey::Survivor),
    (50, AchievementKey::Perfectionist),
    (100, AchievementKey::Legendary),
];
const UNTOUCHABLE_SCORE: u32 = 15;
const ZEN_MASTER_SCORE: u32 = 50;
const COMBO_KING: u32 = 10;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Thrust with this strength (see `thrust_strength_for_hold`)
    pub thrust: Option<f32>,
    /// Host frame time, fed to the performance governor
    pub frame_time: Option<Duration>,
    /// Idle/demo mode - the flyer steers itself toward the next gap
    pub autopilot: bool,
}

impl TickInput {
    pub fn thrust(strength: f32) -> Self {
        Self {
            thrust: Some(strength),
            ..Default::default()
        }
    }
}

/// One episode's worth of simulation state
#[derive(Debug)]
pub struct Simulation {
    pub config: RunConfig,
    pub phase: EpisodePhase,
    pub rng: Pcg32,
    pub player: Option<Player>,
    pub run: RunState,
    pub world: World,
    pub status: StatusController,
    pub power: PowerController,
    pub progression: Progression,
    pub scenes: SceneManager,
    pub tracker: BehaviorTracker,
    pub spawner: Spawner,
    pub particles: ParticlePool,
    pub governor: PerformanceGovernor,
    /// Defensive abilities in priority order
    pub abilities: Vec<Box<dyn DefensiveAbility>>,
    events: Vec<GameEvent>,
    last_thrust_tick: Option<u64>,
    capture_requested: bool,
}

impl Simulation {
    /// Build a simulation with a governor and particle pool sized from the
    /// config's quality preset. Call [`Simulation::reset`] to start.
    pub fn new(config: RunConfig) -> Self {
        let governor = PerformanceGovernor::new(config.quality);
        let particles = ParticlePool::new(governor.particle_cap());
        Self::with_parts(config, governor, particles)
    }

    /// Build a simulation around host-supplied governor and particle pool
    pub fn with_parts(
        config: RunConfig,
        governor: PerformanceGovernor,
        particles: ParticlePool,
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let relaxed = config.mode.is_relaxed();
        Self {
            phase: EpisodePhase::Resetting,
            player: None,
            run: RunState::default(),
            world: World::default(),
            status: StatusController::new(),
            power: PowerController::new(relaxed),
            progression: Progression::new(config.mode, config.skill),
            scenes: SceneManager::new(relaxed, &mut rng),
            tracker: BehaviorTracker::default(),
            spawner: Spawner::new(),
            particles,
            governor,
            abilities: Vec::new(),
            events: Vec::new(),
            last_thrust_tick: None,
            capture_requested: false,
            rng,
            config,
        }
    }

    /// Start a fresh episode from the current config
    pub fn reset(&mut self) {
        let relaxed = self.config.mode.is_relaxed();
        let index = if self.config.archetype < ARCHETYPES.len() {
            self.config.archetype
        } else {
            log::warn!(
                "Archetype index {} out of range; using {}",
                self.config.archetype,
                ARCHETYPES[0].name
            );
            0
        };
        let archetype = archetype(index);

        self.rng = Pcg32::seed_from_u64(self.config.seed);
        let player = Player::new(index, archetype);
        self.tracker.reset(player.pos.y);
        self.player = Some(player);
        self.run = RunState::default();
        self.world.clear();
        self.particles.clear();
        self.particles.set_cap(self.governor.particle_cap());
        self.status = StatusController::new();
        self.power = PowerController::new(relaxed);
        self.progression = Progression::new(self.config.mode, self.config.skill);
        self.scenes = SceneManager::new(relaxed, &mut self.rng);
        self.spawner = Spawner::new();
        self.abilities = abilities_for(archetype, relaxed);
        self.events.clear();
        self.last_thrust_tick = None;

        if let Some(kind) = self.config.starting_power_up {
            if relaxed || !kind.offered_at_start() {
                log::warn!("Starting power-up {kind:?} ignored");
            } else if self.power.activate(kind) {
                self.note_power_up(kind);
            }
        }

        self.note_weather(self.scenes.weather());
        self.phase = EpisodePhase::Running;
        log::info!(
            "Episode start: archetype={} mode={:?} seed={}",
            archetype.name,
            self.config.mode,
            self.config.seed
        );
    }

    /// Advance the simulation by one fixed timestep
    pub fn tick(&mut self, input: &TickInput) -> HudSnapshot {
        if let Some(frame_time) = input.frame_time {
            self.governor.record_frame(frame_time);
            self.particles.set_cap(self.governor.particle_cap());
        }
        if self.phase != EpisodePhase::Running || self.player.is_none() {
            return self.snapshot();
        }

        self.run.elapsed_ticks += 1;
        let tick = self.run.elapsed_ticks;

        let thrust = if input.autopilot {
            self.autopilot_thrust()
        } else {
            input.thrust
        };
        if let Some(player) = self.player.as_mut() {
            self.status.advance(player);
            if let Some(strength) = thrust {
                let ready = self
                    .last_thrust_tick
                    .is_none_or(|last| tick - last >= THRUST_RETRIGGER_TICKS);
                if ready {
                    player.apply_thrust(strength);
                    player.vel *= self.status.thrust_direction();
                    self.last_thrust_tick = Some(tick);
                }
            }
            player.integrate();
        }

        self.progression.advance();
        if let Some(weather) = self.scenes.advance() {
            self.note_weather(weather);
        }
        self.scenes.spawn_weather(&mut self.particles, &mut self.rng);

        let ctx = SpawnContext {
            tick,
            difficulty: self.progression.difficulty(),
            relaxed: self.config.mode.is_relaxed(),
            slow_active: self.power.is_active(PowerUpKind::Slow),
            hostiles_enabled: self.config.hostiles_enabled(),
            hostile_cap: self.governor.hostile_cap(),
            tracker: &self.tracker,
        };
        self.spawner.advance(&ctx, &mut self.rng, &mut self.world);

        let player_pos = self.player.as_ref().map_or(Vec2::ZERO, |p| p.pos);
        self.tracker.record(player_pos.y);

        let scroll = self.scroll_speed();
        self.move_world(scroll, player_pos, tick);

        if self.power.is_active(PowerUpKind::Magnet) {
            magnet_pull(player_pos, &mut self.world.collectibles);
        }

        self.collide_hostiles(tick);
        self.collide_obstacles(tick);
        self.collide_boundaries(tick);
        self.collect_coins();

        self.power.advance();
        self.run.advance_combo();
        self.emit_trail(tick, scroll);
        self.run.decay_shake();
        self.run.shake(self.status.shake_intensity());

        if self.run.fatal_pending {
            self.run.fatal_pending = false;
            self.handle_fatal();
        }
        self.snapshot()
    }

    /// Current world scroll per tick
    pub fn scroll_speed(&self) -> f32 {
        self.progression.scroll_speed(self.power.scroll_factor())
    }

    fn move_world(&mut self, scroll: f32, player_pos: Vec2, tick: u64) {
        for obstacle in self.world.obstacles.iter_mut() {
            obstacle.x -= scroll;
        }
        for coin in self.world.collectibles.iter_mut() {
            coin.pos.x -= scroll;
            coin.phase = (coin.phase + 0.1) % std::f32::consts::TAU;
        }
        let ai = AiContext {
            player: player_pos,
            scroll,
            tick,
        };
        update_hostiles(
            &mut self.world.hostiles,
            &ai,
            &mut self.particles,
            &mut self.rng,
        );
        self.particles.scroll(scroll);
        self.particles.advance();
        self.world.cull();
    }

    /// Thrust when below the centre of the next unpassed gap
    fn autopilot_thrust(&self) -> Option<f32> {
        let player = self.player.as_ref()?;
        let target = self
            .world
            .obstacles
            .iter()
            .filter(|o| o.x + o.width >= player.pos.x)
            .min_by(|a, b| a.x.total_cmp(&b.x))
            .map_or(GROUND_Y / 2.0, |o| o.gap_center() + 20.0);
        let below = player.pos.y > target;
        let rising = player.vel < -2.0;
        (below && !rising).then_some(1.0)
    }

    fn collide_hostiles(&mut self, tick: u64) {
        let shrunk = self.power.is_active(PowerUpKind::Shrink);
        let mut i = 0;
        while i < self.world.hostiles.len() {
            if self.run.fatal_pending {
                return;
            }
            let Some(player) = self.player.as_mut() else {
                return;
            };
            let hostile = &self.world.hostiles[i];
            let radius = player.collision_radius(shrunk);
            if !circles_overlap(player.pos, radius, hostile.pos, hostile.size) {
                i += 1;
                continue;
            }

            let hostile = self.world.hostiles.remove(i);
            let shielded = self.power.is_active(PowerUpKind::Shield);
            let outcome = resolve_hit(
                HitSource::Hostile {
                    effect: hostile.effect,
                },
                tick,
                player,
                &mut self.run,
                &mut self.power,
                &mut self.abilities,
                &mut self.rng,
            );
            log::debug!("Hostile {:?} contact: {:?}", hostile.kind, outcome);

            match outcome {
                HitOutcome::Absorbed if shielded => {
                    self.run.enemies_defeated += 1;
                    self.particles.burst(
                        &mut self.rng,
                        hostile.pos,
                        10,
                        ParticleKind::Burst,
                        3.0,
                        25,
                    );
                }
                HitOutcome::Intercepted(Interception::Froze) => {
                    self.run.enemies_defeated += 1;
                    self.particles.burst(
                        &mut self.rng,
                        hostile.pos,
                        12,
                        ParticleKind::Freeze,
                        2.5,
                        40,
                    );
                }
                HitOutcome::Intercepted(Interception::DebuffNegated | Interception::Phased) => {}
                // Recovery immunity stops an infraction, not the debuff
                HitOutcome::Absorbed
                | HitOutcome::FreeHit
                | HitOutcome::Fatal
                | HitOutcome::Intercepted(Interception::Revived) => {
                    if self.status.try_apply(hostile.effect, player) != ApplyOutcome::Blocked {
                        self.particles.burst(
                            &mut self.rng,
                            player.pos,
                            12,
                            ParticleKind::Debuff(hostile.effect),
                            2.0,
                            30,
                        );
                        if hostile.effect == StatusEffectKind::ScreenLurch {
                            self.run.shake(hostile.effect.spec().magnitude);
                        }
                    }
                }
            }
            self.after_hit(outcome);
        }
    }

    fn collide_obstacles(&mut self, tick: u64) {
        let shrunk = self.power.is_active(PowerUpKind::Shrink);
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let radius = player.collision_radius(shrunk);

        if !self.run.fatal_pending {
            let struck = self
                .world
                .obstacles
                .iter()
                .position(|o| circle_hits_gate(player.pos, radius, o));
            if let Some(index) = struck {
                let outcome = resolve_hit(
                    HitSource::Obstacle { index },
                    tick,
                    player,
                    &mut self.run,
                    &mut self.power,
                    &mut self.abilities,
                    &mut self.rng,
                );
                let obstacle = &mut self.world.obstacles[index];
                match outcome {
                    HitOutcome::Intercepted(Interception::Froze) => {
                        obstacle.frozen = true;
                        let center = Vec2::new(obstacle.x + obstacle.width / 2.0, player.pos.y);
                        self.particles.burst(
                            &mut self.rng,
                            center,
                            16,
                            ParticleKind::Freeze,
                            2.5,
                            40,
                        );
                    }
                    HitOutcome::Intercepted(_) | HitOutcome::FreeHit => obstacle.spent = true,
                    HitOutcome::Absorbed | HitOutcome::Fatal => {}
                }
                self.after_hit(outcome);
            }
        }

        // Scoring: a gate counts once its trailing edge passes the player
        let Some(player_x) = self.player.as_ref().map(|p| p.pos.x) else {
            return;
        };
        let mut passed = 0;
        for obstacle in self.world.obstacles.iter_mut() {
            if !obstacle.scored && obstacle.x + obstacle.width < player_x {
                obstacle.scored = true;
                passed += 1;
            }
        }
        for _ in 0..passed {
            self.add_point();
        }
    }

    fn collide_boundaries(&mut self, tick: u64) {
        if self.run.fatal_pending {
            return;
        }
        let shrunk = self.power.is_active(PowerUpKind::Shrink);
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let radius = player.collision_radius(shrunk);
        let Some(boundary) = boundary_contact(player.pos.y, radius) else {
            return;
        };

        match boundary {
            Boundary::Ground => player.pos.y = GROUND_Y - radius,
            Boundary::Ceiling => player.pos.y = radius,
        }
        let outcome = resolve_hit(
            HitSource::Boundary(boundary),
            tick,
            player,
            &mut self.run,
            &mut self.power,
            &mut self.abilities,
            &mut self.rng,
        );
        if !outcome.is_fatal() && outcome != HitOutcome::Intercepted(Interception::Revived) {
            player.vel = match boundary {
                Boundary::Ground => player.thrust * 0.5,
                Boundary::Ceiling => 0.0,
            };
        }
        self.after_hit(outcome);
    }

    fn collect_coins(&mut self) {
        let shrunk = self.power.is_active(PowerUpKind::Shrink);
        let magnet = self.power.is_active(PowerUpKind::Magnet);
        let Some(player) = self.player.as_ref() else {
            return;
        };
        let reach = player.display_radius(shrunk) + if magnet { MAGNET_PICKUP_BONUS } else { 0.0 };
        let center = player.pos;
        let gauge_multiplier = player.gauge_multiplier;
        let relaxed = self.config.mode.is_relaxed();

        let mut picked = Vec::new();
        for coin in self.world.collectibles.iter_mut() {
            if !coin.collected && circles_overlap(center, reach, coin.pos, coin.radius) {
                coin.collected = true;
                picked.push((coin.tier.value(), coin.pos));
            }
        }

        for (value, pos) in picked {
            self.run.coins_collected += value;
            self.events.push(GameEvent::CoinCollected { value });
            self.particles
                .burst(&mut self.rng, pos, 8, ParticleKind::Burst, 2.0, 25);
            if relaxed {
                continue;
            }

            self.run.combo += 1;
            self.run.combo_timer = COMBO_WINDOW_TICKS;
            if self.run.combo == COMBO_KING {
                self.progress(AchievementKey::ComboKing, self.run.combo);
            }
            let mut gain = GAUGE_PER_COIN * gauge_multiplier;
            if self.status.is_active() {
                gain *= 0.5;
            }
            if let Some(kind) = self.power.add_gauge(gain, &mut self.rng) {
                self.note_power_up(kind);
            }
        }
        self.world.collectibles.retain(|c| !c.collected);
    }

    /// Report a power-up that just started, whatever granted it
    fn note_power_up(&mut self, kind: PowerUpKind) {
        self.run.power_ups_used += 1;
        self.events.push(GameEvent::PowerUpUsed(kind));
        self.progress(AchievementKey::PowerMaster, 1);
        if kind == PowerUpKind::Speed {
            self.progress(AchievementKey::SpeedDemon, 1);
        }
    }

    /// Shared bookkeeping after any resolved hit
    fn after_hit(&mut self, outcome: HitOutcome) {
        let Some(pos) = self.player.as_ref().map(|p| p.pos) else {
            return;
        };
        match outcome {
            HitOutcome::Absorbed => {}
            HitOutcome::Intercepted(Interception::Phased) => {
                self.particles
                    .burst(&mut self.rng, pos, 10, ParticleKind::Phase, 1.5, 20);
            }
            HitOutcome::Intercepted(Interception::Revived) => {
                if self.power.is_active(PowerUpKind::Shield) {
                    self.note_power_up(PowerUpKind::Shield);
                }
                self.run.shake(12.0);
                self.particles
                    .burst(&mut self.rng, pos, 30, ParticleKind::Revive, 4.0, 45);
            }
            HitOutcome::Intercepted(_) => self.run.shake(5.0),
            HitOutcome::FreeHit => self.run.shake(10.0),
            HitOutcome::Fatal => {
                self.run.shake(20.0);
                self.run.fatal_pending = true;
            }
        }
    }

    fn add_point(&mut self) {
        self.run.score += 1;
        let score = self.run.score;

        for (threshold, key) in SCORE_ACHIEVEMENTS {
            if score == threshold {
                self.progress(key, score);
            }
        }
        if score >= UNTOUCHABLE_SCORE && self.run.perfect_run {
            self.progress(AchievementKey::Untouchable, 1);
        }
        if self.config.mode.is_relaxed() && score == ZEN_MASTER_SCORE {
            self.progress(AchievementKey::ZenMaster, score);
        }

        if score - self.run.last_milestone >= MILESTONE_SCORE_INTERVAL {
            self.run.last_milestone = score;
            self.run.milestones_reached += 1;
            self.run.coins_collected += MILESTONE_COIN_REWARD;
            self.events.push(GameEvent::MilestoneReached {
                score,
                coins: MILESTONE_COIN_REWARD,
            });
            self.progress(AchievementKey::MilestoneHunter, 1);
            let center = Vec2::new(PLAYFIELD_WIDTH / 2.0, PLAYFIELD_HEIGHT / 3.0);
            self.particles
                .burst(&mut self.rng, center, 40, ParticleKind::Milestone, 5.0, 60);
            log::info!("Milestone reached at score {score}");
        }
    }

    fn note_weather(&mut self, weather: Weather) {
        if self.run.weather_seen.insert(weather) {
            self.events.push(GameEvent::WeatherEncountered(weather));
            let seen = self.run.weather_seen.len() as u32;
            self.progress(AchievementKey::WeatherWizard, seen);
        }
    }

    fn progress(&mut self, key: AchievementKey, amount: u32) {
        self.events
            .push(GameEvent::AchievementProgress { key, amount });
    }

    fn emit_trail(&mut self, tick: u64, scroll: f32) {
        let Some(style) = self.config.trail else {
            return;
        };
        let spec = style.spec();
        if tick % spec.emit_every != 0 {
            return;
        }
        let Some(player) = self.player.as_ref() else {
            return;
        };
        let radius = player.display_radius(self.power.is_active(PowerUpKind::Shrink));
        let pos = player.pos - Vec2::new(radius, 0.0);
        let spread = spec.velocity_spread;
        let jitter = if spread > 0.0 {
            Vec2::new(
                self.rng.random_range(-spread..=spread),
                self.rng.random_range(-spread..=spread),
            )
        } else {
            Vec2::ZERO
        };
        let vel = Vec2::new(-scroll * 0.5, spec.rise_speed) + jitter;
        self.particles.spawn(Particle::new(
            pos,
            vel,
            spec.life,
            radius * spec.size,
            ParticleKind::Trail(style),
        ));
    }

    /// Fatal hit: offer a continue or end the episode
    fn handle_fatal(&mut self) {
        let can_continue = self.config.continue_available
            && self.run.continues_used == 0
            && !self.config.mode.is_relaxed();
        if can_continue {
            log::info!("Fatal hit at score {}; offering continue", self.run.score);
            self.phase = EpisodePhase::AwaitingContinueDecision;
            self.events.push(GameEvent::ContinueRunRequested);
        } else {
            self.end_episode();
        }
    }

    fn end_episode(&mut self) {
        self.phase = EpisodePhase::Terminated;
        let report = self.report();
        log::info!(
            "Episode over: score={} coins={} perfect={} ticks={}",
            report.score,
            report.coins,
            report.perfect_run,
            report.ticks
        );
        self.events.push(GameEvent::EpisodeEnded(report));
    }

    /// Host accepted the continue offer. Returns false outside the decision.
    pub fn continue_run(&mut self) -> bool {
        if self.phase != EpisodePhase::AwaitingContinueDecision {
            return false;
        }
        let Some(player) = self.player.as_mut() else {
            return false;
        };
        player.pos.y = PLAYFIELD_HEIGHT / 3.0;
        player.vel = 0.0;
        if self
            .power
            .activate_for(PowerUpKind::Shield, CONTINUE_SHIELD_TICKS)
        {
            self.note_power_up(PowerUpKind::Shield);
        }
        self.run.continues_used += 1;
        self.phase = EpisodePhase::Running;
        log::info!("Run continued");
        true
    }

    /// Host declined the continue offer; the episode ends
    pub fn decline_continue(&mut self) -> bool {
        if self.phase != EpisodePhase::AwaitingContinueDecision {
            return false;
        }
        self.end_episode();
        true
    }

    pub fn pause(&mut self) {
        if self.phase == EpisodePhase::Running {
            self.phase = EpisodePhase::Paused;
            self.events.push(GameEvent::PauseStateChanged(true));
        }
    }

    pub fn resume(&mut self) {
        if self.phase == EpisodePhase::Paused {
            self.phase = EpisodePhase::Running;
            self.events.push(GameEvent::PauseStateChanged(false));
        }
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ask the host to grab a screenshot on its next frame
    pub fn request_capture(&mut self) {
        self.capture_requested = true;
    }

    pub fn take_capture_request(&mut self) -> bool {
        std::mem::take(&mut self.capture_requested)
    }

    pub fn force_performance_mode(&mut self, forced: Option<bool>) {
        self.governor.force_performance_mode(forced);
        self.particles.set_cap(self.governor.particle_cap());
    }

    pub fn report(&self) -> EpisodeReport {
        EpisodeReport {
            score: self.run.score,
            coins: self.run.coins_collected,
            perfect_run: self.run.perfect_run,
            mode: self.config.mode,
            enemies_defeated: self.run.enemies_defeated,
            power_ups_used: self.run.power_ups_used,
            ticks: self.run.elapsed_ticks,
        }
    }

    pub fn snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.run.score,
            gauge_percent: self.power.gauge_percent(),
            power_up: self.power.active(),
            difficulty: self.progression.difficulty(),
            perfect_run: self.run.perfect_run,
            combo: self.run.combo,
            status_effect: self.status.active(),
            speed: self.progression.speed(),
            scroll_speed: self.scroll_speed(),
            hostile_count: self.world.hostiles.len(),
            particle_count: self.particles.len(),
            fps: self.governor.fps(),
            performance_mode: self.governor.performance_mode(),
            phase: self.phase,
            mode: self.config.mode,
            scene_blend: self.scenes.blend(),
            sky_color: self.scenes.sky_color(),
            screen_shake: self.run.screen_shake,
            vision_radius: self.status.vision_radius(),
            capture_requested: self.capture_requested,
        }
    }
}
