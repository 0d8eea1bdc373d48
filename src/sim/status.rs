//! Single-slot status effect controller

use serde::{Deserialize, Serialize};

use super::state::{ActiveStatusEffect, Player};
use super::tables::StatusEffectKind;

/// What happened to an incoming effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Same stackable effect already active; duration extended
    Extended,
    /// Another effect holds the slot
    Blocked,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusController {
    active: Option<ActiveStatusEffect>,
}

impl StatusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<ActiveStatusEffect> {
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Try to put `kind` in the slot and apply its modifiers immediately
    pub fn try_apply(&mut self, kind: StatusEffectKind, player: &mut Player) -> ApplyOutcome {
        let spec = kind.spec();
        let outcome = match self.active.as_mut() {
            None => {
                self.active = Some(ActiveStatusEffect {
                    kind,
                    remaining: spec.duration,
                    magnitude: spec.magnitude,
                });
                ApplyOutcome::Applied
            }
            Some(active) if active.kind == kind && spec.stackable => {
                active.remaining = (active.remaining + spec.duration).min(spec.duration * 2);
                ApplyOutcome::Extended
            }
            Some(_) => ApplyOutcome::Blocked,
        };
        if outcome != ApplyOutcome::Blocked {
            log::debug!("Status effect {:?}: {:?}", kind, outcome);
        }
        self.apply_modifiers(player);
        outcome
    }

    /// Count down one tick and recompute the player's parameters from base
    pub fn advance(&mut self, player: &mut Player) {
        if let Some(active) = self.active.as_mut() {
            active.remaining = active.remaining.saturating_sub(1);
            if active.remaining == 0 {
                log::debug!("Status effect {:?} expired", active.kind);
                self.active = None;
            }
        }
        self.apply_modifiers(player);
    }

    /// Drop the active effect and restore the player
    pub fn clear(&mut self, player: &mut Player) {
        self.active = None;
        player.restore_base();
    }

    fn apply_modifiers(&self, player: &mut Player) {
        player.restore_base();
        let Some(active) = self.active else {
            return;
        };
        match active.kind {
            StatusEffectKind::HeavyWings => player.gravity = player.base.gravity * active.magnitude,
            StatusEffectKind::FlapFatigue => {
                player.thrust = player.base.thrust * (1.0 - active.magnitude)
            }
            StatusEffectKind::Downdraft => {
                player.speed_cap = player.base.speed_cap * active.magnitude
            }
            // Flag-only effects read through the queries below
            StatusEffectKind::ScreenLurch
            | StatusEffectKind::Vertigo
            | StatusEffectKind::Blackout => {}
        }
    }

    /// Multiplier on thrust direction; negative while Vertigo flips controls
    pub fn thrust_direction(&self) -> f32 {
        match self.active {
            Some(ActiveStatusEffect {
                kind: StatusEffectKind::Vertigo,
                magnitude,
                ..
            }) => -magnitude,
            _ => 1.0,
        }
    }

    /// Visible radius around the player while Blackout is active
    pub fn vision_radius(&self) -> Option<f32> {
        match self.active {
            Some(ActiveStatusEffect {
                kind: StatusEffectKind::Blackout,
                magnitude,
                ..
            }) => Some(magnitude),
            _ => None,
        }
    }

    /// Screen shake requested by ScreenLurch
    pub fn shake_intensity(&self) -> f32 {
        match self.active {
            Some(ActiveStatusEffect {
                kind: StatusEffectKind::ScreenLurch,
                magnitude,
                ..
            }) => magnitude,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tables::ARCHETYPES;

    fn player() -> Player {
        Player::new(0, &ARCHETYPES[0])
    }

    #[test]
    fn test_base_values_restored_exactly_on_expiry() {
        for kind in StatusEffectKind::ALL {
            let mut p = player();
            let base = p.base;
            let mut status = StatusController::new();
            assert_eq!(status.try_apply(kind, &mut p), ApplyOutcome::Applied);
            for _ in 0..kind.spec().duration {
                status.advance(&mut p);
            }
            assert!(!status.is_active(), "{kind:?} still active");
            assert_eq!(p.gravity, base.gravity);
            assert_eq!(p.thrust, base.thrust);
            assert_eq!(p.speed_cap, base.speed_cap);
        }
    }

    #[test]
    fn test_modifiers_never_compound() {
        let mut p = player();
        let mut status = StatusController::new();
        status.try_apply(StatusEffectKind::HeavyWings, &mut p);
        for _ in 0..50 {
            status.advance(&mut p);
        }
        assert_eq!(p.gravity, p.base.gravity * 1.6);
    }

    #[test]
    fn test_second_effect_is_blocked() {
        let mut p = player();
        let mut status = StatusController::new();
        status.try_apply(StatusEffectKind::FlapFatigue, &mut p);
        assert_eq!(
            status.try_apply(StatusEffectKind::HeavyWings, &mut p),
            ApplyOutcome::Blocked
        );
        assert_eq!(
            status.active().map(|a| a.kind),
            Some(StatusEffectKind::FlapFatigue)
        );
        assert_eq!(p.gravity, p.base.gravity);
    }

    #[test]
    fn test_screen_lurch_extends_up_to_double() {
        let mut p = player();
        let mut status = StatusController::new();
        status.try_apply(StatusEffectKind::ScreenLurch, &mut p);
        for _ in 0..10 {
            status.advance(&mut p);
        }
        assert_eq!(
            status.try_apply(StatusEffectKind::ScreenLurch, &mut p),
            ApplyOutcome::Extended
        );
        assert_eq!(status.active().map(|a| a.remaining), Some(50));
        status.try_apply(StatusEffectKind::ScreenLurch, &mut p);
        assert_eq!(status.active().map(|a| a.remaining), Some(60));
        assert_eq!(status.shake_intensity(), 15.0);
    }

    #[test]
    fn test_flag_queries() {
        let mut p = player();
        let mut status = StatusController::new();
        assert_eq!(status.thrust_direction(), 1.0);
        status.try_apply(StatusEffectKind::Vertigo, &mut p);
        assert!(status.thrust_direction() < 0.0);
        status.clear(&mut p);
        status.try_apply(StatusEffectKind::Blackout, &mut p);
        assert_eq!(status.vision_radius(), Some(140.0));
    }
}
