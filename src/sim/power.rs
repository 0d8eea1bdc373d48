//! Power gauge and the single active power-up

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::ActivePowerUp;
use super::tables::PowerUpKind;
use crate::consts::POWER_GAUGE_MAX;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerController {
    gauge: f32,
    active: Option<ActivePowerUp>,
    /// Relaxed mode: the gauge never fills and nothing activates
    disabled: bool,
}

impl PowerController {
    pub fn new(disabled: bool) -> Self {
        Self {
            gauge: 0.0,
            active: None,
            disabled,
        }
    }

    pub fn gauge(&self) -> f32 {
        self.gauge
    }

    /// Gauge fill as 0-100
    pub fn gauge_percent(&self) -> f32 {
        self.gauge / POWER_GAUGE_MAX * 100.0
    }

    pub fn active(&self) -> Option<ActivePowerUp> {
        self.active
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.is_some_and(|a| a.kind == kind)
    }

    /// Scroll multiplier from the active power-up
    pub fn scroll_factor(&self) -> f32 {
        self.active.map_or(1.0, |a| a.kind.scroll_factor())
    }

    /// Add to the gauge. On saturation a random power-up activates and the
    /// gauge empties; the activated kind is returned.
    pub fn add_gauge(&mut self, amount: f32, rng: &mut Pcg32) -> Option<PowerUpKind> {
        if self.disabled {
            return None;
        }
        self.gauge = (self.gauge + amount).clamp(0.0, POWER_GAUGE_MAX);
        if self.gauge < POWER_GAUGE_MAX {
            return None;
        }
        let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
        self.gauge = 0.0;
        self.activate(kind);
        Some(kind)
    }

    /// Start `kind`, replacing whatever was running. Returns false when
    /// power-ups are disabled.
    pub fn activate(&mut self, kind: PowerUpKind) -> bool {
        self.activate_for(kind, kind.duration())
    }

    pub fn activate_for(&mut self, kind: PowerUpKind, ticks: u32) -> bool {
        if self.disabled || ticks == 0 {
            return false;
        }
        log::debug!("Power-up {:?} for {} ticks", kind, ticks);
        self.active = Some(ActivePowerUp {
            kind,
            remaining: ticks,
        });
        true
    }

    pub fn advance(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.remaining = active.remaining.saturating_sub(1);
            if active.remaining == 0 {
                log::debug!("Power-up {:?} expired", active.kind);
                self.active = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_saturation_activates_and_empties_gauge() {
        let mut power = PowerController::new(false);
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..4 {
            assert_eq!(power.add_gauge(20.0, &mut rng), None);
        }
        assert_eq!(power.gauge(), 80.0);
        let kind = power.add_gauge(50.0, &mut rng);
        assert!(kind.is_some());
        assert_eq!(power.gauge(), 0.0);
        assert_eq!(power.active().map(|a| a.kind), kind);
    }

    #[test]
    fn test_gauge_never_negative() {
        let mut power = PowerController::new(false);
        let mut rng = Pcg32::seed_from_u64(1);
        power.add_gauge(-40.0, &mut rng);
        assert_eq!(power.gauge(), 0.0);
    }

    #[test]
    fn test_disabled_gauge_stays_empty() {
        let mut power = PowerController::new(true);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(power.add_gauge(500.0, &mut rng), None);
        assert_eq!(power.gauge(), 0.0);
        assert!(!power.activate_for(PowerUpKind::Shield, 120));
        assert!(power.active().is_none());
    }

    #[test]
    fn test_new_activation_replaces_previous() {
        let mut power = PowerController::new(false);
        power.activate(PowerUpKind::Shield);
        power.activate(PowerUpKind::Slow);
        assert!(power.is_active(PowerUpKind::Slow));
        assert!(!power.is_active(PowerUpKind::Shield));
        assert_eq!(power.scroll_factor(), 0.25);
    }

    #[test]
    fn test_power_up_expires() {
        let mut power = PowerController::new(false);
        power.activate_for(PowerUpKind::Magnet, 2);
        power.advance();
        assert!(power.active().is_some());
        power.advance();
        assert!(power.active().is_none());
    }
}
