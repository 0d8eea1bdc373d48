//! Frame-time driven performance governor
//!
//! Watches recent host frame times and lowers particle and hostile caps when
//! the host falls behind. Hysteresis keeps it from flapping around the
//! threshold.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::settings::QualityPreset;

/// Frame times kept for the rolling average
pub const FPS_WINDOW: usize = 30;
/// Below this the governor enters performance mode
pub const LOW_FPS: f32 = 45.0;
/// Above this it leaves again
pub const RECOVER_FPS: f32 = 55.0;

const HOSTILE_CAP: usize = 6;
const HOSTILE_CAP_REDUCED: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceGovernor {
    quality: QualityPreset,
    frame_times: VecDeque<Duration>,
    performance_mode: bool,
    /// Host override; `None` follows the measured frame rate
    forced: Option<bool>,
}

impl PerformanceGovernor {
    pub fn new(quality: QualityPreset) -> Self {
        Self {
            quality,
            frame_times: VecDeque::with_capacity(FPS_WINDOW),
            performance_mode: false,
            forced: None,
        }
    }

    pub fn quality(&self) -> QualityPreset {
        self.quality
    }

    /// Record one host frame and update the mode
    pub fn record_frame(&mut self, frame_time: Duration) {
        if self.frame_times.len() == FPS_WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);

        if self.forced.is_some() || self.frame_times.len() < FPS_WINDOW {
            return;
        }
        let fps = self.fps();
        if !self.performance_mode && fps < LOW_FPS {
            log::info!("Performance mode on ({fps:.1} fps)");
            self.performance_mode = true;
        } else if self.performance_mode && fps > RECOVER_FPS {
            log::info!("Performance mode off ({fps:.1} fps)");
            self.performance_mode = false;
        }
    }

    /// Average frames per second over the window (0 before any frame)
    pub fn fps(&self) -> f32 {
        let total: Duration = self.frame_times.iter().sum();
        if total.is_zero() {
            return 0.0;
        }
        self.frame_times.len() as f32 / total.as_secs_f32()
    }

    pub fn performance_mode(&self) -> bool {
        self.forced.unwrap_or(self.performance_mode)
    }

    /// Pin the mode on or off, or hand it back to measurement with `None`
    pub fn force_performance_mode(&mut self, forced: Option<bool>) {
        log::info!("Performance mode override: {forced:?}");
        self.forced = forced;
    }

    pub fn particle_cap(&self) -> usize {
        let cap = self.quality.max_particles();
        if self.performance_mode() { cap / 3 } else { cap }
    }

    pub fn hostile_cap(&self) -> usize {
        if self.performance_mode() {
            HOSTILE_CAP_REDUCED
        } else {
            HOSTILE_CAP
        }
    }
}
