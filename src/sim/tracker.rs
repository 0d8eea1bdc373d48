//! Rolling record of where the player likes to fly
//!
//! Spawners read it to place gaps and hostiles where the player actually is.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::{GROUND_Y, PLAYFIELD_HEIGHT};

/// Samples kept (three seconds at 60 Hz)
pub const TRACKER_WINDOW: usize = 180;
/// Horizontal bands used for the frequent-zone histogram
const ZONE_COUNT: usize = 8;
/// Top and bottom fraction of the playfield counted as risky
const RISK_BAND: f32 = 0.2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorTracker {
    samples: VecDeque<f32>,
}

impl Default for BehaviorTracker {
    fn default() -> Self {
        Self::new(PLAYFIELD_HEIGHT / 2.0)
    }
}

impl BehaviorTracker {
    /// Start a fresh window holding a single sample at `spawn_y`
    pub fn new(spawn_y: f32) -> Self {
        let mut samples = VecDeque::with_capacity(TRACKER_WINDOW);
        samples.push_back(spawn_y);
        Self { samples }
    }

    pub fn reset(&mut self, spawn_y: f32) {
        self.samples.clear();
        self.samples.push_back(spawn_y);
    }

    pub fn record(&mut self, y: f32) {
        if self.samples.len() == TRACKER_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(y.clamp(0.0, GROUND_Y));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean height over the window
    pub fn preferred_height(&self) -> f32 {
        if self.samples.is_empty() {
            return PLAYFIELD_HEIGHT / 2.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    /// Centre of the most visited horizontal band
    pub fn frequent_zone(&self) -> f32 {
        let band = GROUND_Y / ZONE_COUNT as f32;
        let mut counts = [0u32; ZONE_COUNT];
        for y in &self.samples {
            let index = ((y / band) as usize).min(ZONE_COUNT - 1);
            counts[index] += 1;
        }
        // Ties go to the lowest band index
        let mut best = 0;
        for (i, count) in counts.iter().enumerate() {
            if *count > counts[best] {
                best = i;
            }
        }
        band * (best as f32 + 0.5)
    }

    /// Fraction of samples spent near the ceiling or the ground (0-1)
    pub fn risk_tolerance(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let low = GROUND_Y * RISK_BAND;
        let high = GROUND_Y * (1.0 - RISK_BAND);
        let risky = self
            .samples
            .iter()
            .filter(|y| **y < low || **y > high)
            .count();
        risky as f32 / self.samples.len() as f32
    }
}
