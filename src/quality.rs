//! Contact quality monitoring
//!
//! Tracks the peak-to-peak amplitude of the most recent samples. Large swings
//! usually mean a loose electrode, so the operator can be told to re-seat it
//! before the capture is trusted.

use crate::config::ScreeningConfig;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Contact state reported by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactQuality {
    /// Not enough samples yet
    Unknown,
    Stable,
    Unstable,
}

/// Rolling peak-to-peak monitor
#[derive(Debug, Clone)]
pub struct FluctuationMonitor {
    window: VecDeque<f64>,
    window_size: usize,
    threshold_uv: f64,
    min_samples: usize,
    state: ContactQuality,
}

impl Default for FluctuationMonitor {
    fn default() -> Self {
        Self::from_config(&ScreeningConfig::default())
    }
}

impl FluctuationMonitor {
    pub fn new(window_size: usize, threshold_uv: f64, min_samples: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window: VecDeque::with_capacity(window_size),
            window_size,
            threshold_uv,
            min_samples,
            state: ContactQuality::Unknown,
        }
    }

    pub fn from_config(config: &ScreeningConfig) -> Self {
        Self::new(
            config.quality_window_samples(),
            config.quality.fluctuation_threshold_uv,
            config.quality.min_samples,
        )
    }

    /// Add one microvolt sample. Returns the current state and whether it changed.
    pub fn push(&mut self, sample_uv: f64) -> (ContactQuality, bool) {
        self.window.push_back(sample_uv);
        while self.window.len() > self.window_size {
            self.window.pop_front();
        }

        // State is only re-evaluated once the window holds more than `min_samples`
        if self.window.len() <= self.min_samples {
            return (self.state, false);
        }

        let next = if self.fluctuation() > self.threshold_uv {
            ContactQuality::Unstable
        } else {
            ContactQuality::Stable
        };
        let changed = next != self.state;
        self.state = next;
        (next, changed)
    }

    /// Add a burst; returns the state after the last sample
    pub fn push_burst(&mut self, samples: &[f64]) -> ContactQuality {
        for &s in samples {
            self.push(s);
        }
        self.state
    }

    /// Peak-to-peak amplitude of the current window
    pub fn fluctuation(&self) -> f64 {
        let max = self.window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = self.window.iter().copied().fold(f64::INFINITY, f64::min);
        if self.window.is_empty() {
            0.0
        } else {
            max - min
        }
    }

    pub fn state(&self) -> ContactQuality {
        self.state
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.state = ContactQuality::Unknown;
    }
}
