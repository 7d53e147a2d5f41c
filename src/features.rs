//! Band biomarker extraction
//!
//! This module derives the theta, alpha and beta indices from a relative power
//! series. Each index is computed from the peak relative power inside its band:
//! - theta = (peak - 2.0) * 100
//! - alpha = 100 - (peak + 0.3) * 100
//! - beta  = 100 - (peak + 0.5) * 100
//!
//! where `peak` is the band maximum as a fraction. All indices are clamped to [0, 100].

use crate::config::{BandConfig, FrequencyBand};
use crate::error::ComputeError;
use crate::normalizer::bin_range;
use crate::risk::final_index;
use crate::types::BandResult;

/// Extractor for band biomarkers
#[derive(Debug, Clone)]
pub struct BandExtractor {
    bands: BandConfig,
    resolution_hz: f64,
}

impl Default for BandExtractor {
    fn default() -> Self {
        Self::new(
            BandConfig::default(),
            crate::config::DEFAULT_FREQUENCY_RESOLUTION_HZ,
        )
    }
}

impl BandExtractor {
    pub fn new(bands: BandConfig, resolution_hz: f64) -> Self {
        Self {
            bands,
            resolution_hz,
        }
    }

    /// Derive band indices from a relative power series
    pub fn extract(&self, relative_power: &[f64]) -> Result<BandResult, ComputeError> {
        let theta = theta_index(self.band_peak(relative_power, self.bands.theta, "theta")?);
        let alpha = alpha_index(self.band_peak(relative_power, self.bands.alpha, "alpha")?);
        let beta = beta_index(self.band_peak(relative_power, self.bands.beta, "beta")?);

        Ok(BandResult {
            theta,
            alpha,
            beta,
            final_index: final_index(theta, alpha, beta),
        })
    }

    /// Maximum relative power (percent) within a band
    fn band_peak(
        &self,
        relative_power: &[f64],
        band: FrequencyBand,
        name: &str,
    ) -> Result<f64, ComputeError> {
        let slice = match bin_range(band, self.resolution_hz, relative_power.len()) {
            Some((low, high)) if low <= high => &relative_power[low..=high],
            _ => &[][..],
        };

        slice
            .iter()
            .copied()
            .reduce(f64::max)
            .ok_or_else(|| ComputeError::Validation(format!("no spectral data in {} band", name)))
    }
}

/// Theta index from the band peak (percent)
fn theta_index(peak_percent: f64) -> f64 {
    ((peak_percent / 100.0 - 2.0) * 100.0).clamp(0.0, 100.0)
}

/// Alpha index from the band peak (percent)
fn alpha_index(peak_percent: f64) -> f64 {
    (100.0 - (peak_percent / 100.0 + 0.3) * 100.0).clamp(0.0, 100.0)
}

/// Beta index from the band peak (percent)
fn beta_index(peak_percent: f64) -> f64 {
    (100.0 - (peak_percent / 100.0 + 0.5) * 100.0).clamp(0.0, 100.0)
}
