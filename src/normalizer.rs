//! Relative power normalization
//!
//! Converts a complex spectrum into per-bin power expressed as a percentage of
//! the total power in the reference band (3-30 Hz by default).

use crate::config::FrequencyBand;
use crate::error::ComputeError;
use num_complex::Complex64;

/// Map a frequency band onto inclusive bin indices, clamped into `[0, len - 1]`.
///
/// Returns `None` for an empty spectrum.
pub fn bin_range(band: FrequencyBand, resolution_hz: f64, len: usize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let last = len - 1;
    let to_bin = |freq: f64| -> usize {
        let index = (freq / resolution_hz).round();
        if index <= 0.0 {
            0
        } else {
            (index as usize).min(last)
        }
    };
    Some((to_bin(band.low_hz), to_bin(band.high_hz)))
}

/// Normalizer for converting a spectrum into relative power
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    reference: FrequencyBand,
    resolution_hz: f64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(
            crate::config::BandConfig::default().reference,
            crate::config::DEFAULT_FREQUENCY_RESOLUTION_HZ,
        )
    }
}

impl Normalizer {
    pub fn new(reference: FrequencyBand, resolution_hz: f64) -> Self {
        Self {
            reference,
            resolution_hz,
        }
    }

    /// Relative power per bin (percent of reference-band total).
    ///
    /// Every bin is 0 when the reference total is 0. A non-finite total is a
    /// numeric failure.
    pub fn normalize(&self, spectrum: &[Complex64]) -> Result<Vec<f64>, ComputeError> {
        let power: Vec<f64> = spectrum.iter().map(|c| c.norm_sqr()).collect();

        let reference_total = self.reference_total(&power);
        if !reference_total.is_finite() {
            return Err(ComputeError::Numeric(format!(
                "reference band power is not finite ({})",
                reference_total
            )));
        }

        if reference_total > 0.0 {
            Ok(power.iter().map(|p| p / reference_total * 100.0).collect())
        } else {
            Ok(vec![0.0; power.len()])
        }
    }

    /// Sum of power over the reference band
    pub fn reference_total(&self, power: &[f64]) -> f64 {
        match bin_range(self.reference, self.resolution_hz, power.len()) {
            Some((low, high)) if low <= high => power[low..=high].iter().sum(),
            _ => 0.0,
        }
    }

    /// Inclusive bin indices of the reference band for a spectrum of `len` bins
    pub fn reference_bins(&self, len: usize) -> Option<(usize, usize)> {
        bin_range(self.reference, self.resolution_hz, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::windowed_spectrum;

    fn noise(len: usize) -> Vec<f64> {
        // Deterministic pseudo-random sequence
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state % 2000) as f64 / 10.0 - 100.0
            })
            .collect()
    }

    #[test]
    fn test_bin_range_clamps() {
        let band = FrequencyBand::new(3.0, 30.0);
        assert_eq!(bin_range(band, 0.1, 1024), Some((30, 300)));
        assert_eq!(bin_range(band, 0.1, 128), Some((30, 127)));
        assert_eq!(bin_range(band, 0.1, 16), Some((15, 15)));
        assert_eq!(bin_range(band, 0.1, 0), None);
    }

    #[test]
    fn test_reference_band_sums_to_100() {
        let normalizer = Normalizer::default();
        let spectrum = windowed_spectrum(&noise(1000));
        let relative = normalizer.normalize(&spectrum).unwrap();

        assert_eq!(relative.len(), spectrum.len());
        let (low, high) = normalizer.reference_bins(relative.len()).unwrap();
        let total: f64 = relative[low..=high].iter().sum();
        assert!((total - 100.0).abs() < 1e-6, "total was {total}");
        assert!(relative.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_zero_power_gives_all_zero() {
        let normalizer = Normalizer::default();
        let spectrum = vec![Complex64::new(0.0, 0.0); 512];
        let relative = normalizer.normalize(&spectrum).unwrap();
        assert_eq!(relative.len(), 512);
        assert!(relative.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_non_finite_power_is_numeric_error() {
        let normalizer = Normalizer::default();
        let mut spectrum = vec![Complex64::new(1.0, 0.0); 512];
        spectrum[40] = Complex64::new(f64::NAN, 0.0);
        let err = normalizer.normalize(&spectrum).unwrap_err();
        assert!(matches!(err, ComputeError::Numeric(_)));
    }
}
