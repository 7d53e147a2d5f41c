//! Pipeline orchestration
//!
//! This module provides the public analysis API for Neuroscreen.
//! It runs one complete capture through every spectral stage and converts any
//! failure into a failed `ProcessOutcome` at the boundary.

use crate::conditioner::{BandpassConditioner, OutlierClamp};
use crate::config::ScreeningConfig;
use crate::error::ComputeError;
use crate::features::BandExtractor;
use crate::normalizer::Normalizer;
use crate::spectrum::windowed_spectrum;
use crate::types::{BrainwaveAnalysis, ProcessOutcome, SpectralDiagnostics, TestPhase};
use tracing::{debug, info, warn};

/// Analyze one eyes-closed capture with the default configuration.
///
/// # Arguments
/// * `raw` - Raw single-channel samples in microvolts
///
/// # Returns
/// A `ProcessOutcome` that includes the intermediate series. Never panics;
/// failures are reported through `success` and `error_message`.
///
/// # Example
/// ```ignore
/// let outcome = process_closed_eyes(&samples);
/// if let Some(bands) = outcome.bands {
///     println!("alpha = {:.1}", bands.alpha);
/// }
/// ```
pub fn process_closed_eyes(raw: &[f64]) -> ProcessOutcome {
    BrainwaveProcessor::new().process(TestPhase::ClosedEyes, raw, true)
}

/// Batch processor for complete captures.
///
/// Stateless between calls: each capture is filtered from a zero state.
#[derive(Debug, Clone)]
pub struct BrainwaveProcessor {
    clamp: OutlierClamp,
    conditioner: BandpassConditioner,
    normalizer: Normalizer,
    extractor: BandExtractor,
}

impl Default for BrainwaveProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl BrainwaveProcessor {
    /// Create a processor with the default screening configuration
    pub fn new() -> Self {
        Self::from_valid_config(&ScreeningConfig::default())
    }

    /// Create a processor from a configuration, validating it first
    pub fn with_config(config: &ScreeningConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: &ScreeningConfig) -> Self {
        Self {
            clamp: OutlierClamp::new(config.clamp_limit_uv),
            conditioner: BandpassConditioner::new(config.filter),
            normalizer: Normalizer::new(config.bands.reference, config.frequency_resolution_hz),
            extractor: BandExtractor::new(config.bands.clone(), config.frequency_resolution_hz),
        }
    }

    /// Run the full pipeline on one capture.
    ///
    /// Pipeline stages:
    /// 1. OutlierClamp - bound raw amplitude
    /// 2. BandpassConditioner - fixed biquad, fresh state
    /// 3. windowed_spectrum - pad, Hanning window, radix-2 FFT
    /// 4. Normalizer - relative power against the reference band
    /// 5. BandExtractor - theta/alpha/beta and final index
    pub fn analyze(&self, raw: &[f64]) -> Result<BrainwaveAnalysis, ComputeError> {
        if raw.is_empty() {
            return Err(ComputeError::Validation("input sample series is empty".to_string()));
        }

        let conditioned = self.conditioner.condition(&self.clamp, raw);
        let spectrum = windowed_spectrum(&conditioned);
        debug!(
            samples = raw.len(),
            bins = spectrum.len(),
            "computed windowed spectrum"
        );

        let relative_power = self.normalizer.normalize(&spectrum)?;
        let bands = self.extractor.extract(&relative_power)?;

        if ![bands.theta, bands.alpha, bands.beta, bands.final_index]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ComputeError::Numeric(
                "band indices are not finite".to_string(),
            ));
        }

        Ok(BrainwaveAnalysis {
            bands,
            diagnostics: SpectralDiagnostics {
                conditioned,
                spectrum,
                relative_power,
            },
        })
    }

    /// Run the pipeline and convert the result into an outcome bundle
    pub fn process(&self, phase: TestPhase, raw: &[f64], keep_diagnostics: bool) -> ProcessOutcome {
        match self.analyze(raw) {
            Ok(analysis) => {
                info!(
                    phase = phase.as_str(),
                    samples = raw.len(),
                    theta = analysis.bands.theta,
                    alpha = analysis.bands.alpha,
                    beta = analysis.bands.beta,
                    final_index = analysis.bands.final_index,
                    "capture processed"
                );
                ProcessOutcome::succeeded(phase, analysis, keep_diagnostics)
            }
            Err(e) => {
                warn!(phase = phase.as_str(), error = %e, "capture processing failed");
                ProcessOutcome::failed(phase, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq_hz: f64, amplitude: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq_hz * i as f64 / 520.0).sin())
            .collect()
    }

    #[test]
    fn test_dominant_alpha_sine() {
        let outcome = process_closed_eyes(&sine(10.0, 50.0, 2048));

        assert!(outcome.success);
        let bands = outcome.bands.unwrap();
        assert_eq!(bands.theta, 0.0);
        assert!(bands.alpha > 60.0, "alpha was {}", bands.alpha);
        assert!(bands.alpha > bands.beta + 10.0);
        assert!(bands.alpha > bands.theta);

        let diagnostics = outcome.diagnostics.unwrap();
        assert_eq!(diagnostics.conditioned.len(), 2048);
        assert_eq!(diagnostics.spectrum.len(), 2048);
        assert_eq!(diagnostics.relative_power.len(), 2048);
    }

    #[test]
    fn test_empty_input_fails_cleanly() {
        let outcome = process_closed_eyes(&[]);

        assert!(!outcome.success);
        assert!(!outcome.error_message.as_deref().unwrap_or("").is_empty());
        assert!(outcome.bands.is_none());
    }

    #[test]
    fn test_nan_input_is_numeric_failure() {
        let mut raw = sine(10.0, 50.0, 600);
        raw[100] = f64::NAN;

        let processor = BrainwaveProcessor::new();
        assert!(matches!(
            processor.analyze(&raw),
            Err(ComputeError::Numeric(_))
        ));

        let outcome = processor.process(TestPhase::ClosedEyes, &raw, false);
        assert!(!outcome.success);
        assert!(outcome.error_message.unwrap().contains("Numeric"));
    }

    #[test]
    fn test_bands_always_in_range() {
        let processor = BrainwaveProcessor::new();
        let captures = vec![
            vec![0.0; 100],
            vec![1.0],
            vec![5.0, 3.0],
            sine(5.0, 500.0, 1500),
            sine(20.0, 80.0, 3000),
            (0..777).map(|i| ((i * 37) % 200) as f64 - 100.0).collect(),
        ];

        for raw in captures {
            let bands = processor.analyze(&raw).unwrap().bands;
            for v in [bands.theta, bands.alpha, bands.beta, bands.final_index] {
                assert!((0.0..=100.0).contains(&v), "value {v} out of range");
            }
        }
    }

    #[test]
    fn test_diagnostics_omitted_on_request() {
        let processor = BrainwaveProcessor::new();
        let outcome = processor.process(TestPhase::OpenEyes, &sine(10.0, 20.0, 256), false);
        assert!(outcome.success);
        assert_eq!(outcome.phase, TestPhase::OpenEyes);
        assert!(outcome.diagnostics.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ScreeningConfig {
            frequency_resolution_hz: 0.0,
            ..ScreeningConfig::default()
        };
        assert!(BrainwaveProcessor::with_config(&config).is_err());
    }
}
