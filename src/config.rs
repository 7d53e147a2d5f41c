//! Screening configuration
//!
//! All tunable constants of the pipeline, recorder and acquisition buffer live in
//! `ScreeningConfig`. The defaults reproduce the clinical screening protocol
//! exactly; a JSON file may override any subset of fields.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Assumed device sample rate (Hz), used only for labeling
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 520.0;

/// Fixed frequency resolution (Hz per spectral bin)
pub const DEFAULT_FREQUENCY_RESOLUTION_HZ: f64 = 0.1;

/// Amplitude bound applied by the outlier clamp (µV)
pub const DEFAULT_CLAMP_LIMIT_UV: f64 = 100.0;

/// Closed frequency interval in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl FrequencyBand {
    pub const fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }
}

/// Band edges used by the biomarker extractor and the power normalizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub theta: FrequencyBand,
    pub alpha: FrequencyBand,
    pub beta: FrequencyBand,
    /// Band whose total power is the 100% reference
    pub reference: FrequencyBand,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            theta: FrequencyBand::new(4.0, 7.0),
            alpha: FrequencyBand::new(8.0, 13.0),
            beta: FrequencyBand::new(15.0, 25.0),
            reference: FrequencyBand::new(3.0, 30.0),
        }
    }
}

/// Biquad coefficients (a0 normalized to 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Default for BiquadCoeffs {
    /// Pre-computed 1-40 Hz conditioning section
    fn default() -> Self {
        Self {
            b0: 0.0001,
            b1: 0.0002,
            b2: 0.0001,
            a1: -1.9978,
            a2: 0.9978,
        }
    }
}

/// Contact-quality monitor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Length of the rolling window (seconds)
    pub window_seconds: f64,
    /// Peak-to-peak amplitude above which contact is flagged unstable (µV)
    pub fluctuation_threshold_uv: f64,
    /// Samples required before the monitor reports anything
    pub min_samples: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            window_seconds: 5.0,
            fluctuation_threshold_uv: 200.0,
            min_samples: 10,
        }
    }
}

/// Signal metadata written into recorder headers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub label: String,
    pub transducer: String,
    pub physical_unit: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
    pub prefilter: String,
    /// Nominal duration of one data record (seconds)
    pub record_duration_secs: f64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            label: "FP1".to_string(),
            transducer: "EDF Annotations".to_string(),
            physical_unit: "uV".to_string(),
            physical_min: -3000.0,
            physical_max: 3000.0,
            digital_min: -32767,
            digital_max: 32767,
            prefilter: "HP:0.5Hz LP:30Hz".to_string(),
            record_duration_secs: 0.01,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    pub sample_rate_hz: f64,
    pub frequency_resolution_hz: f64,
    pub clamp_limit_uv: f64,
    pub bands: BandConfig,
    pub filter: BiquadCoeffs,
    /// Maximum number of bursts held by the acquisition queue
    pub queue_capacity: usize,
    /// Bursts taken per consumer tick
    pub max_bursts_per_drain: usize,
    /// Raw ADC count to microvolt factor
    pub adc_scale_uv: f64,
    pub quality: QualityConfig,
    pub recorder: RecorderConfig,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            frequency_resolution_hz: DEFAULT_FREQUENCY_RESOLUTION_HZ,
            clamp_limit_uv: DEFAULT_CLAMP_LIMIT_UV,
            bands: BandConfig::default(),
            filter: BiquadCoeffs::default(),
            queue_capacity: 100,
            max_bursts_per_drain: 5,
            adc_scale_uv: 0.2,
            quality: QualityConfig::default(),
            recorder: RecorderConfig::default(),
        }
    }
}

impl ScreeningConfig {
    /// Parse and validate configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: ScreeningConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from a file, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self, ComputeError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ComputeError> {
        if !(self.sample_rate_hz > 0.0) {
            return Err(ComputeError::Config(format!(
                "sample_rate_hz must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if !(self.frequency_resolution_hz > 0.0) {
            return Err(ComputeError::Config(format!(
                "frequency_resolution_hz must be positive, got {}",
                self.frequency_resolution_hz
            )));
        }
        if !(self.clamp_limit_uv > 0.0) {
            return Err(ComputeError::Config(
                "clamp_limit_uv must be positive".to_string(),
            ));
        }
        for (name, band) in [
            ("theta", self.bands.theta),
            ("alpha", self.bands.alpha),
            ("beta", self.bands.beta),
            ("reference", self.bands.reference),
        ] {
            if band.low_hz < 0.0 || band.high_hz < band.low_hz {
                return Err(ComputeError::Config(format!(
                    "band {} has invalid edges {}-{} Hz",
                    name, band.low_hz, band.high_hz
                )));
            }
        }
        if self.queue_capacity == 0 || self.max_bursts_per_drain == 0 {
            return Err(ComputeError::Config(
                "queue_capacity and max_bursts_per_drain must be non-zero".to_string(),
            ));
        }
        let rec = &self.recorder;
        if !(rec.physical_max > rec.physical_min) || rec.digital_max <= rec.digital_min {
            return Err(ComputeError::Config(
                "recorder physical and digital ranges must be increasing".to_string(),
            ));
        }
        if rec.digital_min < i16::MIN as i32 || rec.digital_max > i16::MAX as i32 {
            return Err(ComputeError::Config(
                "recorder digital range must fit in 16 bits".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of samples held by the contact-quality window
    pub fn quality_window_samples(&self) -> usize {
        (self.quality.window_seconds * self.sample_rate_hz).round() as usize
    }
}
