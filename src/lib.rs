//! Neuroscreen - EEG biomarker and cognitive-risk screening engine
//!
//! Neuroscreen turns a single-channel EEG capture into theta/alpha/beta band
//! indices through a deterministic pipeline: outlier clamp → bandpass filter →
//! windowed FFT → relative-power normalization → band extraction. Band indices
//! are combined with optional MoCA/MMSE scores into a risk score.
//!
//! ## Modules
//!
//! - **Spectral Pipeline**: `conditioner`, `spectrum`, `normalizer`, `features`, `pipeline`
//! - **Scoring**: `risk` and the grip-strength percentile tables in `grip`
//! - **Acquisition**: bounded burst queue, ADC conversion and contact-quality monitoring
//! - **Recording**: streaming EDF-style biosignal files in `recorder`
//! - **Reports**: `ScreeningReport` JSON for downstream collaborators

pub mod acquisition;
pub mod conditioner;
pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod grip;
pub mod normalizer;
pub mod pipeline;
pub mod quality;
pub mod recorder;
pub mod risk;
pub mod spectrum;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use acquisition::SampleQueue;
pub use config::ScreeningConfig;
pub use encoder::{ReportContext, ReportEncoder, ScreeningReport};
pub use error::ComputeError;
pub use grip::{grip_strength, PercentileTable};
pub use pipeline::{process_closed_eyes, BrainwaveProcessor};
pub use quality::{ContactQuality, FluctuationMonitor};
pub use recorder::{read_header, BiosignalRecorder, RecordingHeader};
pub use risk::{risk_from_bands, risk_score};
pub use types::{
    BandResult, CognitiveScores, Gender, GripStrength, ProcessOutcome, RiskAssessment, TestPhase,
};

/// Neuroscreen version embedded in all reports
pub const NEUROSCREEN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "neuroscreen";
