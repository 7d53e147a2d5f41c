//! Core types for the Neuroscreen pipeline
//!
//! This module defines the records that flow between stages: band biomarkers,
//! processing outcomes with optional diagnostics, cognitive-scale scores, risk
//! and grip-strength results.

use crate::error::ComputeError;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capture phase of a screening test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPhase {
    OpenEyes,
    ClosedEyes,
}

impl TestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestPhase::OpenEyes => "open_eyes",
            TestPhase::ClosedEyes => "closed_eyes",
        }
    }
}

/// Gender tag used to select grip-strength reference rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ComputeError;

    /// Accepts English tags and the single-character tags used by the intake forms
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "男" => Ok(Gender::Male),
            "female" | "f" | "女" => Ok(Gender::Female),
            other => Err(ComputeError::Validation(format!(
                "unknown gender tag: {:?}",
                other
            ))),
        }
    }
}

/// Band biomarker indices, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandResult {
    pub theta: f64,
    pub alpha: f64,
    pub beta: f64,
    /// Mean of theta, alpha and beta
    pub final_index: f64,
}

/// Intermediate series kept for diagnostics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpectralDiagnostics {
    /// Clamped then filtered samples, same length as the input
    pub conditioned: Vec<f64>,
    /// Complex spectrum, length is a power of two
    pub spectrum: Vec<Complex64>,
    /// Per-bin power as a percentage of the reference band total
    pub relative_power: Vec<f64>,
}

/// Successful analysis of one capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainwaveAnalysis {
    pub bands: BandResult,
    pub diagnostics: SpectralDiagnostics,
}

/// Result bundle handed to report and persistence collaborators.
///
/// A failed capture carries a non-empty `error_message` and no band values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub success: bool,
    pub phase: TestPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bands: Option<BandResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<SpectralDiagnostics>,
}

impl ProcessOutcome {
    pub fn succeeded(phase: TestPhase, analysis: BrainwaveAnalysis, keep_diagnostics: bool) -> Self {
        Self {
            success: true,
            phase,
            error_message: None,
            bands: Some(analysis.bands),
            diagnostics: keep_diagnostics.then_some(analysis.diagnostics),
        }
    }

    pub fn failed(phase: TestPhase, message: impl Into<String>) -> Self {
        Self {
            success: false,
            phase,
            error_message: Some(message.into()),
            bands: None,
            diagnostics: None,
        }
    }
}

/// Optional cognitive-scale scores, each nominally 0-30
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CognitiveScores {
    pub moca: Option<f64>,
    pub mmse: Option<f64>,
}

impl CognitiveScores {
    pub fn new(moca: Option<f64>, mmse: Option<f64>) -> Self {
        Self { moca, mmse }
    }
}

/// Combined spectral and cognitive risk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Risk in [0, 100]
    pub risk_score: f64,
    /// Mean of the present scale scores on a 0-100 scale
    pub normalized_scale_average: f64,
    pub final_index: f64,
    pub formula_version: u32,
}

/// Grip-strength percentile and derived score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GripStrength {
    /// Age/gender-normalized percentile (10-100)
    pub percentage: f64,
    /// 100 - percentage; higher means higher risk
    pub score: f64,
}

/// Quality flags attached to reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    UnstableContact,
    BurstsDropped,
    NoCognitiveScores,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parsing() {
        assert_eq!("Male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("f".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("男".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("女".parse::<Gender>().unwrap(), Gender::Female);
        assert!("other".parse::<Gender>().is_err());
    }

    #[test]
    fn test_failed_outcome_serialization() {
        let outcome = ProcessOutcome::failed(TestPhase::ClosedEyes, "empty input");
        let json: serde_json::Value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["phase"], "closed_eyes");
        assert_eq!(json["error_message"], "empty input");
        assert!(json.get("bands").is_none());
    }
}
