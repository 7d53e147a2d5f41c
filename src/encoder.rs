//! Report encoding
//!
//! This module assembles screening results into `ScreeningReport` JSON payloads
//! for report-rendering and record-persistence collaborators. Risk is always
//! recomputed here from the band components so stored reports and live results
//! agree.

use crate::error::ComputeError;
use crate::quality::ContactQuality;
use crate::risk::risk_from_bands;
use crate::types::{
    BandResult, CognitiveScores, GripStrength, ProcessOutcome, QualityFlag, RiskAssessment,
    SpectralDiagnostics, TestPhase,
};
use crate::{NEUROSCREEN_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Identifies the software instance that produced a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Serialized screening result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    pub phase: TestPhase,
    pub bands: BandResult,
    pub scores: CognitiveScores,
    pub risk: RiskAssessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grip: Option<GripStrength>,
    pub quality_flags: Vec<QualityFlag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<SpectralDiagnostics>,
}

/// Everything known about one screening besides the spectral outcome
#[derive(Debug, Clone, Default)]
pub struct ReportContext {
    pub patient_id: Option<String>,
    pub scores: CognitiveScores,
    pub grip: Option<GripStrength>,
    pub contact: Option<ContactQuality>,
    /// Bursts evicted by the acquisition queue during the capture
    pub dropped_bursts: u64,
    pub include_diagnostics: bool,
}

/// Report encoder
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build a report from a successful outcome
    pub fn encode(
        &self,
        outcome: &ProcessOutcome,
        context: &ReportContext,
    ) -> Result<ScreeningReport, ComputeError> {
        let bands = match (&outcome.bands, outcome.success) {
            (Some(bands), true) => *bands,
            _ => {
                return Err(ComputeError::Validation(format!(
                    "cannot report a failed capture: {}",
                    outcome.error_message.as_deref().unwrap_or("no band data")
                )))
            }
        };

        let diagnostics = if context.include_diagnostics {
            outcome.diagnostics.clone()
        } else {
            None
        };

        Ok(ScreeningReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: NEUROSCREEN_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            patient_id: context.patient_id.clone(),
            phase: outcome.phase,
            bands,
            scores: context.scores,
            risk: risk_from_bands(&bands, &context.scores),
            grip: context.grip,
            quality_flags: quality_flags(context),
            diagnostics,
        })
    }

    /// Encode to JSON string
    pub fn encode_to_json(
        &self,
        outcome: &ProcessOutcome,
        context: &ReportContext,
    ) -> Result<String, ComputeError> {
        let report = self.encode(outcome, context)?;
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

fn quality_flags(context: &ReportContext) -> Vec<QualityFlag> {
    let mut flags = Vec::new();
    if context.contact == Some(ContactQuality::Unstable) {
        flags.push(QualityFlag::UnstableContact);
    }
    if context.dropped_bursts > 0 {
        flags.push(QualityFlag::BurstsDropped);
    }
    if context.scores.moca.is_none() && context.scores.mmse.is_none() {
        flags.push(QualityFlag::NoCognitiveScores);
    }
    flags
}
