//! Risk scoring
//!
//! The single definition of the spectral/cognitive risk formula. Every consumer,
//! including persistence collaborators that recompute risk from stored band
//! components, calls into this module.
//!
//! ```text
//! final_index = (theta + alpha + beta) / 3
//! normalized  = mean(score / 30 * 100) over the present scale scores, 0 if none
//! risk        = clamp(final_index / 2 + normalized / 2, 0, 100)
//! ```

use crate::types::{BandResult, CognitiveScores, RiskAssessment};

/// Version of the formula above; bump on any change
pub const RISK_FORMULA_VERSION: u32 = 1;

/// Maximum raw score of the MoCA and MMSE scales
pub const SCALE_MAX_SCORE: f64 = 30.0;

/// Combined spectral index from the three band indices
pub fn final_index(theta: f64, alpha: f64, beta: f64) -> f64 {
    (theta + alpha + beta) / 3.0
}

/// Mean of the present scale scores on a 0-100 scale (0 when none are present)
pub fn normalized_scale_average(scores: &CognitiveScores) -> f64 {
    let normalized: Vec<f64> = [scores.moca, scores.mmse]
        .into_iter()
        .flatten()
        .map(|score| score / SCALE_MAX_SCORE * 100.0)
        .collect();

    if normalized.is_empty() {
        0.0
    } else {
        normalized.iter().sum::<f64>() / normalized.len() as f64
    }
}

/// Risk score in [0, 100]
pub fn risk_score(final_index: f64, scores: &CognitiveScores) -> f64 {
    assess(final_index, scores).risk_score
}

/// Full risk assessment for a spectral index
pub fn assess(final_index: f64, scores: &CognitiveScores) -> RiskAssessment {
    let normalized = normalized_scale_average(scores);
    let risk = (final_index / 2.0 + normalized / 2.0).clamp(0.0, 100.0);

    RiskAssessment {
        risk_score: risk,
        normalized_scale_average: normalized,
        final_index,
        formula_version: RISK_FORMULA_VERSION,
    }
}

/// Recompute risk from stored band components.
///
/// The final index is derived again from theta/alpha/beta rather than trusted
/// from storage.
pub fn risk_from_bands(bands: &BandResult, scores: &CognitiveScores) -> RiskAssessment {
    assess(final_index(bands.theta, bands.alpha, bands.beta), scores)
}
