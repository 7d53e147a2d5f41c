//! Signal conditioning
//!
//! Raw microvolt samples are first bounded by the outlier clamp and then passed
//! through a fixed-coefficient biquad that approximates a 1-40 Hz passband.
//!
//! Filter memory is an explicit `BiquadState` value. Batch calls start from a
//! fresh state; streaming callers thread one state through successive chunks
//! so chunk boundaries introduce no discontinuity.

use crate::config::BiquadCoeffs;

/// Shortest series that is filtered; anything shorter passes through unchanged
pub const MIN_FILTER_LEN: usize = 3;

/// Restricts every sample to `[-limit, limit]`
#[derive(Debug, Clone, Copy)]
pub struct OutlierClamp {
    limit: f64,
}

impl Default for OutlierClamp {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CLAMP_LIMIT_UV)
    }
}

impl OutlierClamp {
    pub fn new(limit: f64) -> Self {
        Self { limit: limit.abs() }
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Clamp a whole series; empty input yields empty output
    pub fn apply(&self, samples: &[f64]) -> Vec<f64> {
        samples.iter().map(|&s| self.clamp(s)).collect()
    }

    /// Clamp a single sample. NaN is passed through untouched.
    pub fn clamp(&self, sample: f64) -> f64 {
        sample.clamp(-self.limit, self.limit)
    }
}

/// Two prior inputs and two prior outputs of a direct-form-I biquad
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BiquadState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BiquadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the zero state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Fixed-coefficient second-order bandpass conditioner
#[derive(Debug, Clone, Copy, Default)]
pub struct BandpassConditioner {
    coeffs: BiquadCoeffs,
}

impl BandpassConditioner {
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self { coeffs }
    }

    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    /// Filter one complete capture starting from the zero state.
    ///
    /// Input shorter than three samples is returned unfiltered.
    pub fn filter(&self, samples: &[f64]) -> Vec<f64> {
        if samples.len() < MIN_FILTER_LEN {
            return samples.to_vec();
        }
        let mut state = BiquadState::new();
        self.filter_with_state(&mut state, samples)
    }

    /// Filter a chunk continuing from `state`, which is updated in place
    pub fn filter_with_state(&self, state: &mut BiquadState, samples: &[f64]) -> Vec<f64> {
        samples.iter().map(|&s| self.step(state, s)).collect()
    }

    /// Process a single sample
    pub fn step(&self, state: &mut BiquadState, input: f64) -> f64 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * state.x1 + c.b2 * state.x2
            - c.a1 * state.y1
            - c.a2 * state.y2;

        state.x2 = state.x1;
        state.x1 = input;
        state.y2 = state.y1;
        state.y1 = output;

        output
    }

    /// Clamp then filter
    pub fn condition(&self, clamp: &OutlierClamp, raw: &[f64]) -> Vec<f64> {
        self.filter(&clamp.apply(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clamp_bounds_magnitude() {
        let clamp = OutlierClamp::default();
        let raw = vec![-250.0, -100.0, -3.5, 0.0, 42.0, 100.0, 1e9, f64::INFINITY];
        let clamped = clamp.apply(&raw);

        assert_eq!(clamped.len(), raw.len());
        assert!(clamped.iter().all(|v| v.abs() <= 100.0));
        assert_eq!(clamped, vec![-100.0, -100.0, -3.5, 0.0, 42.0, 100.0, 100.0, 100.0]);
    }

    #[test]
    fn test_clamp_empty() {
        assert!(OutlierClamp::default().apply(&[]).is_empty());
    }

    #[test]
    fn test_short_input_is_identity() {
        let conditioner = BandpassConditioner::default();
        assert_eq!(conditioner.filter(&[5.0, 3.0]), vec![5.0, 3.0]);
        assert_eq!(conditioner.filter(&[1.0]), vec![1.0]);
        assert!(conditioner.filter(&[]).is_empty());
    }

    #[test]
    fn test_filter_difference_equation() {
        let conditioner = BandpassConditioner::default();
        let out = conditioner.filter(&[1.0, 1.0, 1.0]);

        // y0 = b0
        // y1 = b0 + b1 - a1*y0
        // y2 = b0 + b1 + b2 - a1*y1 - a2*y0
        let y0 = 0.0001;
        let y1 = 0.0001 + 0.0002 + 1.9978 * y0;
        let y2 = 0.0001 + 0.0002 + 0.0001 + 1.9978 * y1 - 0.9978 * y0;

        assert_eq!(out.len(), 3);
        assert!((out[0] - y0).abs() < 1e-15);
        assert!((out[1] - y1).abs() < 1e-15);
        assert!((out[2] - y2).abs() < 1e-15);
    }

    #[test]
    fn test_batch_calls_do_not_share_state() {
        let conditioner = BandpassConditioner::default();
        let chunk = [10.0, -4.0, 7.0, 2.0];
        assert_eq!(conditioner.filter(&chunk), conditioner.filter(&chunk));
    }

    #[test]
    fn test_threaded_state_matches_single_pass() {
        let conditioner = BandpassConditioner::default();
        let signal: Vec<f64> = (0..64).map(|i| ((i as f64) * 0.3).sin() * 40.0).collect();
        let whole = conditioner.filter(&signal);

        let mut state = BiquadState::new();
        let mut chunked = conditioner.filter_with_state(&mut state, &signal[..20]);
        chunked.extend(conditioner.filter_with_state(&mut state, &signal[20..]));

        assert_eq!(whole, chunked);
    }

    #[test]
    fn test_condition_preserves_length() {
        let conditioner = BandpassConditioner::default();
        let raw: Vec<f64> = (0..100).map(|i| (i as f64) * 5.0 - 250.0).collect();
        let out = conditioner.condition(&OutlierClamp::default(), &raw);
        assert_eq!(out.len(), raw.len());
    }
}
