//! Windowed spectral transform
//!
//! Zero-pads a conditioned series to the next power of two, applies a Hanning
//! window and runs a recursive radix-2 Cooley-Tukey transform.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Smallest power of two that is >= `n` (1 for `n <= 1`)
pub fn next_power_of_two(n: usize) -> usize {
    let mut power = 1;
    while power < n {
        power *= 2;
    }
    power
}

/// Raised-cosine window of length `n`.
///
/// `w[i] = 0.5 * (1 - cos(2πi / (n - 1)))`; a single-point window is `[1.0]`.
pub fn hanning_window(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (n - 1) as f64;
            (0..n)
                .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos()))
                .collect()
        }
    }
}

/// Pad, window and transform a conditioned series.
///
/// The input is not mutated. Output length is `next_power_of_two(len)`.
pub fn windowed_spectrum(conditioned: &[f64]) -> Vec<Complex64> {
    let n = next_power_of_two(conditioned.len());
    let window = hanning_window(n);

    let windowed: Vec<Complex64> = window
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let sample = conditioned.get(i).copied().unwrap_or(0.0);
            Complex64::new(sample * w, 0.0)
        })
        .collect();

    fft_recursive(&windowed)
}

/// Recursive radix-2 decimation-in-time FFT.
///
/// `data.len()` must be a power of two; length 1 is returned unchanged.
pub fn fft_recursive(data: &[Complex64]) -> Vec<Complex64> {
    let n = data.len();
    if n <= 1 {
        return data.to_vec();
    }
    debug_assert!(n.is_power_of_two(), "radix-2 transform needs a power-of-two length");

    let even: Vec<Complex64> = data.iter().step_by(2).copied().collect();
    let odd: Vec<Complex64> = data.iter().skip(1).step_by(2).copied().collect();

    let even_fft = fft_recursive(&even);
    let odd_fft = fft_recursive(&odd);

    let half = n / 2;
    let mut result = vec![Complex64::new(0.0, 0.0); n];
    for k in 0..half {
        let angle = -2.0 * PI * k as f64 / n as f64;
        let twiddle = Complex64::from_polar(1.0, angle) * odd_fft[k];
        result[k] = even_fft[k] + twiddle;
        result[k + half] = even_fft[k] - twiddle;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rustfft::FftPlanner;

    #[test]
    fn test_next_power_of_two() {
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(2), 2);
        assert_eq!(next_power_of_two(3), 4);
        assert_eq!(next_power_of_two(1024), 1024);
        assert_eq!(next_power_of_two(1025), 2048);
    }

    #[test]
    fn test_hanning_window_shape() {
        let w = hanning_window(5);
        assert_eq!(w.len(), 5);
        assert!(w[0].abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
        assert!(w[4].abs() < 1e-12);
        assert!((w[1] - w[3]).abs() < 1e-12);

        assert_eq!(hanning_window(1), vec![1.0]);
        assert!(hanning_window(0).is_empty());
    }

    #[test]
    fn test_output_length_is_power_of_two() {
        for len in [0usize, 1, 2, 3, 5, 17, 100, 520, 1000] {
            let input: Vec<f64> = (0..len).map(|i| i as f64).collect();
            let spectrum = windowed_spectrum(&input);
            assert!(spectrum.len().is_power_of_two());
            assert!(spectrum.len() >= len);
        }
    }

    #[test]
    fn test_single_sample_base_case() {
        let spectrum = windowed_spectrum(&[3.0]);
        assert_eq!(spectrum, vec![Complex64::new(3.0, 0.0)]);
    }

    #[test]
    fn test_input_not_mutated() {
        let input = vec![1.0, 2.0, 3.0];
        let copy = input.clone();
        let _ = windowed_spectrum(&input);
        assert_eq!(input, copy);
    }

    #[test]
    fn test_matches_reference_fft() {
        let data: Vec<Complex64> = (0..256)
            .map(|i| {
                let t = i as f64 / 520.0;
                Complex64::new((2.0 * PI * 10.0 * t).sin() + 0.5 * (2.0 * PI * 31.0 * t).cos(), 0.0)
            })
            .collect();

        let ours = fft_recursive(&data);

        let mut reference = data.clone();
        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_forward(reference.len()).process(&mut reference);

        for (a, b) in ours.iter().zip(reference.iter()) {
            assert!((a - b).norm() < 1e-9, "{a} != {b}");
        }
    }

    #[test]
    fn test_impulse_has_flat_spectrum() {
        let mut data = vec![Complex64::new(0.0, 0.0); 8];
        data[0] = Complex64::new(1.0, 0.0);
        for bin in fft_recursive(&data) {
            assert!((bin - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        }
    }
}
