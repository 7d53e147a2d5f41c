//! Acquisition boundary
//!
//! The device callback thread pushes variable-length bursts into a bounded
//! `SampleQueue`; the consumer drains them on its own schedule. When the queue
//! is full the oldest burst is evicted, so the producer is never blocked.
//!
//! Also provides raw ADC conversion and plain-text sample I/O for phase exports.

use crate::error::ComputeError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Default number of bursts held before eviction
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Convert a raw device count to microvolts
pub fn adc_to_microvolts(count: i32, scale_uv: f64) -> f64 {
    count as f64 * scale_uv
}

/// Convert a burst of raw device counts to microvolts
pub fn burst_to_microvolts(counts: &[i32], scale_uv: f64) -> Vec<f64> {
    counts.iter().map(|&c| adc_to_microvolts(c, scale_uv)).collect()
}

/// Bounded, mutex-guarded burst queue with drop-oldest eviction
#[derive(Debug)]
pub struct SampleQueue {
    bursts: Mutex<VecDeque<Vec<f64>>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl Default for SampleQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl SampleQueue {
    /// Create a queue holding at most `capacity` bursts (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            bursts: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Enqueue a burst, evicting the oldest bursts beyond capacity.
    ///
    /// Returns the number of bursts evicted by this call.
    pub fn push_burst(&self, burst: Vec<f64>) -> usize {
        let mut evicted = 0;
        {
            let mut bursts = self.bursts.lock();
            bursts.push_back(burst);
            while bursts.len() > self.capacity {
                bursts.pop_front();
                evicted += 1;
            }
        }
        if evicted > 0 {
            let total = self.dropped.fetch_add(evicted as u64, Ordering::Relaxed) + evicted as u64;
            warn!(evicted, total_dropped = total, "acquisition queue full, dropped oldest bursts");
        }
        evicted
    }

    /// Take up to `max` bursts in arrival order
    pub fn drain(&self, max: usize) -> Vec<Vec<f64>> {
        let mut bursts = self.bursts.lock();
        let take = max.min(bursts.len());
        bursts.drain(..take).collect()
    }

    /// Take every queued burst in arrival order
    pub fn drain_all(&self) -> Vec<Vec<f64>> {
        let mut bursts = self.bursts.lock();
        bursts.drain(..).collect()
    }

    /// Take every queued burst, flattened into one sample series
    pub fn drain_samples(&self) -> Vec<f64> {
        self.drain_all().into_iter().flatten().collect()
    }

    /// Number of bursts currently queued
    pub fn len(&self) -> usize {
        self.bursts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bursts.lock().is_empty()
    }

    /// Total bursts evicted since creation
    pub fn dropped_bursts(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Parse samples separated by commas, semicolons or whitespace.
///
/// Lines starting with `#` are comments; a non-numeric first line is treated as a
/// header and skipped.
pub fn parse_samples(text: &str) -> Result<Vec<f64>, ComputeError> {
    let mut samples = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parsed = Vec::new();
        for field in trimmed
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|f| !f.is_empty())
        {
            match field.parse::<f64>() {
                Ok(value) => parsed.push(value),
                Err(_) if line_no == 0 && samples.is_empty() => {
                    parsed.clear();
                    break;
                }
                Err(_) => {
                    return Err(ComputeError::Validation(format!(
                        "line {}: invalid sample {:?}",
                        line_no + 1,
                        field
                    )))
                }
            }
        }
        samples.extend(parsed);
    }

    Ok(samples)
}

/// Write one sample per line
pub fn write_samples<W: Write>(writer: &mut W, samples: &[f64]) -> Result<(), ComputeError> {
    for sample in samples {
        writeln!(writer, "{}", sample)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_drop_oldest_eviction() {
        let queue = SampleQueue::new(3);
        for i in 0..5 {
            queue.push_burst(vec![i as f64]);
        }

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dropped_bursts(), 2);
        assert_eq!(queue.drain_all(), vec![vec![2.0], vec![3.0], vec![4.0]]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_limit_preserves_order() {
        let queue = SampleQueue::new(10);
        for i in 0..7 {
            queue.push_burst(vec![i as f64, i as f64 + 0.5]);
        }

        let first = queue.drain(5);
        assert_eq!(first.len(), 5);
        assert_eq!(first[0], vec![0.0, 0.5]);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain_samples(), vec![5.0, 5.5, 6.0, 6.5]);
    }

    #[test]
    fn test_concurrent_producer_consumer() {
        let queue = Arc::new(SampleQueue::new(1000));
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..500 {
                    queue.push_burst(vec![i as f64; 4]);
                }
            })
        };

        let mut received = Vec::new();
        while received.len() < 500 {
            received.extend(queue.drain(5));
            thread::yield_now();
        }
        producer.join().unwrap();

        assert_eq!(received.len(), 500);
        assert_eq!(received[499], vec![499.0; 4]);
        assert_eq!(queue.dropped_bursts(), 0);
    }

    #[test]
    fn test_adc_conversion() {
        assert_eq!(adc_to_microvolts(500, 0.2), 100.0);
        assert_eq!(burst_to_microvolts(&[-10, 0, 10], 0.2), vec![-2.0, 0.0, 2.0]);
    }

    #[test]
    fn test_parse_samples_formats() {
        let text = "sample\n1.5\n-2, 3;4\n# comment\n\n  5e1  \n";
        assert_eq!(parse_samples(text).unwrap(), vec![1.5, -2.0, 3.0, 4.0, 50.0]);
    }

    #[test]
    fn test_parse_samples_rejects_garbage() {
        let err = parse_samples("1.0\nabc\n").unwrap_err();
        assert!(matches!(err, ComputeError::Validation(_)));
    }

    #[test]
    fn test_write_then_parse() {
        let samples = vec![0.25, -17.0, 99.5];
        let mut buffer = Vec::new();
        write_samples(&mut buffer, &samples).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(parse_samples(&text).unwrap(), samples);
    }
}
