//! End-to-end screening session: acquisition queue → recorder and pipeline →
//! risk, grip and report.

use neuroscreen::acquisition::{burst_to_microvolts, SampleQueue};
use neuroscreen::config::ScreeningConfig;
use neuroscreen::recorder::{read_header, read_recording};
use neuroscreen::{
    grip_strength, risk_from_bands, BiosignalRecorder, BrainwaveProcessor, CognitiveScores,
    ContactQuality, FluctuationMonitor, Gender, ReportContext, ReportEncoder, TestPhase,
};
use std::f64::consts::PI;
use std::fs::File;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const SAMPLE_RATE: f64 = 520.0;

/// 10 Hz sine as raw ADC counts (0.2 uV per count)
fn alpha_counts(len: usize) -> Vec<i32> {
    (0..len)
        .map(|i| (250.0 * (2.0 * PI * 10.0 * i as f64 / SAMPLE_RATE).sin()).round() as i32)
        .collect()
}

#[test]
fn test_full_session() {
    let config = ScreeningConfig::default();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("closed_eyes.edf");

    let counts = alpha_counts(2048);
    let queue = Arc::new(SampleQueue::new(config.queue_capacity));
    let done = Arc::new(AtomicBool::new(false));

    let producer = {
        let queue = Arc::clone(&queue);
        let done = Arc::clone(&done);
        let scale = config.adc_scale_uv;
        let counts = counts.clone();
        thread::spawn(move || {
            for burst in counts.chunks(26) {
                // Producer never outruns the consumer by more than the queue holds
                while queue.len() >= 90 {
                    thread::yield_now();
                }
                queue.push_burst(burst_to_microvolts(burst, scale));
            }
            done.store(true, Ordering::Release);
        })
    };

    let mut recorder =
        BiosignalRecorder::create(&path, "P-001", "closed-eyes", &config.recorder).unwrap();
    let mut monitor = FluctuationMonitor::from_config(&config);
    let mut capture = Vec::new();

    loop {
        let finished = done.load(Ordering::Acquire);
        let bursts = queue.drain(config.max_bursts_per_drain);
        if bursts.is_empty() && finished {
            break;
        }
        for burst in bursts {
            recorder.add_samples(&burst).unwrap();
            monitor.push_burst(&burst);
            capture.extend(burst);
        }
        thread::yield_now();
    }
    producer.join().unwrap();
    recorder.finish().unwrap();

    assert_eq!(capture.len(), 2048);
    assert_eq!(queue.dropped_bursts(), 0);
    assert_eq!(monitor.state(), ContactQuality::Stable);

    // Recording holds every sample and a patched record count
    let header = read_header(&mut File::open(&path).unwrap()).unwrap();
    assert_eq!(header.record_count, 2048);
    let (_, stored) = read_recording(&mut File::open(&path).unwrap()).unwrap();
    assert_eq!(stored.len(), 2048);

    // Spectral pipeline
    let processor = BrainwaveProcessor::with_config(&config).unwrap();
    let outcome = processor.process(TestPhase::ClosedEyes, &capture, false);
    assert!(outcome.success, "{:?}", outcome.error_message);
    let bands = outcome.bands.unwrap();
    assert!(bands.alpha > bands.beta);
    assert!(bands.alpha > bands.theta);

    // Risk recomputed from components equals the live value
    let scores = CognitiveScores::new(Some(28.0), Some(26.0));
    let risk = risk_from_bands(&bands, &scores);
    assert!((0.0..=100.0).contains(&risk.risk_score));
    assert!((risk.final_index - bands.final_index).abs() < 1e-9);

    let grip = grip_strength(Gender::Female, 67, 20.8);
    assert!((grip.percentage - 60.0).abs() < 1e-9);
    assert!((grip.score - 40.0).abs() < 1e-9);

    let context = ReportContext {
        patient_id: Some("P-001".to_string()),
        scores,
        grip: Some(grip),
        contact: Some(monitor.state()),
        dropped_bursts: queue.dropped_bursts(),
        include_diagnostics: false,
    };
    let report = ReportEncoder::new().encode(&outcome, &context).unwrap();
    assert_eq!(report.risk, risk);
    assert!(report.quality_flags.is_empty());
    assert_eq!(report.phase, TestPhase::ClosedEyes);
}

#[test]
fn test_failed_capture_does_not_produce_report() {
    let outcome = BrainwaveProcessor::new().process(TestPhase::OpenEyes, &[], true);
    assert!(!outcome.success);

    let result = ReportEncoder::new().encode(&outcome, &ReportContext::default());
    assert!(result.is_err());
}
