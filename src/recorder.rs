//! Biosignal recording
//!
//! Streams raw samples into a fixed-layout EDF-style file: a space-padded ASCII
//! header followed by one little-endian `i16` per sample (one sample per data
//! record). The record count is written as a placeholder and patched in place
//! when the recording is sealed.
//!
//! Lifecycle: `Created -> HeaderWritten -> Appending -> Sealed`. Sealing happens
//! exactly once, either through `finish` or when the recorder is dropped.

use crate::config::RecorderConfig;
use crate::error::ComputeError;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Format version written in the first header field
pub const FORMAT_VERSION: &str = "0";

/// Patient id used when none is supplied
pub const DEFAULT_PATIENT_ID: &str = "X X X X";

/// Recording id used when none is supplied
pub const DEFAULT_RECORDING_ID: &str = "Startdate";

/// Size of the fixed part of the header
pub const FIXED_HEADER_BYTES: usize = 256;

/// Header bytes contributed by each signal
pub const SIGNAL_HEADER_BYTES: usize = 256;

/// Byte offset of the record-count field
pub const RECORD_COUNT_OFFSET: u64 = 236;

/// Record-count placeholder until the recording is sealed
const RECORD_COUNT_PLACEHOLDER: &str = "-1";

// Fixed header field widths, in write order
const VERSION_WIDTH: usize = 8;
const PATIENT_ID_WIDTH: usize = 80;
const RECORDING_ID_WIDTH: usize = 80;
const START_DATE_WIDTH: usize = 8;
const START_TIME_WIDTH: usize = 8;
const HEADER_BYTES_WIDTH: usize = 8;
const RESERVED_WIDTH: usize = 44;
const RECORD_COUNT_WIDTH: usize = 8;
const RECORD_DURATION_WIDTH: usize = 8;
const SIGNAL_COUNT_WIDTH: usize = 4;

// Per-signal field widths
const LABEL_WIDTH: usize = 16;
const TRANSDUCER_WIDTH: usize = 80;
const UNIT_WIDTH: usize = 8;
const PHYSICAL_WIDTH: usize = 8;
const DIGITAL_WIDTH: usize = 8;
const PREFILTER_WIDTH: usize = 80;
const SAMPLES_PER_RECORD_WIDTH: usize = 8;
const SIGNAL_RESERVED_WIDTH: usize = 32;

const DATE_FORMAT: &str = "%d.%m.%y";
const TIME_FORMAT: &str = "%H.%M.%S";

/// Metadata of one recorded signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDescriptor {
    pub label: String,
    pub transducer: String,
    pub physical_unit: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
    pub prefilter: String,
    pub samples_per_record: u32,
}

impl SignalDescriptor {
    /// Single-sample-per-record descriptor from recorder settings
    pub fn from_config(config: &RecorderConfig) -> Self {
        Self {
            label: config.label.clone(),
            transducer: config.transducer.clone(),
            physical_unit: config.physical_unit.clone(),
            physical_min: config.physical_min,
            physical_max: config.physical_max,
            digital_min: config.digital_min,
            digital_max: config.digital_max,
            prefilter: config.prefilter.clone(),
            samples_per_record: 1,
        }
    }

    /// Clamp to the physical range and rescale linearly into the digital range
    pub fn to_digital(&self, sample: f64) -> i16 {
        // max/min rather than clamp: a NaN sample maps to the physical minimum
        let physical = sample.max(self.physical_min).min(self.physical_max);
        let normalized = (physical - self.physical_min) / (self.physical_max - self.physical_min);
        let digital = (self.digital_min as f64
            + normalized * (self.digital_max - self.digital_min) as f64) as i32;
        digital
            .max(self.digital_min)
            .min(self.digital_max)
            .clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }

    /// Map a stored digital value back onto the physical scale
    pub fn to_physical(&self, digital: i16) -> f64 {
        let span = (self.digital_max - self.digital_min) as f64;
        let normalized = (digital as f64 - self.digital_min as f64) / span;
        self.physical_min + normalized * (self.physical_max - self.physical_min)
    }
}

/// Decoded or to-be-written recording header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingHeader {
    pub version: String,
    pub patient_id: String,
    pub recording_id: String,
    pub start: NaiveDateTime,
    pub header_bytes: usize,
    /// -1 while the recording is still open
    pub record_count: i64,
    pub record_duration_secs: f64,
    pub signals: Vec<SignalDescriptor>,
}

impl RecordingHeader {
    /// Header for a fresh recording with a single signal
    pub fn new(
        patient_id: &str,
        recording_id: &str,
        start: NaiveDateTime,
        config: &RecorderConfig,
    ) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            patient_id: patient_id.to_string(),
            recording_id: recording_id.to_string(),
            start,
            header_bytes: header_size(1),
            record_count: -1,
            record_duration_secs: config.record_duration_secs,
            signals: vec![SignalDescriptor::from_config(config)],
        }
    }

    /// Fixed-width ASCII encoding of the full header
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(header_size(self.signals.len()));
        let record_count = if self.record_count < 0 {
            RECORD_COUNT_PLACEHOLDER.to_string()
        } else {
            self.record_count.to_string()
        };

        push_field(&mut out, &self.version, VERSION_WIDTH);
        push_field(&mut out, &self.patient_id, PATIENT_ID_WIDTH);
        push_field(&mut out, &self.recording_id, RECORDING_ID_WIDTH);
        push_field(&mut out, &self.start.format(DATE_FORMAT).to_string(), START_DATE_WIDTH);
        push_field(&mut out, &self.start.format(TIME_FORMAT).to_string(), START_TIME_WIDTH);
        push_field(&mut out, &header_size(self.signals.len()).to_string(), HEADER_BYTES_WIDTH);
        push_field(&mut out, "", RESERVED_WIDTH);
        push_field(&mut out, &record_count, RECORD_COUNT_WIDTH);
        push_field(&mut out, &format!("{:.6}", self.record_duration_secs), RECORD_DURATION_WIDTH);
        push_field(&mut out, &self.signals.len().to_string(), SIGNAL_COUNT_WIDTH);

        for s in &self.signals {
            push_field(&mut out, &s.label, LABEL_WIDTH);
        }
        for s in &self.signals {
            push_field(&mut out, &s.transducer, TRANSDUCER_WIDTH);
        }
        for s in &self.signals {
            push_field(&mut out, &s.physical_unit, UNIT_WIDTH);
        }
        for s in &self.signals {
            push_field(&mut out, &format!("{:.6}", s.physical_min), PHYSICAL_WIDTH);
        }
        for s in &self.signals {
            push_field(&mut out, &format!("{:.6}", s.physical_max), PHYSICAL_WIDTH);
        }
        for s in &self.signals {
            push_field(&mut out, &s.digital_min.to_string(), DIGITAL_WIDTH);
        }
        for s in &self.signals {
            push_field(&mut out, &s.digital_max.to_string(), DIGITAL_WIDTH);
        }
        for s in &self.signals {
            push_field(&mut out, &s.prefilter, PREFILTER_WIDTH);
        }
        for s in &self.signals {
            push_field(&mut out, &s.samples_per_record.to_string(), SAMPLES_PER_RECORD_WIDTH);
        }
        for _ in &self.signals {
            push_field(&mut out, "", SIGNAL_RESERVED_WIDTH);
        }

        out
    }

    /// Decode a header from the start of `reader`
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, ComputeError> {
        let mut fixed = vec![0u8; FIXED_HEADER_BYTES];
        reader.read_exact(&mut fixed)?;
        let mut cursor = FieldCursor::new(&fixed);

        let version = cursor.text(VERSION_WIDTH)?;
        let patient_id = cursor.text(PATIENT_ID_WIDTH)?;
        let recording_id = cursor.text(RECORDING_ID_WIDTH)?;
        let date = cursor.text(START_DATE_WIDTH)?;
        let time = cursor.text(START_TIME_WIDTH)?;
        let header_bytes: usize = cursor.number(HEADER_BYTES_WIDTH, "header byte count")?;
        cursor.skip(RESERVED_WIDTH);
        let record_count: i64 = cursor.number(RECORD_COUNT_WIDTH, "record count")?;
        let record_duration_secs: f64 = cursor.number(RECORD_DURATION_WIDTH, "record duration")?;
        let signal_count: usize = cursor.number(SIGNAL_COUNT_WIDTH, "signal count")?;

        let start = NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .and_then(|d| NaiveTime::parse_from_str(&time, TIME_FORMAT).map(|t| d.and_time(t)))
            .map_err(|e| {
                ComputeError::Recorder(format!("invalid start timestamp {} {}: {}", date, time, e))
            })?;

        let mut signal_block = vec![0u8; signal_count * SIGNAL_HEADER_BYTES];
        reader.read_exact(&mut signal_block)?;
        let mut cursor = FieldCursor::new(&signal_block);

        let labels = cursor.texts(signal_count, LABEL_WIDTH)?;
        let transducers = cursor.texts(signal_count, TRANSDUCER_WIDTH)?;
        let units = cursor.texts(signal_count, UNIT_WIDTH)?;
        let physical_mins: Vec<f64> = cursor.numbers(signal_count, PHYSICAL_WIDTH, "physical min")?;
        let physical_maxs: Vec<f64> = cursor.numbers(signal_count, PHYSICAL_WIDTH, "physical max")?;
        let digital_mins: Vec<i32> = cursor.numbers(signal_count, DIGITAL_WIDTH, "digital min")?;
        let digital_maxs: Vec<i32> = cursor.numbers(signal_count, DIGITAL_WIDTH, "digital max")?;
        let prefilters = cursor.texts(signal_count, PREFILTER_WIDTH)?;
        let samples: Vec<u32> =
            cursor.numbers(signal_count, SAMPLES_PER_RECORD_WIDTH, "samples per record")?;

        let signals = (0..signal_count)
            .map(|i| SignalDescriptor {
                label: labels[i].clone(),
                transducer: transducers[i].clone(),
                physical_unit: units[i].clone(),
                physical_min: physical_mins[i],
                physical_max: physical_maxs[i],
                digital_min: digital_mins[i],
                digital_max: digital_maxs[i],
                prefilter: prefilters[i].clone(),
                samples_per_record: samples[i],
            })
            .collect();

        Ok(Self {
            version,
            patient_id,
            recording_id,
            start,
            header_bytes,
            record_count,
            record_duration_secs,
            signals,
        })
    }
}

/// Total header size for `signal_count` signals
pub fn header_size(signal_count: usize) -> usize {
    FIXED_HEADER_BYTES + SIGNAL_HEADER_BYTES * signal_count
}

/// Decode the header of a recording
pub fn read_header<R: Read>(reader: &mut R) -> Result<RecordingHeader, ComputeError> {
    RecordingHeader::read_from(reader)
}

/// Read a complete single-signal recording: header plus digital samples
pub fn read_recording<R: Read>(reader: &mut R) -> Result<(RecordingHeader, Vec<i16>), ComputeError> {
    let header = RecordingHeader::read_from(reader)?;
    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;
    if body.len() % 2 != 0 {
        return Err(ComputeError::Recorder(format!(
            "body length {} is not a whole number of 16-bit samples",
            body.len()
        )));
    }
    let samples = body
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok((header, samples))
}

/// Append `value` as a space-padded ASCII field, truncated to `width`
fn push_field(out: &mut Vec<u8>, value: &str, width: usize) {
    let mut bytes: Vec<u8> = value
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .take(width)
        .collect();
    bytes.resize(width, b' ');
    out.extend_from_slice(&bytes);
}

/// Sequential reader over fixed-width header fields
struct FieldCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn skip(&mut self, width: usize) {
        self.pos += width;
    }

    fn text(&mut self, width: usize) -> Result<String, ComputeError> {
        let end = self.pos + width;
        let field = self.bytes.get(self.pos..end).ok_or_else(|| {
            ComputeError::Recorder(format!("header truncated at byte {}", self.pos))
        })?;
        self.pos = end;
        Ok(String::from_utf8_lossy(field).trim_end().to_string())
    }

    fn number<T: std::str::FromStr>(&mut self, width: usize, name: &str) -> Result<T, ComputeError> {
        let text = self.text(width)?;
        text.trim()
            .parse()
            .map_err(|_| ComputeError::Recorder(format!("invalid {}: {:?}", name, text)))
    }

    fn texts(&mut self, count: usize, width: usize) -> Result<Vec<String>, ComputeError> {
        (0..count).map(|_| self.text(width)).collect()
    }

    fn numbers<T: std::str::FromStr>(
        &mut self,
        count: usize,
        width: usize,
        name: &str,
    ) -> Result<Vec<T>, ComputeError> {
        (0..count).map(|_| self.number(width, name)).collect()
    }
}

/// Recorder lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderState {
    Created,
    HeaderWritten,
    Appending,
    Sealed,
}

/// Single-session biosignal recorder.
///
/// Not thread-safe; callers confine it to one writer thread or wrap it in a mutex.
pub struct BiosignalRecorder<W: Write + Seek> {
    sink: Option<W>,
    header: RecordingHeader,
    state: RecorderState,
    records: u64,
    dropped_after_seal: u64,
}

impl BiosignalRecorder<BufWriter<File>> {
    /// Create (or truncate) a recording file
    pub fn create(
        path: &Path,
        patient_id: &str,
        recording_id: &str,
        config: &RecorderConfig,
    ) -> Result<Self, ComputeError> {
        let file = File::create(path)?;
        info!(path = %path.display(), "opened biosignal recording");
        Ok(Self::new(BufWriter::new(file), patient_id, recording_id, config))
    }
}

impl<W: Write + Seek> BiosignalRecorder<W> {
    /// Wrap a sink; the start timestamp is the current local time
    pub fn new(sink: W, patient_id: &str, recording_id: &str, config: &RecorderConfig) -> Self {
        let start = Local::now().naive_local();
        Self {
            sink: Some(sink),
            header: RecordingHeader::new(patient_id, recording_id, start, config),
            state: RecorderState::Created,
            records: 0,
            dropped_after_seal: 0,
        }
    }

    /// Override the start timestamp; ignored once the header is written
    pub fn with_start(mut self, start: NaiveDateTime) -> Self {
        if self.state == RecorderState::Created {
            self.header.start = start;
        }
        self
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn header(&self) -> &RecordingHeader {
        &self.header
    }

    /// Samples appended so far
    pub fn record_count(&self) -> u64 {
        self.records
    }

    /// Samples offered after sealing and discarded
    pub fn dropped_after_seal(&self) -> u64 {
        self.dropped_after_seal
    }

    /// Write the header once; later calls are no-ops
    pub fn write_header(&mut self) -> Result<(), ComputeError> {
        if self.state != RecorderState::Created {
            return Ok(());
        }
        let bytes = self.header.encode();
        self.sink_mut()?.write_all(&bytes)?;
        self.state = RecorderState::HeaderWritten;
        debug!(bytes = bytes.len(), "wrote recording header");
        Ok(())
    }

    /// Append one sample. After sealing the sample is discarded.
    pub fn add_sample(&mut self, sample: f64) -> Result<(), ComputeError> {
        if self.state == RecorderState::Sealed {
            self.dropped_after_seal += 1;
            if self.dropped_after_seal == 1 {
                warn!("sample appended to a sealed recording was dropped");
            }
            return Ok(());
        }
        self.write_header()?;

        let digital = self.header.signals[0].to_digital(sample);
        self.sink_mut()?.write_all(&digital.to_le_bytes())?;
        self.records += 1;
        self.state = RecorderState::Appending;
        Ok(())
    }

    /// Append a burst of samples in order
    pub fn add_samples(&mut self, samples: &[f64]) -> Result<(), ComputeError> {
        for &sample in samples {
            self.add_sample(sample)?;
        }
        Ok(())
    }

    /// Patch the record count, flush and release the sink. Idempotent.
    pub fn finish(&mut self) -> Result<(), ComputeError> {
        self.seal().map(|_| ())
    }

    /// Seal and hand back the underlying sink
    pub fn finish_into_inner(mut self) -> Result<W, ComputeError> {
        self.seal()?
            .ok_or_else(|| ComputeError::Recorder("recording was already sealed".to_string()))
    }

    fn seal(&mut self) -> Result<Option<W>, ComputeError> {
        if self.state == RecorderState::Sealed {
            return Ok(None);
        }
        self.write_header()?;

        let count = self.records.to_string();
        if count.len() > RECORD_COUNT_WIDTH {
            self.state = RecorderState::Sealed;
            self.sink = None;
            return Err(ComputeError::Recorder(format!(
                "record count {} does not fit the header field",
                count
            )));
        }

        let mut field = Vec::with_capacity(RECORD_COUNT_WIDTH);
        push_field(&mut field, &count, RECORD_COUNT_WIDTH);

        let mut sink = self
            .sink
            .take()
            .ok_or_else(|| ComputeError::Recorder("recording sink already released".to_string()))?;
        self.state = RecorderState::Sealed;

        sink.seek(SeekFrom::Start(RECORD_COUNT_OFFSET))?;
        sink.write_all(&field)?;
        sink.seek(SeekFrom::End(0))?;
        sink.flush()?;

        self.header.record_count = self.records as i64;
        info!(records = self.records, "sealed biosignal recording");
        Ok(Some(sink))
    }

    fn sink_mut(&mut self) -> Result<&mut W, ComputeError> {
        self.sink
            .as_mut()
            .ok_or_else(|| ComputeError::Recorder("recording sink already released".to_string()))
    }
}

impl<W: Write + Seek> Drop for BiosignalRecorder<W> {
    fn drop(&mut self) {
        if self.state != RecorderState::Sealed {
            if let Err(e) = self.seal() {
                warn!(error = %e, "failed to seal recording on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
    }

    fn recorder() -> BiosignalRecorder<Cursor<Vec<u8>>> {
        BiosignalRecorder::new(
            Cursor::new(Vec::new()),
            "patient-7",
            "closed-eyes",
            &RecorderConfig::default(),
        )
        .with_start(start())
    }

    #[test]
    fn test_header_layout() {
        let header = RecordingHeader::new("p", "r", start(), &RecorderConfig::default());
        let bytes = header.encode();

        assert_eq!(bytes.len(), 512);
        assert_eq!(&bytes[0..8], b"0       ");
        assert_eq!(&bytes[168..176], b"09.03.24");
        assert_eq!(&bytes[176..184], b"14.05.07");
        assert_eq!(&bytes[184..192], b"512     ");
        assert_eq!(&bytes[236..244], b"-1      ");
        assert_eq!(&bytes[244..252], b"0.010000");
        assert_eq!(&bytes[252..256], b"1   ");
        assert_eq!(&bytes[256..272], b"FP1             ");
        // unit, physical min/max follow label (16) and transducer (80)
        assert_eq!(&bytes[352..360], b"uV      ");
        assert_eq!(&bytes[360..368], b"-3000.00");
        assert_eq!(&bytes[368..376], b"3000.000");
        assert_eq!(&bytes[376..384], b"-32767  ");
        assert_eq!(&bytes[384..392], b"32767   ");
        assert_eq!(&bytes[472..480], b"1       ");
        assert!(bytes[480..512].iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_long_fields_truncated() {
        let long_id = "x".repeat(200);
        let header = RecordingHeader::new(&long_id, "r", start(), &RecorderConfig::default());
        let bytes = header.encode();
        assert_eq!(bytes.len(), 512);
        assert_eq!(&bytes[8..88], "x".repeat(80).as_bytes());
        assert_eq!(bytes[88], b'r');
    }

    #[test]
    fn test_digital_scaling() {
        let signal = SignalDescriptor::from_config(&RecorderConfig::default());
        assert_eq!(signal.to_digital(0.0), 0);
        assert_eq!(signal.to_digital(3000.0), 32767);
        assert_eq!(signal.to_digital(-3000.0), -32767);
        assert_eq!(signal.to_digital(9999.0), 32767);
        assert_eq!(signal.to_digital(-9999.0), -32767);
        assert_eq!(signal.to_digital(1500.0), 16383);
        assert!((signal.to_physical(32767) - 3000.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_count_patched_on_finish() {
        let mut rec = recorder();
        rec.add_samples(&[10.0, -20.0, 30.0, 0.0, 3000.0]).unwrap();
        assert_eq!(rec.state(), RecorderState::Appending);

        let bytes = rec.finish_into_inner().unwrap().into_inner();
        assert_eq!(bytes.len(), 512 + 5 * 2);

        let (header, samples) = read_recording(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(header.record_count, 5);
        assert_eq!(header.patient_id, "patient-7");
        assert_eq!(header.recording_id, "closed-eyes");
        assert_eq!(header.start, start());
        assert_eq!(header.signals[0].label, "FP1");
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[3], 0);
        assert_eq!(samples[4], 32767);
    }

    #[test]
    fn test_body_is_little_endian() {
        let mut rec = recorder();
        rec.add_sample(3000.0).unwrap();
        rec.add_sample(-3000.0).unwrap();
        let bytes = rec.finish_into_inner().unwrap().into_inner();
        assert_eq!(&bytes[512..516], &[0xFF, 0x7F, 0x01, 0x80]);
    }

    #[test]
    fn test_header_written_once() {
        let mut rec = recorder();
        rec.write_header().unwrap();
        rec.write_header().unwrap();
        assert_eq!(rec.state(), RecorderState::HeaderWritten);
        let bytes = rec.finish_into_inner().unwrap().into_inner();
        assert_eq!(bytes.len(), 512);
    }

    #[test]
    fn test_finish_without_samples() {
        let rec = recorder();
        let bytes = rec.finish_into_inner().unwrap().into_inner();
        let header = RecordingHeader::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(header.record_count, 0);
    }

    #[test]
    fn test_finish_is_idempotent_and_drops_late_samples() {
        let mut rec = recorder();
        rec.add_sample(1.0).unwrap();
        rec.finish().unwrap();
        rec.finish().unwrap();
        assert_eq!(rec.state(), RecorderState::Sealed);

        rec.add_sample(2.0).unwrap();
        rec.add_sample(3.0).unwrap();
        assert_eq!(rec.record_count(), 1);
        assert_eq!(rec.dropped_after_seal(), 2);
        assert!(rec.finish_into_inner().is_err());
    }

    #[test]
    fn test_file_sealed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.edf");
        {
            let mut rec =
                BiosignalRecorder::create(&path, "p", "r", &RecorderConfig::default()).unwrap();
            for i in 0..1000 {
                rec.add_sample((i % 50) as f64).unwrap();
            }
        }

        let mut file = File::open(&path).unwrap();
        let (header, samples) = read_recording(&mut file).unwrap();
        assert_eq!(header.record_count, 1000);
        assert_eq!(samples.len(), 1000);
    }

    #[test]
    fn test_truncated_header_rejected() {
        let err = RecordingHeader::read_from(&mut Cursor::new(vec![b' '; 100])).unwrap_err();
        assert!(matches!(err, ComputeError::Io(_)));
    }
}
