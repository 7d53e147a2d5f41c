//! Neuroscreen CLI - Command-line interface for the Neuroscreen engine
//!
//! Commands:
//! - analyze: Run the spectral pipeline on a capture (optionally emit a full report)
//! - record: Write samples into an EDF-style recording
//! - inspect: Print the header of a recording
//! - grip: Grip-strength percentile lookup
//! - risk: Risk score from a final index or band components
//! - config: Print the default configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use neuroscreen::acquisition::{burst_to_microvolts, parse_samples, SampleQueue};
use neuroscreen::encoder::{ReportContext, ReportEncoder};
use neuroscreen::grip::PercentileTable;
use neuroscreen::recorder::{read_recording, BiosignalRecorder, DEFAULT_PATIENT_ID, DEFAULT_RECORDING_ID};
use neuroscreen::risk::{assess, risk_from_bands};
use neuroscreen::{
    BandResult, BrainwaveProcessor, CognitiveScores, ComputeError, FluctuationMonitor, Gender,
    ScreeningConfig, TestPhase, NEUROSCREEN_VERSION, PRODUCER_NAME,
};

/// Samples pushed per simulated acquisition burst (100 ms at 520 Hz)
const BURST_LEN: usize = 52;

/// Neuroscreen - EEG biomarker and cognitive-risk screening engine
#[derive(Parser)]
#[command(name = "neuroscreen")]
#[command(version = NEUROSCREEN_VERSION)]
#[command(about = "Spectral EEG biomarkers, risk scoring and biosignal recording", long_about = None)]
struct Cli {
    /// Logging verbosity level (written to stderr)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Configuration file (JSON); defaults are used when omitted or missing
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one capture
    Analyze {
        /// Samples file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Capture phase
        #[arg(long, value_enum, default_value = "closed-eyes")]
        phase: PhaseArg,

        /// Samples are raw ADC counts rather than microvolts
        #[arg(long)]
        adc: bool,

        /// Include conditioned, spectrum and relative-power series
        #[arg(long)]
        diagnostics: bool,

        /// Emit a full screening report instead of the bare outcome
        #[arg(long)]
        report: bool,

        /// Patient identifier for the report
        #[arg(long)]
        patient_id: Option<String>,

        /// MoCA score (0-30)
        #[arg(long)]
        moca: Option<f64>,

        /// MMSE score (0-30)
        #[arg(long)]
        mmse: Option<f64>,
    },

    /// Write samples into a recording file
    Record {
        /// Samples file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Recording file to create
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value = DEFAULT_PATIENT_ID)]
        patient_id: String,

        #[arg(long, default_value = DEFAULT_RECORDING_ID)]
        recording_id: String,
    },

    /// Print a recording header as JSON
    Inspect {
        /// Recording file
        file: PathBuf,

        /// Also print samples converted back to physical units
        #[arg(long)]
        samples: bool,
    },

    /// Grip-strength percentile and score
    Grip {
        /// Gender tag (male/female, m/f)
        #[arg(long)]
        gender: String,

        /// Age in years
        #[arg(long)]
        age: u32,

        /// Grip reading in kg
        #[arg(long)]
        value: f64,

        /// Custom percentile table (JSON)
        #[arg(long)]
        table: Option<PathBuf>,
    },

    /// Risk score from a final index or from band components
    Risk {
        #[arg(long, conflicts_with_all = ["theta", "alpha", "beta"])]
        final_index: Option<f64>,

        #[arg(long, requires_all = ["alpha", "beta"])]
        theta: Option<f64>,

        #[arg(long, requires_all = ["theta", "beta"])]
        alpha: Option<f64>,

        #[arg(long, requires_all = ["theta", "alpha"])]
        beta: Option<f64>,

        #[arg(long)]
        moca: Option<f64>,

        #[arg(long)]
        mmse: Option<f64>,
    },

    /// Print the effective configuration as JSON
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum PhaseArg {
    OpenEyes,
    ClosedEyes,
}

impl From<PhaseArg> for TestPhase {
    fn from(p: PhaseArg) -> Self {
        match p {
            PhaseArg::OpenEyes => TestPhase::OpenEyes,
            PhaseArg::ClosedEyes => TestPhase::ClosedEyes,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("{}", error_json(e));
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_json(e));
            ExitCode::FAILURE
        }
    }
}

fn error_json(e: NeuroscreenCliError) -> String {
    serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
}

fn init_logging(level: &str) -> Result<(), NeuroscreenCliError> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(NeuroscreenCliError::Usage(format!("unknown log level: {}", other))),
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| NeuroscreenCliError::Usage(e.to_string()))
}

fn run(cli: Cli) -> Result<(), NeuroscreenCliError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            input,
            phase,
            adc,
            diagnostics,
            report,
            patient_id,
            moca,
            mmse,
        } => cmd_analyze(
            &config,
            &input,
            phase.into(),
            adc,
            diagnostics,
            report,
            patient_id,
            CognitiveScores::new(moca, mmse),
        ),

        Commands::Record {
            input,
            output,
            patient_id,
            recording_id,
        } => cmd_record(&config, &input, &output, &patient_id, &recording_id),

        Commands::Inspect { file, samples } => cmd_inspect(&file, samples),

        Commands::Grip {
            gender,
            age,
            value,
            table,
        } => cmd_grip(&gender, age, value, table.as_deref()),

        Commands::Risk {
            final_index,
            theta,
            alpha,
            beta,
            moca,
            mmse,
        } => cmd_risk(
            final_index,
            theta.zip(alpha).zip(beta).map(|((t, a), b)| (t, a, b)),
            CognitiveScores::new(moca, mmse),
        ),

        Commands::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ScreeningConfig, NeuroscreenCliError> {
    match path {
        Some(path) => Ok(ScreeningConfig::load(path)?),
        None => Ok(ScreeningConfig::default()),
    }
}

fn read_input(input: &Path) -> Result<String, NeuroscreenCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("Reading samples from the terminal; finish with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_analyze(
    config: &ScreeningConfig,
    input: &Path,
    phase: TestPhase,
    adc: bool,
    diagnostics: bool,
    report: bool,
    patient_id: Option<String>,
    scores: CognitiveScores,
) -> Result<(), NeuroscreenCliError> {
    let mut samples = parse_samples(&read_input(input)?)?;
    if adc {
        let counts: Vec<i32> = samples.iter().map(|&s| s as i32).collect();
        samples = burst_to_microvolts(&counts, config.adc_scale_uv);
    }

    // Replay the capture through the acquisition queue and contact monitor
    let queue = SampleQueue::new(config.queue_capacity);
    let mut monitor = FluctuationMonitor::from_config(config);
    let mut capture = Vec::with_capacity(samples.len());
    for burst in samples.chunks(BURST_LEN) {
        queue.push_burst(burst.to_vec());
        for drained in queue.drain(config.max_bursts_per_drain) {
            monitor.push_burst(&drained);
            capture.extend(drained);
        }
    }
    info!(
        samples = capture.len(),
        contact = ?monitor.state(),
        "capture assembled"
    );

    let processor = BrainwaveProcessor::with_config(config)?;
    let outcome = processor.process(phase, &capture, diagnostics);
    if !outcome.success {
        return Err(NeuroscreenCliError::CaptureFailed(
            outcome.error_message.unwrap_or_default(),
        ));
    }

    if report {
        let context = ReportContext {
            patient_id,
            scores,
            grip: None,
            contact: Some(monitor.state()),
            dropped_bursts: queue.dropped_bursts(),
            include_diagnostics: diagnostics,
        };
        println!("{}", ReportEncoder::new().encode_to_json(&outcome, &context)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    Ok(())
}

fn cmd_record(
    config: &ScreeningConfig,
    input: &Path,
    output: &Path,
    patient_id: &str,
    recording_id: &str,
) -> Result<(), NeuroscreenCliError> {
    let samples = parse_samples(&read_input(input)?)?;

    let mut recorder = BiosignalRecorder::create(output, patient_id, recording_id, &config.recorder)?;
    recorder.add_samples(&samples)?;
    recorder.finish()?;

    let summary = RecordSummary {
        path: output.display().to_string(),
        records: recorder.record_count(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_inspect(file: &Path, with_samples: bool) -> Result<(), NeuroscreenCliError> {
    let mut reader = File::open(file)?;
    let (header, digital) = read_recording(&mut reader)?;

    let samples = match (with_samples, header.signals.first()) {
        (true, Some(signal)) => Some(digital.iter().map(|&d| signal.to_physical(d)).collect()),
        _ => None,
    };

    let report = InspectReport {
        stored_samples: digital.len(),
        header,
        samples,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_grip(
    gender: &str,
    age: u32,
    value: f64,
    table: Option<&Path>,
) -> Result<(), NeuroscreenCliError> {
    let gender: Gender = gender.parse()?;
    let result = match table {
        Some(path) => PercentileTable::from_json(&fs::read_to_string(path)?)?
            .grip_strength(gender, age, value),
        None => PercentileTable::standard().grip_strength(gender, age, value),
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_risk(
    final_index: Option<f64>,
    bands: Option<(f64, f64, f64)>,
    scores: CognitiveScores,
) -> Result<(), NeuroscreenCliError> {
    let assessment = match (final_index, bands) {
        (Some(index), _) => assess(index, &scores),
        (None, Some((theta, alpha, beta))) => risk_from_bands(
            &BandResult {
                theta,
                alpha,
                beta,
                final_index: neuroscreen::risk::final_index(theta, alpha, beta),
            },
            &scores,
        ),
        (None, None) => {
            return Err(NeuroscreenCliError::Usage(
                "provide --final-index or all of --theta, --alpha and --beta".to_string(),
            ))
        }
    };
    println!("{}", serde_json::to_string_pretty(&assessment)?);
    Ok(())
}

#[derive(serde::Serialize)]
struct RecordSummary {
    path: String,
    records: u64,
}

#[derive(serde::Serialize)]
struct InspectReport {
    header: neuroscreen::RecordingHeader,
    stored_samples: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<Vec<f64>>,
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum NeuroscreenCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    CaptureFailed(String),
    Usage(String),
}

impl From<io::Error> for NeuroscreenCliError {
    fn from(e: io::Error) -> Self {
        NeuroscreenCliError::Io(e)
    }
}

impl From<ComputeError> for NeuroscreenCliError {
    fn from(e: ComputeError) -> Self {
        NeuroscreenCliError::Compute(e)
    }
}

impl From<serde_json::Error> for NeuroscreenCliError {
    fn from(e: serde_json::Error) -> Self {
        NeuroscreenCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<NeuroscreenCliError> for CliError {
    fn from(e: NeuroscreenCliError) -> Self {
        match e {
            NeuroscreenCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            NeuroscreenCliError::Compute(e) => {
                let hint = match &e {
                    ComputeError::Validation(_) => "Check the input values and sample file",
                    ComputeError::Config(_) => "Run 'neuroscreen config' to see a valid configuration",
                    ComputeError::Recorder(_) => "Check that the file is a neuroscreen recording",
                    _ => "Check the capture for invalid samples",
                };
                CliError {
                    code: e.code().to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            NeuroscreenCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            NeuroscreenCliError::CaptureFailed(message) => CliError {
                code: "CAPTURE_FAILED".to_string(),
                message,
                hint: Some("Re-seat the electrode and repeat the capture".to_string()),
            },
            NeuroscreenCliError::Usage(message) => CliError {
                code: "USAGE_ERROR".to_string(),
                message,
                hint: Some(format!("Run '{} --help'", PRODUCER_NAME)),
            },
        }
    }
}
