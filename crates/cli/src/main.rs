mod settings;

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use headface_core::detection::infrastructure::detector_factory;
use headface_core::pipeline::batch_logger::LogBatchLogger;
use headface_core::pipeline::detect_faces_use_case::DetectFacesUseCase;
use headface_core::pipeline::frame_coordinator::FrameCoordinator;
use headface_core::transport::domain::batch_sink::BatchSink;
use headface_core::transport::domain::batch_source::BatchSource;
use headface_core::transport::infrastructure::json_lines_sink::JsonLinesSink;
use headface_core::transport::infrastructure::json_lines_source::JsonLinesSource;

use settings::Settings;

/// Face detector node: reads head-detection batches as JSON lines and
/// publishes them with the faces found in each head's color crop.
#[derive(Parser)]
#[command(name = "headface", version)]
struct Cli {
    /// Inbound batches, one JSON message per line (default: stdin).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Outbound batches (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Settings file (default: per-user settings.json if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cascade file, or directory containing it.
    #[arg(long)]
    resource_path: Option<PathBuf>,

    /// Scan window growth per pyramid level (> 1.0).
    #[arg(long)]
    scale_factor: Option<f64>,

    /// Overlapping hits a detection needs before it is reported.
    #[arg(long)]
    min_neighbor_groups: Option<u32>,

    /// Smallest face width considered, in pixels.
    #[arg(long)]
    min_window_width: Option<u32>,

    /// Smallest face height considered, in pixels.
    #[arg(long)]
    min_window_height: Option<u32>,

    /// Drop a batch that takes longer than this to process.
    #[arg(long)]
    batch_timeout_ms: Option<u64>,
}

impl Cli {
    fn overrides(&self) -> Settings {
        Settings {
            resource_path: self.resource_path.clone(),
            scale_factor: self.scale_factor,
            min_neighbor_groups: self.min_neighbor_groups,
            min_window_width: self.min_window_width,
            min_window_height: self.min_window_height,
            batch_timeout_ms: self.batch_timeout_ms,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?.overlay(cli.overrides());
    let deadline = settings.batch_timeout()?;
    let adapter = detector_factory::init(settings.detector_config())?;
    let coordinator = Arc::new(FrameCoordinator::new(Arc::new(adapter)));

    let source = open_source(cli.input.as_ref())?;
    let sink = open_sink(cli.output.as_ref())?;

    let mut use_case = DetectFacesUseCase::new(
        source,
        sink,
        coordinator,
        deadline,
        Box::new(LogBatchLogger::default()),
    );
    let stats = use_case.execute()?;
    log::debug!("{stats:?}");
    Ok(())
}

fn open_source(path: Option<&PathBuf>) -> Result<Box<dyn BatchSource>, Box<dyn std::error::Error>> {
    let source: Box<dyn BatchSource> = match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| format!("cannot open input {}: {e}", path.display()))?;
            Box::new(JsonLinesSource::new(BufReader::new(file)))
        }
        None => Box::new(JsonLinesSource::new(BufReader::new(io::stdin()))),
    };
    Ok(source)
}

fn open_sink(path: Option<&PathBuf>) -> Result<Box<dyn BatchSink>, Box<dyn std::error::Error>> {
    let sink: Box<dyn BatchSink> = match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| format!("cannot create output {}: {e}", path.display()))?;
            Box::new(JsonLinesSink::new(BufWriter::new(file)))
        }
        None => Box::new(JsonLinesSink::new(io::stdout())),
    };
    Ok(sink)
}
