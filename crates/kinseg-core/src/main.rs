//! Kinseg - Kinematic Workflow Segmentation
//!
//! The main entry point for kinseg, handling:
//! - Training a segmentation model from labeled recorded procedures
//! - Batch segmentation of a recorded procedure (full Viterbi pass)
//! - Streaming replay of a recording through the real-time pipeline

use clap::{Args, Parser, Subcommand};
use kinseg_core::config::SegmentationConfig;
use kinseg_core::logging::{init_logging, LogConfig, LogFormat};
use kinseg_core::model::ModelSnapshot;
use kinseg_core::pipeline::{segment_procedure, StreamingSession};
use kinseg_core::procedure::RecordedProcedure;
use kinseg_core::train::train;
use kinseg_core::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Kinseg - workflow task segmentation for tracked motion
#[derive(Parser)]
#[command(name = "kinseg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Log level when KINSEG_LOG/RUST_LOG are unset (trace..error)
    #[arg(long, global = true, env = "KINSEG_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format on stderr
    #[arg(long, global = true, default_value = "human")]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from labeled procedures and persist the snapshot
    Train(TrainArgs),

    /// Segment a recorded procedure with a trained model (batch Viterbi)
    Segment(SegmentArgs),

    /// Replay a recording through the streaming pipeline tick by tick
    Stream(StreamArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Segmentation configuration (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Output path for the trained model snapshot
    #[arg(long, short = 'o')]
    out: PathBuf,

    /// Labeled procedure recordings (JSON), one file per procedure
    #[arg(required = true)]
    procedures: Vec<PathBuf>,
}

#[derive(Args)]
struct SegmentArgs {
    /// Trained model snapshot (JSON)
    #[arg(long)]
    model: PathBuf,

    /// Procedure recording to segment
    procedure: PathBuf,
}

#[derive(Args)]
struct StreamArgs {
    /// Trained model snapshot (JSON)
    #[arg(long)]
    model: PathBuf,

    /// Procedure recording to replay sample by sample
    procedure: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&LogConfig {
        level: cli.global.log_level.clone(),
        format: cli.global.log_format,
    });

    let result = match cli.command {
        Commands::Train(args) => cmd_train(args),
        Commands::Segment(args) => cmd_segment(args),
        Commands::Stream(args) => cmd_stream(args),
    };
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn cmd_train(args: TrainArgs) -> Result<()> {
    let config: SegmentationConfig =
        serde_json::from_str(&std::fs::read_to_string(&args.config)?)?;
    let mut corpus = Vec::with_capacity(args.procedures.len());
    for path in &args.procedures {
        let procedure = RecordedProcedure::load_json(path)?;
        corpus.push(procedure.to_labeled_series(&config)?);
    }
    let snapshot = train(&corpus, &config)?;
    snapshot.save_json(&args.out)?;
    info!(id = %snapshot.id, out = %args.out.display(), "model saved");
    println!(
        "{}",
        serde_json::json!({ "id": snapshot.id, "out": args.out })
    );
    Ok(())
}

fn cmd_segment(args: SegmentArgs) -> Result<()> {
    let model = ModelSnapshot::load_json(&args.model)?;
    let procedure = RecordedProcedure::load_json(&args.procedure)?;
    let series = procedure.to_series();
    let labels = segment_procedure(&model, &series)?;
    println!("{}", serde_json::to_string(&labels)?);
    Ok(())
}

fn cmd_stream(args: StreamArgs) -> Result<()> {
    let model = Arc::new(ModelSnapshot::load_json(&args.model)?);
    let procedure = RecordedProcedure::load_json(&args.procedure)?;
    if procedure.samples.is_empty() {
        return Err(Error::EmptyProcedure);
    }
    let mut session = StreamingSession::new(model)?;
    for sample in &procedure.samples {
        // A tick without a valid label withholds its line; the loop keeps
        // running.
        if let Some(task) = session.push(sample.time, sample.pose.clone()) {
            println!(
                "{}",
                serde_json::json!({ "time": sample.time, "task": task })
            );
        }
    }
    info!(ticks = session.ticks(), "stream replay complete");
    Ok(())
}
