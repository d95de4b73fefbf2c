use std::path::PathBuf;

use clap::Parser;

use shc_core::config::ShcConfig;
use shc_core::error::ShcResult;
use shc_engine::run::SpectralRun;
use shc_engine::streaming::StreamEmitter;
use shc_io::output::{write_result_json, write_table};
use shc_io::producer::{prepare_inputs, CommandCalculator, CommandCompactor};
use shc_io::snapshot::Snapshot;
use shc_io::velocity::VelocityReader;

#[derive(Parser)]
#[command(
    name = "shc-post",
    version,
    about = "Spectral heat current across an interface from MD velocities"
)]
struct Cli {
    #[arg(short, long)]
    config: PathBuf,
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    json: Option<PathBuf>,
    /// Continue from a snapshot written through `backup_prefix`.
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Emit NDJSON progress events on stderr.
    #[arg(long)]
    progress: bool,
}

fn main() -> Result<(), String> {
    if let Err(err) = run_cli() {
        return Err(err.to_string());
    }
    Ok(())
}

fn run_cli() -> ShcResult<()> {
    let cli = Cli::parse();
    let cfg = ShcConfig::load(&cli.config)?;
    let emitter = StreamEmitter::new(cli.progress);
    let feed = prepare_inputs(&cfg, &CommandCompactor::default(), &CommandCalculator::default())?;
    let run = match &cli.resume {
        Some(path) => {
            let snapshot = Snapshot::load(path)?;
            let reader = VelocityReader::open(&PathBuf::from(&cfg.velocity_file))?;
            SpectralRun::resume(cfg, &feed, reader, &snapshot)?
        }
        None => SpectralRun::open(cfg, &feed)?,
    };
    let summary = run.with_emitter(emitter).run()?;
    eprintln!(
        "processed {} chunks of {} timesteps ({} bins, stop: {}) in {:.3} s",
        summary.result.n_chunks,
        summary.result.chunk_size,
        summary.result.len(),
        summary.stop.as_str(),
        summary.elapsed.as_secs_f64()
    );
    let output = cli.output.unwrap_or_else(|| PathBuf::from("shc.txt"));
    write_table(&output, &summary.result)?;
    if let Some(path) = &cli.json {
        write_result_json(path, &summary.result)?;
    }
    Ok(())
}
