use anyhow::Context;
use clap::Parser;
use drillkit::{init_logging, load_settings, transform_file, BUILD_DATE, VERSION};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "drillkit")]
#[command(about = "Transform DXF drilling jobs into machine coordinates", long_about = None)]
#[command(version)]
struct Cli {
    /// Extraction payload (JSON)
    #[arg(value_name = "JOB", value_hint = clap::ValueHint::FilePath)]
    job: PathBuf,

    /// Settings file (.toml or .json). Defaults to the user config directory.
    #[arg(short, long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Write the output payload here instead of stdout
    #[arg(short, long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Apply exactly this many quarter turns; disables auto-rotation
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3))]
    rotations: Option<u8>,

    /// Keep only horizontal (edge) drilling
    #[arg(long)]
    horizontal_only: bool,

    /// Print the pipeline report as JSON on stderr
    #[arg(long)]
    report: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    tracing::debug!("drillkit {} (built {})", VERSION, BUILD_DATE);

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(rotations) = cli.rotations {
        settings.manual_rotations = rotations;
        settings.auto_rotation_enabled = false;
    }
    if cli.horizontal_only {
        settings.horizontal_only = true;
    }

    let output = transform_file(&cli.job, settings)?;
    let payload = serde_json::to_string_pretty(&output)?;

    match &cli.output {
        Some(path) => std::fs::write(path, payload)
            .with_context(|| format!("Failed to write output: {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{payload}")?;
        }
    }

    if cli.report {
        eprintln!("{}", serde_json::to_string_pretty(&output.report)?);
    }

    Ok(())
}
