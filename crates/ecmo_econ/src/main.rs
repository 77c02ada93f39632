use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;
use ecmo_econ::{Scenario, init_logging, render_text, run_scenario};
use ecmo_econ_core::model::Currency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Yaml,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "ecmo-econ")]
#[command(about = "Cost-effectiveness and budget impact of ECMO from a scenario file")]
struct Args {
    /// Scenario YAML file
    scenario: PathBuf,

    /// Override the scenario's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Currency amounts are shown in (text output only; default: the scenario's)
    #[arg(short, long)]
    currency: Option<Currency>,

    /// Drop invalid patient records instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Path to the data directory holding the log file (default: ~/.ecmo-econ/)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ecmo-econ")
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);

    init_logging(&data_dir, &args.log_level)?;

    let mut scenario = Scenario::load(&args.scenario)
        .wrap_err_with(|| format!("loading scenario {}", args.scenario.display()))?;
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }
    tracing::info!(
        scenario = scenario.display_name(),
        seed = scenario.seed,
        intervention = scenario.intervention.len(),
        comparator = scenario.comparator.len(),
        "scenario loaded"
    );

    let report = run_scenario(&scenario, args.skip_invalid)
        .wrap_err_with(|| format!("analysing {}", scenario.display_name()))?;

    let output = match args.format {
        OutputFormat::Text => {
            render_text(&report, args.currency.unwrap_or(report.currency))
        }
        OutputFormat::Yaml => serde_saphyr::to_string(&report).wrap_err("serializing report")?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(&report).wrap_err("serializing report")?
        }
    };
    println!("{output}");

    tracing::info!("report written");
    Ok(())
}
