use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use matbench_core::{
    build_charts, render_charts, select_charts, write_report, PerformancePolicy, PlotterConfig,
    Renderer, ResultsContext,
};
use tracing::{info, warn};

/// Render throughput and timing charts from matrix benchmark results.
#[derive(Parser, Debug)]
#[command(name = "matbench-plot", version)]
struct Args {
    /// JSON config file; created with defaults if missing
    #[arg(short, long, default_value = "plotter.json")]
    config: PathBuf,

    /// Overrides `results_dir` from the config
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Overrides `plots_dir` from the config
    #[arg(long)]
    plots_dir: Option<PathBuf>,

    /// Render only the named chart (repeatable)
    #[arg(long = "only", value_name = "CHART")]
    only: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let mut config = PlotterConfig::load(&args.config)?;
    if let Some(dir) = args.results_dir {
        config.results_dir = dir;
    }
    if let Some(dir) = args.plots_dir {
        config.plots_dir = dir;
    }

    let specs = select_charts(&args.only)?;

    match config.performance {
        PerformancePolicy::Averaged => warn!(
            "aggregated Performance is the mean of per-trial throughput, \
             not throughput of the mean time"
        ),
        PerformancePolicy::Recomputed => {
            info!("aggregated Performance is recomputed from the mean time")
        }
    }

    let context = ResultsContext::load(&config.results_dir)?;
    let charts = build_charts(&context, &specs, config.performance)?;

    let mut renderer = Renderer::new(&config.plots_dir, config.width, config.height)?;
    let written = render_charts(&mut renderer, &charts)?;

    if config.write_report {
        write_report(&config.plots_dir, &charts)?;
    }

    info!(
        charts = written.len(),
        plots_dir = %config.plots_dir.display(),
        "done"
    );
    Ok(())
}
