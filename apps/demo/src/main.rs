use anyhow::Context;
use clap::Parser;
use hatch::domain::config::HatchConfig;
use hatch::domain::widget::WidgetConfig;
use hatch::kernel::config::load_config;
use hatch_demo::{demo_config, parse_widget, simulate};
use hatch_logger::Logger;
use hatch_runtime::{RuntimeConfig, run_local};
use std::path::PathBuf;
use tracing::info;

/// Bootstraps widgets on a simulated page and mounts one of them.
#[derive(Debug, Parser)]
#[command(name = "hatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Simulates lazy widget loading on an in-memory page")]
struct Cli {
    /// Configuration file; `HATCH__*` environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Location handed to the mounted widget.
    #[arg(short, long, default_value = "/")]
    location: String,

    /// Extra widget as NAME=TAG, repeatable.
    #[arg(short, long = "widget", value_parser = parse_widget)]
    widgets: Vec<WidgetConfig>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config: HatchConfig = match &cli.config {
        Some(path) => load_config(Some(path)).context("Critical: Configuration is malformed")?,
        None => HatchConfig::default(),
    };
    config.widgets.extend(cli.widgets);
    let config = demo_config(config);

    let _logger = Logger::from_config(env!("CARGO_PKG_NAME"), &config.logging)?;

    let summary = run_local(&RuntimeConfig::default(), simulate(config, &cli.location))??;

    info!(
        registered = summary.report.registered.len(),
        failed = summary.report.failed.len(),
        mounted = summary.mounted.as_deref().unwrap_or("none"),
        injections = summary.injections,
        "Simulation finished"
    );

    Ok(())
}
