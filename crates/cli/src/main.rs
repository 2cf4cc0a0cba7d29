mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vidnorm_core::{
    load_config, validate_config, BatchRunner, Config, FfmpegEncoder, FfprobeProber,
    FilePipeline, FsReplacer, PolicyEngine, RunMode,
};

use cli::{Cli, Target};

type Runner = BatchRunner<FfprobeProber, FfmpegEncoder, FsReplacer>;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let target = cli.target().unwrap_or_else(|e| e.exit());

    init_tracing(cli.verbose);

    match run(&cli, target).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: &Cli, target: Target) -> Result<i32> {
    let mut config = load_config(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load config from {:?}", path),
        None => "Failed to load config".to_string(),
    })?;

    if let Some(jobs) = cli.jobs {
        config.batch.workers = Some(jobs);
    }
    if cli.sequential {
        config.batch.concurrent = false;
    }

    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    debug!(config_hash = &config_hash[..16], "Configuration loaded");

    let runner = build_runner(&config);

    match target {
        Target::All { root } => run_all(&runner, &config, &root).await,
        Target::Single { input, output } => run_single(&runner, &input, &output).await,
    }
}

fn build_runner(config: &Config) -> Runner {
    let pipeline = FilePipeline::new(
        FfprobeProber::new(config.probe.clone()),
        PolicyEngine::with_targets(config.targets.clone()),
        FfmpegEncoder::new(config.encoder.clone()),
        FsReplacer::new(config.replacer.clone()),
    );
    BatchRunner::new(pipeline, config.batch.clone())
}

async fn run_all(runner: &Runner, config: &Config, root: &Path) -> Result<i32> {
    let mode = config.batch.run_mode();
    let workers = match mode {
        RunMode::Concurrent { workers } => workers,
        RunMode::Sequential => 1,
    };
    info!(root = %root.display(), workers, "Normalizing videos in place");

    let report = runner
        .run_all(root, mode)
        .await
        .with_context(|| format!("Failed to process {}", root.display()))?;
    report.log_summary();
    Ok(report.exit_code())
}

async fn run_single(runner: &Runner, input: &Path, output: &Path) -> Result<i32> {
    runner.validate_tools().await?;

    info!(input = %input.display(), output = %output.display(), "Normalizing video");
    let report = runner.run_single(input, output).await;
    if report.skipped() > 0 {
        info!(
            output = %output.display(),
            "Input already within bounds; output not written"
        );
    }
    report.log_summary();
    Ok(report.exit_code())
}
