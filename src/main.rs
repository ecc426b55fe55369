//! pageproof command line entry point.

use anyhow::{Context, Result};
use browser_session::Browser;
use clap::{Parser, Subcommand};
use pageproof_cli::{config, scenario_file, summary};
use scenario_flow::{FsArtifactSink, ScenarioRunner};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pageproof", version, about = "Scenario-driven browser verification")]
struct Cli {
    /// Log filter, e.g. `info` or `pageproof=debug`.
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario against a simulated site model.
    Run {
        /// Scenario file (json or yaml).
        scenario: PathBuf,

        /// Site model the scripted browser serves.
        #[arg(long)]
        site: PathBuf,

        /// Configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Base URL for relative navigation targets.
        #[arg(long)]
        base_url: Option<String>,

        /// Default per-step timeout, e.g. `10s` or `1500ms`.
        #[arg(long, value_parser = humantime::parse_duration)]
        timeout: Option<Duration>,

        /// Artifact output directory.
        #[arg(long)]
        artifacts_dir: Option<PathBuf>,
    },

    /// Parse and validate a scenario file without running it.
    Check {
        /// Scenario file (json or yaml).
        scenario: PathBuf,
    },
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    match run(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            std::process::exit(2);
        }
    }
}

async fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Check { scenario } => {
            let scenario = scenario_file::load_scenario(&scenario)?;
            println!("scenario {:?}: {} steps, ok", scenario.name, scenario.steps.len());
            Ok(0)
        }

        Commands::Run {
            scenario,
            site,
            config: config_file,
            base_url,
            timeout,
            artifacts_dir,
        } => {
            let mut app = config::load(config_file.as_deref())?;
            if let Some(base_url) = base_url {
                app.engine.base_url = Some(base_url);
            }
            if let Some(timeout) = timeout {
                app.engine.default_timeout_ms = timeout.as_millis() as u64;
            }
            if let Some(dir) = artifacts_dir {
                app.artifacts_dir = dir;
            }

            let scenario = scenario_file::load_scenario(&scenario)?;
            let site = scenario_file::load_site(&site)?;

            let browser = Arc::new(browser_session::ScriptedBrowser::new(site));
            browser
                .launch()
                .await
                .context("browser capability failed to launch")?;

            let sink = Arc::new(FsArtifactSink::new(app.artifacts_dir.clone()));
            let runner = ScenarioRunner::new(browser, app.engine, sink);

            // Ctrl-C cancels the run; the session is still closed and
            // remaining steps are recorded as skipped.
            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, cancelling run");
                    trigger.cancel();
                }
            });

            info!(scenario = %scenario.name, "running scenario");
            let result = runner.run_cancellable(&scenario, &cancel).await;

            print!("{}", summary::render(&result));
            Ok(summary::exit_code(&result))
        }
    }
}
