// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! warble: a message-driven MQTT notification router.
//!
//! Default mode runs the dispatch engine as a service. `make-config`
//! and `make-hooks` emit the sample configuration and hook module;
//! `--plugin`/`--data` run a single sink standalone. Exit codes: 0 on
//! success, 2 on configuration or fatal startup errors, the signal
//! number after a clean drain on SIGTERM/SIGINT.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod logging;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use warble_config::{Ini, Settings, SAMPLE_CONFIG, SAMPLE_HOOKS};
use warble_engine::{run_plugin, Engine, HookRegistry, SinkFactories, SCRIPT_NAME};

#[derive(Parser)]
#[command(name = "warble", version, about = "Subscribe to MQTT topics and route notifications to pluggable sinks")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file (default: warble.ini, or $WARBLEINI)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Run a single sink standalone instead of the service
    #[arg(long, requires = "data")]
    plugin: Option<String>,

    /// JSON object with the item fields for --plugin
    #[arg(long)]
    data: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a sample configuration file to stdout
    MakeConfig,
    /// Print a sample hook module source to stdout
    MakeHooks,
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("{SCRIPT_NAME}: error: {error:#}");
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Some(Command::MakeConfig) => {
            print!("{SAMPLE_CONFIG}");
            return Ok(0);
        }
        Some(Command::MakeHooks) => {
            print!("{SAMPLE_HOOKS}");
            return Ok(0);
        }
        None => {}
    }

    let config_path = cli.config.unwrap_or_else(env::config_path);
    let ini = Ini::load(&config_path)
        .with_context(|| format!("cannot load configuration from {}", config_path.display()))?;
    let mut settings = Settings::from_ini(&ini, SCRIPT_NAME)?;
    if let Some(log_path) = env::log_path_override() {
        settings.logfile = Some(log_path);
    }

    let _log_guard = logging::init(&settings)?;
    tracing::info!(config = %config_path.display(), "starting {}", SCRIPT_NAME);

    let runtime = tokio::runtime::Runtime::new().context("cannot start async runtime")?;

    if let Some(plugin) = cli.plugin {
        let data = cli.data.as_deref().unwrap_or("{}");
        let data: serde_json::Value =
            serde_json::from_str(data).context("--data is not valid JSON")?;
        tracing::info!(plugin = plugin.as_str(), "running sink standalone");
        runtime.block_on(run_plugin(&ini, &plugin, &SinkFactories::new(), &data))?;
        return Ok(0);
    }

    std::env::set_current_dir(&settings.directory).with_context(|| {
        format!("cannot change directory to {}", settings.directory.display())
    })?;

    runtime.block_on(serve(&ini, &settings))
}

async fn serve(ini: &Ini, settings: &Settings) -> anyhow::Result<i32> {
    // The stock binary ships without hooks or custom sinks; embedders
    // register theirs here before bootstrap (see `warble make-hooks`)
    let hooks = HookRegistry::new();
    let factories = SinkFactories::new();

    let engine = Engine::bootstrap(ini, settings, hooks, factories)?;

    let signum = Arc::new(AtomicI32::new(0));
    spawn_signal_handler(engine.shutdown_token(), signum.clone())?;

    engine.run().await?;
    Ok(signum.load(Ordering::SeqCst))
}

/// Signal numbers used for the exit status.
const SIGINT: i32 = 2;
const SIGTERM: i32 = 15;

/// SIGTERM and SIGINT trigger a clean drain; the process then exits
/// with the signal number.
fn spawn_signal_handler(
    token: tokio_util::sync::CancellationToken,
    signum: Arc<AtomicI32>,
) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).context("cannot install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("cannot install SIGINT handler")?;

    tokio::spawn(async move {
        let received = tokio::select! {
            _ = sigterm.recv() => SIGTERM,
            _ = sigint.recv() => SIGINT,
        };
        tracing::info!(signal = received, "signal received, draining");
        signum.store(received, Ordering::SeqCst);
        token.cancel();
    });
    Ok(())
}
