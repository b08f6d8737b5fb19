//! key_teleop - drive a robot from the terminal
//!
//! Arrow keys step the linear and angular speed up or down, space stops.
//! Velocity commands go out on the `key_vel` topic (see `--topic`) at 10 Hz
//! while idle and immediately on every key press.
//!
//! Usage:
//!   cargo run -p key_teleop -- --steps 6 --record /tmp/cmd_vel.jsonl
//!
//! Controls:
//!   Up/Down    - Faster forward / backward
//!   Left/Right - Faster turn left / right
//!   Space      - Stop
//!   Ctrl+C     - Quit

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use std::fs::File;
use std::sync::Mutex;
use teleop_core::Scheduler;
use teleop_library::config::TeleopConfig;
use teleop_library::nodes::{CmdVelRecorderNode, KeyTeleopNode};
use teleop_library::terminal::{CrosstermWindow, DEFAULT_NUM_LINES};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let params = cli.to_params().context("failed to load parameters")?;
    let config = TeleopConfig::from_params(&params).context("invalid teleop configuration")?;
    tracing::info!(?config, "starting key_teleop");

    // open the file and subscribe before the terminal is taken over
    let recorder = cli
        .record
        .as_ref()
        .map(|path| {
            CmdVelRecorderNode::new(&config.topic, path)
                .with_context(|| format!("failed to open recording file {}", path.display()))
        })
        .transpose()?;

    let window = CrosstermWindow::open(DEFAULT_NUM_LINES).context("failed to take over the terminal")?;
    let teleop = KeyTeleopNode::new(window, &config)?;

    let mut scheduler = Scheduler::new().name("key_teleop");
    let shutdown = scheduler.shutdown_signal();
    scheduler.add(Box::new(teleop), 0, Some(true));
    if let Some(recorder) = recorder {
        scheduler.add(Box::new(recorder), 10, Some(true));
    }

    let handle = scheduler.spawn()?;
    shutdown.install_ctrlc_handler()?;

    // until Ctrl+C, either as a signal or as a raw-mode key press
    shutdown.wait();
    handle.stop()?;

    tracing::info!("key_teleop stopped");
    Ok(())
}

/// Logs go to `--log-file` when given, otherwise stderr; `RUST_LOG` wins over `--log-level`
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .with_context(|| format!("invalid log filter '{}'", cli.log_level))?;

    let (file_layer, stderr_layer) = match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            (
                Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false)),
                None,
            )
        }
        None => (None, Some(fmt::layer().with_writer(std::io::stderr))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}
