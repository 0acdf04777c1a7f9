mod cli;
mod drive;
mod error_fmt;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::drive::{DriveArgs, FilterArgs, config_error};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        flush_file_log();
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
    flush_file_log();
}

/// Drop the file writer guard so buffered log lines reach the disk.
fn flush_file_log() {
    if let Ok(mut guard) = FILE_GUARD.lock() {
        guard.take();
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(&cli, &cfg.logging)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    }) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }

    match cli.cmd {
        Commands::Drive {
            scenario,
            script,
            duration_s,
            realtime,
            telemetry_csv,
            platform,
        } => {
            let args = DriveArgs {
                scenario,
                script,
                duration_s,
                realtime,
                telemetry_csv,
                platform,
            };
            drive::run_drive(&cfg, &args, cli.json, &shutdown)
        }
        Commands::Filter {
            cutoff_hz,
            quality,
            rate_hz,
            samples,
            step,
        } => {
            let args = FilterArgs {
                cutoff_hz,
                quality,
                rate_hz,
                samples,
                step,
            };
            drive::run_filter(&cfg, &args, cli.json)
        }
        Commands::SelfCheck => {
            drive::self_check(&cfg)?;
            println!("OK");
            Ok(())
        }
        Commands::Health => {
            if cli.json {
                println!("{}", serde_json::json!({ "status": "ok" }));
            } else {
                println!("OK");
            }
            Ok(())
        }
    }
}

/// Read and validate the TOML config; defaults when no path is given.
fn load_config(path: Option<&Path>) -> eyre::Result<teleop_config::Config> {
    let Some(path) = path else {
        return Ok(teleop_config::Config::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))
        .map_err(|e| config_error(format!("{e:#}")))?;
    let cfg = teleop_config::load_toml(&text).map_err(config_error)?;
    cfg.validate().map_err(config_error)?;
    Ok(cfg)
}

/// Console layer on stderr, plus a JSON-lines file layer when `[logging] file` is set.
fn init_tracing(cli: &Cli, logging: &teleop_config::Logging) -> eyre::Result<()> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .map_err(|e| config_error(format!("invalid --log-level '{}': {e}", cli.log_level)))?;
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if cli.json {
        layers.push(console.json().with_filter(console_filter).boxed());
    } else {
        layers.push(console.compact().with_filter(console_filter).boxed());
    }

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| config_error("logging.file must name a file"))?;
        let appender = match logging.rotation.as_deref().unwrap_or("never") {
            "daily" => tracing_appender::rolling::daily(dir, name),
            "hourly" => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        if let Ok(mut slot) = FILE_GUARD.lock() {
            *slot = Some(guard);
        }
        let level = logging.level.as_deref().unwrap_or("info");
        let file_filter = EnvFilter::try_new(level)
            .map_err(|e| config_error(format!("invalid logging.level '{level}': {e}")))?;
        layers.push(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("install tracing subscriber")
}
