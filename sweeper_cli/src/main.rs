#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `sweeper` binary: run a coverage sweep, classify samples, inspect tables.

mod cli;
mod error_fmt;
mod run;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    let code = match real_main(cli) {
        Ok(code) => code,
        Err(e) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("error: {}", humanize(&e));
            }
            tracing::error!(error = %format!("{e:#}"), "command failed");
            exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn real_main(cli: Cli) -> eyre::Result<i32> {
    let json_mode = cli.json;
    let needs_config = matches!(cli.cmd, Commands::Run { .. } | Commands::SelfCheck);
    let loaded = if needs_config {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| cli::DEFAULT_CONFIG.into());
        Some(run::load_config(&path)?)
    } else {
        run::load_optional_config(cli.config.as_deref())?
    };

    init_tracing(
        json_mode,
        cli.log_level.as_deref(),
        loaded.as_ref().map(|l| &l.cfg.logging),
    );

    let table = run::resolve_table(cli.substances.as_deref(), loaded.as_ref())?;

    match cli.cmd {
        Commands::Run {
            drive_ms,
            max_cycles,
            sim_time,
            sim_samples,
        } => {
            let loaded = loaded.ok_or_else(|| eyre::eyre!("read config: no config loaded"))?;
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = Arc::clone(&shutdown);
                if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                    tracing::warn!(error = %e, "failed to install Ctrl-C handler");
                }
            }
            let report = run::run_sweep(
                &loaded,
                table,
                run::RunArgs {
                    drive_ms,
                    max_cycles,
                    sim_time,
                    sim_samples,
                },
                shutdown,
            )?;
            run::print_report(&report, json_mode);
            Ok(run::exit_code_for_outcome(report.outcome))
        }
        Commands::Classify {
            signature,
            amount,
            max_distance,
        } => {
            let signature: [f32; 3] = signature
                .try_into()
                .map_err(|_| eyre::eyre!("--signature needs exactly 3 values"))?;
            run::classify_one(&table, signature, amount, max_distance, json_mode)?;
            Ok(0)
        }
        Commands::Substances => {
            run::list_substances(&table, json_mode);
            Ok(0)
        }
        Commands::SelfCheck => {
            let loaded = loaded.ok_or_else(|| eyre::eyre!("read config: no config loaded"))?;
            run::self_check(&loaded, table, json_mode)?;
            Ok(0)
        }
    }
}

/// Console layer on stderr (pretty or JSON) plus an optional JSON file layer.
///
/// Level precedence: `RUST_LOG`, then `--log-level`, then `[logging].level`.
fn init_tracing(json: bool, cli_level: Option<&str>, logging: Option<&sweeper_config::Logging>) {
    let level = cli_level
        .map(str::to_string)
        .or_else(|| logging.and_then(|l| l.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed(),
        );
    } else {
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .boxed(),
        );
    }

    if let Some(path) = logging.and_then(|l| l.file.as_deref()) {
        let path = std::path::Path::new(path);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sweeper.log".to_string());
        let rotation = logging.and_then(|l| l.rotation.as_deref()).unwrap_or("never");
        let appender = match rotation {
            "daily" => tracing_appender::rolling::daily(dir, name),
            "hourly" => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
    }

    let _ = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init();
}
