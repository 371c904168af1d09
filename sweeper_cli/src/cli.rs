//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub const DEFAULT_CONFIG: &str = "etc/sweeper_config.toml";

#[derive(Parser, Debug)]
#[command(name = "sweeper", version, about = "Coverage-path contamination sweeper")]
pub struct Cli {
    /// Path to config TOML (typed); defaults to etc/sweeper_config.toml
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Substance table CSV (strict header); overrides the config's table
    #[arg(long, value_name = "FILE")]
    pub substances: Option<PathBuf>,

    /// Log and report as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// A queued simulated sample: three signature components and an amount.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimSample {
    pub signature: [f32; 3],
    pub amount: f32,
}

/// Parse `a,b,c@amount`.
pub fn parse_sim_sample(s: &str) -> Result<SimSample, String> {
    let (sig, amount) = s
        .split_once('@')
        .ok_or_else(|| format!("expected 'a,b,c@amount', got '{s}'"))?;
    let parts: Vec<f32> = sig
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("bad signature '{sig}': {e}"))?;
    let signature: [f32; 3] = parts
        .try_into()
        .map_err(|_| format!("signature needs exactly 3 components, got '{sig}'"))?;
    let amount = amount
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("bad amount '{amount}': {e}"))?;
    Ok(SimSample { signature, amount })
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep the configured surface with the simulated robot
    Run {
        /// Override cycle.drive_ms: forward driving time per sample
        #[arg(long, value_name = "MS")]
        drive_ms: Option<u64>,
        /// Override cycle.max_cycles (0 = until the surface is covered)
        #[arg(long, value_name = "N")]
        max_cycles: Option<u32>,
        /// Run on simulated time instead of the wall clock
        #[arg(long, action = ArgAction::SetTrue)]
        sim_time: bool,
        /// Queue a sample for the simulated sensors, e.g. "20,17,44@2.5" (repeatable)
        #[arg(long = "sim-sample", value_name = "A,B,C@AMOUNT", value_parser = parse_sim_sample)]
        sim_samples: Vec<SimSample>,
    },
    /// Classify one sample against the active substance table
    Classify {
        /// Three signature components
        #[arg(long, num_args = 3, value_names = ["A", "B", "C"], allow_negative_numbers = true, required = true)]
        signature: Vec<f32>,
        /// Sensed amount, in each profile's unit
        #[arg(long)]
        amount: f32,
        /// Match the nearest signature within this distance instead of exactly
        #[arg(long, value_name = "DIST")]
        max_distance: Option<f32>,
    },
    /// List the active substance table
    Substances,
    /// Validate config and substance table without moving
    SelfCheck,
}
