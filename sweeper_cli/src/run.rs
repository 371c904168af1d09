//! Command implementations: config mapping, simulated robot assembly, output.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;
use serde_json::json;
use sweeper_core::{
    ControlLoop, MatchPolicy, RunOutcome, RunReport, Sample, SampleClassifier, Session,
    SubstanceTable, SurfaceArea,
};
use sweeper_hardware::SimRobot;
use sweeper_traits::{Clock, ManualClock, MonotonicClock};

use crate::cli::{DEFAULT_CONFIG, SimSample};

/// A loaded config plus the directory relative paths inside it resolve against.
pub struct LoadedConfig {
    pub cfg: sweeper_config::Config,
    pub dir: PathBuf,
}

/// Read, parse and validate the TOML config.
pub fn load_config(path: &Path) -> eyre::Result<LoadedConfig> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = sweeper_config::load_toml(&text)
        .map_err(|e| eyre::eyre!("parse config {}: {e}", path.display()))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(LoadedConfig { cfg, dir })
}

/// Load the config if one was given or the default file exists.
pub fn load_optional_config(path: Option<&Path>) -> eyre::Result<Option<LoadedConfig>> {
    match path {
        Some(p) => load_config(p).map(Some),
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            if default.exists() {
                load_config(default).map(Some)
            } else {
                Ok(None)
            }
        }
    }
}

/// Pick the substance table: `--substances` CSV, then the config's CSV, then
/// inline `[[substances]]`, then the builtin table.
pub fn resolve_table(
    cli_csv: Option<&Path>,
    loaded: Option<&LoadedConfig>,
) -> eyre::Result<SubstanceTable> {
    if let Some(p) = cli_csv {
        let rows = sweeper_config::load_substances_csv(p)?;
        tracing::debug!(path = %p.display(), n = rows.len(), "substance table from --substances");
        return Ok(SubstanceTable::try_from(rows.as_slice())?);
    }
    if let Some(l) = loaded {
        if let Some(rel) = &l.cfg.substances_csv {
            let p = l.dir.join(rel);
            let rows = sweeper_config::load_substances_csv(&p)?;
            tracing::debug!(path = %p.display(), n = rows.len(), "substance table from config CSV");
            return Ok(SubstanceTable::try_from(rows.as_slice())?);
        }
        if !l.cfg.substances.is_empty() {
            return Ok(SubstanceTable::try_from(l.cfg.substances.as_slice())?);
        }
    }
    Ok(SubstanceTable::builtin())
}

pub struct RunArgs {
    pub drive_ms: Option<u64>,
    pub max_cycles: Option<u32>,
    pub sim_time: bool,
    pub sim_samples: Vec<SimSample>,
}

fn build_control(
    loaded: &LoadedConfig,
    table: SubstanceTable,
    robot: &SimRobot,
    clock: Arc<dyn Clock + Send + Sync>,
    drive_ms: Option<u64>,
    stop: Option<Arc<AtomicBool>>,
) -> eyre::Result<ControlLoop> {
    let cfg = &loaded.cfg;
    let mut cycle: sweeper_core::CycleCfg = (&cfg.cycle).into();
    if let Some(ms) = drive_ms {
        cycle.drive_ms = ms;
    }
    let mut b = ControlLoop::builder()
        .with_drivetrain(robot.clone())
        .with_odometer(robot.clone())
        .with_sensors(robot.clone(), robot.clone())
        .with_feedback(robot.clone())
        .with_surface((&cfg.surface).into())
        .with_robot((&cfg.robot).into())
        .with_cycle(cycle)
        .with_table(table)
        .with_policy((&cfg.classifier).into())
        .with_alert((&cfg.alert).into())
        .with_clock(clock)
        .with_stop_debounce(cfg.stop.debounce_n);
    if let Some(flag) = stop {
        b = b.with_stop_check(move || flag.load(Ordering::Relaxed));
    }
    b.build()
}

/// Sweep the surface with the simulated robot; Ctrl-C is the stop signal.
pub fn run_sweep(
    loaded: &LoadedConfig,
    table: SubstanceTable,
    args: RunArgs,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<RunReport> {
    let clock: Arc<dyn Clock + Send + Sync> = if args.sim_time {
        Arc::new(ManualClock::new())
    } else {
        Arc::new(MonotonicClock::new())
    };
    let robot = SimRobot::new(Arc::clone(&clock));
    for s in &args.sim_samples {
        robot.queue_sample(s.signature, s.amount);
    }

    let control = build_control(
        loaded,
        table,
        &robot,
        clock,
        args.drive_ms,
        Some(shutdown),
    )?;
    let max_cycles = args.max_cycles.unwrap_or(loaded.cfg.cycle.max_cycles);
    tracing::info!(
        height_mm = loaded.cfg.surface.height_mm,
        width_mm = loaded.cfg.surface.width_mm,
        robot_width_mm = loaded.cfg.robot.width_mm,
        sim_time = args.sim_time,
        "sweep start"
    );
    let mut session = Session::new(control, max_cycles);
    session.start()?;
    session.run()
}

pub fn outcome_name(o: RunOutcome) -> &'static str {
    match o {
        RunOutcome::Finished => "finished",
        RunOutcome::Stopped => "stopped",
        RunOutcome::CycleLimit => "cycle_limit",
    }
}

/// Stable exit codes per run outcome.
pub fn exit_code_for_outcome(o: RunOutcome) -> i32 {
    match o {
        RunOutcome::Finished => 0,
        RunOutcome::Stopped => 2,
        RunOutcome::CycleLimit => 3,
    }
}

pub fn print_report(report: &RunReport, json_mode: bool) {
    if json_mode {
        let detections: Vec<_> = report
            .detections
            .iter()
            .map(|d| {
                json!({
                    "substance": d.substance.name,
                    "amount": d.sample.amount,
                    "upper_limit": d.substance.upper_limit,
                    "unit": d.substance.unit.symbol(),
                    "signature": d.sample.signature.components(),
                    "column": d.column,
                })
            })
            .collect();
        let obj = json!({
            "outcome": outcome_name(report.outcome),
            "cycles": report.cycles,
            "columns": report.columns,
            "skipped_samples": report.skipped_samples,
            "detections": detections,
        });
        println!("{obj}");
        return;
    }
    for d in &report.detections {
        println!(
            "DETECTED {} at {} {} (limit {}) in column {}",
            d.substance.name,
            d.sample.amount,
            d.substance.unit,
            d.substance.upper_limit,
            d.column
        );
    }
    println!(
        "sweep {}: {} column(s), {} cycle(s), {} detection(s), {} skipped sample(s)",
        outcome_name(report.outcome).replace('_', " "),
        report.columns,
        report.cycles,
        report.detections.len(),
        report.skipped_samples
    );
}

pub fn classify_one(
    table: &SubstanceTable,
    signature: [f32; 3],
    amount: f32,
    max_distance: Option<f32>,
    json_mode: bool,
) -> eyre::Result<()> {
    let policy = match max_distance {
        Some(d) if d.is_finite() && d >= 0.0 => MatchPolicy::Nearest { max_distance: d },
        Some(_) => eyre::bail!("--max-distance must be finite and >= 0"),
        None => MatchPolicy::Exact,
    };
    let sample = Sample::new(signature, amount);
    let hit = SampleClassifier::new(policy).classify(&sample, table);
    tracing::debug!(signature = %sample.signature, amount, ?policy, matched = hit.map(|p| p.name.as_str()), "classify");

    if json_mode {
        let obj = match hit {
            Some(p) => json!({
                "match": p.name,
                "amount": amount,
                "upper_limit": p.upper_limit,
                "unit": p.unit.symbol(),
            }),
            None => json!({ "match": null, "amount": amount }),
        };
        println!("{obj}");
    } else {
        match hit {
            Some(p) => println!(
                "{}: {} {} at or above limit {} {}",
                p.name, amount, p.unit, p.upper_limit, p.unit
            ),
            None => println!("no match: sample {} at {amount} is clean", sample.signature),
        }
    }
    Ok(())
}

pub fn list_substances(table: &SubstanceTable, json_mode: bool) {
    if json_mode {
        let rows: Vec<_> = table
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "signature": p.signature.components(),
                    "upper_limit": p.upper_limit,
                    "unit": p.unit.symbol(),
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(rows));
        return;
    }
    for p in table.iter() {
        println!(
            "{:<12} {:<20} {} {}",
            p.name,
            p.signature.to_string(),
            p.upper_limit,
            p.unit
        );
    }
}

/// Validate config and table and build a loop against the simulator.
pub fn self_check(
    loaded: &LoadedConfig,
    table: SubstanceTable,
    json_mode: bool,
) -> eyre::Result<()> {
    let shared: Vec<(String, String)> = table
        .shared_signatures()
        .into_iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();
    let n = table.len();
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(ManualClock::new());
    let robot = SimRobot::new(Arc::clone(&clock));
    let control = build_control(loaded, table, &robot, clock, None, None)?;
    let surface: &SurfaceArea = control.surface();
    let columns = surface.max_columns(control.robot().width_mm);

    if json_mode {
        println!(
            "{}",
            json!({
                "ok": true,
                "columns": columns,
                "substances": n,
                "shared_signatures": shared,
            })
        );
    } else {
        println!(
            "ok: {} x {} mm surface, {columns} column(s), {n} substance(s)",
            surface.height_mm, surface.width_mm
        );
        for (a, b) in &shared {
            println!("note: {a} and {b} share a signature; {a} wins");
        }
    }
    Ok(())
}
