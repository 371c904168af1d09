//! One fixed-budget driving cycle: drive, watch for boundaries, sample.

use std::sync::Arc;
use std::time::Duration;

use sweeper_traits::{
    AmountSensor, Clock, Drivetrain, Feedback, Odometer, SignatureSensor, Stopwatch,
};

use crate::alert::AlertPattern;
use crate::classifier::{Sample, SampleClassifier};
use crate::config::{CycleCfg, RobotCfg, SurfaceArea};
use crate::error::Result;
use crate::hw_error::hw_report;
use crate::navigator::{CoverageNavigator, CoverageState, Decision, ManeuverStep, TurnPlan};
use crate::status::{CycleOutcome, Detection};
use crate::substance::SubstanceTable;

/// Consecutive failed odometer reads tolerated before the cycle fails.
pub const ODOMETER_MISS_LIMIT: u32 = 3;

/// Coordinates navigator and classifier over the hardware seams.
///
/// The drivetrain is commanded only from here. Coverage state is owned by
/// the navigator and exposed read-only.
pub struct ControlLoop {
    pub(crate) drivetrain: Box<dyn Drivetrain>,
    pub(crate) odometer: Box<dyn Odometer>,
    pub(crate) signature_sensor: Box<dyn SignatureSensor>,
    pub(crate) amount_sensor: Box<dyn AmountSensor>,
    pub(crate) feedback: Box<dyn Feedback>,
    pub(crate) surface: SurfaceArea,
    pub(crate) robot: RobotCfg,
    pub(crate) cycle: CycleCfg,
    pub(crate) table: SubstanceTable,
    pub(crate) classifier: SampleClassifier,
    pub(crate) alert: AlertPattern,
    pub(crate) navigator: CoverageNavigator,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    // Measures forward-motion time only; paused around maneuvers
    pub(crate) stopwatch: Stopwatch<Arc<dyn Clock + Send + Sync>>,
    pub(crate) stop_check: Option<Box<dyn Fn() -> bool>>,
    pub(crate) stop_debounce_n: u8,
    pub(crate) stop_count: u8,
    // Latched until begin()
    pub(crate) stop_latched: bool,
    pub(crate) odometer_misses: u32,
    pub(crate) cycles: u32,
}

impl core::fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("surface", &self.surface)
            .field("robot", &self.robot)
            .field("coverage", self.navigator.state())
            .field("cycles", &self.cycles)
            .finish()
    }
}

impl ControlLoop {
    pub fn builder() -> crate::builder::ControlLoopBuilder<
        crate::builder::Missing,
        crate::builder::Missing,
        crate::builder::Missing,
    > {
        crate::builder::ControlLoopBuilder::default()
    }

    pub fn coverage(&self) -> &CoverageState {
        self.navigator.state()
    }

    pub fn navigator(&self) -> &CoverageNavigator {
        &self.navigator
    }

    pub fn is_done(&self) -> bool {
        self.navigator.is_done()
    }

    pub fn surface(&self) -> &SurfaceArea {
        &self.surface
    }

    pub fn robot(&self) -> &RobotCfg {
        &self.robot
    }

    pub fn table(&self) -> &SubstanceTable {
        &self.table
    }

    /// Cycles started so far (finished-without-moving calls excluded).
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Clear a latched stop signal. Call before resuming after a stop.
    pub fn begin(&mut self) {
        self.stop_latched = false;
        self.stop_count = 0;
    }

    /// Stop the drivetrain.
    pub fn motor_stop(&mut self) -> Result<()> {
        self.drivetrain
            .stop()
            .map_err(|e| hw_report(e).wrap_err("drivetrain stop"))
    }

    /// Run one driving cycle.
    ///
    /// Drives forward until `cycle.drive_ms` of forward motion has elapsed,
    /// handling column boundaries on the way, then stops and classifies a
    /// sample. Returns early on stop signal or when coverage completes.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome> {
        if self.navigator.is_done() {
            return Ok(CycleOutcome::Finished);
        }
        self.cycles = self.cycles.saturating_add(1);
        let deadline = Duration::from_millis(self.cycle.drive_ms);
        let poll = Duration::from_millis(self.cycle.poll_ms);

        self.stopwatch.reset();
        self.odometer_misses = 0;
        tracing::info!(
            cycle = self.cycles,
            column = self.navigator.state().current_column.index(),
            "cycle start"
        );
        self.drive_forward()?;

        while self.stopwatch.elapsed() < deadline {
            if self.stop_latched || self.poll_stop() {
                self.stop_best_effort("stop signal");
                tracing::info!(cycle = self.cycles, "cycle aborted by stop signal");
                return Ok(CycleOutcome::Aborted);
            }

            let raw = match self.odometer.distance() {
                Ok(v) => {
                    self.odometer_misses = 0;
                    v
                }
                Err(e) if self.odometer_misses + 1 < ODOMETER_MISS_LIMIT => {
                    self.odometer_misses += 1;
                    tracing::warn!(
                        error = %e,
                        misses = self.odometer_misses,
                        "odometer read failed; retrying next poll"
                    );
                    self.clock.sleep(poll);
                    continue;
                }
                Err(e) => {
                    self.stop_best_effort("odometer fault");
                    return Err(hw_report(e).wrap_err("reading odometer"));
                }
            };
            let position = self.navigator.track(raw);
            tracing::trace!(raw, y_mm = position.y_mm, "poll");

            if position.y_mm >= self.surface.height_mm {
                // Maneuver time must not count against the drive budget.
                self.stopwatch.pause();
                match self
                    .navigator
                    .on_tick(position, &self.surface, self.robot.width_mm)
                {
                    Decision::Finish => {
                        self.motor_stop()?;
                        tracing::info!(
                            cycle = self.cycles,
                            columns = self.navigator.state().current_column.index(),
                            "sweep complete"
                        );
                        return Ok(CycleOutcome::Finished);
                    }
                    Decision::Turn(plan) => {
                        self.execute_turn(&plan)?;
                        self.mark_column_start();
                        self.drive_forward()?;
                    }
                    Decision::Continue => {}
                }
                self.stopwatch.resume();
            }

            self.clock.sleep(poll);
        }

        self.motor_stop()?;
        AlertPattern::clear(&mut *self.feedback);

        let Some(sample) = self.take_sample() else {
            return Ok(CycleOutcome::SampleSkipped);
        };
        let column = self.navigator.state().current_column.index();
        let detection = self
            .classifier
            .classify(&sample, &self.table)
            .map(|profile| Detection {
                substance: profile.clone(),
                sample,
                column,
            });

        match &detection {
            Some(d) => {
                tracing::warn!(
                    substance = %d.substance.name,
                    amount = sample.amount,
                    upper_limit = d.substance.upper_limit,
                    unit = %d.substance.unit,
                    column,
                    "contamination detected"
                );
                self.alert.render(&mut *self.feedback, &*self.clock);
            }
            None => {
                tracing::debug!(
                    signature = %sample.signature,
                    amount = sample.amount,
                    column,
                    "sample clean"
                );
            }
        }
        Ok(CycleOutcome::Sampled { detection })
    }

    fn drive_forward(&mut self) -> Result<()> {
        self.drivetrain
            .drive(self.robot.drive_speed_mm_s, self.robot.turn_rate_deg_s)
            .map_err(|e| hw_report(e).wrap_err("drive forward"))
    }

    fn execute_turn(&mut self, plan: &TurnPlan) -> Result<()> {
        tracing::debug!(
            direction = ?plan.direction,
            lateral_mm = plan.lateral_mm,
            from_column = plan.from_column,
            "turn maneuver"
        );
        for step in plan.steps() {
            let r = match step {
                ManeuverStep::Turn { angle_deg } => self.drivetrain.turn(angle_deg),
                ManeuverStep::Straight { distance_mm } => self.drivetrain.straight(distance_mm),
            };
            if let Err(e) = r {
                self.stop_best_effort("maneuver fault");
                return Err(hw_report(e).wrap_err("turn maneuver"));
            }
        }
        Ok(())
    }

    /// Baseline the new column while the robot is still stationary, so the
    /// first poll of forward travel is counted. A failed read leaves the
    /// baseline to the next poll.
    fn mark_column_start(&mut self) {
        match self.odometer.distance() {
            Ok(raw) => {
                if self.navigator.mark_column_start(raw) {
                    tracing::trace!(raw, "column start");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "odometer read after turn failed; baselining on next poll");
            }
        }
    }

    /// Read both sample channels; a failed read skips this sample.
    fn take_sample(&mut self) -> Option<Sample> {
        let signature = match self.signature_sensor.signature() {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "signature sensor read failed; skipping sample");
                return None;
            }
        };
        let amount = match self.amount_sensor.amount() {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!(error = %e, "amount sensor read failed; skipping sample");
                return None;
            }
        };
        Some(Sample::new(signature, amount))
    }

    fn stop_best_effort(&mut self, why: &'static str) {
        if let Err(e) = self.motor_stop() {
            tracing::warn!(error = %e, why, "drivetrain stop failed");
        }
    }

    /// Poll the stop input with debounce; returns true if latched.
    fn poll_stop(&mut self) -> bool {
        if let Some(check) = &self.stop_check {
            if check() {
                self.stop_count = self.stop_count.saturating_add(1);
                if self.stop_count >= self.stop_debounce_n {
                    self.stop_latched = true;
                }
            } else {
                self.stop_count = 0;
            }
        }
        self.stop_latched
    }
}
