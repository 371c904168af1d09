//! Type-state builder for `ControlLoop`.
//!
//! The builder enforces at compile time that a drivetrain, an odometer and the
//! sample sensors are provided before `build()` is available. `try_build()` is
//! always available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use sweeper_traits::{
    AmountSensor, Clock, Drivetrain, Feedback, MonotonicClock, Odometer, SignatureSensor,
    Stopwatch,
};

use crate::alert::AlertPattern;
use crate::classifier::{MatchPolicy, SampleClassifier};
use crate::config::{CycleCfg, RobotCfg, SurfaceArea};
use crate::control::ControlLoop;
use crate::error::{BuildError, Result};
use crate::mocks::NoopFeedback;
use crate::navigator::CoverageNavigator;
use crate::substance::SubstanceTable;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

#[derive(Default)]
struct Parts {
    drivetrain: Option<Box<dyn Drivetrain>>,
    odometer: Option<Box<dyn Odometer>>,
    sensors: Option<(Box<dyn SignatureSensor>, Box<dyn AmountSensor>)>,
    feedback: Option<Box<dyn Feedback>>,
    surface: Option<SurfaceArea>,
    robot: Option<RobotCfg>,
    cycle: Option<CycleCfg>,
    table: Option<SubstanceTable>,
    policy: Option<MatchPolicy>,
    alert: Option<AlertPattern>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    stop_check: Option<Box<dyn Fn() -> bool>>,
    stop_debounce_n: Option<u8>,
}

/// Builder for `ControlLoop`. All fields are validated on `build()`.
pub struct ControlLoopBuilder<D, O, P> {
    parts: Parts,
    _d: PhantomData<D>,
    _o: PhantomData<O>,
    _p: PhantomData<P>,
}

impl Default for ControlLoopBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            parts: Parts::default(),
            _d: PhantomData,
            _o: PhantomData,
            _p: PhantomData,
        }
    }
}

impl<D, O, P> ControlLoopBuilder<D, O, P> {
    fn retype<D2, O2, P2>(self) -> ControlLoopBuilder<D2, O2, P2> {
        ControlLoopBuilder {
            parts: self.parts,
            _d: PhantomData,
            _o: PhantomData,
            _p: PhantomData,
        }
    }

    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<ControlLoop> {
        let p = self.parts;
        let drivetrain = p
            .drivetrain
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDrivetrain))?;
        let odometer = p
            .odometer
            .ok_or_else(|| eyre::Report::new(BuildError::MissingOdometer))?;
        let (signature_sensor, amount_sensor) = p
            .sensors
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensors))?;
        let surface = p
            .surface
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSurface))?;
        let robot = p
            .robot
            .ok_or_else(|| eyre::Report::new(BuildError::MissingRobot))?;
        let cycle = p.cycle.unwrap_or_default();
        let policy = p.policy.unwrap_or_default();
        let alert = p.alert.unwrap_or_default();

        // ── Validation ───────────────────────────────────────────────────────
        surface.validate().map_err(eyre::Report::new)?;
        robot.validate_for(&surface).map_err(eyre::Report::new)?;
        if cycle.drive_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "drive_ms must be >= 1",
            )));
        }
        if cycle.poll_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "poll_ms must be >= 1",
            )));
        }
        if cycle.poll_ms > cycle.drive_ms {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "poll_ms must be <= drive_ms",
            )));
        }
        if let MatchPolicy::Nearest { max_distance } = policy {
            if !(max_distance.is_finite() && max_distance >= 0.0) {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "max_distance must be finite and >= 0",
                )));
            }
        }
        if alert.frequency_hz == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "alert frequency must be > 0",
            )));
        }

        let clock: Arc<dyn Clock + Send + Sync> = match p.clock {
            Some(c) => c,
            None => Arc::new(MonotonicClock::new()),
        };
        let stopwatch = Stopwatch::new(Arc::clone(&clock));

        Ok(ControlLoop {
            drivetrain,
            odometer,
            signature_sensor,
            amount_sensor,
            feedback: p.feedback.unwrap_or_else(|| Box::new(NoopFeedback)),
            surface,
            robot,
            cycle,
            table: p.table.unwrap_or_else(SubstanceTable::builtin),
            classifier: SampleClassifier::new(policy),
            alert,
            navigator: CoverageNavigator::new(),
            clock,
            stopwatch,
            stop_check: p.stop_check,
            stop_debounce_n: p.stop_debounce_n.unwrap_or(1),
            stop_count: 0,
            stop_latched: false,
            odometer_misses: 0,
            cycles: 0,
        })
    }
}

/// Chainable setters that do not affect type-state.
impl<D, O, P> ControlLoopBuilder<D, O, P> {
    pub fn with_feedback(mut self, feedback: impl Feedback + 'static) -> Self {
        self.parts.feedback = Some(Box::new(feedback));
        self
    }
    pub fn with_surface(mut self, surface: SurfaceArea) -> Self {
        self.parts.surface = Some(surface);
        self
    }
    pub fn with_robot(mut self, robot: RobotCfg) -> Self {
        self.parts.robot = Some(robot);
        self
    }
    pub fn with_cycle(mut self, cycle: CycleCfg) -> Self {
        self.parts.cycle = Some(cycle);
        self
    }
    /// Substance table to classify against; defaults to [`SubstanceTable::builtin`].
    pub fn with_table(mut self, table: SubstanceTable) -> Self {
        self.parts.table = Some(table);
        self
    }
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.parts.policy = Some(policy);
        self
    }
    pub fn with_alert(mut self, alert: AlertPattern) -> Self {
        self.parts.alert = Some(alert);
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.parts.clock = Some(clock);
        self
    }
    pub fn with_stop_check<F>(mut self, f: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.parts.stop_check = Some(Box::new(f));
        self
    }
    pub fn with_stop_debounce(mut self, n: u8) -> Self {
        self.parts.stop_debounce_n = Some(n.max(1));
        self
    }
}

// Setters that advance type-state
impl<O, P> ControlLoopBuilder<Missing, O, P> {
    pub fn with_drivetrain(
        mut self,
        drivetrain: impl Drivetrain + 'static,
    ) -> ControlLoopBuilder<Set, O, P> {
        self.parts.drivetrain = Some(Box::new(drivetrain));
        self.retype()
    }
}

impl<D, P> ControlLoopBuilder<D, Missing, P> {
    pub fn with_odometer(
        mut self,
        odometer: impl Odometer + 'static,
    ) -> ControlLoopBuilder<D, Set, P> {
        self.parts.odometer = Some(Box::new(odometer));
        self.retype()
    }
}

impl<D, O> ControlLoopBuilder<D, O, Missing> {
    pub fn with_sensors(
        mut self,
        signature: impl SignatureSensor + 'static,
        amount: impl AmountSensor + 'static,
    ) -> ControlLoopBuilder<D, O, Set> {
        self.parts.sensors = Some((Box::new(signature), Box::new(amount)));
        self.retype()
    }
}

impl ControlLoopBuilder<Set, Set, Set> {
    /// Build once every hardware seam is wired.
    pub fn build(self) -> Result<ControlLoop> {
        self.try_build()
    }
}
