//! Top-level run state: repeats driving cycles until coverage completes, a
//! stop is requested, or a cycle cap is hit.

use crate::control::ControlLoop;
use crate::error::{Result, SweeperError};
use crate::status::{CycleOutcome, Detection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every column was covered.
    Finished,
    /// A stop signal ended the run.
    Stopped,
    /// `max_cycles` cycles ran without finishing.
    CycleLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub cycles: u32,
    /// Column the robot was in when the run ended.
    pub columns: u32,
    pub detections: Vec<Detection>,
    pub skipped_samples: u32,
}

#[derive(Debug)]
pub struct Session {
    control: ControlLoop,
    max_cycles: u32,
    state: RunState,
}

impl Session {
    /// `max_cycles == 0` means no cap.
    pub fn new(control: ControlLoop, max_cycles: u32) -> Self {
        Self {
            control,
            max_cycles,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn control(&self) -> &ControlLoop {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut ControlLoop {
        &mut self.control
    }

    pub fn start(&mut self) -> Result<()> {
        if self.state != RunState::Idle {
            return Err(eyre::Report::new(SweeperError::State(format!(
                "cannot start from {:?}",
                self.state
            ))));
        }
        self.control.begin();
        self.state = RunState::Running;
        tracing::info!(max_cycles = self.max_cycles, "session started");
        Ok(())
    }

    /// Request a stop. The drivetrain is stopped if the session was running.
    pub fn stop(&mut self) -> Result<()> {
        if self.state == RunState::Running {
            self.control.motor_stop()?;
        }
        self.state = RunState::Stopped;
        Ok(())
    }

    /// Drive cycles until the run ends. Requires a started session.
    ///
    /// On error the drivetrain has already been stopped (best-effort) and the
    /// session is left `Stopped`.
    pub fn run(&mut self) -> Result<RunReport> {
        if self.state != RunState::Running {
            return Err(eyre::Report::new(SweeperError::State(format!(
                "cannot run from {:?}",
                self.state
            ))));
        }
        let mut detections = Vec::new();
        let mut skipped_samples = 0u32;
        let mut cycles = 0u32;

        let outcome = loop {
            if self.max_cycles > 0 && cycles >= self.max_cycles {
                if let Err(e) = self.control.motor_stop() {
                    self.state = RunState::Stopped;
                    return Err(e);
                }
                break RunOutcome::CycleLimit;
            }
            let step = match self.control.run_cycle() {
                Ok(s) => s,
                Err(e) => {
                    self.state = RunState::Stopped;
                    return Err(e);
                }
            };
            match step {
                CycleOutcome::Finished => break RunOutcome::Finished,
                CycleOutcome::Aborted => break RunOutcome::Stopped,
                CycleOutcome::SampleSkipped => {
                    cycles += 1;
                    skipped_samples += 1;
                }
                CycleOutcome::Sampled { detection } => {
                    cycles += 1;
                    detections.extend(detection);
                }
            }
        };
        self.state = RunState::Stopped;

        let report = RunReport {
            outcome,
            cycles: self.control.cycles(),
            columns: self.control.coverage().current_column.index(),
            detections,
            skipped_samples,
        };
        tracing::info!(
            outcome = ?report.outcome,
            cycles = report.cycles,
            columns = report.columns,
            detections = report.detections.len(),
            skipped = report.skipped_samples,
            "session ended"
        );
        Ok(report)
    }
}
