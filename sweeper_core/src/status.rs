//! Outcomes reported by the control loop.

use crate::classifier::Sample;
use crate::substance::SubstanceProfile;

/// A sample that reached a known substance's limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub substance: SubstanceProfile,
    pub sample: Sample,
    /// Column the robot was in when the sample was taken.
    pub column: u32,
}

/// Result of one driving cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Drive budget used up; a sample was taken and classified.
    Sampled { detection: Option<Detection> },
    /// Drive budget used up but a sensor read failed; no classification.
    SampleSkipped,
    /// Coverage complete; drivetrain already stopped.
    Finished,
    /// Stop signal observed; drivetrain already stopped, no sample taken.
    Aborted,
}
