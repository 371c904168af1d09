#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core sweeping logic (hardware-agnostic).
//!
//! All hardware interactions go through the `sweeper_traits` seams
//! (`Drivetrain`, `Odometer`, `SignatureSensor`, `AmountSensor`, `Feedback`).
//!
//! ## Architecture
//!
//! - **Position**: column-relative distance from cumulative odometry (`position`)
//! - **Substances**: known profiles and their limits (`substance`)
//! - **Classification**: sample vs. table, exact or nearest match (`classifier`)
//! - **Navigation**: boustrophedon column state machine (`navigator`)
//! - **Control**: fixed-budget drive cycles with boundary handling (`control`)
//! - **Session**: run-level state machine over repeated cycles (`session`)

pub mod alert;
pub mod builder;
pub mod classifier;
pub mod config;
pub mod control;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod navigator;
pub mod position;
pub mod session;
pub mod status;
pub mod substance;

pub use alert::AlertPattern;
pub use builder::{ControlLoopBuilder, Missing, Set};
pub use classifier::{MatchPolicy, Sample, SampleClassifier, classify};
pub use config::{CycleCfg, RobotCfg, SurfaceArea};
pub use control::ControlLoop;
pub use error::{BuildError, Result, SweeperError};
pub use navigator::{
    Column, CoverageNavigator, CoverageState, Decision, ManeuverStep, NavState, Parity, Position,
    TurnDirection, TurnPlan,
};
pub use position::PositionTracker;
pub use session::{RunOutcome, RunReport, RunState, Session};
pub use status::{CycleOutcome, Detection};
pub use substance::{Signature, SubstanceProfile, SubstanceTable, Unit};
