//! Hardware backends for the sweeper.
//!
//! Only a simulated robot ships today: it implements every seam in
//! `sweeper_traits` against a shared [`Clock`](sweeper_traits::Clock), so the
//! control loop can be exercised in real time or on a manual clock.
pub mod error;
pub mod sim;

pub use error::HwError;
pub use sim::{FeedbackEvent, SimRobot};
