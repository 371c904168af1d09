//! Test and helper mocks for sweeper_core

use sweeper_traits::{Feedback, HwResult};

/// Feedback sink that discards every command; used when no speaker, light
/// or screen is wired.
pub struct NoopFeedback;

impl Feedback for NoopFeedback {
    fn alert_on(&mut self) -> HwResult<()> {
        Ok(())
    }
    fn alert_off(&mut self) -> HwResult<()> {
        Ok(())
    }
    fn beep(&mut self, _frequency_hz: u32, _duration: std::time::Duration) -> HwResult<()> {
        Ok(())
    }
    fn display(&mut self, _message: &str) -> HwResult<()> {
        Ok(())
    }
    fn clear_display(&mut self) -> HwResult<()> {
        Ok(())
    }
}
