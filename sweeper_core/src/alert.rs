//! Contamination alert: light, beeps and a screen message.

use std::time::Duration;

use sweeper_traits::{Clock, Feedback, HwResult};

/// How a detection is announced. Rendering blocks the control loop for
/// [`AlertPattern::duration`].
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPattern {
    pub frequency_hz: u32,
    pub beep: Duration,
    /// Silence after each beep.
    pub gap: Duration,
    pub beeps: u8,
    pub message: String,
}

impl Default for AlertPattern {
    fn default() -> Self {
        Self {
            frequency_hz: 600,
            beep: Duration::from_millis(200),
            gap: Duration::from_millis(100),
            beeps: 4,
            message: "CONTAMINATION DETECTED".to_string(),
        }
    }
}

impl AlertPattern {
    /// Total blocking time of [`render`](Self::render).
    pub fn duration(&self) -> Duration {
        (self.beep + self.gap) * u32::from(self.beeps)
    }

    pub fn render(&self, feedback: &mut dyn Feedback, clock: &dyn Clock) {
        best_effort("alert_on", feedback.alert_on());
        for _ in 0..self.beeps {
            best_effort("beep", feedback.beep(self.frequency_hz, self.beep));
            // beep() does not block; wait out the tone plus the gap
            clock.sleep(self.beep + self.gap);
        }
        best_effort("display", feedback.display(&self.message));
    }

    /// Turn the indicator off and clear the screen before a new sample.
    pub fn clear(feedback: &mut dyn Feedback) {
        best_effort("alert_off", feedback.alert_off());
        best_effort("clear_display", feedback.clear_display());
    }
}

fn best_effort(command: &'static str, r: HwResult<()>) {
    if let Err(e) = r {
        tracing::warn!(error = %e, command, "feedback command failed");
    }
}
