pub mod clock;
pub mod stopwatch;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use stopwatch::Stopwatch;

/// Error type crossing every hardware seam.
pub type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Differential drivetrain. Positive angles turn clockwise.
pub trait Drivetrain {
    /// Start driving continuously at `speed_mm_s` while turning at `turn_rate_deg_s`.
    fn drive(&mut self, speed_mm_s: f32, turn_rate_deg_s: f32) -> HwResult<()>;
    /// Drive `distance_mm` in a straight line and hold. Blocks until done.
    fn straight(&mut self, distance_mm: f32) -> HwResult<()>;
    /// Turn in place by `angle_deg` and hold. Blocks until done.
    fn turn(&mut self, angle_deg: f32) -> HwResult<()>;
    fn stop(&mut self) -> HwResult<()>;
}

/// Cumulative distance driven, in millimetres.
pub trait Odometer {
    fn distance(&mut self) -> HwResult<f32>;
}

/// Substance identity channel: a 3-component sensed value.
pub trait SignatureSensor {
    fn signature(&mut self) -> HwResult<[f32; 3]>;
}

/// Concentration channel.
pub trait AmountSensor {
    fn amount(&mut self) -> HwResult<f32>;
}

/// Audible/visual feedback. All commands are fire-and-forget.
pub trait Feedback {
    fn alert_on(&mut self) -> HwResult<()>;
    fn alert_off(&mut self) -> HwResult<()>;
    fn beep(&mut self, frequency_hz: u32, duration: std::time::Duration) -> HwResult<()>;
    fn display(&mut self, message: &str) -> HwResult<()>;
    fn clear_display(&mut self) -> HwResult<()>;
}
