//! Core configuration types: the static geometry and timing of a sweep.

use crate::error::BuildError;

/// Rectangular surface being swept. Immutable once a run starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceArea {
    pub height_mm: f32,
    pub width_mm: f32,
}

impl SurfaceArea {
    pub fn new(height_mm: f32, width_mm: f32) -> Self {
        Self {
            height_mm,
            width_mm,
        }
    }

    /// Number of whole `robot_width_mm` columns that fit across the surface.
    pub fn max_columns(&self, robot_width_mm: f32) -> u32 {
        // `as` saturates: NaN -> 0, +inf -> u32::MAX
        (self.width_mm / robot_width_mm).floor() as u32
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if !(self.height_mm.is_finite() && self.height_mm > 0.0) {
            return Err(BuildError::InvalidConfig("surface height must be > 0"));
        }
        if !(self.width_mm.is_finite() && self.width_mm > 0.0) {
            return Err(BuildError::InvalidConfig("surface width must be > 0"));
        }
        Ok(())
    }
}

/// Physical robot parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotCfg {
    pub drive_speed_mm_s: f32,
    pub turn_rate_deg_s: f32,
    /// Swath width; also the lateral step between columns.
    pub width_mm: f32,
}

impl Default for RobotCfg {
    fn default() -> Self {
        Self {
            drive_speed_mm_s: 110.0,
            turn_rate_deg_s: 0.0,
            width_mm: 140.0,
        }
    }
}

impl RobotCfg {
    /// Check the robot against the surface it will sweep.
    pub fn validate_for(&self, surface: &SurfaceArea) -> Result<(), BuildError> {
        if !(self.width_mm.is_finite() && self.width_mm > 0.0) {
            return Err(BuildError::InvalidConfig("robot width must be > 0"));
        }
        if self.width_mm >= surface.width_mm {
            return Err(BuildError::InvalidConfig(
                "robot width must be smaller than surface width",
            ));
        }
        if !(self.drive_speed_mm_s.is_finite() && self.drive_speed_mm_s > 0.0) {
            return Err(BuildError::InvalidConfig("drive speed must be > 0"));
        }
        if !self.turn_rate_deg_s.is_finite() {
            return Err(BuildError::InvalidConfig("turn rate must be finite"));
        }
        Ok(())
    }
}

/// Timing of one driving cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleCfg {
    /// Forward-motion budget; maneuver time is excluded.
    pub drive_ms: u64,
    /// Sleep between odometry polls (bounds stop-signal latency).
    pub poll_ms: u64,
}

impl Default for CycleCfg {
    fn default() -> Self {
        Self {
            drive_ms: 5_000,
            poll_ms: 10,
        }
    }
}
