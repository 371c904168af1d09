//! `From` implementations bridging `sweeper_config` types to `sweeper_core` types.

use std::time::Duration;

use crate::alert::AlertPattern;
use crate::classifier::MatchPolicy;
use crate::config::{CycleCfg, RobotCfg, SurfaceArea};
use crate::error::SweeperError;
use crate::substance::{SubstanceProfile, SubstanceTable};

// ── Geometry ─────────────────────────────────────────────────────────────────

impl From<&sweeper_config::Surface> for SurfaceArea {
    fn from(c: &sweeper_config::Surface) -> Self {
        Self::new(c.height_mm, c.width_mm)
    }
}

impl From<&sweeper_config::Robot> for RobotCfg {
    fn from(c: &sweeper_config::Robot) -> Self {
        Self {
            drive_speed_mm_s: c.drive_speed_mm_s,
            turn_rate_deg_s: c.turn_rate_deg_s,
            width_mm: c.width_mm,
        }
    }
}

// ── Timing ───────────────────────────────────────────────────────────────────

impl From<&sweeper_config::CycleCfg> for CycleCfg {
    fn from(c: &sweeper_config::CycleCfg) -> Self {
        Self {
            drive_ms: c.drive_ms,
            poll_ms: c.poll_ms,
        }
    }
}

// ── Classification ───────────────────────────────────────────────────────────

impl From<&sweeper_config::ClassifierCfg> for MatchPolicy {
    fn from(c: &sweeper_config::ClassifierCfg) -> Self {
        match c.policy {
            sweeper_config::MatchMode::Exact => MatchPolicy::Exact,
            sweeper_config::MatchMode::Nearest => MatchPolicy::Nearest {
                max_distance: c.max_distance,
            },
        }
    }
}

impl From<&sweeper_config::SubstanceCfg> for SubstanceProfile {
    fn from(c: &sweeper_config::SubstanceCfg) -> Self {
        SubstanceProfile::new(c.name.clone(), c.signature, c.upper_limit, c.unit)
    }
}

impl TryFrom<&[sweeper_config::SubstanceCfg]> for SubstanceTable {
    type Error = SweeperError;

    fn try_from(entries: &[sweeper_config::SubstanceCfg]) -> Result<Self, Self::Error> {
        SubstanceTable::new(entries.iter().map(SubstanceProfile::from).collect())
    }
}

// ── Alert ────────────────────────────────────────────────────────────────────

impl From<&sweeper_config::AlertCfg> for AlertPattern {
    fn from(c: &sweeper_config::AlertCfg) -> Self {
        Self {
            frequency_hz: c.frequency_hz,
            beep: Duration::from_millis(c.beep_ms),
            gap: Duration::from_millis(c.gap_ms),
            beeps: c.beeps,
            message: c.message.clone(),
        }
    }
}
