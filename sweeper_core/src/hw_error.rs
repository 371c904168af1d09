//! Maps `Box<dyn Error>` from trait boundaries to typed `SweeperError`.
//!
//! The traits in `sweeper_traits` use `Box<dyn Error + Send + Sync>` for maximum
//! flexibility; this module converts those to our typed error enum, with an
//! optional feature-gated path for `sweeper_hardware::HwError` downcasting.

use crate::error::SweeperError;

/// Map a trait-boundary error to a typed `SweeperError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> SweeperError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<sweeper_hardware::HwError>() {
            return match hw {
                sweeper_hardware::HwError::Timeout => SweeperError::Timeout,
                sweeper_hardware::HwError::Io(io) => SweeperError::Io(io.to_string()),
                other => SweeperError::HardwareFault(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        SweeperError::Timeout
    } else {
        SweeperError::Hardware(s)
    }
}

/// Convenience for `map_err` at the hardware seams.
pub(crate) fn hw_report(e: Box<dyn std::error::Error + Send + Sync>) -> eyre::Report {
    eyre::Report::new(map_hw_error(&*e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_text_maps_to_timeout() {
        let e = std::io::Error::other("read timeout on port 2");
        assert!(matches!(map_hw_error(&e), SweeperError::Timeout));
    }

    #[test]
    fn other_text_maps_to_hardware() {
        let e = std::io::Error::other("stalled wheel");
        match map_hw_error(&e) {
            SweeperError::Hardware(msg) => assert!(msg.contains("stalled wheel")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hw_errors_are_downcast() {
        let e = sweeper_hardware::HwError::Disconnected("odometer");
        assert!(matches!(map_hw_error(&e), SweeperError::HardwareFault(_)));
        let t = sweeper_hardware::HwError::Timeout;
        assert!(matches!(map_hw_error(&t), SweeperError::Timeout));
    }
}
