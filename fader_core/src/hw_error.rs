//! Maps `Box<dyn Error>` from trait boundaries to typed `FaderError`.
//!
//! The traits in `fader_traits` use `Box<dyn Error + Send + Sync>` so adapters
//! can surface any driver error; this module converts those to our typed enum,
//! with an optional feature-gated path for `fader_hardware::HwError`.

use crate::error::FaderError;

/// Map a trait-boundary error to a typed `FaderError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> FaderError {
    #[cfg(feature = "hardware-errors")]
    {
        use fader_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Io(io) => FaderError::Io(io.to_string()),
                HwError::Sim(_) => FaderError::Hardware(hw.to_string()),
                other => FaderError::HardwareFault(other.to_string()),
            };
        }
    }

    if let Some(io) = e.downcast_ref::<std::io::Error>() {
        return FaderError::Io(io.to_string());
    }
    FaderError::Hardware(e.to_string())
}
