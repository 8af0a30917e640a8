//! Configuration types for the fader engine.
//!
//! These are the runtime configuration structs used by the controller, the
//! gesture recognizer and the value sync. They are separate from the
//! TOML-deserialized config in `fader_config`.

/// Error magnitude (in travel units) at and above which the aggressive gain set
/// is used. Fixed by design; not exposed as a tunable.
pub const AGGRESSIVE_THRESHOLD: f32 = 15.0;

/// PID gain triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl Gains {
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }

    pub fn is_valid(&self) -> bool {
        [self.kp, self.ki, self.kd]
            .iter()
            .all(|g| g.is_finite() && *g >= 0.0)
    }
}

/// Gain sets for the two scheduling bands.
#[derive(Debug, Clone, PartialEq)]
pub struct GainCfg {
    /// Used while `|error| >= AGGRESSIVE_THRESHOLD` (fast traverse).
    pub aggressive: Gains,
    /// Used for the final approach.
    pub conservative: Gains,
}

impl Default for GainCfg {
    fn default() -> Self {
        Self {
            aggressive: Gains::new(1.0, 0.0, 0.0),
            conservative: Gains::new(0.2, 0.0, 0.0),
        }
    }
}

/// Motor output mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveCfg {
    /// PWM floor needed to overcome motor stiction.
    pub min_speed: u8,
    /// PWM ceiling considered mechanically safe.
    pub max_speed: u8,
    /// Swap forward/backward for boards wired the other way round.
    pub invert: bool,
}

impl Default for DriveCfg {
    fn default() -> Self {
        Self {
            min_speed: 30,
            max_speed: 150,
            invert: false,
        }
    }
}

impl DriveCfg {
    /// Map a PID output to a PWM magnitude in `min_speed..=max_speed`.
    #[inline]
    pub fn magnitude(&self, output: f32) -> u8 {
        let lo = f32::from(self.min_speed);
        let hi = f32::from(self.max_speed.max(self.min_speed));
        if !output.is_finite() {
            return self.min_speed;
        }
        output.abs().round().clamp(lo, hi) as u8
    }
}

/// Seek loop tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct SeekCfg {
    /// Settled once `|target - position| <= tolerance`.
    pub tolerance: f32,
    /// Gaps smaller than this are closed with the blocking fine approach.
    pub fine_approach: f32,
    /// During a fine approach, a gap wider than this falls back to async steps.
    pub escape_distance: f32,
    /// Pause after stopping before re-checking for overshoot.
    pub settle_ms: u64,
    /// Overshoot re-seeks allowed after the first settle.
    pub max_retries: u32,
    /// Inner-loop iterations before a blocking approach gives up on a stalled motor.
    pub max_iterations: u32,
}

impl Default for SeekCfg {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            fine_approach: 5.0,
            escape_distance: 10.0,
            settle_ms: 10,
            max_retries: 5,
            max_iterations: 2_000,
        }
    }
}

/// Endpoint-safety maneuver: approach targets near the travel limits through
/// an intermediate waypoint so the cap does not hit the frame at speed.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointCfg {
    pub enabled: bool,
    /// Targets within this distance of 0 or 100 are endpoint targets.
    pub zone: f32,
    /// Waypoint used when approaching 0 from above the midpoint.
    pub low_waypoint: u8,
    /// Waypoint used when approaching 100 from below the midpoint.
    pub high_waypoint: u8,
    pub midpoint: f32,
}

impl Default for EndpointCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            zone: 10.0,
            low_waypoint: 12,
            high_waypoint: 88,
            midpoint: 50.0,
        }
    }
}

/// Everything the position controller needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerCfg {
    pub gains: GainCfg,
    pub drive: DriveCfg,
    pub seek: SeekCfg,
    pub endpoints: EndpointCfg,
}

/// Touch gesture timing.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureCfg {
    /// A raw touch transition must hold this long before it is accepted.
    pub debounce_ms: u64,
    /// Presses closer than this to the previous release chain into one gesture.
    pub click_interval_ms: u64,
    /// A hold increment fires at every multiple of this touch duration.
    pub hold_interval_ms: u64,
    /// Travel during a touch beyond this turns the gesture into a slide.
    pub drift_limit: f32,
}

impl Default for GestureCfg {
    fn default() -> Self {
        Self {
            debounce_ms: 20,
            click_interval_ms: 500,
            hold_interval_ms: 750,
            drift_limit: 2.0,
        }
    }
}

/// Outgoing value smoothing.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncCfg {
    /// Moving-average window (samples).
    pub window: usize,
    /// Minimum change of the smoothed value before a report is due.
    pub hysteresis: f32,
}

impl Default for SyncCfg {
    fn default() -> Self {
        Self {
            window: 20,
            hysteresis: 0.625,
        }
    }
}

/// Full per-fader configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaderCfg {
    pub controller: ControllerCfg,
    pub gesture: GestureCfg,
    pub sync: SyncCfg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_clamps_to_drive_band() {
        let d = DriveCfg::default();
        assert_eq!(d.magnitude(0.4), 30);
        assert_eq!(d.magnitude(-72.6), 73);
        assert_eq!(d.magnitude(900.0), 150);
        assert_eq!(d.magnitude(f32::NAN), 30);
    }

    #[test]
    fn negative_gains_are_invalid() {
        assert!(Gains::new(0.5, 0.0, 0.0).is_valid());
        assert!(!Gains::new(-0.1, 0.0, 0.0).is_valid());
        assert!(!Gains::new(0.1, f32::INFINITY, 0.0).is_valid());
    }
}
