//! `From` implementations bridging `fader_config` types to `fader_core` types.

use crate::config::{
    ControllerCfg, DriveCfg, EndpointCfg, FaderCfg, GainCfg, Gains, GestureCfg, SeekCfg, SyncCfg,
};
use crate::runner::ServeParams;

// ── Gains ────────────────────────────────────────────────────────────────────

impl From<&fader_config::PidGains> for Gains {
    fn from(c: &fader_config::PidGains) -> Self {
        Self::new(c.kp, c.ki, c.kd)
    }
}

impl From<&fader_config::GainsCfg> for GainCfg {
    fn from(c: &fader_config::GainsCfg) -> Self {
        Self {
            aggressive: (&c.aggressive).into(),
            conservative: (&c.conservative).into(),
        }
    }
}

// ── Motion ───────────────────────────────────────────────────────────────────

impl From<&fader_config::DriveCfg> for DriveCfg {
    fn from(c: &fader_config::DriveCfg) -> Self {
        Self {
            min_speed: c.min_speed,
            max_speed: c.max_speed,
            invert: c.invert,
        }
    }
}

impl From<&fader_config::SeekCfg> for SeekCfg {
    fn from(c: &fader_config::SeekCfg) -> Self {
        Self {
            tolerance: c.tolerance,
            fine_approach: c.fine_approach,
            escape_distance: c.escape_distance,
            settle_ms: c.settle_ms,
            max_retries: c.max_retries,
            max_iterations: c.max_iterations,
        }
    }
}

impl From<&fader_config::EndpointsCfg> for EndpointCfg {
    fn from(c: &fader_config::EndpointsCfg) -> Self {
        Self {
            enabled: c.enabled,
            zone: c.zone,
            low_waypoint: c.low_waypoint,
            high_waypoint: c.high_waypoint,
            midpoint: c.midpoint,
        }
    }
}

// ── Gesture / sync ───────────────────────────────────────────────────────────

impl From<&fader_config::GestureCfg> for GestureCfg {
    fn from(c: &fader_config::GestureCfg) -> Self {
        Self {
            debounce_ms: c.debounce_ms,
            click_interval_ms: c.click_interval_ms,
            hold_interval_ms: c.hold_interval_ms,
            drift_limit: c.drift_limit,
        }
    }
}

impl From<&fader_config::SyncCfg> for SyncCfg {
    fn from(c: &fader_config::SyncCfg) -> Self {
        Self {
            window: c.window,
            hysteresis: c.hysteresis,
        }
    }
}

// ── Whole file ───────────────────────────────────────────────────────────────

impl From<&fader_config::Config> for FaderCfg {
    fn from(c: &fader_config::Config) -> Self {
        Self {
            controller: ControllerCfg {
                gains: (&c.gains).into(),
                drive: (&c.drive).into(),
                seek: (&c.seek).into(),
                endpoints: (&c.endpoints).into(),
            },
            gesture: (&c.gesture).into(),
            sync: (&c.sync).into(),
        }
    }
}

impl From<&fader_config::RunnerCfg> for ServeParams {
    fn from(c: &fader_config::RunnerCfg) -> Self {
        Self::from_hz(c.poll_hz, c.drain_polls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_matches_runtime_defaults() {
        let file = fader_config::Config::default();
        assert_eq!(FaderCfg::from(&file), FaderCfg::default());
        assert_eq!(ServeParams::from(&file.runner), ServeParams::default());
    }

    #[test]
    fn overrides_flow_through() {
        let file = fader_config::load_toml("[seek]\nmax_retries = 2\n[drive]\ninvert = true\n")
            .unwrap();
        let cfg = FaderCfg::from(&file);
        assert_eq!(cfg.controller.seek.max_retries, 2);
        assert!(cfg.controller.drive.invert);
    }
}
