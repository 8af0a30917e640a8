#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the motorized fader.
//!
//! `Config` and its sections are deserialized from TOML and validated. Every
//! section is optional; an empty file yields the stock tuning.
use serde::Deserialize;

/// One PID gain triple, e.g. `aggressive = { kp = 1.0, ki = 0.0, kd = 0.0 }`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 0.2,
            ki: 0.0,
            kd: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GainsCfg {
    /// Used while the error is 15 or more
    pub aggressive: PidGains,
    pub conservative: PidGains,
}

impl Default for GainsCfg {
    fn default() -> Self {
        Self {
            aggressive: PidGains {
                kp: 1.0,
                ki: 0.0,
                kd: 0.0,
            },
            conservative: PidGains::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DriveCfg {
    /// PWM floor (0..=255)
    pub min_speed: u8,
    /// PWM ceiling (0..=255)
    pub max_speed: u8,
    /// Swap motor direction
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

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SeekCfg {
    pub tolerance: f32,
    pub fine_approach: f32,
    pub escape_distance: f32,
    pub settle_ms: u64,
    pub max_retries: u32,
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
            max_iterations: 2000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EndpointsCfg {
    pub enabled: bool,
    pub zone: f32,
    pub low_waypoint: u8,
    pub high_waypoint: u8,
    pub midpoint: f32,
}

impl Default for EndpointsCfg {
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

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GestureCfg {
    pub debounce_ms: u64,
    pub click_interval_ms: u64,
    pub hold_interval_ms: u64,
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

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SyncCfg {
    /// Moving-average window in samples
    pub window: usize,
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

/// Raw ADC span and dead zones of the slide potentiometer.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SensorCfg {
    pub raw_min: u16,
    pub raw_max: u16,
    /// Percent of the raw span that maps to travel 0
    pub dead_low: f32,
    /// Percent of the raw span that maps to travel 100
    pub dead_high: f32,
    pub invert: bool,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            raw_min: 0,
            raw_max: 4095,
            dead_low: 0.0,
            dead_high: 100.0,
            invert: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TouchCfg {
    pub threshold: i32,
    /// Touch lowers the reading (ESP32-style pads)
    pub active_below: bool,
}

impl Default for TouchCfg {
    fn default() -> Self {
        Self {
            threshold: 40,
            active_below: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RunnerCfg {
    /// Polling rate of the serve loop
    pub poll_hz: u32,
    /// Polls allowed after input closes for a running seek to finish
    pub drain_polls: u32,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            poll_hz: 50,
            drain_polls: 500,
        }
    }
}

/// Simulated plant used when no hardware is attached.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimCfg {
    pub initial_position: f32,
    pub travel_per_read: f32,
    pub coast: f32,
    pub stiction: u8,
    pub noise: f32,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            initial_position: 50.0,
            travel_per_read: 4.0,
            coast: 0.5,
            stiction: 20,
            noise: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub gains: GainsCfg,
    pub drive: DriveCfg,
    pub seek: SeekCfg,
    pub endpoints: EndpointsCfg,
    pub gesture: GestureCfg,
    pub sync: SyncCfg,
    pub sensor: SensorCfg,
    pub touch: TouchCfg,
    pub runner: RunnerCfg,
    pub sim: SimCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn check_gains(name: &str, g: &PidGains) -> eyre::Result<()> {
    for (key, v) in [("kp", g.kp), ("ki", g.ki), ("kd", g.kd)] {
        if !v.is_finite() || v < 0.0 {
            eyre::bail!("gains.{name}.{key} must be finite and >= 0");
        }
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Gains
        check_gains("aggressive", &self.gains.aggressive)?;
        check_gains("conservative", &self.gains.conservative)?;

        // Drive
        if self.drive.max_speed == 0 {
            eyre::bail!("drive.max_speed must be > 0");
        }
        if self.drive.min_speed > self.drive.max_speed {
            eyre::bail!("drive.min_speed must be <= drive.max_speed");
        }

        // Seek
        if !(self.seek.tolerance > 0.0 && self.seek.tolerance.is_finite()) {
            eyre::bail!("seek.tolerance must be > 0");
        }
        if !self.seek.fine_approach.is_finite() || self.seek.fine_approach <= self.seek.tolerance {
            eyre::bail!("seek.fine_approach must be > seek.tolerance");
        }
        if !self.seek.escape_distance.is_finite()
            || self.seek.escape_distance < self.seek.fine_approach
        {
            eyre::bail!("seek.escape_distance must be >= seek.fine_approach");
        }
        if self.seek.settle_ms > 10_000 {
            eyre::bail!("seek.settle_ms is unreasonably large (>10s)");
        }
        if self.seek.max_iterations == 0 {
            eyre::bail!("seek.max_iterations must be >= 1");
        }

        // Endpoints
        let ep = &self.endpoints;
        if !(0.0..50.0).contains(&ep.zone) {
            eyre::bail!("endpoints.zone must be in [0, 50)");
        }
        if !(0.0..=100.0).contains(&ep.midpoint) {
            eyre::bail!("endpoints.midpoint must be in [0, 100]");
        }
        if f32::from(ep.low_waypoint) <= ep.zone {
            eyre::bail!("endpoints.low_waypoint must be above endpoints.zone");
        }
        if ep.high_waypoint > 100 || f32::from(ep.high_waypoint) >= 100.0 - ep.zone {
            eyre::bail!("endpoints.high_waypoint must be below 100 - endpoints.zone");
        }

        // Gesture
        if self.gesture.click_interval_ms == 0 {
            eyre::bail!("gesture.click_interval_ms must be >= 1");
        }
        if self.gesture.hold_interval_ms == 0 {
            eyre::bail!("gesture.hold_interval_ms must be >= 1");
        }
        if !(self.gesture.drift_limit >= 0.0 && self.gesture.drift_limit.is_finite()) {
            eyre::bail!("gesture.drift_limit must be >= 0");
        }

        // Sync
        if self.sync.window == 0 {
            eyre::bail!("sync.window must be >= 1");
        }
        if !(self.sync.hysteresis >= 0.0 && self.sync.hysteresis.is_finite()) {
            eyre::bail!("sync.hysteresis must be >= 0");
        }

        // Sensor
        if self.sensor.raw_max <= self.sensor.raw_min {
            eyre::bail!("sensor.raw_max must be > sensor.raw_min");
        }
        if !(0.0..=100.0).contains(&self.sensor.dead_low)
            || !(0.0..=100.0).contains(&self.sensor.dead_high)
            || self.sensor.dead_low >= self.sensor.dead_high
        {
            eyre::bail!("sensor.dead_low and sensor.dead_high must satisfy 0 <= low < high <= 100");
        }

        // Runner
        if self.runner.poll_hz == 0 {
            eyre::bail!("runner.poll_hz must be > 0");
        }
        if self.runner.poll_hz > 10_000 {
            eyre::bail!("runner.poll_hz is unreasonably large (>10kHz)");
        }

        // Sim
        if !(0.0..=100.0).contains(&self.sim.initial_position) {
            eyre::bail!("sim.initial_position must be in [0, 100]");
        }
        if !(self.sim.travel_per_read > 0.0 && self.sim.travel_per_read.is_finite()) {
            eyre::bail!("sim.travel_per_read must be > 0");
        }
        if !(0.0..=1.0).contains(&self.sim.coast) {
            eyre::bail!("sim.coast must be in [0.0, 1.0]");
        }
        if !(self.sim.noise >= 0.0 && self.sim.noise.is_finite()) {
            eyre::bail!("sim.noise must be >= 0");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_stock_tuning() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg = load_toml(
            r#"
[gains]
aggressive = { kp = 1.5 }

[drive]
invert = true
"#,
        )
        .unwrap();
        assert_eq!(cfg.gains.aggressive.kp, 1.5);
        assert_eq!(cfg.gains.aggressive.ki, 0.0);
        assert_eq!(cfg.gains.conservative.kp, 0.2);
        assert!(cfg.drive.invert);
        assert_eq!(cfg.drive.min_speed, 30);
    }

    #[test]
    fn unknown_rotation_is_rejected() {
        let cfg = load_toml("[logging]\nrotation = \"weekly\"\n").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("logging.rotation"));
    }
}
