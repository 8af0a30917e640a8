//! Adapters between raw fader hardware readings and the `fader_traits` seams.
//!
//! Raw ADC and capacitive sampling stay outside this crate: callers hand in a
//! closure that produces the raw value, and the adapters here turn it into the
//! scaled position or boolean touch state the control core expects.

pub mod error;
pub mod sim;

use fader_traits::{BoxError, PositionSensor, TouchSensor};

use crate::error::HwError;

pub use sim::{SimCfg, SimMotor, SimPlant, SimPosition, SimTouch};

/// Linear mapping from raw ADC counts to fader travel in `0.0..=100.0`.
///
/// The usable span of a slide potentiometer rarely reaches the rails, so the
/// mapping trims a dead zone at each end (expressed in percent of the raw span)
/// before rescaling. `invert` flips the axis for pots wired end-to-end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorMapping {
    pub raw_min: u16,
    pub raw_max: u16,
    /// Percent of the raw span treated as 0 travel.
    pub dead_low: f32,
    /// Percent of the raw span treated as 100 travel.
    pub dead_high: f32,
    pub invert: bool,
}

impl Default for SensorMapping {
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

impl SensorMapping {
    /// Convert a raw reading to travel, clamped to `0.0..=100.0`.
    pub fn to_position(&self, raw: u16) -> f32 {
        let span = f32::from(self.raw_max.saturating_sub(self.raw_min)).max(1.0);
        let pct = (f32::from(raw) - f32::from(self.raw_min)) / span * 100.0;
        let usable = (self.dead_high - self.dead_low).max(f32::EPSILON);
        let trimmed = (pct - self.dead_low) / usable * 100.0;
        let pos = if self.invert { 100.0 - trimmed } else { trimmed };
        if pos.is_finite() {
            pos.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

/// Position sensor backed by a raw ADC sampling closure.
pub struct AdcPositionSensor<F> {
    sample: F,
    mapping: SensorMapping,
}

impl<F> AdcPositionSensor<F>
where
    F: FnMut() -> Result<u16, HwError>,
{
    pub fn new(sample: F, mapping: SensorMapping) -> Self {
        Self { sample, mapping }
    }

    pub fn mapping(&self) -> &SensorMapping {
        &self.mapping
    }
}

impl<F> PositionSensor for AdcPositionSensor<F>
where
    F: FnMut() -> Result<u16, HwError>,
{
    fn read_position(&mut self) -> Result<f32, BoxError> {
        match (self.sample)() {
            Ok(raw) => {
                let pos = self.mapping.to_position(raw);
                tracing::trace!(raw, pos, "adc sample");
                Ok(pos)
            }
            Err(e) => {
                tracing::error!("position read error: {}", e);
                Err(Box::new(e))
            }
        }
    }
}

/// Touch sensor that thresholds a proximity scalar.
///
/// Capacitive libraries differ in polarity: some report a larger count when a
/// finger is present, others (e.g. ESP32 touch pads) a smaller one. Set
/// `active_below` for the latter.
pub struct ProximityTouchSensor<F> {
    sample: F,
    threshold: i32,
    active_below: bool,
}

impl<F> ProximityTouchSensor<F>
where
    F: FnMut() -> Result<i32, HwError>,
{
    pub fn new(sample: F, threshold: i32, active_below: bool) -> Self {
        Self {
            sample,
            threshold,
            active_below,
        }
    }
}

impl<F> TouchSensor for ProximityTouchSensor<F>
where
    F: FnMut() -> Result<i32, HwError>,
{
    fn is_touched(&mut self) -> Result<bool, BoxError> {
        let v = (self.sample)().map_err(|e| -> BoxError { Box::new(e) })?;
        Ok(if self.active_below {
            v < self.threshold
        } else {
            v > self.threshold
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0.0)]
    #[case(4095, 100.0)]
    #[case(2048, 50.01)]
    fn default_mapping_spans_full_adc(#[case] raw: u16, #[case] expected: f32) {
        let m = SensorMapping::default();
        assert!((m.to_position(raw) - expected).abs() < 0.05);
    }

    #[test]
    fn dead_zones_and_inversion() {
        // 10-bit ADC, usable 3%..96%, wired backwards.
        let m = SensorMapping {
            raw_min: 0,
            raw_max: 1000,
            dead_low: 3.0,
            dead_high: 96.0,
            invert: true,
        };
        assert_eq!(m.to_position(0), 100.0);
        assert_eq!(m.to_position(30), 100.0);
        assert_eq!(m.to_position(960), 0.0);
        assert_eq!(m.to_position(1000), 0.0);
        let mid = m.to_position(495);
        assert!((mid - 50.0).abs() < 0.1, "mid = {mid}");
    }

    #[test]
    fn adc_sensor_propagates_errors() {
        let mut s = AdcPositionSensor::new(
            || Err(HwError::Adc("no conversion".into())),
            SensorMapping::default(),
        );
        let err = s.read_position().expect_err("should fail");
        assert!(err.to_string().contains("no conversion"));
    }

    #[rstest]
    #[case(350, 300, false, true)]
    #[case(250, 300, false, false)]
    #[case(12, 20, true, true)]
    #[case(40, 20, true, false)]
    fn proximity_threshold_polarity(
        #[case] reading: i32,
        #[case] threshold: i32,
        #[case] active_below: bool,
        #[case] touched: bool,
    ) {
        let mut t = ProximityTouchSensor::new(move || Ok(reading), threshold, active_below);
        assert_eq!(t.is_touched().unwrap(), touched);
    }
}
