//! Fader assembly: the simulated plant seen through the same ADC and touch
//! adapters a board build would use.

use fader_config::Config;
use fader_core::{DynFader, Fader, FaderCfg};
use fader_hardware::error::HwError;
use fader_hardware::{AdcPositionSensor, ProximityTouchSensor, SensorMapping, SimPlant};
use fader_traits::{PositionSensor, TouchSensor};

/// Env hook for tests: every ADC read fails.
pub const SIM_FAULT_ENV: &str = "FADER_TEST_SIM_FAULT";

pub fn mapping(cfg: &fader_config::SensorCfg) -> SensorMapping {
    SensorMapping {
        raw_min: cfg.raw_min,
        raw_max: cfg.raw_max,
        dead_low: cfg.dead_low,
        dead_high: cfg.dead_high,
        invert: cfg.invert,
    }
}

pub fn sim_cfg(cfg: &fader_config::SimCfg) -> fader_hardware::SimCfg {
    fader_hardware::SimCfg {
        initial_position: cfg.initial_position,
        travel_per_read: cfg.travel_per_read,
        coast: cfg.coast,
        stiction: cfg.stiction,
        noise: cfg.noise,
    }
}

/// Raw ADC count that `mapping` turns back into `position`.
pub fn raw_for(mapping: &SensorMapping, position: f32) -> u16 {
    let travel = if mapping.invert {
        100.0 - position
    } else {
        position
    };
    let pct = mapping.dead_low + travel / 100.0 * (mapping.dead_high - mapping.dead_low);
    let span = f32::from(mapping.raw_max.saturating_sub(mapping.raw_min));
    let raw = f32::from(mapping.raw_min) + pct / 100.0 * span;
    raw.round().clamp(0.0, f32::from(u16::MAX)) as u16
}

/// Proximity reading on the touched or untouched side of the threshold.
fn proximity_for(touch: &fader_config::TouchCfg, touched: bool) -> i32 {
    let offset = if touched == touch.active_below { -10 } else { 10 };
    touch.threshold.saturating_add(offset)
}

pub struct SimRig {
    pub plant: SimPlant,
    pub fader: DynFader,
}

/// Build a fader over a fresh simulated plant configured from `cfg`.
pub fn assemble(cfg: &Config) -> eyre::Result<SimRig> {
    let plant = SimPlant::new(sim_cfg(&cfg.sim));
    let map = mapping(&cfg.sensor);
    let fault = std::env::var_os(SIM_FAULT_ENV).is_some();

    let mut pos = plant.position_sensor();
    let adc = AdcPositionSensor::new(
        move || -> Result<u16, HwError> {
            if fault {
                return Err(HwError::Adc("no conversion result".into()));
            }
            let p = pos
                .read_position()
                .map_err(|e| HwError::Sim(e.to_string()))?;
            Ok(raw_for(&map, p))
        },
        map,
    );

    let touch_cfg = cfg.touch.clone();
    let mut pad = plant.touch_sensor();
    let touch = ProximityTouchSensor::new(
        move || -> Result<i32, HwError> {
            let t = pad.is_touched().map_err(|e| HwError::Sim(e.to_string()))?;
            Ok(proximity_for(&touch_cfg, t))
        },
        cfg.touch.threshold,
        cfg.touch.active_below,
    );

    let fader = Fader::builder()
        .with_config(FaderCfg::from(cfg))
        .with_position_sensor(adc)
        .with_touch_sensor(touch)
        .with_motor(plant.motor())
        .build()?;
    Ok(SimRig { plant, fader })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trips_through_mapping() {
        let m = SensorMapping {
            raw_min: 200,
            raw_max: 3900,
            dead_low: 2.0,
            dead_high: 97.0,
            invert: true,
        };
        for p in [0.0f32, 12.5, 50.0, 88.0, 100.0] {
            let back = m.to_position(raw_for(&m, p));
            assert!((back - p).abs() < 0.1, "{p} -> {back}");
        }
    }

    #[test]
    fn proximity_respects_polarity() {
        let below = fader_config::TouchCfg {
            threshold: 40,
            active_below: true,
        };
        assert!(proximity_for(&below, true) < 40);
        assert!(proximity_for(&below, false) > 40);
        let above = fader_config::TouchCfg {
            threshold: 40,
            active_below: false,
        };
        assert!(proximity_for(&above, true) > 40);
    }

    #[test]
    fn assembled_fader_starts_at_sim_position() {
        let cfg = fader_config::load_toml("[sim]\ninitial_position = 30.0\n").unwrap();
        let rig = assemble(&cfg).unwrap();
        assert_eq!(rig.fader.controller().target(), 30);
        assert!(!rig.plant.is_driving());
    }
}
