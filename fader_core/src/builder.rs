//! Type-state builder for [`Fader`].
//!
//! `build()` only exists once the position sensor, touch sensor and motor have
//! been supplied; `try_build()` is available in every state and reports the
//! missing piece as a [`BuildError`].

use std::marker::PhantomData;
use std::sync::Arc;

use eyre::WrapErr;
use fader_traits::{Clock, MonotonicClock, MotorActuator, PositionSensor, TouchSensor};

use crate::config::{
    DriveCfg, EndpointCfg, FaderCfg, GainCfg, GestureCfg, SeekCfg, SyncCfg,
};
use crate::controller::PositionController;
use crate::device::Fader;
use crate::error::{BuildError, Result};
use crate::gesture::TouchGestureRecognizer;
use crate::sync::ValueSync;

// Type-state markers for the builder
pub struct Missing;
pub struct Set;

/// Dynamically dispatched fader as produced by [`FaderBuilder`].
pub type DynFader = Fader<Box<dyn PositionSensor>, Box<dyn TouchSensor>, Box<dyn MotorActuator>>;

/// Builder for `Fader`. All settings are validated on `build()`.
pub struct FaderBuilder<P, T, M> {
    position: Option<Box<dyn PositionSensor>>,
    touch: Option<Box<dyn TouchSensor>>,
    motor: Option<Box<dyn MotorActuator>>,
    cfg: FaderCfg,
    // Optional clock for tests
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _p: PhantomData<P>,
    _t: PhantomData<T>,
    _m: PhantomData<M>,
}

impl Default for FaderBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            position: None,
            touch: None,
            motor: None,
            cfg: FaderCfg::default(),
            clock: None,
            _p: PhantomData,
            _t: PhantomData,
            _m: PhantomData,
        }
    }
}

impl<P, T, M> FaderBuilder<P, T, M> {
    /// Fallible build available in any type-state; returns a BuildError for missing pieces.
    pub fn try_build(self) -> Result<DynFader> {
        let FaderBuilder {
            position,
            touch,
            motor,
            cfg,
            clock,
            ..
        } = self;
        let position =
            position.ok_or_else(|| eyre::Report::new(BuildError::MissingPositionSensor))?;
        let touch = touch.ok_or_else(|| eyre::Report::new(BuildError::MissingTouchSensor))?;
        let motor = motor.ok_or_else(|| eyre::Report::new(BuildError::MissingMotor))?;
        validate_and_build(position, touch, motor, cfg, clock)
    }

    fn retype<P2, T2, M2>(self) -> FaderBuilder<P2, T2, M2> {
        FaderBuilder {
            position: self.position,
            touch: self.touch,
            motor: self.motor,
            cfg: self.cfg,
            clock: self.clock,
            _p: PhantomData,
            _t: PhantomData,
            _m: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state
impl<P, T, M> FaderBuilder<P, T, M> {
    /// Replace the whole configuration at once.
    pub fn with_config(mut self, cfg: FaderCfg) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn with_gains(mut self, gains: GainCfg) -> Self {
        self.cfg.controller.gains = gains;
        self
    }

    pub fn with_drive(mut self, drive: DriveCfg) -> Self {
        self.cfg.controller.drive = drive;
        self
    }

    pub fn with_seek(mut self, seek: SeekCfg) -> Self {
        self.cfg.controller.seek = seek;
        self
    }

    pub fn with_endpoints(mut self, endpoints: EndpointCfg) -> Self {
        self.cfg.controller.endpoints = endpoints;
        self
    }

    pub fn with_gesture(mut self, gesture: GestureCfg) -> Self {
        self.cfg.gesture = gesture;
        self
    }

    pub fn with_sync(mut self, sync: SyncCfg) -> Self {
        self.cfg.sync = sync;
        self
    }

    /// Provide a custom clock implementation; defaults to MonotonicClock when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state when providing mandatory components
impl<T, M> FaderBuilder<Missing, T, M> {
    pub fn with_position_sensor(
        mut self,
        sensor: impl PositionSensor + 'static,
    ) -> FaderBuilder<Set, T, M> {
        self.position = Some(Box::new(sensor));
        self.retype()
    }
}

impl<P, M> FaderBuilder<P, Missing, M> {
    pub fn with_touch_sensor(mut self, sensor: impl TouchSensor + 'static) -> FaderBuilder<P, Set, M> {
        self.touch = Some(Box::new(sensor));
        self.retype()
    }
}

impl<P, T> FaderBuilder<P, T, Missing> {
    pub fn with_motor(mut self, motor: impl MotorActuator + 'static) -> FaderBuilder<P, T, Set> {
        self.motor = Some(Box::new(motor));
        self.retype()
    }
}

impl FaderBuilder<Set, Set, Set> {
    /// Validate and build the Fader. Only available when all collaborators are set.
    pub fn build(self) -> Result<DynFader> {
        self.try_build()
    }
}

/// Build a statically dispatched fader from concrete collaborators.
pub fn build_fader<P, T, M>(
    position: P,
    touch: T,
    motor: M,
    cfg: FaderCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<Fader<P, T, M>>
where
    P: PositionSensor,
    T: TouchSensor,
    M: MotorActuator,
{
    validate_and_build(position, touch, motor, cfg, clock)
}

/// Check a configuration without building anything.
pub fn validate(cfg: &FaderCfg) -> core::result::Result<(), BuildError> {
    let c = &cfg.controller;
    if !c.gains.aggressive.is_valid() || !c.gains.conservative.is_valid() {
        return Err(BuildError::InvalidConfig("gains must be finite and >= 0"));
    }
    if c.drive.max_speed == 0 {
        return Err(BuildError::InvalidConfig("max_speed must be > 0"));
    }
    if c.drive.min_speed > c.drive.max_speed {
        return Err(BuildError::InvalidConfig("min_speed must be <= max_speed"));
    }
    if !(c.seek.tolerance.is_finite() && c.seek.tolerance > 0.0) {
        return Err(BuildError::InvalidConfig("tolerance must be > 0"));
    }
    if !(c.seek.fine_approach.is_finite() && c.seek.fine_approach > c.seek.tolerance) {
        return Err(BuildError::InvalidConfig("fine_approach must be > tolerance"));
    }
    if !(c.seek.escape_distance.is_finite() && c.seek.escape_distance >= c.seek.fine_approach) {
        return Err(BuildError::InvalidConfig(
            "escape_distance must be >= fine_approach",
        ));
    }
    if c.seek.max_iterations == 0 {
        return Err(BuildError::InvalidConfig("max_iterations must be > 0"));
    }
    let ep = &c.endpoints;
    if !(0.0..50.0).contains(&ep.zone) {
        return Err(BuildError::InvalidConfig("endpoint zone must be in [0, 50)"));
    }
    if !(0.0..=100.0).contains(&ep.midpoint) {
        return Err(BuildError::InvalidConfig("endpoint midpoint must be in [0, 100]"));
    }
    if f32::from(ep.low_waypoint) <= ep.zone || f32::from(ep.high_waypoint) >= 100.0 - ep.zone {
        return Err(BuildError::InvalidConfig(
            "endpoint waypoints must lie outside the endpoint zones",
        ));
    }
    if ep.high_waypoint > 100 {
        return Err(BuildError::InvalidConfig("high_waypoint must be <= 100"));
    }
    if cfg.gesture.hold_interval_ms == 0 {
        return Err(BuildError::InvalidConfig("hold_interval_ms must be > 0"));
    }
    if !(cfg.gesture.drift_limit.is_finite() && cfg.gesture.drift_limit >= 0.0) {
        return Err(BuildError::InvalidConfig("drift_limit must be >= 0"));
    }
    if cfg.sync.window == 0 {
        return Err(BuildError::InvalidConfig("sync window must be >= 1"));
    }
    if !(cfg.sync.hysteresis.is_finite() && cfg.sync.hysteresis >= 0.0) {
        return Err(BuildError::InvalidConfig("hysteresis must be >= 0"));
    }
    Ok(())
}

fn validate_and_build<P, T, M>(
    position: P,
    touch: T,
    motor: M,
    cfg: FaderCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<Fader<P, T, M>>
where
    P: PositionSensor,
    T: TouchSensor,
    M: MotorActuator,
{
    validate(&cfg).map_err(eyre::Report::new)?;
    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };
    let FaderCfg {
        controller,
        gesture,
        sync,
    } = cfg;
    let mut controller = PositionController::new(position, touch, motor, clock, controller);
    controller.begin().wrap_err("initializing fader")?;
    let sync = ValueSync::new(&sync, controller.last_position());
    Ok(Fader::new(
        controller,
        TouchGestureRecognizer::new(gesture),
        sync,
    ))
}
