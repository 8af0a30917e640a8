//! Closed-loop motor positioning.
//!
//! `PositionController` owns the target, the PID loop and the motion state
//! machine for one fader. `tick()` is the non-blocking entry point driven by
//! the polling loop; `seek_blocking()` runs a full seek in place. Both yield to
//! the user the moment the touch sensor reports a hand on the cap.

use std::sync::Arc;
use std::time::{Duration, Instant};

use eyre::WrapErr;
use fader_traits::{Clock, Direction, MotorActuator, PositionSensor, TouchSensor};

use crate::config::ControllerCfg;
use crate::error::Result;
use crate::gains::GainScheduler;
use crate::hw_error::map_hw_error;
use crate::pid::Pid;
use crate::status::{MotionState, SeekOutcome};
use crate::util::{clamp_level, round_position};

pub struct PositionController<P, T, M> {
    position: P,
    touch: T,
    motor: M,
    clock: Arc<dyn Clock + Send + Sync>,
    scheduler: GainScheduler,
    pid: Pid,
    cfg: ControllerCfg,
    target: u8,
    waypoint: Option<u8>,
    plan_pending: bool,
    state: MotionState,
    motor_running: bool,
    last_position: f32,
    last_update: Option<Instant>,
}

impl<P, T, M> core::fmt::Debug for PositionController<P, T, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PositionController")
            .field("target", &self.target)
            .field("waypoint", &self.waypoint)
            .field("state", &self.state)
            .field("last_position", &self.last_position)
            .field("motor_running", &self.motor_running)
            .finish_non_exhaustive()
    }
}

impl<P, T, M> PositionController<P, T, M>
where
    P: PositionSensor,
    T: TouchSensor,
    M: MotorActuator,
{
    pub fn new(
        position: P,
        touch: T,
        motor: M,
        clock: Arc<dyn Clock + Send + Sync>,
        cfg: ControllerCfg,
    ) -> Self {
        let scheduler = GainScheduler::new(cfg.gains.clone());
        let max = f32::from(cfg.drive.max_speed);
        let pid = Pid::new(cfg.gains.conservative)
            .with_output_limits(-max, max)
            .with_integral_limits(-max, max);
        Self {
            position,
            touch,
            motor,
            clock,
            scheduler,
            pid,
            cfg,
            target: 0,
            waypoint: None,
            plan_pending: false,
            state: MotionState::Idle,
            motor_running: false,
            last_position: 0.0,
            last_update: None,
        }
    }

    /// Adopt the current position as the target and make sure the motor is off.
    pub fn begin(&mut self) -> Result<()> {
        let pos = self.read_position()?;
        self.target = round_position(pos);
        self.waypoint = None;
        self.plan_pending = false;
        self.pid.reset();
        self.stop_motor()?;
        self.state = MotionState::Idle;
        tracing::debug!(position = pos, target = self.target, "controller ready");
        Ok(())
    }

    /// Store a new target (clamped to `0..=100`). Motion starts on the next `tick()`.
    pub fn set_target(&mut self, level: i32) {
        let target = clamp_level(level);
        if target != self.target {
            tracing::debug!(from = self.target, to = target, requested = level, "new target");
        }
        self.target = target;
        self.waypoint = None;
        self.plan_pending = true;
        self.pid.reset();
        self.last_update = None;
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn waypoint(&self) -> Option<u8> {
        self.waypoint
    }

    /// Where the loop is currently steering: the pending waypoint, else the target.
    pub fn active_setpoint(&self) -> u8 {
        self.waypoint.unwrap_or(self.target)
    }

    pub fn is_seeking(&self) -> bool {
        self.state.is_seeking()
    }

    /// Seeking, or holding a new target the next `tick()` has yet to act on.
    pub fn is_busy(&self) -> bool {
        self.state.is_seeking() || self.plan_pending
    }

    pub fn is_motor_running(&self) -> bool {
        self.motor_running
    }

    /// Position from the most recent sensor read.
    pub fn last_position(&self) -> f32 {
        self.last_position
    }

    pub fn cfg(&self) -> &ControllerCfg {
        &self.cfg
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    /// Read the position sensor (also records it as `last_position`).
    pub fn read_position(&mut self) -> Result<f32> {
        let pos = self
            .position
            .read_position()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading fader position")?;
        let pos = if pos.is_finite() {
            pos.clamp(0.0, 100.0)
        } else {
            self.last_position
        };
        self.last_position = pos;
        Ok(pos)
    }

    /// Raw, undebounced touch state.
    pub fn read_touch(&mut self) -> Result<bool> {
        self.touch
            .is_touched()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading touch sensor")
    }

    /// Stop the motor and leave the loop idle at whatever target is stored.
    pub fn halt(&mut self) -> Result<()> {
        self.stop_motor()?;
        if self.state.is_seeking() {
            self.state = MotionState::Idle;
        }
        Ok(())
    }

    /// One non-blocking control step. Returns `true` when the motor was driven.
    ///
    /// A gap inside the fine-approach band is closed in place with a blocking
    /// approach that escapes back to async stepping if the fader runs away.
    pub fn tick(&mut self) -> Result<bool> {
        let touched = self.read_touch()?;
        let pos = self.read_position()?;
        if touched {
            self.yield_to_user(pos)?;
            return Ok(false);
        }
        if self.state == MotionState::UserOverride {
            tracing::debug!(position = pos, "touch released");
            self.state = MotionState::Idle;
        }
        if self.plan_pending {
            self.plan_waypoint(pos);
        }
        self.advance_waypoint(pos);

        let setpoint = self.active_setpoint();
        let tol = self.cfg.seek.tolerance;
        let coarse_gap = f32::from(setpoint) - f32::from(round_position(pos));
        if coarse_gap.abs() <= tol {
            if self.motor_running || self.state != MotionState::Idle {
                self.stop_motor()?;
                tracing::info!(target = self.target, position = pos, "seek settled");
            }
            self.state = MotionState::Idle;
            return Ok(false);
        }

        let gap = f32::from(setpoint) - pos;
        if gap.abs() < self.cfg.seek.fine_approach {
            let escape = self.cfg.seek.escape_distance;
            let outcome = self.run_blocking(setpoint, Some(escape))?;
            tracing::debug!(setpoint, %outcome, "fine approach finished");
            match outcome {
                SeekOutcome::Settled => {
                    let pos = self.last_position;
                    self.advance_waypoint(pos);
                    self.state = if self.waypoint.is_none() && self.active_setpoint() == setpoint {
                        MotionState::Idle
                    } else {
                        MotionState::SeekingAsync
                    };
                }
                SeekOutcome::Interrupted => {}
                SeekOutcome::Escaped | SeekOutcome::Stalled | SeekOutcome::RetriesExhausted => {
                    self.state = MotionState::SeekingAsync;
                }
            }
            return Ok(true);
        }

        if self.state != MotionState::SeekingAsync {
            tracing::info!(
                target = self.target,
                waypoint = ?self.waypoint,
                position = pos,
                "seek started"
            );
        }
        self.state = MotionState::SeekingAsync;
        self.drive_toward(setpoint, pos)?;
        Ok(true)
    }

    /// Seek to `level` and block until settled, interrupted by touch, or out of budget.
    pub fn seek_blocking(&mut self, level: i32) -> Result<SeekOutcome> {
        self.set_target(level);
        if self.read_touch()? {
            let pos = self.read_position()?;
            self.yield_to_user(pos)?;
            return Ok(SeekOutcome::Interrupted);
        }
        let pos = self.read_position()?;
        self.plan_waypoint(pos);
        tracing::info!(
            target = self.target,
            waypoint = ?self.waypoint,
            position = pos,
            "blocking seek"
        );

        if let Some(wp) = self.waypoint {
            let outcome = self.run_blocking(wp, None)?;
            if outcome != SeekOutcome::Settled {
                return Ok(self.conclude(outcome));
            }
            tracing::debug!(waypoint = wp, "waypoint reached");
            self.waypoint = None;
        }
        let outcome = self.run_blocking(self.target, None)?;
        Ok(self.conclude(outcome))
    }

    fn conclude(&mut self, outcome: SeekOutcome) -> SeekOutcome {
        self.state = match outcome {
            SeekOutcome::Settled => MotionState::Idle,
            SeekOutcome::Interrupted => MotionState::UserOverride,
            _ => MotionState::SeekingAsync,
        };
        tracing::info!(%outcome, target = self.target, position = self.last_position, "seek finished");
        outcome
    }

    /// Approach `setpoint`, then re-check after the settle delay and re-seek on
    /// overshoot, at most `max_retries` times.
    fn run_blocking(&mut self, setpoint: u8, escape: Option<f32>) -> Result<SeekOutcome> {
        let mut retries = 0u32;
        loop {
            let outcome = self.approach(setpoint, escape)?;
            if outcome != SeekOutcome::Settled {
                return Ok(outcome);
            }
            self.clock
                .sleep(Duration::from_millis(self.cfg.seek.settle_ms));
            let pos = self.read_position()?;
            if (f32::from(setpoint) - pos).abs() <= self.cfg.seek.tolerance {
                return Ok(SeekOutcome::Settled);
            }
            if retries >= self.cfg.seek.max_retries {
                tracing::warn!(setpoint, position = pos, retries, "overshoot retries exhausted");
                return Ok(SeekOutcome::RetriesExhausted);
            }
            retries += 1;
            tracing::debug!(setpoint, position = pos, retries, "overshoot, re-seeking");
        }
    }

    /// Inner blocking loop. Touch is checked before every drive command.
    fn approach(&mut self, setpoint: u8, escape: Option<f32>) -> Result<SeekOutcome> {
        self.state = MotionState::SeekingBlocking;
        let tol = self.cfg.seek.tolerance;
        for _ in 0..self.cfg.seek.max_iterations {
            if self.read_touch()? {
                let pos = self.read_position()?;
                self.yield_to_user(pos)?;
                return Ok(SeekOutcome::Interrupted);
            }
            let pos = self.read_position()?;
            let gap = f32::from(setpoint) - pos;
            if gap.abs() <= tol {
                self.stop_motor()?;
                return Ok(SeekOutcome::Settled);
            }
            if escape.is_some_and(|limit| gap.abs() > limit) {
                return Ok(SeekOutcome::Escaped);
            }
            self.drive_toward(setpoint, pos)?;
        }
        self.stop_motor()?;
        tracing::warn!(
            setpoint,
            position = self.last_position,
            iterations = self.cfg.seek.max_iterations,
            "approach stalled"
        );
        Ok(SeekOutcome::Stalled)
    }

    fn drive_toward(&mut self, setpoint: u8, pos: f32) -> Result<()> {
        let error = f32::from(setpoint) - pos;
        let schedule = self.scheduler.select(error);
        self.pid.set_gains(schedule.gains.gains());

        let now = self.clock.now();
        let dt_s = self
            .last_update
            .map_or(0.0, |t| now.saturating_duration_since(t).as_secs_f32());
        self.last_update = Some(now);

        let output = self.pid.update(f32::from(setpoint), pos, dt_s);
        let magnitude = self.cfg.drive.magnitude(output);
        let direction = if self.cfg.drive.invert {
            schedule.direction.reversed()
        } else {
            schedule.direction
        };
        tracing::trace!(
            setpoint,
            position = pos,
            error,
            aggressive = schedule.gains.aggressive,
            output,
            magnitude,
            ?direction,
            "control step"
        );
        if direction == Direction::Stop {
            return self.stop_motor();
        }
        self.motor
            .drive(direction, magnitude)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("driving motor")?;
        self.motor_running = true;
        Ok(())
    }

    fn stop_motor(&mut self) -> Result<()> {
        self.motor
            .stop()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("stopping motor")?;
        self.motor_running = false;
        Ok(())
    }

    /// Touch wins: stop, forget the waypoint, and let the target follow the hand.
    fn yield_to_user(&mut self, pos: f32) -> Result<()> {
        if self.motor_running || self.state != MotionState::UserOverride {
            self.stop_motor()?;
        }
        if self.state != MotionState::UserOverride {
            tracing::debug!(position = pos, from = ?self.state, "user override");
        }
        self.target = round_position(pos);
        self.waypoint = None;
        self.plan_pending = false;
        self.pid.reset();
        self.last_update = None;
        self.state = MotionState::UserOverride;
        Ok(())
    }

    fn plan_waypoint(&mut self, pos: f32) {
        self.plan_pending = false;
        self.waypoint = None;
        let ep = &self.cfg.endpoints;
        if !ep.enabled {
            return;
        }
        let target = f32::from(self.target);
        let waypoint = if target <= ep.zone && pos > ep.midpoint {
            Some(ep.low_waypoint)
        } else if target >= 100.0 - ep.zone && pos < ep.midpoint {
            Some(ep.high_waypoint)
        } else {
            None
        };
        if let Some(wp) = waypoint {
            tracing::debug!(target = self.target, position = pos, waypoint = wp, "endpoint waypoint");
        }
        self.waypoint = waypoint;
    }

    fn advance_waypoint(&mut self, pos: f32) {
        if let Some(wp) = self.waypoint
            && (f32::from(wp) - pos).abs() <= self.cfg.seek.tolerance
        {
            tracing::debug!(waypoint = wp, position = pos, "waypoint reached");
            self.waypoint = None;
        }
    }
}
