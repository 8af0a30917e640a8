//! Simulated fader plant.
//!
//! One `SimPlant` models the slider, its motor and the touch pad. The sensor
//! and motor handles share the plant so the closed loop can run without
//! hardware: every position read advances the physics by one tick.

use std::cell::RefCell;
use std::rc::Rc;

use fader_traits::{BoxError, Direction, MotorActuator, PositionSensor, TouchSensor};

use crate::error::HwError;

/// Physical parameters of the simulated fader.
#[derive(Debug, Clone, PartialEq)]
pub struct SimCfg {
    /// Starting position in `0.0..=100.0`.
    pub initial_position: f32,
    /// Travel per read at full PWM (255).
    pub travel_per_read: f32,
    /// Fraction of velocity retained per read once the motor is stopped.
    pub coast: f32,
    /// PWM magnitude below which the motor cannot break static friction.
    pub stiction: u8,
    /// Peak amplitude of the deterministic sensor jitter.
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

#[derive(Debug)]
struct PlantState {
    cfg: SimCfg,
    position: f32,
    velocity: f32,
    command: (Direction, u8),
    touched: bool,
    press_at_read: Option<u64>,
    release_at_read: Option<u64>,
    reads: u64,
    drive_log: Vec<(Direction, u8)>,
    trace: Vec<f32>,
}

impl PlantState {
    fn advance(&mut self) -> f32 {
        self.reads += 1;
        if self.press_at_read.is_some_and(|n| self.reads >= n) {
            self.touched = true;
            self.press_at_read = None;
        }
        if self.release_at_read.is_some_and(|n| self.reads >= n) {
            self.touched = false;
            self.release_at_read = None;
        }

        let (dir, magnitude) = self.command;
        if self.touched {
            // A hand on the cap pins the slider.
            self.velocity = 0.0;
        } else if dir == Direction::Stop || magnitude < self.cfg.stiction {
            self.velocity *= self.cfg.coast.clamp(0.0, 1.0);
            if self.velocity.abs() < 0.01 {
                self.velocity = 0.0;
            }
        } else {
            let speed = f32::from(magnitude) / 255.0 * self.cfg.travel_per_read;
            self.velocity = match dir {
                Direction::Forward => speed,
                Direction::Backward => -speed,
                Direction::Stop => 0.0,
            };
        }
        self.position = (self.position + self.velocity).clamp(0.0, 100.0);
        self.trace.push(self.position);

        let jitter = if self.reads % 2 == 0 {
            self.cfg.noise
        } else {
            -self.cfg.noise
        };
        (self.position + jitter).clamp(0.0, 100.0)
    }
}

/// Shared simulated plant. Cloning yields another handle to the same fader.
#[derive(Debug, Clone)]
pub struct SimPlant {
    state: Rc<RefCell<PlantState>>,
}

impl Default for SimPlant {
    fn default() -> Self {
        Self::new(SimCfg::default())
    }
}

impl SimPlant {
    pub fn new(cfg: SimCfg) -> Self {
        let position = cfg.initial_position.clamp(0.0, 100.0);
        SimPlant {
            state: Rc::new(RefCell::new(PlantState {
                cfg,
                position,
                velocity: 0.0,
                command: (Direction::Stop, 0),
                touched: false,
                press_at_read: None,
                release_at_read: None,
                reads: 0,
                drive_log: Vec::new(),
                trace: Vec::new(),
            })),
        }
    }

    pub fn position_sensor(&self) -> SimPosition {
        SimPosition {
            plant: self.clone(),
        }
    }

    pub fn touch_sensor(&self) -> SimTouch {
        SimTouch {
            plant: self.clone(),
        }
    }

    pub fn motor(&self) -> SimMotor {
        SimMotor {
            plant: self.clone(),
        }
    }

    /// True position, without jitter.
    pub fn position(&self) -> f32 {
        self.state.borrow().position
    }

    /// Move the slider by hand (or teleport it in tests).
    pub fn set_position(&self, position: f32) {
        let mut s = self.state.borrow_mut();
        s.position = position.clamp(0.0, 100.0);
        s.velocity = 0.0;
    }

    pub fn set_touched(&self, touched: bool) {
        self.state.borrow_mut().touched = touched;
    }

    pub fn touched(&self) -> bool {
        self.state.borrow().touched
    }

    /// Press the touch pad once the plant has been read `reads` times in total.
    pub fn press_at_read(&self, reads: u64) {
        self.state.borrow_mut().press_at_read = Some(reads);
    }

    /// Release the touch pad once the plant has been read `reads` times in total.
    pub fn release_at_read(&self, reads: u64) {
        self.state.borrow_mut().release_at_read = Some(reads);
    }

    pub fn reads(&self) -> u64 {
        self.state.borrow().reads
    }

    /// Current motor command.
    pub fn command(&self) -> (Direction, u8) {
        self.state.borrow().command
    }

    pub fn is_driving(&self) -> bool {
        self.state.borrow().command.0 != Direction::Stop
    }

    /// Every non-stop command issued to the motor, in order.
    pub fn drive_log(&self) -> Vec<(Direction, u8)> {
        self.state.borrow().drive_log.clone()
    }

    /// True position after every read, in order.
    pub fn trace(&self) -> Vec<f32> {
        self.state.borrow().trace.clone()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut PlantState) -> R) -> Result<R, HwError> {
        let mut s = self
            .state
            .try_borrow_mut()
            .map_err(|e| HwError::Sim(e.to_string()))?;
        Ok(f(&mut s))
    }
}

/// Position handle of a [`SimPlant`].
#[derive(Debug, Clone)]
pub struct SimPosition {
    plant: SimPlant,
}

impl PositionSensor for SimPosition {
    fn read_position(&mut self) -> Result<f32, BoxError> {
        Ok(self.plant.with_state(PlantState::advance)?)
    }
}

/// Touch handle of a [`SimPlant`].
#[derive(Debug, Clone)]
pub struct SimTouch {
    plant: SimPlant,
}

impl TouchSensor for SimTouch {
    fn is_touched(&mut self) -> Result<bool, BoxError> {
        Ok(self.plant.with_state(|s| s.touched)?)
    }
}

/// Motor handle of a [`SimPlant`].
#[derive(Debug, Clone)]
pub struct SimMotor {
    plant: SimPlant,
}

impl MotorActuator for SimMotor {
    fn drive(&mut self, direction: Direction, magnitude: u8) -> Result<(), BoxError> {
        self.plant.with_state(|s| {
            s.command = (direction, magnitude);
            if direction != Direction::Stop {
                s.drive_log.push((direction, magnitude));
            }
        })?;
        tracing::trace!(?direction, magnitude, "sim motor drive");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BoxError> {
        self.plant.with_state(|s| s.command = (Direction::Stop, 0))?;
        Ok(())
    }
}
