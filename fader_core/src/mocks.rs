//! Test and helper mocks for fader_core

use fader_traits::{BoxError, Direction, MotorActuator, PositionSensor, TouchSensor};

/// A position sensor stuck at one reading.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub f32);

impl PositionSensor for FixedPosition {
    fn read_position(&mut self) -> Result<f32, BoxError> {
        Ok(self.0)
    }
}

/// A touch sensor nobody ever touches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverTouched;

impl TouchSensor for NeverTouched {
    fn is_touched(&mut self) -> Result<bool, BoxError> {
        Ok(false)
    }
}

/// A motor that accepts every command and goes nowhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMotor;

impl MotorActuator for NullMotor {
    fn drive(&mut self, _direction: Direction, _magnitude: u8) -> Result<(), BoxError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// A position sensor that always errors; useful for error-path tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingPosition;

impl PositionSensor for FailingPosition {
    fn read_position(&mut self) -> Result<f32, BoxError> {
        Err(Box::new(std::io::Error::other("adc offline")))
    }
}
