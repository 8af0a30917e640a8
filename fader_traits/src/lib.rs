//! Hardware seams for a motorized fader.
//!
//! The control core only ever talks to the physical fader through these traits.
//! Errors cross the boundary as boxed trait objects so adapters are free to use
//! whatever error type their driver stack produces.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type used at every trait boundary in this crate.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Motor rotation requested by the controller.
///
/// `Forward` moves the fader toward 100, `Backward` toward 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
    Stop,
}

impl Direction {
    /// Direction that closes a signed gap (`target - position`).
    #[inline]
    pub fn toward(gap: f32) -> Self {
        if gap > 0.0 {
            Direction::Forward
        } else if gap < 0.0 {
            Direction::Backward
        } else {
            Direction::Stop
        }
    }

    /// Swap forward and backward; `Stop` is unchanged.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
            Direction::Stop => Direction::Stop,
        }
    }
}

/// Fader travel sensor, scaled to `0.0..=100.0`.
pub trait PositionSensor {
    fn read_position(&mut self) -> Result<f32, BoxError>;
}

/// Capacitive touch input sampled on demand. Implementations return the raw,
/// undebounced state.
pub trait TouchSensor {
    fn is_touched(&mut self) -> Result<bool, BoxError>;
}

/// DC motor driver (H-bridge + PWM).
pub trait MotorActuator {
    /// Drive in `direction` with a PWM magnitude (0..=255).
    fn drive(&mut self, direction: Direction, magnitude: u8) -> Result<(), BoxError>;
    fn stop(&mut self) -> Result<(), BoxError>;
}

impl<P: PositionSensor + ?Sized> PositionSensor for Box<P> {
    fn read_position(&mut self) -> Result<f32, BoxError> {
        (**self).read_position()
    }
}

impl<T: TouchSensor + ?Sized> TouchSensor for Box<T> {
    fn is_touched(&mut self) -> Result<bool, BoxError> {
        (**self).is_touched()
    }
}

impl<M: MotorActuator + ?Sized> MotorActuator for Box<M> {
    fn drive(&mut self, direction: Direction, magnitude: u8) -> Result<(), BoxError> {
        (**self).drive(direction, magnitude)
    }
    fn stop(&mut self) -> Result<(), BoxError> {
        (**self).stop()
    }
}
