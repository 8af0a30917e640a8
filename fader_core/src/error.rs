use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum FaderError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(&'static str),
    #[error("io error: {0}")]
    Io(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing position sensor")]
    MissingPositionSensor,
    #[error("missing touch sensor")]
    MissingTouchSensor,
    #[error("missing motor")]
    MissingMotor,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
