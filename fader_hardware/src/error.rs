use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("adc read failed: {0}")]
    Adc(String),
    #[error("touch read failed: {0}")]
    Touch(String),
    #[error("motor driver: {0}")]
    Motor(String),
    #[error("simulated plant unavailable: {0}")]
    Sim(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
