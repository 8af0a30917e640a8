//! Motion state and seek results reported by the position controller.

/// What the controller is currently doing with the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    /// Within tolerance of the target with the motor stopped.
    #[default]
    Idle,
    /// Closing a large gap one control step per `tick()`.
    SeekingAsync,
    /// Inside a blocking approach loop.
    SeekingBlocking,
    /// A hand is on the fader; the motor stays off until release.
    UserOverride,
}

impl MotionState {
    pub fn is_seeking(self) -> bool {
        matches!(self, MotionState::SeekingAsync | MotionState::SeekingBlocking)
    }
}

/// How a blocking approach ended. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOutcome {
    /// Within tolerance after the settle check.
    Settled,
    /// Touch took over; the target now follows the hand.
    Interrupted,
    /// The gap grew past the escape distance; async stepping resumes.
    Escaped,
    /// The iteration budget ran out without reaching the target.
    Stalled,
    /// Every overshoot re-seek ended off target.
    RetriesExhausted,
}

impl SeekOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            SeekOutcome::Settled => "settled",
            SeekOutcome::Interrupted => "interrupted",
            SeekOutcome::Escaped => "escaped",
            SeekOutcome::Stalled => "stalled",
            SeekOutcome::RetriesExhausted => "retries_exhausted",
        }
    }
}

impl core::fmt::Display for SeekOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
