//! Gain scheduling for the position loop.

use fader_traits::Direction;

use crate::config::{AGGRESSIVE_THRESHOLD, GainCfg, Gains};

/// Gain set chosen for one control step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainSet {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub aggressive: bool,
}

impl GainSet {
    pub fn gains(&self) -> Gains {
        Gains::new(self.kp, self.ki, self.kd)
    }
}

/// Scheduler output: which gains to run and which way to drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    pub gains: GainSet,
    pub direction: Direction,
}

/// Selects aggressive gains far from the target and conservative gains close to it.
#[derive(Debug, Clone)]
pub struct GainScheduler {
    cfg: GainCfg,
}

impl GainScheduler {
    pub fn new(cfg: GainCfg) -> Self {
        Self { cfg }
    }

    #[inline]
    pub fn is_aggressive(error: f32) -> bool {
        error.abs() >= AGGRESSIVE_THRESHOLD
    }

    /// `error` is `target - position`.
    pub fn select(&self, error: f32) -> Schedule {
        let aggressive = Self::is_aggressive(error);
        let g = if aggressive {
            self.cfg.aggressive
        } else {
            self.cfg.conservative
        };
        Schedule {
            gains: GainSet {
                kp: g.kp,
                ki: g.ki,
                kd: g.kd,
                aggressive,
            },
            direction: Direction::toward(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(15.0, true)]
    #[case(-15.0, true)]
    #[case(14.99, false)]
    #[case(-14.99, false)]
    #[case(0.0, false)]
    #[case(70.0, true)]
    fn threshold_is_inclusive(#[case] error: f32, #[case] aggressive: bool) {
        let s = GainScheduler::new(GainCfg::default()).select(error);
        assert_eq!(s.gains.aggressive, aggressive);
        let expected_kp = if aggressive { 1.0 } else { 0.2 };
        assert_eq!(s.gains.kp, expected_kp);
    }

    #[test]
    fn direction_follows_error_sign() {
        let sched = GainScheduler::new(GainCfg::default());
        assert_eq!(sched.select(3.0).direction, Direction::Forward);
        assert_eq!(sched.select(-30.0).direction, Direction::Backward);
        assert_eq!(sched.select(0.0).direction, Direction::Stop);
    }
}
