//! Signed-error PID controller.
//!
//! One controller serves both travel directions: the sign of the output picks
//! the motor direction and its magnitude is mapped onto the drive band by the
//! caller. Gains can be swapped between steps without losing state so the gain
//! scheduler can move between bands mid-seek.

use crate::config::Gains;

/// PID controller with output and anti-windup clamping.
#[derive(Debug, Clone)]
pub struct Pid {
    gains: Gains,

    integral: f32,
    prev_measurement: f32,

    out_min: f32,
    out_max: f32,

    int_min: f32,
    int_max: f32,

    first_update: bool,
}

impl Pid {
    pub fn new(gains: Gains) -> Self {
        Self {
            gains,
            integral: 0.0,
            prev_measurement: 0.0,
            out_min: -255.0,
            out_max: 255.0,
            int_min: -255.0,
            int_max: 255.0,
            first_update: true,
        }
    }

    /// Set output limits.
    pub fn with_output_limits(mut self, min: f32, max: f32) -> Self {
        self.out_min = min;
        self.out_max = max;
        self
    }

    /// Set integral limits for anti-windup.
    pub fn with_integral_limits(mut self, min: f32, max: f32) -> Self {
        self.int_min = min;
        self.int_max = max;
        self
    }

    pub fn gains(&self) -> Gains {
        self.gains
    }

    /// Swap tunings; integrator and derivative history are kept.
    pub fn set_gains(&mut self, gains: Gains) {
        self.gains = gains;
    }

    /// Reset integrator + derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_measurement = 0.0;
        self.first_update = true;
    }

    /// Update the controller.
    ///
    /// `dt_s` is the time since the previous update in seconds. With `dt_s == 0`
    /// (first step, or a simulated clock that has not advanced) only the
    /// proportional term contributes.
    pub fn update(&mut self, setpoint: f32, measurement: f32, dt_s: f32) -> f32 {
        let error = setpoint - measurement;
        let p = self.gains.kp * error;

        let timed = dt_s > 0.0 && dt_s.is_finite();
        if timed {
            self.integral = (self.integral + error * dt_s * self.gains.ki)
                .clamp(self.int_min, self.int_max);
        }
        let i = self.integral;

        // Derivative on measurement to avoid kicks on setpoint changes.
        let d = if self.first_update || !timed {
            0.0
        } else {
            self.gains.kd * ((self.prev_measurement - measurement) / dt_s)
        };
        self.first_update = false;
        self.prev_measurement = measurement;

        (p + i + d).clamp(self.out_min, self.out_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_only_tracks_error_sign() {
        let mut pid = Pid::new(Gains::new(1.0, 0.0, 0.0));
        assert_eq!(pid.update(80.0, 50.0, 0.05), 30.0);
        assert_eq!(pid.update(20.0, 50.0, 0.05), -30.0);
    }

    #[test]
    fn output_is_clamped() {
        let mut pid = Pid::new(Gains::new(10.0, 0.0, 0.0)).with_output_limits(-100.0, 100.0);
        assert_eq!(pid.update(100.0, 0.0, 0.05), 100.0);
    }

    #[test]
    fn integral_winds_up_to_limit_only() {
        let mut pid = Pid::new(Gains::new(0.0, 100.0, 0.0)).with_integral_limits(-5.0, 5.0);
        for _ in 0..50 {
            pid.update(60.0, 50.0, 0.1);
        }
        assert_eq!(pid.update(60.0, 50.0, 0.1), 5.0);
    }

    #[test]
    fn zero_dt_skips_integral_and_derivative() {
        let mut pid = Pid::new(Gains::new(0.5, 10.0, 10.0));
        pid.update(60.0, 50.0, 0.0);
        assert_eq!(pid.update(60.0, 40.0, 0.0), 10.0);
    }

    #[test]
    fn set_gains_keeps_integrator() {
        let mut pid = Pid::new(Gains::new(0.0, 1.0, 0.0));
        pid.update(60.0, 50.0, 1.0);
        pid.set_gains(Gains::new(0.0, 1.0, 0.0));
        assert_eq!(pid.update(50.0, 50.0, 1.0), 10.0);
        pid.reset();
        assert_eq!(pid.update(50.0, 50.0, 1.0), 0.0);
    }
}
