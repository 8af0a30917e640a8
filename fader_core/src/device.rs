//! One physical fader: controller, gesture recognizer and value sync wired
//! together behind the line protocol.

use fader_traits::{MotorActuator, PositionSensor, TouchSensor};

use crate::builder::{FaderBuilder, Missing};
use crate::controller::PositionController;
use crate::error::Result;
use crate::gesture::{GestureEvent, TouchGestureRecognizer};
use crate::protocol::{Command, Reply};
use crate::status::SeekOutcome;
use crate::sync::ValueSync;
use crate::util::{clamp_level, round_position};

pub struct Fader<P, T, M> {
    controller: PositionController<P, T, M>,
    gestures: TouchGestureRecognizer,
    sync: ValueSync,
    level: u8,
    muted: bool,
}

impl<P, T, M> core::fmt::Debug for Fader<P, T, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Fader")
            .field("level", &self.level)
            .field("muted", &self.muted)
            .field("touched", &self.gestures.is_touched())
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl Fader<Missing, Missing, Missing> {
    /// Start building a fader.
    pub fn builder() -> FaderBuilder<Missing, Missing, Missing> {
        FaderBuilder::default()
    }
}

impl<P, T, M> Fader<P, T, M>
where
    P: PositionSensor,
    T: TouchSensor,
    M: MotorActuator,
{
    pub(crate) fn new(
        controller: PositionController<P, T, M>,
        gestures: TouchGestureRecognizer,
        sync: ValueSync,
    ) -> Self {
        let level = controller.target();
        Self {
            controller,
            gestures,
            sync,
            level,
            muted: false,
        }
    }

    /// Remembered level (restored on unmute).
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Debounced touch state.
    pub fn is_touched(&self) -> bool {
        self.gestures.is_touched()
    }

    pub fn is_seeking(&self) -> bool {
        self.controller.is_seeking()
    }

    pub fn effective_target(&self) -> u8 {
        if self.muted { 0 } else { self.level }
    }

    pub fn controller(&self) -> &PositionController<P, T, M> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PositionController<P, T, M> {
        &mut self.controller
    }

    pub fn gestures(&self) -> &TouchGestureRecognizer {
        &self.gestures
    }

    pub fn sync(&self) -> &ValueSync {
        &self.sync
    }

    /// Parse and apply one command line. Malformed lines are logged and dropped.
    pub fn handle_line(&mut self, line: &str) -> Result<Option<Reply>> {
        match Command::parse(line) {
            Ok(cmd) => self.apply(cmd),
            Err(e) => {
                tracing::warn!(error = %e, line, "rejected command");
                Ok(None)
            }
        }
    }

    pub fn apply(&mut self, cmd: Command) -> Result<Option<Reply>> {
        match cmd {
            Command::GetState => {
                let pos = self.controller.read_position()?;
                Ok(Some(Reply::Level(i32::from(round_position(pos)))))
            }
            Command::Level(_) | Command::Mute(_) if self.gestures.is_touched() => {
                tracing::debug!(?cmd, "ignored while touched");
                Ok(None)
            }
            Command::Level(n) => {
                self.level = clamp_level(n);
                self.sync.acknowledge_remote(if self.muted { 0 } else { n });
                tracing::debug!(requested = n, level = self.level, muted = self.muted, "level");
                self.retarget();
                Ok(None)
            }
            Command::Mute(muted) => {
                self.muted = muted;
                self.sync
                    .acknowledge_remote(i32::from(self.effective_target()));
                tracing::debug!(muted, level = self.level, "mute");
                self.retarget();
                Ok(None)
            }
        }
    }

    fn retarget(&mut self) {
        let target = i32::from(self.effective_target());
        self.controller.set_target(target);
    }

    /// One polling period: sample, recognize gestures, run a control step and
    /// collect the reports that are due.
    pub fn poll(&mut self) -> Result<Vec<Reply>> {
        let now = self.controller.clock().now();
        let raw_touch = self.controller.read_touch()?;
        let pos = self.controller.read_position()?;
        let mut replies = Vec::new();

        match self.gestures.sample(raw_touch, pos, now) {
            Some(GestureEvent::Clicks(n)) => {
                tracing::info!(clicks = n, "click tally");
                replies.push(Reply::Clicks(n));
            }
            // Not part of the host protocol yet.
            Some(GestureEvent::Hold(n)) => tracing::info!(holds = n, "hold"),
            Some(other) => tracing::trace!(event = ?other, "gesture"),
            None => {}
        }

        let touched = self.gestures.is_touched();
        if touched {
            self.level = round_position(pos);
        }
        // Readings taken while seeking toward a host value are echoes.
        if touched || !self.controller.is_busy() {
            self.sync.observe(pos);
        }

        self.controller.tick()?;

        if !self.controller.is_busy() && self.sync.has_pending_update() {
            let v = self.sync.commit();
            replies.push(Reply::Moved(v));
        }
        Ok(replies)
    }

    /// Blocking seek to `level`, remembered like an `L` command.
    pub fn seek_blocking(&mut self, level: i32) -> Result<SeekOutcome> {
        self.level = clamp_level(level);
        self.sync.acknowledge_remote(level);
        let outcome = self
            .controller
            .seek_blocking(i32::from(self.effective_target()))?;
        if outcome == SeekOutcome::Interrupted {
            self.level = self.controller.target();
        }
        Ok(outcome)
    }

    /// Stop the motor (best effort; failures are logged).
    pub fn stop(&mut self) {
        if let Err(e) = self.controller.halt() {
            tracing::warn!(error = %e, "motor stop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_fader;
    use crate::config::FaderCfg;
    use fader_hardware::sim::{SimCfg, SimMotor, SimPlant, SimPosition, SimTouch};
    use fader_traits::clock::test_clock::TestClock;

    fn rig(start: f32) -> (SimPlant, TestClock, Fader<SimPosition, SimTouch, SimMotor>) {
        let plant = SimPlant::new(SimCfg {
            initial_position: start,
            ..SimCfg::default()
        });
        let clock = TestClock::new();
        let fader = build_fader(
            plant.position_sensor(),
            plant.touch_sensor(),
            plant.motor(),
            FaderCfg::default(),
            Some(Box::new(clock.clone())),
        )
        .unwrap();
        (plant, clock, fader)
    }

    #[test]
    fn get_state_reports_rounded_position() {
        let (_plant, _clock, mut f) = rig(41.6);
        assert_eq!(f.handle_line("GetState").unwrap(), Some(Reply::Level(42)));
    }

    #[test]
    fn garbage_is_dropped() {
        let (_plant, _clock, mut f) = rig(41.0);
        assert_eq!(f.handle_line("Lfoo").unwrap(), None);
        assert_eq!(f.controller().target(), 41);
    }

    #[test]
    fn mute_drives_to_zero_and_restores() {
        let (_plant, _clock, mut f) = rig(30.0);
        f.handle_line("L70").unwrap();
        f.handle_line("M1").unwrap();
        assert_eq!(f.controller().target(), 0);
        assert_eq!(f.level(), 70);
        f.handle_line("M0").unwrap();
        assert_eq!(f.controller().target(), 70);
    }

    #[test]
    fn level_ignored_while_touched() {
        let (plant, clock, mut f) = rig(30.0);
        plant.set_touched(true);
        f.poll().unwrap();
        clock.advance_ms(20);
        f.poll().unwrap();
        assert!(f.is_touched());
        f.handle_line("L80").unwrap();
        assert_eq!(f.level(), 30);
        assert_eq!(f.controller().target(), 30);
    }
}
