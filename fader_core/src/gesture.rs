//! Touch gesture recognition: debounce, click tallies, hold counting.
//!
//! The recognizer is fed one raw touch sample per poll together with the
//! current position and time. A raw change only counts once it has been seen
//! unchanged for the debounce period. Presses that follow a release within the
//! click interval chain into one tally, which is committed once the interval
//! passes without another press. Moving the fader more than the drift limit
//! while touching turns the session into a slide and discards the tally.

use std::time::{Duration, Instant};

use crate::config::GestureCfg;

/// Something the recognizer decided on this sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    Pressed,
    Released,
    /// A chained click tally was committed.
    Clicks(u32),
    /// The current touch crossed another hold interval.
    Hold(u32),
    /// The fader was moved during the touch; counters were reset.
    Slide,
}

#[derive(Debug, Clone)]
pub struct TouchGestureRecognizer {
    cfg: GestureCfg,
    touched: bool,
    provisional: Option<(bool, Instant)>,
    clicks: u32,
    holds: u32,
    committed: u32,
    start_level: f32,
    pressed_at: Option<Instant>,
    released_at: Option<Instant>,
    slid: bool,
}

impl TouchGestureRecognizer {
    pub fn new(cfg: GestureCfg) -> Self {
        Self {
            cfg,
            touched: false,
            provisional: None,
            clicks: 0,
            holds: 0,
            committed: 0,
            start_level: 0.0,
            pressed_at: None,
            released_at: None,
            slid: false,
        }
    }

    /// Debounced touch state.
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Most recently committed click tally (0 until one is committed).
    pub fn committed_click_count(&self) -> u32 {
        self.committed
    }

    /// Hold increments of the current (or last) touch.
    pub fn current_hold_count(&self) -> u32 {
        self.holds
    }

    /// Clicks counted so far in the open session.
    pub fn pending_clicks(&self) -> u32 {
        self.clicks
    }

    pub fn session_start_level(&self) -> f32 {
        self.start_level
    }

    /// Advance with one raw sample.
    pub fn sample(&mut self, raw_touched: bool, position: f32, now: Instant) -> Option<GestureEvent> {
        if raw_touched == self.touched {
            self.provisional = None;
        } else {
            let since = match self.provisional {
                Some((value, since)) if value == raw_touched => since,
                _ => {
                    self.provisional = Some((raw_touched, now));
                    now
                }
            };
            if now.saturating_duration_since(since) >= ms(self.cfg.debounce_ms) {
                self.provisional = None;
                return Some(if raw_touched {
                    self.on_press(since, position)
                } else {
                    self.on_release(since)
                });
            }
        }

        if self.touched {
            self.while_touched(position, now)
        } else {
            self.while_released(now)
        }
    }

    fn on_press(&mut self, at: Instant, position: f32) -> GestureEvent {
        let chained = self.clicks > 0
            && self
                .released_at
                .is_some_and(|r| at.saturating_duration_since(r) <= ms(self.cfg.click_interval_ms));
        if !chained {
            self.clicks = 0;
            self.committed = 0;
            self.start_level = position;
        }
        self.holds = 0;
        self.slid = false;
        self.pressed_at = Some(at);
        self.touched = true;
        tracing::debug!(chained, clicks = self.clicks, position, "touch pressed");
        GestureEvent::Pressed
    }

    fn on_release(&mut self, at: Instant) -> GestureEvent {
        self.touched = false;
        self.released_at = Some(at);
        if !self.slid && self.holds == 0 {
            self.clicks += 1;
        }
        tracing::debug!(clicks = self.clicks, holds = self.holds, "touch released");
        GestureEvent::Released
    }

    fn while_touched(&mut self, position: f32, now: Instant) -> Option<GestureEvent> {
        if (position - self.start_level).abs() > self.cfg.drift_limit {
            tracing::debug!(from = self.start_level, to = position, "slide");
            self.slid = true;
            self.clicks = 0;
            self.holds = 0;
            self.start_level = position;
            return Some(GestureEvent::Slide);
        }
        if self.slid {
            return None;
        }
        let held = now.saturating_duration_since(self.pressed_at?);
        if held >= ms(self.cfg.hold_interval_ms) * (self.holds + 1) {
            self.holds += 1;
            tracing::debug!(holds = self.holds, "hold");
            return Some(GestureEvent::Hold(self.holds));
        }
        None
    }

    fn while_released(&mut self, now: Instant) -> Option<GestureEvent> {
        if self.clicks == 0 {
            return None;
        }
        let released_at = self.released_at?;
        let interval = ms(self.cfg.click_interval_ms);
        // A press still debouncing may yet chain onto this tally.
        if let Some((true, since)) = self.provisional
            && since.saturating_duration_since(released_at) <= interval
        {
            return None;
        }
        let idle = now.saturating_duration_since(released_at);
        if idle > interval {
            let n = self.clicks;
            self.committed = n;
            self.clicks = 0;
            self.holds = 0;
            tracing::debug!(clicks = n, "click tally committed");
            return Some(GestureEvent::Clicks(n));
        }
        None
    }
}

#[inline]
fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}
