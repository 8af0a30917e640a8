//! Outgoing position smoothing and echo suppression.

use std::collections::VecDeque;

use crate::config::SyncCfg;
use crate::util::{clamp_level, round_position};

/// Moving average of recent positions plus the last value reported upstream.
#[derive(Debug, Clone)]
pub struct ValueSync {
    hysteresis: f32,
    capacity: usize,
    window: VecDeque<f32>,
    /// Smoothed value at the last report, unrounded.
    last_sent: f32,
    remote: Option<i32>,
}

impl ValueSync {
    /// Start with the window full of `initial` so no report is due.
    pub fn new(cfg: &SyncCfg, initial: f32) -> Self {
        let capacity = cfg.window.max(1);
        let initial = if initial.is_finite() { initial } else { 0.0 };
        let mut sync = Self {
            hysteresis: cfg.hysteresis,
            capacity,
            window: VecDeque::with_capacity(capacity),
            last_sent: initial,
            remote: None,
        };
        sync.fill(initial);
        sync
    }

    fn fill(&mut self, value: f32) {
        self.window.clear();
        self.window.extend(std::iter::repeat_n(value, self.capacity));
    }

    pub fn observe(&mut self, position: f32) {
        if !position.is_finite() {
            return;
        }
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(position);
    }

    pub fn smoothed(&self) -> f32 {
        if self.window.is_empty() {
            return self.last_sent;
        }
        self.window.iter().sum::<f32>() / self.window.len() as f32
    }

    /// Level carried by the last report.
    pub fn last_sent(&self) -> i32 {
        i32::from(round_position(self.last_sent))
    }

    pub fn has_pending_update(&self) -> bool {
        (self.smoothed() - self.last_sent).abs() > self.hysteresis
            || self.remote.is_some_and(|v| v != self.last_sent())
    }

    /// Mark the smoothed value as sent and return the level to transmit.
    pub fn commit(&mut self) -> i32 {
        self.last_sent = self.smoothed();
        self.remote = None;
        self.last_sent()
    }

    /// Record a host-originated value so readings that echo it stay silent.
    ///
    /// An out-of-range value stays pending: the next commit reports the
    /// clamped level back to the host.
    pub fn acknowledge_remote(&mut self, value: i32) {
        let level = clamp_level(value);
        self.remote = Some(value);
        self.last_sent = f32::from(level);
        self.fill(f32::from(level));
    }
}
