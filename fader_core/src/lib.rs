#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core fader logic (hardware-agnostic).
//!
//! This crate positions a motorized fader and interprets touches on it. All
//! hardware interactions go through the `fader_traits` seams
//! (`PositionSensor`, `TouchSensor`, `MotorActuator`, `Clock`).
//!
//! ## Architecture
//!
//! - **Control**: gain-scheduled PID with async and blocking seeks,
//!   endpoint waypoints and overshoot re-seeks (`controller`, `gains`, `pid`)
//! - **Gestures**: debounced touch, click tallies, hold counting (`gesture`)
//! - **Reports**: smoothed, echo-free position reports (`sync`)
//! - **Device**: one fader behind the line protocol (`device`, `protocol`)
//! - **Serving**: stdin line feed and fixed-period loop (`feed`, `runner`)
//!
//! Touch always wins: any control step that sees a hand on the cap stops the
//! motor and lets the target follow the hand.

pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod device;
pub mod error;
pub mod feed;
pub mod gains;
pub mod gesture;
pub mod hw_error;
pub mod mocks;
pub mod pid;
pub mod protocol;
pub mod runner;
pub mod status;
pub mod sync;
pub mod util;

pub use builder::{DynFader, FaderBuilder, Missing, Set, build_fader};
pub use config::{
    AGGRESSIVE_THRESHOLD, ControllerCfg, DriveCfg, EndpointCfg, FaderCfg, GainCfg, Gains,
    GestureCfg, SeekCfg, SyncCfg,
};
pub use controller::PositionController;
pub use device::Fader;
pub use error::{BuildError, FaderError, Result};
pub use gains::{GainScheduler, GainSet, Schedule};
pub use gesture::{GestureEvent, TouchGestureRecognizer};
pub use protocol::{Command, ParseError, Reply};
pub use status::{MotionState, SeekOutcome};
pub use sync::ValueSync;
