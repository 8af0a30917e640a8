//! Fixed-period serve loop: drain host commands, poll the fader, write replies.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use fader_traits::{MotorActuator, PositionSensor, TouchSensor};

use crate::device::Fader;
use crate::error::{FaderError, Result};
use crate::feed::LineFeed;
use crate::protocol::Reply;

/// Serve loop pacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeParams {
    /// Polling period.
    pub poll_ms: u64,
    /// After input closes, poll at most this many more times waiting for a seek to finish.
    pub drain_polls: u32,
}

impl Default for ServeParams {
    fn default() -> Self {
        Self {
            poll_ms: crate::util::period_ms(50),
            drain_polls: 500,
        }
    }
}

impl ServeParams {
    pub fn from_hz(poll_hz: u32, drain_polls: u32) -> Self {
        Self {
            poll_ms: crate::util::period_ms(poll_hz),
            drain_polls,
        }
    }
}

/// Counters reported when the loop exits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServeSummary {
    pub polls: u64,
    pub commands: u64,
    pub replies: u64,
    pub stopped_by_signal: bool,
    pub drain_exhausted: bool,
}

fn emit<W: Write>(out: &mut W, reply: Reply) -> Result<()> {
    writeln!(out, "{reply}").map_err(|e| eyre::Report::new(FaderError::Io(e.to_string())))
}

/// Run the fader until `shutdown` is set, or until input has closed and the
/// fader is at rest. The motor is stopped on every exit path.
pub fn serve<P, T, M, W>(
    fader: &mut Fader<P, T, M>,
    feed: &LineFeed,
    out: &mut W,
    params: &ServeParams,
    shutdown: &AtomicBool,
) -> Result<ServeSummary>
where
    P: PositionSensor,
    T: TouchSensor,
    M: MotorActuator,
    W: Write,
{
    let result = serve_loop(fader, feed, out, params, shutdown);
    fader.stop();
    result
}

fn serve_loop<P, T, M, W>(
    fader: &mut Fader<P, T, M>,
    feed: &LineFeed,
    out: &mut W,
    params: &ServeParams,
    shutdown: &AtomicBool,
) -> Result<ServeSummary>
where
    P: PositionSensor,
    T: TouchSensor,
    M: MotorActuator,
    W: Write,
{
    let clock = fader.controller().clock().clone();
    let period = Duration::from_millis(params.poll_ms.max(1));
    let mut summary = ServeSummary::default();
    let mut drain_polls = 0u32;

    tracing::info!(poll_ms = params.poll_ms, "serving");
    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("shutdown requested");
            summary.stopped_by_signal = true;
            break;
        }

        for line in feed.drain() {
            summary.commands += 1;
            if let Some(reply) = fader.handle_line(&line)? {
                emit(out, reply)?;
                summary.replies += 1;
            }
        }
        for reply in fader.poll()? {
            emit(out, reply)?;
            summary.replies += 1;
        }
        out.flush()
            .map_err(|e| eyre::Report::new(FaderError::Io(e.to_string())))?;
        summary.polls += 1;

        if feed.is_closed() {
            if !fader.controller().is_busy() {
                break;
            }
            drain_polls += 1;
            if drain_polls >= params.drain_polls {
                tracing::warn!(
                    target = fader.controller().target(),
                    position = fader.controller().last_position(),
                    "input closed while still seeking; giving up"
                );
                summary.drain_exhausted = true;
                break;
            }
        }
        clock.sleep(period);
    }
    tracing::info!(
        polls = summary.polls,
        commands = summary.commands,
        replies = summary.replies,
        "serve loop finished"
    );
    Ok(summary)
}
