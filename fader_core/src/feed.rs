//! Background line reader for the command channel.
//!
//! Spawns a thread that owns the reader and forwards trimmed, non-empty lines
//! through a bounded channel, so the polling loop can drain commands without
//! ever blocking on input.
use crossbeam_channel as xch;
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct LineFeed {
    rx: xch::Receiver<String>,
    closed: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl LineFeed {
    /// Default queue depth; a full queue applies back-pressure to the reader thread.
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn spawn<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self::with_capacity(reader, Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity<R: BufRead + Send + 'static>(reader: R, capacity: usize) -> Self {
        let (tx, rx) = xch::bounded(capacity.max(1));
        let closed = Arc::new(AtomicBool::new(false));
        let closed_clone = closed.clone();

        let join_handle = std::thread::spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        // If send fails, consumer is gone; exit gracefully
                        if tx.send(line.to_string()).is_err() {
                            tracing::debug!("LineFeed consumer disconnected, exiting thread");
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "command channel read failed");
                        break;
                    }
                }
            }
            closed_clone.store(true, Ordering::Release);
            tracing::trace!("LineFeed thread exiting cleanly");
        });

        Self {
            rx,
            closed,
            join_handle: Some(join_handle),
        }
    }

    /// Every line received so far, without blocking.
    pub fn drain(&self) -> Vec<String> {
        self.rx.try_iter().collect()
    }

    /// True once the input reached EOF and every line has been drained.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) && self.rx.is_empty()
    }
}

impl Drop for LineFeed {
    fn drop(&mut self) {
        // A reader blocked on stdin cannot be interrupted; only join a finished thread.
        if let Some(handle) = self.join_handle.take() {
            if !handle.is_finished() {
                tracing::trace!("LineFeed thread still blocked on input; detaching");
                return;
            }
            if let Err(e) = handle.join() {
                tracing::warn!(?e, "LineFeed thread panicked during shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    fn wait_closed(feed: &LineFeed) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut lines = Vec::new();
        while Instant::now() < deadline {
            lines.extend(feed.drain());
            if feed.is_closed() {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        lines
    }

    #[test]
    fn forwards_trimmed_lines_and_closes() {
        let feed = LineFeed::spawn(Cursor::new("GetState\r\n\n  L62 \nM1\n"));
        let lines = wait_closed(&feed);
        assert_eq!(lines, vec!["GetState", "L62", "M1"]);
        assert!(feed.is_closed());
    }

    #[test]
    fn small_capacity_still_delivers_everything() {
        let input: String = (0..50).map(|i| format!("L{i}\n")).collect();
        let feed = LineFeed::with_capacity(Cursor::new(input), 1);
        let lines = wait_closed(&feed);
        assert_eq!(lines.len(), 50);
        assert_eq!(lines.last().map(String::as_str), Some("L49"));
    }
}
