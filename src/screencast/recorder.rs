//! Background recording loop
//!
//! One thread captures frames, hands them to a sink, and reports the outcome
//! exactly once over a one-shot channel. Stopping is cooperative: the flag is
//! checked once per frame, so the frame in flight always completes first.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{FrameSink, FrameSource};

/// Give up after this many frame failures in a row
pub const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// What a finished recording produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingSummary {
    pub frames: u64,
    pub width: u32,
    pub height: u32,
}

/// Handle to a running recording thread
pub struct Recording {
    stop: Arc<AtomicBool>,
    done: Receiver<Result<RecordingSummary>>,
    thread: Option<JoinHandle<()>>,
}

impl Recording {
    /// Ask the recording thread to stop after its current frame
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Wait up to `timeout` for the outcome without stopping the recording
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<Result<RecordingSummary>> {
        match self.done.recv_timeout(timeout) {
            Ok(outcome) => {
                self.join();
                Some(outcome)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.join();
                Some(Err(anyhow::anyhow!("Recording thread exited without a result")))
            }
        }
    }

    /// Stop the recording and wait for its outcome
    pub fn finish(mut self) -> Result<RecordingSummary> {
        self.stop();
        let outcome = self
            .done
            .recv()
            .unwrap_or_else(|_| Err(anyhow::anyhow!("Recording thread exited without a result")));
        self.join();
        outcome
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            log::error!("Recording thread panicked");
        }
    }
}

impl Drop for Recording {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

/// Start recording on a background thread
///
/// `open_source` runs on the recording thread. `open_sink` runs there too,
/// once the first frame has arrived, with that frame's width and height.
pub fn start_recording<S, K>(
    open_source: impl FnOnce() -> Result<S> + Send + 'static,
    open_sink: impl FnOnce(u32, u32) -> Result<K> + Send + 'static,
    framerate: u32,
) -> Result<Recording>
where
    S: FrameSource + 'static,
    K: FrameSink + 'static,
{
    let framerate = framerate.max(1);
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, done) = crossbeam_channel::bounded(1);

    let thread_stop = Arc::clone(&stop);
    let thread = thread::Builder::new()
        .name("snapmark-recorder".into())
        .spawn(move || {
            let outcome = open_source()
                .and_then(|source| record_loop(source, open_sink, framerate, &thread_stop));
            match &outcome {
                Ok(summary) => log::info!("Recording finished: {:?}", summary),
                Err(e) => log::error!("Recording failed: {:?}", e),
            }
            let _ = tx.send(outcome);
        })
        .context("Failed to spawn recording thread")?;

    Ok(Recording {
        stop,
        done,
        thread: Some(thread),
    })
}

fn record_loop<S: FrameSource, K: FrameSink>(
    mut source: S,
    open_sink: impl FnOnce(u32, u32) -> Result<K>,
    framerate: u32,
    stop: &AtomicBool,
) -> Result<RecordingSummary> {
    let frame_duration = Duration::from_secs_f64(1.0 / framerate as f64);
    let mut open_sink = Some(open_sink);
    let mut sink: Option<K> = None;
    let mut size = (0, 0);
    let mut frame_count = 0u64;
    let mut consecutive_errors = 0u32;
    let start_time = Instant::now();

    while !stop.load(Ordering::Relaxed) {
        let frame_start = Instant::now();

        let pushed = source.grab().and_then(|frame| {
            let frame_size = frame.dimensions();
            if sink.is_none() {
                let open = open_sink.take().context("Frame sink could not be opened")?;
                size = frame_size;
                sink = Some(open(frame_size.0, frame_size.1)?);
            }
            let Some(sink) = sink.as_mut() else {
                anyhow::bail!("Frame sink could not be opened");
            };
            if frame_size != size {
                anyhow::bail!(
                    "Frame size changed from {}x{} to {}x{}",
                    size.0,
                    size.1,
                    frame_size.0,
                    frame_size.1
                );
            }
            // Timestamp in nanoseconds
            let timestamp = frame_count * 1_000_000_000 / framerate as u64;
            sink.push_frame(&frame, timestamp)
        });

        match pushed {
            Ok(()) => {
                consecutive_errors = 0;
                frame_count += 1;
                if frame_count % 60 == 0 {
                    let fps = frame_count as f64 / start_time.elapsed().as_secs_f64();
                    log::info!("Recording: {} frames captured ({:.1} fps)", frame_count, fps);
                }
            }
            Err(e) => {
                log::error!("Failed to record frame: {:?}", e);
                if sink.is_none() && open_sink.is_none() {
                    return Err(e.context("Failed to open recording output"));
                }
                consecutive_errors += 1;
                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    if let Some(sink) = sink.as_mut() {
                        let _ = sink.finish();
                    }
                    return Err(e.context(format!(
                        "Too many consecutive errors ({consecutive_errors}), recording stopped"
                    )));
                }
            }
        }

        // Frame rate limiting
        let frame_elapsed = frame_start.elapsed();
        if frame_elapsed < frame_duration {
            thread::sleep(frame_duration - frame_elapsed);
        }
    }

    log::info!("Stopping recording... ({} frames captured)", frame_count);
    let Some(mut sink) = sink else {
        anyhow::bail!("Recording stopped before any frame was captured");
    };
    sink.finish()?;

    Ok(RecordingSummary {
        frames: frame_count,
        width: size.0,
        height: size.1,
    })
}
