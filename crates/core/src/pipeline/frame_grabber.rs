use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::capture::domain::frame_source::FrameSource;
use crate::pipeline::detect_faces_use_case::{DetectFacesUseCase, DetectionResult};

/// Results waiting for the consumer; older ones are dropped when it falls behind.
const DEFAULT_CHANNEL_CAPACITY: usize = 2;

/// Detection pipeline shared between the grabber thread and its owner, so a
/// loaded classifier survives stopping and restarting the camera.
pub type SharedUseCase = Arc<Mutex<DetectFacesUseCase>>;

/// What one tick produced.
#[derive(Debug)]
pub enum GrabberMessage {
    Frame(DetectionResult),
    /// No image this tick (empty read or a failure); the display is cleared.
    Empty,
}

/// Background timer thread that grabs, detects and publishes a frame on a
/// fixed-rate schedule.
///
/// The first tick runs immediately. Ticks that are missed because a pass
/// overran the interval are skipped rather than queued. Failures inside a
/// tick are logged and the loop carries on. The thread releases the source
/// as it exits.
pub struct FrameGrabber {
    frames: Receiver<GrabberMessage>,
    stop_tx: Option<Sender<()>>,
    done_rx: Receiver<()>,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl FrameGrabber {
    /// Starts grabbing from an already opened `source`.
    pub fn spawn(source: Box<dyn FrameSource>, use_case: SharedUseCase, interval: Duration) -> Self {
        let (frame_tx, frames) = crossbeam_channel::bounded(DEFAULT_CHANNEL_CAPACITY);
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);

        let handle = thread::spawn(move || {
            // Disconnects `done_rx` once the loop has exited, even on panic.
            let _done = done_tx;
            run_loop(source, &use_case, &frame_tx, &stop_rx, interval);
        });

        Self {
            frames,
            stop_tx: Some(stop_tx),
            done_rx,
            handle: Some(handle),
            interval,
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }

    /// Drains pending results and returns the newest one.
    pub fn latest(&self) -> Option<GrabberMessage> {
        self.frames.try_iter().last()
    }

    /// Blocks up to `timeout` for the next result.
    pub fn next_timeout(&self, timeout: Duration) -> Option<GrabberMessage> {
        self.frames.recv_timeout(timeout).ok()
    }

    /// Signals the thread to stop and waits up to one interval for it.
    ///
    /// Returns `false` if the thread was still busy when the wait ran out.
    /// It then finishes its current tick and releases the source on its own;
    /// [`FrameGrabber::wait`] blocks until it has.
    pub fn stop(&mut self) -> bool {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if self.wait(self.interval) {
            return true;
        }
        log::warn!(
            "Frame capture did not stop within {:?}; the camera will be released when the current frame completes",
            self.interval
        );
        false
    }

    /// Waits up to `timeout` for the thread to exit and joins it.
    ///
    /// Returns `true` once the thread is gone and its source released.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };
        match self.done_rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                self.handle = Some(handle);
                false
            }
            _ => {
                if handle.join().is_err() {
                    log::error!("Frame grabber thread panicked");
                }
                true
            }
        }
    }
}

impl Drop for FrameGrabber {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    mut source: Box<dyn FrameSource>,
    use_case: &Mutex<DetectFacesUseCase>,
    frame_tx: &Sender<GrabberMessage>,
    stop_rx: &Receiver<()>,
    interval: Duration,
) {
    let mut next_tick = Instant::now();
    loop {
        match frame_tx.try_send(tick(source.as_mut(), use_case)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::trace!("Consumer is behind; dropping frame"),
            Err(TrySendError::Disconnected(_)) => break,
        }

        next_tick += interval;
        let now = Instant::now();
        if next_tick < now {
            log::trace!("Tick overran by {:?}; skipping missed ticks", now - next_tick);
            next_tick = now;
        }

        match stop_rx.recv_timeout(next_tick - now) {
            Err(RecvTimeoutError::Timeout) => {}
            _ => break,
        }
    }
    source.release();
}

fn tick(source: &mut dyn FrameSource, use_case: &Mutex<DetectFacesUseCase>) -> GrabberMessage {
    if !source.is_opened() {
        return GrabberMessage::Empty;
    }
    match grab_and_detect(source, use_case) {
        Ok(Some(result)) => GrabberMessage::Frame(result),
        Ok(None) => GrabberMessage::Empty,
        Err(e) => {
            log::error!("Frame capture failed: {e}");
            GrabberMessage::Empty
        }
    }
}

fn grab_and_detect(
    source: &mut dyn FrameSource,
    use_case: &Mutex<DetectFacesUseCase>,
) -> Result<Option<DetectionResult>, Box<dyn std::error::Error>> {
    let Some(frame) = source.grab()? else {
        return Ok(None);
    };
    let mut use_case = use_case
        .lock()
        .map_err(|_| "detection pipeline lock poisoned")?;
    Ok(Some(use_case.execute(frame)?))
}
