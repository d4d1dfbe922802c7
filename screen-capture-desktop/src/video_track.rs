//! Video track backed by a frame-pump thread.
//!
//! The pump polls a frame source at a fixed interval and forwards frames to
//! whatever presentation sink is currently routed. The source is injected as
//! a closure so the pump can be exercised without a real display.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use screen_capture_core::models::error::CaptureError;
use screen_capture_core::models::stream::{TrackKind, VideoFrame};
use screen_capture_core::traits::media_track::{EndedObserver, MediaTrack};
use screen_capture_core::traits::presentation::PresentationSink;

/// Produces the next frame, or explains why the display is gone.
pub type FrameSource = Box<dyn FnMut() -> Result<VideoFrame, CaptureError> + Send + 'static>;

/// Capture failures tolerated before the track declares itself ended.
/// A transient glitch (display sleep, mode switch) recovers well within
/// this; a run of failures means the monitor is gone.
const MAX_CONSECUTIVE_FAILURES: u32 = 5;

struct TrackShared {
    sink: Mutex<Option<Weak<dyn PresentationSink>>>,
    ended: Mutex<Option<EndedObserver>>,
}

/// Screen video track pumping frames from a monitor.
///
/// The ended observer fires at most once, and never after `stop()` — the
/// desktop analog of the user revoking the share through native chrome is a
/// persistent capture failure.
pub struct DesktopVideoTrack {
    id: String,
    running: Arc<AtomicBool>,
    shared: Arc<TrackShared>,
    pump: Option<thread::JoinHandle<()>>,
}

impl DesktopVideoTrack {
    pub fn spawn(
        id: String,
        source: FrameSource,
        frame_interval: Duration,
    ) -> Result<Self, CaptureError> {
        let running = Arc::new(AtomicBool::new(true));
        let shared = Arc::new(TrackShared {
            sink: Mutex::new(None),
            ended: Mutex::new(None),
        });

        let pump_running = Arc::clone(&running);
        let pump_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("desktop-frame-pump".into())
            .spawn(move || pump_loop(pump_running, pump_shared, source, frame_interval))
            .map_err(|e| CaptureError::RequestFailed(format!("failed to spawn frame pump: {e}")))?;

        Ok(Self {
            id,
            running,
            shared,
            pump: Some(handle),
        })
    }
}

impl MediaTrack for DesktopVideoTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        TrackKind::Video
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // a stopped track never notifies
        self.shared.ended.lock().take();

        if let Some(handle) = self.pump.take() {
            // The ended observer runs on the pump thread; when release
            // reaches stop() through that path, the loop has already exited
            // on the cleared flag and joining ourselves would deadlock.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }

    fn set_ended_observer(&mut self, observer: EndedObserver) {
        *self.shared.ended.lock() = Some(observer);
    }

    fn set_frame_sink(&mut self, sink: Option<Weak<dyn PresentationSink>>) {
        *self.shared.sink.lock() = sink;
    }
}

impl Drop for DesktopVideoTrack {
    fn drop(&mut self) {
        self.stop();
    }
}

fn pump_loop(
    running: Arc<AtomicBool>,
    shared: Arc<TrackShared>,
    mut source: FrameSource,
    interval: Duration,
) {
    let mut failures = 0u32;
    while running.load(Ordering::SeqCst) {
        match source() {
            Ok(frame) => {
                failures = 0;
                // upgrade and drop the guard before calling out to the sink
                let sink = shared.sink.lock().as_ref().and_then(Weak::upgrade);
                if let Some(sink) = sink {
                    sink.present_frame(&frame);
                }
            }
            Err(e) => {
                failures += 1;
                log::warn!(
                    "frame capture failed ({failures}/{MAX_CONSECUTIVE_FAILURES}): {e}"
                );
                if failures >= MAX_CONSECUTIVE_FAILURES {
                    // Flag first so a stop() triggered by the observer sees
                    // the pump as already finished.
                    running.store(false, Ordering::SeqCst);
                    // Take the observer out in its own statement: the
                    // release path it triggers reaches stop(), which locks
                    // `ended` again on this very thread.
                    let observer = shared.ended.lock().take();
                    if let Some(observer) = observer {
                        observer();
                    }
                    return;
                }
            }
        }
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    use chrono::Utc;

    use super::*;

    const TICK: Duration = Duration::from_millis(1);

    fn test_frame() -> VideoFrame {
        VideoFrame {
            width: 2,
            height: 2,
            rgba: vec![0u8; 16],
            captured_at: Utc::now(),
        }
    }

    fn wait_for(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not met in time");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[derive(Default)]
    struct CountingSink {
        frames: AtomicUsize,
    }

    impl PresentationSink for CountingSink {
        fn attach(&self, _stream_id: &str) {}

        fn present_frame(&self, _frame: &VideoFrame) {
            self.frames.fetch_add(1, Ordering::SeqCst);
        }

        fn clear(&self) {}
    }

    #[test]
    fn frames_flow_to_the_routed_sink() {
        let sink = Arc::new(CountingSink::default());
        let as_dyn: Arc<dyn PresentationSink> = sink.clone();

        let mut track = DesktopVideoTrack::spawn(
            "test-video".into(),
            Box::new(|| Ok(test_frame())),
            TICK,
        )
        .unwrap();
        track.set_frame_sink(Some(Arc::downgrade(&as_dyn)));

        wait_for(|| sink.frames.load(Ordering::SeqCst) >= 3);
        track.stop();
    }

    #[test]
    fn persistent_failure_fires_the_ended_observer_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let observer_fired = Arc::clone(&fired);

        let mut track = DesktopVideoTrack::spawn(
            "test-video".into(),
            Box::new(|| Err(CaptureError::RequestFailed("monitor unplugged".into()))),
            TICK,
        )
        .unwrap();
        track.set_ended_observer(Box::new(move || {
            observer_fired.fetch_add(1, Ordering::SeqCst);
        }));

        wait_for(|| fired.load(Ordering::SeqCst) == 1);
        // pump has declared itself finished; stop is a clean no-op join
        track.stop();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ended_observer_may_stop_its_own_track() {
        let slot: Arc<Mutex<Option<DesktopVideoTrack>>> = Arc::new(Mutex::new(None));
        let released = Arc::new(AtomicUsize::new(0));
        let failing = Arc::new(AtomicBool::new(false));

        let source_failing = Arc::clone(&failing);
        let mut track = DesktopVideoTrack::spawn(
            "test-video".into(),
            Box::new(move || {
                if source_failing.load(Ordering::SeqCst) {
                    Err(CaptureError::RequestFailed("monitor unplugged".into()))
                } else {
                    Ok(test_frame())
                }
            }),
            TICK,
        )
        .unwrap();

        let observer_slot = Arc::clone(&slot);
        let observer_released = Arc::clone(&released);
        track.set_ended_observer(Box::new(move || {
            // the owner's release path stops the track from inside the
            // ended notification itself
            let ended_track = observer_slot.lock().take();
            if let Some(mut ended_track) = ended_track {
                ended_track.stop();
            }
            observer_released.fetch_add(1, Ordering::SeqCst);
        }));
        *slot.lock() = Some(track);
        failing.store(true, Ordering::SeqCst);

        wait_for(|| released.load(Ordering::SeqCst) == 1);
        assert!(slot.lock().is_none());
    }

    #[test]
    fn stop_never_fires_the_observer() {
        let fired = Arc::new(AtomicUsize::new(0));
        let observer_fired = Arc::clone(&fired);
        let delivered = Arc::new(AtomicUsize::new(0));
        let source_delivered = Arc::clone(&delivered);

        let mut track = DesktopVideoTrack::spawn(
            "test-video".into(),
            Box::new(move || {
                source_delivered.fetch_add(1, Ordering::SeqCst);
                Ok(test_frame())
            }),
            TICK,
        )
        .unwrap();
        track.set_ended_observer(Box::new(move || {
            observer_fired.fetch_add(1, Ordering::SeqCst);
        }));

        wait_for(|| delivered.load(Ordering::SeqCst) >= 1);
        track.stop();
        track.stop();

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        let settled = delivered.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        // the pump is really gone after stop
        assert_eq!(delivered.load(Ordering::SeqCst), settled);
    }
}
