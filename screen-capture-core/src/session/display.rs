use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::models::identity::AuthenticatedIdentity;
use crate::models::state::{ConnectionStatus, SessionState};
use crate::models::stream::CaptureStream;
use crate::traits::capture_provider::{CaptureRequest, DisplayCaptureProvider};
use crate::traits::capture_session::CaptureSession;
use crate::traits::presentation::PresentationSink;
use crate::traits::session_delegate::SessionDelegate;

/// Internal mutable session state, protected by `parking_lot::Mutex`.
///
/// Shared between the owning session and the track-ended observers handed to
/// the environment, which may fire from backend threads.
struct SessionShared {
    state: SessionState,
    stream: Option<CaptureStream>,
    last_error: Option<CaptureError>,
    sink: Option<Weak<dyn PresentationSink>>,
    delegate: Option<Arc<dyn SessionDelegate>>,
    // Generation counter: bumped by every start(). A track-ended
    // notification carrying an older epoch lost the race to a newer
    // capture and is dropped.
    epoch: u64,
}

impl SessionShared {
    fn new() -> Self {
        Self {
            state: SessionState::Idle,
            stream: None,
            last_error: None,
            sink: None,
            delegate: None,
            epoch: 0,
        }
    }
}

/// Capture session for mirroring the local display.
///
/// Owns the lifecycle state machine, the at-most-one active stream, failure
/// classification, and the weak binding to a presentation surface. Generic
/// over the host capability via `DisplayCaptureProvider`.
///
/// Invariants:
/// - a stream is held iff the state is `Active`;
/// - every adopted stream is released exactly once, whether through
///   `stop()`, the environment ending the track, or `dispose()`.
pub struct DisplaySession<P: DisplayCaptureProvider> {
    provider: P,
    identity: AuthenticatedIdentity,
    shared: Arc<Mutex<SessionShared>>,
    disposed: bool,
}

impl<P: DisplayCaptureProvider> DisplaySession<P> {
    pub fn new(provider: P, identity: AuthenticatedIdentity) -> Self {
        Self {
            provider,
            identity,
            shared: Arc::new(Mutex::new(SessionShared::new())),
            disposed: false,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.shared.lock().delegate = Some(delegate);
    }

    pub fn state(&self) -> SessionState {
        self.shared.lock().state.clone()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.shared.lock().state.connection_status()
    }

    pub fn last_error(&self) -> Option<CaptureError> {
        self.shared.lock().last_error.clone()
    }

    pub fn is_sharing(&self) -> bool {
        self.shared.lock().stream.is_some()
    }

    pub fn identity(&self) -> &AuthenticatedIdentity {
        &self.identity
    }

    /// Negotiate a capture grant and go live.
    ///
    /// Callable from any state; calling while active restarts. `&mut self`
    /// keeps requests serialized, so at most one is ever outstanding. The
    /// session always settles in `Active` or `Failed`; the classified error
    /// is also returned for caller convenience and never propagates as a
    /// panic.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        // Restart semantics: an active stream is released before the new
        // negotiation begins.
        Self::release_stream(&self.shared, None);

        let delegate = {
            let mut s = self.shared.lock();
            s.last_error = None;
            s.epoch += 1;
            s.state = SessionState::Requesting;
            s.delegate.clone()
        };
        if let Some(d) = &delegate {
            d.on_state_changed(&SessionState::Requesting);
        }

        if !self.provider.is_supported() {
            return Err(self.fail(CaptureError::Unsupported));
        }

        let request = CaptureRequest::default();
        log::debug!("requesting display capture: {request:?}");
        match self.provider.request_capture(&request) {
            Ok(stream) => {
                self.adopt_stream(stream);
                Ok(())
            }
            Err(failure) => {
                // A half-built stream from a failed negotiation still holds
                // device resources.
                if let Some(partial) = failure.partial_stream {
                    partial.release();
                }
                Err(self.fail(failure.error))
            }
        }
    }

    /// Release the active stream and return to `Idle`. No-op when no stream
    /// is held.
    pub fn stop(&mut self) {
        Self::release_stream(&self.shared, None);
    }

    /// Bind a presentation surface. If a stream is already active it is
    /// attached immediately.
    pub fn bind_presentation(&mut self, sink: &Arc<dyn PresentationSink>) {
        let weak = Arc::downgrade(sink);
        let attach_id = {
            let mut s = self.shared.lock();
            s.sink = Some(weak.clone());
            match s.stream.as_mut() {
                Some(stream) => {
                    if let Some(video) = stream.primary_video_mut() {
                        video.set_frame_sink(Some(weak));
                    }
                    Some(stream.id().to_string())
                }
                None => None,
            }
        };
        if let Some(id) = attach_id {
            sink.attach(&id);
        }
    }

    /// Stop forwarding frames to the bound surface. The stream's lifecycle
    /// is unaffected.
    pub fn unbind_presentation(&mut self) {
        let mut s = self.shared.lock();
        s.sink = None;
        if let Some(stream) = s.stream.as_mut() {
            if let Some(video) = stream.primary_video_mut() {
                video.set_frame_sink(None);
            }
        }
    }

    /// Deterministic teardown, called by the embedding layer at logout or
    /// context destruction. A live track outliving its session is a
    /// user-visible resource leak (a spinning capture indicator), so this
    /// must not be left to drop order alone; `Drop` only backstops it.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        Self::release_stream(&self.shared, None);

        let mut s = self.shared.lock();
        s.sink = None;
        s.delegate = None;
    }

    /// The single release routine shared by `stop()`, the track-ended
    /// observer, and `dispose()`. Taking the stream out under the lock
    /// while entering `Idle` is what makes release idempotent and
    /// exactly-once.
    ///
    /// With `only_epoch`, the release is skipped unless that generation is
    /// still current — stale ended notifications never disturb a newer
    /// stream.
    fn release_stream(shared: &Arc<Mutex<SessionShared>>, only_epoch: Option<u64>) -> bool {
        let (stream, sink, delegate) = {
            let mut s = shared.lock();
            if let Some(epoch) = only_epoch {
                if s.epoch != epoch {
                    log::debug!("dropping stale track-ended notification (epoch {epoch})");
                    return false;
                }
            }
            let Some(stream) = s.stream.take() else {
                return false;
            };
            s.state = SessionState::Idle;
            (stream, s.sink.clone(), s.delegate.clone())
        };

        if let Some(sink) = sink.as_ref().and_then(Weak::upgrade) {
            sink.clear();
        }
        log::info!("releasing capture stream {}", stream.id());
        stream.release();

        if let Some(d) = delegate {
            d.on_state_changed(&SessionState::Idle);
        }
        true
    }

    fn adopt_stream(&mut self, mut stream: CaptureStream) {
        let stream_id = stream.id().to_string();
        let kinds = stream.track_kinds();

        let (sink, delegate) = {
            let mut s = self.shared.lock();

            // Observer registration and adoption happen under one lock
            // acquisition: an ended notification from a backend thread must
            // take this lock first, so it cannot land in a gap where the
            // observer exists but the stream is not yet published.
            if let Some(video) = stream.primary_video_mut() {
                let shared = Arc::clone(&self.shared);
                let epoch = s.epoch;
                video.set_ended_observer(Box::new(move || {
                    // The environment ended the track on its own (native
                    // "stop sharing" chrome). Converges on the same release
                    // path as an explicit stop; a newer start() wins any
                    // race.
                    Self::release_stream(&shared, Some(epoch));
                }));
            }

            if let Some(weak) = s.sink.clone() {
                if let Some(video) = stream.primary_video_mut() {
                    video.set_frame_sink(Some(weak));
                }
            }

            s.stream = Some(stream);
            s.state = SessionState::Active;
            (s.sink.clone(), s.delegate.clone())
        };

        if let Some(surface) = sink.as_ref().and_then(Weak::upgrade) {
            surface.attach(&stream_id);
        }

        log::info!("capture stream {stream_id} active ({kinds:?})");

        if let Some(d) = delegate {
            d.on_state_changed(&SessionState::Active);
        }
    }

    fn fail(&self, error: CaptureError) -> CaptureError {
        log::warn!("capture request failed: {error}");
        let delegate = {
            let mut s = self.shared.lock();
            s.last_error = Some(error.clone());
            s.state = SessionState::Failed(error.clone());
            s.delegate.clone()
        };
        if let Some(d) = delegate {
            d.on_state_changed(&SessionState::Failed(error.clone()));
            d.on_error(&error);
        }
        error
    }
}

impl<P: DisplayCaptureProvider> CaptureSession for DisplaySession<P> {
    fn state(&self) -> SessionState {
        DisplaySession::state(self)
    }

    fn connection_status(&self) -> ConnectionStatus {
        DisplaySession::connection_status(self)
    }

    fn last_error(&self) -> Option<CaptureError> {
        DisplaySession::last_error(self)
    }

    fn identity(&self) -> &AuthenticatedIdentity {
        DisplaySession::identity(self)
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        DisplaySession::start(self)
    }

    fn stop(&mut self) {
        DisplaySession::stop(self)
    }

    fn bind_presentation(&mut self, sink: &Arc<dyn PresentationSink>) {
        DisplaySession::bind_presentation(self, sink)
    }

    fn unbind_presentation(&mut self) {
        DisplaySession::unbind_presentation(self)
    }

    fn dispose(&mut self) {
        DisplaySession::dispose(self)
    }
}

impl<P: DisplayCaptureProvider> Drop for DisplaySession<P> {
    fn drop(&mut self) {
        self.dispose();
    }
}
