use std::sync::Arc;

use crate::models::error::CaptureError;
use crate::models::identity::AuthenticatedIdentity;
use crate::models::state::{ConnectionStatus, SessionState};
use crate::traits::presentation::PresentationSink;

/// Main capture session interface.
///
/// One session per authenticated user interaction; the embedding layer
/// creates it at login and must `dispose` it at logout or context
/// destruction.
pub trait CaptureSession: Send {
    /// Current lifecycle state.
    fn state(&self) -> SessionState;

    /// Current state collapsed to the four user-visible indicator states.
    fn connection_status(&self) -> ConnectionStatus;

    /// Last classified failure; cleared on every new `start`.
    fn last_error(&self) -> Option<CaptureError>;

    /// The identity this session was constructed with.
    fn identity(&self) -> &AuthenticatedIdentity;

    /// Negotiate a capture grant and go live. Callable from any state;
    /// calling while active restarts (release, then renegotiate). Settles
    /// in exactly `Active` or `Failed`, never `Requesting`.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Release the active stream and return to `Idle`. No-op when no stream
    /// is held.
    fn stop(&mut self);

    /// Bind a presentation surface. If a stream is already active it is
    /// attached immediately.
    fn bind_presentation(&mut self, sink: &Arc<dyn PresentationSink>);

    /// Stop forwarding frames to the bound surface. Never affects the
    /// stream's lifecycle.
    fn unbind_presentation(&mut self);

    /// Deterministic teardown: force the release path and silence all
    /// further notifications. Idempotent.
    fn dispose(&mut self);
}
