//! # screen-capture-core
//!
//! Platform-agnostic screen capture session core.
//!
//! Owns the capture lifecycle state machine: permission negotiation, the
//! at-most-one active stream, failure classification, presentation binding,
//! and guaranteed single-release cleanup under every exit path (explicit
//! stop, environment-ended track, teardown). Platform backends implement the
//! `DisplayCaptureProvider` trait and plug into the generic `DisplaySession`.
//!
//! ## Architecture
//!
//! ```text
//! screen-capture-core (this crate)
//! ├── traits/   ← DisplayCaptureProvider, CaptureSession, MediaTrack,
//! │               PresentationSink, SessionDelegate, IdentityGate
//! ├── models/   ← CaptureError, SessionState, ConnectionStatus,
//! │               CaptureStream, AuthenticatedIdentity
//! └── session/  ← DisplaySession (lifecycle orchestrator)
//! ```

pub mod models;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::error::{CaptureError, IdentityError};
pub use models::identity::AuthenticatedIdentity;
pub use models::state::{ConnectionStatus, SessionState};
pub use models::stream::{CaptureStream, TrackKind, VideoFrame};
pub use session::display::DisplaySession;
pub use traits::capture_provider::{CaptureRequest, DisplayCaptureProvider, RequestFailure};
pub use traits::capture_session::CaptureSession;
pub use traits::identity_gate::{IdentityGate, PreauthorizedGate};
pub use traits::media_track::{EndedObserver, MediaTrack};
pub use traits::presentation::PresentationSink;
pub use traits::session_delegate::SessionDelegate;
