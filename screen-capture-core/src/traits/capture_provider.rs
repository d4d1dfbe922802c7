use crate::models::error::CaptureError;
use crate::models::stream::CaptureStream;

/// What to ask the environment for when negotiating a capture grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub video: bool,
    pub audio: bool,
}

impl CaptureRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !self.video && !self.audio {
            return Err("capture request must ask for at least one track kind".into());
        }
        Ok(())
    }
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
        }
    }
}

/// A failed capture negotiation.
///
/// The environment may have half-built a stream before giving up; it is
/// handed back here so the session can still release it. Tracks inside a
/// partial stream hold real device resources.
#[derive(Debug)]
pub struct RequestFailure {
    pub error: CaptureError,
    pub partial_stream: Option<CaptureStream>,
}

impl From<CaptureError> for RequestFailure {
    fn from(error: CaptureError) -> Self {
        Self {
            error,
            partial_stream: None,
        }
    }
}

/// Host capability: "request a screen capture stream".
///
/// Implemented by platform backends such as the desktop monitor provider.
pub trait DisplayCaptureProvider: Send {
    /// Whether the environment offers screen capture at all. Checked before
    /// every request; an unsupported environment never sees `request_capture`.
    fn is_supported(&self) -> bool;

    /// Negotiate a capture grant.
    ///
    /// Blocks for the duration of the environment's permission prompt; there
    /// is no mid-flight abort. The caller serializes requests so at most one
    /// is outstanding per session.
    fn request_capture(&mut self, request: &CaptureRequest)
        -> Result<CaptureStream, RequestFailure>;
}
