use crate::models::stream::VideoFrame;

/// External surface that renders a live stream for the user.
///
/// The session holds the sink weakly and never owns its lifetime; a sink
/// that drops out from under the session simply stops receiving frames.
/// Methods may be called from backend capture threads.
pub trait PresentationSink: Send + Sync {
    /// A live stream was attached; frames for it follow via `present_frame`.
    fn attach(&self, stream_id: &str);

    /// One decoded video frame, forwarded untouched.
    fn present_frame(&self, frame: &VideoFrame);

    /// Detach whatever is showing and blank the surface.
    fn clear(&self);
}
