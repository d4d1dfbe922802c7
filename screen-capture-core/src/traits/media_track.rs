use std::sync::Weak;

use crate::models::stream::TrackKind;
use crate::traits::presentation::PresentationSink;

/// Observer fired once if the environment ends a track on its own, e.g. the
/// user stops sharing through native OS chrome rather than the session's
/// stop control.
pub type EndedObserver = Box<dyn FnOnce() + Send + 'static>;

/// One media channel (audio or video) within a capture stream.
///
/// Implemented by platform backends; the session core only drives the
/// lifecycle and never touches frame contents.
pub trait MediaTrack: Send {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    /// Stop the track and release its underlying device resources.
    ///
    /// Must be idempotent and must not fire the ended observer: once a track
    /// is stopped by its owner, no further notifications may arrive.
    fn stop(&mut self);

    /// Register the termination observer. Replaces any previous observer.
    fn set_ended_observer(&mut self, observer: EndedObserver);

    /// Route decoded frames to a presentation sink, or cut the routing with
    /// `None`. Only meaningful for video tracks; the default implementation
    /// ignores the sink.
    fn set_frame_sink(&mut self, sink: Option<Weak<dyn PresentationSink>>) {
        let _ = sink;
    }
}
