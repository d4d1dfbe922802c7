use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::traits::media_track::MediaTrack;

/// Kind of media channel within a capture stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

/// One decoded frame from a video track.
///
/// The core forwards frames to the presentation sink untouched; pixel data
/// is tightly packed RGBA as delivered by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

/// Environment-provided handle bundling the live tracks produced by a
/// screen capture negotiation.
///
/// Releasing consumes the stream, so a stream that was ever adopted by a
/// session can only be released once.
pub struct CaptureStream {
    id: String,
    tracks: Vec<Box<dyn MediaTrack>>,
}

impl CaptureStream {
    /// A grant may legitimately carry zero tracks; the session treats such
    /// a stream as active with nothing to present.
    pub fn new(tracks: Vec<Box<dyn MediaTrack>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tracks,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn track_kinds(&self) -> Vec<TrackKind> {
        self.tracks.iter().map(|t| t.kind()).collect()
    }

    pub fn has_video(&self) -> bool {
        self.tracks.iter().any(|t| t.kind() == TrackKind::Video)
    }

    pub fn has_audio(&self) -> bool {
        self.tracks.iter().any(|t| t.kind() == TrackKind::Audio)
    }

    /// The first video track, used for the ended observer and frame routing.
    pub fn primary_video_mut(&mut self) -> Option<&mut dyn MediaTrack> {
        for track in self.tracks.iter_mut() {
            if track.kind() == TrackKind::Video {
                return Some(track.as_mut());
            }
        }
        None
    }

    /// Stop every constituent track, audio and video, unconditionally.
    pub fn release(mut self) {
        for track in &mut self.tracks {
            track.stop();
        }
        log::debug!("stream {} released ({} tracks)", self.id, self.tracks.len());
    }
}

impl fmt::Debug for CaptureStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureStream")
            .field("id", &self.id)
            .field("tracks", &self.track_kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::traits::media_track::EndedObserver;

    struct StubTrack {
        id: String,
        kind: TrackKind,
        stops: Arc<AtomicUsize>,
    }

    impl StubTrack {
        fn new(id: &str, kind: TrackKind) -> (Box<dyn MediaTrack>, Arc<AtomicUsize>) {
            let stops = Arc::new(AtomicUsize::new(0));
            let track = Self {
                id: id.into(),
                kind,
                stops: Arc::clone(&stops),
            };
            (Box::new(track), stops)
        }
    }

    impl MediaTrack for StubTrack {
        fn id(&self) -> &str {
            &self.id
        }

        fn kind(&self) -> TrackKind {
            self.kind
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }

        fn set_ended_observer(&mut self, _observer: EndedObserver) {}
    }

    #[test]
    fn primary_video_skips_leading_audio_tracks() {
        let (audio, _) = StubTrack::new("audio-main", TrackKind::Audio);
        let (video, _) = StubTrack::new("video-main", TrackKind::Video);
        let mut stream = CaptureStream::new(vec![audio, video]);

        let primary = stream.primary_video_mut().unwrap();
        assert_eq!(primary.kind(), TrackKind::Video);
        assert_eq!(primary.id(), "video-main");
    }

    #[test]
    fn audio_only_stream_has_no_primary_video() {
        let (audio, _) = StubTrack::new("audio-main", TrackKind::Audio);
        let mut stream = CaptureStream::new(vec![audio]);

        assert!(stream.has_audio());
        assert!(!stream.has_video());
        assert!(stream.primary_video_mut().is_none());
    }

    #[test]
    fn release_stops_every_track() {
        let (video, video_stops) = StubTrack::new("v", TrackKind::Video);
        let (audio, audio_stops) = StubTrack::new("a", TrackKind::Audio);
        let stream = CaptureStream::new(vec![video, audio]);

        stream.release();

        assert_eq!(video_stops.load(Ordering::SeqCst), 1);
        assert_eq!(audio_stops.load(Ordering::SeqCst), 1);
    }
}
