//! Monitor capture provider built on the `xcap` crate.

use std::time::Duration;

use chrono::Utc;
use xcap::Monitor;

use screen_capture_core::models::error::CaptureError;
use screen_capture_core::models::stream::{CaptureStream, VideoFrame};
use screen_capture_core::traits::capture_provider::{
    CaptureRequest, DisplayCaptureProvider, RequestFailure,
};

use crate::permissions::classify_capture_failure;
use crate::video_track::{DesktopVideoTrack, FrameSource};

/// Configuration for the desktop capture backend.
#[derive(Debug, Clone, PartialEq)]
pub struct DesktopCaptureConfig {
    /// Preview frame rate in frames per second (default: 10).
    pub frame_rate: f64,

    /// Specific monitor to capture, or None for the primary one.
    pub monitor_id: Option<u32>,
}

impl DesktopCaptureConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_rate <= 0.0 {
            return Err("frame rate must be positive".into());
        }
        if self.frame_rate > 60.0 {
            return Err(format!("frame rate too high for a preview: {}", self.frame_rate));
        }
        Ok(())
    }
}

impl Default for DesktopCaptureConfig {
    fn default() -> Self {
        Self {
            frame_rate: 10.0,
            monitor_id: None,
        }
    }
}

/// Desktop implementation of the "request a screen capture stream"
/// capability.
///
/// Negotiation performs a probe capture of the target monitor — on macOS
/// this is where the Screen Recording consent dialog surfaces, which makes
/// the probe the blocking permission prompt of this backend. On success the
/// returned stream carries a single video track pumping frames at the
/// configured rate. System audio loopback is not implemented here, so the
/// audio half of a request yields no track.
pub struct MonitorCaptureProvider {
    config: DesktopCaptureConfig,
}

impl MonitorCaptureProvider {
    pub fn new(config: DesktopCaptureConfig) -> Result<Self, CaptureError> {
        config
            .validate()
            .map_err(CaptureError::RequestFailed)?;
        Ok(Self { config })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: DesktopCaptureConfig::default(),
        }
    }
}

impl DisplayCaptureProvider for MonitorCaptureProvider {
    fn is_supported(&self) -> bool {
        Monitor::all().map(|m| !m.is_empty()).unwrap_or(false)
    }

    fn request_capture(
        &mut self,
        request: &CaptureRequest,
    ) -> Result<CaptureStream, RequestFailure> {
        let monitor = resolve_monitor(self.config.monitor_id).map_err(RequestFailure::from)?;
        let monitor_id = monitor
            .id()
            .map_err(|e| RequestFailure::from(classify_capture_failure(&e)))?;

        // Probe capture: surfaces the OS consent dialog and classifies a
        // refused grant before any track is built.
        monitor
            .capture_image()
            .map_err(|e| RequestFailure::from(classify_capture_failure(&e)))?;

        if request.audio {
            log::debug!("system audio loopback not implemented on this backend; returning a video-only stream");
        }

        let interval = Duration::from_secs_f64(1.0 / self.config.frame_rate);
        let track = DesktopVideoTrack::spawn(
            format!("monitor-{monitor_id}-video"),
            monitor_frame_source(monitor_id),
            interval,
        )
        .map_err(RequestFailure::from)?;

        log::info!("monitor {monitor_id} capture negotiated at {} fps", self.config.frame_rate);
        Ok(CaptureStream::new(vec![Box::new(track)]))
    }
}

fn resolve_monitor(preferred: Option<u32>) -> Result<Monitor, CaptureError> {
    let mut monitors = Monitor::all().map_err(|e| classify_capture_failure(&e))?;
    if monitors.is_empty() {
        return Err(CaptureError::Unsupported);
    }

    if let Some(id) = preferred {
        return monitors
            .into_iter()
            .find(|m| m.id().map(|mid| mid == id).unwrap_or(false))
            .ok_or_else(|| CaptureError::RequestFailed(format!("monitor {id} not found")));
    }

    // Primary monitor, falling back to the first enumerated one.
    let index = monitors
        .iter()
        .position(|m| m.is_primary().unwrap_or(false))
        .unwrap_or(0);
    Ok(monitors.swap_remove(index))
}

fn monitor_frame_source(monitor_id: u32) -> FrameSource {
    Box::new(move || {
        // Monitors can hotplug between frames; resolve by id each capture.
        let monitors = Monitor::all().map_err(|e| classify_capture_failure(&e))?;
        let monitor = monitors
            .into_iter()
            .find(|m| m.id().map(|id| id == monitor_id).unwrap_or(false))
            .ok_or_else(|| {
                CaptureError::RequestFailed(format!("monitor {monitor_id} disappeared"))
            })?;

        let image = monitor
            .capture_image()
            .map_err(|e| classify_capture_failure(&e))?;
        let (width, height) = image.dimensions();
        Ok(VideoFrame {
            width,
            height,
            rgba: image.into_raw(),
            captured_at: Utc::now(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DesktopCaptureConfig::default().validate().is_ok());
    }

    #[test]
    fn nonsense_frame_rates_are_rejected() {
        let zero = DesktopCaptureConfig {
            frame_rate: 0.0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let absurd = DesktopCaptureConfig {
            frame_rate: 240.0,
            ..Default::default()
        };
        assert!(absurd.validate().is_err());
    }

    #[test]
    fn provider_rejects_invalid_config() {
        let config = DesktopCaptureConfig {
            frame_rate: -1.0,
            ..Default::default()
        };
        assert!(MonitorCaptureProvider::new(config).is_err());
    }
}
