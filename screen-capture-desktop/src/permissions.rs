//! Screen recording permission handling.
//!
//! On macOS, capturing a monitor requires the Screen Recording grant under
//! System Settings > Privacy & Security; the first capture attempt is what
//! surfaces the consent dialog. Windows and most Linux X11 setups allow
//! monitor capture without a grant, while Wayland goes through a portal
//! that can refuse.
//!
//! xcap reports all of these as opaque platform errors, so classification
//! goes by the error text.

use xcap::{Monitor, XCapError};

use screen_capture_core::models::error::CaptureError;

/// Map an xcap failure to the session error taxonomy.
pub fn classify_capture_failure(err: &XCapError) -> CaptureError {
    classify_failure_text(&err.to_string())
}

fn classify_failure_text(text: &str) -> CaptureError {
    let lowered = text.to_lowercase();
    if lowered.contains("permission")
        || lowered.contains("denied")
        || lowered.contains("not authorized")
        || lowered.contains("declined")
    {
        CaptureError::PermissionDenied
    } else {
        CaptureError::RequestFailed(text.to_string())
    }
}

/// Probe whether screen recording is currently allowed.
///
/// Attempts one capture of the first enumerated monitor. On macOS a missing
/// grant fails here (and triggers the consent dialog on first run); other
/// errors are assumed transient and reported as allowed.
pub fn check_screen_recording_permission() -> Result<bool, CaptureError> {
    let monitors = Monitor::all().map_err(|e| classify_capture_failure(&e))?;
    let Some(monitor) = monitors.into_iter().next() else {
        return Ok(false);
    };

    match monitor.capture_image() {
        Ok(_) => Ok(true),
        Err(e) => match classify_capture_failure(&e) {
            CaptureError::PermissionDenied => Ok(false),
            other => {
                log::warn!("unexpected error probing screen recording permission: {other}");
                Ok(true)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_wording_maps_to_denied() {
        for text in [
            "Screen recording permission not granted",
            "access denied by the compositor",
            "client is not authorized to capture",
            "portal request declined",
        ] {
            assert_eq!(classify_failure_text(text), CaptureError::PermissionDenied);
        }
    }

    #[test]
    fn other_failures_keep_their_message() {
        assert_eq!(
            classify_failure_text("CGDisplayStream returned null"),
            CaptureError::RequestFailed("CGDisplayStream returned null".into())
        );
    }
}
