use crate::models::error::CaptureError;
use crate::models::state::SessionState;

/// Event delegate for session notifications.
///
/// Called outside the session lock, possibly from environment notification
/// threads rather than the embedding layer's thread. Implementations should
/// marshal to their UI thread if needed.
pub trait SessionDelegate: Send + Sync {
    /// Called on every lifecycle transition.
    fn on_state_changed(&self, state: &SessionState);

    /// Called when a capture request fails, after the state change.
    fn on_error(&self, error: &CaptureError);
}
