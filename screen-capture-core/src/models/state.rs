use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle → requesting → active / failed
/// active → idle        (stop, track ended, teardown)
/// failed → requesting  (retry via start)
/// ```
///
/// Teardown is an external event, not a state: it can arrive in any state
/// and always ends in full resource release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Requesting,
    Active,
    Failed(CaptureError),
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_requesting(&self) -> bool {
        matches!(self, Self::Requesting)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The classified error, if this is a failed state.
    pub fn error(&self) -> Option<&CaptureError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Collapse to the four user-visible indicator states.
    pub fn connection_status(&self) -> ConnectionStatus {
        match self {
            Self::Idle => ConnectionStatus::Disconnected,
            Self::Requesting => ConnectionStatus::Connecting,
            Self::Active => ConnectionStatus::Connected,
            Self::Failed(_) => ConnectionStatus::Error,
        }
    }
}

/// User-visible connection status driving the indicator widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Error => "Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_covers_all_states() {
        assert_eq!(
            SessionState::Idle.connection_status(),
            ConnectionStatus::Disconnected
        );
        assert_eq!(
            SessionState::Requesting.connection_status(),
            ConnectionStatus::Connecting
        );
        assert_eq!(
            SessionState::Active.connection_status(),
            ConnectionStatus::Connected
        );
        assert_eq!(
            SessionState::Failed(CaptureError::Unsupported).connection_status(),
            ConnectionStatus::Error
        );
    }

    #[test]
    fn failed_state_exposes_error() {
        let state = SessionState::Failed(CaptureError::PermissionDenied);
        assert_eq!(state.error(), Some(&CaptureError::PermissionDenied));
        assert_eq!(SessionState::Active.error(), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ConnectionStatus::Connecting).unwrap();
        assert_eq!(json, "\"connecting\"");
    }
}
