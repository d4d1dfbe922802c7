use thiserror::Error;

/// Failures from screen capture negotiation, classified for the UI.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The host environment offers no screen capture capability at all.
    /// Retrying in the same environment fails the same way.
    #[error("screen capture is not supported in this environment")]
    Unsupported,

    /// The user or environment policy refused the capture grant.
    #[error("screen capture permission was denied")]
    PermissionDenied,

    /// Any other capability failure: device error, platform fault.
    #[error("screen capture request failed: {0}")]
    RequestFailed(String),
}

impl CaptureError {
    /// Whether calling `start()` again can plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Message for the dismissible error banner.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unsupported => {
                "Screen capture is not supported in this environment. \
                 Please switch to a device with a capturable display."
            }
            Self::PermissionDenied => {
                "Screen capture permission was denied. \
                 Please allow screen capture and try again."
            }
            Self::RequestFailed(_) => {
                "Could not start screen capture. \
                 Please check that permissions are granted and try again."
            }
        }
    }
}

/// Failures from the identity gate collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("sign-in was cancelled")]
    Cancelled,

    #[error("identity token was rejected: {0}")]
    TokenRejected(String),

    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_is_not_retryable() {
        assert!(!CaptureError::Unsupported.is_retryable());
        assert!(CaptureError::PermissionDenied.is_retryable());
        assert!(CaptureError::RequestFailed("device lost".into()).is_retryable());
    }

    #[test]
    fn user_messages_are_distinct() {
        let unsupported = CaptureError::Unsupported.user_message();
        let denied = CaptureError::PermissionDenied.user_message();
        let failed = CaptureError::RequestFailed("x".into()).user_message();
        assert_ne!(unsupported, denied);
        assert_ne!(denied, failed);
    }
}
