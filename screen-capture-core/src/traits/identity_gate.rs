use crate::models::error::IdentityError;
use crate::models::identity::AuthenticatedIdentity;

/// Collaborator that performs sign-in and yields a validated identity.
///
/// Token issuance, decoding, and sign-in UI live behind this seam; the
/// session layer only ever consumes the resulting record.
pub trait IdentityGate: Send {
    fn authenticate(&mut self) -> Result<AuthenticatedIdentity, IdentityError>;
}

/// Gate wrapping an identity that was already validated out-of-band.
///
/// Yields the record once; a second `authenticate` call reports the sign-in
/// as cancelled, since there is no interactive flow to rerun.
pub struct PreauthorizedGate {
    identity: Option<AuthenticatedIdentity>,
}

impl PreauthorizedGate {
    pub fn new(identity: AuthenticatedIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }
}

impl IdentityGate for PreauthorizedGate {
    fn authenticate(&mut self) -> Result<AuthenticatedIdentity, IdentityError> {
        self.identity.take().ok_or(IdentityError::Cancelled)
    }
}
