pub mod capture_provider;
pub mod capture_session;
pub mod identity_gate;
pub mod media_track;
pub mod presentation;
pub mod session_delegate;
