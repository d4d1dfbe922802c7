//! # screen-capture-desktop
//!
//! Desktop monitor backend for screen-capture-kit, built on `xcap`.
//!
//! Provides:
//! - `MonitorCaptureProvider` — implements the core's capture capability by
//!   negotiating a monitor grab and spawning a frame-pump video track
//! - `DesktopVideoTrack` — video track pumping monitor frames to the bound
//!   presentation sink
//! - `permissions` — screen recording permission probe and failure
//!   classification
//!
//! ## Usage
//! ```ignore
//! use screen_capture_core::{AuthenticatedIdentity, DisplaySession};
//! use screen_capture_desktop::MonitorCaptureProvider;
//!
//! let identity = AuthenticatedIdentity::new("Ada", "ada@example.com", "https://e/a.png");
//! let provider = MonitorCaptureProvider::with_defaults();
//! let mut session = DisplaySession::new(provider, identity);
//! session.start()?;
//! ```

pub mod permissions;
pub mod provider;
pub mod video_track;

pub use provider::{DesktopCaptureConfig, MonitorCaptureProvider};
pub use video_track::{DesktopVideoTrack, FrameSource};
