//! Shortcut capture domain module

mod session;

pub use session::{
    CaptureSession, CaptureTransport, KeyCapture, KeyCaptureComplete, KeyCaptureUpdate, KeyEvent,
    KeyEventKind, KeyModifiers,
};
