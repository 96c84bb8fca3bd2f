//! Host capabilities the controllers call but do not implement.

use std::time::Duration;

use tracing::debug;

use crate::error::CapabilityError;

pub trait Clipboard: Send {
    fn write_text(&mut self, text: &str) -> Result<(), CapabilityError>;
}

pub struct MissingClipboard;

impl Clipboard for MissingClipboard {
    fn write_text(&mut self, _text: &str) -> Result<(), CapabilityError> {
        Err(CapabilityError::new("clipboard", "no clipboard is attached"))
    }
}

pub trait Haptics: Send {
    fn vibrate(&mut self, pulse: Duration);
}

/// Devices without a vibration motor.
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&mut self, pulse: Duration) {
        debug!(pulse_ms = pulse.as_millis() as u64, "haptic pulse skipped");
    }
}
