use flow_core::{CapabilityError, Clipboard};

/// System clipboard. A fresh handle is opened for every write.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CapabilityError> {
        let mut clipboard = arboard::Clipboard::new().map_err(unavailable)?;
        clipboard.set_text(text.to_owned()).map_err(unavailable)
    }
}

fn unavailable(err: arboard::Error) -> CapabilityError {
    CapabilityError::new("clipboard", err.to_string())
}
