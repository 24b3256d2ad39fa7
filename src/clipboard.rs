//! System clipboard access

use anyhow::{Context, Result};

pub trait ClipboardWriter {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// Clipboard of the current desktop session
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("Failed to access the clipboard")?;
        clipboard
            .set_text(text)
            .context("Failed to write to the clipboard")?;
        tracing::debug!(bytes = text.len(), "copied to clipboard");
        Ok(())
    }
}
