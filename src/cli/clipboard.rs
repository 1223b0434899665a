//! System clipboard access.

use arboard::Clipboard;

use crate::errors::{PassVaultError, Result};

/// Put `text` on the system clipboard.
pub fn copy(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().map_err(|e| PassVaultError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_owned())
        .map_err(|e| PassVaultError::Clipboard(e.to_string()))
}
