//! Clipboard capability and the "copy SMS" button

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::io::Write;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::CoordinatorError;
use crate::page::{Page, COPY_BUTTON_LABEL};

/// Label shown on the button after a successful copy
pub const COPIED_LABEL: &str = "✓ Copied";

/// Notice raised when the clipboard refuses the write
pub const COPY_FAILED_NOTICE: &str = "Failed to copy SMS";

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), CoordinatorError>;
}

/// In-process clipboard; keeps the last written text
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contents(&self) -> Option<String> {
        self.contents.lock().await.clone()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), CoordinatorError> {
        *self.contents.lock().await = Some(text.to_string());
        Ok(())
    }
}

/// Terminal clipboard using the OSC 52 escape sequence.
/// Supported by most modern terminal emulators, including over SSH.
pub struct Osc52Clipboard<W: Write + Send> {
    out: std::sync::Mutex<W>,
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: std::sync::Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> Result<W, CoordinatorError> {
        self.out
            .into_inner()
            .map_err(|_| CoordinatorError::ClipboardFailure("clipboard writer poisoned".to_string()))
    }
}

#[async_trait]
impl<W: Write + Send> Clipboard for Osc52Clipboard<W> {
    async fn write_text(&self, text: &str) -> Result<(), CoordinatorError> {
        let sequence = format!("\x1b]52;c;{}\x07", BASE64.encode(text));
        let mut out = self
            .out
            .lock()
            .map_err(|_| CoordinatorError::ClipboardFailure("clipboard writer poisoned".to_string()))?;
        out.write_all(sequence.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| CoordinatorError::ClipboardFailure(e.to_string()))
    }
}

/// The copy button: copies the displayed SMS text and flashes a confirmation
pub struct CopyButton {
    clipboard: Box<dyn Clipboard>,
    original_label: String,
    feedback: Duration,
    revert: Mutex<Option<JoinHandle<()>>>,
}

impl CopyButton {
    pub fn new(clipboard: Box<dyn Clipboard>, feedback: Duration) -> Self {
        Self {
            clipboard,
            original_label: COPY_BUTTON_LABEL.to_string(),
            feedback,
            revert: Mutex::new(None),
        }
    }

    /// Copy the SMS text currently shown on `page`.
    ///
    /// Repeated clicks re-arm a single revert timer, and the label is always
    /// restored to the button's original label.
    pub async fn click(&self, page: &Page) -> Result<(), CoordinatorError> {
        let text = page.sms_text().await;

        if let Err(err) = self.clipboard.write_text(&text).await {
            warn!("Copy failed ({}): {}", err.kind(), err);
            page.notify(COPY_FAILED_NOTICE).await;
            return Err(err);
        }

        info!("Copied {} characters of SMS text", text.len());
        page.set_copy_button_label(COPIED_LABEL).await;

        let mut revert = self.revert.lock().await;
        if let Some(previous) = revert.take() {
            previous.abort();
        }
        let page = page.clone();
        let label = self.original_label.clone();
        let feedback = self.feedback;
        *revert = Some(tokio::spawn(async move {
            tokio::time::sleep(feedback).await;
            page.set_copy_button_label(&label).await;
        }));

        Ok(())
    }
}
