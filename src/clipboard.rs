//! Clipboard access for Voxchat
//!
//! This module provides:
//! - `ClipboardWriter`, the async seam every clipboard backend implements
//! - `copy_to_clipboard`, which logs a failed write and hands the error back untouched
//! - a host backend (`SystemClipboard`, via arboard) and a process-local one (`MemoryClipboard`)

use async_trait::async_trait;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use crate::config::{AppConfig, ClipboardBackend};

/// Prefix of the log line emitted when a copy fails.
pub const CLIPBOARD_FAILURE_PREFIX: &str = "Failed to copy to clipboard";

// ============================================
// Error Types
// ============================================

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error(transparent)]
    Host(#[from] arboard::Error),

    #[error("Clipboard handle poisoned")]
    Poisoned,

    #[error("Clipboard task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// ============================================
// Capability
// ============================================

/// Something that can place text on a clipboard.
#[async_trait]
pub trait ClipboardWriter: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Replace the clipboard contents with `text`, byte for byte.
    async fn write_text(&self, text: &str) -> Result<(), Self::Error>;
}

/// Copy `text` to `clipboard`.
///
/// A failed write is logged once with [`CLIPBOARD_FAILURE_PREFIX`] and the
/// backend's error is returned as is. There is no retry and no timeout.
pub async fn copy_to_clipboard<C>(clipboard: &C, text: &str) -> Result<(), C::Error>
where
    C: ClipboardWriter + ?Sized,
{
    match clipboard.write_text(text).await {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::error!("{}: {}", CLIPBOARD_FAILURE_PREFIX, err);
            Err(err)
        }
    }
}

/// Open the host clipboard and copy `text` into it.
pub async fn copy_to_system_clipboard(text: &str) -> Result<(), ClipboardError> {
    let clipboard = open_logged().await?;
    copy_to_clipboard(&clipboard, text).await
}

/// Open the host clipboard, logging a failure the same way a failed copy is.
async fn open_logged() -> Result<SystemClipboard, ClipboardError> {
    match SystemClipboard::open().await {
        Ok(clipboard) => Ok(clipboard),
        Err(err) => {
            tracing::error!("{}: {}", CLIPBOARD_FAILURE_PREFIX, err);
            Err(err)
        }
    }
}

// ============================================
// Host Backend
// ============================================

/// The operating system clipboard.
///
/// Holds one arboard handle for its whole lifetime; on X11 and Wayland the
/// copied text is only served while a handle is alive, unless the write
/// waits for the selection to be taken over (see [`Self::wait_until_replaced`]).
#[derive(Clone)]
pub struct SystemClipboard {
    inner: Arc<Mutex<arboard::Clipboard>>,
    wait_until_replaced: bool,
}

impl SystemClipboard {
    /// Connect to the host clipboard. The connection runs on the blocking pool.
    pub async fn open() -> Result<Self, ClipboardError> {
        let clipboard = tokio::task::spawn_blocking(arboard::Clipboard::new).await??;
        Ok(Self {
            inner: Arc::new(Mutex::new(clipboard)),
            wait_until_replaced: false,
        })
    }

    /// Make writes block until another application owns the selection.
    ///
    /// Needed by short-lived processes on Linux, where the text disappears
    /// with the process otherwise. Other platforms keep the text after exit
    /// and ignore the flag.
    pub fn wait_until_replaced(mut self, wait: bool) -> Self {
        self.wait_until_replaced = wait;
        self
    }

    pub fn waits_until_replaced(&self) -> bool {
        self.wait_until_replaced
    }

    /// Current clipboard text.
    pub async fn read_text(&self) -> Result<String, ClipboardError> {
        let inner = self.inner.clone();

        tokio::task::spawn_blocking(move || -> Result<String, ClipboardError> {
            let mut clipboard = inner.lock().map_err(|_| ClipboardError::Poisoned)?;
            Ok(clipboard.get_text()?)
        })
        .await?
    }
}

#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
fn set_text(
    clipboard: &mut arboard::Clipboard,
    text: String,
    wait: bool,
) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    if wait {
        clipboard.set().wait().text(text)
    } else {
        clipboard.set_text(text)
    }
}

#[cfg(not(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
)))]
fn set_text(
    clipboard: &mut arboard::Clipboard,
    text: String,
    _wait: bool,
) -> Result<(), arboard::Error> {
    clipboard.set_text(text)
}

#[async_trait]
impl ClipboardWriter for SystemClipboard {
    type Error = ClipboardError;

    async fn write_text(&self, text: &str) -> Result<(), Self::Error> {
        let inner = self.inner.clone();
        let text = text.to_owned();
        let wait = self.wait_until_replaced;

        // arboard blocks on the display server
        tokio::task::spawn_blocking(move || -> Result<(), ClipboardError> {
            let mut clipboard = inner.lock().map_err(|_| ClipboardError::Poisoned)?;
            set_text(&mut clipboard, text, wait)?;
            Ok(())
        })
        .await?
    }
}

// ============================================
// In-Process Backend
// ============================================

/// Clipboard that lives in this process only. Used headless and in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last text written, if any.
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ClipboardWriter for MemoryClipboard {
    type Error = Infallible;

    async fn write_text(&self, text: &str) -> Result<(), Self::Error> {
        let mut slot = self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(text.to_owned());
        Ok(())
    }
}

// ============================================
// Configured Backend
// ============================================

/// Whichever backend the configuration selected.
#[derive(Clone)]
pub enum ConfiguredClipboard {
    System(SystemClipboard),
    Memory(MemoryClipboard),
}

impl ConfiguredClipboard {
    /// Open the selected backend. A host clipboard that cannot be opened is
    /// logged with [`CLIPBOARD_FAILURE_PREFIX`] before the error is returned.
    pub async fn from_config(config: &AppConfig) -> Result<Self, ClipboardError> {
        match config.clipboard {
            ClipboardBackend::System => Ok(Self::System(open_logged().await?)),
            ClipboardBackend::Memory => Ok(Self::Memory(MemoryClipboard::new())),
        }
    }

    /// See [`SystemClipboard::wait_until_replaced`]. No effect on the memory backend.
    pub fn wait_until_replaced(self, wait: bool) -> Self {
        match self {
            Self::System(clipboard) => Self::System(clipboard.wait_until_replaced(wait)),
            memory @ Self::Memory(_) => memory,
        }
    }
}

#[async_trait]
impl ClipboardWriter for ConfiguredClipboard {
    type Error = ClipboardError;

    async fn write_text(&self, text: &str) -> Result<(), Self::Error> {
        match self {
            Self::System(clipboard) => clipboard.write_text(text).await,
            Self::Memory(clipboard) => match clipboard.write_text(text).await {
                Ok(()) => Ok(()),
                Err(never) => match never {},
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, thiserror::Error)]
    #[error("permission denied")]
    struct Denied;

    struct DenyingClipboard;

    #[async_trait]
    impl ClipboardWriter for DenyingClipboard {
        type Error = Denied;

        async fn write_text(&self, _text: &str) -> Result<(), Self::Error> {
            Err(Denied)
        }
    }

    #[tokio::test]
    async fn test_copy_places_text() {
        let clipboard = MemoryClipboard::new();

        copy_to_clipboard(&clipboard, "hello world").await.unwrap();
        assert_eq!(clipboard.contents(), Some("hello world".to_string()));
    }

    #[tokio::test]
    async fn test_copy_passes_text_unmodified() {
        let clipboard = MemoryClipboard::new();

        for text in ["", "tab\tand\nnewline\r\n", "\u{0}\u{7}bell", "复制 ✓"] {
            copy_to_clipboard(&clipboard, text).await.unwrap();
            assert_eq!(clipboard.contents().as_deref(), Some(text));
        }
    }

    #[tokio::test]
    async fn test_copy_replaces_previous_contents() {
        let clipboard = MemoryClipboard::new();

        copy_to_clipboard(&clipboard, "first").await.unwrap();
        copy_to_clipboard(&clipboard, "second").await.unwrap();
        assert_eq!(clipboard.contents(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_copy_forwards_backend_error() {
        let result = copy_to_clipboard(&DenyingClipboard, "x").await;
        assert_eq!(result, Err(Denied));
    }

    #[tokio::test]
    async fn test_memory_backend_through_configured_clipboard() {
        let memory = MemoryClipboard::new();
        let clipboard = ConfiguredClipboard::Memory(memory.clone());

        copy_to_clipboard(&clipboard, "shared").await.unwrap();
        assert_eq!(memory.contents(), Some("shared".to_string()));
    }

    #[tokio::test]
    async fn test_configured_memory_backend() {
        let config = AppConfig {
            clipboard: ClipboardBackend::Memory,
            ..AppConfig::default()
        };

        let clipboard = ConfiguredClipboard::from_config(&config).await.unwrap();
        assert!(matches!(clipboard, ConfiguredClipboard::Memory(_)));
    }

    #[tokio::test]
    async fn test_wait_flag_leaves_memory_backend_usable() {
        let memory = MemoryClipboard::new();
        let clipboard = ConfiguredClipboard::Memory(memory.clone()).wait_until_replaced(true);

        copy_to_clipboard(&clipboard, "kept").await.unwrap();
        assert_eq!(memory.contents(), Some("kept".to_string()));
    }

    #[tokio::test]
    async fn test_host_clipboard_wait_flag() {
        // Only meaningful where a display server is reachable
        let Ok(clipboard) = SystemClipboard::open().await else {
            return;
        };

        assert!(!clipboard.waits_until_replaced());
        let clipboard = ConfiguredClipboard::System(clipboard).wait_until_replaced(true);
        match clipboard {
            ConfiguredClipboard::System(inner) => assert!(inner.waits_until_replaced()),
            ConfiguredClipboard::Memory(_) => panic!("backend changed"),
        }
    }
}
