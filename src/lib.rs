//! Voxchat - chat records and clipboard helpers
//!
//! - `types` - wire shapes for messages, conversations and streamed chunks
//! - `clipboard` - async copy-to-clipboard with pluggable backends
//! - `stream` - assembling streamed chunks into whole replies
//! - `store` - in-memory conversations and their messages
//! - `config` / `logging` - environment settings and tracing setup
//!
//! ```rust,no_run
//! use voxchat::clipboard::{MemoryClipboard, copy_to_clipboard};
//!
//! # async fn example() {
//! let clipboard = MemoryClipboard::new();
//! copy_to_clipboard(&clipboard, "hello world").await.unwrap();
//! # }
//! ```
pub mod clipboard;
pub mod config;
pub mod logging;
pub mod store;
pub mod stream;
pub mod types;

pub use clipboard::{
    CLIPBOARD_FAILURE_PREFIX, ClipboardError, ClipboardWriter, copy_to_clipboard,
    copy_to_system_clipboard,
};
pub use store::ChatStore;
pub use types::{Conversation, Message, MessageChunk, Sender};
