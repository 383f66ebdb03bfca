//! Client core for an AI language tutor chat.
//!
//! The heart of the crate is [`format::format_message`], which turns
//! untrusted user or model text into an HTML fragment: everything is escaped
//! first, then a small fixed set of bounded inline constructs is applied.
//! Around it sit the bounded conversation [`history`], the corruption-tolerant
//! [`settings`] store, the [`chat`] wire contract and a [`session`] object that
//! ties them together for a UI.

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod escape;
pub mod format;
pub mod highlight;
pub mod history;
pub mod session;
pub mod settings;
pub mod storage;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

pub use error::{Result, TutorError};
pub use escape::escape_html;
pub use format::format_message;
pub use session::{ChatSession, ChatTurn, RenderedMessage};
pub use settings::{Language, Settings, SettingsStore};
