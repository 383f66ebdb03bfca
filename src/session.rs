//! One chat conversation: history, preferences, transport and the busy flag.
//!
//! Everything shown to the user goes through `ChatSession::record`, which
//! appends to the history and renders the HTML fragment in one step, so no
//! message reaches the UI unformatted or unrecorded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::chat::{is_safe_audio_url, ChatOutcome, ChatRequest, ChatTransport};
use crate::error::{Result, TutorError};
use crate::format::format_message;
use crate::history::{ChatMessage, History, Role};
use crate::settings::{Settings, SettingsStore};
use crate::storage::KeyValueStore;

/// Longest message accepted for submission, in UTF-16 code units.
pub const MAX_MESSAGE_CHARS: usize = 5000;

pub const HISTORY_CLEARED_NOTICE: &str = "✨ 对话历史已清除，让我们开始新的学习吧！";
pub const SETTINGS_SAVED_NOTICE: &str = "✅ 设置已保存！";

/// A message ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage {
    pub role: Role,
    /// Raw content as recorded in history.
    pub content: String,
    /// Output of [`format_message`] for `content`.
    pub html: String,
}

/// Everything one submission produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatTurn {
    pub messages: Vec<RenderedMessage>,
    /// Validated audio path to play, present only when autoplay is enabled.
    pub audio_url: Option<String>,
}

/// Holds the busy flag for the duration of one submission.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TutorError::Busy)?;
        Ok(Self(Arc::clone(flag)))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ChatSession<T, S> {
    transport: T,
    settings: SettingsStore<S>,
    history: History,
    busy: Arc<AtomicBool>,
}

impl<T: ChatTransport, S: KeyValueStore> ChatSession<T, S> {
    pub fn new(transport: T, store: S) -> Self {
        Self {
            transport,
            settings: SettingsStore::new(store),
            history: History::new(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Shared handle a UI can poll to disable its submit control.
    pub fn busy_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.busy)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn settings(&mut self) -> Settings {
        self.settings.load()
    }

    pub fn auto_play_enabled(&self) -> bool {
        self.settings.auto_play_enabled()
    }

    /// Send one user message and collect what should be shown.
    ///
    /// Returns `Err` only for local rejections (empty, busy, too long); those
    /// record nothing. Backend and transport failures are rendered as
    /// assistant messages inside the returned turn.
    pub async fn submit_message(&mut self, text: &str) -> Result<ChatTurn> {
        let message = text.trim();
        if message.is_empty() {
            return Err(TutorError::EmptyMessage);
        }
        let _busy = BusyGuard::acquire(&self.busy)?;

        let len = message.encode_utf16().count();
        if len > MAX_MESSAGE_CHARS {
            warn!(len, max = MAX_MESSAGE_CHARS, "rejecting oversized message");
            return Err(TutorError::InputTooLarge {
                len,
                max: MAX_MESSAGE_CHARS,
            });
        }

        let mut turn = ChatTurn::default();
        turn.messages.push(self.record(Role::User, message));

        let request = ChatRequest {
            message,
            history: &self.history,
        };
        let result = self.transport.send(&request).await;

        match result.map(|response| response.into_outcome()) {
            Ok(ChatOutcome::Reply { text, audio_url }) => {
                turn.messages.push(self.record(Role::Assistant, &text));
                turn.audio_url = audio_url.and_then(|url| self.playable_audio(url));
            }
            Ok(ChatOutcome::Failed(reason)) => {
                warn!(%reason, "chat backend reported an error");
                turn.messages
                    .push(self.record(Role::Assistant, &backend_error_text(&reason)));
            }
            Ok(ChatOutcome::Empty) => {
                debug!("chat backend returned neither a reply nor an error");
            }
            Err(e) => {
                error!(error = %e, "chat request failed");
                turn.messages
                    .push(self.record(Role::Assistant, &transport_failure_text(&e)));
            }
        }

        Ok(turn)
    }

    /// Empty the history, then record a notice so the conversation restarts
    /// with one assistant message.
    pub fn clear_history(&mut self) -> RenderedMessage {
        self.history.clear();
        info!("conversation history cleared");
        self.record(Role::Assistant, HISTORY_CLEARED_NOTICE)
    }

    pub fn save_settings(&mut self, settings: &Settings) -> Result<RenderedMessage> {
        self.settings.save(settings)?;
        info!(language = %settings.language, auto_play = settings.auto_play_audio, "settings saved");
        Ok(self.record(Role::Assistant, SETTINGS_SAVED_NOTICE))
    }

    fn record(&mut self, role: Role, content: &str) -> RenderedMessage {
        self.history.push(ChatMessage::new(role, content));
        RenderedMessage {
            role,
            content: content.to_string(),
            html: format_message(content),
        }
    }

    fn playable_audio(&self, url: String) -> Option<String> {
        if !self.settings.auto_play_enabled() {
            return None;
        }
        if !is_safe_audio_url(&url) {
            error!(%url, "refusing audio URL outside the audio path");
            return None;
        }
        Some(url)
    }
}

pub fn backend_error_text(reason: &str) -> String {
    format!("❌ 错误：{reason}")
}

pub fn transport_failure_text(err: &TutorError) -> String {
    format!(
        "❌ 抱歉，发生了错误：{err}\n\n请检查：\n\
         1. 后端服务是否正在运行\n\
         2. API配置是否正确\n\
         3. 网络连接是否正常"
    )
}
