//! Wire contract with the chat backend and the HTTP transport.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TutorError};
use crate::history::History;

pub const CHAT_PATH: &str = "/api/chat";
/// Audio URLs from the backend must start with this path.
pub const AUDIO_PATH_PREFIX: &str = "/api/audio/";

/// Body of `POST /api/chat`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub history: &'a History,
}

/// Body returned by `POST /api/chat`. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// What a [`ChatResponse`] means to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Reply {
        text: String,
        audio_url: Option<String>,
    },
    /// The backend answered but reported an error.
    Failed(String),
    /// Neither a reply nor an error; nothing is shown.
    Empty,
}

impl ChatResponse {
    pub fn into_outcome(self) -> ChatOutcome {
        match (self.response, self.error) {
            (Some(text), _) if !text.is_empty() => ChatOutcome::Reply {
                text,
                audio_url: self.audio_url,
            },
            (_, Some(error)) if !error.is_empty() => ChatOutcome::Failed(error),
            _ => ChatOutcome::Empty,
        }
    }
}

/// Whether `url` may be handed to the audio player.
///
/// Only same-origin paths under [`AUDIO_PATH_PREFIX`] qualify; `..` segments
/// and backslashes are refused so the path cannot climb out of the prefix.
pub fn is_safe_audio_url(url: &str) -> bool {
    url.starts_with(AUDIO_PATH_PREFIX)
        && !url.contains('\\')
        && !url.split(['/', '?', '#']).any(|segment| segment == "..")
}

/// Sends one chat request and waits for the reply.
#[allow(async_fn_in_trait)]
pub trait ChatTransport {
    async fn send(&self, request: &ChatRequest<'_>) -> Result<ChatResponse>;
}

/// `reqwest`-backed transport posting JSON to `{endpoint}/api/chat`.
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    client: Client,
    url: String,
}

impl HttpChatClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}{}", endpoint.trim_end_matches('/'), CHAT_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ChatTransport for HttpChatClient {
    async fn send(&self, request: &ChatRequest<'_>) -> Result<ChatResponse> {
        debug!(
            url = %self.url,
            message_chars = request.message.chars().count(),
            history = request.history.len(),
            "sending chat request"
        );

        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = status.as_u16(), "chat backend returned an error status");
            return Err(TutorError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
