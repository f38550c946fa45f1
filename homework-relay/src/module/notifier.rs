//! Telegram Bot API sender

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("bot API unreachable: {0}")]
    Request(#[source] reqwest::Error),

    #[error("bot API rejected the message (HTTP {status}): {description}")]
    Rejected {
        status: reqwest::StatusCode,
        description: String,
    },
}

/// Delivers text to the configured chat.
#[async_trait]
pub trait MessageSender {
    async fn send_message(&self, text: &str) -> Result<(), SendError>;
}

#[derive(Serialize, Debug)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SendError::Request)?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

#[async_trait]
impl MessageSender for TelegramNotifier {
    async fn send_message(&self, text: &str) -> Result<(), SendError> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.token);
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            // The URL embeds the bot token and must not reach the logs
            .map_err(|e| SendError::Request(e.without_url()))?;

        let status = response.status();
        // The bot API reports failures in the body, sometimes with a 200.
        // Any body error is discarded, so its URL never surfaces.
        let body: Option<ApiResponse> = response.json().await.ok();
        match body {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse { description, .. }) => Err(SendError::Rejected {
                status,
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
            None => Err(SendError::Rejected {
                status,
                description: "unreadable response body".to_string(),
            }),
        }
    }
}
