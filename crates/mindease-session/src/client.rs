//! HTTP client for the MindEase server, used by non-browser clients.
//!
//! Implements [`ChatCompletion`] against `POST /chat` and
//! [`CredentialSource`] against `GET /agora-token`, so a
//! `ConversationSession` or `VoiceSession` can run against a live server.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use mindease_core::types::Credential;
use mindease_gateway::{ChatCompletion, ChatTurn, GatewayError};

use crate::capability::CredentialSource;
use crate::error::SessionError;

/// Client for the MindEase HTTP mediator.
pub struct ChatApiClient {
    client: Client,
    base_url: String,
}

impl ChatApiClient {
    /// `base_url` is scheme + host + port, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    reply: String,
    #[serde(rename = "moodScore")]
    mood_score: i32,
}

#[derive(Deserialize)]
struct TokenResponseBody {
    token: String,
    #[serde(rename = "appId")]
    app_id: String,
}

#[async_trait]
impl ChatCompletion for ChatApiClient {
    async fn complete(&self, utterance: &str) -> Result<ChatTurn, GatewayError> {
        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&ChatRequestBody { message: utterance })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The server's 500 body carries its own fallback; the session
            // applies its fixed error reply instead.
            return Err(GatewayError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(ChatTurn {
            reply: body.reply,
            mood_score: body.mood_score,
        })
    }
}

#[async_trait]
impl CredentialSource for ChatApiClient {
    async fn fetch(&self, channel: &str) -> Result<Credential, SessionError> {
        let response = self
            .client
            .get(format!("{}/agora-token", self.base_url))
            .query(&[("channel", channel)])
            .send()
            .await
            .map_err(|e| SessionError::Credential(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Credential(format!("status {}", status)));
        }

        let body: TokenResponseBody = response
            .json()
            .await
            .map_err(|e| SessionError::Credential(e.to_string()))?;

        // The wire body carries only token + appId; the TTL is fixed
        // server-side at one hour.
        Ok(Credential {
            token: body.token,
            app_id: body.app_id,
            channel_name: channel.to_string(),
            expires_at: Utc::now() + chrono::Duration::seconds(3600),
        })
    }
}
