//! HTTP implementation of the completion mediator.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint. Each request
//! carries exactly two messages: the fixed system persona and the user's
//! utterance — no history.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use mindease_core::config::CompletionConfig;
use mindease_sentiment::SentimentScorer;

use crate::{ChatCompletion, ChatTurn, GatewayError};

/// Reply used when the provider responds with something that is neither a
/// candidate nor a structured error.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't reply at the moment.";

/// HTTP completion gateway.
pub struct CompletionGateway {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    persona: String,
    scorer: SentimentScorer,
}

impl CompletionGateway {
    /// Build a gateway from config plus the (optional) provider key.
    ///
    /// A missing key is not an error here: the provider will reject the
    /// request and its structured error message becomes the reply.
    pub fn new(config: &CompletionConfig, api_key: Option<String>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            api_key,
            model: config.model.clone(),
            persona: config.persona.clone(),
            scorer: SentimentScorer::new(),
        })
    }

    async fn request_reply(&self, utterance: &str) -> Result<String, GatewayError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                RequestMessage {
                    role: "system",
                    content: &self.persona,
                },
                RequestMessage {
                    role: "user",
                    content: utterance,
                },
            ],
        };

        let mut builder = self.client.post(&self.api_base).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Completion request failed in transport");
            GatewayError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<ChatCompletionResponse>(&body) {
            Ok(parsed) => {
                if let Some(text) = parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                {
                    return Ok(text);
                }
                if let Some(err) = parsed.error {
                    // Shown verbatim as the reply — a concession to debuggability.
                    tracing::warn!(message = %err.message, "Provider reported an error");
                    return Ok(err.message);
                }
                tracing::warn!(status = status.as_u16(), "Provider response had no candidates");
                Ok(FALLBACK_REPLY.to_string())
            }
            Err(_) if !status.is_success() => {
                tracing::error!(status = status.as_u16(), "Provider returned unreadable error body");
                Err(GatewayError::UpstreamStatus {
                    status: status.as_u16(),
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Provider response body did not parse");
                Ok(FALLBACK_REPLY.to_string())
            }
        }
    }
}

#[async_trait]
impl ChatCompletion for CompletionGateway {
    async fn complete(&self, utterance: &str) -> Result<ChatTurn, GatewayError> {
        // Mood is derived from the user's utterance, not the reply, and is
        // computed before the completion round-trip.
        let mood_score = self.scorer.score(utterance);
        let reply = self.request_reply(utterance).await?;
        Ok(ChatTurn { reply, mood_score })
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ProviderError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}
