//! Route handler functions for the MindEase endpoints.
//!
//! The `/chat` and `/agora-token` bodies are a fixed wire contract consumed
//! by existing clients, so handlers construct their exact success and error
//! shapes directly rather than going through a shared error responder.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Absent message degrades to the empty string, which scores zero and is
    /// forwarded as-is.
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(rename = "moodScore")]
    pub mood_score: i32,
}

#[derive(Debug, Deserialize)]
pub struct TokenParams {
    pub channel: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(rename = "appId")]
    pub app_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

// =============================================================================
// Handler functions
// =============================================================================

/// POST /chat — forward the utterance to the completion mediator.
///
/// Gateway failures never escape: they become the fixed 500 body with a
/// zero mood score.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    match state.completion.complete(&request.message).await {
        Ok(turn) => (
            StatusCode::OK,
            Json(ChatResponse {
                reply: turn.reply,
                mood_score: turn.mood_score,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Chat turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatResponse {
                    reply: "Server error".to_string(),
                    mood_score: 0,
                }),
            )
        }
    }
}

/// GET /agora-token — mint a join credential for the requested channel.
pub async fn agora_token(
    State(state): State<AppState>,
    Query(params): Query<TokenParams>,
) -> Response {
    // An absent or empty channel is a validation failure, checked before any
    // credential material is touched.
    let channel = match params.channel {
        Some(c) if !c.trim().is_empty() => c,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(TokenErrorResponse {
                    error: "channel query param is required".to_string(),
                }),
            )
                .into_response();
        }
    };

    match state.issuer.issue(&channel) {
        Ok(credential) => (
            StatusCode::OK,
            Json(TokenResponse {
                token: credential.token,
                app_id: credential.app_id,
            }),
        )
            .into_response(),
        Err(e) if e.is_validation() => (
            StatusCode::BAD_REQUEST,
            Json(TokenErrorResponse {
                error: "channel query param is required".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(channel = %channel, error = %e, "Token generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TokenErrorResponse {
                    error: "Failed to generate token".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health — liveness and uptime.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
