//! Chat proxy routes.
//!
//! `POST /api/chat/message` forwards one farmer question to the generative
//! provider behind the advisor prompt. `GET /api/chat/health` reports whether
//! a provider is configured without touching the network.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use krishi_types::{ChatHealth, ChatMessageRequest, ChatMessageResponse, ErrorBody, STATUS_OK};
use tracing::{debug, info, warn};
use utoipa::OpenApi;

use crate::error::{MESSAGE_REQUIRED, ServerError};
use crate::routes::route_not_found;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(post_message, chat_health),
    components(schemas(ChatMessageRequest, ChatMessageResponse, ChatHealth, ErrorBody))
)]
pub struct ChatApi;

/// Register chat routes (nested under `/api/chat`).
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/message", post(post_message).fallback(route_not_found))
        .route("/health", get(chat_health).fallback(route_not_found))
}

/// Ask the agricultural assistant a question.
#[utoipa::path(
    post,
    path = "/api/chat/message",
    tag = "chat",
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "Reply generated", body = ChatMessageResponse),
        (status = 400, description = "Message missing or blank", body = ErrorBody),
        (status = 401, description = "Provider rejected the API key", body = ErrorBody),
        (status = 500, description = "Provider failed", body = ErrorBody),
        (status = 503, description = "Provider not configured or overloaded", body = ErrorBody),
    )
)]
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatMessageRequest>, JsonRejection>,
) -> Result<Json<ChatMessageResponse>, ServerError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "unreadable chat request body");
            ChatMessageRequest::default()
        }
    };

    let Some(message) = request.text() else {
        warn!("chat request without a message");
        return Err(ServerError::Validation(MESSAGE_REQUIRED.into()));
    };

    let Some(provider) = state.provider.as_ref() else {
        warn!("chat request refused: provider is not configured");
        return Err(ServerError::NotConfigured);
    };

    debug!(provider = provider.name(), message_len = message.len(), "forwarding chat message");

    let prompt = state.prompt.render(message);
    let response = provider.generate(&prompt).await?;

    info!(provider = provider.name(), output_len = response.len(), "chat reply generated");

    Ok(Json(ChatMessageResponse {
        success: true,
        response,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// Report whether the chat service can reach a provider.
#[utoipa::path(
    get,
    path = "/api/chat/health",
    tag = "chat",
    responses(
        (status = 200, description = "Chat service status", body = ChatHealth)
    )
)]
pub async fn chat_health(State(state): State<Arc<AppState>>) -> Json<ChatHealth> {
    let configured = state.provider_configured();
    Json(ChatHealth {
        status: STATUS_OK.to_owned(),
        provider_configured: configured,
        message: if configured {
            "Chat service ready".to_owned()
        } else {
            "Gemini API key not configured".to_owned()
        },
    })
}
