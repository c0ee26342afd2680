//! Transport between a [`crate::ChatSession`] and `krishi-server`.

use async_trait::async_trait;
use krishi_types::{ChatHealth, ChatMessageRequest, ChatMessageResponse, ErrorBody};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::ClientError;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Sends one chat message to the proxy endpoint.
#[async_trait]
pub trait ProxyApi: Send + Sync {
    async fn send_message(&self, message: &str) -> Result<ChatMessageResponse, ClientError>;
}

/// [`ProxyApi`] over HTTP, using the server's JSON contract.
#[derive(Debug, Clone)]
pub struct HttpProxyApi {
    client: reqwest::Client,
    base_url: String,
}

impl Default for HttpProxyApi {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

impl HttpProxyApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/chat/health`.
    pub async fn health(&self) -> Result<ChatHealth, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/chat/health", self.base_url))
            .send()
            .await?;
        decode(response).await
    }
}

#[async_trait]
impl ProxyApi for HttpProxyApi {
    async fn send_message(&self, message: &str) -> Result<ChatMessageResponse, ClientError> {
        debug!(len = message.len(), "posting chat message");
        let response = self
            .client
            .post(format!("{}/api/chat/message", self.base_url))
            .json(&ChatMessageRequest::new(message))
            .send()
            .await?;
        decode(response).await
    }
}

/// Decode a 2xx body as `T`, or a non-2xx body as [`ErrorBody`] when possible.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        let body = serde_json::from_slice::<ErrorBody>(&bytes).ok();
        return Err(ClientError::Rejected { status, body });
    }
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::{get, post};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    type JsonReply = (StatusCode, [(&'static str, &'static str); 1], &'static str);

    fn json_reply(status: StatusCode, body: &'static str) -> JsonReply {
        (status, [("content-type", "application/json")], body)
    }

    #[tokio::test]
    async fn send_message_decodes_success() {
        let app = Router::new().route(
            "/api/chat/message",
            post(|axum::Json(req): axum::Json<ChatMessageRequest>| async move {
                axum::Json(ChatMessageResponse {
                    success: true,
                    response: format!("echo: {}", req.message.unwrap_or_default()),
                    timestamp: "2026-01-01T00:00:00.000Z".into(),
                })
            }),
        );
        let api = HttpProxyApi::new(serve(app).await);

        let reply = api.send_message("How to grow rice?").await.unwrap();
        assert!(reply.success);
        assert_eq!(reply.response, "echo: How to grow rice?");
    }

    #[tokio::test]
    async fn rejection_carries_server_hint() {
        let app = Router::new().route(
            "/api/chat/message",
            post(|| async {
                json_reply(
                    StatusCode::SERVICE_UNAVAILABLE,
                    r#"{"error":"AI service overloaded","message":"try again"}"#,
                )
            }),
        );
        let api = HttpProxyApi::new(serve(app).await);

        let err = api.send_message("hi").await.unwrap_err();
        assert!(matches!(
            &err,
            ClientError::Rejected { status, .. } if *status == StatusCode::SERVICE_UNAVAILABLE
        ));
        assert_eq!(err.user_message(), Some("try again"));
    }

    #[tokio::test]
    async fn rejection_without_json_has_no_hint() {
        let app = Router::new().route(
            "/api/chat/message",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let api = HttpProxyApi::new(serve(app).await);

        let err = api.send_message("hi").await.unwrap_err();
        assert!(err.user_message().is_none());
    }

    #[tokio::test]
    async fn health_decodes_camel_case() {
        let app = Router::new().route(
            "/api/chat/health",
            get(|| async {
                json_reply(
                    StatusCode::OK,
                    r#"{"status":"OK","providerConfigured":true,"message":"Chat service ready"}"#,
                )
            }),
        );
        let api = HttpProxyApi::new(serve(app).await);

        let health = api.health().await.unwrap();
        assert!(health.provider_configured);
    }
}
