//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID, panic capture, error detail)
//! - Optional Swagger UI / OpenAPI document (disable with `KRISHI_ENABLE_SWAGGER=false`)
//! - Process health route
//! - Chat routes under `/api/chat`
//! - JSON 404 for everything else

mod chat;
pub mod doc;
mod health;

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::{ROUTE_NOT_FOUND, ServerError};
use crate::middleware::{cors, error_detail, trace};
use crate::state::AppState;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .nest("/api/chat", chat::router());

    if state.config.enable_swagger {
        app = app.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()),
        );
    }

    with_middleware(app, state)
}

/// Add the fallbacks and the middleware stack to `routes`.
fn with_middleware(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    routes
        .fallback(route_not_found)
        // Innermost first: panics become 500s before the detail layer sees them.
        .layer(CatchPanicLayer::custom(error_detail::panic_response))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error_detail::expose_internal_detail,
        ))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trace::trace_middleware,
        ))
        // Outermost, so CORS headers reach early rejections from the trace layer.
        .layer(cors::cors_layer(state.clone()))
        .with_state(state)
}

/// JSON 404 for unmatched paths, and for known paths hit with the wrong method.
pub(crate) async fn route_not_found() -> ServerError {
    ServerError::NotFound(ROUTE_NOT_FOUND.to_owned())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::routing::get;
    use http_body_util::BodyExt;
    use krishi_provider::{GenerativeProvider, ProviderError};
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    /// Provider double that records prompts and returns a fixed outcome.
    struct FakeProvider {
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        outcome: Result<String, (StatusCode, String)>,
    }

    impl FakeProvider {
        fn replying(text: &str) -> Arc<Self> {
            Self::with(Ok(text.to_owned()))
        }

        fn failing(status: StatusCode, body: &str) -> Arc<Self> {
            Self::with(Err((status, body.to_owned())))
        }

        fn with(outcome: Result<String, (StatusCode, String)>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                outcome,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_owned());
            match &self.outcome {
                Ok(text) => Ok(text.clone()),
                Err((status, body)) => Err(ProviderError::Api {
                    status: *status,
                    body: body.clone(),
                }),
            }
        }
    }

    fn state_with(provider: Option<Arc<FakeProvider>>, config: Config) -> Arc<AppState> {
        let provider = provider.map(|p| p as Arc<dyn GenerativeProvider>);
        Arc::new(AppState::new(config, provider))
    }

    fn app(provider: Option<Arc<FakeProvider>>) -> Router {
        build(state_with(provider, Config::default()))
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(path: &str, body: &str) -> Request<Body> {
        Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn get_req(path: &str) -> Request<Body> {
        Request::get(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn blank_messages_are_rejected_without_calling_provider() {
        let provider = FakeProvider::replying("unused");
        for body in [
            r#"{"message":""}"#,
            r#"{"message":"   \n\t"}"#,
            r#"{}"#,
            r#"{"message":null}"#,
            r#"{"message":42}"#,
            "not json",
        ] {
            let (status, json) =
                call(app(Some(provider.clone())), post_json("/api/chat/message", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json, json!({ "error": "Message is required" }), "{body}");
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn unconfigured_provider_answers_503() {
        for body in [r#"{"message":"How to grow rice?"}"#, r#"{"message":"x"}"#] {
            let (status, json) = call(app(None), post_json("/api/chat/message", body)).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(json["error"], "Gemini API not configured");
            assert_eq!(
                json["message"],
                "Please set up your Gemini API key in the environment variables"
            );
        }

        let (status, json) = call(app(None), get_req("/api/chat/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({
                "status": "OK",
                "providerConfigured": false,
                "message": "Gemini API key not configured"
            })
        );
    }

    #[tokio::test]
    async fn configured_chat_health_reports_ready() {
        let provider = FakeProvider::replying("unused");
        let (status, json) = call(app(Some(provider.clone())), get_req("/api/chat/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["providerConfigured"], true);
        assert_eq!(json["message"], "Chat service ready");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn success_returns_generated_text() {
        let provider = FakeProvider::replying("T");
        let (status, json) = call(
            app(Some(provider.clone())),
            post_json("/api/chat/message", r#"{"message":"How to grow rice?"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["response"], "T");
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok(), "{timestamp}");

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Kerala, India"));
        assert!(prompts[0].ends_with("User question: How to grow rice?"));
    }

    #[tokio::test]
    async fn invalid_key_maps_to_401() {
        let provider = FakeProvider::failing(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"API key not valid","details":[{"reason":"API_KEY_INVALID"}]}}"#,
        );
        let (status, json) = call(
            app(Some(provider)),
            post_json("/api/chat/message", r#"{"message":"hi"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            json,
            json!({
                "error": "Invalid Gemini API key",
                "message": "Please check your API key configuration"
            })
        );
    }

    #[tokio::test]
    async fn overload_maps_to_503_in_any_case() {
        let provider =
            FakeProvider::failing(StatusCode::TOO_MANY_REQUESTS, "The model is OVERLOADED");
        let (status, json) = call(
            app(Some(provider)),
            post_json("/api/chat/message", r#"{"message":"hi"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "AI service overloaded");
        assert_ne!(json["error"], "Failed to generate response");
    }

    #[tokio::test]
    async fn other_provider_failures_map_to_500() {
        let provider = FakeProvider::failing(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        let (status, json) = call(
            app(Some(provider)),
            post_json("/api/chat/message", r#"{"message":"hi"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json,
            json!({
                "error": "Failed to generate response",
                "message": "Please try again later"
            })
        );
    }

    #[tokio::test]
    async fn gemini_candidate_without_text_maps_to_500() {
        let gemini = Router::new().fallback(|| async {
            (
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"candidates":[{"finishReason":"SAFETY","index":0}]}"#,
            )
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, gemini).await.unwrap();
        });

        let config = Config::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("test-key".to_owned()),
            "KRISHI_GEMINI_BASE_URL" => Some(format!("http://{addr}")),
            _ => None,
        });
        let state = Arc::new(AppState::from_config(config).unwrap());
        let (status, json) = call(
            build(state),
            post_json("/api/chat/message", r#"{"message":"hi"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json,
            json!({
                "error": "Failed to generate response",
                "message": "Please try again later"
            })
        );
    }

    #[tokio::test]
    async fn process_health_is_ok() {
        let (status, json) = call(app(None), get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "OK");
        assert_eq!(json["message"], "Krishi backend is running");
    }

    #[tokio::test]
    async fn unknown_routes_are_json_404() {
        for request in [
            get_req("/nope"),
            get_req("/api/chat/message"),
            post_json("/health", "{}"),
        ] {
            let (status, json) = call(app(None), request).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(json, json!({ "error": "Route not found" }));
        }
    }

    #[tokio::test]
    async fn responses_carry_trace_id() {
        let trace_id = "6f1f4f0e-8c1d-4c3a-9d55-0e3f8b1a2c3d";
        let response = app(None)
            .oneshot(
                Request::get("/health")
                    .header(trace::X_TRACE_ID, trace_id)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[trace::X_TRACE_ID], trace_id);

        let response = app(None).oneshot(get_req("/health")).await.unwrap();
        let generated = response.headers()[trace::X_TRACE_ID].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(generated).is_ok());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let config = Config {
            max_body_bytes: 16,
            ..Config::default()
        };
        let app = build(state_with(Some(FakeProvider::replying("x")), config));
        let response = app
            .oneshot(
                Request::post("/api/chat/message")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::from(r#"{"message":"this is far too long"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert!(response.headers().contains_key(trace::X_TRACE_ID));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, json!({ "error": "Request body too large" }));
    }

    async fn boom() -> &'static str {
        panic!("sensor table missing")
    }

    fn panicking_app(config: Config) -> Router {
        let routes = Router::new().route("/boom", get(boom));
        with_middleware(routes, state_with(None, config))
    }

    #[tokio::test]
    async fn panics_hide_detail_in_production() {
        let (status, json) = call(panicking_app(Config::default()), get_req("/boom")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json,
            json!({ "error": "Something went wrong!", "message": "Internal server error" })
        );
    }

    #[tokio::test]
    async fn panics_show_detail_in_development() {
        let config = Config {
            mode: crate::config::RuntimeMode::Development,
            ..Config::default()
        };
        let (status, json) = call(panicking_app(config), get_req("/boom")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Something went wrong!");
        assert_eq!(json["message"], "sensor table missing");
    }
}
