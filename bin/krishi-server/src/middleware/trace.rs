use crate::error::{BODY_TOO_LARGE, BODY_UNREADABLE, ServerError};
use crate::state::AppState;
use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use krishi_types::ErrorBody;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// JSON bodies up to this size are written to the debug log.
const MAX_LOGGED_BODY: usize = 1024;

pub async fn trace_middleware(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();

    // Reuse the caller's trace id when it is a valid UUID.
    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let (mut parts, body) = req.into_parts();

        let limit = state.config.max_body_bytes;
        let req_bytes = match buffer_and_log("request", &parts.headers, body, limit).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let (status, label) = match e {
                    BodyError::TooLarge => (StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE),
                    BodyError::Unreadable => (StatusCode::BAD_REQUEST, BODY_UNREADABLE),
                };
                info!(limit, error = ?e, "request body rejected");
                let response = (status, Json(ErrorBody::new(label))).into_response();
                return with_trace_header(response, trace_header);
            }
        };
        if let Some(value) = &trace_header {
            parts.headers.insert(X_TRACE_ID, value.clone());
        }
        let req = Request::from_parts(parts, Body::from(req_bytes));

        let response = next.run(req).await;

        let (parts, body) = response.into_parts();
        let response = match buffer_and_log("response", &parts.headers, body, usize::MAX).await {
            Ok(bytes) => Response::from_parts(parts, Body::from(bytes)),
            Err(_) => ServerError::Internal("response body could not be read".to_owned())
                .into_response(),
        };
        let response = with_trace_header(response, trace_header);

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );

        response
    }
    .instrument(span)
    .await
}

fn with_trace_header(mut response: Response, trace_header: Option<HeaderValue>) -> Response {
    if let Some(value) = trace_header {
        response.headers_mut().insert(X_TRACE_ID, value);
    }
    response
}

/// Why a body could not be buffered.
#[derive(Debug, PartialEq, Eq)]
enum BodyError {
    /// More than the configured limit.
    TooLarge,
    /// The stream failed, e.g. the client went away mid-upload.
    Unreadable,
}

/// Collect `body` (at most `limit` bytes) and log it at debug level when it is
/// small JSON.
async fn buffer_and_log(
    direction: &str,
    headers: &header::HeaderMap,
    body: Body,
    limit: usize,
) -> Result<Bytes, BodyError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let is_json = content_type.contains("application/json");

    let bytes = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => return Err(BodyError::TooLarge),
        Err(e) => {
            warn!(error = %e, "{} body could not be buffered", direction);
            return Err(BodyError::Unreadable);
        }
    };

    if is_json && bytes.len() < MAX_LOGGED_BODY {
        if let Ok(text) = std::str::from_utf8(&bytes) {
            debug!("{} body: {}", direction, text);
        }
    } else if !bytes.is_empty() {
        debug!(
            "{} body: [skipped: type={}, size={}]",
            direction,
            content_type,
            bytes.len()
        );
    }

    Ok(bytes)
}
