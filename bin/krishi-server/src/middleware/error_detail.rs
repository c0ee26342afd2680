//! Development-mode error detail.
//!
//! Internal errors and handler panics always render the generic body. When
//! the server runs in development mode this layer swaps the generic message
//! for the detail carried in [`InternalErrorDetail`].

use std::any::Any;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use krishi_types::ErrorBody;

use crate::error::{INTERNAL_ERROR, InternalErrorDetail, ServerError};
use crate::state::AppState;

pub async fn expose_internal_detail(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let Some(InternalErrorDetail(detail)) =
        response.extensions_mut().remove::<InternalErrorDetail>()
    else {
        return response;
    };
    if !state.config.is_development() {
        return response;
    }

    let status = response.status();
    (status, Json(ErrorBody::new(INTERNAL_ERROR).with_message(detail))).into_response()
}

/// Response for a panicking handler, used with `CatchPanicLayer::custom`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "handler panicked".to_owned()
    };
    ServerError::Internal(detail).into_response()
}
