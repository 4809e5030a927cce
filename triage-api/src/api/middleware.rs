//! Request logging middleware

use std::time::Instant;

use axum::{
    body::Body,
    extract::Request,
    http::{header::CONTENT_LENGTH, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ErrorBody;

/// Header carrying the per-request id
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Tag each request with an id and log its outcome
///
/// The id goes out in the `x-request-id` header and, for errors raised as
/// `ApiError`, as `error.request_id` in the body.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            "Request failed"
        );
    } else {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            "Request completed"
        );
    }

    if let Some(ErrorBody(mut body)) = response.extensions_mut().remove::<ErrorBody>() {
        body["error"]["request_id"] = Value::String(request_id.to_string());
        response.headers_mut().remove(CONTENT_LENGTH);
        *response.body_mut() = Body::from(body.to_string());
    }

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
