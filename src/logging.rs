//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Bodies that are not text, e.g. images, are passed through untouched and
/// only their headers are logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let request = if has_text_body(&parts.headers) {
        let Some(body_text) = read_body_text(body).await else {
            return StatusCode::BAD_REQUEST.into_response();
        };
        log_body("Received request", &format!("{parts:#?}"), &body_text);
        Request::from_parts(parts, body_text.into())
    } else {
        tracing::info!("Received request: {parts:#?}");
        Request::from_parts(parts, body)
    };

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    if !has_text_body(&parts.headers) {
        tracing::info!("Sending response: {parts:#?}");
        return Response::from_parts(parts, body);
    }

    let Some(body_text) = read_body_text(body).await else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    log_body("Sending response", &format!("{parts:#?}"), &body_text);

    Response::from_parts(parts, body_text.into())
}

/// Whether the body can be read as text without losing bytes.
///
/// A missing content type counts as text, e.g. an empty body.
fn has_text_body(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE) else {
        return true;
    };
    let Ok(content_type) = content_type.to_str() else {
        return false;
    };
    let content_type = content_type.to_ascii_lowercase();

    content_type.starts_with("text/")
        || content_type.starts_with("application/json")
        || content_type.starts_with("application/x-www-form-urlencoded")
        || content_type.starts_with("application/javascript")
}

async fn read_body_text(body: Body) -> Option<String> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .inspect_err(|error| tracing::error!("could not read body: {error}"))
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

fn log_body(prefix: &str, headers: &str, body: &str) {
    match truncate(body) {
        Some(short) => {
            tracing::info!("{prefix}: {headers}\nbody: {short}...");
            tracing::debug!("Full body: {body:?}");
        }
        None => tracing::info!("{prefix}: {headers}\nbody: {body:?}"),
    }
}

/// The first [LOG_BODY_LENGTH_LIMIT] bytes of `body`, or `None` if it is short enough.
///
/// The cut is moved back to a character boundary.
fn truncate(body: &str) -> Option<&str> {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return None;
    }

    let end = (0..=LOG_BODY_LENGTH_LIMIT)
        .rev()
        .find(|&index| body.is_char_boundary(index))
        .unwrap_or(0);

    Some(&body[..end])
}
