//! Request body limit middleware

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;

/// Maximum accepted body size in bytes
#[derive(Debug, Clone, Copy)]
pub struct BodyLimit(pub usize);

/// Body size limit middleware
///
/// Checks the Content-Length header and rejects requests exceeding the
/// configured limit before the body is read. Bodies without a length are
/// capped by axum's `DefaultBodyLimit` instead.
pub async fn body_size_limit(
    State(BodyLimit(max)): State<BodyLimit>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(length) = content_length(&request) {
        if length > max {
            warn!(length, max, "Request body too large");
            return Err(StatusCode::PAYLOAD_TOO_LARGE);
        }
    }

    Ok(next.run(request).await)
}

fn content_length(request: &Request) -> Option<usize> {
    request
        .headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::post, Router};
    use tower::ServiceExt;

    fn app(max: usize) -> Router {
        Router::new()
            .route("/", post(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(BodyLimit(max), body_size_limit))
    }

    fn request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_body_within_limit() {
        let response = app(16).oneshot(request("income=1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_body_over_limit() {
        let response = app(4).oneshot(request("income=1000")).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_no_content_length_passes() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let response = app(4).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
