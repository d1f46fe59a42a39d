//! HTTP middleware: CORS policy

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Build the CORS layer for the configured origins.
///
/// `"*"` anywhere in the list allows every origin. Entries that are not valid
/// header values are skipped with a warning.
pub fn cors_layer(allow_origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins(allow_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
}

fn allowed_origins(allow_origins: &[String]) -> AllowOrigin {
    if allow_origins.iter().any(|origin| origin.trim() == "*") {
        info!("CORS: allowing any origin");
        return AllowOrigin::any();
    }

    let origins: Vec<HeaderValue> = allow_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("CORS: invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    info!("CORS: configured with {} allowed origin(s)", origins.len());
    AllowOrigin::list(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    async fn preflight(allow_origins: &[&str], origin: &str) -> Option<HeaderValue> {
        let origins: Vec<String> = allow_origins.iter().map(|o| o.to_string()).collect();
        let app = Router::new()
            .route("/api/tickets", get(|| async { "ok" }))
            .layer(cors_layer(&origins));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/tickets")
                    .header(header::ORIGIN, origin)
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .cloned()
    }

    #[tokio::test]
    async fn test_wildcard_allows_any_origin() {
        let allowed = preflight(&["*"], "https://anything.example").await;
        assert_eq!(allowed.unwrap(), "*");
    }

    #[tokio::test]
    async fn test_listed_origin_is_echoed() {
        let allowed = preflight(
            &["https://support.example.com", "not a\nvalid origin"],
            "https://support.example.com",
        )
        .await;
        assert_eq!(allowed.unwrap(), "https://support.example.com");
    }

    #[tokio::test]
    async fn test_unlisted_origin_is_not_allowed() {
        let allowed = preflight(&["https://support.example.com"], "https://evil.example").await;
        assert!(allowed.is_none());
    }
}
