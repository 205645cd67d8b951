//! Bearer credential pass-through.
//!
//! The render service does not authenticate callers itself. It forwards a
//! bearer token to the print view so the front-end can fetch the invoice:
//!
//! ```text
//! Authorization: Bearer <caller token>  ──►  headless page
//!          (absent)                     ──►  SERVICE_TOKEN, if configured
//! ```

use axum::http::{header, HeaderMap};

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Picks the token to attach to the headless page.
pub fn resolve_bearer(headers: &HeaderMap, service_token: Option<&str>) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
        .or(service_token)
        .map(str::to_string)
}
