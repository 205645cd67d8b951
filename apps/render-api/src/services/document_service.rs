//! Document rendering routes.
//!
//! ```text
//! GET /documents/{id}/pdf ─────┐
//! GET /documents/pdf?id=<id> ──┴──► validate id ──► render slot ──► spawn_blocking
//!                                                                      │
//!                          200 application/pdf ◄── Pdf ────────────────┤
//!                 200 text/plain (attachment) ◄── TextFallback ────────┤
//!                               500 text/plain ◄── RenderError ─────────┘
//!
//! GET /documents/{id}/export-fallback ──► 200 text/plain (attachment)
//! ```

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use folio_render::{
    render_text_fallback, DocumentId, PdfArtifact, RenderError, RenderedDocument, TextArtifact,
};
use tokio::sync::TryAcquireError;
use tracing::{debug, warn};

use crate::auth::resolve_bearer;
use crate::error::ApiError;
use crate::SharedState;

/// Renders the document named in the path.
pub async fn render_pdf(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let id = DocumentId::parse(Some(&id)).map_err(RenderError::from)?;
    render_document(state, id, &headers).await
}

/// Renders the document named by the `id` query parameter.
///
/// The parameter must appear exactly once.
pub async fn render_pdf_by_query(
    State(state): State<SharedState>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let ids: Vec<&str> = params
        .iter()
        .filter(|(key, _)| key == "id")
        .map(|(_, value)| value.as_str())
        .collect();

    let id = DocumentId::from_values(&ids[..]).map_err(RenderError::from)?;
    render_document(state, id, &headers).await
}

/// Serves the plain-text export without touching the browser.
pub async fn export_fallback(Path(id): Path<String>) -> Result<Response, ApiError> {
    let id = DocumentId::parse(Some(&id)).map_err(RenderError::from)?;
    text_attachment(render_text_fallback(&id, Utc::now()))
}

async fn render_document(
    state: SharedState,
    id: DocumentId,
    headers: &HeaderMap,
) -> Result<Response, ApiError> {
    let permit = match state.render_slots.clone().try_acquire_owned() {
        Ok(permit) => permit,
        Err(TryAcquireError::NoPermits) => {
            warn!(document_id = %id, "All render slots busy");
            return Err(ApiError::Overloaded(format!(
                "{} renders already in progress, retry shortly",
                state.config.max_concurrent_renders
            )));
        }
        Err(TryAcquireError::Closed) => {
            return Err(ApiError::Internal("render slots closed".to_string()));
        }
    };

    let token = resolve_bearer(headers, state.config.service_token.as_deref());
    let renderer = state.renderer.clone();
    let fallback_on_failure = state.config.fallback_on_failure;
    debug!(document_id = %id, fallback_on_failure, "Dispatching render");

    let rendered = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        if fallback_on_failure {
            renderer.render_or_fallback(Some(id.as_str()), token.as_deref())
        } else {
            renderer
                .render(Some(id.as_str()), token.as_deref())
                .map(RenderedDocument::Pdf)
        }
    })
    .await
    .map_err(|e| ApiError::Internal(format!("render task failed: {e}")))??;

    match rendered {
        RenderedDocument::Pdf(pdf) => Ok(pdf_response(pdf)),
        RenderedDocument::TextFallback(text) => text_attachment(text),
    }
}

fn pdf_response(pdf: PdfArtifact) -> Response {
    let length = pdf.byte_length();
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_LENGTH, HeaderValue::from(length)),
        ],
        pdf.into_bytes(),
    )
        .into_response()
}

fn text_attachment(text: TextArtifact) -> Result<Response, ApiError> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        text.file_name
    ))
    .map_err(|_| ApiError::BadRequest("identifier cannot be used in a file name".to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        text.body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use axum::body::to_bytes;
    use folio_render::mock::MockBehavior;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_render_pdf() {
        let (state, launcher) = test_support::state(MockBehavior::default(), &[]);

        let response = render_pdf(State(state.clone()), Path("inv-1".into()), HeaderMap::new())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let length: usize = response.headers()[header::CONTENT_LENGTH]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.len(), length);
        assert!(body.starts_with(b"%PDF"));

        assert_eq!(
            launcher.visited(),
            vec!["http://localhost:5173/invoices/inv-1/print?pdf=1".to_string()]
        );
        assert_eq!(state.render_slots.available_permits(), 4);
    }

    #[tokio::test]
    async fn test_bad_identifier_is_400() {
        let (state, launcher) = test_support::state(MockBehavior::default(), &[]);

        for raw in ["a,b", "..", "."] {
            let err = render_pdf(State(state.clone()), Path(raw.into()), HeaderMap::new())
                .await
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{raw}");
        }
        assert_eq!(launcher.launched(), 0);
    }

    #[tokio::test]
    async fn test_query_form() {
        let (state, _launcher) = test_support::state(MockBehavior::default(), &[]);

        let ok = render_pdf_by_query(
            State(state.clone()),
            Query(vec![("id".into(), "inv-5".into())]),
            HeaderMap::new(),
        )
        .await
        .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let missing = render_pdf_by_query(State(state.clone()), Query(vec![]), HeaderMap::new())
            .await
            .unwrap_err();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let repeated = render_pdf_by_query(
            State(state),
            Query(vec![("id".into(), "a".into()), ("id".into(), "b".into())]),
            HeaderMap::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(repeated.status(), StatusCode::BAD_REQUEST);
        assert!(repeated.to_string().contains("got 2 values"));
    }

    #[tokio::test]
    async fn test_render_failure_is_500() {
        let (state, launcher) = test_support::state(
            MockBehavior {
                fail_launch: true,
                ..Default::default()
            },
            &[],
        );

        let err = render_pdf(State(state.clone()), Path("inv-1".into()), HeaderMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = err.into_response();
        assert!(body_text(response).await.starts_with("Error generating PDF:"));
        assert_eq!(launcher.closed(), 0);
        assert_eq!(state.renderer.stats().live, 0);
    }

    #[tokio::test]
    async fn test_render_failure_with_fallback_enabled() {
        let (state, _launcher) = test_support::state(
            MockBehavior {
                fail_export: true,
                ..Default::default()
            },
            &[("FALLBACK_ON_FAILURE", "true")],
        );

        let response = render_pdf(State(state), Path("inv-3".into()), HeaderMap::new())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"invoice-inv-3-text.txt\""
        );
        assert!(body_text(response).await.contains("Invoice ID: inv-3"));
    }

    #[tokio::test]
    async fn test_bearer_passthrough_and_service_token() {
        let (state, launcher) =
            test_support::state(MockBehavior::default(), &[("SERVICE_TOKEN", "svc-token")]);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer user-token"));
        render_pdf(State(state.clone()), Path("inv-1".into()), headers)
            .await
            .unwrap();
        render_pdf(State(state), Path("inv-2".into()), HeaderMap::new())
            .await
            .unwrap();

        assert_eq!(
            launcher.bearer_tokens(),
            vec!["user-token".to_string(), "svc-token".to_string()]
        );
    }

    #[tokio::test]
    async fn test_busy_renderer_is_503() {
        let (state, launcher) =
            test_support::state(MockBehavior::default(), &[("MAX_CONCURRENT_RENDERS", "1")]);

        let _held = state.render_slots.clone().try_acquire_owned().unwrap();
        let err = render_pdf(State(state), Path("inv-1".into()), HeaderMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(launcher.launched(), 0);
    }

    #[tokio::test]
    async fn test_export_fallback() {
        let response = export_fallback(Path("inv-42".into())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"invoice-inv-42-text.txt\""
        );
        assert!(body_text(response).await.starts_with("INVOICE EXPORT (TEXT FALLBACK)"));
    }

    #[tokio::test]
    async fn test_export_fallback_rejects_empty_id() {
        let err = export_fallback(Path("  ".into())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
