use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
};
use relay_core::events::Event;

use crate::state::AppState;

/// `POST /report` — decode an event submission and enqueue it for
/// delivery.
///
/// The 200 response confirms the enqueue only; delivery to the sink is
/// asynchronous and best-effort, and its outcome is never reported back
/// to the submitter.
pub(super) async fn report(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ReportError> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));
    if !is_json {
        return Err(ReportError::NotJson);
    }

    let event: Event = serde_json::from_slice(&body).map_err(ReportError::InvalidPayload)?;

    // Suspends while the queue is full: backpressure reaches the
    // submitter as latency, never as an error.
    state
        .events
        .send(event)
        .await
        .map_err(|e| ReportError::QueueClosed(e.to_string()))?;

    Ok((StatusCode::OK, "Event successfully reported"))
}

/// Fallback for non-POST methods on `/report`.
pub(super) async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        "Only supported method is POST",
    )
}

/// Errors surfaced to the event submitter.
#[derive(Debug)]
pub(super) enum ReportError {
    /// The Content-Type header does not indicate a JSON payload.
    NotJson,
    /// The body failed to decode as an event.
    InvalidPayload(serde_json::Error),
    /// The event queue is closed (delivery loop is gone).
    QueueClosed(String),
}

impl IntoResponse for ReportError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ReportError::NotJson => (
                StatusCode::BAD_REQUEST,
                "Events must be sent as json payloads",
            )
                .into_response(),
            ReportError::InvalidPayload(e) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid event payload: {e}"),
            )
                .into_response(),
            ReportError::QueueClosed(e) => {
                tracing::error!(error = %e, "Event queue closed, cannot accept report");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Unable to report analytics event: {e}"),
                )
                    .into_response()
            }
        }
    }
}
