//! HTTP API handlers.
//!
//! # Endpoints
//!
//! - `POST /report` – submit an event for asynchronous delivery

use axum::{Router, routing::post};

use crate::state::AppState;

mod report;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/report",
        post(report::report).fallback(report::method_not_allowed),
    )
}
