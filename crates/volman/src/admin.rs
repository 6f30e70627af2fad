// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin HTTP endpoint: Prometheus metrics and the driver list.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use volman_core::{ListDriversResponse, Manager, VolmanError};
use volman_prometheus::PrometheusSink;

#[derive(Clone)]
pub struct AdminState {
    pub manager: Arc<dyn Manager>,
    pub prometheus: Arc<PrometheusSink>,
}

pub fn admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route("/drivers", get(get_drivers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_metrics(State(state): State<AdminState>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.prometheus.render(),
    )
}

async fn get_drivers(State(state): State<AdminState>) -> Json<ListDriversResponse> {
    Json(state.manager.list_drivers())
}

/// Serves the admin router on `addr` until `cancel` fires.
pub async fn serve_admin(
    addr: String,
    state: AdminState,
    cancel: CancellationToken,
) -> Result<(), VolmanError> {
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| VolmanError::Internal(format!("failed to bind admin endpoint to {addr}: {e}")))?;
    tracing::info!(%addr, "admin endpoint listening");

    axum::serve(listener, admin_router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| VolmanError::Internal(format!("admin endpoint error: {e}")))
}
