//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use dunning_app::ports::{Clock, InvoiceSource, Mailer, StateStore};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the API routes under `/api` next to a plain-text `/health` probe.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<S, I, M, C>(state: AppState<S, I, M, C>) -> Router
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
