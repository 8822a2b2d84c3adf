//! JSON REST handler for the email activity log.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use dunning_app::ports::{Clock, InvoiceSource, Mailer, StateStore};
use dunning_domain::email_log::EmailLogEntry;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the activity endpoint.
#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

/// `GET /api/activity?limit=N`: sent emails, newest first.
pub async fn list<S, I, M, C>(
    State(state): State<AppState<S, I, M, C>>,
    Query(params): Query<ActivityQuery>,
) -> Result<Json<Vec<EmailLogEntry>>, ApiError>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    let entries = state.activity_service.recent(params.limit).await?;
    Ok(Json(entries))
}
