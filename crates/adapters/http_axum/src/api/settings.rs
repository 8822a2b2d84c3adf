//! JSON REST handlers for secret settings.
//!
//! Values can be written but are never echoed back.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::Deserialize;

use dunning_app::ports::{Clock, InvoiceSource, Mailer, StateStore};
use dunning_domain::secret::SecretStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for storing a secret.
#[derive(Deserialize)]
pub struct SetSecretRequest {
    #[serde(default)]
    pub value: String,
}

/// `GET /api/settings/secrets/{name}`: whether the secret is configured.
pub async fn status<S, I, M, C>(
    State(state): State<AppState<S, I, M, C>>,
    Path(name): Path<String>,
) -> Result<Json<SecretStatus>, ApiError>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    let status = state.settings_service.status(&name).await?;
    Ok(Json(status))
}

/// `PUT /api/settings/secrets/{name}`: store (or clear) a secret.
pub async fn set<S, I, M, C>(
    State(state): State<AppState<S, I, M, C>>,
    Path(name): Path<String>,
    payload: Result<Json<SetSecretRequest>, JsonRejection>,
) -> Result<Json<SecretStatus>, ApiError>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    let Json(req) = payload?;
    let status = state.settings_service.set(&name, &req.value).await?;
    Ok(Json(status))
}
