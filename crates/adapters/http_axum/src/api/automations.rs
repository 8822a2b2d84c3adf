//! JSON REST handlers for automations.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use dunning_app::ports::{Clock, InvoiceSource, Mailer, StateStore};
use dunning_app::scheduler::TickReport;
use dunning_domain::automation::{Automation, AutomationPatch, NewAutomation};
use dunning_domain::id::AutomationId;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for the "run now" endpoint.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub due: usize,
    pub dispatched: usize,
    pub failed: usize,
    pub stopped: usize,
}

impl From<TickReport> for RunReport {
    fn from(report: TickReport) -> Self {
        Self {
            due: report.due,
            dispatched: report.dispatched,
            failed: report.failed,
            stopped: report.stopped,
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Automation>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Automation>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Automation>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/automations`: list all automations.
pub async fn list<S, I, M, C>(
    State(state): State<AppState<S, I, M, C>>,
) -> Result<ListResponse, ApiError>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    let automations = state.automation_service.list().await?;
    Ok(ListResponse::Ok(Json(automations)))
}

/// `GET /api/automations/{id}`: get automation by ID.
pub async fn get<S, I, M, C>(
    State(state): State<AppState<S, I, M, C>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    let automation = state
        .automation_service
        .get(&AutomationId::from(id.as_str()))
        .await?;
    Ok(GetResponse::Ok(Json(automation)))
}

/// `POST /api/automations`: create a new automation.
pub async fn create<S, I, M, C>(
    State(state): State<AppState<S, I, M, C>>,
    payload: Result<Json<NewAutomation>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    let Json(req) = payload?;
    let created = state.automation_service.add(req).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PATCH /api/automations/{id}`: merge a partial update.
pub async fn update<S, I, M, C>(
    State(state): State<AppState<S, I, M, C>>,
    Path(id): Path<String>,
    payload: Result<Json<AutomationPatch>, JsonRejection>,
) -> Result<GetResponse, ApiError>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    let Json(patch) = payload?;
    let updated = state
        .automation_service
        .update(&AutomationId::from(id.as_str()), patch)
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/automations/{id}`: delete an automation.
pub async fn delete<S, I, M, C>(
    State(state): State<AppState<S, I, M, C>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    state
        .automation_service
        .remove(&AutomationId::from(id.as_str()))
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// `POST /api/automations/run`: run one scheduler pass now.
pub async fn run<S, I, M, C>(
    State(state): State<AppState<S, I, M, C>>,
) -> Result<Json<RunReport>, ApiError>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    let report = state.scheduler.run_due_automations().await?;
    Ok(Json(report.into()))
}
