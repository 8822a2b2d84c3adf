//! JSON REST handlers for per-invoice notes.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use dunning_app::ports::{Clock, InvoiceSource, Mailer, StateStore};
use dunning_domain::id::InvoiceId;
use dunning_domain::note::Note;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for adding a note.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub from_client: bool,
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Note>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/notes/{invoice_id}`: notes for an invoice, newest first.
pub async fn list<S, I, M, C>(
    State(state): State<AppState<S, I, M, C>>,
    Path(invoice_id): Path<String>,
) -> Result<Json<Vec<Note>>, ApiError>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    let notes = state
        .note_service
        .list(&InvoiceId::from(invoice_id))
        .await?;
    Ok(Json(notes))
}

/// `POST /api/notes/{invoice_id}`: attach a note.
pub async fn create<S, I, M, C>(
    State(state): State<AppState<S, I, M, C>>,
    Path(invoice_id): Path<String>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    let Json(req) = payload?;
    let note = state
        .note_service
        .add(&InvoiceId::from(invoice_id), &req.body, req.from_client)
        .await?;
    Ok(CreateResponse::Created(Json(note)))
}
