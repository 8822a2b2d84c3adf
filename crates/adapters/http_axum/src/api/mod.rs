//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod activity;
#[allow(clippy::missing_errors_doc)]
pub mod automations;
#[allow(clippy::missing_errors_doc)]
pub mod invoices;
#[allow(clippy::missing_errors_doc)]
pub mod notes;
#[allow(clippy::missing_errors_doc)]
pub mod settings;

use axum::Router;
use axum::routing::{get, post};

use dunning_app::ports::{Clock, InvoiceSource, Mailer, StateStore};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S, I, M, C>() -> Router<AppState<S, I, M, C>>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    Router::new()
        // Automations
        .route(
            "/automations",
            get(automations::list::<S, I, M, C>).post(automations::create::<S, I, M, C>),
        )
        .route("/automations/run", post(automations::run::<S, I, M, C>))
        .route(
            "/automations/{id}",
            get(automations::get::<S, I, M, C>)
                .patch(automations::update::<S, I, M, C>)
                .delete(automations::delete::<S, I, M, C>),
        )
        // Activity
        .route("/activity", get(activity::list::<S, I, M, C>))
        // Notes
        .route(
            "/notes/{invoice_id}",
            get(notes::list::<S, I, M, C>).post(notes::create::<S, I, M, C>),
        )
        // Settings
        .route(
            "/settings/secrets/{name}",
            get(settings::status::<S, I, M, C>).put(settings::set::<S, I, M, C>),
        )
        // Invoices
        .route(
            "/invoices/{id}/send-email",
            post(invoices::send_email::<S, I, M, C>),
        )
}
