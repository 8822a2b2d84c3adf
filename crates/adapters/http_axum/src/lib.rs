//! # dunning-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **JSON API** under `/api`: automations, the email activity
//!   log, per-invoice notes, write-only secret settings and manual invoice
//!   sends
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map [`DunningError`](dunning_domain::error::DunningError) variants to
//!   status codes with a `{"error": "…"}` body
//!
//! ## Dependency rule
//! Depends on `dunning-app` (for port traits and services) and `dunning-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
