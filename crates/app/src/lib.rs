//! # dunning-app
//!
//! Application layer: use-cases, **port definitions** (traits) and the
//! reminder scheduler.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AutomationRepository`: CRUD for automations, atomic partial updates
//!   - `EmailLogRepository`: append & query the capped email log
//!   - `NoteRepository`: per-invoice notes
//!   - `SecretRepository`: write-only secret settings
//!   - `InvoiceSource`: read-only invoice snapshots
//!   - `Mailer`: outbound email dispatch
//!   - `Clock`: the current time
//! - Define **driving/inbound ports** as use-case structs:
//!   - `AutomationService`: the automation registry
//!   - `ActivityService`, `NoteService`, `SettingsService`, `DispatchService`
//!   - `Scheduler`: periodic pass over due automations
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (the shared invoice snapshot)
//!
//! ## Dependency rule
//! Depends on `dunning-domain` only (plus `tokio` for the timer and task).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod invoice_snapshot;
pub mod ports;
pub mod scheduler;
pub mod services;

#[cfg(test)]
mod testing;
