//! # dunning-domain
//!
//! Pure domain model for the dunning reminder system.
//!
//! ## Responsibilities
//! - Foundational types: opaque identifiers, error conventions, timestamps
//! - Define **Automations** (reminder tasks bound to one invoice, governed by
//!   a recurring or burst policy)
//! - Define the **policy engine**: seed times, due checks, terminal
//!   conditions and reschedule transitions, all as pure functions
//! - Define **Invoices** as read-only snapshots supplied by ingestion
//! - Define the **email log**, per-invoice **notes** and **secret** status
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod email_log;
pub mod invoice;
pub mod note;
pub mod secret;
