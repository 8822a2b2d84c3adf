//! # dunning-adapter-storage-json
//!
//! File persistence adapter: the entire application state lives in one
//! human-readable JSON document.
//!
//! ## Responsibilities
//! - Implement the storage port traits defined in `dunning-app::ports`
//!   (automations, email log, notes, secrets) on a single [`JsonStateStore`]
//! - Serialise every mutation and make it durable before it is visible:
//!   the change is applied to a copy, written to a temporary file, renamed
//!   over the document, and only then committed in memory
//! - Degrade to an empty document when the file is missing or unreadable
//!
//! ## Dependency rule
//! Depends on `dunning-app` (for port traits) and `dunning-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod document;
pub mod error;
mod repos;
pub mod store;

pub use document::StateDocument;
pub use error::StorageError;
pub use store::JsonStateStore;
