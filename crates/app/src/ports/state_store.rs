//! State store port: the aggregate document behind every repository.

use crate::ports::{AutomationRepository, EmailLogRepository, NoteRepository, SecretRepository};

/// A backend holding automations, the email log, notes, and secrets in one
/// document.
///
/// Implemented automatically for anything that implements all four
/// repository ports.
pub trait StateStore:
    AutomationRepository + EmailLogRepository + NoteRepository + SecretRepository
{
}

impl<T> StateStore for T where
    T: AutomationRepository + EmailLogRepository + NoteRepository + SecretRepository
{
}
