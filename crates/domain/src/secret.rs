//! Secret settings: stored values are write-only from the outside.

use serde::Serialize;

/// What callers may learn about a stored secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SecretStatus {
    pub configured: bool,
}

impl SecretStatus {
    /// Derive the status from a stored value; blank counts as unset.
    #[must_use]
    pub fn of(value: Option<&str>) -> Self {
        Self {
            configured: value.is_some_and(|v| !v.trim().is_empty()),
        }
    }
}
