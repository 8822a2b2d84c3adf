//! Settings service: write-only secret management.
//!
//! Values go in but never come back out; callers only learn whether a
//! secret is configured.

use dunning_domain::error::DunningError;
use dunning_domain::secret::SecretStatus;

use crate::ports::SecretRepository;

pub struct SettingsService<R> {
    repo: R,
}

impl<R: SecretRepository> SettingsService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Whether the named secret holds a non-blank value.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn status(&self, name: &str) -> Result<SecretStatus, DunningError> {
        let value = self.repo.get_secret(name).await?;
        Ok(SecretStatus::of(value.as_deref()))
    }

    /// Store a secret (trimmed). An empty value clears it.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self, value))]
    pub async fn set(&self, name: &str, value: &str) -> Result<SecretStatus, DunningError> {
        let value = value.trim().to_string();
        let status = SecretStatus::of(Some(value.as_str()));
        self.repo.set_secret(name, value).await?;
        tracing::info!(configured = status.configured, "secret updated");
        Ok(status)
    }
}
