//! JSON-file implementation of [`SecretRepository`].

use dunning_app::ports::SecretRepository;
use dunning_domain::error::DunningError;

use crate::store::JsonStateStore;

impl SecretRepository for JsonStateStore {
    async fn get_secret(&self, name: &str) -> Result<Option<String>, DunningError> {
        let value = self
            .read(|doc| {
                doc.secrets
                    .get(name)
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            })
            .await;
        Ok(value)
    }

    async fn set_secret(&self, name: &str, value: String) -> Result<(), DunningError> {
        self.mutate(|doc| {
            doc.secrets.insert(name.to_string(), value);
        })
        .await?;
        Ok(())
    }
}
