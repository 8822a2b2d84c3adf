//! JSON-file implementation of [`AutomationRepository`].

use dunning_app::ports::AutomationRepository;
use dunning_domain::automation::{Automation, AutomationPatch};
use dunning_domain::error::DunningError;
use dunning_domain::id::AutomationId;

use crate::store::JsonStateStore;

impl AutomationRepository for JsonStateStore {
    async fn create(&self, automation: Automation) -> Result<Automation, DunningError> {
        let created = self
            .mutate(|doc| {
                doc.automations.push(automation.clone());
                automation
            })
            .await?;
        Ok(created)
    }

    async fn get_by_id(&self, id: &AutomationId) -> Result<Option<Automation>, DunningError> {
        let found = self
            .read(|doc| doc.automations.iter().find(|a| &a.id == id).cloned())
            .await;
        Ok(found)
    }

    async fn get_all(&self) -> Result<Vec<Automation>, DunningError> {
        Ok(self.read(|doc| doc.automations.clone()).await)
    }

    async fn update(
        &self,
        id: &AutomationId,
        patch: AutomationPatch,
    ) -> Result<Option<Automation>, DunningError> {
        self.try_mutate(|doc| {
            let Some(current) = doc.automations.iter_mut().find(|a| &a.id == id) else {
                return Ok(None);
            };
            let merged = current.patched(&patch)?;
            *current = merged.clone();
            Ok(Some(merged))
        })
        .await
    }

    async fn apply_outcome(
        &self,
        id: &AutomationId,
        patch: AutomationPatch,
    ) -> Result<Option<Automation>, DunningError> {
        self.try_mutate::<Automation, DunningError, _>(|doc| {
            let Some(current) = doc.automations.iter_mut().find(|a| &a.id == id) else {
                return Ok(None);
            };
            *current = current.merged(&patch);
            Ok(Some(current.clone()))
        })
        .await
    }

    async fn delete(&self, id: &AutomationId) -> Result<(), DunningError> {
        self.try_mutate::<(), DunningError, _>(|doc| {
            let before = doc.automations.len();
            doc.automations.retain(|a| &a.id != id);
            Ok((doc.automations.len() != before).then_some(()))
        })
        .await?;
        Ok(())
    }
}
