//! Automation service: the automation registry use-cases.

use dunning_domain::automation::{Automation, AutomationPatch, NewAutomation};
use dunning_domain::error::{DunningError, NotFoundError};
use dunning_domain::id::AutomationId;

use crate::ports::{AutomationRepository, Clock};

/// Application service for automation CRUD operations.
pub struct AutomationService<R, C> {
    repo: R,
    clock: C,
}

impl<R: AutomationRepository, C: Clock> AutomationService<R, C> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Validate a request and persist a freshly armed automation.
    ///
    /// # Errors
    ///
    /// Returns [`DunningError::Validation`] if the request is invalid, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, request), fields(invoice_id = %request.invoice_id, kind = %request.kind))]
    pub async fn add(&self, request: NewAutomation) -> Result<Automation, DunningError> {
        let automation = Automation::create(request, self.clock.now())?;
        let created = self.repo.create(automation).await?;
        tracing::info!(automation_id = %created.id, "automation created");
        Ok(created)
    }

    /// Look up an automation by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DunningError::NotFound`] when no automation with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: &AutomationId) -> Result<Automation, DunningError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    /// List all automations.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list(&self) -> Result<Vec<Automation>, DunningError> {
        self.repo.get_all().await
    }

    /// Merge a partial update onto an existing automation.
    ///
    /// # Errors
    ///
    /// Returns [`DunningError::NotFound`] when `id` is unknown,
    /// [`DunningError::Validation`] if the merged record would break an
    /// invariant (nothing is written), or a storage error.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: &AutomationId,
        patch: AutomationPatch,
    ) -> Result<Automation, DunningError> {
        self.repo.update(id, patch).await?.ok_or_else(|| not_found(id))
    }

    /// Delete an automation by id. Unknown ids are not an error.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &AutomationId) -> Result<(), DunningError> {
        self.repo.delete(id).await
    }
}

fn not_found(id: &AutomationId) -> DunningError {
    NotFoundError {
        entity: "Automation",
        id: id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ManualClock;
    use crate::testing::InMemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use dunning_domain::automation::Policy;
    use dunning_domain::error::ValidationError;
    use std::sync::Arc;

    fn make_service() -> AutomationService<Arc<InMemoryStore>, ManualClock> {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        AutomationService::new(Arc::new(InMemoryStore::default()), ManualClock::new(start))
    }

    #[tokio::test]
    async fn should_add_automation_seeded_from_clock() {
        let svc = make_service();
        let created = svc.add(NewAutomation::recurring("42")).await.unwrap();

        let fetched = svc.get(&created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(
            fetched.next_run,
            Some(fetched.created_at + Duration::days(2))
        );
    }

    #[tokio::test]
    async fn should_reject_add_when_invoice_id_is_blank() {
        let svc = make_service();
        let result = svc.add(NewAutomation::recurring("")).await;
        assert!(matches!(
            result,
            Err(DunningError::Validation(ValidationError::EmptyInvoiceId))
        ));
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_return_not_found_when_automation_missing() {
        let svc = make_service();
        let result = svc.get(&AutomationId::new()).await;
        assert!(matches!(result, Err(DunningError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_list_in_creation_order() {
        let svc = make_service();
        svc.add(NewAutomation::recurring("1")).await.unwrap();
        svc.add(NewAutomation::burst("2", 3, 1)).await.unwrap();

        let all = svc.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].invoice_id.as_str(), "1");
        assert!(matches!(all[1].policy, Policy::Burst { .. }));
    }

    #[tokio::test]
    async fn should_update_automation() {
        let svc = make_service();
        let created = svc.add(NewAutomation::recurring("1")).await.unwrap();

        let saved = svc
            .update(&created.id, AutomationPatch::enabled(false))
            .await
            .unwrap();
        assert!(!saved.enabled);
        assert!(!svc.get(&created.id).await.unwrap().enabled);
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_missing() {
        let svc = make_service();
        let result = svc
            .update(&AutomationId::new(), AutomationPatch::enabled(false))
            .await;
        assert!(matches!(result, Err(DunningError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_keep_record_when_update_is_invalid() {
        let svc = make_service();
        let created = svc.add(NewAutomation::burst("1", 5, 1)).await.unwrap();
        let patch = AutomationPatch {
            interval_hours: Some(0),
            ..AutomationPatch::default()
        };

        let result = svc.update(&created.id, patch).await;
        assert!(matches!(result, Err(DunningError::Validation(_))));
        assert_eq!(svc.get(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn should_remove_automation_and_tolerate_unknown_id() {
        let svc = make_service();
        let created = svc.add(NewAutomation::recurring("1")).await.unwrap();

        svc.remove(&created.id).await.unwrap();
        svc.remove(&created.id).await.unwrap();

        let result = svc.get(&created.id).await;
        assert!(matches!(result, Err(DunningError::NotFound(_))));
    }
}
