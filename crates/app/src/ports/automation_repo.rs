//! Automation repository port: persistence for automations.

use std::future::Future;
use std::sync::Arc;

use dunning_domain::automation::{Automation, AutomationPatch};
use dunning_domain::error::DunningError;
use dunning_domain::id::AutomationId;

/// Repository for persisting and querying [`Automation`]s.
///
/// Every mutation must be durable before the returned future resolves, and
/// mutations must not interleave with one another.
pub trait AutomationRepository {
    /// Create a new automation in storage.
    fn create(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, DunningError>> + Send;

    /// Get an automation by its unique identifier.
    fn get_by_id(
        &self,
        id: &AutomationId,
    ) -> impl Future<Output = Result<Option<Automation>, DunningError>> + Send;

    /// Get an owned copy of all automations, in creation order.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Automation>, DunningError>> + Send;

    /// Merge `patch` onto the stored automation in a single atomic step.
    ///
    /// Resolves to `None` when no automation with `id` exists; nothing is
    /// written in that case.
    fn update(
        &self,
        id: &AutomationId,
        patch: AutomationPatch,
    ) -> impl Future<Output = Result<Option<Automation>, DunningError>> + Send;

    /// Like [`update`](Self::update), but the merged record is not
    /// range-checked. Used for scheduler transitions.
    fn apply_outcome(
        &self,
        id: &AutomationId,
        patch: AutomationPatch,
    ) -> impl Future<Output = Result<Option<Automation>, DunningError>> + Send;

    /// Delete an automation. Deleting an unknown id succeeds.
    fn delete(&self, id: &AutomationId) -> impl Future<Output = Result<(), DunningError>> + Send;
}

impl<T: AutomationRepository + Send + Sync> AutomationRepository for Arc<T> {
    fn create(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, DunningError>> + Send {
        (**self).create(automation)
    }

    fn get_by_id(
        &self,
        id: &AutomationId,
    ) -> impl Future<Output = Result<Option<Automation>, DunningError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Automation>, DunningError>> + Send {
        (**self).get_all()
    }

    fn update(
        &self,
        id: &AutomationId,
        patch: AutomationPatch,
    ) -> impl Future<Output = Result<Option<Automation>, DunningError>> + Send {
        (**self).update(id, patch)
    }

    fn apply_outcome(
        &self,
        id: &AutomationId,
        patch: AutomationPatch,
    ) -> impl Future<Output = Result<Option<Automation>, DunningError>> + Send {
        (**self).apply_outcome(id, patch)
    }

    fn delete(&self, id: &AutomationId) -> impl Future<Output = Result<(), DunningError>> + Send {
        (**self).delete(id)
    }
}
