//! Shared application state for axum handlers.

use std::sync::Arc;

use dunning_app::ports::{Clock, InvoiceSource, Mailer, StateStore};
use dunning_app::scheduler::Scheduler;
use dunning_app::services::{
    ActivityService, AutomationService, DispatchService, NoteService, SettingsService,
};

/// Scheduler type driven by the HTTP state.
pub type SharedScheduler<S, I, M, C> = Scheduler<Arc<S>, Arc<I>, Arc<M>, Arc<C>>;

/// Application state shared across all axum handlers.
///
/// Generic over the state store, invoice source, mailer and clock to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<S, I, M, C> {
    pub automation_service: Arc<AutomationService<Arc<S>, Arc<C>>>,
    pub activity_service: Arc<ActivityService<Arc<S>>>,
    pub note_service: Arc<NoteService<Arc<S>, Arc<C>>>,
    pub settings_service: Arc<SettingsService<Arc<S>>>,
    pub dispatch_service: Arc<DispatchService<Arc<S>, Arc<I>, Arc<M>, Arc<C>>>,
    /// Used by the "run now" endpoint; shares the store with the services.
    pub scheduler: SharedScheduler<S, I, M, C>,
}

impl<S, I, M, C> Clone for AppState<S, I, M, C> {
    fn clone(&self) -> Self {
        Self {
            automation_service: Arc::clone(&self.automation_service),
            activity_service: Arc::clone(&self.activity_service),
            note_service: Arc::clone(&self.note_service),
            settings_service: Arc::clone(&self.settings_service),
            dispatch_service: Arc::clone(&self.dispatch_service),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S, I, M, C> AppState<S, I, M, C>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    /// Build every service on top of the shared adapters.
    ///
    /// The scheduler is built by the caller so it can be started and
    /// stopped outside the HTTP layer; it must wrap the same adapters.
    pub fn new(
        store: Arc<S>,
        invoices: Arc<I>,
        mailer: Arc<M>,
        clock: Arc<C>,
        scheduler: SharedScheduler<S, I, M, C>,
    ) -> Self {
        Self {
            automation_service: Arc::new(AutomationService::new(
                Arc::clone(&store),
                Arc::clone(&clock),
            )),
            activity_service: Arc::new(ActivityService::new(Arc::clone(&store))),
            note_service: Arc::new(NoteService::new(Arc::clone(&store), Arc::clone(&clock))),
            settings_service: Arc::new(SettingsService::new(Arc::clone(&store))),
            dispatch_service: Arc::new(DispatchService::new(store, invoices, mailer, clock)),
            scheduler,
        }
    }
}
