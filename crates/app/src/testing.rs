//! In-memory fakes for the ports, shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dunning_domain::automation::{Automation, AutomationPatch};
use dunning_domain::email_log::{EmailLogEntry, prepend_capped};
use dunning_domain::error::{DispatchError, DunningError};
use dunning_domain::id::{AutomationId, InvoiceId};
use dunning_domain::invoice::Invoice;
use dunning_domain::note::Note;
use tokio::sync::Semaphore;

use crate::ports::{
    AutomationRepository, DispatchContext, EmailLogRepository, InvoiceSource, Mailer,
    NoteRepository, SecretRepository, SentEmail,
};

#[derive(Default)]
pub struct InMemoryStore {
    automations: Mutex<Vec<Automation>>,
    log: Mutex<Vec<EmailLogEntry>>,
    notes: Mutex<HashMap<InvoiceId, Vec<Note>>>,
    secrets: Mutex<HashMap<String, String>>,
    /// Ids removed the first time an update targets them.
    vanish_on_update: Mutex<Vec<AutomationId>>,
}

impl InMemoryStore {
    pub fn with(automations: Vec<Automation>) -> Self {
        Self {
            automations: Mutex::new(automations),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Vec<Automation> {
        self.automations.lock().unwrap().clone()
    }

    pub fn find(&self, id: &AutomationId) -> Automation {
        self.snapshot().into_iter().find(|a| &a.id == id).unwrap()
    }

    pub fn log(&self) -> Vec<EmailLogEntry> {
        self.log.lock().unwrap().clone()
    }

    fn merge_by_id(
        &self,
        id: &AutomationId,
        merge: impl FnOnce(&Automation) -> Result<Automation, DunningError>,
    ) -> Result<Option<Automation>, DunningError> {
        let mut automations = self.automations.lock().unwrap();
        let mut vanish = self.vanish_on_update.lock().unwrap();
        if let Some(pos) = vanish.iter().position(|v| v == id) {
            vanish.remove(pos);
            automations.retain(|a| &a.id != id);
        }
        match automations.iter_mut().find(|a| &a.id == id) {
            None => Ok(None),
            Some(current) => merge(current).map(|merged| {
                *current = merged.clone();
                Some(merged)
            }),
        }
    }

    /// Simulate a concurrent delete landing between snapshot and write.
    pub fn vanish_on_update(&self, id: &AutomationId) {
        self.vanish_on_update.lock().unwrap().push(id.clone());
    }
}

impl AutomationRepository for InMemoryStore {
    fn create(
        &self,
        automation: Automation,
    ) -> impl Future<Output = Result<Automation, DunningError>> + Send {
        self.automations.lock().unwrap().push(automation.clone());
        async { Ok(automation) }
    }

    fn get_by_id(
        &self,
        id: &AutomationId,
    ) -> impl Future<Output = Result<Option<Automation>, DunningError>> + Send {
        let result = self
            .automations
            .lock()
            .unwrap()
            .iter()
            .find(|a| &a.id == id)
            .cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Automation>, DunningError>> + Send {
        let result = self.snapshot();
        async { Ok(result) }
    }

    fn update(
        &self,
        id: &AutomationId,
        patch: AutomationPatch,
    ) -> impl Future<Output = Result<Option<Automation>, DunningError>> + Send {
        let result = self.merge_by_id(id, |current| current.patched(&patch));
        async { result }
    }

    fn apply_outcome(
        &self,
        id: &AutomationId,
        patch: AutomationPatch,
    ) -> impl Future<Output = Result<Option<Automation>, DunningError>> + Send {
        let result = self.merge_by_id(id, |current| Ok(current.merged(&patch)));
        async { result }
    }

    fn delete(&self, id: &AutomationId) -> impl Future<Output = Result<(), DunningError>> + Send {
        self.automations.lock().unwrap().retain(|a| &a.id != id);
        async { Ok(()) }
    }
}

impl EmailLogRepository for InMemoryStore {
    fn append(
        &self,
        entry: EmailLogEntry,
    ) -> impl Future<Output = Result<EmailLogEntry, DunningError>> + Send {
        prepend_capped(&mut self.log.lock().unwrap(), entry.clone());
        async { Ok(entry) }
    }

    fn recent(
        &self,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<EmailLogEntry>, DunningError>> + Send {
        let log = self.log();
        let result: Vec<EmailLogEntry> = log.into_iter().take(limit.unwrap_or(usize::MAX)).collect();
        async { Ok(result) }
    }
}

impl NoteRepository for InMemoryStore {
    fn add(
        &self,
        invoice_id: &InvoiceId,
        note: Note,
    ) -> impl Future<Output = Result<Note, DunningError>> + Send {
        self.notes
            .lock()
            .unwrap()
            .entry(invoice_id.clone())
            .or_default()
            .insert(0, note.clone());
        async { Ok(note) }
    }

    fn find_by_invoice(
        &self,
        invoice_id: &InvoiceId,
    ) -> impl Future<Output = Result<Vec<Note>, DunningError>> + Send {
        let result = self
            .notes
            .lock()
            .unwrap()
            .get(invoice_id)
            .cloned()
            .unwrap_or_default();
        async { Ok(result) }
    }
}

impl SecretRepository for InMemoryStore {
    fn get_secret(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, DunningError>> + Send {
        let result = self
            .secrets
            .lock()
            .unwrap()
            .get(name)
            .filter(|v| !v.trim().is_empty())
            .cloned();
        async { Ok(result) }
    }

    fn set_secret(
        &self,
        name: &str,
        value: String,
    ) -> impl Future<Output = Result<(), DunningError>> + Send {
        self.secrets.lock().unwrap().insert(name.to_string(), value);
        async { Ok(()) }
    }
}

/// Invoice source that can be told to fail.
#[derive(Default)]
pub struct FakeInvoices {
    invoices: Mutex<Vec<Invoice>>,
    broken: Mutex<bool>,
}

impl FakeInvoices {
    pub fn with(invoices: Vec<Invoice>) -> Self {
        Self {
            invoices: Mutex::new(invoices),
            broken: Mutex::new(false),
        }
    }

    pub fn set(&self, invoices: Vec<Invoice>) {
        *self.invoices.lock().unwrap() = invoices;
    }

    pub fn break_source(&self) {
        *self.broken.lock().unwrap() = true;
    }
}

impl InvoiceSource for FakeInvoices {
    fn snapshot(&self) -> impl Future<Output = Result<Arc<[Invoice]>, DunningError>> + Send {
        let result: Result<Arc<[Invoice]>, DunningError> = if *self.broken.lock().unwrap() {
            Err(DunningError::Storage("invoice source offline".into()))
        } else {
            Ok(Arc::from(self.invoices.lock().unwrap().clone()))
        };
        async { result }
    }
}

/// Mailer that records every send and can be told to fail.
///
/// It can also yield once before sending, or park every send until a
/// permit is added to its gate, to let tests interleave scheduler passes.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(InvoiceId, DispatchContext)>>,
    failing: Mutex<bool>,
    yielding: bool,
    gate: Option<Arc<Semaphore>>,
    parked: AtomicUsize,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            failing: Mutex::new(true),
            ..Self::default()
        }
    }

    pub fn yielding() -> Self {
        Self {
            yielding: true,
            ..Self::default()
        }
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn sent(&self) -> Vec<(InvoiceId, DispatchContext)> {
        self.sent.lock().unwrap().clone()
    }

    /// Sends currently waiting on the gate.
    pub fn parked(&self) -> usize {
        self.parked.load(Ordering::SeqCst)
    }
}

impl Mailer for RecordingMailer {
    fn send(
        &self,
        invoice: &Invoice,
        context: &DispatchContext,
    ) -> impl Future<Output = Result<SentEmail, DispatchError>> + Send {
        let invoice_id = invoice.id.clone();
        let context = context.clone();
        async move {
            if self.yielding {
                tokio::task::yield_now().await;
            }
            if let Some(gate) = &self.gate {
                self.parked.fetch_add(1, Ordering::SeqCst);
                gate.acquire().await.unwrap().forget();
                self.parked.fetch_sub(1, Ordering::SeqCst);
            }
            let failing = *self.failing.lock().unwrap();
            if failing {
                return Err(DispatchError::new("provider rejected the message"));
            }
            let subject = context
                .subject
                .clone()
                .unwrap_or_else(|| format!("Invoice #{invoice_id}"));
            let to = context.to.clone();
            self.sent.lock().unwrap().push((invoice_id, context));
            Ok(SentEmail { to, subject })
        }
    }
}
