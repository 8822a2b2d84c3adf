//! Scheduler: periodic pass over due automations.
//!
//! Each tick takes one snapshot of the automations and one of the invoices,
//! picks the automations whose `next_run` has passed, and for each one
//! either stops it for good or sends a reminder. Every outcome is written
//! back as an [`AutomationPatch`](dunning_domain::automation::AutomationPatch)
//! merged by id inside the store, so a record deleted or disabled while the
//! tick runs is never clobbered.
//!
//! Passes never overlap: a manual run and a timed tick take turns on the
//! same lock. Stopping lets the pass in progress finish the automation it
//! is on and leaves the rest for a later pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dunning_domain::automation::{Automation, AutomationPatch};
use dunning_domain::automation::policy::{self, StopReason, Verdict};
use dunning_domain::email_log::EmailLogEntry;
use dunning_domain::error::DunningError;
use dunning_domain::invoice::Invoice;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ports::{Clock, DispatchContext, InvoiceSource, Mailer, StateStore};

/// Default period between two ticks.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(60);

/// What a single tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Automations whose `next_run` had passed.
    pub due: usize,
    /// Reminders that went out.
    pub dispatched: usize,
    /// Dispatch attempts that failed and were pushed back.
    pub failed: usize,
    /// Automations stopped without sending.
    pub stopped: usize,
}

struct Inner<S, I, M, C> {
    store: S,
    invoices: I,
    mailer: M,
    clock: C,
    pass: tokio::sync::Mutex<()>,
    stopping: AtomicBool,
}

/// Drives reminder automations on a fixed period.
///
/// Cloning is cheap and every clone controls the same background task.
pub struct Scheduler<S, I, M, C> {
    inner: Arc<Inner<S, I, M, C>>,
    period: Duration,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<S, I, M, C> Clone for Scheduler<S, I, M, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            period: self.period,
            task: Arc::clone(&self.task),
        }
    }
}

impl<S, I, M, C> Scheduler<S, I, M, C>
where
    S: StateStore + Send + Sync + 'static,
    I: InvoiceSource + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub fn new(store: S, invoices: I, mailer: M, clock: C, period: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                invoices,
                mailer,
                clock,
                pass: tokio::sync::Mutex::new(()),
                stopping: AtomicBool::new(false),
            }),
            period,
            task: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Spawn the background loop. The first tick runs immediately.
    ///
    /// Returns `false` without doing anything when the loop is already
    /// running. Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        let inner = Arc::clone(&self.inner);
        let period = self.period;
        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match inner.tick().await {
                    Ok(report) if report.due > 0 => {
                        tracing::info!(
                            due = report.due,
                            dispatched = report.dispatched,
                            failed = report.failed,
                            stopped = report.stopped,
                            "scheduler tick finished"
                        );
                    }
                    Ok(_) => tracing::trace!("scheduler tick found nothing due"),
                    Err(err) => tracing::warn!(error = %err, "scheduler tick abandoned"),
                }
            }
        }));
        tracing::info!(period_secs = period.as_secs(), "scheduler started");
        true
    }

    /// Stop the background loop.
    ///
    /// Waits for the pass in progress to record the automation it is on,
    /// so a reminder is never sent without its outcome being written.
    pub async fn stop(&self) {
        self.inner.stopping.store(true, Ordering::Release);
        let pass = self.inner.pass.lock().await;
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::info!("scheduler stopped");
        }
        self.inner.stopping.store(false, Ordering::Release);
        drop(pass);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Run a single pass over the due automations right now.
    ///
    /// # Errors
    ///
    /// Returns an error only when the automation or invoice snapshot could
    /// not be taken; nothing is evaluated in that case. Failures while
    /// handling one automation are logged and do not surface here.
    #[tracing::instrument(skip(self))]
    pub async fn run_due_automations(&self) -> Result<TickReport, DunningError> {
        self.inner.tick().await
    }
}

impl<S, I, M, C> Inner<S, I, M, C>
where
    S: StateStore + Send + Sync,
    I: InvoiceSource + Send + Sync,
    M: Mailer + Send + Sync,
    C: Clock,
{
    async fn tick(&self) -> Result<TickReport, DunningError> {
        let _pass = self.pass.lock().await;
        let automations = self.store.get_all().await?;
        let invoices = self.invoices.snapshot().await?;
        let now = self.clock.now();

        let mut report = TickReport::default();
        for automation in automations.iter().filter(|a| policy::is_due(a, now)) {
            if self.stopping.load(Ordering::Acquire) {
                tracing::debug!("scheduler stopping, leaving remaining automations");
                break;
            }
            report.due += 1;
            let invoice = invoices.iter().find(|inv| inv.id == automation.invoice_id);
            match policy::assess(invoice) {
                Verdict::Stop(reason) => {
                    report.stopped += 1;
                    self.stop_automation(automation, reason).await;
                }
                Verdict::Send { invoice, to } => {
                    if self.dispatch(automation, invoice, to).await {
                        report.dispatched += 1;
                    } else {
                        report.failed += 1;
                    }
                }
            }
        }
        Ok(report)
    }

    async fn stop_automation(&self, automation: &Automation, reason: StopReason) {
        tracing::info!(
            automation_id = %automation.id,
            invoice_id = %automation.invoice_id,
            reason = reason.as_str(),
            "automation stopped"
        );
        self.record(automation, reason.patch()).await;
    }

    /// Send one reminder and record the outcome. Returns whether it went out.
    async fn dispatch(&self, automation: &Automation, invoice: &Invoice, to: &str) -> bool {
        let context = DispatchContext::reminder(automation, to);
        match self.mailer.send(invoice, &context).await {
            Ok(sent) => {
                let now = self.clock.now();
                tracing::info!(
                    automation_id = %automation.id,
                    invoice_id = %automation.invoice_id,
                    to = %sent.to,
                    "reminder sent"
                );
                let entry = EmailLogEntry::new(
                    automation.invoice_id.clone(),
                    sent.to,
                    sent.subject,
                    Some(automation.id.clone()),
                    now,
                );
                if let Err(err) = self.store.append(entry).await {
                    tracing::error!(automation_id = %automation.id, error = %err, "failed to log sent email");
                }
                self.record(automation, policy::after_success(automation, now))
                    .await;
                true
            }
            Err(err) => {
                tracing::warn!(
                    automation_id = %automation.id,
                    invoice_id = %automation.invoice_id,
                    error = %err,
                    "reminder dispatch failed, retrying later"
                );
                self.record(automation, policy::after_failure(self.clock.now()))
                    .await;
                false
            }
        }
    }

    async fn record(&self, automation: &Automation, patch: AutomationPatch) {
        match self.store.apply_outcome(&automation.id, patch).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::debug!(automation_id = %automation.id, "automation removed mid-tick");
            }
            Err(err) => {
                tracing::error!(automation_id = %automation.id, error = %err, "failed to record automation outcome");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ManualClock;
    use crate::testing::{FakeInvoices, InMemoryStore, RecordingMailer};
    use chrono::{TimeZone, Utc};
    use dunning_domain::automation::NewAutomation;
    use dunning_domain::time::Timestamp;

    type TestScheduler = Scheduler<
        Arc<InMemoryStore>,
        Arc<FakeInvoices>,
        Arc<RecordingMailer>,
        Arc<ManualClock>,
    >;

    struct Harness {
        store: Arc<InMemoryStore>,
        invoices: Arc<FakeInvoices>,
        mailer: Arc<RecordingMailer>,
        clock: Arc<ManualClock>,
        scheduler: TestScheduler,
    }

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn harness(automations: Vec<Automation>, invoices: Vec<Invoice>) -> Harness {
        harness_with_mailer(automations, invoices, RecordingMailer::default())
    }

    fn harness_with_mailer(
        automations: Vec<Automation>,
        invoices: Vec<Invoice>,
        mailer: RecordingMailer,
    ) -> Harness {
        let store = Arc::new(InMemoryStore::with(automations));
        let invoices = Arc::new(FakeInvoices::with(invoices));
        let mailer = Arc::new(mailer);
        let clock = Arc::new(ManualClock::new(t0()));
        let scheduler = Scheduler::new(
            Arc::clone(&store),
            Arc::clone(&invoices),
            Arc::clone(&mailer),
            Arc::clone(&clock),
            Duration::from_secs(3_600),
        );
        Harness {
            store,
            invoices,
            mailer,
            clock,
            scheduler,
        }
    }

    fn unpaid(id: &str) -> Invoice {
        Invoice::new(id)
            .with_payment_status("Open")
            .with_recipient("ap@acme.test")
    }

    fn recurring(invoice_id: &str) -> Automation {
        Automation::create(NewAutomation::recurring(invoice_id), t0()).unwrap()
    }

    #[tokio::test]
    async fn should_send_recurring_reminder_and_reschedule() {
        // Scenario A
        let auto = recurring("1");
        let id = auto.id.clone();
        let h = harness(vec![auto], vec![unpaid("1")]);
        h.clock.advance(chrono::Duration::days(2));
        let fired_at = h.clock.now();

        let report = h.scheduler.run_due_automations().await.unwrap();

        assert_eq!(
            report,
            TickReport {
                due: 1,
                dispatched: 1,
                failed: 0,
                stopped: 0
            }
        );
        let after = h.store.find(&id);
        assert_eq!(after.count, 1);
        assert_eq!(after.last_run, Some(fired_at));
        assert_eq!(
            after.next_run,
            Some(fired_at + chrono::Duration::seconds(2 * 86_400))
        );
        assert!(after.enabled);

        let sent = h.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.subject.as_deref(), Some("Invoice #1 (reminder)"));

        let log = h.store.log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].automation_id, Some(id));
        assert_eq!(log[0].to, "ap@acme.test");
    }

    #[tokio::test]
    async fn should_stop_burst_after_exactly_total_sends() {
        // Scenario B
        let auto = Automation::create(NewAutomation::burst("2", 3, 1), t0()).unwrap();
        let id = auto.id.clone();
        let h = harness(vec![auto], vec![unpaid("2")]);

        for _ in 0..5 {
            h.clock.advance(chrono::Duration::hours(1));
            h.scheduler.run_due_automations().await.unwrap();
        }

        let after = h.store.find(&id);
        assert_eq!(after.count, 3);
        assert!(!after.enabled);
        assert!(after.next_run.is_none());
        assert_eq!(h.mailer.sent().len(), 3);
        assert_eq!(h.store.log().len(), 3);
    }

    #[tokio::test]
    async fn should_stop_without_sending_when_invoice_paid() {
        let auto = recurring("3");
        let id = auto.id.clone();
        let next_run = auto.next_run;
        let h = harness(
            vec![auto],
            vec![unpaid("3").with_payment_status("PAID in full")],
        );
        h.clock.advance(chrono::Duration::days(3));

        let report = h.scheduler.run_due_automations().await.unwrap();

        assert_eq!(report.stopped, 1);
        assert!(h.mailer.sent().is_empty());
        let after = h.store.find(&id);
        assert!(!after.enabled);
        assert_eq!(after.next_run, next_run);
        assert_eq!(after.count, 0);
    }

    #[tokio::test]
    async fn should_disable_when_invoice_missing() {
        let auto = recurring("404");
        let id = auto.id.clone();
        let h = harness(vec![auto], vec![unpaid("1")]);
        h.clock.advance(chrono::Duration::days(2));

        h.scheduler.run_due_automations().await.unwrap();

        assert!(!h.store.find(&id).enabled);
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn should_disarm_when_invoice_has_no_recipient() {
        let auto = recurring("5");
        let id = auto.id.clone();
        // Scenario C
        let h = harness(vec![auto], vec![Invoice::new("5").with_recipient("n/a")]);
        h.clock.advance(chrono::Duration::days(2));

        let report = h.scheduler.run_due_automations().await.unwrap();

        assert_eq!(report.stopped, 1);
        let after = h.store.find(&id);
        assert!(!after.enabled);
        assert!(after.next_run.is_none());
        assert_eq!(after.count, 0);
        assert!(h.mailer.sent().is_empty());
        assert!(h.store.log().is_empty());
    }

    #[tokio::test]
    async fn should_leave_disabled_automations_untouched() {
        let mut auto = recurring("1");
        auto.enabled = false;
        let before = auto.clone();
        let h = harness(vec![auto], vec![unpaid("1")]);
        h.clock.advance(chrono::Duration::days(10));

        let report = h.scheduler.run_due_automations().await.unwrap();

        assert_eq!(report, TickReport::default());
        assert_eq!(h.store.find(&before.id), before);
    }

    #[tokio::test]
    async fn should_back_off_one_hour_after_dispatch_failure() {
        let auto = recurring("1");
        let id = auto.id.clone();
        let h = harness_with_mailer(vec![auto], vec![unpaid("1")], RecordingMailer::failing());
        h.clock.advance(chrono::Duration::days(2));
        let failed_at = h.clock.now();

        let report = h.scheduler.run_due_automations().await.unwrap();

        assert_eq!(report.failed, 1);
        let after = h.store.find(&id);
        assert_eq!(after.count, 0);
        assert!(after.last_run.is_none());
        assert!(after.enabled);
        assert_eq!(
            after.next_run,
            Some(failed_at + chrono::Duration::seconds(3_600))
        );
        assert!(h.store.log().is_empty());

        h.mailer.set_failing(false);
        h.clock.advance(chrono::Duration::hours(1));
        let report = h.scheduler.run_due_automations().await.unwrap();
        assert_eq!(report.dispatched, 1);
        assert_eq!(h.store.find(&id).count, 1);
    }

    #[tokio::test]
    async fn should_not_resurrect_automation_deleted_mid_tick() {
        let auto = recurring("1");
        let id = auto.id.clone();
        let h = harness(vec![auto], vec![unpaid("1")]);
        h.store.vanish_on_update(&id);
        h.clock.advance(chrono::Duration::days(2));

        let report = h.scheduler.run_due_automations().await.unwrap();

        assert_eq!(report.dispatched, 1);
        assert!(h.store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn should_abandon_tick_when_invoice_source_fails() {
        let auto = recurring("1");
        let before = auto.clone();
        let h = harness(vec![auto], vec![unpaid("1")]);
        h.invoices.break_source();
        h.clock.advance(chrono::Duration::days(2));

        let result = h.scheduler.run_due_automations().await;

        assert!(matches!(result, Err(DunningError::Storage(_))));
        assert_eq!(h.store.find(&before.id), before);
    }

    #[tokio::test]
    async fn should_isolate_failures_between_automations() {
        let paid = recurring("1");
        let live = recurring("2");
        let live_id = live.id.clone();
        let h = harness(
            vec![paid, live],
            vec![unpaid("1").with_payment_status("paid"), unpaid("2")],
        );
        h.clock.advance(chrono::Duration::days(2));

        let report = h.scheduler.run_due_automations().await.unwrap();

        assert_eq!(report.due, 2);
        assert_eq!(report.stopped, 1);
        assert_eq!(report.dispatched, 1);
        assert_eq!(h.store.find(&live_id).count, 1);
    }

    #[tokio::test]
    async fn should_pick_up_refreshed_invoices_on_next_tick() {
        let auto = recurring("9");
        let id = auto.id.clone();
        let h = harness(vec![auto], vec![unpaid("9")]);
        h.clock.advance(chrono::Duration::days(2));
        h.scheduler.run_due_automations().await.unwrap();

        h.invoices.set(vec![unpaid("9").with_payment_status("Paid")]);
        h.clock.advance(chrono::Duration::days(2));
        h.scheduler.run_due_automations().await.unwrap();

        let after = h.store.find(&id);
        assert_eq!(after.count, 1);
        assert!(!after.enabled);
    }

    #[tokio::test]
    async fn should_start_once_and_stop() {
        let h = harness(Vec::new(), Vec::new());
        assert!(!h.scheduler.is_running());

        assert!(h.scheduler.start());
        assert!(!h.scheduler.start());
        assert!(h.scheduler.is_running());

        h.scheduler.stop().await;
        assert!(!h.scheduler.is_running());
        h.scheduler.stop().await;

        assert!(h.scheduler.start());
        h.scheduler.stop().await;
    }

    #[tokio::test]
    async fn should_not_double_send_when_passes_overlap() {
        let auto = Automation::create(NewAutomation::burst("1", 1, 1), t0()).unwrap();
        let id = auto.id.clone();
        let h = harness_with_mailer(vec![auto], vec![unpaid("1")], RecordingMailer::yielding());
        h.clock.advance(chrono::Duration::hours(1));

        let (first, second) = tokio::join!(
            h.scheduler.run_due_automations(),
            h.scheduler.run_due_automations()
        );

        assert_eq!(first.unwrap().dispatched + second.unwrap().dispatched, 1);
        assert_eq!(h.mailer.sent().len(), 1);
        assert_eq!(h.store.log().len(), 1);
        let after = h.store.find(&id);
        assert_eq!(after.count, 1);
        assert!(!after.enabled);
    }

    #[tokio::test]
    async fn should_send_once_per_interval_for_zero_interval_record() {
        let auto: Automation = serde_json::from_value(serde_json::json!({
            "id": "legacy",
            "invoiceId": "1",
            "type": "recurring",
            "intervalDays": 0,
            "enabled": true,
            "nextRun": t0(),
            "count": 0
        }))
        .unwrap();
        let id = auto.id.clone();
        let h = harness(vec![auto], vec![unpaid("1")]);

        let fired_at = h.clock.now();
        for _ in 0..3 {
            h.scheduler.run_due_automations().await.unwrap();
            h.clock.advance(chrono::Duration::minutes(1));
        }

        assert_eq!(h.mailer.sent().len(), 1);
        let after = h.store.find(&id);
        assert_eq!(after.count, 1);
        assert_eq!(after.next_run, Some(fired_at + chrono::Duration::days(2)));
    }

    #[tokio::test]
    async fn should_record_outcomes_for_burst_counted_past_total() {
        let mut over = Automation::create(NewAutomation::burst("1", 2, 1), t0()).unwrap();
        over.count = 5;
        let mut failing = Automation::create(NewAutomation::burst("2", 2, 1), t0()).unwrap();
        failing.count = 4;
        let (over_id, failing_id) = (over.id.clone(), failing.id.clone());
        let h = harness_with_mailer(
            vec![over, failing],
            vec![unpaid("1").with_payment_status("Paid"), unpaid("2")],
            RecordingMailer::failing(),
        );
        h.clock.advance(chrono::Duration::hours(1));
        let failed_at = h.clock.now();

        let report = h.scheduler.run_due_automations().await.unwrap();
        assert_eq!(report.stopped, 1);
        assert_eq!(report.failed, 1);
        assert!(!h.store.find(&over_id).enabled);
        assert_eq!(
            h.store.find(&failing_id).next_run,
            Some(failed_at + chrono::Duration::hours(1))
        );

        // Still due one hour later only, not on every tick.
        h.clock.advance(chrono::Duration::minutes(1));
        let report = h.scheduler.run_due_automations().await.unwrap();
        assert_eq!(report.due, 0);
    }

    #[tokio::test]
    async fn should_let_pass_in_progress_finish_on_stop() {
        let first = recurring("1");
        let second = recurring("2");
        let (first_id, second_id) = (first.id.clone(), second.id.clone());
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let h = harness_with_mailer(
            vec![first, second],
            vec![unpaid("1"), unpaid("2")],
            RecordingMailer::gated(Arc::clone(&gate)),
        );
        h.clock.advance(chrono::Duration::days(2));

        let pass = tokio::spawn({
            let scheduler = h.scheduler.clone();
            async move { scheduler.run_due_automations().await }
        });
        while h.mailer.parked() == 0 {
            tokio::task::yield_now().await;
        }
        let stop = tokio::spawn({
            let scheduler = h.scheduler.clone();
            async move { scheduler.stop().await }
        });
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert!(!stop.is_finished());

        gate.add_permits(1);
        stop.await.unwrap();
        let report = pass.await.unwrap().unwrap();

        assert_eq!(report.dispatched, 1);
        assert_eq!(h.mailer.sent().len(), 1);
        assert_eq!(h.store.log().len(), 1);
        assert_eq!(h.store.find(&first_id).count, 1);
        assert_eq!(h.store.find(&second_id).count, 0);

        // The next pass picks up what the stopped one left.
        gate.add_permits(1);
        let report = h.scheduler.run_due_automations().await.unwrap();
        assert_eq!(report.dispatched, 1);
        assert_eq!(h.store.find(&second_id).count, 1);
    }
}
