//! Policy engine: pure rules for when an automation fires and how it moves.
//!
//! Nothing here performs IO. Each rule returns an [`AutomationPatch`] so the
//! caller can hand it to storage, where it is merged atomically onto
//! whatever the record looks like at that moment.

use chrono::Duration;

use crate::automation::{Automation, AutomationPatch, Policy};
use crate::invoice::Invoice;
use crate::time::Timestamp;

/// First run of a recurring automation, whatever its configured interval.
pub const RECURRING_SEED_DAYS: i64 = 2;

/// Delay before retrying after a failed dispatch.
pub const FAILURE_BACKOFF_HOURS: i64 = 1;

/// Initial `next_run` for a freshly created automation.
#[must_use]
pub fn seed_next_run(policy: &Policy, now: Timestamp) -> Timestamp {
    match *policy {
        Policy::Recurring { .. } => now + Duration::days(RECURRING_SEED_DAYS),
        Policy::Burst { interval_hours, .. } => now + Duration::hours(i64::from(interval_hours)),
    }
}

/// An automation is due when it is enabled, armed, and its time has come.
#[must_use]
pub fn is_due(automation: &Automation, now: Timestamp) -> bool {
    automation.enabled && automation.next_run.is_some_and(|next_run| next_run <= now)
}

/// Why a due automation stops for good instead of sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The linked invoice is not in the current snapshot.
    InvoiceMissing,
    /// The invoice's payment status says it has been paid.
    InvoicePaid,
    /// None of the invoice's addresses can receive email.
    NoRecipient,
}

impl StopReason {
    /// Terminal transition for this reason.
    #[must_use]
    pub fn patch(self) -> AutomationPatch {
        match self {
            Self::InvoiceMissing | Self::InvoicePaid => AutomationPatch::enabled(false),
            Self::NoRecipient => AutomationPatch {
                enabled: Some(false),
                next_run: Some(None),
                ..AutomationPatch::default()
            },
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvoiceMissing => "invoice_missing",
            Self::InvoicePaid => "invoice_paid",
            Self::NoRecipient => "no_recipient",
        }
    }
}

/// Outcome of checking a due automation against its invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'a> {
    /// Stop permanently; nothing is sent.
    Stop(StopReason),
    /// Send a reminder about `invoice` to `to`.
    Send { invoice: &'a Invoice, to: &'a str },
}

/// Decide what to do with a due automation given its invoice (if any).
#[must_use]
pub fn assess(invoice: Option<&Invoice>) -> Verdict<'_> {
    let Some(invoice) = invoice else {
        return Verdict::Stop(StopReason::InvoiceMissing);
    };
    if invoice.is_paid() {
        return Verdict::Stop(StopReason::InvoicePaid);
    }
    match invoice.recipient() {
        Some(to) => Verdict::Send { invoice, to },
        None => Verdict::Stop(StopReason::NoRecipient),
    }
}

/// Transition after a reminder went out at `now`.
///
/// Recurring automations move `interval_days` ahead. Bursts move
/// `interval_hours` ahead until `count` reaches the total, then disarm.
#[must_use]
pub fn after_success(automation: &Automation, now: Timestamp) -> AutomationPatch {
    let count = automation.count.saturating_add(1);
    let mut patch = AutomationPatch {
        last_run: Some(Some(now)),
        count: Some(count),
        ..AutomationPatch::default()
    };
    match automation.policy {
        Policy::Recurring { interval_days } => {
            patch.next_run = Some(Some(now + Duration::days(i64::from(interval_days))));
        }
        Policy::Burst {
            burst_total,
            interval_hours,
        } => {
            if count >= burst_total {
                // count never exceeds the total, even for hand-edited records
                patch.count = Some(count.min(burst_total));
                patch.enabled = Some(false);
                patch.next_run = Some(None);
            } else {
                patch.next_run = Some(Some(now + Duration::hours(i64::from(interval_hours))));
            }
        }
    }
    patch
}

/// Transition after a dispatch attempt failed at `now`.
#[must_use]
pub fn after_failure(now: Timestamp) -> AutomationPatch {
    AutomationPatch {
        next_run: Some(Some(now + Duration::hours(FAILURE_BACKOFF_HOURS))),
        ..AutomationPatch::default()
    }
}
