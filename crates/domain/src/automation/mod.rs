//! Automation: a reminder task bound to one invoice.
//!
//! Every automation follows a [`Policy`]: either a recurring reminder every
//! few days until the invoice is settled, or a fixed-size burst of emails
//! spaced a few hours apart. The [`policy`] module holds the pure rules that
//! decide when an automation is due and how it moves after each attempt.

pub mod policy;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DunningError, ValidationError};
use crate::id::{AutomationId, InvoiceId};
use crate::time::Timestamp;

pub const DEFAULT_INTERVAL_DAYS: u32 = 2;
pub const DEFAULT_BURST_TOTAL: u32 = 10;
pub const DEFAULT_INTERVAL_HOURS: u32 = 1;

pub const MAX_INTERVAL_DAYS: u32 = 3_650;
pub const MAX_INTERVAL_HOURS: u32 = 24 * 3_650;
pub const MAX_BURST_TOTAL: u32 = 10_000;

/// Which reminder policy an automation follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationKind {
    Recurring,
    Burst,
}

impl AutomationKind {
    /// Wire spelling of the kind, as stored in the `type` field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recurring => "every_2_days",
            Self::Burst => "burst",
        }
    }
}

impl fmt::Display for AutomationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutomationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "every_2_days" | "recurring" => Ok(Self::Recurring),
            "burst" => Ok(Self::Burst),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// Policy parameters, tagged by the `type` field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Policy {
    /// Remind every `interval_days` until paid or unreachable.
    #[serde(rename = "every_2_days", alias = "recurring")]
    Recurring {
        #[serde(
            default = "default_interval_days",
            deserialize_with = "interval_days_or_default"
        )]
        interval_days: u32,
    },
    /// Send `burst_total` reminders `interval_hours` apart, then stop.
    #[serde(rename = "burst")]
    Burst {
        #[serde(
            default = "default_burst_total",
            deserialize_with = "burst_total_or_default"
        )]
        burst_total: u32,
        #[serde(
            default = "default_interval_hours",
            deserialize_with = "interval_hours_or_default"
        )]
        interval_hours: u32,
    },
}

fn default_interval_days() -> u32 {
    DEFAULT_INTERVAL_DAYS
}

fn default_burst_total() -> u32 {
    DEFAULT_BURST_TOTAL
}

fn default_interval_hours() -> u32 {
    DEFAULT_INTERVAL_HOURS
}

/// Stored records may carry `0` or `null` for a policy parameter; both
/// read as the default.
fn nonzero_or<'de, D>(deserializer: D, default: u32) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<u32>::deserialize(deserializer)?;
    Ok(value.filter(|v| *v > 0).unwrap_or(default))
}

fn interval_days_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    nonzero_or(deserializer, DEFAULT_INTERVAL_DAYS)
}

fn burst_total_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    nonzero_or(deserializer, DEFAULT_BURST_TOTAL)
}

fn interval_hours_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    nonzero_or(deserializer, DEFAULT_INTERVAL_HOURS)
}

impl Policy {
    #[must_use]
    pub fn kind(&self) -> AutomationKind {
        match self {
            Self::Recurring { .. } => AutomationKind::Recurring,
            Self::Burst { .. } => AutomationKind::Burst,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Self::Recurring { interval_days } => {
                check_range("intervalDays", interval_days, MAX_INTERVAL_DAYS)
            }
            Self::Burst {
                burst_total,
                interval_hours,
            } => {
                check_range("burstTotal", burst_total, MAX_BURST_TOTAL)?;
                check_range("intervalHours", interval_hours, MAX_INTERVAL_HOURS)
            }
        }
    }
}

fn check_range(field: &'static str, value: u32, max: u32) -> Result<(), ValidationError> {
    if value == 0 || value > max {
        return Err(ValidationError::OutOfRange { field, max });
    }
    Ok(())
}

/// A reminder task bound to one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Automation {
    pub id: AutomationId,
    pub invoice_id: InvoiceId,
    #[serde(flatten)]
    pub policy: Policy,
    pub enabled: bool,
    #[serde(default)]
    pub last_run: Option<Timestamp>,
    #[serde(default)]
    pub next_run: Option<Timestamp>,
    #[serde(default)]
    pub count: u32,
    #[serde(default = "crate::time::now")]
    pub created_at: Timestamp,
}

/// Body of an "add automation" request, before validation.
///
/// `type` is kept as a string so an unknown value surfaces as a
/// [`ValidationError`] instead of a deserialisation failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAutomation {
    pub invoice_id: InvoiceId,
    #[serde(rename = "type")]
    pub kind: String,
    pub interval_days: Option<u32>,
    pub burst_total: Option<u32>,
    pub interval_hours: Option<u32>,
}

impl NewAutomation {
    /// Shorthand for a recurring request with the default interval.
    #[must_use]
    pub fn recurring(invoice_id: impl Into<InvoiceId>) -> Self {
        Self {
            invoice_id: invoice_id.into(),
            kind: AutomationKind::Recurring.as_str().to_string(),
            ..Self::default()
        }
    }

    /// Shorthand for a burst request.
    #[must_use]
    pub fn burst(invoice_id: impl Into<InvoiceId>, burst_total: u32, interval_hours: u32) -> Self {
        Self {
            invoice_id: invoice_id.into(),
            kind: AutomationKind::Burst.as_str().to_string(),
            burst_total: Some(burst_total),
            interval_hours: Some(interval_hours),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn interval_days(mut self, days: u32) -> Self {
        self.interval_days = Some(days);
        self
    }
}

impl Automation {
    /// Validate a request and build a fresh, armed automation.
    ///
    /// `next_run` is seeded by [`policy::seed_next_run`].
    ///
    /// # Errors
    ///
    /// Returns [`DunningError::Validation`] when:
    /// - `invoice_id` is blank ([`ValidationError::EmptyInvoiceId`])
    /// - `kind` is unknown ([`ValidationError::UnknownKind`])
    /// - an interval or total is out of range ([`ValidationError::OutOfRange`])
    pub fn create(request: NewAutomation, now: Timestamp) -> Result<Self, DunningError> {
        if request.invoice_id.is_blank() {
            return Err(ValidationError::EmptyInvoiceId.into());
        }
        let policy = match request.kind.parse::<AutomationKind>()? {
            AutomationKind::Recurring => Policy::Recurring {
                interval_days: request.interval_days.unwrap_or(DEFAULT_INTERVAL_DAYS),
            },
            AutomationKind::Burst => Policy::Burst {
                burst_total: request.burst_total.unwrap_or(DEFAULT_BURST_TOTAL),
                interval_hours: request.interval_hours.unwrap_or(DEFAULT_INTERVAL_HOURS),
            },
        };
        policy.validate()?;

        Ok(Self {
            id: AutomationId::new(),
            invoice_id: request.invoice_id,
            policy,
            enabled: true,
            last_run: None,
            next_run: Some(policy::seed_next_run(&policy, now)),
            count: 0,
            created_at: now,
        })
    }

    #[must_use]
    pub fn kind(&self) -> AutomationKind {
        self.policy.kind()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DunningError::Validation`] when the invoice id is blank, a
    /// policy parameter is out of range, a burst has sent more than its
    /// total, or an exhausted burst is still armed.
    pub fn validate(&self) -> Result<(), DunningError> {
        if self.invoice_id.is_blank() {
            return Err(ValidationError::EmptyInvoiceId.into());
        }
        self.policy.validate()?;
        if let Policy::Burst { burst_total, .. } = self.policy {
            if self.count > burst_total {
                return Err(ValidationError::CountAboveTotal {
                    count: self.count,
                    burst_total,
                }
                .into());
            }
            if self.enabled && self.next_run.is_some() && self.count >= burst_total {
                return Err(ValidationError::BurstExhausted {
                    count: self.count,
                    burst_total,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Merge `patch` onto a copy of this automation and validate the result.
    ///
    /// Policy fields that do not belong to this automation's kind are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DunningError::Validation`] if the merged record breaks an
    /// invariant (see [`Automation::validate`]); `self` is left untouched.
    pub fn patched(&self, patch: &AutomationPatch) -> Result<Self, DunningError> {
        let merged = self.merged(patch);
        merged.validate()?;
        Ok(merged)
    }

    /// Merge `patch` onto a copy of this automation without validating.
    ///
    /// Meant for scheduler transitions, which must land even on records
    /// written before the current range checks existed.
    #[must_use]
    pub fn merged(&self, patch: &AutomationPatch) -> Self {
        let mut merged = self.clone();
        if let Some(invoice_id) = &patch.invoice_id {
            merged.invoice_id = invoice_id.clone();
        }
        if let Some(enabled) = patch.enabled {
            merged.enabled = enabled;
        }
        if let Some(last_run) = patch.last_run {
            merged.last_run = last_run;
        }
        if let Some(next_run) = patch.next_run {
            merged.next_run = next_run;
        }
        if let Some(count) = patch.count {
            merged.count = count;
        }
        match &mut merged.policy {
            Policy::Recurring { interval_days } => {
                if let Some(days) = patch.interval_days {
                    *interval_days = days;
                }
            }
            Policy::Burst {
                burst_total,
                interval_hours,
            } => {
                if let Some(total) = patch.burst_total {
                    *burst_total = total;
                }
                if let Some(hours) = patch.interval_hours {
                    *interval_hours = hours;
                }
            }
        }
        merged
    }
}

/// Partial update for an [`Automation`].
///
/// `None` leaves a field alone. For the nullable timestamps,
/// `Some(None)` clears the value; on the wire that is an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutomationPatch {
    pub invoice_id: Option<InvoiceId>,
    pub enabled: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub last_run: Option<Option<Timestamp>>,
    #[serde(deserialize_with = "nullable")]
    pub next_run: Option<Option<Timestamp>>,
    pub count: Option<u32>,
    pub interval_days: Option<u32>,
    pub burst_total: Option<u32>,
    pub interval_hours: Option<u32>,
}

impl AutomationPatch {
    /// Patch that only flips `enabled`.
    #[must_use]
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }
}

/// Distinguish an explicit `null` from an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
