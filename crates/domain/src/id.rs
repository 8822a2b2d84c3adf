//! Opaque string identifiers.
//!
//! Identifiers are compared by string equality only. Records written by
//! older versions carry short base-36 ids, so no particular format is
//! assumed when reading; freshly generated ids are simple UUIDs.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4().simple().to_string())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(
    /// Unique identifier for an [`Automation`](crate::automation::Automation).
    AutomationId
);

define_id!(
    /// Unique identifier for an [`EmailLogEntry`](crate::email_log::EmailLogEntry).
    EmailLogId
);

define_id!(
    /// Unique identifier for a [`Note`](crate::note::Note).
    NoteId
);

/// Key of an invoice owned by the ingestion side.
///
/// Ingestion sources disagree on whether invoice ids are numbers or
/// strings, so deserialisation accepts both and normalises to the decimal
/// string form. Everything past this boundary compares plain strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct InvoiceId(String);

impl InvoiceId {
    /// Wrap an invoice key.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the key is empty or only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvoiceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for InvoiceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for InvoiceId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for InvoiceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(InvoiceIdVisitor)
    }
}

struct InvoiceIdVisitor;

impl Visitor<'_> for InvoiceIdVisitor {
    type Value = InvoiceId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an invoice id as a string or a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(InvoiceId(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(InvoiceId(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(InvoiceId::default())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(InvoiceId(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(InvoiceId(v.to_string()))
    }

    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 {
            Ok(InvoiceId((v as i64).to_string()))
        } else {
            Ok(InvoiceId(v.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_twice() {
        let a = AutomationId::new();
        let b = AutomationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn should_keep_legacy_ids_verbatim() {
        let id: AutomationId = serde_json::from_str("\"lq2x9k3abc\"").unwrap();
        assert_eq!(id.as_str(), "lq2x9k3abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"lq2x9k3abc\"");
    }

    #[test]
    fn should_parse_any_string_with_from_str() {
        let id: NoteId = "note-1".parse().unwrap();
        assert_eq!(id.to_string(), "note-1");
    }

    #[test]
    fn should_normalise_numeric_invoice_id_to_string() {
        let id: InvoiceId = serde_json::from_str("42").unwrap();
        assert_eq!(id, InvoiceId::from("42"));
    }

    #[test]
    fn should_normalise_integral_float_invoice_id() {
        let id: InvoiceId = serde_json::from_str("42.0").unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn should_match_string_and_numeric_invoice_ids() {
        let from_number: InvoiceId = serde_json::from_str("7").unwrap();
        let from_string: InvoiceId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn should_serialize_invoice_id_as_string() {
        let json = serde_json::to_string(&InvoiceId::from(12u64)).unwrap();
        assert_eq!(json, "\"12\"");
    }

    #[test]
    fn should_read_null_invoice_id_as_blank() {
        let id: InvoiceId = serde_json::from_str("null").unwrap();
        assert!(id.is_blank());
    }

    #[test]
    fn should_report_blank_invoice_id() {
        assert!(InvoiceId::default().is_blank());
        assert!(InvoiceId::from("  ").is_blank());
        assert!(!InvoiceId::from("1").is_blank());
    }
}
