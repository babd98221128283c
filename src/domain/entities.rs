//! Domain entities: core data structures
//!
//! Field names serialize in camelCase and timestamps as epoch milliseconds,
//! matching the `hirepass-*-v1` storage format.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;

/// Number of history entries a service retains.
pub const HISTORY_LIMIT: usize = 50;

/// Number of submission log entries retained.
pub const SUBMISSION_LOG_LIMIT: usize = 20;

/// Current instant at the precision the storage format keeps (milliseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Opaque, stable service identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Fresh random identifier (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ServiceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One recorded `(index, password)` pair. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub index: u64,
    pub password: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(index: u64, password: i64, timestamp: DateTime<Utc>) -> Self {
        Self {
            index,
            password,
            timestamp,
        }
    }

    /// Same position in the sequence (timestamp ignored).
    pub fn matches(&self, index: u64, password: i64) -> bool {
        self.index == index && self.password == password
    }
}

/// Recurrence parameters: `next = (current * multiplier + addend) mod modulus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub multiplier: i64,
    pub addend: i64,
    pub modulus: i64,
}

/// An independently configured rolling-password sequence.
///
/// `current_index`/`current_password` are tracked separately from
/// `history`: after a restore or manual override they need not equal
/// `history[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub current_index: u64,
    pub current_password: i64,
    pub multiplier: i64,
    pub addend: i64,
    pub modulus: i64,
    /// Newest first, at most [`HISTORY_LIMIT`] entries.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Service {
    /// New service at index 0 with empty history.
    pub fn new(id: ServiceId, name: impl Into<String>, seed: i64, recurrence: Recurrence) -> Self {
        Self {
            id,
            name: name.into(),
            current_index: 0,
            current_password: seed,
            multiplier: recurrence.multiplier,
            addend: recurrence.addend,
            modulus: recurrence.modulus,
            history: Vec::new(),
        }
    }

    pub fn recurrence(&self) -> Recurrence {
        Recurrence {
            multiplier: self.multiplier,
            addend: self.addend,
            modulus: self.modulus,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.len() >= 2
    }
}

/// Partial settings update for a service. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub current_password: Option<i64>,
    pub current_index: Option<u64>,
    pub multiplier: Option<i64>,
    pub addend: Option<i64>,
    pub modulus: Option<i64>,
}

impl ServiceUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Why an operation was refused. Refusals leave state unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    /// Undo needs at least two history entries.
    InsufficientHistory,
    /// Restore target is no longer in history.
    EntryNotFound { index: u64, password: i64 },
    /// The registry must keep at least one service.
    LastService,
    UnknownService(ServiceId),
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::InsufficientHistory => {
                f.write_str("cannot undo: no previous history available to revert to")
            }
            Refusal::EntryNotFound { index, password } => write!(
                f,
                "cannot restore: index {index} / {password} is no longer in history"
            ),
            Refusal::LastService => f.write_str("cannot delete: at least one service is required"),
            Refusal::UnknownService(id) => write!(f, "unknown service: {id}"),
        }
    }
}

/// Result of an operation that may be refused for an expected reason.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Applied(T),
    Refused(Refusal),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Applied(v) => Outcome::Applied(f(v)),
            Outcome::Refused(r) => Outcome::Refused(r),
        }
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(v) => Some(v),
            Outcome::Refused(_) => None,
        }
    }

    pub fn refusal(&self) -> Option<&Refusal> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Refused(r) => Some(r),
        }
    }
}

// ============================================================
// INTEGRATION
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Success,
    Error,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Success => f.write_str("success"),
            SubmissionStatus::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub service_name: String,
}

/// Fields of a hire record, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    HireType,
    Price,
    Description,
    DateOfHire,
    TimeOfHire,
    NumberOfDays,
    Phone,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::HireType,
        FormField::Price,
        FormField::Description,
        FormField::DateOfHire,
        FormField::TimeOfHire,
        FormField::NumberOfDays,
        FormField::Phone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::HireType => "hire-type",
            FormField::Price => "price",
            FormField::Description => "description",
            FormField::DateOfHire => "date-of-hire",
            FormField::TimeOfHire => "time-of-hire",
            FormField::NumberOfDays => "number-of-days",
            FormField::Phone => "phone",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        FormField::ALL
            .into_iter()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownFormField(s.to_string()))
    }
}

/// Form field → `entry.<id>` parameter name. Empty means unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldMappings {
    pub hire_type: String,
    pub price: String,
    pub description: String,
    pub date_of_hire: String,
    pub time_of_hire: String,
    pub number_of_days: String,
    pub phone: String,
}

impl FieldMappings {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::HireType => &self.hire_type,
            FormField::Price => &self.price,
            FormField::Description => &self.description,
            FormField::DateOfHire => &self.date_of_hire,
            FormField::TimeOfHire => &self.time_of_hire,
            FormField::NumberOfDays => &self.number_of_days,
            FormField::Phone => &self.phone,
        }
    }

    pub fn set(&mut self, field: FormField, entry: impl Into<String>) {
        let slot = match field {
            FormField::HireType => &mut self.hire_type,
            FormField::Price => &mut self.price,
            FormField::Description => &mut self.description,
            FormField::DateOfHire => &mut self.date_of_hire,
            FormField::TimeOfHire => &mut self.time_of_hire,
            FormField::NumberOfDays => &mut self.number_of_days,
            FormField::Phone => &mut self.phone,
        };
        *slot = entry.into();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleFormConfig {
    /// `.../formResponse` endpoint
    pub form_url: String,
    #[serde(default)]
    pub field_mappings: FieldMappings,
}

/// A hire record to submit. Only `hire_type` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HireRecord {
    pub hire_type: String,
    pub price: String,
    pub description: String,
    pub date_of_hire: String,
    pub time_of_hire: String,
    pub number_of_days: String,
    pub phone: String,
}

impl HireRecord {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::HireType => &self.hire_type,
            FormField::Price => &self.price,
            FormField::Description => &self.description,
            FormField::DateOfHire => &self.date_of_hire,
            FormField::TimeOfHire => &self.time_of_hire,
            FormField::NumberOfDays => &self.number_of_days,
            FormField::Phone => &self.phone,
        }
    }
}

/// Outbound integration configuration plus the submission log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_form: Option<GoogleFormConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_sheet_url: Option<String>,
    /// Newest first, at most [`SUBMISSION_LOG_LIMIT`] entries.
    #[serde(default)]
    pub submissions: Vec<SubmissionRecord>,
}
