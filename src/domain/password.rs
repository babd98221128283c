//! Password state machine
//!
//! The state of a service is the triple `(current_index, current_password, history)`.
//! The only legal transitions are `generate`, `undo`, `restore_from_history`,
//! `set_manual_state` and `reset_history`. Each takes the current value and
//! returns a new one; the input is never modified.

use chrono::{DateTime, Utc};

use super::entities::{
    HistoryEntry, Outcome, Recurrence, Refusal, Service, ServiceUpdate, HISTORY_LIMIT,
};
use super::error::DomainError;

/// One step of the recurrence: `(current * multiplier + addend) mod modulus`.
///
/// Uses the mathematical (Euclidean) modulo, so the result is in
/// `[0, modulus)` for negative operands too. Intermediate values are
/// computed in `i128` and cannot overflow.
pub fn next_password(current: i64, recurrence: Recurrence) -> Result<i64, DomainError> {
    let Recurrence {
        multiplier,
        addend,
        modulus,
    } = recurrence;
    if modulus <= 0 {
        return Err(DomainError::InvalidModulus { modulus });
    }
    let raw = i128::from(current) * i128::from(multiplier) + i128::from(addend);
    let next = raw.rem_euclid(i128::from(modulus));
    // 0 <= next < modulus <= i64::MAX
    Ok(next as i64)
}

/// Prepend `entry` and drop the oldest entries beyond [`HISTORY_LIMIT`].
fn push_history(history: &[HistoryEntry], entry: HistoryEntry) -> Vec<HistoryEntry> {
    let mut updated = Vec::with_capacity((history.len() + 1).min(HISTORY_LIMIT));
    updated.push(entry);
    updated.extend(history.iter().take(HISTORY_LIMIT - 1).cloned());
    updated
}

impl Service {
    /// Advance the sequence by one step and record it in history.
    pub fn generate(&self, now: DateTime<Utc>) -> Result<Service, DomainError> {
        let password = next_password(self.current_password, self.recurrence())?;
        let index = self
            .current_index
            .checked_add(1)
            .ok_or(DomainError::IndexOverflow(self.current_index))?;

        Ok(Service {
            current_index: index,
            current_password: password,
            history: push_history(&self.history, HistoryEntry::new(index, password, now)),
            ..self.clone()
        })
    }

    /// Pop the most recent history entry and return to its predecessor.
    ///
    /// This replays history, it does not invert the recurrence.
    pub fn undo(&self) -> Outcome<Service> {
        let Some(previous) = self.history.get(1) else {
            return Outcome::Refused(Refusal::InsufficientHistory);
        };

        Outcome::Applied(Service {
            current_index: previous.index,
            current_password: previous.password,
            history: self.history[1..].to_vec(),
            ..self.clone()
        })
    }

    /// Rewind to the history entry matching both `index` and `password`.
    ///
    /// Entries newer than the match are discarded; the match and everything
    /// older are kept.
    pub fn restore_from_history(&self, index: u64, password: i64) -> Outcome<Service> {
        let Some(position) = self.history.iter().position(|h| h.matches(index, password)) else {
            return Outcome::Refused(Refusal::EntryNotFound { index, password });
        };

        Outcome::Applied(Service {
            current_index: index,
            current_password: password,
            history: self.history[position..].to_vec(),
            ..self.clone()
        })
    }

    /// Force the current state and record it in history.
    ///
    /// No range check against `modulus`: out-of-range values are kept as given.
    pub fn set_manual_state(&self, index: u64, password: i64, now: DateTime<Utc>) -> Service {
        Service {
            current_index: index,
            current_password: password,
            history: push_history(&self.history, HistoryEntry::new(index, password, now)),
            ..self.clone()
        }
    }

    /// Clear history, keeping the current index and password.
    pub fn reset_history(&self) -> Service {
        Service {
            history: Vec::new(),
            ..self.clone()
        }
    }

    /// Merge a partial settings update. No validation: a zero modulus is
    /// accepted here and rejected by the next `generate`.
    pub fn apply_settings(&self, update: &ServiceUpdate) -> Service {
        let mut updated = self.clone();
        if let Some(name) = &update.name {
            updated.name = name.clone();
        }
        if let Some(password) = update.current_password {
            updated.current_password = password;
        }
        if let Some(index) = update.current_index {
            updated.current_index = index;
        }
        if let Some(multiplier) = update.multiplier {
            updated.multiplier = multiplier;
        }
        if let Some(addend) = update.addend {
            updated.addend = addend;
        }
        if let Some(modulus) = update.modulus {
            updated.modulus = modulus;
        }
        updated
    }
}
