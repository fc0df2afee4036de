// src/slots.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// Per-doctor record of committed slots: date -> times already booked on that date.
///
/// Stored as a plain JSON object (`{"2025-01-10": ["10:00", "11:00"]}`) on the doctor row.
/// Only `reserve` and `release` mutate it; a time appears at most once per date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SlotLedger {
    slots: BTreeMap<String, Vec<String>>,
}

impl SlotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from raw storage data. Empty date lists and repeated
    /// times are collapsed so the one-time-per-date invariant holds on load.
    pub fn from_map(raw: BTreeMap<String, Vec<String>>) -> Self {
        let mut ledger = Self::new();
        for (date, times) in raw {
            for time in times {
                // duplicates in legacy data are dropped, not treated as conflicts
                if !ledger.is_reserved(&date, &time) {
                    ledger.slots.entry(date.clone()).or_default().push(time);
                }
            }
        }
        ledger
    }

    /// Reserve `time` on `date`. Fails with `SlotUnavailable` if already taken.
    pub fn reserve(&mut self, date: &str, time: &str) -> Result<(), ApiError> {
        if self.is_reserved(date, time) {
            return Err(ApiError::SlotUnavailable);
        }
        self.slots
            .entry(date.to_string())
            .or_default()
            .push(time.to_string());
        Ok(())
    }

    /// Free `time` on `date`. Unknown dates and times are a no-op.
    pub fn release(&mut self, date: &str, time: &str) {
        let Some(times) = self.slots.get_mut(date) else {
            return;
        };
        if let Some(pos) = times.iter().position(|t| t == time) {
            times.remove(pos);
        }
        if times.is_empty() {
            self.slots.remove(date);
        }
    }

    pub fn is_reserved(&self, date: &str, time: &str) -> bool {
        self.times_for(date).iter().any(|t| t == time)
    }

    pub fn times_for(&self, date: &str) -> &[String] {
        self.slots.get(date).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl<'de> Deserialize<'de> for SlotLedger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Vec<String>>::deserialize(deserializer)?;
        Ok(SlotLedger::from_map(raw))
    }
}
