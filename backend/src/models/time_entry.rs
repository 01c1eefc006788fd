use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{EntryId, UserId};

/// One clock-in/clock-out record as handed over by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: EntryId,
    pub user_id: UserId,
    /// Denormalised "first last" name of the owner, when the repository joined it.
    pub user_name: Option<String>,
    pub day: NaiveDate,
    pub arrival: NaiveDateTime,
    pub departure: Option<NaiveDateTime>,
    /// `true` while the user is clocked in.
    pub status: bool,
}

/// Lifecycle of an entry, derived from `(status, departure)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySpan {
    Closed {
        arrival: NaiveDateTime,
        departure: NaiveDateTime,
    },
    Open {
        arrival: NaiveDateTime,
    },
    /// No departure and not clocked in: a clock-out went missing.
    Stale {
        arrival: NaiveDateTime,
    },
}

impl TimeEntry {
    pub fn span(&self) -> EntrySpan {
        match (self.departure, self.status) {
            (Some(departure), _) => EntrySpan::Closed {
                arrival: self.arrival,
                departure,
            },
            (None, true) => EntrySpan::Open {
                arrival: self.arrival,
            },
            (None, false) => EntrySpan::Stale {
                arrival: self.arrival,
            },
        }
    }

    pub fn display_name(&self) -> String {
        self.user_name.clone().unwrap_or_default()
    }
}

impl EntrySpan {
    pub fn arrival(&self) -> NaiveDateTime {
        match *self {
            EntrySpan::Closed { arrival, .. }
            | EntrySpan::Open { arrival }
            | EntrySpan::Stale { arrival } => arrival,
        }
    }

    /// End of the interval the entry covers; `None` for stale entries.
    pub fn effective_end(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match *self {
            EntrySpan::Closed { departure, .. } => Some(departure),
            EntrySpan::Open { .. } => Some(now),
            EntrySpan::Stale { .. } => None,
        }
    }

    /// Worked minutes, floored at zero.
    pub fn worked_minutes(&self, now: NaiveDateTime) -> i64 {
        self.effective_end(now)
            .map(|end| (end - self.arrival()).num_minutes().max(0))
            .unwrap_or(0)
    }

    /// Raw stored duration of a closed entry, unclamped.
    pub fn closed_minutes(&self) -> Option<i64> {
        match *self {
            EntrySpan::Closed { arrival, departure } => Some((departure - arrival).num_minutes()),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, EntrySpan::Open { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, EntrySpan::Closed { .. })
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, EntrySpan::Stale { .. })
    }
}
