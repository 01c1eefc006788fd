use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::kpi::DateRange;
use crate::repositories::EntryFilter;

/// Days covered by a window when no start date is supplied.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Inclusive calendar-day range a report is computed over. `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    /// Resolves optional bounds: a missing end is `today`, a missing start is
    /// `end - 30 days`, and reversed bounds are swapped.
    pub fn normalize(from: Option<NaiveDate>, to: Option<NaiveDate>, today: NaiveDate) -> Self {
        let end = to.unwrap_or(today);
        let start = from.unwrap_or_else(|| {
            end.checked_sub_signed(Duration::days(DEFAULT_WINDOW_DAYS))
                .unwrap_or(NaiveDate::MIN)
        });
        if start > end {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Midnight opening the first day.
    pub fn first_instant(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last second of the final day.
    pub fn last_instant(&self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN) + Duration::seconds(86_399)
    }

    pub fn filter(&self) -> EntryFilter {
        EntryFilter::window(self.start, self.end)
    }

    pub fn as_range(&self) -> DateRange {
        DateRange {
            from: self.start,
            to: self.end,
        }
    }
}
