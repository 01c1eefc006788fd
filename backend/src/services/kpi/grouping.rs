//! Shared iteration helpers for the analyzers.
//!
//! Duration measurement and clamping happen once in [`measure`]; every
//! by-day, by-week and by-user bucketing goes through [`GroupExt::group_reduce`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::models::time_entry::{EntrySpan, TimeEntry};
use crate::types::UserId;

/// An entry with its span and worked minutes resolved against one `now`.
#[derive(Debug, Clone, Copy)]
pub struct Measured<'a> {
    pub entry: &'a TimeEntry,
    pub span: EntrySpan,
    pub minutes: i64,
}

impl Measured<'_> {
    pub fn user_id(&self) -> UserId {
        self.entry.user_id
    }

    pub fn day(&self) -> NaiveDate {
        self.entry.day
    }
}

pub fn measure(entries: &[TimeEntry], now: NaiveDateTime) -> Vec<Measured<'_>> {
    entries
        .iter()
        .map(|entry| {
            let span = entry.span();
            Measured {
                entry,
                span,
                minutes: span.worked_minutes(now),
            }
        })
        .collect()
}

pub trait GroupExt: Iterator + Sized {
    /// Folds items into one accumulator per key. Keys come back in ascending order.
    fn group_reduce<K, A, F, R>(self, mut key: F, mut reduce: R) -> BTreeMap<K, A>
    where
        K: Ord,
        A: Default,
        F: FnMut(&Self::Item) -> K,
        R: FnMut(&mut A, Self::Item),
    {
        let mut groups = BTreeMap::new();
        for item in self {
            let acc = groups.entry(key(&item)).or_insert_with(A::default);
            reduce(acc, item);
        }
        groups
    }
}
impl<T> GroupExt for T where T: Iterator {}

/// Worked minutes per `(user, day)`, only where something was worked.
pub fn user_day_minutes(measured: &[Measured<'_>]) -> BTreeMap<(UserId, NaiveDate), i64> {
    measured
        .iter()
        .filter(|m| m.minutes > 0)
        .group_reduce(|m| (m.user_id(), m.day()), |total: &mut i64, m| *total += m.minutes)
}

/// Minutes above `quota` per `(user, day)`, dropping days without overtime.
pub fn user_day_overtime(
    measured: &[Measured<'_>],
    quota: i64,
) -> BTreeMap<(UserId, NaiveDate), i64> {
    user_day_minutes(measured)
        .into_iter()
        .filter_map(|(key, minutes)| {
            let overtime = minutes - quota;
            (overtime > 0).then_some((key, overtime))
        })
        .collect()
}

pub fn distinct_users(entries: &[TimeEntry]) -> BTreeSet<UserId> {
    entries.iter().map(|e| e.user_id).collect()
}

/// Users with an entry still in progress.
pub fn open_users(entries: &[TimeEntry]) -> BTreeSet<UserId> {
    entries
        .iter()
        .filter(|e| e.span().is_open())
        .map(|e| e.user_id)
        .collect()
}

/// First non-empty display name seen for each user.
pub fn display_names(entries: &[TimeEntry]) -> HashMap<UserId, String> {
    let mut names = HashMap::new();
    for entry in entries {
        if let Some(name) = entry.user_name.as_ref().filter(|n| !n.is_empty()) {
            names.entry(entry.user_id).or_insert_with(|| name.clone());
        }
    }
    names
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// `numerator / denominator`, or `0.0` for an empty denominator.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryId;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn group_reduce_orders_keys_and_folds_values() {
        let items = vec![(3, 1), (1, 5), (3, 6)];
        let grouped = items
            .into_iter()
            .group_reduce(|(k, _)| *k, |sum: &mut i32, (_, v)| *sum += v);
        assert_eq!(grouped.into_iter().collect::<Vec<_>>(), vec![(1, 5), (3, 7)]);
    }

    #[test]
    fn week_start_is_monday() {
        // 2024-01-10 is a Wednesday.
        assert_eq!(week_start(date(10)), date(8));
        assert_eq!(week_start(date(8)), date(8));
        // Sunday belongs to the week that started six days earlier.
        assert_eq!(week_start(date(14)), date(8));
        // A weekend never straddles two buckets.
        assert_eq!(week_start(date(13)), week_start(date(14)));
        assert_eq!(week_start(date(7)), date(1));
    }

    #[test]
    fn ratio_guards_empty_denominator() {
        assert_eq!(ratio(3.0, 0.0), 0.0);
        assert_eq!(ratio(1.0, 4.0), 0.25);
    }

    #[test]
    fn user_day_overtime_sums_same_day_and_drops_short_days() {
        let user = UserId::new();
        let entry = |day: u32, from: u32, to: u32| TimeEntry {
            id: EntryId::new(),
            user_id: user,
            user_name: None,
            day: date(day),
            arrival: date(day).and_hms_opt(from, 0, 0).unwrap(),
            departure: date(day).and_hms_opt(to, 0, 0),
            status: false,
        };
        let entries = vec![entry(1, 8, 12), entry(1, 13, 18), entry(2, 9, 12)];
        let now = date(3).and_hms_opt(0, 0, 0).unwrap();
        let measured = measure(&entries, now);

        let overtime = user_day_overtime(&measured, 420);
        assert_eq!(overtime.len(), 1);
        assert_eq!(overtime.get(&(user, date(1))), Some(&120));
    }

    #[test]
    fn display_names_skip_blank_values() {
        let user = UserId::new();
        let mut entry = TimeEntry {
            id: EntryId::new(),
            user_id: user,
            user_name: Some(String::new()),
            day: date(1),
            arrival: date(1).and_hms_opt(9, 0, 0).unwrap(),
            departure: None,
            status: true,
        };
        let mut named = entry.clone();
        named.user_name = Some("Grace Hopper".into());
        entry.id = EntryId::new();

        let names = display_names(&[entry, named]);
        assert_eq!(names.get(&user).map(String::as_str), Some("Grace Hopper"));
    }
}
