//! Timestamp disambiguation
//!
//! Some partners key their milestone history on event code plus event
//! minute, so two sends of the same code within one minute would collide on
//! their side. When a configuration asks for it, every send on a given local
//! day is shifted by a minute offset that has not been issued for that day
//! yet. The issued offsets are kept in the channel's
//! [`DisambiguationLedger`](crate::delivery::DisambiguationLedger).

use std::collections::HashSet;

use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;

use core_kernel::temporal::shift_within_day;

use crate::delivery::DisambiguationLedger;

/// Distinct minutes available within one calendar day
pub const MINUTES_PER_DAY: i32 = 1440;

/// Allocates unique per-day minute offsets
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampDisambiguator;

impl TimestampDisambiguator {
    pub fn new() -> Self {
        Self
    }

    /// Picks the offset for `base` and appends it to the ledger
    ///
    /// The search starts at the day's most recent offset and alternates
    /// outwards (`anchor`, `anchor+1`, `anchor-1`, ...). Offsets already
    /// issued for the day, offsets that would leave the calendar day and
    /// offsets landing on a wall-clock minute an issued offset already
    /// renders (the repeated hour of a DST fall-back day) are skipped. Once
    /// every minute of the day has been issued the offset wraps to 0.
    pub fn allocate(&self, ledger: &mut DisambiguationLedger, base: &DateTime<Tz>) -> i32 {
        let day = base.date_naive();
        let used: HashSet<i32> = ledger.offsets(day).iter().copied().collect();
        let anchor = ledger.last_offset(day).unwrap_or(0);
        let rendered: HashSet<NaiveTime> = used
            .iter()
            .filter_map(|o| shift_within_day(base, *o))
            .map(|t| t.time())
            .collect();

        let offset = if used.len() >= MINUTES_PER_DAY as usize {
            0
        } else {
            candidates(anchor)
                .find(|c| {
                    !used.contains(c)
                        && shift_within_day(base, *c).is_some_and(|t| !rendered.contains(&t.time()))
                })
                .unwrap_or(0)
        };

        ledger.record(day, offset);
        offset
    }

    /// Applies an issued offset to a base timestamp
    ///
    /// Offsets handed out by [`allocate`](Self::allocate) always stay within
    /// the day; anything else leaves the timestamp unchanged.
    pub fn apply(&self, base: &DateTime<Tz>, offset: i32) -> DateTime<Tz> {
        shift_within_day(base, offset).unwrap_or(*base)
    }
}

/// `anchor, anchor+1, anchor-1, anchor+2, anchor-2, ...`
fn candidates(anchor: i32) -> impl Iterator<Item = i32> {
    std::iter::once(anchor).chain(
        (1..=2 * MINUTES_PER_DAY).flat_map(move |m| [anchor + m, anchor - m]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Timelike};
    use chrono_tz::America::New_York;
    use proptest::prelude::*;

    fn at(h: u32, m: u32) -> DateTime<Tz> {
        New_York.with_ymd_and_hms(2015, 12, 1, h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 12, 1).unwrap()
    }

    #[test]
    fn test_repeated_midnight_sends() {
        let disambiguator = TimestampDisambiguator::new();
        let mut ledger = DisambiguationLedger::new();
        let base = at(0, 0);

        let first = disambiguator.allocate(&mut ledger, &base);
        let second = disambiguator.allocate(&mut ledger, &base);

        assert_eq!(disambiguator.apply(&base, first), at(0, 0));
        assert_eq!(disambiguator.apply(&base, second), at(0, 1));
        assert_eq!(ledger.offsets(day()), &[0, 1]);
    }

    #[test]
    fn test_continues_from_last_offset() {
        let disambiguator = TimestampDisambiguator::new();
        let mut ledger = DisambiguationLedger::new();
        ledger.record(day(), 425);

        assert_eq!(disambiguator.allocate(&mut ledger, &at(0, 0)), 426);
        assert_eq!(ledger.offsets(day()), &[425, 426]);
    }

    #[test]
    fn test_end_of_day_goes_backwards() {
        let disambiguator = TimestampDisambiguator::new();
        let mut ledger = DisambiguationLedger::new();
        ledger.record(day(), 0);

        let offset = disambiguator.allocate(&mut ledger, &at(23, 59));
        assert_eq!(offset, -1);
        assert_eq!(disambiguator.apply(&at(23, 59), offset), at(23, 58));
    }

    #[test]
    fn test_days_are_independent() {
        let disambiguator = TimestampDisambiguator::new();
        let mut ledger = DisambiguationLedger::new();
        ledger.record(day(), 0);

        let next_day = New_York.with_ymd_and_hms(2015, 12, 2, 9, 30, 0).unwrap();
        assert_eq!(disambiguator.allocate(&mut ledger, &next_day), 0);
    }

    #[test]
    fn test_full_day_wraps_to_zero() {
        let disambiguator = TimestampDisambiguator::new();
        let mut ledger = DisambiguationLedger::new();
        let base = at(12, 0);
        for _ in 0..MINUTES_PER_DAY {
            disambiguator.allocate(&mut ledger, &base);
        }

        assert_eq!(disambiguator.allocate(&mut ledger, &base), 0);
        assert_eq!(ledger.offsets(day()).len(), MINUTES_PER_DAY as usize + 1);
    }

    #[test]
    fn test_fall_back_repeated_hour_is_skipped() {
        let disambiguator = TimestampDisambiguator::new();
        let mut ledger = DisambiguationLedger::new();
        let base = New_York.with_ymd_and_hms(2015, 11, 1, 0, 30, 0).unwrap();
        let fall_back = base.date_naive();
        // 01:30 EDT already issued
        ledger.record(fall_back, 60);
        ledger.record(fall_back, 119);

        // 120 would render 01:30 again, this time EST
        let offset = disambiguator.allocate(&mut ledger, &base);
        assert_eq!(offset, 118);
        assert_eq!(disambiguator.apply(&base, offset).format("%H%M").to_string(), "0128");

        let rendered: HashSet<String> = ledger
            .offsets(fall_back)
            .iter()
            .map(|o| disambiguator.apply(&base, *o).format("%H%M").to_string())
            .collect();
        assert_eq!(rendered.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_offsets_unique_and_within_day(
            hour in 0u32..24,
            minute in 0u32..60,
            sends in 1usize..200,
        ) {
            let disambiguator = TimestampDisambiguator::new();
            let mut ledger = DisambiguationLedger::new();
            let base = at(hour, minute);

            let mut seen = HashSet::new();
            for _ in 0..sends {
                let offset = disambiguator.allocate(&mut ledger, &base);
                prop_assert!(seen.insert(offset), "offset {} issued twice", offset);

                let shifted = disambiguator.apply(&base, offset);
                prop_assert_eq!(shifted.date_naive(), base.date_naive());
                prop_assert_eq!(shifted.second(), 0);
            }
        }
    }
}
