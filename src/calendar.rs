//! Calendar week resolution.
//!
//! Maps a wall-clock instant to a week offset from the household's anchor
//! week, and from there to a position inside a rotation cycle.
//!
//! # Time Model
//! "Now" is a UTC instant. It is shifted by a fixed offset in whole hours
//! to approximate local time; there is no daylight-saving adjustment.
//! Weeks run Monday to Sunday.
//!
//! # Negative offsets
//! Instants before the anchor produce negative week offsets. Division and
//! modulo are floored, so week -1 is the last week of the previous cycle.
//!
//! # Range
//! Week spans saturate at the first and last full weeks `chrono` can
//! represent; offsets beyond them resolve to those weeks.

use chrono::{DateTime, Datelike, Days, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RotaError};

/// Display format for week boundaries.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

const SECONDS_PER_HOUR: i32 = 3600;

/// A Monday-to-Sunday calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSpan {
    /// First day of the week.
    pub monday: NaiveDate,
    /// Last day of the week.
    pub sunday: NaiveDate,
}

impl WeekSpan {
    /// The week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let monday = monday_of(date);
        Self {
            monday,
            sunday: monday.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX),
        }
    }

    /// Whether `date` falls within this week.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.monday && date <= self.sunday
    }
}

impl fmt::Display for WeekSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.monday.format(DATE_FORMAT),
            self.sunday.format(DATE_FORMAT)
        )
    }
}

/// The Monday of the week containing `date`.
///
/// Saturates at [`NaiveDate::MIN`] for the partial week at the start of the
/// calendar.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let back = Days::new(u64::from(date.weekday().num_days_from_monday()));
    date.checked_sub_days(back).unwrap_or(NaiveDate::MIN)
}

/// Reduces a week offset into `[0, cycle_length)` with a floored modulo.
///
/// A zero cycle length is treated as one.
#[inline]
pub fn reduce_week(week_offset: i64, cycle_length: usize) -> usize {
    let len = i64::try_from(cycle_length.max(1)).unwrap_or(i64::MAX);
    // rem_euclid of a positive modulus is in [0, len)
    week_offset.rem_euclid(len) as usize
}

/// Resolves instants to week offsets relative to an anchor week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekResolver {
    start_date: NaiveDate,
    start_monday: NaiveDate,
    offset: FixedOffset,
}

impl WeekResolver {
    /// Creates a resolver anchored at `start_date`.
    ///
    /// The anchor week is the Monday-to-Sunday week containing `start_date`;
    /// Monday anchors are used as given.
    ///
    /// # Errors
    /// Returns [`RotaError::Config`] if the offset is not a valid UTC offset.
    pub fn new(start_date: NaiveDate, utc_offset_hours: i32) -> Result<Self> {
        let offset = utc_offset_hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                RotaError::Config(format!("invalid UTC offset: {utc_offset_hours} hours"))
            })?;

        let start_monday = monday_of(start_date);
        if start_monday != start_date {
            tracing::debug!(
                "anchor {start_date} is a {:?}, using week of {start_monday}",
                start_date.weekday()
            );
        }

        Ok(Self {
            start_date,
            start_monday,
            offset,
        })
    }

    /// Configured anchor date.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Monday of the anchor week.
    pub fn start_monday(&self) -> NaiveDate {
        self.start_monday
    }

    /// Calendar date of `now` after applying the fixed offset.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// Whole weeks between the anchor week and the week containing `now`.
    pub fn week_offset(&self, now: DateTime<Utc>) -> i64 {
        self.week_offset_of_date(self.local_date(now))
    }

    /// Whole weeks between the anchor week and the week containing `date`.
    pub fn week_offset_of_date(&self, date: NaiveDate) -> i64 {
        (monday_of(date) - self.start_monday).num_days().div_euclid(7)
    }

    /// Position of `now` within a cycle of `cycle_length` weeks.
    pub fn week_index(&self, now: DateTime<Utc>, cycle_length: usize) -> usize {
        reduce_week(self.week_offset(now), cycle_length)
    }

    /// Calendar week at a given offset from the anchor week.
    pub fn week_span(&self, week_offset: i64) -> WeekSpan {
        let monday = Duration::try_weeks(week_offset)
            .and_then(|delta| self.start_monday.checked_add_signed(delta))
            .map(|monday| monday.clamp(first_full_monday(), last_full_monday()))
            .unwrap_or_else(|| {
                if week_offset < 0 {
                    first_full_monday()
                } else {
                    last_full_monday()
                }
            });
        WeekSpan::containing(monday)
    }
}

fn first_full_monday() -> NaiveDate {
    let mut date = NaiveDate::MIN;
    while date.weekday().num_days_from_monday() != 0 {
        date = date.succ_opt().unwrap_or(NaiveDate::MAX);
    }
    date
}

fn last_full_monday() -> NaiveDate {
    NaiveDate::MAX
        .checked_sub_days(Days::new(6))
        .map_or(NaiveDate::MAX, monday_of)
}

/// Position of `now` within a rotation cycle.
///
/// One-shot form of [`WeekResolver::week_index`].
///
/// # Errors
/// Returns [`RotaError::Config`] if the offset is not a valid UTC offset.
pub fn current_week_index(
    now: DateTime<Utc>,
    start_date: NaiveDate,
    utc_offset_hours: i32,
    cycle_length: usize,
) -> Result<usize> {
    Ok(WeekResolver::new(start_date, utc_offset_hours)?.week_index(now, cycle_length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn household() -> WeekResolver {
        WeekResolver::new(date(2023, 12, 9), 1).unwrap()
    }

    #[test]
    fn test_monday_of() {
        assert_eq!(monday_of(date(2023, 12, 9)), date(2023, 12, 4)); // Saturday
        assert_eq!(monday_of(date(2023, 12, 11)), date(2023, 12, 11)); // Monday
        assert_eq!(monday_of(date(2023, 12, 17)), date(2023, 12, 11)); // Sunday
    }

    #[test]
    fn test_anchor_week_is_zero() {
        let r = household();
        // 2023-12-09 00:00 local (+1) is 2023-12-08 23:00 UTC
        let now = utc(2023, 12, 8, 23, 0);
        assert_eq!(r.week_offset(now), 0);
        assert_eq!(r.week_index(now, 4), 0);
    }

    #[test]
    fn test_one_and_four_weeks_later() {
        let r = household();
        assert_eq!(r.week_index(utc(2023, 12, 15, 23, 0), 4), 1);
        assert_eq!(r.week_offset(utc(2024, 1, 5, 23, 0)), 4);
        assert_eq!(r.week_index(utc(2024, 1, 5, 23, 0), 4), 0);
    }

    #[test]
    fn test_offset_moves_sunday_night_into_next_week() {
        let r = household();
        // Sunday 23:30 UTC is Monday 00:30 local
        let now = utc(2023, 12, 10, 23, 30);
        assert_eq!(r.local_date(now), date(2023, 12, 11));
        assert_eq!(r.week_offset(now), 1);

        let utc_only = WeekResolver::new(date(2023, 12, 9), 0).unwrap();
        assert_eq!(utc_only.week_offset(now), 0);
    }

    #[test]
    fn test_before_anchor_uses_floor() {
        let r = household();
        // Thursday of the week before the anchor week
        let now = utc(2023, 11, 30, 12, 0);
        assert_eq!(r.week_offset(now), -1);
        assert_eq!(r.week_index(now, 4), 3);

        let now = utc(2023, 11, 1, 12, 0);
        assert_eq!(r.week_offset(now), -5);
        assert_eq!(r.week_index(now, 4), 3);
    }

    #[test]
    fn test_same_week_same_index() {
        let r = household();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let week = rng.random_range(-60i64..60);
            let span = r.week_span(week);
            let day = rng.random_range(0i64..7);
            let d = span.monday + Duration::days(day);
            // Local midnight to 23:59, converted back to UTC (+1 offset)
            let minute = rng.random_range(0i64..24 * 60);
            let now = Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).unwrap())
                + Duration::minutes(minute)
                - Duration::hours(1);
            assert_eq!(r.week_offset(now), week);
            assert_eq!(r.week_index(now, 6), reduce_week(week, 6));
        }
    }

    #[test]
    fn test_week_span_display() {
        let r = household();
        let span = r.week_span(1);
        assert_eq!(span.monday, date(2023, 12, 11));
        assert_eq!(span.sunday, date(2023, 12, 17));
        assert!(span.contains(date(2023, 12, 14)));
        assert!(!span.contains(date(2023, 12, 18)));
        assert_eq!(span.to_string(), "11.12.2023 - 17.12.2023");
    }

    #[test]
    fn test_week_span_saturates_at_calendar_edges() {
        let r = household();
        let last = r.week_span(i64::MAX);
        assert_eq!(last.monday.weekday(), chrono::Weekday::Mon);
        assert!(last.sunday <= NaiveDate::MAX);
        assert_eq!(r.week_span(r.week_offset_of_date(NaiveDate::MAX) + 1), last);

        let first = r.week_span(i64::MIN);
        assert_eq!(first.monday.weekday(), chrono::Weekday::Mon);
        assert_eq!(r.week_span(-20_000_000), first);
        assert!(first.monday - NaiveDate::MIN < Duration::days(7));
    }

    #[test]
    fn test_reduce_week() {
        assert_eq!(reduce_week(0, 4), 0);
        assert_eq!(reduce_week(5, 4), 1);
        assert_eq!(reduce_week(-1, 4), 3);
        assert_eq!(reduce_week(-4, 4), 0);
        assert_eq!(reduce_week(17, 0), 0);
    }

    #[test]
    fn test_invalid_offset() {
        assert!(WeekResolver::new(date(2023, 12, 4), 30).is_err());
        assert!(WeekResolver::new(date(2023, 12, 4), i32::MAX).is_err());
    }

    #[test]
    fn test_current_week_index_function() {
        let idx = current_week_index(utc(2023, 12, 20, 9, 0), date(2023, 12, 4), 1, 4).unwrap();
        assert_eq!(idx, 2);
    }
}
