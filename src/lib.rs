//! # nextrun
//!
//! nextrun finds the next time a cron schedule fires. It is meant for places that show
//! "next run: ..." previews or poll a schedule, and so it never fails loudly: a pattern
//! that is malformed or can not be satisfied simply has no next run.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//!
//! let from = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
//!
//! // Every day at 09:00. Today's run has passed, so the next one is tomorrow.
//! let next = nextrun::next_occurrence("0 9 * * *", &from);
//! assert_eq!(next, Some(Utc.with_ymd_and_hms(2024, 1, 16, 9, 0, 0).unwrap()));
//!
//! // Patterns that can not be parsed have no next run.
//! assert_eq!(nextrun::next_occurrence("invalid", &from), None);
//! ```
//!
//! When the same pattern is evaluated repeatedly, parse it once into a [`Cron`] and use
//! [`Cron::find_next_occurrence`], which also reports why a search failed:
//!
//! ```rust
//! use std::str::FromStr;
//!
//! use chrono::{TimeZone, Utc};
//! use nextrun::{errors::CronError, Cron};
//!
//! let cron = Cron::from_str("0 0 31 2 *").expect("Successful parsing");
//! let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//!
//! // February never has 31 days.
//! assert!(matches!(
//!     cron.find_next_occurrence(&from),
//!     Err(CronError::TimeSearchLimitExceeded(_))
//! ));
//! ```
//!
//! ## Pattern
//!
//! ```javascript
//! // ┌──────────────── (optional) second, accepted and ignored
//! // │ ┌────────────── minute (0 - 59)
//! // │ │ ┌──────────── hour (0 - 23)
//! // │ │ │ ┌────────── day of month (1 - 31)
//! // │ │ │ │ ┌──────── month (1 - 12, JAN-DEC)
//! // │ │ │ │ │ ┌────── day of week (0 - 6, SUN-SAT)
//! // │ │ │ │ │ │
//! // * * * * * *
//! ```
//!
//! | Field        | Allowed values  | Allowed special characters |
//! | ------------ | --------------- | -------------------------- |
//! | Minutes      | 0-59            | * , - /                    |
//! | Hours        | 0-23            | * , - /                    |
//! | Day of Month | 1-31            | * , - /                    |
//! | Month        | 1-12 or JAN-DEC | * , - /                    |
//! | Day of Week  | 0-6 or SUN-SAT  | * , - /                    |
//!
//! Month and weekday names are case-insensitive and may be abbreviated or written out
//! (`MON`, `monday`). When both day of month and day of week are restricted, a day that
//! matches either of them qualifies: `0 0 1 * MON` runs on the 1st and on every Monday.
//!
//! Matching uses the wall-clock time of the time zone of the reference time. Minutes that
//! do not exist in that zone, because of a daylight saving transition, are skipped.

pub mod component;
pub mod errors;
mod iterator;
pub mod parser;
pub mod pattern;

use std::str::FromStr;

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Timelike};
use errors::CronError;
use parser::CronParser;
use pattern::CronPattern;
use tracing::debug;

pub use iterator::CronIterator;

/// Number of candidate minutes searched by default, one leap year's worth.
pub const DEFAULT_SEARCH_LIMIT: u32 = 366 * 24 * 60;

/// Finds the first minute strictly after `from` at which `expression` fires.
///
/// Returns `None` when the expression is malformed or has no matching minute within the
/// default search limit. Use [`Cron::find_next_occurrence`] to learn which of the two it was.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
///
/// let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap();
/// let next = nextrun::next_occurrence("*/15 * * * *", &from);
/// assert_eq!(next, Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 15, 0).unwrap()));
/// ```
pub fn next_occurrence<Tz: TimeZone>(expression: &str, from: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    match Cron::from_str(expression).and_then(|cron| cron.find_next_occurrence(from)) {
        Ok(next) => Some(next),
        Err(error) => {
            debug!(expression, %error, "no next occurrence");
            None
        }
    }
}

// The Cron struct represents a parsed cron schedule, and searches for the times it fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cron {
    pub pattern: CronPattern, // Parsed cron pattern
    search_limit: u32,
}

impl Cron {
    /// Number of candidate minutes [`Cron::find_next_occurrence`] examines before giving up.
    pub fn search_limit(&self) -> u32 {
        self.search_limit
    }

    /// Evaluates if the wall-clock time of `time` matches the pattern.
    ///
    /// Seconds and smaller units are ignored, so any instant within a matching minute matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    ///
    /// use chrono::{TimeZone, Utc};
    /// use nextrun::Cron;
    ///
    /// let cron = Cron::from_str("0 12 1 * MON").expect("Successful parsing");
    ///
    /// // The 1st of July 2025 is a Tuesday, the 14th a Monday.
    /// assert!(cron.is_time_matching(&Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()));
    /// assert!(cron.is_time_matching(&Utc.with_ymd_and_hms(2025, 7, 14, 12, 0, 0).unwrap()));
    /// assert!(!cron.is_time_matching(&Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap()));
    /// ```
    pub fn is_time_matching<Tz: TimeZone>(&self, time: &DateTime<Tz>) -> bool {
        self.pattern.is_matching(&time.naive_local())
    }

    /// Finds the first minute strictly after `start_time` that matches the pattern.
    ///
    /// Candidates are whole minutes in the wall-clock time of `start_time`'s zone, starting
    /// with the minute after the one `start_time` falls in. The returned time always has zero
    /// seconds. A matching candidate that does not exist in the zone is skipped, and one that
    /// exists twice resolves to the earliest instant after `start_time`.
    ///
    /// # Errors
    ///
    /// - `CronError::TimeSearchLimitExceeded`: no match among the first
    ///   [`Cron::search_limit`] candidates.
    /// - `CronError::InvalidTime`: the search ran past the range of `chrono`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    ///
    /// use chrono::{TimeZone, Utc};
    /// use nextrun::Cron;
    ///
    /// let cron = Cron::from_str("0 9 * * MON-FRI").expect("Successful parsing");
    ///
    /// // Saturday morning, the next run is on Monday.
    /// let saturday = Utc.with_ymd_and_hms(2024, 1, 13, 8, 0, 0).unwrap();
    /// let next = cron.find_next_occurrence(&saturday).unwrap();
    /// assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
    /// ```
    pub fn find_next_occurrence<Tz: TimeZone>(
        &self,
        start_time: &DateTime<Tz>,
    ) -> Result<DateTime<Tz>, CronError> {
        let timezone = start_time.timezone();
        let mut candidate = next_minute(truncate_to_minute(start_time.naive_local())?)?;

        for _ in 0..self.search_limit {
            if self.pattern.is_matching(&candidate) {
                if let Some(found) = from_naive_after(candidate, &timezone, start_time) {
                    return Ok(found);
                }
            }
            candidate = next_minute(candidate)?;
        }

        Err(CronError::TimeSearchLimitExceeded(self.search_limit))
    }

    /// Creates a `CronIterator` over the times the pattern fires after `start_after`.
    ///
    /// The iterator never yields `start_after` itself. It ends when a search fails,
    /// normally because the search limit was exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    ///
    /// use chrono::{TimeZone, Timelike, Utc};
    /// use nextrun::Cron;
    ///
    /// let cron = Cron::from_str("*/20 * * * *").expect("Successful parsing");
    /// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    ///
    /// let minutes: Vec<u32> = cron.iter_after(start).take(4).map(|t| t.minute()).collect();
    /// assert_eq!(minutes, vec![20, 40, 0, 20]);
    /// ```
    pub fn iter_after<Tz: TimeZone>(&self, start_after: DateTime<Tz>) -> CronIterator<Tz> {
        CronIterator::new(self.clone(), start_after)
    }
}

// Parses with the default parser: five or six fields, default search limit.
impl FromStr for Cron {
    type Err = CronError;

    fn from_str(cron_string: &str) -> Result<Cron, CronError> {
        CronParser::new().parse(cron_string)
    }
}

impl std::fmt::Display for Cron {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

fn truncate_to_minute(time: NaiveDateTime) -> Result<NaiveDateTime, CronError> {
    time.with_second(0)
        .and_then(|time| time.with_nanosecond(0))
        .ok_or(CronError::InvalidTime)
}

fn next_minute(time: NaiveDateTime) -> Result<NaiveDateTime, CronError> {
    time.checked_add_signed(Duration::minutes(1))
        .ok_or(CronError::InvalidTime)
}

// Convert a wall-clock candidate back to `DateTime<Tz>`, keeping only instants after `after`.
fn from_naive_after<Tz: TimeZone>(
    naive_time: NaiveDateTime,
    timezone: &Tz,
    after: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    match timezone.from_local_datetime(&naive_time) {
        LocalResult::Single(time) => Some(time).filter(|time| time > after),
        LocalResult::Ambiguous(earliest, latest) => {
            [earliest, latest].into_iter().find(|time| time > after)
        }
        LocalResult::None => None,
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    impl Serialize for Cron {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(self.pattern.as_str())
        }
    }

    struct CronVisitor;

    impl Visitor<'_> for CronVisitor {
        type Value = Cron;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a cron pattern")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Cron::from_str(value).map_err(E::custom)
        }
    }

    impl<'de> Deserialize<'de> for Cron {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_str(CronVisitor)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, FixedOffset, Utc};

    fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
            .unwrap()
    }

    #[test]
    fn test_is_time_matching() {
        // This pattern is meant to match 9 am on the first day of January.
        let cron = Cron::from_str("0 9 1 1 *").unwrap();
        assert!(cron.is_time_matching(&utc(2023, 1, 1, 9, 0, 0)));
        assert!(cron.is_time_matching(&utc(2023, 1, 1, 9, 0, 59)));
        assert!(!cron.is_time_matching(&utc(2023, 1, 1, 10, 0, 0)));
    }

    #[test]
    fn test_is_time_matching_different_time_zones() {
        let cron = Cron::from_str("0 12 * * *").unwrap();
        let east = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2023, 1, 1, 12, 0, 0)
            .unwrap();
        let west = FixedOffset::west_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2023, 1, 1, 12, 0, 0)
            .unwrap();

        assert!(cron.is_time_matching(&east));
        assert!(cron.is_time_matching(&west));
        assert!(!cron.is_time_matching(&east.with_timezone(&Utc)));
    }

    #[test]
    fn test_find_next_minute() {
        let cron = Cron::from_str("* * * * *").unwrap();
        let next = cron.find_next_occurrence(&utc(2023, 1, 1, 0, 0, 29)).unwrap();
        assert_eq!(next, utc(2023, 1, 1, 0, 1, 0));
    }

    #[test]
    fn test_find_next_drops_subseconds() {
        let cron = Cron::from_str("* * * * *").unwrap();
        let start = utc(2023, 1, 1, 0, 0, 0) + Duration::milliseconds(1500);
        let next = cron.find_next_occurrence(&start).unwrap();
        assert_eq!(next, utc(2023, 1, 1, 0, 1, 0));
        assert_eq!(next.nanosecond(), 0);
    }

    #[test]
    fn test_find_next_is_exclusive() {
        let cron = Cron::from_str("59 23 * * *").unwrap();
        let start = utc(2023, 3, 14, 23, 59, 0);
        assert!(cron.is_time_matching(&start));
        assert_eq!(
            cron.find_next_occurrence(&start).unwrap(),
            utc(2023, 3, 15, 23, 59, 0)
        );
    }

    #[test]
    fn test_wrap_month_and_year() {
        let cron = Cron::from_str("0 15 * * *").unwrap();
        let next = cron.find_next_occurrence(&utc(2023, 12, 31, 16, 0, 0)).unwrap();
        assert_eq!(next, utc(2024, 1, 1, 15, 0, 0));
    }

    #[test]
    fn test_time_overflow() {
        let cron_match = Cron::from_str("59 23 31 12 *").unwrap();
        let cron_next = Cron::from_str("0 0 1 1 *").unwrap();
        let start = utc(2023, 12, 31, 23, 59, 0);

        assert!(cron_match.is_time_matching(&start));
        assert_eq!(
            cron_next.find_next_occurrence(&start).unwrap(),
            utc(2024, 1, 1, 0, 0, 0)
        );
        assert_eq!(
            cron_match.find_next_occurrence(&start).unwrap(),
            utc(2024, 12, 31, 23, 59, 0)
        );
    }

    #[test]
    fn test_keeps_time_zone() {
        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let cron = Cron::from_str("0 9 * * *").unwrap();
        let start = offset.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let next = cron.find_next_occurrence(&start).unwrap();

        assert_eq!(next.offset(), &offset);
        assert_eq!(next, offset.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_leap_day() {
        let cron = Cron::from_str("0 0 29 2 *").unwrap();
        let next = cron.find_next_occurrence(&utc(2023, 3, 1, 0, 0, 0)).unwrap();
        assert_eq!(next, utc(2024, 2, 29, 0, 0, 0));

        // The next leap day after 2024 is outside the search horizon.
        assert_eq!(
            cron.find_next_occurrence(&utc(2024, 3, 1, 0, 0, 0)),
            Err(CronError::TimeSearchLimitExceeded(DEFAULT_SEARCH_LIMIT))
        );
    }

    #[test]
    fn test_search_limit() {
        let parser = CronParser::builder().search_limit(60).build();
        let hourly = parser.parse("0 * * * *").unwrap();
        let two_hourly = parser.parse("0 */2 * * *").unwrap();

        // 01:00 is the 60th candidate after 00:00
        let next = hourly.find_next_occurrence(&utc(2024, 1, 1, 0, 0, 0)).unwrap();
        assert_eq!(next, utc(2024, 1, 1, 1, 0, 0));
        assert_eq!(
            hourly.find_next_occurrence(&utc(2024, 1, 1, 0, 0, 30)).unwrap(),
            utc(2024, 1, 1, 1, 0, 0)
        );
        assert_eq!(
            two_hourly.find_next_occurrence(&utc(2024, 1, 1, 0, 0, 0)),
            Err(CronError::TimeSearchLimitExceeded(60))
        );
    }

    #[test]
    fn test_zero_search_limit() {
        let cron = CronParser::builder()
            .search_limit(0)
            .build()
            .parse("* * * * *")
            .unwrap();
        assert_eq!(
            cron.find_next_occurrence(&utc(2024, 1, 1, 0, 0, 0)),
            Err(CronError::TimeSearchLimitExceeded(0))
        );
    }

    #[test]
    fn test_end_of_time() {
        let cron = Cron::from_str("0 0 1 1 *").unwrap();
        let start = DateTime::<Utc>::MAX_UTC - Duration::minutes(5);
        assert_eq!(cron.find_next_occurrence(&start), Err(CronError::InvalidTime));
        assert_eq!(next_occurrence("0 0 1 1 *", &start), None);
    }

    #[test]
    fn test_next_occurrence_collapses_errors() {
        let start = utc(2024, 1, 1, 0, 0, 0);
        assert_eq!(next_occurrence("", &start), None);
        assert_eq!(next_occurrence("invalid", &start), None);
        assert_eq!(next_occurrence("0 0 31 2 *", &start), None);
        assert_eq!(next_occurrence("x y z w v", &start), None);
        assert_eq!(
            next_occurrence("0 0 1 * *", &start),
            Some(utc(2024, 2, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_weekday_pattern_alone() {
        let cron = Cron::from_str("15 9 * * mon").unwrap();
        let next = cron.find_next_occurrence(&utc(2022, 2, 28, 23, 59, 0)).unwrap();
        assert_eq!(next.month(), 3);
        assert_eq!(next.day(), 7);
        assert_eq!(next.hour(), 9);
        assert_eq!(next.minute(), 15);
    }
}
