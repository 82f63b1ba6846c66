use std::hash::{Hash, Hasher};

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::component::{CronComponent, Field};

// Holds the parsed fields of a cron pattern and decides whether a wall-clock time matches.
// A leading seconds field is accepted by the parser but not kept, matching is done per minute.
#[derive(Debug, Clone, Eq)]
pub struct CronPattern {
    pattern: String, // The original pattern

    pub minutes: CronComponent,
    pub hours: CronComponent,
    pub days: CronComponent,
    pub months: CronComponent,
    pub days_of_week: CronComponent,

    // Options
    pub dom_and_dow: bool, // Require both day of month and day of week when both are given
}

impl CronPattern {
    /// Builds a pattern from the five calendar fields, in order
    /// minute, hour, day of month, month and day of week.
    pub fn new(pattern: &str, fields: [&str; 5], dom_and_dow: bool) -> Self {
        let [minutes, hours, days, months, days_of_week] = fields;
        Self {
            pattern: pattern.to_string(),
            minutes: CronComponent::parse(Field::Minute, minutes),
            hours: CronComponent::parse(Field::Hour, hours),
            days: CronComponent::parse(Field::DayOfMonth, days),
            months: CronComponent::parse(Field::Month, months),
            days_of_week: CronComponent::parse(Field::DayOfWeek, days_of_week),
            dom_and_dow,
        }
    }

    /// Checks minute, hour, month and the combined day rule against `time`.
    /// Seconds and smaller units of `time` are ignored.
    pub fn is_matching(&self, time: &NaiveDateTime) -> bool {
        self.minutes.matches(time.minute())
            && self.hours.matches(time.hour())
            && self.months.matches(time.month())
            && self.day_match(time.day(), time.weekday().num_days_from_sunday())
    }

    // Combines day of month and day of week. When both are restricted a day
    // matching either one qualifies, unless `dom_and_dow` asks for both.
    pub fn day_match(&self, day: u32, day_of_week: u32) -> bool {
        match (self.days.is_any(), self.days_of_week.is_any()) {
            (true, true) => true,
            (true, false) => self.days_of_week.matches(day_of_week),
            (false, true) => self.days.matches(day),
            (false, false) if self.dom_and_dow => {
                self.days.matches(day) && self.days_of_week.matches(day_of_week)
            }
            (false, false) => self.days.matches(day) || self.days_of_week.matches(day_of_week),
        }
    }

    // Get a reference to the original pattern
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl std::fmt::Display for CronPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

impl PartialEq for CronPattern {
    /// Two patterns are equal when they match the same times.
    ///
    /// The original text is ignored, so `0 0 * * SUN` equals `0 0 * * 0`.
    fn eq(&self, other: &Self) -> bool {
        self.minutes == other.minutes
            && self.hours == other.hours
            && self.days == other.days
            && self.months == other.months
            && self.days_of_week == other.days_of_week
            && self.dom_and_dow == other.dom_and_dow
    }
}

impl Hash for CronPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.minutes.hash(state);
        self.hours.hash(state);
        self.days.hash(state);
        self.months.hash(state);
        self.days_of_week.hash(state);
        self.dom_and_dow.hash(state);
    }
}
