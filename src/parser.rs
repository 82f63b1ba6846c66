//! Parser for cron patterns.
//!
//! Invoking
//!
//! ```rust
//! # use std::str::FromStr as _;
//! #
//! # use nextrun::{Cron, parser::CronParser};
//! #
//! Cron::from_str("0 9 * * MON-FRI");
//! ```
//!
//! is equivalent to
//!
//! ```rust
//! # use nextrun::parser::CronParser;
//! #
//! CronParser::new().parse("0 9 * * MON-FRI");
//! ```
//!
//! A parser built with [`CronParser::builder`] can restrict the accepted field counts,
//! change how far ahead a search looks, or require both day fields to match:
//!
//! ```rust
//! use nextrun::parser::{CronParser, Seconds};
//!
//! // Only five-field patterns, and look at most one week ahead.
//! let parser = CronParser::builder()
//!     .seconds(Seconds::Disallowed)
//!     .search_limit(7 * 24 * 60)
//!     .build();
//!
//! assert!(parser.parse("*/10 * * * *").is_ok());
//! assert!(parser.parse("0 */10 * * * *").is_err());
//! ```

use derive_builder::Builder;
use strum::EnumIs;

use crate::{errors::CronError, pattern::CronPattern, Cron, DEFAULT_SEARCH_LIMIT};

/// How a leading seconds field is handled. Seconds are never matched against,
/// a six-field pattern fires at the start of each matching minute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, EnumIs)]
pub enum Seconds {
    /// Accept both five and six fields.
    #[default]
    Optional,
    /// Accept only six fields.
    Required,
    /// Accept only five fields.
    Disallowed,
}

/// Parser for cron patterns.
///
/// In order to build a custom cron parser use [`CronParser::builder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
#[builder(default, build_fn(skip), pattern = "owned")]
pub struct CronParser {
    /// Configure how seconds should be handled.
    seconds: Seconds,
    /// Require both day of month and day of week to match when both are restricted.
    dom_and_dow: bool,
    /// Number of candidate minutes a search examines before giving up.
    search_limit: u32,
}

impl Default for CronParser {
    fn default() -> Self {
        Self {
            seconds: Seconds::default(),
            dom_and_dow: false,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl CronParser {
    /// Create a new parser.
    ///
    /// You should probably be using [`Cron`]'s implementation of
    /// [`FromStr`][std::str::FromStr] instead of invoking this.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a builder for custom parsing.
    ///
    /// Equivalent to [`CronParserBuilder::default`].
    pub fn builder() -> CronParserBuilder {
        CronParserBuilder::default()
    }

    /// Parses the cron pattern string.
    ///
    /// Only the overall shape is validated here. Tokens that do not resolve to a value
    /// of their field are accepted and simply never match.
    pub fn parse(&self, pattern: &str) -> Result<Cron, CronError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(CronError::EmptyPattern);
        }

        let parts: Vec<&str> = pattern.split_whitespace().collect();
        let fields: [&str; 5] = match parts.as_slice() {
            &[minute, hour, day, month, weekday] if !self.seconds.is_required() => {
                [minute, hour, day, month, weekday]
            }
            &[_, minute, hour, day, month, weekday] if !self.seconds.is_disallowed() => {
                [minute, hour, day, month, weekday]
            }
            _ => {
                return Err(CronError::InvalidPattern(format!(
                    "Pattern must have {} fields, found {}.",
                    self.expected_fields(),
                    parts.len()
                )))
            }
        };

        if fields[4].contains(char::is_whitespace) {
            return Err(CronError::InvalidPattern(format!(
                "Day of week field '{}' contains whitespace.",
                fields[4]
            )));
        }

        Ok(Cron {
            pattern: CronPattern::new(pattern, fields, self.dom_and_dow),
            search_limit: self.search_limit,
        })
    }

    fn expected_fields(&self) -> &'static str {
        match self.seconds {
            Seconds::Optional => "5 or 6",
            Seconds::Required => "6",
            Seconds::Disallowed => "5",
        }
    }
}

impl CronParserBuilder {
    pub fn build(self) -> CronParser {
        let CronParserBuilder {
            seconds,
            dom_and_dow,
            search_limit,
        } = self;
        CronParser {
            seconds: seconds.unwrap_or_default(),
            dom_and_dow: dom_and_dow.unwrap_or_default(),
            search_limit: search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        }
    }
}
