/// Represents errors that can occur while parsing cron patterns or searching for occurrences.
///
/// Field tokens that cannot be resolved (`"foo"`, `"0"` in the day-of-month field, a zero step)
/// are not errors: they parse into field expressions that never match. The only way such a
/// pattern fails is by exhausting the search, see [`CronError::TimeSearchLimitExceeded`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CronError {
    /// The pattern string provided was empty or contained only whitespace.
    #[error("CronPattern cannot be an empty string.")]
    EmptyPattern,

    /// The pattern does not have the shape the parser was configured for.
    ///
    /// This covers a wrong number of fields, and a day-of-week field containing whitespace.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// No matching minute was found within the configured number of candidates.
    ///
    /// Typically encountered with patterns that can never match, such as `0 0 31 2 *`,
    /// or that match less often than the search horizon.
    #[error("Time search limit of {0} candidate minutes exceeded.")]
    TimeSearchLimitExceeded(u32),

    /// Date arithmetic left the range chrono can represent.
    #[error("Encountered a time outside the supported range.")]
    InvalidTime,
}
