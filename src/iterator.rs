use crate::{errors::CronError, Cron};
use chrono::{DateTime, TimeZone};
use tracing::debug;

/// Iterator over the times a [`Cron`] fires, created by [`Cron::iter_after`].
///
/// Each item is searched for from the previous one, so the iterator stops as soon as
/// the gap to the next occurrence is longer than the search limit.
#[derive(Debug, Clone)]
pub struct CronIterator<Tz>
where
    Tz: TimeZone,
{
    cron: Cron,
    current_time: DateTime<Tz>,
    exhausted: bool,
}

impl<Tz> CronIterator<Tz>
where
    Tz: TimeZone,
{
    /// Creates a new `CronIterator`.
    ///
    /// # Arguments
    ///
    /// * `cron` - The `Cron` schedule instance.
    /// * `start_after` - The `DateTime` to search after. It is never yielded itself.
    pub fn new(cron: Cron, start_after: DateTime<Tz>) -> Self {
        CronIterator {
            cron,
            current_time: start_after,
            exhausted: false,
        }
    }
}

impl<Tz> Iterator for CronIterator<Tz>
where
    Tz: TimeZone,
{
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        match self.cron.find_next_occurrence(&self.current_time) {
            Ok(found) => {
                self.current_time = found.clone();
                Some(found)
            }
            Err(error) => {
                if !matches!(error, CronError::TimeSearchLimitExceeded(_)) {
                    debug!(pattern = %self.cron, %error, "cron iteration stopped");
                }
                self.exhausted = true;
                None
            }
        }
    }
}
