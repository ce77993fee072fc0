use crate::error::ValidationError;
use chrono::NaiveDate;

/// A date range iterator that yields each date from the start date
/// through the end date (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    /// Build a range from optional user input. Both ends must be set and
    /// the start must not come after the end.
    pub fn checked(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DateRange, ValidationError> {
        match (start, end) {
            (Some(start), Some(end)) if start > end => {
                Err(ValidationError::StartAfterEnd { start, end })
            }
            (Some(start), Some(end)) => Ok(DateRange(start, end)),
            _ => Err(ValidationError::MissingDate),
        }
    }

    /// Parse a pair of "YYYY-MM-DD" strings. Empty strings count as unset.
    pub fn parse(start: &str, end: &str) -> Result<DateRange, ValidationError> {
        DateRange::checked(parse_optional(start)?, parse_optional(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.0
    }

    pub fn end(&self) -> NaiveDate {
        self.1
    }

    /// Number of days in the range, counting both ends.
    pub fn days(&self) -> usize {
        let span = (self.1 - self.0).num_days();
        if span < 0 {
            0
        } else {
            span as usize + 1
        }
    }
}

fn parse_optional(s: &str) -> Result<Option<NaiveDate>, ValidationError> {
    if s.trim().is_empty() {
        return Ok(None);
    }
    nino_utils::dates::parse_date(s)
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 > self.1 {
            return None;
        }
        let current = self.0;
        match current.succ_opt() {
            Some(next) => self.0 = next,
            // last representable day: close the range from the end instead
            None => self.1 = current.pred_opt().unwrap_or(NaiveDate::MIN),
        }
        Some(current)
    }
}
