//! Civil-date parsing and normalization helpers.
//!
//! Dates here are civil dates, not instants: no timezone or locale
//! handling anywhere.

use chrono::NaiveDate;

use crate::constants::dates::ISO_DATE_FORMAT;
use crate::data::AsOfDate;
use crate::errors::CohortError;

/// Parse a strict ISO `YYYY-MM-DD` date string.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, CohortError> {
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).map_err(|_| CohortError::Format {
        value: value.to_string(),
    })
}

/// Parse a sequence of ISO date strings, failing on the first malformed one.
pub fn parse_iso_dates<'a, I>(values: I) -> Result<Vec<NaiveDate>, CohortError>
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().map(parse_iso_date).collect()
}

/// Normalize date-or-datetime evaluation dates to bare civil dates.
pub fn normalize_as_of_dates(values: &[AsOfDate]) -> Vec<NaiveDate> {
    values.iter().map(|value| value.date()).collect()
}
