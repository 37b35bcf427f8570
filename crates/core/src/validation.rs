//! Input validation utilities.
//!
//! Checks applied to submitted intake data before anything is written.

use crate::{TriageError, TriageResult};
use chrono::NaiveDate;

/// Rejects birth dates later than `today`.
///
/// # Errors
///
/// Returns `TriageError::InvalidInput` if `birth_date` is in the future.
pub fn validate_birth_date(birth_date: Option<NaiveDate>, today: NaiveDate) -> TriageResult<()> {
    match birth_date {
        Some(date) if date > today => Err(TriageError::InvalidInput(format!(
            "birth date {date} is in the future"
        ))),
        _ => Ok(()),
    }
}

/// Parses a `YYYY-MM-DD` form value. Blank input means "not provided".
///
/// # Errors
///
/// Returns `TriageError::InvalidInput` if the value is present but not a calendar date.
pub fn parse_optional_date(value: Option<&str>) -> TriageResult<Option<NaiveDate>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| TriageError::InvalidInput(format!("'{value}' is not a YYYY-MM-DD date")))
}
