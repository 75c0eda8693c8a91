//! Wire value decoding and timestamp presentation.
//!
//! The registry transmits calendar dates as `(year, month, day)` triples
//! with `(0, 0, 0)` standing for "no value", and timestamps as RFC 3339
//! strings in UTC. Decoding failures are hard errors; a record with an
//! undecodable field is never half-delivered.

use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, UtcOffset};
use webwhois_core::config::DateTimeConfig;

use crate::error::RegistryError;
use crate::types::Birthday;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const NAIVE_DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const OFFSET_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");
const LONG_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// Decode a wire date triple. `(0, 0, 0)` is the registry's "no date"
/// sentinel and decodes to `None`; any other invalid triple is an error.
pub fn decode_date(year: i32, month: i32, day: i32) -> Result<Option<Date>, RegistryError> {
    if (year, month, day) == (0, 0, 0) {
        return Ok(None);
    }
    let month = u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(|| RegistryError::Decode(format!("invalid month {month} in wire date")))?;
    let day = u8::try_from(day)
        .map_err(|_| RegistryError::Decode(format!("invalid day {day} in wire date")))?;
    Date::from_calendar_date(year, month, day)
        .map(Some)
        .map_err(|e| RegistryError::Decode(format!("invalid wire date {year}-{month}-{day}: {e}")))
}

/// Decode a wire timestamp, normalizing to UTC.
pub fn decode_datetime(value: &str) -> Result<OffsetDateTime, RegistryError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map(|ts| ts.to_offset(UtcOffset::UTC))
        .map_err(|e| RegistryError::Decode(format!("invalid wire timestamp {value:?}: {e}")))
}

/// Decode a `BIRTHDAY` identification value. Values that do not parse as
/// a calendar date are kept verbatim for display.
pub fn decode_birthday(value: &str) -> Birthday {
    match Date::parse(value, DATE_FORMAT) {
        Ok(date) => Birthday::Date(date),
        Err(_) => Birthday::Text(value.to_string()),
    }
}

/// Format a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> Result<String, RegistryError> {
    date.format(DATE_FORMAT)
        .map_err(|e| RegistryError::Decode(format!("cannot format date: {e}")))
}

/// Format a calendar date in its long display form, `March 8, 2017`.
/// Confirmation texts quote submission dates this way.
pub fn format_long_date(date: Date) -> Result<String, RegistryError> {
    date.format(LONG_DATE_FORMAT)
        .map_err(|e| RegistryError::Decode(format!("cannot format date: {e}")))
}

/// Presentation policy for decoded timestamps.
///
/// With `use_timezone` the timestamp is shown zone-aware in the configured
/// offset; without it the timestamp is converted to the offset and the
/// zone information is dropped from the rendering.
#[derive(Debug, Clone, Copy)]
pub struct TimestampFormatter {
    use_timezone: bool,
    offset: UtcOffset,
}

impl TimestampFormatter {
    pub fn from_config(config: &DateTimeConfig) -> Result<Self, RegistryError> {
        Ok(Self {
            use_timezone: config.use_timezone,
            offset: parse_utc_offset(&config.timezone_offset)?,
        })
    }

    pub fn datetime(&self, ts: OffsetDateTime) -> Result<String, RegistryError> {
        let local = ts.to_offset(self.offset);
        if self.use_timezone {
            local
                .format(&Rfc3339)
                .map_err(|e| RegistryError::Decode(format!("cannot format timestamp: {e}")))
        } else {
            local
                .format(NAIVE_DATETIME_FORMAT)
                .map_err(|e| RegistryError::Decode(format!("cannot format timestamp: {e}")))
        }
    }

    pub fn datetime_opt(&self, ts: Option<OffsetDateTime>) -> Result<Option<String>, RegistryError> {
        ts.map(|ts| self.datetime(ts)).transpose()
    }

    /// The calendar date of an instant in the presentation zone.
    pub fn local_date(&self, ts: OffsetDateTime) -> Date {
        ts.to_offset(self.offset).date()
    }
}

/// Parse a fixed UTC offset in `+HH:MM` form.
pub fn parse_utc_offset(value: &str) -> Result<UtcOffset, RegistryError> {
    UtcOffset::parse(value, OFFSET_FORMAT)
        .map_err(|e| RegistryError::Config(format!("invalid timezone offset {value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn zero_triple_is_the_no_date_sentinel() {
        assert_eq!(decode_date(0, 0, 0).unwrap(), None);
    }

    #[test]
    fn valid_triple_decodes() {
        assert_eq!(
            decode_date(2024, 2, 29).unwrap(),
            Some(date!(2024 - 02 - 29))
        );
    }

    #[test]
    fn invalid_triple_is_a_hard_error() {
        assert!(decode_date(2023, 2, 29).is_err());
        assert!(decode_date(2023, 13, 1).is_err());
        assert!(decode_date(2023, 0, 5).is_err());
    }

    #[test]
    fn timestamps_normalize_to_utc() {
        let ts = decode_datetime("2024-01-15T14:30:00+02:00").unwrap();
        assert_eq!(ts, datetime!(2024-01-15 12:30:00 UTC));
    }

    #[test]
    fn garbage_timestamp_is_a_hard_error() {
        assert!(decode_datetime("yesterday").is_err());
    }

    #[test]
    fn birthday_parses_or_stays_verbatim() {
        assert_eq!(
            decode_birthday("1971-05-12"),
            Birthday::Date(date!(1971 - 05 - 12))
        );
        assert_eq!(
            decode_birthday("12/05/1971"),
            Birthday::Text("12/05/1971".to_string())
        );
    }

    #[test]
    fn long_date_spells_out_the_month() {
        assert_eq!(
            format_long_date(date!(2017 - 03 - 08)).unwrap(),
            "March 8, 2017"
        );
    }

    #[test]
    fn aware_formatting_keeps_the_offset() {
        let config = DateTimeConfig {
            use_timezone: true,
            timezone_offset: "+02:00".to_string(),
        };
        let formatter = TimestampFormatter::from_config(&config).unwrap();
        let formatted = formatter.datetime(datetime!(2024-01-15 12:30:00 UTC)).unwrap();
        assert_eq!(formatted, "2024-01-15T14:30:00+02:00");
    }

    #[test]
    fn naive_formatting_drops_the_offset() {
        let config = DateTimeConfig {
            use_timezone: false,
            timezone_offset: "+02:00".to_string(),
        };
        let formatter = TimestampFormatter::from_config(&config).unwrap();
        let formatted = formatter.datetime(datetime!(2024-01-15 12:30:00 UTC)).unwrap();
        assert_eq!(formatted, "2024-01-15 14:30:00");
    }

    #[test]
    fn local_date_crosses_midnight_with_the_offset() {
        let config = DateTimeConfig {
            use_timezone: true,
            timezone_offset: "+02:00".to_string(),
        };
        let formatter = TimestampFormatter::from_config(&config).unwrap();
        assert_eq!(
            formatter.local_date(datetime!(2024-01-15 23:30:00 UTC)),
            date!(2024 - 01 - 16)
        );
    }

    #[test]
    fn bad_offset_is_a_config_error() {
        assert!(parse_utc_offset("UTC+2").is_err());
    }
}
