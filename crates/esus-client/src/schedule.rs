//! Calendar helpers for schedule queries.
//!
//! The service takes days as `YYYY-MM-DD`, slot times as epoch milliseconds,
//! and agenda bounds as UTC instants at local midnight.

use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Parses a `YYYY-MM-DD` day.
///
/// # Errors
///
/// Returns an error if `input` is not a valid calendar day in that format.
pub fn parse_day(input: &str) -> Result<Date, time::error::Parse> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]"))
}

/// Formats a day as `YYYY-MM-DD`.
#[must_use]
pub fn format_day(day: Date) -> String {
    day.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| day.to_string())
}

/// Local midnight of `day` at `offset`, as an ISO-8601 UTC instant with
/// millisecond precision (e.g. `2025-09-15T03:00:00.000Z` for UTC-03:00).
#[must_use]
pub fn local_midnight_utc(day: Date, offset: UtcOffset) -> String {
    let instant = PrimitiveDateTime::new(day, Time::MIDNIGHT)
        .assume_offset(offset)
        .to_offset(UtcOffset::UTC);
    instant
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .unwrap_or_else(|_| instant.to_string())
}

/// Renders an epoch-millisecond timestamp as `HH:MM` at `offset`.
///
/// Out-of-range timestamps are rendered as the raw number.
#[must_use]
pub fn format_clock(epoch_ms: i64, offset: UtcOffset) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch_ms) * 1_000_000)
        .ok()
        .and_then(|instant| {
            instant
                .to_offset(offset)
                .format(format_description!("[hour]:[minute]"))
                .ok()
        })
        .unwrap_or_else(|| epoch_ms.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::{date, offset};

    use super::*;

    #[test]
    fn parses_and_formats_days() {
        let day = parse_day(" 2025-09-16 ").unwrap();
        assert_eq!(day, date!(2025 - 09 - 16));
        assert_eq!(format_day(day), "2025-09-16");
        assert!(parse_day("16/09/2025").is_err());
        assert!(parse_day("2025-02-30").is_err());
    }

    #[test]
    fn midnight_in_fortaleza_is_three_utc() {
        assert_eq!(
            local_midnight_utc(date!(2025 - 09 - 15), offset!(-3)),
            "2025-09-15T03:00:00.000Z"
        );
        assert_eq!(
            local_midnight_utc(date!(2025 - 09 - 15), UtcOffset::UTC),
            "2025-09-15T00:00:00.000Z"
        );
    }

    #[test]
    fn clock_uses_offset() {
        // 2025-09-15T13:00:00Z
        assert_eq!(format_clock(1_757_941_200_000, offset!(-3)), "10:00");
        assert_eq!(format_clock(1_757_941_200_000, UtcOffset::UTC), "13:00");
    }
}
