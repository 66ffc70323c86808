//! Commit-after threshold parsing

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};

use crate::error::{Error, Result};

/// Parse a commit-after threshold relative to `now`.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD` dates (midnight UTC) and
/// relative thresholds such as `3 days ago` or `1 week ago`.
pub fn parse_threshold(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }

    relative(input, now).ok_or_else(|| {
        Error::BadRequest(format!("invalid commit-after threshold {:?}", input))
    })
}

fn relative(input: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut words = input.split_whitespace();
    let amount: i64 = words.next()?.parse().ok()?;
    let unit = words.next()?.to_ascii_lowercase();
    if words.next()? != "ago" || words.next().is_some() || amount < 0 {
        return None;
    }

    let unit_secs: i64 = match unit.trim_end_matches('s') {
        "second" | "sec" => 1,
        "minute" | "min" => 60,
        "hour" => 3600,
        "day" => 86_400,
        "week" => 7 * 86_400,
        "month" => 30 * 86_400,
        "year" => 365 * 86_400,
        _ => return None,
    };

    let delta = TimeDelta::try_seconds(amount.checked_mul(unit_secs)?)?;
    now.checked_sub_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_rfc3339() {
        let ts = parse_threshold("2024-01-02T03:04:05+02:00", now()).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 2, 1, 4, 5).unwrap());
    }

    #[test]
    fn test_plain_date_is_midnight_utc() {
        let ts = parse_threshold("2023-12-31", now()).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_relative() {
        assert_eq!(
            parse_threshold("1 week ago", now()).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap()
        );
        assert_eq!(
            parse_threshold("3 Hours ago", now()).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap()
        );
        assert_eq!(
            parse_threshold(" 2 days ago ", now()).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_invalid_is_bad_request() {
        for input in ["", "yesterday", "3 fortnights ago", "-1 day ago", "1 day", "1 day ago now"] {
            assert_matches!(parse_threshold(input, now()), Err(Error::BadRequest(_)), "{}", input);
        }
    }
}
