use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// A legacy `YYYYMMDD[HHMM[SS]]` value, at the precision it was sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Timestamp {
    pub fn date(&self) -> NaiveDate {
        match self {
            Timestamp::Date(date) => *date,
            Timestamp::DateTime(datetime) => datetime.date(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Timestamp::DateTime(datetime) => write!(f, "{}", datetime.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Parse a legacy timestamp.
///
/// At least 14 digits gives a full date-time, 12 or 13 a date-time without
/// seconds, 8 to 11 a date. Fractional seconds and a trailing UTC offset are
/// ignored. Anything shorter, non-numeric, or naming an impossible calendar
/// value yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let digits = raw.trim().split(['.', '+', '-']).next().unwrap_or_default();
    if digits.len() < 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let number = |start: usize| digits[start..start + 2].parse::<u32>().ok();
    let date = NaiveDate::from_ymd_opt(digits[..4].parse().ok()?, number(4)?, number(6)?)?;

    let time = if digits.len() >= 14 {
        NaiveTime::from_hms_opt(number(8)?, number(10)?, number(12)?)?
    } else if digits.len() >= 12 {
        NaiveTime::from_hms_opt(number(8)?, number(10)?, 0)?
    } else {
        return Some(Timestamp::Date(date));
    };
    Some(Timestamp::DateTime(date.and_time(time)))
}
