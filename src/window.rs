use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::error::ValidationError;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Inclusive `[start_ms, end_ms]` range in Unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start_ms: i64,
    end_ms: i64,
}

impl DateWindow {
    /// Covers both calendar days completely: `end` runs to its last millisecond.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedDateWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self {
            start_ms: date_to_ms(start),
            end_ms: date_to_ms(end) + DAY_MS - 1,
        })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        let start = parse_field("start date", start)?;
        let end = parse_field("end date", end)?;
        Self::from_dates(start, end)
    }

    /// Window ending today and reaching back `days` days.
    pub fn since_days(days: i64, today: NaiveDate) -> Result<Self, ValidationError> {
        let start = today
            .checked_sub_days(Days::new(days.max(0).unsigned_abs()))
            .ok_or(ValidationError::WindowTooLong { days })?;
        Self::from_dates(start, today)
    }

    pub fn contains(&self, timestamp_ms: i64) -> bool {
        self.start_ms <= timestamp_ms && timestamp_ms <= self.end_ms
    }

    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    parse_calendar_date(value).ok_or_else(|| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Reads a leading `YYYY-MM-DD`; a trailing time of day is accepted and dropped.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date = text.get(..10)?;
    let rest = &text[10..];
    if !(rest.is_empty() || rest.starts_with([' ', 'T'])) {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

pub fn date_to_ms(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// `DD/MM/YYYY` in UTC.
pub fn format_display_date(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|instant| instant.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}
