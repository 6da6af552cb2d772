use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use thiserror::Error;

use crate::models::duration::{calculate_duration, Duration};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_all_day: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Duration against the stored end, falling back to the start when the end is open.
    pub fn duration(&self) -> Duration {
        calculate_duration(
            self.start_date,
            self.end_date.unwrap_or(self.start_date),
            self.is_all_day,
        )
    }
}

/// An event as returned by the API: every persisted field plus its computed duration.
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub duration: Duration,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        let duration = event.duration();
        Self { event, duration }
    }
}

/// Writable columns of an event, handed to storage on create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFields {
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_all_day: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum EventInputError {
    #[error("title and start date are required")]
    MissingRequired,

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_all_day: Option<Value>,
}

impl CreateEventRequest {
    pub fn into_fields(self) -> Result<EventFields, EventInputError> {
        let title = self.title.filter(|t| !t.is_empty());
        let start_date = self.start_date.filter(|s| !s.is_empty());
        let (Some(title), Some(start_date)) = (title, start_date) else {
            return Err(EventInputError::MissingRequired);
        };

        let is_all_day = self.is_all_day.as_ref().is_some_and(is_truthy);
        let end_date = match self.end_date {
            Some(raw) if !is_all_day => Some(require_timestamp(&raw)?),
            _ => None,
        };

        Ok(EventFields {
            title,
            description: self.description,
            start_date: require_timestamp(&start_date)?,
            end_date,
            is_all_day,
        })
    }
}

/// Partial update body.
///
/// `description` and `isAllDay` record whether the key was sent at all, so an explicit `""`,
/// `false` or `null` still overwrites the stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub is_all_day: Option<Value>,
}

impl UpdateEventRequest {
    /// Merges the request over `existing`.
    ///
    /// The end date is cleared only when this request itself carries a truthy `isAllDay`; an
    /// already all-day event updated without the flag keeps whatever end date is supplied.
    pub fn merge(self, existing: &Event) -> Result<EventFields, EventInputError> {
        let clears_end = self.is_all_day.as_ref().is_some_and(is_truthy);

        let start_date = match self.start_date.filter(|s| !s.is_empty()) {
            Some(raw) => require_timestamp(&raw)?,
            None => existing.start_date,
        };

        let end_date = if clears_end {
            None
        } else {
            match self.end_date.filter(|s| !s.is_empty()) {
                Some(raw) => Some(require_timestamp(&raw)?),
                None => existing.end_date,
            }
        };

        Ok(EventFields {
            title: self
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| existing.title.clone()),
            description: match self.description {
                Some(description) => description,
                None => existing.description.clone(),
            },
            start_date,
            end_date,
            is_all_day: match self.is_all_day {
                Some(flag) => is_truthy(&flag),
                None => existing.is_all_day,
            },
        })
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// JSON truthiness: `null`, `false`, `0` and `""` are false, everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parses an ISO 8601 timestamp. Values without an offset are read as UTC and a bare date means
/// midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn require_timestamp(raw: &str) -> Result<DateTime<Utc>, EventInputError> {
    parse_timestamp(raw).ok_or_else(|| EventInputError::InvalidTimestamp(raw.to_string()))
}

/// Reads an id path segment leniently: leading whitespace, an optional sign and the leading run
/// of digits. Anything that yields no digits, or falls outside the id column's range, is `None`.
pub fn parse_id(raw: &str) -> Option<i32> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}
