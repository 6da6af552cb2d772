use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_MINUTE: i64 = 60_000;
const MINUTES_PER_HOUR: i64 = 60;

/// Length of an event, derived at response time and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub hours: i64,
    pub minutes: i64,
}

impl Duration {
    pub const ALL_DAY: Duration = Duration {
        hours: 24,
        minutes: 0,
    };
}

/// Computes the span between `start` and `end`.
///
/// All-day events always report 24h regardless of their timestamps. Otherwise whole minutes are
/// floored, hours are floored and the minute remainder keeps the sign of the total, so a reversed
/// span yields a negative duration rather than an error.
pub fn calculate_duration(start: DateTime<Utc>, end: DateTime<Utc>, is_all_day: bool) -> Duration {
    if is_all_day {
        return Duration::ALL_DAY;
    }

    let total_minutes = (end - start)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_MINUTE);

    Duration {
        hours: total_minutes.div_euclid(MINUTES_PER_HOUR),
        minutes: total_minutes % MINUTES_PER_HOUR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_all_day_is_always_twenty_four_hours() {
        assert_eq!(calculate_duration(at(10, 0), at(12, 30), true), Duration::ALL_DAY);
        assert_eq!(calculate_duration(at(12, 0), at(9, 0), true), Duration::ALL_DAY);
    }

    #[test]
    fn test_hours_and_minutes() {
        assert_eq!(
            calculate_duration(at(10, 0), at(12, 30), false),
            Duration {
                hours: 2,
                minutes: 30
            }
        );
    }

    #[test]
    fn test_zero_span() {
        assert_eq!(
            calculate_duration(at(10, 0), at(10, 0), false),
            Duration {
                hours: 0,
                minutes: 0
            }
        );
    }

    #[test]
    fn test_partial_minutes_are_floored() {
        let end = at(10, 1) + chrono::Duration::seconds(59);
        assert_eq!(
            calculate_duration(at(10, 0), end, false),
            Duration {
                hours: 0,
                minutes: 1
            }
        );
    }

    #[test]
    fn test_reversed_span_is_negative() {
        // -90 minutes: hours floor to -2, remainder keeps the dividend's sign
        assert_eq!(
            calculate_duration(at(11, 30), at(10, 0), false),
            Duration {
                hours: -2,
                minutes: -30
            }
        );
    }
}
