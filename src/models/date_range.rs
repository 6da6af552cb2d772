use chrono::{DateTime, Utc};

use crate::models::event::Event;

/// Closed interval used to filter events by occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when an event with the given bounds overlaps the range: it starts inside it, ends
    /// inside it, or spans all of it. An open end never matches the last two conditions.
    pub fn overlaps(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> bool {
        self.starts_within(start) || self.spans(start, end) || self.ends_within(end)
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.overlaps(event.start_date, event.end_date)
    }

    fn starts_within(&self, start: DateTime<Utc>) -> bool {
        self.contains(start)
    }

    fn spans(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> bool {
        start < self.start && end.is_some_and(|end| end > self.end)
    }

    fn ends_within(&self, end: Option<DateTime<Utc>>) -> bool {
        end.is_some_and(|end| self.contains(end))
    }

    fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn range() -> DateRange {
        DateRange::new(day(5), day(10))
    }

    #[rstest]
    #[case::starts_inside(day(6), Some(day(20)), true)]
    #[case::starts_on_lower_bound(day(5), None, true)]
    #[case::starts_on_upper_bound(day(10), Some(day(12)), true)]
    #[case::ends_inside(day(1), Some(day(7)), true)]
    #[case::ends_on_lower_bound(day(1), Some(day(5)), true)]
    #[case::spans_whole_range(day(1), Some(day(20)), true)]
    #[case::entirely_before(day(1), Some(day(4)), false)]
    #[case::entirely_after(day(11), Some(day(12)), false)]
    #[case::open_ended_before(day(1), None, false)]
    fn test_overlaps(
        #[case] start: DateTime<Utc>,
        #[case] end: Option<DateTime<Utc>>,
        #[case] expected: bool,
    ) {
        assert_eq!(range().overlaps(start, end), expected);
    }
}
