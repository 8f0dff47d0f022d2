use crate::calendar::BookingEntry;
use crate::interval::BookingInterval;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time-bucket size used when projecting a per-equipment timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Week,
    Month,
    Quarter,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
        }
    }

    pub fn from_str(input: &str) -> Option<Self> {
        match input {
            "week" => Some(Granularity::Week),
            "month" => Some(Granularity::Month),
            "quarter" => Some(Granularity::Quarter),
            _ => None,
        }
    }

    /// Start of the bucket containing `date`: Monday for weeks, the first of
    /// the month, or the first day of the calendar quarter.
    fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Week => {
                let back = date.weekday().num_days_from_monday() as i64;
                date - Duration::days(back)
            }
            Granularity::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .unwrap_or(date),
            Granularity::Quarter => {
                let quarter_month = ((date.month() - 1) / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), quarter_month, 1).unwrap_or(date)
            }
        }
    }

    fn next_bucket_start(&self, bucket_start: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Week => bucket_start + Duration::days(7),
            Granularity::Month => {
                let (year, month) = if bucket_start.month() == 12 {
                    (bucket_start.year() + 1, 1)
                } else {
                    (bucket_start.year(), bucket_start.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(bucket_start)
            }
            Granularity::Quarter => {
                let month0 = bucket_start.month() - 1 + 3;
                let year = bucket_start.year() + (month0 / 12) as i32;
                NaiveDate::from_ymd_opt(year, month0 % 12 + 1, 1).unwrap_or(bucket_start)
            }
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineBucket {
    pub start: NaiveDate,
    /// Exclusive bucket end, clipped to the projection range.
    pub end: NaiveDate,
    pub busy: bool,
    /// Occupying request for display; the earliest-starting overlapping
    /// entry wins when several touch the bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentTimeline {
    pub equipment_id: String,
    pub buckets: Vec<TimelineBucket>,
}

/// Buckets one unit's committed entries into the requested granularity.
///
/// Pure function over a calendar snapshot: never mutates state and is safe
/// to run concurrently with writers.
pub fn project_entries(
    entries: &[BookingEntry],
    granularity: Granularity,
    range: &BookingInterval,
) -> Vec<TimelineBucket> {
    let mut buckets = Vec::new();
    let mut cursor = granularity.bucket_start(range.start());

    while cursor < range.end() {
        let bucket_end = granularity.next_bucket_start(cursor);
        let clipped_start = cursor.max(range.start());
        let clipped_end = bucket_end.min(range.end());
        // A zero-width clipped bucket cannot occur: cursor < range.end() and
        // bucket_end > range.start() hold by construction.
        let bucket_interval = match BookingInterval::new(clipped_start, clipped_end) {
            Ok(interval) => interval,
            Err(_) => break,
        };

        let occupant = entries
            .iter()
            .filter(|entry| entry.interval.overlaps(&bucket_interval))
            .min_by_key(|entry| entry.interval.start());

        buckets.push(TimelineBucket {
            start: clipped_start,
            end: clipped_end,
            busy: occupant.is_some(),
            request_id: occupant.map(|entry| entry.request_id),
        });
        cursor = bucket_end;
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(request_id: i32, start: NaiveDate, end: NaiveDate) -> BookingEntry {
        BookingEntry {
            request_id,
            interval: BookingInterval::new(start, end).unwrap(),
        }
    }

    #[test]
    fn week_buckets_start_on_monday_and_clip_to_range() {
        // 2025-11-05 is a Wednesday.
        let range = BookingInterval::new(date(2025, 11, 5), date(2025, 11, 19)).unwrap();
        let buckets = project_entries(&[], Granularity::Week, &range);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].start, date(2025, 11, 5));
        assert_eq!(buckets[0].end, date(2025, 11, 10));
        assert_eq!(buckets[1].start, date(2025, 11, 10));
        assert_eq!(buckets[2].end, date(2025, 11, 19));
        assert!(buckets.iter().all(|bucket| !bucket.busy));
    }

    #[test]
    fn quarter_buckets_roll_across_year_boundary() {
        let range = BookingInterval::new(date(2025, 11, 1), date(2026, 2, 1)).unwrap();
        let buckets = project_entries(&[], Granularity::Quarter, &range);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].start, date(2025, 11, 1));
        assert_eq!(buckets[0].end, date(2026, 1, 1));
        assert_eq!(buckets[1].start, date(2026, 1, 1));
    }

    #[test]
    fn earliest_starting_entry_claims_the_bucket() {
        let entries = vec![
            entry(2, date(2025, 11, 12), date(2025, 11, 14)),
            entry(1, date(2025, 11, 10), date(2025, 11, 12)),
        ];
        let range = BookingInterval::new(date(2025, 11, 10), date(2025, 11, 17)).unwrap();
        let buckets = project_entries(&entries, Granularity::Week, &range);
        assert_eq!(buckets.len(), 1);
        assert!(buckets[0].busy);
        assert_eq!(buckets[0].request_id, Some(1));
    }

    #[test]
    fn month_buckets_mark_free_and_busy_spans() {
        let entries = vec![entry(7, date(2025, 12, 3), date(2025, 12, 9))];
        let range = BookingInterval::new(date(2025, 11, 1), date(2026, 1, 1)).unwrap();
        let buckets = project_entries(&entries, Granularity::Month, &range);
        assert_eq!(buckets.len(), 2);
        assert!(!buckets[0].busy);
        assert!(buckets[1].busy);
        assert_eq!(buckets[1].request_id, Some(7));
    }
}
