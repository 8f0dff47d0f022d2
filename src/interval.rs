use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open date interval `[start, end)`.
///
/// Two intervals conflict when `a.start < b.end && b.start < a.end`, so an
/// interval ending on a date never conflicts with one starting that date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct BookingInterval {
    start: NaiveDate,
    end: NaiveDate,
}

/// Deserialization goes through [`BookingInterval::new`] so persisted or
/// client-supplied data cannot smuggle in an empty or reversed range.
#[derive(Deserialize)]
struct RawInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawInterval> for BookingInterval {
    type Error = InvalidInterval;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        BookingInterval::new(raw.start, raw.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for InvalidInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "interval start {} must precede interval end {}",
            self.start, self.end
        )
    }
}

impl std::error::Error for InvalidInterval {}

impl BookingInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidInterval> {
        if start >= end {
            return Err(InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn overlaps(&self, other: &BookingInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// True when `self` lies entirely within `outer`.
    pub fn within(&self, outer: &BookingInterval) -> bool {
        outer.start <= self.start && self.end <= outer.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for BookingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_empty_and_reversed_ranges() {
        assert!(BookingInterval::new(date(2025, 11, 10), date(2025, 11, 5)).is_err());
        assert!(BookingInterval::new(date(2025, 11, 5), date(2025, 11, 5)).is_err());
    }

    #[test]
    fn half_open_semantics_make_adjacent_intervals_disjoint() {
        let a = BookingInterval::new(date(2025, 11, 1), date(2025, 11, 5)).unwrap();
        let b = BookingInterval::new(date(2025, 11, 5), date(2025, 11, 8)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(!a.contains_date(date(2025, 11, 5)));
        assert!(a.contains_date(date(2025, 11, 1)));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = BookingInterval::new(date(2025, 11, 1), date(2025, 11, 10)).unwrap();
        let b = BookingInterval::new(date(2025, 11, 5), date(2025, 11, 8)).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(b.within(&a));
        assert!(!a.within(&b));
    }
}
