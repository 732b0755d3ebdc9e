use std::fmt::{Debug, Formatter};

use chrono::{DateTime, Local, TimeDelta};

#[derive(Copy, Clone, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Interval {
    /// Inclusive.
    pub start: DateTime<Local>,

    /// Exclusive.
    pub end: DateTime<Local>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Interval {
    pub const fn new(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self { start, end }
    }

    pub fn with_duration(start: DateTime<Local>, duration: TimeDelta) -> Self {
        Self { start, end: start + duration }
    }

    pub fn duration(self) -> TimeDelta {
        self.end - self.start
    }

    pub fn contains(self, other: DateTime<Local>) -> bool {
        (self.start <= other) && (other < self.end)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_contains() {
        let start = Local.with_ymd_and_hms(2025, 6, 21, 12, 0, 0).unwrap();
        let interval = Interval::with_duration(start, TimeDelta::minutes(30));
        assert!(interval.contains(start));
        assert!(interval.contains(start + TimeDelta::minutes(29)));
        assert!(!interval.contains(interval.end));
        assert_eq!(interval.duration(), TimeDelta::minutes(30));
    }
}
