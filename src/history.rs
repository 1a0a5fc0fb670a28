//! Bounded in-memory reading history

use std::collections::VecDeque;

use crate::types::Reading;

/// Readings kept by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Most recent readings, newest first.
///
/// Pushing into a full history evicts the oldest entry. Nothing is persisted.
#[derive(Debug, Clone)]
pub struct ReadingHistory {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl Default for ReadingHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ReadingHistory {
    /// Create a history holding at most `capacity` readings (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { readings: VecDeque::with_capacity(capacity), capacity }
    }

    /// Record a reading, returning the one evicted to make room.
    pub fn push(&mut self, reading: Reading) -> Option<Reading> {
        let evicted = if self.readings.len() == self.capacity {
            self.readings.pop_back()
        } else {
            None
        };
        self.readings.push_front(reading);
        evicted
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.front()
    }

    /// Iterate newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(systolic: u16) -> Reading {
        let at = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(9, 30, 0).unwrap();
        Reading::new(systolic, 70, 65, at, "").unwrap()
    }

    #[test]
    fn newest_first() {
        let mut history = ReadingHistory::default();
        history.push(reading(110));
        history.push(reading(120));

        assert_eq!(history.latest().map(Reading::systolic), Some(120));
        assert_eq!(history.iter().map(Reading::systolic).collect::<Vec<_>>(), vec![120, 110]);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut history = ReadingHistory::new(3);
        for systolic in [100, 110, 120] {
            assert!(history.push(reading(systolic)).is_none());
        }

        let evicted = history.push(reading(130));
        assert_eq!(evicted.map(|r| r.systolic()), Some(100));
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().map(Reading::systolic).collect::<Vec<_>>(), vec![130, 120, 110]);
    }

    #[test]
    fn default_capacity_and_clear() {
        let mut history = ReadingHistory::default();
        for n in 0..150 {
            history.push(reading(100 + (n % 50)));
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);

        history.clear();
        assert!(history.is_empty());
        assert_eq!(ReadingHistory::new(0).capacity(), 1);
    }
}
