use crate::feed::TelemetryRecord;
use std::collections::VecDeque;

/// Bounded FIFO of recent records backing the trajectory and log views.
///
/// Insertion order is arrival order; records are never re-sorted by
/// timestamp. Readers only ever get snapshots.
#[derive(Debug)]
pub struct HistoryBuffer {
    records: VecDeque<TelemetryRecord>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a record, evicting the oldest once full.
    pub fn push(&mut self, record: TelemetryRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&TelemetryRecord> {
        self.records.back()
    }

    /// Copies the current contents in arrival order.
    pub fn snapshot(&self) -> Vec<TelemetryRecord> {
        self.records.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: f64) -> TelemetryRecord {
        TelemetryRecord {
            timestamp,
            target_detected: false,
            current_x: None,
            current_y: None,
            predicted_x: None,
            predicted_y: None,
            confidence: None,
            closing_velocity: None,
            distance: None,
            system_log: None,
            log_level: None,
        }
    }

    #[test]
    fn keeps_arrival_order_below_capacity() {
        let mut buffer = HistoryBuffer::with_capacity(4);
        for index in 0..3 {
            buffer.push(record(index as f64));
        }
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].timestamp, 0.0);
        assert_eq!(snapshot[2].timestamp, 2.0);
        assert_eq!(buffer.latest().unwrap().timestamp, 2.0);
    }

    #[test]
    fn evicts_oldest_first_once_full() {
        let mut buffer = HistoryBuffer::with_capacity(100);
        for index in 0..150 {
            buffer.push(record(index as f64));
        }
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 100);
        assert_eq!(snapshot.first().unwrap().timestamp, 50.0);
        assert_eq!(snapshot.last().unwrap().timestamp, 149.0);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut buffer = HistoryBuffer::with_capacity(0);
        buffer.push(record(1.0));
        buffer.push(record(2.0));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.latest().unwrap().timestamp, 2.0);
    }
}
