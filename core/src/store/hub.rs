use crate::feed::TelemetryRecord;
use crate::store::history::HistoryBuffer;
use std::sync::RwLock;
use tokio::sync::watch;

/// Consistent view of the hub at one instant.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub connected: bool,
    pub latest: Option<TelemetryRecord>,
    pub history: Vec<TelemetryRecord>,
}

/// Process-wide holder of connection state, latest record, and history.
///
/// All mutation funnels through `set_connection_status` and
/// `update_telemetry`; every read sees connection flag, latest record, and
/// history as one unit, so a snapshot is never torn across an update.
#[derive(Debug)]
pub struct TelemetryStore {
    inner: RwLock<Inner>,
    revision: watch::Sender<u64>,
}

#[derive(Debug)]
struct Inner {
    connected: bool,
    latest: Option<TelemetryRecord>,
    history: HistoryBuffer,
}

impl TelemetryStore {
    pub fn new(history_capacity: usize) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: RwLock::new(Inner {
                connected: false,
                latest: None,
                history: HistoryBuffer::with_capacity(history_capacity),
            }),
            revision,
        }
    }

    /// Flips the liveness flag; only actual transitions notify subscribers.
    pub fn set_connection_status(&self, connected: bool) {
        {
            let mut inner = self.inner.write().unwrap();
            if inner.connected == connected {
                return;
            }
            inner.connected = connected;
        }
        self.bump();
    }

    /// Single mutation path for latest-record and history.
    pub fn update_telemetry(&self, record: TelemetryRecord) {
        {
            let mut inner = self.inner.write().unwrap();
            inner.latest = Some(record.clone());
            inner.history.push(record);
        }
        self.bump();
    }

    pub fn is_connected(&self) -> bool {
        self.inner.read().unwrap().connected
    }

    pub fn latest(&self) -> Option<TelemetryRecord> {
        self.inner.read().unwrap().latest.clone()
    }

    pub fn history(&self) -> Vec<TelemetryRecord> {
        self.inner.read().unwrap().history.snapshot()
    }

    /// Reads the whole hub under one lock acquisition.
    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.read().unwrap();
        StoreSnapshot {
            connected: inner.connected,
            latest: inner.latest.clone(),
            history: inner.history.snapshot(),
        }
    }

    /// Change notifications; receivers re-read via `snapshot`.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new(crate::prelude::StreamConfig::default().history_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: f64) -> TelemetryRecord {
        TelemetryRecord {
            timestamp,
            target_detected: true,
            current_x: Some(timestamp),
            current_y: Some(timestamp * 2.0),
            predicted_x: None,
            predicted_y: None,
            confidence: Some(0.9),
            closing_velocity: None,
            distance: None,
            system_log: None,
            log_level: None,
        }
    }

    #[test]
    fn latest_always_matches_last_history_entry() {
        let store = TelemetryStore::new(100);
        for index in 0..120 {
            store.update_telemetry(record(index as f64));
            let snapshot = store.snapshot();
            assert_eq!(
                snapshot.latest.as_ref().map(|r| r.timestamp),
                snapshot.history.last().map(|r| r.timestamp),
            );
        }
        assert_eq!(store.history().len(), 100);
    }

    #[test]
    fn history_is_bounded_and_keeps_newest() {
        let store = TelemetryStore::new(100);
        for index in 0..150 {
            store.update_telemetry(record(index as f64));
        }
        let history = store.history();
        assert_eq!(history.len(), 100);
        assert_eq!(history.first().unwrap().timestamp, 50.0);
        assert_eq!(history.last().unwrap().timestamp, 149.0);
    }

    #[test]
    fn connection_flag_round_trips() {
        let store = TelemetryStore::new(8);
        assert!(!store.is_connected());
        store.set_connection_status(true);
        assert!(store.is_connected());
        store.set_connection_status(false);
        assert!(!store.is_connected());
    }

    #[test]
    fn subscribers_wake_on_updates_only() {
        let store = TelemetryStore::new(8);
        let mut changes = store.subscribe();
        assert!(!changes.has_changed().unwrap());

        store.update_telemetry(record(1.0));
        assert!(changes.has_changed().unwrap());
        changes.borrow_and_update();

        // redundant flag write: no transition, no wake-up
        store.set_connection_status(false);
        assert!(!changes.has_changed().unwrap());

        store.set_connection_status(true);
        assert!(changes.has_changed().unwrap());
    }
}
