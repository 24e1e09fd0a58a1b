use std::sync::Mutex;

/// Ingest counters shared between the stream client and its owner.
#[derive(Debug)]
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug)]
struct Metrics {
    frames_accepted: usize,
    frames_rejected: usize,
    reconnects: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                frames_accepted: 0,
                frames_rejected: 0,
                reconnects: 0,
            }),
        }
    }

    pub fn record_accepted(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames_accepted += 1;
        }
    }

    pub fn record_rejected(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames_rejected += 1;
        }
    }

    pub fn record_reconnect(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.reconnects += 1;
        }
    }

    /// (accepted, rejected, reconnects)
    pub fn snapshot(&self) -> (usize, usize, usize) {
        if let Ok(metrics) = self.inner.lock() {
            (
                metrics.frames_accepted,
                metrics.frames_rejected,
                metrics.reconnects,
            )
        } else {
            (0, 0, 0)
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = MetricsRecorder::new();
        metrics.record_accepted();
        metrics.record_accepted();
        metrics.record_rejected();
        metrics.record_reconnect();
        assert_eq!(metrics.snapshot(), (2, 1, 1));
    }
}
