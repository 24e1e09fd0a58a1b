use crate::feed::parse_frame;
use crate::prelude::StreamConfig;
use crate::store::TelemetryStore;
use crate::stream::link::{transition, LinkPhase};
use crate::telemetry::{LogManager, MetricsRecorder};
use futures_util::StreamExt;
use log::{info, warn};
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::net::TcpStream;
use tokio::runtime::Builder;
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// Owns the live feed connection and its reconnection behavior.
///
/// At most one connection and one pending retry timer exist at any time: a
/// single worker drives dial, read, and retry delay sequentially, so the
/// idempotence guards reduce to "is the worker alive". The worker runs on
/// its own thread with a current-thread runtime, independent of any UI
/// lifecycle.
#[derive(Debug)]
pub struct StreamClient {
    config: StreamConfig,
    store: Arc<TelemetryStore>,
    metrics: Arc<MetricsRecorder>,
    worker: Mutex<Option<Worker>>,
}

#[derive(Debug)]
struct Worker {
    shutdown: watch::Sender<bool>,
    thread: thread::JoinHandle<()>,
}

impl StreamClient {
    pub fn new(config: StreamConfig, store: Arc<TelemetryStore>) -> Self {
        Self {
            config,
            store,
            metrics: Arc::new(MetricsRecorder::new()),
            worker: Mutex::new(None),
        }
    }

    /// Starts the link worker; a no-op while one is already running.
    ///
    /// Returns whether a new worker was started.
    pub fn connect(&self) -> bool {
        let mut slot = self.worker.lock().unwrap();
        if let Some(worker) = slot.as_ref() {
            if !worker.thread.is_finished() {
                return false;
            }
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let config = self.config.clone();
        let store = self.store.clone();
        let metrics = self.metrics.clone();
        let thread = thread::spawn(move || {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(run_link(config, store, metrics, shutdown_rx));
        });

        *slot = Some(Worker { shutdown, thread });
        true
    }

    /// Cancels any pending retry and closes the active connection.
    ///
    /// Safe to call when already disconnected; no reconnect is scheduled
    /// afterwards and no store mutation from the old connection survives
    /// the join.
    pub fn disconnect(&self) {
        let worker = self.worker.lock().unwrap().take();
        if let Some(worker) = worker {
            let _ = worker.shutdown.send(true);
            let _ = worker.thread.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap()
            .as_ref()
            .map(|worker| !worker.thread.is_finished())
            .unwrap_or(false)
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Drives the connect / read / retry cycle until shutdown is requested.
async fn run_link(
    config: StreamConfig,
    store: Arc<TelemetryStore>,
    metrics: Arc<MetricsRecorder>,
    mut shutdown: watch::Receiver<bool>,
) {
    let logger = LogManager::new();
    let mut phase = LinkPhase::Idle;

    loop {
        if *shutdown.borrow() {
            break;
        }
        transition(&mut phase, LinkPhase::Connecting);

        let attempt = tokio::select! {
            attempt = connect_async(config.endpoint.as_str()) => Some(attempt),
            _ = shutdown.changed() => None,
        };

        match attempt {
            None => break,
            Some(Ok((socket, _response))) => {
                info!("telemetry stream open at {}", config.endpoint);
                transition(&mut phase, LinkPhase::Open);
                store.set_connection_status(true);
                read_frames(socket, &store, &metrics, &logger, &mut shutdown).await;
                store.set_connection_status(false);
            }
            Some(Err(err)) => {
                warn!("telemetry dial failed: {}", err);
            }
        }

        let disconnect_requested = *shutdown.borrow();
        transition(&mut phase, LinkPhase::after_close(disconnect_requested));
        if disconnect_requested {
            break;
        }

        metrics.record_reconnect();
        tokio::select! {
            _ = tokio::time::sleep(config.reconnect_delay) => {}
            _ = shutdown.changed() => break,
        }
    }

    transition(&mut phase, LinkPhase::Idle);
    store.set_connection_status(false);
}

/// Pumps inbound frames into the store until the link drops.
///
/// One malformed frame is logged and discarded; it never disturbs the
/// connection or the frames around it.
async fn read_frames(
    mut socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    store: &TelemetryStore,
    metrics: &MetricsRecorder,
    logger: &LogManager,
    shutdown: &mut watch::Receiver<bool>,
) {
    loop {
        let message = tokio::select! {
            message = socket.next() => message,
            _ = shutdown.changed() => {
                let _ = socket.close(None).await;
                return;
            }
        };

        match message {
            Some(Ok(Message::Text(frame))) => match parse_frame(&frame) {
                Ok(record) => {
                    metrics.record_accepted();
                    if let Some(line) = record.system_log.as_deref() {
                        logger.route(record.severity(), line);
                    }
                    store.update_telemetry(record);
                }
                Err(err) => {
                    metrics.record_rejected();
                    warn!("dropping malformed frame: {}", err);
                }
            },
            Some(Ok(Message::Close(_))) | None => {
                info!("telemetry stream closed");
                return;
            }
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                // errors funnel into the same close handling as ordinary drops
                warn!("telemetry stream error: {}", err);
                let _ = socket.close(None).await;
                return;
            }
        }
    }
}
