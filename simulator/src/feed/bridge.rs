use crate::feed::notice::LogNotice;
use crate::scenario::config::ScenarioConfig;
use crate::scenario::profile::EngagementProfile;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::{Arc, Mutex, RwLock},
    thread,
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

fn feed_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

/// Tunable state the REST surface exposes to the console.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSettings {
    pub min_confidence: f64,
    pub target_class: String,
    pub autonomous_mode: bool,
    pub effector_armed: bool,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            min_confidence: 0.85,
            target_class: "drones".to_string(),
            autonomous_mode: true,
            effector_armed: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SettingsBody {
    min_confidence: f64,
    target_class: String,
    tracking_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct EffectorBody {
    arm: bool,
}

#[derive(Debug, Deserialize)]
struct CommandBody {
    command: String,
}

/// Shared state behind the warp filters: settings plus the log-notice
/// queue drained one entry per outbound frame.
struct FeedState {
    settings: RwLock<FeedSettings>,
    notices: Mutex<VecDeque<LogNotice>>,
    scenario: ScenarioConfig,
}

impl FeedState {
    fn new(scenario: ScenarioConfig) -> Self {
        Self {
            settings: RwLock::new(FeedSettings::default()),
            notices: Mutex::new(VecDeque::new()),
            scenario,
        }
    }

    fn push_notice(&self, notice: LogNotice) {
        self.notices.lock().unwrap().push_back(notice);
    }

    fn pop_notice(&self) -> Option<LogNotice> {
        self.notices.lock().unwrap().pop_front()
    }
}

/// Bridge that hosts the telemetry websocket and the REST command surface.
pub struct FeedBridge {
    state: Arc<FeedState>,
}

impl FeedBridge {
    pub fn new(scenario: ScenarioConfig) -> Self {
        let state = Arc::new(FeedState::new(scenario));
        let routes = feed_routes(state.clone());

        thread::spawn(move || {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(async move {
                warp::serve(routes).run(feed_bind_address()).await;
            });
        });

        Self { state }
    }

    pub fn push_notice(&self, notice: LogNotice) {
        self.state.push_notice(notice);
    }

    pub fn publish_status(&self, message: &str) {
        println!("[FEED] {}", message);
    }
}

fn feed_routes(
    state: Arc<FeedState>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone + Send + Sync + 'static
{
    let state_filter = warp::any().map(move || state.clone());

    let telemetry_route = warp::path!("ws" / "telemetry")
        .and(warp::ws())
        .and(state_filter.clone())
        .map(|ws: warp::ws::Ws, state: Arc<FeedState>| {
            ws.on_upgrade(move |socket| stream_frames(socket, state))
        });

    let status_route = warp::path!("api" / "status")
        .and(warp::get())
        .and(state_filter.clone())
        .map(|state: Arc<FeedState>| {
            let settings = state.settings.read().unwrap().clone();
            warp::reply::json(&json!({
                "status": "online",
                "settings": settings,
            }))
        });

    let settings_route = warp::path!("api" / "settings")
        .and(warp::post())
        .and(warp::body::json())
        .and(state_filter.clone())
        .map(|body: SettingsBody, state: Arc<FeedState>| {
            {
                let mut settings = state.settings.write().unwrap();
                settings.min_confidence = body.min_confidence;
                settings.target_class = body.target_class.clone();
                settings.autonomous_mode = body.tracking_enabled;
            }
            state.push_notice(LogNotice::info(format!(
                "SYS CONF UPDATED: {} @ {:.0}%",
                body.target_class.to_uppercase(),
                body.min_confidence * 100.0
            )));
            warp::reply::with_status(
                warp::reply::json(&json!({"message": "Settings updated"})),
                StatusCode::OK,
            )
        });

    let effector_route = warp::path!("api" / "effector")
        .and(warp::post())
        .and(warp::body::json())
        .and(state_filter.clone())
        .map(|body: EffectorBody, state: Arc<FeedState>| {
            state.settings.write().unwrap().effector_armed = body.arm;
            let (notice, status) = if body.arm {
                (LogNotice::success("SYSTEM ARMED: Effector updated."), "ARMED")
            } else {
                (LogNotice::warn("SYSTEM DISARMED: Effector updated."), "DISARMED")
            };
            state.push_notice(notice);
            warp::reply::json(&json!({"message": format!("Effector is now {}", status)}))
        });

    let command_route = warp::path!("api" / "command")
        .and(warp::post())
        .and(warp::body::json())
        .and(state_filter)
        .map(|body: CommandBody, state: Arc<FeedState>| {
            let status = apply_command(&state, &body.command);
            warp::reply::json(&json!({"status": status}))
        });

    telemetry_route
        .or(status_route)
        .or(settings_route)
        .or(effector_route)
        .or(command_route)
}

/// Terminal commands accepted from the console's free-text input.
fn apply_command(state: &FeedState, raw: &str) -> &'static str {
    let command = raw.trim().to_lowercase();
    state.push_notice(LogNotice::cmd(format!("> {}", command)));

    match command.as_str() {
        "/arm" => {
            state.settings.write().unwrap().effector_armed = true;
            state.push_notice(LogNotice::success("SYSTEM ARMED: Effectors online."));
            "armed"
        }
        "/disarm" | "/stop" => {
            state.settings.write().unwrap().effector_armed = false;
            state.push_notice(LogNotice::warn("EMERGENCY STOP: System disarmed."));
            "disarmed"
        }
        "/help" => {
            state.push_notice(LogNotice::info("Cmds: /arm, /disarm, /stop, /help"));
            "help"
        }
        _ => {
            state.push_notice(LogNotice::warn(format!("Unknown command: {}", command)));
            "unknown"
        }
    }
}

/// Pumps synthetic frames to one connected console until it hangs up.
async fn stream_frames(socket: warp::ws::WebSocket, state: Arc<FeedState>) {
    info!("console connected to telemetry feed");
    let (mut tx, mut rx) = socket.split();
    let mut profile = EngagementProfile::new(&state.scenario);
    let mut ticker = tokio::time::interval(state.scenario.frame_interval());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let timestamp = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|elapsed| elapsed.as_secs_f64())
                    .unwrap_or(0.0);
                let mut record = profile.frame_at(timestamp);
                if let Some(notice) = state.pop_notice() {
                    record.system_log = Some(notice.message);
                    record.log_level = Some(notice.level.to_string());
                }
                let frame = match serde_json::to_string(&record) {
                    Ok(frame) => frame,
                    Err(err) => {
                        warn!("failed to encode frame: {}", err);
                        continue;
                    }
                };
                if tx.send(warp::ws::Message::text(frame)).await.is_err() {
                    break;
                }
            }
            inbound = rx.next() => {
                match inbound {
                    Some(Ok(message)) if message.is_close() => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
        }
    }
    info!("console disconnected from telemetry feed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinelcore::feed::parse_frame;

    fn fast_scenario() -> ScenarioConfig {
        ScenarioConfig {
            rate_hz: 200.0,
            dropout_len: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn websocket_route_streams_parseable_frames() {
        let state = Arc::new(FeedState::new(fast_scenario()));
        state.push_notice(LogNotice::info("Telemetry feed online."));
        let routes = feed_routes(state);

        let mut client = warp::test::ws()
            .path("/ws/telemetry")
            .handshake(routes)
            .await
            .expect("handshake");

        let first = client.recv().await.expect("first frame");
        let record = parse_frame(first.to_str().unwrap()).unwrap();
        assert!(record.timestamp > 0.0);
        assert_eq!(record.system_log.as_deref(), Some("Telemetry feed online."));
        assert_eq!(record.log_level.as_deref(), Some("INFO"));

        let second = client.recv().await.expect("second frame");
        let record = parse_frame(second.to_str().unwrap()).unwrap();
        assert!(record.target_detected);
        assert_eq!(record.system_log, None);
    }

    #[tokio::test]
    async fn settings_route_updates_state_and_queues_notice() {
        let state = Arc::new(FeedState::new(fast_scenario()));
        let routes = feed_routes(state.clone());

        let response = warp::test::request()
            .method("POST")
            .path("/api/settings")
            .json(&json!({
                "min_confidence": 0.7,
                "target_class": "birds",
                "tracking_enabled": false,
            }))
            .reply(&routes)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let settings = state.settings.read().unwrap().clone();
        assert_eq!(settings.min_confidence, 0.7);
        assert_eq!(settings.target_class, "birds");
        assert!(!settings.autonomous_mode);
        let notice = state.pop_notice().unwrap();
        assert_eq!(notice.level, "INFO");
        assert!(notice.message.contains("BIRDS"));
    }

    #[test]
    fn commands_drive_effector_state() {
        let state = FeedState::new(fast_scenario());

        assert_eq!(apply_command(&state, " /ARM "), "armed");
        assert!(state.settings.read().unwrap().effector_armed);
        // echo first, then the outcome
        assert_eq!(state.pop_notice().unwrap().level, "CMD");
        assert_eq!(state.pop_notice().unwrap().level, "SUCCESS");

        assert_eq!(apply_command(&state, "/stop"), "disarmed");
        assert!(!state.settings.read().unwrap().effector_armed);

        assert_eq!(apply_command(&state, "/fire"), "unknown");
    }

    #[tokio::test]
    async fn status_route_reports_settings() {
        let state = Arc::new(FeedState::new(fast_scenario()));
        let routes = feed_routes(state);

        let response = warp::test::request()
            .method("GET")
            .path("/api/status")
            .reply(&routes)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["status"], "online");
        assert_eq!(body["settings"]["target_class"], "drones");
    }
}
