use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Subscription, Task, Theme,
};
use sentinelcore::feed::{LogSeverity, TelemetryRecord};
use sentinelcore::store::{StoreSnapshot, TelemetryStore};
use sentinelcore::stream::StreamClient;
use sentinelcore::StreamConfig;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};

const COMMAND_API_BASE: &str = "http://127.0.0.1:8000/api";

// pixel space of the backend camera frame
const FRAME_WIDTH: f32 = 1280.0;
const FRAME_HEIGHT: f32 = 720.0;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Console::boot, Console::update, Console::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Console) -> String {
    "Sentinel Console".into()
}

fn application_subscription(_: &Console) -> Subscription<Message> {
    time::every(Duration::from_millis(100)).map(|_| Message::Tick)
}

fn application_theme(_: &Console) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Console {
    store: Arc<TelemetryStore>,
    _stream: StreamClient,
    snapshot: StoreSnapshot,
    settings: SettingsForm,
    command_line: String,
    status: String,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    SettingsFieldChanged(SettingsField, String),
    ToggleAutonomous,
    SubmitSettings,
    SettingsSubmitted(Option<Value>),
    CommandLineChanged(String),
    SubmitCommand,
    CommandSubmitted(Option<Value>),
    SetEffector(bool),
    EffectorSubmitted(Option<Value>),
}

#[derive(Debug, Clone, Copy)]
enum SettingsField {
    Confidence,
    TargetClass,
}

impl Console {
    fn boot() -> (Self, Task<Message>) {
        let config = StreamConfig::default();
        let store = Arc::new(TelemetryStore::new(config.history_capacity));
        let stream = StreamClient::new(config, store.clone());
        stream.connect();
        let snapshot = store.snapshot();
        (
            Console {
                store,
                _stream: stream,
                snapshot,
                settings: SettingsForm::default(),
                command_line: String::new(),
                status: "Waiting for telemetry...".into(),
            },
            Task::none(),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                state.snapshot = state.store.snapshot();
                Task::none()
            }
            Message::SettingsFieldChanged(field, value) => {
                state.settings.update_field(field, value);
                Task::none()
            }
            Message::ToggleAutonomous => {
                state.settings.autonomous = !state.settings.autonomous;
                Task::none()
            }
            Message::SubmitSettings => {
                let payload = state.settings.to_payload();
                Task::perform(post_json("settings", payload), Message::SettingsSubmitted)
            }
            Message::SettingsSubmitted(Some(_)) => {
                state.status = "Settings accepted".into();
                Task::none()
            }
            Message::SettingsSubmitted(None) => {
                state.status = "Settings dispatch failed".into();
                Task::none()
            }
            Message::CommandLineChanged(value) => {
                state.command_line = value;
                Task::none()
            }
            Message::SubmitCommand => {
                let command = state.command_line.trim().to_string();
                if command.is_empty() {
                    return Task::none();
                }
                state.command_line.clear();
                Task::perform(
                    post_json("command", json!({ "command": command })),
                    Message::CommandSubmitted,
                )
            }
            Message::CommandSubmitted(Some(reply)) => {
                let status = reply
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or("ok")
                    .to_string();
                state.status = format!("Command ack: {}", status);
                Task::none()
            }
            Message::CommandSubmitted(None) => {
                state.status = "Command dispatch failed".into();
                Task::none()
            }
            Message::SetEffector(arm) => Task::perform(
                post_json("effector", json!({ "arm": arm })),
                Message::EffectorSubmitted,
            ),
            Message::EffectorSubmitted(Some(reply)) => {
                state.status = reply
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Effector updated")
                    .to_string();
                Task::none()
            }
            Message::EffectorSubmitted(None) => {
                state.status = "Effector dispatch failed".into();
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let snapshot = &state.snapshot;

        let control_column = column![
            text("Engagement Settings").size(26),
            text_input("Min confidence (%)", &state.settings.confidence)
                .on_input(|value| Message::SettingsFieldChanged(SettingsField::Confidence, value))
                .padding(6),
            text_input("Target class", &state.settings.target_class)
                .on_input(|value| Message::SettingsFieldChanged(SettingsField::TargetClass, value))
                .padding(6),
            button(if state.settings.autonomous {
                "MODE: AUTONOMOUS"
            } else {
                "MODE: MANUAL"
            })
            .on_press(Message::ToggleAutonomous)
            .padding(6),
            button("POST settings")
                .on_press(Message::SubmitSettings)
                .padding(10),
            row![
                button("ARM").on_press(Message::SetEffector(true)).padding(6),
                button("DISARM")
                    .on_press(Message::SetEffector(false))
                    .padding(6),
            ]
            .spacing(8),
            text("Terminal").size(18),
            text_input("/arm, /disarm, /stop, /help", &state.command_line)
                .on_input(Message::CommandLineChanged)
                .on_submit(Message::SubmitCommand)
                .padding(6),
            button("SEND").on_press(Message::SubmitCommand).padding(6),
            text(&state.status).size(14),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(320.0));

        let link_line = if snapshot.connected {
            text("LINK: CONNECTED").size(18)
        } else {
            text("LINK: OFFLINE").size(18)
        };

        let target_line = if let Some(latest) = snapshot.latest.as_ref() {
            if latest.target_detected {
                text(format!(
                    "Target {} -> predicted {} | confidence {} | closing {} m/s | range {} m",
                    format_coordinate(latest.position()),
                    format_coordinate(latest.predicted()),
                    format_scalar(latest.confidence),
                    format_scalar(latest.closing_velocity),
                    format_scalar(latest.distance),
                ))
                .size(14)
            } else {
                text("Target: none (scanning)").size(14)
            }
        } else {
            text("Target: n/a").size(14)
        };

        let trajectory = Canvas::new(TrajectoryMap::new(&snapshot.history))
            .width(Length::Fill)
            .height(Length::Fixed(320.0));

        let range_trace = Canvas::new(RangeTrace::new(&snapshot.history))
            .width(Length::Fill)
            .height(Length::Fixed(120.0));

        let log_entries = {
            let entries: Vec<&TelemetryRecord> = snapshot
                .history
                .iter()
                .filter(|record| record.is_log_event())
                .collect();
            if entries.is_empty() {
                Column::new().push(text("No log activity yet").size(12))
            } else {
                entries
                    .iter()
                    .rev()
                    .take(30)
                    .fold(Column::new().spacing(4), |col, record| {
                        let line = record.system_log.clone().unwrap_or_default();
                        let tag = match record.severity() {
                            LogSeverity::Warn => "WARN",
                            LogSeverity::Cmd => "CMD",
                            LogSeverity::Success => "OK",
                            LogSeverity::Info => "INFO",
                        };
                        col.push(text(format!("[{}] {}", tag, line)).size(12))
                    })
            }
        };

        let telemetry_column = column![
            text("Telemetry").size(26),
            link_line,
            target_line,
            text("Trajectory (observed path, forecast marker)").size(16),
            trajectory,
            text("Range trace").size(16),
            range_trace,
            text("Live log").size(16),
            Container::new(scrollable(log_entries).height(Length::Fixed(140.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![control_column, telemetry_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }
}

/// Fire-and-forget command dispatch: JSON POST, `None` on any failure.
async fn post_json(route: &'static str, body: Value) -> Option<Value> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/{}", COMMAND_API_BASE, route))
        .json(&body)
        .send()
        .await;
    match response {
        Ok(response) => match response.json::<Value>().await {
            Ok(value) => Some(value),
            Err(err) => {
                log::error!("command response decode failed: {}", err);
                None
            }
        },
        Err(err) => {
            log::error!("command dispatch failed: {}", err);
            None
        }
    }
}

fn format_coordinate(value: Option<(f64, f64)>) -> String {
    match value {
        Some((x, y)) => format!("({:.0}, {:.0})", x, y),
        None => "--".into(),
    }
}

fn format_scalar(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.2}", value),
        None => "--".into(),
    }
}

#[derive(Debug, Clone)]
struct SettingsForm {
    confidence: String,
    target_class: String,
    autonomous: bool,
}

impl SettingsForm {
    fn default() -> Self {
        Self {
            confidence: "85".into(),
            target_class: "drones".into(),
            autonomous: true,
        }
    }

    fn update_field(&mut self, field: SettingsField, value: String) {
        match field {
            SettingsField::Confidence => self.confidence = value,
            SettingsField::TargetClass => self.target_class = value,
        }
    }

    fn to_payload(&self) -> Value {
        json!({
            "min_confidence": self.confidence.parse::<f64>().unwrap_or(85.0) / 100.0,
            "target_class": self.target_class,
            "tracking_enabled": self.autonomous,
        })
    }
}

#[derive(Clone)]
struct TrajectoryMap {
    history: Vec<TelemetryRecord>,
}

impl TrajectoryMap {
    fn new(history: &[TelemetryRecord]) -> Self {
        Self {
            history: history.to_vec(),
        }
    }
}

impl canvas::Program<Message> for TrajectoryMap {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.02, 0.02, 0.04),
        );

        let scale_x = bounds.width / FRAME_WIDTH;
        let scale_y = bounds.height / FRAME_HEIGHT;

        let grid = Path::new(|builder| {
            let mut x = 160.0;
            while x < FRAME_WIDTH {
                builder.move_to(Point::new(x * scale_x, 0.0));
                builder.line_to(Point::new(x * scale_x, bounds.height));
                x += 160.0;
            }
            let mut y = 120.0;
            while y < FRAME_HEIGHT {
                builder.move_to(Point::new(0.0, y * scale_y));
                builder.line_to(Point::new(bounds.width, y * scale_y));
                y += 120.0;
            }
        });
        frame.stroke(
            &grid,
            Stroke::default()
                .with_width(1.0)
                .with_color(Color::from_rgb(0.12, 0.12, 0.16)),
        );

        let observed: Vec<Point> = self
            .history
            .iter()
            .filter_map(|record| record.position())
            .map(|(x, y)| Point::new(x as f32 * scale_x, y as f32 * scale_y))
            .collect();

        if observed.len() > 1 {
            let path = Path::new(|builder| {
                for (index, point) in observed.iter().enumerate() {
                    if index == 0 {
                        builder.move_to(*point);
                    } else {
                        builder.line_to(*point);
                    }
                }
            });
            frame.stroke(
                &path,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(Color::from_rgb(0.18, 0.72, 0.89)),
            );
        }

        if let Some(last) = observed.last() {
            let marker = Path::new(|builder| builder.circle(*last, 6.0));
            frame.fill(&marker, Color::from_rgb(0.95, 0.55, 0.2));
        }

        // forecast marker only while the latest frame carries one
        if let Some((x, y)) = self.history.last().and_then(|record| record.predicted()) {
            let point = Point::new(x as f32 * scale_x, y as f32 * scale_y);
            let marker = Path::new(|builder| builder.circle(point, 5.0));
            frame.stroke(
                &marker,
                Stroke::default()
                    .with_width(1.5)
                    .with_color(Color::from_rgb(0.4, 0.9, 0.4)),
            );
        }

        vec![frame.into_geometry()]
    }
}

#[derive(Clone)]
struct RangeTrace {
    data: Vec<f32>,
}

impl RangeTrace {
    fn new(history: &[TelemetryRecord]) -> Self {
        Self {
            data: history
                .iter()
                .filter_map(|record| record.distance)
                .map(|distance| distance as f32)
                .collect(),
        }
    }
}

impl canvas::Program<Message> for RangeTrace {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        if self.data.len() > 1 {
            let min = self.data.iter().cloned().fold(f32::INFINITY, f32::min);
            let max = self.data.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let range = (max - min).max(1.0);
            let step = bounds.width / (self.data.len() as f32 - 1.0);
            let path = Path::new(|builder| {
                for (index, value) in self.data.iter().enumerate() {
                    let x = index as f32 * step;
                    let normalized = (value - min) / range;
                    let y = bounds.height - normalized * bounds.height;
                    if index == 0 {
                        builder.move_to(Point::new(x, y));
                    } else {
                        builder.line_to(Point::new(x, y));
                    }
                }
            });

            frame.stroke(
                &path,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(Color::from_rgb(0.18, 0.72, 0.89)),
            );
        }

        vec![frame.into_geometry()]
    }
}
