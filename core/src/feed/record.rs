use crate::prelude::StreamResult;
use serde::{Deserialize, Serialize};

/// Severity tags observed on the wire for log-bearing records.
///
/// The backend emits free text; unknown tags read as `Info` so a cosmetic
/// field can never cause a frame to be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Info,
    Warn,
    Cmd,
    Success,
}

impl LogSeverity {
    pub fn classify(tag: &str) -> Self {
        match tag {
            "WARN" => Self::Warn,
            "CMD" => Self::Cmd,
            "SUCCESS" => Self::Success,
            _ => Self::Info,
        }
    }
}

/// One inbound telemetry unit: a positional sample, a log event, or both.
///
/// Nullable numerics deserialize to `None`, never to zero; zero is a valid
/// coordinate. Records are immutable once parsed off the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub timestamp: f64,
    pub target_detected: bool,
    pub current_x: Option<f64>,
    pub current_y: Option<f64>,
    pub predicted_x: Option<f64>,
    pub predicted_y: Option<f64>,
    pub confidence: Option<f64>,
    pub closing_velocity: Option<f64>,
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl TelemetryRecord {
    /// Observed position, present only when both coordinates are.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.current_x.zip(self.current_y)
    }

    /// Forecast position, independent of the observed pair.
    pub fn predicted(&self) -> Option<(f64, f64)> {
        self.predicted_x.zip(self.predicted_y)
    }

    pub fn has_fix(&self) -> bool {
        self.position().is_some()
    }

    /// True when the record carries a line for the operator log feed.
    pub fn is_log_event(&self) -> bool {
        self.system_log.is_some()
    }

    pub fn severity(&self) -> LogSeverity {
        self.log_level
            .as_deref()
            .map(LogSeverity::classify)
            .unwrap_or(LogSeverity::Info)
    }
}

/// Parses one UTF-8 stream frame into a record.
pub fn parse_frame(frame: &str) -> StreamResult<TelemetryRecord> {
    Ok(serde_json::from_str(frame)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_detection_frame() {
        let frame = r#"{
            "timestamp": 1717.25,
            "target_detected": true,
            "current_x": 640.0,
            "current_y": 360.0,
            "predicted_x": 652.5,
            "predicted_y": 371.0,
            "confidence": 0.93,
            "closing_velocity": 4.2,
            "distance": 118.0
        }"#;

        let record = parse_frame(frame).unwrap();
        assert!(record.target_detected);
        assert_eq!(record.position(), Some((640.0, 360.0)));
        assert_eq!(record.predicted(), Some((652.5, 371.0)));
        assert!(record.has_fix());
        assert!(!record.is_log_event());
    }

    #[test]
    fn null_coordinates_stay_unknown() {
        let frame = r#"{
            "timestamp": 2.0,
            "target_detected": false,
            "current_x": null,
            "current_y": null,
            "predicted_x": null,
            "predicted_y": null,
            "confidence": null,
            "closing_velocity": null,
            "distance": null
        }"#;

        let record = parse_frame(frame).unwrap();
        assert_eq!(record.position(), None);
        assert_eq!(record.predicted(), None);
        assert_eq!(record.confidence, None);
    }

    #[test]
    fn zero_is_a_valid_coordinate() {
        let frame = r#"{
            "timestamp": 3.0,
            "target_detected": true,
            "current_x": 0.0,
            "current_y": 0.0,
            "predicted_x": null,
            "predicted_y": null,
            "confidence": 0.9,
            "closing_velocity": null,
            "distance": null
        }"#;

        let record = parse_frame(frame).unwrap();
        assert_eq!(record.position(), Some((0.0, 0.0)));
        assert_eq!(record.predicted(), None);
    }

    #[test]
    fn log_only_record_is_both_parseable_and_flagged() {
        let frame = r#"{
            "timestamp": 4.0,
            "target_detected": false,
            "current_x": null,
            "current_y": null,
            "predicted_x": null,
            "predicted_y": null,
            "confidence": null,
            "closing_velocity": null,
            "distance": null,
            "system_log": "SYSTEM ARMED: Effectors online.",
            "log_level": "SUCCESS"
        }"#;

        let record = parse_frame(frame).unwrap();
        assert!(record.is_log_event());
        assert!(!record.has_fix());
        assert_eq!(record.severity(), LogSeverity::Success);
    }

    #[test]
    fn missing_log_fields_default_to_none() {
        let frame = r#"{
            "timestamp": 5.0,
            "target_detected": false,
            "current_x": null,
            "current_y": null,
            "predicted_x": null,
            "predicted_y": null,
            "confidence": null,
            "closing_velocity": null,
            "distance": null
        }"#;

        let record = parse_frame(frame).unwrap();
        assert_eq!(record.system_log, None);
        assert_eq!(record.severity(), LogSeverity::Info);
    }

    #[test]
    fn malformed_frame_is_an_error_not_a_panic() {
        assert!(parse_frame("{not json").is_err());
        assert!(parse_frame(r#"{"timestamp": "late"}"#).is_err());
    }

    #[test]
    fn unknown_severity_tag_reads_as_info() {
        assert_eq!(LogSeverity::classify("VERBOSE"), LogSeverity::Info);
        assert_eq!(LogSeverity::classify("WARN"), LogSeverity::Warn);
        assert_eq!(LogSeverity::classify("CMD"), LogSeverity::Cmd);
    }
}
