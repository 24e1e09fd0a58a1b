use rand::{rngs::StdRng, Rng, SeedableRng};
use sentinelcore::feed::TelemetryRecord;
use std::f64::consts::PI;

use super::config::ScenarioConfig;

/// Steps a synthetic target across the frame.
///
/// The target sweeps left to right on a sine path with measurement jitter;
/// the forecast leads the observed position along the path tangent. Dropout
/// windows report no detection with null coordinates, matching what the
/// vision pipeline emits when it loses the track.
pub struct EngagementProfile {
    config: ScenarioConfig,
    rng: StdRng,
    frame_index: usize,
}

impl EngagementProfile {
    pub fn new(config: &ScenarioConfig) -> Self {
        Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(config.seed),
            frame_index: 0,
        }
    }

    fn in_dropout(&self) -> bool {
        if self.config.dropout_len == 0 {
            return false;
        }
        let period = self.config.dropout_period.max(1);
        (self.frame_index % period) + self.config.dropout_len >= period
    }

    /// Builds the frame stamped with the given wall-clock timestamp.
    pub fn frame_at(&mut self, timestamp: f64) -> TelemetryRecord {
        let record = if self.in_dropout() {
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
        } else {
            self.detection_at(timestamp)
        };
        self.frame_index += 1;
        record
    }

    fn detection_at(&mut self, timestamp: f64) -> TelemetryRecord {
        let config = &self.config;
        let elapsed = self.frame_index as f64 / config.rate_hz.max(1.0);
        let period = config.sweep_period_s.max(0.1);
        let sweep = (elapsed / period) % 1.0;
        let angle = sweep * 2.0 * PI;

        let x = sweep * config.frame_width;
        let y = config.frame_height * (0.5 + 0.35 * angle.sin());
        let speed_x = config.frame_width / period;
        let speed_y = config.frame_height * 0.35 * 2.0 * PI * angle.cos() / period;

        let jitter = config.noise.abs();
        let jitter_x = self.rng.gen_range(-jitter..=jitter);
        let jitter_y = self.rng.gen_range(-jitter..=jitter);

        TelemetryRecord {
            timestamp,
            target_detected: true,
            current_x: Some(x + jitter_x),
            current_y: Some(y + jitter_y),
            predicted_x: Some(x + speed_x * config.lead_time_s),
            predicted_y: Some(y + speed_y * config.lead_time_s),
            confidence: Some(self.rng.gen_range(0.82..0.99)),
            closing_velocity: Some(speed_x.hypot(speed_y)),
            distance: Some(120.0 + 60.0 * angle.cos()),
            system_log: None,
            log_level: None,
        }
    }
}
