use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Parameters shaping the synthetic engagement feed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub seed: u64,
    pub rate_hz: f64,
    pub frame_count: usize,
    pub frame_width: f64,
    pub frame_height: f64,
    /// Seconds for one full sweep of the target across the frame.
    pub sweep_period_s: f64,
    /// Lead applied to the forecast position.
    pub lead_time_s: f64,
    /// Every `dropout_period` frames, the last `dropout_len` report no
    /// detection.
    pub dropout_period: usize,
    pub dropout_len: usize,
    pub noise: f64,
    pub description: Option<String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            rate_hz: 30.0,
            frame_count: 300,
            frame_width: 1280.0,
            frame_height: 720.0,
            sweep_period_s: 12.0,
            lead_time_s: 0.5,
            dropout_period: 90,
            dropout_len: 15,
            noise: 2.5,
            description: None,
        }
    }
}

impl ScenarioConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading scenario config {}", path_ref.display()))?;
        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing scenario config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(rate_hz: f64, frame_count: usize) -> Self {
        Self {
            rate_hz,
            frame_count,
            ..Default::default()
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz.max(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_frame_geometry() {
        let cfg = ScenarioConfig::from_args(60.0, 120);
        assert_eq!(cfg.rate_hz, 60.0);
        assert_eq!(cfg.frame_count, 120);
        assert_eq!(cfg.frame_width, 1280.0);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"seed: 7\nrate_hz: 15.0\ndropout_len: 0\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = ScenarioConfig::load(&path).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.rate_hz, 15.0);
        assert_eq!(cfg.dropout_len, 0);
        // unspecified fields fall back to defaults
        assert_eq!(cfg.frame_count, 300);
    }

    #[test]
    fn frame_interval_clamps_degenerate_rates() {
        let cfg = ScenarioConfig::from_args(0.0, 10);
        assert_eq!(cfg.frame_interval(), Duration::from_secs(1));
    }
}
