use anyhow::Context;
use clap::Parser;
use feed::bridge::FeedBridge;
use feed::notice::LogNotice;
use scenario::config::ScenarioConfig;
use scenario::profile::EngagementProfile;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

mod feed;
mod scenario;

#[derive(Parser)]
#[command(author, version, about = "Synthetic telemetry feed driver for the Sentinel console")]
struct Args {
    /// Emit one offline batch of frames and append a baseline summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a scenario config from YAML
    #[arg(long)]
    scenario: Option<PathBuf>,
    #[arg(long, default_value_t = 30.0)]
    rate_hz: f64,
    #[arg(long, default_value_t = 300)]
    frames: usize,
    /// Keep the feed bridge alive for console connections
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scenario = if let Some(path) = args.scenario {
        ScenarioConfig::load(path)?
    } else {
        ScenarioConfig::from_args(args.rate_hz, args.frames)
    };

    if args.offline {
        let mut profile = EngagementProfile::new(&scenario);
        let interval = scenario.frame_interval().as_secs_f64();
        let frames: Vec<_> = (0..scenario.frame_count)
            .map(|index| profile.frame_at(index as f64 * interval))
            .collect();
        let detections = frames.iter().filter(|frame| frame.target_detected).count();

        println!(
            "Offline run -> frames {}, detections {}, dropouts {}",
            frames.len(),
            detections,
            frames.len() - detections
        );

        let report = format!(
            "frames={} detections={} dropouts={} rate_hz={}\n",
            frames.len(),
            detections,
            frames.len() - detections,
            scenario.rate_hz
        );
        let report_path = PathBuf::from("tools/data/offline_feed.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(report.as_bytes())?;
    }

    if args.serve {
        let bridge = FeedBridge::new(scenario);
        bridge.push_notice(LogNotice::info("Telemetry feed online."));
        bridge.publish_status("Feed bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
