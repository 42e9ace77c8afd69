//! Chew Monitor - replay entry point
//!
//! Replays a JSON-lines capture through the monitor service. Each line is
//! either `{"frame": {"timestamp_ms": 0, "landmarks": [...]}}` (omit
//! `landmarks` when no face was found) or `{"control": "start"}` with
//! `start`, `pause` or `reset`. The final session record is printed as JSON.

use anyhow::Context;
use clap::Parser;
use face_landmarks::LandmarkFrame;
use monitor::{
    init_logging, ChewMonitor, Clock, ManualClock, MonitorService, MonotonicClock, Settings,
};
use serde::Deserialize;
use session::SessionSink;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storage::HistoryRepository;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Replay recorded face landmarks through the chew monitor
#[derive(Parser)]
#[command(name = "chew-monitor")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON-lines capture to replay
    replay: PathBuf,

    /// Settings file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ignore frame timestamps and replay as fast as possible
    #[arg(long)]
    fast: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ReplayLine {
    Frame(ReplayFrame),
    Control(Control),
}

#[derive(Debug, Deserialize)]
struct ReplayFrame {
    timestamp_ms: u64,
    #[serde(default)]
    landmarks: Option<LandmarkFrame>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Control {
    Start,
    Pause,
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    init_logging(&settings.log_level, settings.log_json)?;

    info!("=== Chew Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    // Fast replay runs the session clock on frame timestamps
    let manual = Arc::new(ManualClock::new(0));
    let clock: Arc<dyn Clock> = if cli.fast {
        manual.clone()
    } else {
        Arc::new(MonotonicClock::new())
    };

    let history = Arc::new(HistoryRepository::new());
    let sink: Arc<dyn SessionSink> = history.clone();
    let monitor = ChewMonitor::new(settings.detector.clone(), clock.clone())?;
    let service = MonitorService::spawn(monitor, &settings, Some(sink));

    let mut snapshots = service.subscribe();
    let mut feedback = service.subscribe_feedback();
    let reporter = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = *snapshots.borrow_and_update();
                    info!(
                        "{:?}: {} chews, {} ({} per minute)",
                        snapshot.status,
                        snapshot.stats.chew_count,
                        snapshot.stats.elapsed_display(),
                        snapshot.stats.pace
                    );
                }
                changed = feedback.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = *feedback.borrow_and_update();
                    info!("{}: {}", state.label, state.message);
                }
            }
        }
    });

    let file = tokio::fs::File::open(&cli.replay)
        .await
        .with_context(|| format!("opening {}", cli.replay.display()))?;
    let mut lines = BufReader::new(file).lines();
    let mut first_timestamp: Option<u64> = None;
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let entry: ReplayLine = match serde_json::from_str(&line) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Line {}: {}", line_no, e);
                continue;
            }
        };

        match entry {
            ReplayLine::Frame(frame) => {
                let origin = *first_timestamp.get_or_insert(frame.timestamp_ms);
                let offset = frame.timestamp_ms.saturating_sub(origin);
                if cli.fast {
                    manual.set(offset);
                } else {
                    let lag = offset.saturating_sub(clock.now_ms());
                    if lag > 0 {
                        tokio::time::sleep(Duration::from_millis(lag)).await;
                    }
                }
                service.push_frame(frame.landmarks, frame.timestamp_ms).await?;
            }
            ReplayLine::Control(control) => {
                let result = match control {
                    Control::Start => service.start().await,
                    Control::Pause => service.pause().await,
                    Control::Reset => service.reset().await,
                };
                if let Err(e) = result {
                    warn!("Line {}: {:?} rejected: {}", line_no, control, e);
                }
            }
        }
    }

    match service.finish().await {
        Ok(record) => println!("{}", serde_json::to_string(&record)?),
        Err(e) => warn!("No session to finish: {}", e),
    }

    let level = history.level()?;
    info!(
        "Level {} ({:.0}% to next, {} chews total)",
        level.level, level.progress, level.current
    );

    service.shutdown().await;
    reporter.abort();
    Ok(())
}
