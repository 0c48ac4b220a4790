use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use alignify_engine::config::Config;
use alignify_engine::pose::{IndexedLandmark, LandmarkFrame, WorkoutPlan};
use alignify_engine::session::{SessionController, SessionEvent};

/// Replays a recorded landmark stream through a workout session
#[derive(Parser, Debug)]
#[command(name = "alignify-replay", version = env!("GIT_VERSION"))]
struct Args {
    /// Pipeline configuration (defaults are used when missing)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Workout plan JSON
    #[arg(long)]
    plan: PathBuf,

    /// Recorded frames, one JSON object per line
    #[arg(long)]
    frames: PathBuf,

    /// Only print the final summary
    #[arg(long, default_value_t = false)]
    quiet: bool,

    /// Stop after this many milliseconds of recording and cancel the session
    #[arg(long)]
    cancel_at_ms: Option<u64>,
}

/// One recorded detection cycle. `landmarks: null` means no body was detected.
#[derive(Debug, Deserialize)]
struct RecordedFrame {
    timestamp_ms: u64,
    #[serde(default)]
    landmarks: Option<Vec<IndexedLandmark>>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!("alignify-replay ({})", env!("GIT_VERSION"));

    let config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        Config::load_or_default(&args.config)
    };
    let plan = WorkoutPlan::load(&args.plan)?;
    tracing::info!(
        poses = plan.len(),
        mode = %config.scoring.body_focus_mode,
        "plan loaded"
    );

    let file = File::open(&args.frames)
        .with_context(|| format!("Failed to open frames {}", args.frames.display()))?;
    let reader = BufReader::new(file);

    let base = Instant::now();
    let mut session = SessionController::new(config);
    session.start(plan.poses, base)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut last_ms = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let recorded: RecordedFrame = serde_json::from_str(&line)
            .with_context(|| format!("Invalid frame on line {}", line_no + 1))?;

        if let Some(limit) = args.cancel_at_ms {
            if recorded.timestamp_ms > limit {
                break;
            }
        }

        let frame = match &recorded.landmarks {
            Some(points) => match LandmarkFrame::from_indexed(points) {
                Ok(frame) => Some(frame),
                Err(index) => {
                    tracing::warn!(line = line_no + 1, index, "landmark index out of range, frame dropped");
                    continue;
                }
            },
            None => None,
        };

        last_ms = recorded.timestamp_ms;
        let now = base + Duration::from_millis(recorded.timestamp_ms);
        let events = session.on_frame(frame.as_ref(), now);
        emit(&mut out, &events, args.quiet)?;

        if session.state().is_terminal() {
            break;
        }
    }

    if !session.state().is_terminal() {
        let cancel_ms = args.cancel_at_ms.unwrap_or(last_ms).max(last_ms);
        if let Some(event) = session.cancel(base + Duration::from_millis(cancel_ms)) {
            tracing::info!("recording ended before the workout finished");
            emit(&mut out, std::slice::from_ref(&event), args.quiet)?;
        }
    }

    if let Some(summary) = session.summary() {
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    }
    Ok(())
}

fn emit<W: Write>(out: &mut W, events: &[SessionEvent], quiet: bool) -> Result<()> {
    for event in events {
        match event {
            SessionEvent::FrameScored { .. } => {
                if quiet {
                    continue;
                }
            }
            SessionEvent::PoseCompleted { name, accuracy, .. } => {
                tracing::info!(pose = %name, accuracy, "pose completed");
            }
            _ => {}
        }
        if !quiet {
            writeln!(out, "{}", serde_json::to_string(event)?)?;
        }
    }
    Ok(())
}
