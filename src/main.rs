use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use log::{error, info};
use tokio::sync::mpsc;

use track_logger_rs::source::{mock_position_loop, SampleEvent, SampleLog};
use track_logger_rs::store::{buffer_file_path, JsonlStore};
use track_logger_rs::{TrackConfig, TrackRecorder};

#[derive(Parser, Debug)]
#[command(name = "track_logger")]
#[command(about = "Buffers vessel positions and writes daily/voyage GPX files", long_about = None)]
struct Args {
    /// Path to a JSON config file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay a recorded sample log instead of running the live source
    #[arg(long)]
    log: Option<PathBuf>,

    /// Data directory for the persistent buffer
    #[arg(long, default_value = "track_logger_data")]
    data_dir: PathBuf,

    /// Live mode duration in seconds (0 = continuous)
    #[arg(long, default_value = "0")]
    duration: u64,

    /// Live mode sample period in seconds
    #[arg(long, default_value = "60")]
    period: u64,

    /// Write the buffered track to a GPX file before exiting
    #[arg(long, default_value_t = false)]
    export_at_end: bool,
}

fn load_sample_log(path: &PathBuf) -> Result<SampleLog> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

fn feed(recorder: &mut TrackRecorder<JsonlStore>, event: &SampleEvent) {
    if let Err(e) = recorder.handle_sample(&event.sample, event.sog_knots, event.depth) {
        // one failed export must not stop ingestion
        error!("sample processing failed: {e}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TrackConfig::load(path)?,
        None => TrackConfig::default(),
    };
    info!("starting with config: {config:?}");

    std::fs::create_dir_all(&args.data_dir)?;
    let store = JsonlStore::open(buffer_file_path(&args.data_dir))?;
    let mut recorder = TrackRecorder::new(config, store);
    info!("{}", recorder.status());

    if let Some(log_path) = &args.log {
        let log = load_sample_log(log_path)?;
        info!("replaying {} events from {}", log.events.len(), log_path.display());
        for event in &log.events {
            feed(&mut recorder, event);
        }
    } else {
        let (tx, mut rx) = mpsc::channel::<SampleEvent>(100);
        let _source_handle = tokio::spawn(mock_position_loop(tx, args.period));

        let start = Utc::now();
        while let Some(event) = rx.recv().await {
            feed(&mut recorder, &event);
            info!("{}", recorder.status());

            if args.duration > 0 {
                let elapsed = Utc::now().signed_duration_since(start);
                if elapsed.num_seconds() as u64 >= args.duration {
                    info!("duration reached, stopping");
                    break;
                }
            }
        }
    }

    if args.export_at_end && recorder.buffer_count() > 0 {
        let record = recorder.export_now()?;
        info!("wrote {} ({} points)", record.file_path.display(), record.point_count);
    }

    println!("{}", recorder.status());
    Ok(())
}
