use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use clockwork_core::{
    script::load_timeline, ClockConfig, ClockSession, Recorder, RecordingSettings,
    SegmentDescriptor,
};
use tracing_subscriber::EnvFilter;

fn main() -> clockwork_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            config,
            timeline,
            fps,
            speed,
            seconds,
            output,
        } => run_play(PlayOptions {
            config: config.as_deref(),
            timeline: timeline.as_deref(),
            fps,
            speed,
            seconds,
            output,
        }),
        Commands::Timeline { config, timeline } => {
            run_timeline(config.as_deref(), timeline.as_deref())
        }
        Commands::Config => run_config(),
    }
}

struct PlayOptions<'a> {
    config: Option<&'a Path>,
    timeline: Option<&'a Path>,
    fps: u32,
    speed: Option<f32>,
    seconds: Option<f64>,
    output: Option<PathBuf>,
}

fn run_play(options: PlayOptions<'_>) -> clockwork_core::Result<()> {
    let mut session = build_session(options.config, options.timeline)?;
    if let Some(speed) = options.speed {
        session.set_speed(speed)?;
    }

    let settings = RecordingSettings {
        output_path: options.output.clone().unwrap_or_default(),
        fps: options.fps,
    };
    let step = settings.frame_interval();
    let mut recorder = Recorder::new(settings);
    if options.output.is_some() {
        recorder.start()?;
    }

    tracing::info!(
        fps = options.fps,
        speed = session.sequencer().speed(),
        limit = ?options.seconds,
        "starting headless playback"
    );

    session.play();
    let mut wall_clock = 0.0_f64;
    while session.is_playing() {
        if options.seconds.is_some_and(|limit| wall_clock >= limit) {
            break;
        }
        let frame = session.tick(step);
        recorder.capture(&frame);
        wall_clock += f64::from(step);
    }

    let progress = session.progress();
    tracing::info!(
        segment = progress.index + 1,
        of = progress.count,
        progress = progress.overall,
        wall_clock,
        "playback finished"
    );

    recorder.stop()?;
    Ok(())
}

fn run_timeline(config: Option<&Path>, timeline: Option<&Path>) -> clockwork_core::Result<()> {
    let session = build_session(config, timeline)?;
    let sequencer = session.sequencer();
    for (index, segment) in sequencer.segments().iter().enumerate() {
        let start = sequencer.segment_start(index).unwrap_or_default();
        let focus: Vec<&str> = segment.focus.iter().map(|id| id.as_str()).collect();
        println!(
            "{:>2}  {:>6.1}s  {:>5.1}s  {:<14} {:<40} [{}]",
            index + 1,
            start,
            segment.duration,
            segment.id,
            segment.narrative.title_en,
            focus.join(", ")
        );
    }
    println!("total {:.1}s", sequencer.total_duration());
    Ok(())
}

fn run_config() -> clockwork_core::Result<()> {
    println!("{}", ClockConfig::default().to_json_pretty()?);
    Ok(())
}

fn build_session(
    config: Option<&Path>,
    timeline: Option<&Path>,
) -> clockwork_core::Result<ClockSession> {
    let config = match config {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            ClockConfig::load(path)?
        }
        None => ClockConfig::default(),
    };
    let segments: Vec<SegmentDescriptor> = match timeline {
        Some(path) => {
            tracing::info!(?path, "loading timeline");
            load_timeline(path)?
        }
        None => clockwork_core::default_segments(),
    };
    ClockSession::new(config, segments)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Narrated mechanical clock explainer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play the tour headlessly at a fixed frame rate.
    Play {
        /// JSON configuration file; defaults are used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// JSON timeline replacing the built-in tour.
        #[arg(short, long)]
        timeline: Option<PathBuf>,
        /// Simulated frames per second.
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Playback speed; must be one of the configured options.
        #[arg(short, long)]
        speed: Option<f32>,
        /// Stop after this many wall-clock seconds.
        #[arg(long)]
        seconds: Option<f64>,
        /// Write every frame snapshot to this JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the segment table.
    Timeline {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        timeline: Option<PathBuf>,
    },
    /// Print the default configuration as JSON.
    Config,
}
