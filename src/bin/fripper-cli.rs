use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use clap::{Parser, Subcommand};
use colored::Colorize;
use fripper::{
    BrowserSession, ExtractionDispatcher, FrameSequence, FripperError, SimilarityStrategy,
    SurfaceEvent, TerminalSurface, Timestamp,
    browser::BrowserAction,
    dedupe,
    display::DisplaySurface,
    extract::grab_frame,
    keymap::terminal_default_keymap,
    run_browser,
    thumbnail::{grab_thumbnails, thumbnail_grid},
};
use indicatif::{ProgressBar, ProgressStyle};

const CLI_AFTER_HELP: &str = "Examples:\n  fripper split video.mp4 --fps 4\n  fripper split video.mp4 --fps 60 --start 00:01:30.000 --duration 2\n  fripper grab video.mp4 --timestamp 00:00:05.000\n  fripper preview video.mp4 --thumbnails\n  fripper dedupe video.mp4 --strategy ssim --output clean.mkv";

#[derive(Debug, Parser)]
#[command(
    name = "fripper",
    version,
    about = "Browse, grab, clip, and dedupe video frames via ffmpeg",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Show additional output.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rip frames into a scoped temp directory and browse them
    /// interactively.
    #[command(
        about = "Split frames from a video and browse them",
        after_help = "Keys:\n  q quit | arrows step | s grab frame | [ ] mark start/end\n  c extract clip | t fixed-length clip | o walk clips | d delete crop\n  space nested 60fps split one second back\nMouse: drag a crop box (shift = 512x512), click the bottom bar to scrub."
    )]
    Split {
        /// Path to the video to split.
        video: PathBuf,
        /// Frames per second to extract.
        #[arg(long, default_value_t = 4)]
        fps: u32,
        /// Position in the video to start the split (HH:MM:SS.mmm).
        #[arg(long, value_parser = parse_timestamp)]
        start: Option<Timestamp>,
        /// Seconds of video to rip when --start is given.
        #[arg(long)]
        duration: Option<f64>,
        /// Use NVIDIA hardware acceleration.
        #[arg(long)]
        nvidia: bool,
    },

    /// Grab a single frame (or a thumbnail set) from a video.
    #[command(
        about = "Grab a single frame from a video",
        after_help = "Examples:\n  fripper grab video.mp4 --timestamp 00:00:05.000\n  fripper grab video.mp4 --thumbnails --output-path shots/"
    )]
    Grab {
        /// Path to the video.
        video: PathBuf,
        /// Timestamp to extract the frame at (HH:MM:SS.mmm).
        #[arg(long, default_value = "00:00:00.000", value_parser = parse_timestamp)]
        timestamp: Timestamp,
        /// Directory to write the output into (defaults to the current
        /// directory).
        #[arg(long)]
        output_path: Option<PathBuf>,
        /// Grab evenly spaced thumbnails instead of a single frame.
        #[arg(long)]
        thumbnails: bool,
    },

    /// Preview a frame (or a thumbnail sheet) in the terminal.
    #[command(about = "Preview a single frame of a video")]
    Preview {
        /// Path to the video.
        video: PathBuf,
        /// Timestamp to extract the frame at (HH:MM:SS.mmm).
        #[arg(long, default_value = "00:00:00.000", value_parser = parse_timestamp)]
        timestamp: Timestamp,
        /// Display a thumbnail contact sheet instead.
        #[arg(long)]
        thumbnails: bool,
    },

    /// Detect and remove runs of duplicated frames.
    #[command(
        about = "Remove duplicate frame runs from a video",
        after_help = "Examples:\n  fripper dedupe video.mp4\n  fripper dedupe video.mp4 --strategy ssim --min-run 5 --output clean.mkv"
    )]
    Dedupe {
        /// Path to the video.
        video: PathBuf,
        /// Similarity measure: histogram | ssim.
        #[arg(long, default_value = "histogram", value_parser = parse_strategy)]
        strategy: SimilarityStrategy,
        /// Minimum consecutive-run length to treat as a real duplicate
        /// stretch.
        #[arg(long, default_value_t = dedupe::DEFAULT_MIN_RUN)]
        min_run: usize,
        /// Output path for the rebuilt video.
        #[arg(long, default_value = "output.mkv")]
        output: PathBuf,
    },
}

fn parse_timestamp(value: &str) -> Result<Timestamp, String> {
    value.parse().map_err(|error: FripperError| error.to_string())
}

fn parse_strategy(value: &str) -> Result<SimilarityStrategy, String> {
    match value.to_ascii_lowercase().as_str() {
        "histogram" | "hist" => Ok(SimilarityStrategy::Histogram),
        "ssim" | "structural" => Ok(SimilarityStrategy::Ssim),
        other => Err(format!("unknown strategy {other:?} (expected histogram or ssim)")),
    }
}

fn install_interrupt_flag() -> Result<Arc<AtomicBool>, FripperError> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
        .map_err(|error| std::io::Error::other(error.to_string()))?;
    Ok(interrupted)
}

fn run() -> Result<(), FripperError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Split {
            video,
            fps,
            start,
            duration,
            nvidia,
        } => {
            if nvidia {
                println!("Using NVIDIA acceleration");
            }
            let interrupted = install_interrupt_flag()?;

            println!("Ripping {} at {fps} fps...", video.display());
            let sequence = FrameSequence::materialize(&video, fps, start, duration, nvidia)?;
            println!(
                "{} frames extracted to {}",
                sequence.len(),
                sequence.directory().display(),
            );

            let mut session = BrowserSession::new(
                &video,
                sequence.fps(),
                sequence.len(),
                sequence.start_offset(),
            );
            let dispatcher = ExtractionDispatcher::spawn()?;
            let keymap = terminal_default_keymap();
            let mut surface = TerminalSurface::new()?;
            run_browser(
                &mut session,
                &sequence,
                &mut surface,
                &keymap,
                &dispatcher,
                &interrupted,
            )?;
            // Surface drop restores the terminal; sequence drop removes
            // the frame directory.
        }

        Commands::Grab {
            video,
            timestamp,
            output_path,
            thumbnails,
        } => {
            if thumbnails {
                let paths = grab_thumbnails(&video, output_path.as_deref())?;
                for path in &paths {
                    println!("{}", path.display());
                }
            } else {
                let path = grab_frame(&video, timestamp, output_path.as_deref(), None)?;
                println!("{}", path.display());
            }
        }

        Commands::Preview {
            video,
            timestamp,
            thumbnails,
        } => {
            let temp_dir = tempfile::TempDir::new()?;
            let (frame, label) = if thumbnails {
                let paths = grab_thumbnails(&video, Some(temp_dir.path()))?;
                (thumbnail_grid(&paths)?, "Thumbnails (q to close)".to_string())
            } else {
                let path = grab_frame(&video, timestamp, Some(temp_dir.path()), None)?;
                (
                    image::open(path)?.to_rgb8(),
                    format!("{timestamp} (q to close)"),
                )
            };

            let interrupted = install_interrupt_flag()?;
            let keymap = terminal_default_keymap();
            let mut surface = TerminalSurface::new()?;
            surface.show_frame(
                &frame,
                &fripper::FrameOverlay {
                    label: &label,
                    rect: None,
                    slider: None,
                },
            )?;
            while !interrupted.load(Ordering::Relaxed) {
                match surface.poll_event(Duration::from_millis(100))? {
                    Some(SurfaceEvent::Key(code))
                        if keymap.resolve(&code) == Some(BrowserAction::Quit) =>
                    {
                        break;
                    }
                    Some(SurfaceEvent::Redraw) => surface.show_frame(
                        &frame,
                        &fripper::FrameOverlay {
                            label: &label,
                            rect: None,
                            slider: None,
                        },
                    )?,
                    _ => {}
                }
            }
        }

        Commands::Dedupe {
            video,
            strategy,
            min_run,
            output,
        } => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.set_message("comparing frames...");

            let report = dedupe::remove_duplicates(&video, &output, strategy, min_run, |index| {
                bar.set_message(format!("compared {index} frame pairs"));
                bar.tick();
            })?;
            bar.finish_and_clear();

            println!(
                "{} removed {} of {} frames -> {}",
                "done:".green().bold(),
                report.removed.len(),
                report.total_frames,
                output.display(),
            );
            if cli.verbose {
                println!("candidates before run filtering: {:?}", report.candidates);
                println!("removed indices: {:?}", report.removed);
            }
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
