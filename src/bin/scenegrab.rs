use std::{io::Write, path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use scenegrab::{
    CancellationToken, ExtractionConfig, FfmpegBackend, FfmpegLogLevel, ProgressCallback,
    ProgressInfo, RunSummary, SceneGrabError,
};

const CLI_AFTER_HELP: &str = "Examples:\n  scenegrab --video input.mp4 --outdir frames\n  scenegrab --video movie.mp4 --outdir frames --threshold 20.0\n  scenegrab --video video.mp4 --outdir frames --frames-per-scene 3 --manifest";

#[derive(Debug, Parser)]
#[command(
    name = "scenegrab",
    version,
    about = "Extract representative frames from the scenes of a video",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Path to the input video file.
    #[arg(long)]
    video: PathBuf,

    /// Directory to write the extracted frames into (created if missing).
    #[arg(long)]
    outdir: PathBuf,

    /// Scene detector threshold; larger values detect fewer cuts.
    #[arg(long, default_value_t = scenegrab::configuration::DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Number of frames to extract from each scene.
    #[arg(
        long,
        default_value_t = scenegrab::configuration::DEFAULT_FRAMES_PER_SCENE,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    frames_per_scene: u32,

    /// Minimum scene length in frames.
    #[arg(long, default_value_t = scenegrab::configuration::DEFAULT_MIN_SCENE_LENGTH)]
    min_scene_length: u64,

    /// JPEG quality (1-100).
    #[arg(
        long,
        default_value_t = scenegrab::configuration::DEFAULT_JPEG_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    quality: u8,

    /// Also write manifest.json describing scenes and frames.
    #[arg(long)]
    manifest: bool,

    /// Show a progress bar over scenes.
    #[arg(long)]
    progress: bool,

    /// Show debug logging.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, default_value_t = FfmpegLogLevel::Error)]
    ffmpeg_log_level: FfmpegLogLevel,
}

impl Cli {
    fn to_config(&self) -> ExtractionConfig {
        ExtractionConfig::new(&self.video, &self.outdir)
            .with_threshold(self.threshold)
            .with_frames_per_scene(self.frames_per_scene)
            .with_min_scene_length(self.min_scene_length)
            .with_jpeg_quality(self.quality)
            .with_manifest(self.manifest)
    }
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, indicatif::style::TemplateError> {
        let bar = ProgressBar::hidden();
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} scenes {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_start(&self, scenes_total: u64) {
        self.bar.set_length(scenes_total);
        self.bar
            .set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.scenes_done);
        self.bar
            .set_message(format!("{} frame(s)", info.frames_written));
    }

    fn on_finish(&self) {
        self.bar.finish_with_message("done");
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn run(cli: &Cli) -> Result<RunSummary, SceneGrabError> {
    scenegrab::set_ffmpeg_log_level(cli.ffmpeg_log_level);

    let config = cli.to_config().validate()?;

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(error) = ctrlc::set_handler(move || handler_token.cancel()) {
        log::warn!("Could not install interrupt handler: {error}");
    }

    let progress = if cli.progress {
        match TerminalProgress::new() {
            Ok(progress) => Some(progress),
            Err(error) => {
                log::warn!("Progress bar disabled: {error}");
                None
            }
        }
    } else {
        None
    };

    let mut backend = FfmpegBackend::new();
    scenegrab::pipeline::run(
        &config,
        &mut backend,
        &cancel,
        progress.as_ref().map(|p| p as &dyn ProgressCallback),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(summary) => {
            if summary.scenes_detected == 0 {
                println!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    "no scenes detected, nothing written".yellow()
                );
            } else {
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "Wrote {} frame(s) from {} scene(s) to {}",
                        summary.frames_written,
                        summary.scenes_detected,
                        summary.output_directory.display()
                    )
                    .green()
                );
            }
            ExitCode::SUCCESS
        }
        Err(SceneGrabError::Cancelled) => {
            log::info!("Interrupted by user");
            ExitCode::FAILURE
        }
        Err(error @ SceneGrabError::NotFound(_)) => {
            log::error!("{error}");
            ExitCode::FAILURE
        }
        Err(error) => {
            log::error!("Unexpected error: {error}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use scenegrab::FfmpegLogLevel;

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["scenegrab", "--video", "in.mp4", "--outdir", "out"])
            .unwrap();
        assert_eq!(cli.threshold, 30.0);
        assert_eq!(cli.frames_per_scene, 1);
        assert_eq!(cli.min_scene_length, 15);
        assert_eq!(cli.quality, 95);
        assert_eq!(cli.ffmpeg_log_level, FfmpegLogLevel::Error);
        assert!(!cli.manifest);

        let config = cli.to_config().validate().unwrap();
        assert_eq!(config.frames_per_scene.get(), 1);
        assert_eq!(config.video.to_str(), Some("in.mp4"));
        assert_eq!(config.output_directory.to_str(), Some("out"));
    }

    #[test]
    fn video_and_outdir_are_required() {
        assert!(Cli::try_parse_from(["scenegrab", "--outdir", "out"]).is_err());
        assert!(Cli::try_parse_from(["scenegrab", "--video", "in.mp4"]).is_err());
    }

    #[test]
    fn zero_frames_per_scene_is_rejected() {
        let result = Cli::try_parse_from([
            "scenegrab",
            "--video",
            "in.mp4",
            "--outdir",
            "out",
            "--frames-per-scene",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn custom_values_flow_into_config() {
        let cli = Cli::try_parse_from([
            "scenegrab",
            "--video",
            "movie.mkv",
            "--outdir",
            "frames",
            "--threshold",
            "20.5",
            "--frames-per-scene",
            "3",
            "--quality",
            "80",
            "--manifest",
            "--ffmpeg-log-level",
            "quiet",
        ])
        .unwrap();

        let config = cli.to_config().validate().unwrap();
        assert_eq!(config.threshold, 20.5);
        assert_eq!(config.frames_per_scene.get(), 3);
        assert_eq!(config.jpeg_quality, 80);
        assert!(config.write_manifest);
        assert_eq!(cli.ffmpeg_log_level, FfmpegLogLevel::Quiet);
    }
}
