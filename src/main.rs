use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use vclick::constants::DEFAULT_PLOT_SIZE;
use vclick::video::SyntheticVideo;
use vclick::{AppConfig, CoordSpace, LogLevel, ScatterPlot, Session, Shell};

/// Click annotation for video frames.
#[derive(Debug, Parser)]
#[command(author, version, about = "Calibrated click annotation for video frames")]
struct Args {
    /// Log level (error, warn, info, debug, trace). Defaults to the configured level.
    #[arg(long, global = true, value_parser = parse_log_level)]
    log_level: Option<LogLevel>,

    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Annotate a video interactively (the default).
    Annotate {
        /// Video file, folder of frame images, or a single image.
        video: Option<PathBuf>,

        /// Use a generated video with this many frames instead of a file.
        #[arg(long, conflicts_with = "video")]
        demo: Option<usize>,
    },

    /// Scatter-plot the points of one frame of a click file.
    Plot {
        /// Click file written by `save`.
        file: PathBuf,

        /// 0-based frame index.
        #[arg(long, default_value_t = 0)]
        frame: usize,

        /// Plot pixel coordinates instead of calibrated ones.
        #[arg(long)]
        raw: bool,

        /// Output image path.
        #[arg(short, long, default_value = "clicks.png")]
        output: PathBuf,

        #[arg(long, default_value_t = DEFAULT_PLOT_SIZE.0)]
        width: u32,

        #[arg(long, default_value_t = DEFAULT_PLOT_SIZE.1)]
        height: u32,
    },
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::parse(value).ok_or_else(|| format!("unknown log level '{value}'"))
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(AppConfig::default_path);
    let config = match &args.config {
        Some(path) if path.exists() => AppConfig::load_from(path)?,
        Some(_) => AppConfig::default(),
        None => AppConfig::load_from_default_path().unwrap_or_default(),
    };

    init_logging(args.log_level, config.preferences.log_level);

    match args.command {
        None => annotate(config, config_path, None, None),
        Some(Commands::Annotate { video, demo }) => annotate(config, config_path, video, demo),
        Some(Commands::Plot {
            file,
            frame,
            raw,
            output,
            width,
            height,
        }) => plot(&file, frame, raw, &output, width, height),
    }
}

fn init_logging(cli_level: Option<LogLevel>, configured: LogLevel) {
    match cli_level {
        Some(level) => env_logger::Builder::new()
            .filter_level(level.to_level_filter())
            .init(),
        None => env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(configured.name()),
        )
        .init(),
    }
}

fn annotate(
    config: AppConfig,
    config_path: Option<PathBuf>,
    video: Option<PathBuf>,
    demo: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let mut session = Session::with_settings(config.display);

    if let Some(frames) = demo {
        session.attach_video(Box::new(SyntheticVideo::with_frames(frames)))?;
    } else if let Some(path) = &video {
        session.load_video(path)?;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell =
        Shell::new(session, stdin.lock(), stdout.lock()).with_config(config, config_path);
    if let (None, Some(path)) = (demo, &video) {
        shell.remember_video(path);
    }
    shell.run()?;
    Ok(())
}

fn plot(
    file: &std::path::Path,
    frame: usize,
    raw: bool,
    output: &std::path::Path,
    width: u32,
    height: u32,
) -> Result<(), Box<dyn Error>> {
    let data = vclick::format::load_click_data(file)?;
    let space = if raw { CoordSpace::Raw } else { CoordSpace::Real };

    let plot = ScatterPlot::for_frame(&data, space, frame)?;
    plot.save(output, width, height)?;

    println!("{}", plot.title());
    println!("  x: {}", plot.x_label());
    println!("  y: {}", plot.y_label());
    println!(
        "  {} points from {} written to {}",
        plot.points.len(),
        space.field(),
        output.display()
    );
    Ok(())
}
