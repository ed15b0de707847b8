//! Interactive fractal tree controlled by the viewer's head.

use anyhow::Result;
use clap::Parser;
use interactive_fractal_tree::{
    app::{AppConfig, GuiMode, TreeApp},
    config::{CliOverrides, Config},
};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long)]
    cam: Option<i32>,

    /// Video file to play instead of the webcam
    #[arg(short, long, conflicts_with = "cam")]
    video: Option<PathBuf>,

    /// Haar cascade XML used for face detection
    #[arg(long)]
    classifier: Option<PathBuf>,

    /// GUI display mode (all, tree, none)
    #[arg(short, long)]
    gui: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Seed for branch colors
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Interactive Fractal Tree");

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).unwrap_or_else(|e| {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            })
        }
        None => Config::default(),
    };

    // Command line wins over the file
    config.apply_overrides(CliOverrides {
        camera_index: args.cam,
        video_file: args.video,
        classifier: args.classifier,
        seed: args.seed,
    });
    config.validate()?;

    let gui_mode: GuiMode = args.gui.as_deref().unwrap_or(&config.display.gui_mode).parse()?;

    let settings = AppConfig {
        config,
        gui_mode,
        max_frames: args.frames,
    };

    let mut app = TreeApp::new(settings)?;
    app.run()?;

    Ok(())
}
