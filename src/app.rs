//! Main application module: the update / draw / key loop.

use crate::{
    capture::{VideoInput, VideoSource},
    config::Config,
    constants::{KEY_ESCAPE, KEY_QUIT, KEY_SPACE},
    face_detection::{BlobDetector, FaceBlob, HaarFaceDetector},
    head_tracker::HeadTracker,
    interaction::FrameState,
    palette::Background,
    render::{camera_preview, draw_fps, TreeRenderer},
    tree::grow_tree,
    utils::safe_cast::u32_to_i32,
    Error, Result,
};
use log::{debug, info, warn};
use opencv::{
    core::Mat,
    highgui::{self, WINDOW_AUTOSIZE, WINDOW_NORMAL},
    prelude::*,
};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    str::FromStr,
    time::{Duration, Instant},
};

const TREE_WINDOW: &str = "Interactive Fractal Tree";
const CAMERA_WINDOW: &str = "Head Tracking";

/// Frames a headless run lasts when no limit is given
pub const DEFAULT_HEADLESS_FRAMES: u64 = 300;

/// GUI display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuiMode {
    /// Tree canvas and camera preview
    All,
    /// Tree canvas only
    Tree,
    /// No GUI (headless)
    None,
}

impl GuiMode {
    /// Whether the tree window is shown
    #[must_use]
    pub fn shows_tree(self) -> bool {
        matches!(self, GuiMode::All | GuiMode::Tree)
    }

    /// Whether the camera preview is shown
    #[must_use]
    pub fn shows_camera(self) -> bool {
        self == GuiMode::All
    }
}

impl FromStr for GuiMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(GuiMode::All),
            "tree" => Ok(GuiMode::Tree),
            "none" => Ok(GuiMode::None),
            other => Err(Error::InvalidInput(format!(
                "unknown GUI mode '{other}', expected all, tree or none"
            ))),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// File or default configuration
    pub config: Config,
    /// GUI display mode
    pub gui_mode: GuiMode,
    /// Stop after this many frames
    pub max_frames: Option<u64>,
}

impl AppConfig {
    /// Frame limit actually used by [`TreeApp::run`]
    #[must_use]
    pub fn frame_limit(&self) -> Option<u64> {
        match (self.max_frames, self.gui_mode) {
            (Some(limit), _) => Some(limit),
            (None, GuiMode::None) => Some(DEFAULT_HEADLESS_FRAMES),
            (None, _) => None,
        }
    }

    /// Capture source selected by the configuration
    #[must_use]
    pub fn video_source(&self) -> VideoSource {
        match &self.config.capture.video_file {
            Some(path) => VideoSource::File(path.clone()),
            None => VideoSource::Camera(self.config.capture.camera_index),
        }
    }
}

/// Interactive fractal tree application
pub struct TreeApp {
    settings: AppConfig,
    detector: Box<dyn BlobDetector>,
    video: VideoInput,
    tracker: HeadTracker,
    state: FrameState,
    renderer: TreeRenderer,
    rng: StdRng,
    blobs: Vec<FaceBlob>,
    started: Instant,
    frame_count: u64,
    fps: f64,
    fps_window_start: Instant,
    fps_window_frames: u64,
}

impl TreeApp {
    /// Open the capture device and load the face classifier
    ///
    /// # Errors
    ///
    /// Returns [`Error::Classifier`] if the classifier cannot be loaded. A
    /// missing capture device is not an error.
    pub fn new(settings: AppConfig) -> Result<Self> {
        info!("Initializing interactive fractal tree");

        let detection = &settings.config.detection;
        let detector = HaarFaceDetector::new(&detection.classifier, detection)?;

        let capture = &settings.config.capture;
        let video = VideoInput::open(
            settings.video_source(),
            capture.width,
            capture.height,
            capture.loop_video,
        );

        Ok(Self::with_parts(settings, Box::new(detector), video))
    }

    /// Assemble the application from an existing detector and input
    #[must_use]
    pub fn with_parts(settings: AppConfig, detector: Box<dyn BlobDetector>, video: VideoInput) -> Self {
        let config = &settings.config;

        let rng = match config.tree.seed {
            Some(seed) => {
                info!("Branch colors seeded with {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };
        let background = if config.display.light_background {
            Background::Light
        } else {
            Background::Dark
        };

        let now = Instant::now();
        Self {
            tracker: HeadTracker::new(&config.view),
            renderer: TreeRenderer::new(&config.display, &config.view),
            state: FrameState::new(background),
            settings,
            detector,
            video,
            rng,
            blobs: Vec::new(),
            started: now,
            frame_count: 0,
            fps: 0.0,
            fps_window_start: now,
            fps_window_frames: 0,
        }
    }

    /// Grab a frame, detect faces and advance the head tracker
    ///
    /// # Errors
    ///
    /// Currently infallible; detector failures only drop the frame.
    pub fn update(&mut self) -> Result<()> {
        if self.video.update() {
            match self.detector.detect(self.video.pixels()) {
                Ok(blobs) => self.ingest(blobs),
                Err(e) => warn!("Face detection failed: {}", e),
            }
        }

        let video_size = (f64::from(self.video.width()), f64::from(self.video.height()));
        self.tracker.update(
            &self.blobs,
            video_size,
            self.video.is_initialized(),
            self.started.elapsed().as_secs_f64(),
        );

        self.tick_fps();
        Ok(())
    }

    /// Take the detections of a new frame
    pub fn ingest(&mut self, blobs: Vec<FaceBlob>) {
        debug!("{} face(s) detected", blobs.len());
        self.blobs = blobs;
        self.state.apply_detection(self.blobs.first(), &self.settings.config.tree);
    }

    fn tick_fps(&mut self) {
        self.frame_count += 1;
        self.fps_window_frames += 1;

        let elapsed = self.fps_window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            #[allow(clippy::cast_precision_loss)] // frame counts stay small
            let frames = self.fps_window_frames as f64;
            self.fps = frames / elapsed.as_secs_f64();
            self.fps_window_start = Instant::now();
            self.fps_window_frames = 0;
        }
    }

    /// Render the tree canvas for the current state
    ///
    /// # Errors
    ///
    /// Returns an OpenCV error if the canvas cannot be drawn.
    pub fn draw(&mut self) -> Result<Mat> {
        let mut canvas = self.renderer.new_canvas(self.state.background)?;

        let palette = self.state.palette();
        match grow_tree(
            self.renderer.tree_root(),
            &self.state.params,
            &palette,
            self.settings.config.tree.min_branch_length,
            &mut self.rng,
        ) {
            Ok(segments) => {
                let window = *self.tracker.window();
                self.renderer
                    .draw_segments(&mut canvas, &segments, self.tracker.camera(), &window)?;
            }
            Err(e) => warn!("Skipping tree: {}", e),
        }

        if self.settings.config.display.show_fps {
            draw_fps(&mut canvas, self.fps, self.state.background)?;
        }

        Ok(canvas)
    }

    /// Handle a key press. Returns `true` when the app should quit.
    pub fn key_pressed(&mut self, key: i32) -> bool {
        match key {
            KEY_SPACE => {
                self.state.toggle_background();
                false
            }
            KEY_ESCAPE | KEY_QUIT => {
                info!("Exit requested by user");
                true
            }
            _ => false,
        }
    }

    /// Run the main application loop
    ///
    /// # Errors
    ///
    /// Returns an error if a window cannot be created or drawing fails.
    pub fn run(&mut self) -> Result<()> {
        let gui_mode = self.settings.gui_mode;
        let limit = self.settings.frame_limit();
        let delay = (1000 / self.settings.config.display.target_fps.max(1)).max(1);
        let delay = u32_to_i32(delay)?;

        if gui_mode.shows_tree() {
            highgui::named_window(TREE_WINDOW, WINDOW_AUTOSIZE)?;
        }
        if gui_mode.shows_camera() {
            highgui::named_window(CAMERA_WINDOW, WINDOW_NORMAL)?;
        }

        info!("Entering main loop ({:?} GUI)", gui_mode);
        loop {
            if limit.is_some_and(|limit| self.frame_count >= limit) {
                info!("Frame limit reached after {} frames", self.frame_count);
                break;
            }

            self.update()?;
            let canvas = self.draw()?;

            if gui_mode == GuiMode::None {
                continue;
            }

            highgui::imshow(TREE_WINDOW, &canvas)?;
            if gui_mode.shows_camera() && !self.video.pixels().empty() {
                let preview = camera_preview(
                    self.video.pixels(),
                    &self.blobs,
                    self.tracker.history(),
                    self.tracker.window(),
                )?;
                highgui::imshow(CAMERA_WINDOW, &preview)?;
            }

            let key = highgui::wait_key(delay)?;
            if key >= 0 && self.key_pressed(key) {
                break;
            }
        }

        if gui_mode != GuiMode::None {
            highgui::destroy_all_windows()?;
        }
        info!("Application shutting down");
        Ok(())
    }

    /// Per-frame interaction state
    #[must_use]
    pub fn state(&self) -> &FrameState {
        &self.state
    }

    /// Head tracker and camera
    #[must_use]
    pub fn tracker(&self) -> &HeadTracker {
        &self.tracker
    }

    /// Faces of the latest frame
    #[must_use]
    pub fn blobs(&self) -> &[FaceBlob] {
        &self.blobs
    }

    /// Frames processed so far
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Last measured frame rate
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }
}
