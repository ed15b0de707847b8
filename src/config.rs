//! Configuration management for the interactive fractal tree

use crate::{
    constants::{
        DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_CAPTURE_HEIGHT, DEFAULT_CAPTURE_WIDTH,
        DEFAULT_CLASSIFIER_PATH, DEFAULT_FAR_CLIP, DEFAULT_FPS, DEFAULT_HAAR_MIN_NEIGHBORS,
        DEFAULT_HAAR_SCALE_FACTOR, DEFAULT_NEAR_CLIP, DEFAULT_SCENE_DEPTH, DEFAULT_VIEWER_DISTANCE,
        DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, HEAD_HISTORY_CAPACITY, MIN_BRANCH_LENGTH,
    },
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Video capture configuration
    pub capture: CaptureConfig,

    /// Face detection configuration
    pub detection: DetectionConfig,

    /// Head-tracked view configuration
    pub view: ViewConfig,

    /// Tree shape configuration
    pub tree: TreeConfig,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Video capture parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Webcam index
    pub camera_index: i32,

    /// Play a video file instead of the webcam
    pub video_file: Option<PathBuf>,

    /// Requested frame width
    pub width: i32,

    /// Requested frame height
    pub height: i32,

    /// Restart video files when they end
    pub loop_video: bool,
}

/// Haar cascade parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Path to the pretrained cascade XML
    pub classifier: PathBuf,

    /// Image pyramid step, must exceed 1.0
    pub scale_factor: f64,

    /// Neighbouring hits required to keep a detection
    pub min_neighbors: i32,

    /// Smallest face side in pixels (0 = no limit)
    pub min_face_size: i32,
}

/// Real-world geometry of the tracked window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Window width in metres
    pub window_width: f64,

    /// Window height in metres
    pub window_height: f64,

    /// Assumed eye distance from the window in metres
    pub viewer_distance: f64,

    /// Near clip plane
    pub near_clip: f64,

    /// Far clip plane
    pub far_clip: f64,

    /// Depth of the tree plane behind the window in metres
    pub scene_depth: f64,

    /// Number of history samples averaged into the eye position (1 = raw)
    pub eye_smoothing: usize,
}

/// Tree shape parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Clamp the face box before it drives the tree
    pub clamp_face_box: bool,

    /// Exponential smoothing of the face width (1.0 = raw width)
    pub width_smoothing: f64,

    /// Branches at or below this length stop splitting
    pub min_branch_length: f64,

    /// Seed for branch colors (random when absent)
    pub seed: Option<u64>,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Canvas width in pixels
    pub canvas_width: i32,

    /// Canvas height in pixels
    pub canvas_height: i32,

    /// Target framerate
    pub target_fps: u32,

    /// Default GUI mode
    pub gui_mode: String,

    /// Draw the frame rate on the canvas
    pub show_fps: bool,

    /// Start on the light background
    pub light_background: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            video_file: None,
            width: DEFAULT_CAPTURE_WIDTH,
            height: DEFAULT_CAPTURE_HEIGHT,
            loop_video: true,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            classifier: PathBuf::from(DEFAULT_CLASSIFIER_PATH),
            scale_factor: DEFAULT_HAAR_SCALE_FACTOR,
            min_neighbors: DEFAULT_HAAR_MIN_NEIGHBORS,
            min_face_size: 0,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            viewer_distance: DEFAULT_VIEWER_DISTANCE,
            near_clip: DEFAULT_NEAR_CLIP,
            far_clip: DEFAULT_FAR_CLIP,
            scene_depth: DEFAULT_SCENE_DEPTH,
            eye_smoothing: 1,
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            clamp_face_box: true,
            width_smoothing: 1.0,
            min_branch_length: MIN_BRANCH_LENGTH,
            seed: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            target_fps: DEFAULT_FPS,
            gui_mode: "all".to_string(),
            show_fps: false,
            light_background: false,
        }
    }
}

/// Values given on the command line. Each one replaces the file value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Webcam index, selects the webcam over any configured video file
    pub camera_index: Option<i32>,
    pub video_file: Option<PathBuf>,
    pub classifier: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Apply command line values on top of the file values
    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(cam) = overrides.camera_index {
            self.capture.camera_index = cam;
            self.capture.video_file = None;
        }
        if let Some(video) = overrides.video_file {
            self.capture.video_file = Some(video);
        }
        if let Some(classifier) = overrides.classifier {
            self.detection.classifier = classifier;
        }
        if overrides.seed.is_some() {
            self.tree.seed = overrides.seed;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Capture
        if self.capture.width <= 0 || self.capture.height <= 0 {
            return Err(Error::ConfigError("Capture size must be positive".to_string()));
        }

        // Detection
        if self.detection.scale_factor <= 1.0 {
            return Err(Error::ConfigError(
                "Haar scale factor must be greater than 1.0".to_string(),
            ));
        }
        if self.detection.min_neighbors < 0 || self.detection.min_face_size < 0 {
            return Err(Error::ConfigError(
                "Haar neighbours and minimum face size must not be negative".to_string(),
            ));
        }

        // View geometry
        if self.view.window_width <= 0.0 || self.view.window_height <= 0.0 {
            return Err(Error::ConfigError("Window size must be positive".to_string()));
        }
        if self.view.viewer_distance <= 0.0 {
            return Err(Error::ConfigError("Viewer distance must be positive".to_string()));
        }
        if !(self.view.near_clip > 0.0 && self.view.far_clip > self.view.near_clip) {
            return Err(Error::ConfigError(
                "Clip planes must satisfy 0 < near < far".to_string(),
            ));
        }
        if self.view.scene_depth < 0.0 {
            return Err(Error::ConfigError("Scene depth must not be negative".to_string()));
        }
        if self.view.eye_smoothing > HEAD_HISTORY_CAPACITY {
            return Err(Error::ConfigError(format!(
                "Eye smoothing window must not exceed {}",
                HEAD_HISTORY_CAPACITY
            )));
        }

        // Tree
        if !(self.tree.width_smoothing > 0.0 && self.tree.width_smoothing <= 1.0) {
            return Err(Error::ConfigError(
                "Width smoothing must be in (0.0, 1.0]".to_string(),
            ));
        }
        if self.tree.min_branch_length <= 0.0 {
            return Err(Error::ConfigError(
                "Minimum branch length must be positive".to_string(),
            ));
        }

        // Display
        if self.display.canvas_width <= 0 || self.display.canvas_height <= 0 {
            return Err(Error::ConfigError("Canvas size must be positive".to_string()));
        }
        if self.display.target_fps == 0 {
            return Err(Error::ConfigError("Target FPS must be greater than 0".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Interactive Fractal Tree Configuration

# Video capture
capture:
  camera_index: 0
  width: 320
  height: 240
  loop_video: true

# Haar cascade face detection
detection:
  classifier: "assets/haarcascade_frontalface_default.xml"
  scale_factor: 1.08
  min_neighbors: 2
  min_face_size: 0

# Real-world window geometry (metres)
view:
  window_width: 0.3
  window_height: 0.2
  viewer_distance: 0.4
  near_clip: 0.01
  far_clip: 1000.0
  scene_depth: 0.1
  eye_smoothing: 1

# Tree shape
tree:
  clamp_face_box: true
  width_smoothing: 1.0
  min_branch_length: 2.0

# Display settings
display:
  canvas_width: 1024
  canvas_height: 768
  target_fps: 60
  gui_mode: "all"
  show_fps: false
  light_background: false
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capture.width, 320);
        assert_eq!(config.capture.height, 240);
        assert_eq!(config.view.viewer_distance, 0.4);
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.detection.min_neighbors, 2);
        assert!(config.tree.clamp_face_box);
        assert!(config.tree.seed.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("view:\n  scene_depth: 0.0\n").unwrap();
        assert_eq!(config.view.scene_depth, 0.0);
        assert_eq!(config.view.window_width, 0.3);
        assert_eq!(config.display.canvas_width, 1024);
    }

    #[test]
    fn test_cam_override_replaces_video_file() {
        let mut config = Config::default();
        config.capture.video_file = Some(PathBuf::from("clip.mp4"));

        config.apply_overrides(CliOverrides {
            camera_index: Some(1),
            ..CliOverrides::default()
        });
        assert_eq!(config.capture.camera_index, 1);
        assert!(config.capture.video_file.is_none());
    }

    #[test]
    fn test_empty_overrides_keep_file_values() {
        let mut config = Config::default();
        config.capture.video_file = Some(PathBuf::from("clip.mp4"));
        config.tree.seed = Some(7);

        config.apply_overrides(CliOverrides::default());
        assert_eq!(config.capture.video_file, Some(PathBuf::from("clip.mp4")));
        assert_eq!(config.tree.seed, Some(7));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.detection.scale_factor = 1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tree.width_smoothing = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.view.eye_smoothing = HEAD_HISTORY_CAPACITY + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.view.far_clip = config.view.near_clip;
        assert!(config.validate().is_err());
    }
}
