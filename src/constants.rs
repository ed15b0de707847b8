//! Constants used throughout the application

/// Maximum number of head positions kept in the history
pub const HEAD_HISTORY_CAPACITY: usize = 50;

/// Default capture resolution requested from the webcam
pub const DEFAULT_CAPTURE_WIDTH: i32 = 320;
pub const DEFAULT_CAPTURE_HEIGHT: i32 = 240;

/// Real-world size of the tracked window, in metres
pub const DEFAULT_WINDOW_WIDTH: f64 = 0.3;
pub const DEFAULT_WINDOW_HEIGHT: f64 = 0.2;

/// Fixed eye depth used instead of a measured head distance
pub const DEFAULT_VIEWER_DISTANCE: f64 = 0.4;

/// Clip planes of the head-tracked camera
pub const DEFAULT_NEAR_CLIP: f64 = 0.01;
pub const DEFAULT_FAR_CLIP: f64 = 1000.0;

/// Distance of the tree plane behind the window, in metres
pub const DEFAULT_SCENE_DEPTH: f64 = 0.1;

/// Haar cascade defaults
pub const DEFAULT_CLASSIFIER_PATH: &str = "assets/haarcascade_frontalface_default.xml";
pub const DEFAULT_HAAR_SCALE_FACTOR: f64 = 1.08;
pub const DEFAULT_HAAR_MIN_NEIGHBORS: i32 = 2;

/// Initial interaction parameters, used until the first face is seen
pub const INITIAL_STEM_LENGTH: f64 = 200.0;
pub const INITIAL_SHRINK_FACTOR: f64 = 0.66;
pub const INITIAL_BRANCH_ANGLE: f64 = 60.0;
pub const INITIAL_TILT: f64 = 0.0;

/// Face bounding-box width range (pixels) driving the tree shape
pub const FACE_WIDTH_MIN: f64 = 10.0;
pub const FACE_WIDTH_MAX: f64 = 200.0;

/// Face bounding-box x clamp range (pixels)
pub const FACE_X_CLAMP_MIN: f64 = 0.0;
pub const FACE_X_CLAMP_MAX: f64 = 250.0;

/// Face bounding-box x range mapped onto the tilt bias
pub const FACE_X_MAP_MIN: f64 = 50.0;
pub const FACE_X_MAP_MAX: f64 = 250.0;

/// Output ranges of the interaction parameters
pub const STEM_LENGTH_RANGE: (f64, f64) = (200.0, 600.0);
pub const SHRINK_FACTOR_RANGE: (f64, f64) = (0.6, 0.7);
pub const BRANCH_ANGLE_RANGE: (f64, f64) = (0.0, 110.0);
pub const TILT_RANGE: (f64, f64) = (-50.0, 50.0);

/// Stem length thresholds separating the four palettes
pub const PALETTE_THRESHOLDS: [f64; 3] = [300.0, 350.0, 400.0];

/// Branches at or below this length are not split further
pub const MIN_BRANCH_LENGTH: f64 = 2.0;

/// Upper bound on segments in one tree
pub const MAX_TREE_SEGMENTS: u64 = 1 << 20;

/// Branch length range mapped onto the stroke width
pub const STROKE_LENGTH_RANGE: (f64, f64) = (2.0, 120.0);
pub const STROKE_WIDTH_RANGE: (f64, f64) = (1.0, 3.0);

/// Default canvas size
pub const DEFAULT_CANVAS_WIDTH: i32 = 1024;
pub const DEFAULT_CANVAS_HEIGHT: i32 = 768;

/// Default frames per second assumption
pub const DEFAULT_FPS: u32 = 60;

/// Key codes returned by `highgui::wait_key`
pub const KEY_SPACE: i32 = 32;
pub const KEY_ESCAPE: i32 = 27;
pub const KEY_QUIT: i32 = b'q' as i32;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
