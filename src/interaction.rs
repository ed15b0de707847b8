//! Per-frame interaction state.
//!
//! The face bounding box drives four tree parameters: its width stands in for
//! the viewer's distance (stem length, shrink factor, branch angle) and its
//! x position biases the branching to one side. When no face is visible the
//! previous parameters persist.

use crate::{
    config::TreeConfig,
    constants::{
        BRANCH_ANGLE_RANGE, FACE_WIDTH_MAX, FACE_WIDTH_MIN, FACE_X_CLAMP_MAX, FACE_X_CLAMP_MIN,
        FACE_X_MAP_MAX, FACE_X_MAP_MIN, INITIAL_BRANCH_ANGLE, INITIAL_SHRINK_FACTOR, INITIAL_STEM_LENGTH,
        INITIAL_TILT, SHRINK_FACTOR_RANGE, STEM_LENGTH_RANGE, TILT_RANGE,
    },
    face_detection::FaceBlob,
    palette::{Background, Palette},
    tree,
    utils::map_range,
};

/// Shape parameters of the tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionParams {
    /// Length of the stem in canvas pixels
    pub len: f64,
    /// Factor applied to the length at each level
    pub len_fac: f64,
    /// Branch angle from the parent in degrees
    pub theta: f64,
    /// Rotation bias applied to both branches in degrees
    pub x_tilt: f64,
}

impl Default for InteractionParams {
    fn default() -> Self {
        Self {
            len: INITIAL_STEM_LENGTH,
            len_fac: INITIAL_SHRINK_FACTOR,
            theta: INITIAL_BRANCH_ANGLE,
            x_tilt: INITIAL_TILT,
        }
    }
}

impl InteractionParams {
    /// Parameters for a face of the given width and left edge
    #[must_use]
    pub fn from_face(width: f64, x: f64) -> Self {
        Self {
            len: stem_length(width),
            len_fac: shrink_factor(width),
            theta: branch_angle(width),
            x_tilt: tilt(x),
        }
    }

    /// Whether a tree with these parameters ends within the segment budget
    #[must_use]
    pub fn is_drawable(&self, min_length: f64) -> bool {
        tree::check_tree(self, min_length).is_ok()
    }

    /// Palette for the current stem length
    #[must_use]
    pub fn palette(&self, background: Background) -> Palette {
        Palette::select(self.len, background)
    }
}

/// Stem length for a face width
#[must_use]
pub fn stem_length(width: f64) -> f64 {
    map_range(width, FACE_WIDTH_MIN, FACE_WIDTH_MAX, STEM_LENGTH_RANGE.0, STEM_LENGTH_RANGE.1)
}

/// Shrink factor for a face width
#[must_use]
pub fn shrink_factor(width: f64) -> f64 {
    map_range(width, FACE_WIDTH_MIN, FACE_WIDTH_MAX, SHRINK_FACTOR_RANGE.0, SHRINK_FACTOR_RANGE.1)
}

/// Branch angle for a face width
#[must_use]
pub fn branch_angle(width: f64) -> f64 {
    map_range(width, FACE_WIDTH_MIN, FACE_WIDTH_MAX, BRANCH_ANGLE_RANGE.0, BRANCH_ANGLE_RANGE.1)
}

/// Tilt bias for a face x position
#[must_use]
pub fn tilt(x: f64) -> f64 {
    map_range(x, FACE_X_MAP_MIN, FACE_X_MAP_MAX, TILT_RANGE.0, TILT_RANGE.1)
}

/// Everything the draw phase needs that survives between frames
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    /// Current tree parameters
    pub params: InteractionParams,
    /// Canvas background
    pub background: Background,
    /// Left edge of the last seen face
    pub blob_x: f64,
    /// Face width of the previous detection, unset until the first face
    pub last_width: Option<f64>,
    /// Face width of the latest detection
    pub current_width: f64,
}

impl Default for FrameState {
    fn default() -> Self {
        Self::new(Background::Dark)
    }
}

impl FrameState {
    /// Initial state on the given background
    #[must_use]
    pub fn new(background: Background) -> Self {
        Self {
            params: InteractionParams::default(),
            background,
            blob_x: 0.0,
            last_width: None,
            current_width: 0.0,
        }
    }

    /// Fold the newest detection into the state.
    ///
    /// Returns `true` when the parameters were recomputed.
    pub fn apply_detection(&mut self, blob: Option<&FaceBlob>, config: &TreeConfig) -> bool {
        let Some(blob) = blob else {
            log::debug!("No face this frame, keeping tree parameters");
            return false;
        };

        let mut width = blob.bbox.width;
        let mut x = blob.bbox.x;
        if config.clamp_face_box {
            width = width.clamp(FACE_WIDTH_MIN, FACE_WIDTH_MAX);
            x = x.clamp(FACE_X_CLAMP_MIN, FACE_X_CLAMP_MAX);
        }

        let last = self.last_width.unwrap_or(width);
        let width = last + config.width_smoothing * (width - last);

        let candidate = InteractionParams::from_face(width, x);
        if !candidate.is_drawable(config.min_branch_length) {
            log::warn!(
                "Face width {:.1} gives an undrawable tree (length {:.1}, shrink {:.3}), keeping previous",
                width,
                candidate.len,
                candidate.len_fac
            );
            return false;
        }

        // A rejected face leaves the smoothing state untouched
        self.current_width = width;
        self.blob_x = x;
        self.last_width = Some(width);
        self.params = candidate;
        true
    }

    /// Swap background and palette set
    pub fn toggle_background(&mut self) {
        self.background.toggle();
        log::info!("Background switched to {:?}", self.background);
    }

    /// Palette for the current parameters and background
    #[must_use]
    pub fn palette(&self) -> Palette {
        self.params.palette(self.background)
    }
}
