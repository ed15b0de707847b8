//! Maps detected faces onto an eye position behind the display window and
//! keeps the off-axis camera pointed through that window.

use crate::{
    config::ViewConfig,
    face_detection::FaceBlob,
    history::HeadHistory,
    off_axis::{OffAxisCamera, ViewWindow},
    utils::map_range,
};
use log::{debug, warn};
use nalgebra::Point3;

/// Where the head position of a tick came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadSource {
    /// Mapped from a detected face
    Face,
    /// Oscillation used while no camera is available
    Synthetic,
    /// Straight in front of the window
    Centered,
}

/// Eye position for a face seen by the camera.
///
/// The camera is not mirrored, so high camera x maps to low world x.
#[must_use]
pub fn face_to_world(
    blob: &FaceBlob,
    video_width: f64,
    video_height: f64,
    window: &ViewWindow,
    viewer_distance: f64,
) -> Point3<f64> {
    let x = map_range(
        blob.centroid.x,
        0.0,
        video_width,
        window.bottom_right.x,
        window.bottom_left.x,
    );
    let y = map_range(blob.centroid.y, 0.0, video_height, window.top_left.y, window.bottom_right.y);
    Point3::new(x, y, viewer_distance)
}

/// Head position used when there is no camera, circling the window centre
#[must_use]
pub fn synthetic_position(elapsed_secs: f64, window: &ViewWindow, viewer_distance: f64) -> Point3<f64> {
    Point3::new(
        0.5 * window.width() * elapsed_secs.sin(),
        0.5 * window.height() * elapsed_secs.cos(),
        viewer_distance,
    )
}

/// Head tracker owning the history and the head-coupled camera
pub struct HeadTracker {
    window: ViewWindow,
    viewer_distance: f64,
    eye_smoothing: usize,
    camera: OffAxisCamera,
    history: HeadHistory,
    last_source: Option<HeadSource>,
}

impl HeadTracker {
    /// Build a tracker from the view configuration
    #[must_use]
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            window: ViewWindow::centered(config.window_width, config.window_height),
            viewer_distance: config.viewer_distance,
            eye_smoothing: config.eye_smoothing,
            camera: OffAxisCamera::new(config.near_clip, config.far_clip),
            history: HeadHistory::new(),
            last_source: None,
        }
    }

    /// Run one tracking tick and return the raw head position.
    ///
    /// `blobs` are this frame's detections, most prominent first.
    pub fn update(
        &mut self,
        blobs: &[FaceBlob],
        video_size: (f64, f64),
        video_initialized: bool,
        elapsed_secs: f64,
    ) -> Point3<f64> {
        let (position, source) = match blobs.first() {
            Some(blob) => (
                face_to_world(blob, video_size.0, video_size.1, &self.window, self.viewer_distance),
                HeadSource::Face,
            ),
            None if !video_initialized => (
                synthetic_position(elapsed_secs, &self.window, self.viewer_distance),
                HeadSource::Synthetic,
            ),
            None => (Point3::new(0.0, 0.0, self.viewer_distance), HeadSource::Centered),
        };

        if self.last_source != Some(source) {
            debug!("Head position source: {:?}", source);
            self.last_source = Some(source);
        }

        self.history.push(position);
        let eye = self.history.smoothed(self.eye_smoothing).unwrap_or(position);

        self.camera.set_position(eye);
        if let Err(e) = self.camera.look_through(&self.window) {
            warn!("Keeping previous projection: {}", e);
        }

        position
    }

    /// Head-coupled camera
    #[must_use]
    pub fn camera(&self) -> &OffAxisCamera {
        &self.camera
    }

    /// Recent head positions
    #[must_use]
    pub fn history(&self) -> &HeadHistory {
        &self.history
    }

    /// Tracked window geometry
    #[must_use]
    pub fn window(&self) -> &ViewWindow {
        &self.window
    }

    /// Source of the latest head position
    #[must_use]
    pub fn last_source(&self) -> Option<HeadSource> {
        self.last_source
    }
}
