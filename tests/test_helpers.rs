//! Helper functions and utilities for tests
#![allow(dead_code)]

use interactive_fractal_tree::{
    app::{AppConfig, GuiMode, TreeApp},
    capture::VideoInput,
    config::Config,
    face_detection::{BlobDetector, BoundingBox, FaceBlob},
    Result,
};
use opencv::{core::Mat, prelude::*};

/// Create a test image with specified dimensions and type
pub fn create_test_image(height: i32, width: i32, cv_type: i32) -> Result<Mat> {
    Mat::zeros(height, width, cv_type)?.to_mat().map_err(Into::into)
}

/// Square face with the given left edge and width
pub fn face_blob(x: f64, y: f64, width: f64) -> FaceBlob {
    FaceBlob::from_box(BoundingBox::new(x, y, width, width))
}

/// Detector that returns the same faces for every frame
pub struct FixedDetector(pub Vec<FaceBlob>);

impl BlobDetector for FixedDetector {
    fn detect(&mut self, _frame: &Mat) -> Result<Vec<FaceBlob>> {
        Ok(self.0.clone())
    }
}

/// Headless app without a camera, seeded for repeatable colors
pub fn headless_app(frames: u64) -> TreeApp {
    let mut config = Config::default();
    config.tree.seed = Some(1234);
    let settings = AppConfig {
        config,
        gui_mode: GuiMode::None,
        max_frames: Some(frames),
    };
    TreeApp::with_parts(settings, Box::new(FixedDetector(Vec::new())), VideoInput::disconnected(320, 240))
}
