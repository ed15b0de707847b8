use crate::{config::DetectionConfig, Error, Result};
use nalgebra::Point2;
use opencv::{
    core::{Mat, Rect, Size, Vector},
    imgproc,
    objdetect::CascadeClassifier,
    prelude::*,
};
use std::path::Path;

/// Axis-aligned box in camera pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Face region found in a camera frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBlob {
    /// Centre of mass of the region
    pub centroid: Point2<f64>,
    /// Bounding box of the region
    pub bbox: BoundingBox,
}

impl FaceBlob {
    /// Blob whose centroid is the centre of its bounding box
    #[must_use]
    pub fn from_box(bbox: BoundingBox) -> Self {
        Self {
            centroid: bbox.center(),
            bbox,
        }
    }

    /// Blob from an `OpenCV` detection rectangle
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self::from_box(BoundingBox::new(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        ))
    }

    /// Area of the bounding box
    #[must_use]
    pub fn area(&self) -> f64 {
        self.bbox.area()
    }
}

/// Anything that can find face blobs in a frame
pub trait BlobDetector {
    /// Detect faces, most prominent first
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying detector fails.
    fn detect(&mut self, frame: &Mat) -> Result<Vec<FaceBlob>>;
}

/// Haar cascade face detector backed by `OpenCV`
pub struct HaarFaceDetector {
    classifier: CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
    min_size: Size,
}

impl HaarFaceDetector {
    /// Load a pretrained cascade from an XML file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Classifier`] if the file is missing or cannot be parsed,
    /// and [`Error::InvalidInput`] for unusable detection parameters.
    pub fn new<P: AsRef<Path>>(classifier_path: P, config: &DetectionConfig) -> Result<Self> {
        let path = classifier_path.as_ref();
        log::info!("Loading face classifier: {}", path.display());

        if !path.exists() {
            return Err(Error::Classifier(format!("classifier not found: {}", path.display())));
        }
        if config.scale_factor <= 1.0 {
            return Err(Error::InvalidInput(format!(
                "Haar scale factor must be greater than 1.0, got {}",
                config.scale_factor
            )));
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| Error::Classifier(format!("classifier path is not UTF-8: {}", path.display())))?;
        let classifier = CascadeClassifier::new(path_str)
            .map_err(|e| Error::Classifier(format!("failed to load {}: {}", path.display(), e)))?;
        if classifier.empty()? {
            return Err(Error::Classifier(format!("classifier is empty: {}", path.display())));
        }

        Ok(Self {
            classifier,
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
            min_size: Size::new(config.min_face_size, config.min_face_size),
        })
    }
}

impl BlobDetector for HaarFaceDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<FaceBlob>> {
        if frame.empty() {
            return Ok(Vec::new());
        }

        let gray = if frame.channels() == 1 {
            frame.try_clone()?
        } else {
            let mut gray = Mat::default();
            imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_BGR2GRAY)?;
            gray
        };
        let mut equalized = Mat::default();
        imgproc::equalize_hist(&gray, &mut equalized)?;

        let mut rects = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &equalized,
            &mut rects,
            self.scale_factor,
            self.min_neighbors,
            0,
            self.min_size,
            Size::new(0, 0),
        )?;

        Ok(sort_by_prominence(rects.iter().map(FaceBlob::from_rect).collect()))
    }
}

/// Order blobs by bounding-box area, largest first
#[must_use]
pub fn sort_by_prominence(mut blobs: Vec<FaceBlob>) -> Vec<FaceBlob> {
    blobs.sort_by(|a, b| b.area().partial_cmp(&a.area()).unwrap_or(std::cmp::Ordering::Equal));
    blobs
}
