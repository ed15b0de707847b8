//! Video input for head tracking.
//!
//! A missing or broken camera is not fatal here: the input simply stays
//! uninitialized and the tracker falls back to synthetic head motion.

use crate::{utils::safe_cast::f64_to_i32, Result};
use log::{debug, info, warn};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH, CAP_PROP_POS_FRAMES},
};
use std::path::PathBuf;

/// Video source type
#[derive(Debug, Clone, PartialEq)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(PathBuf),
}

/// Frame grabber with the setup / update / pixels / initialized contract
pub struct VideoInput {
    capture: Option<VideoCapture>,
    source: Option<VideoSource>,
    frame: Mat,
    requested_width: i32,
    requested_height: i32,
    loop_video: bool,
    frame_is_new: bool,
}

impl VideoInput {
    /// Open a source at the requested size.
    ///
    /// Never fails because of the device: an unavailable source yields an
    /// uninitialized input.
    pub fn open(source: VideoSource, width: i32, height: i32, loop_video: bool) -> Self {
        let capture = match Self::try_open(&source, width, height) {
            Ok(Some(cap)) => Some(cap),
            Ok(None) => {
                warn!("Video source {:?} is not available, using synthetic head motion", source);
                None
            }
            Err(e) => {
                warn!("Failed to open video source {:?}: {}. Using synthetic head motion", source, e);
                None
            }
        };

        Self {
            capture,
            source: Some(source),
            frame: Mat::default(),
            requested_width: width,
            requested_height: height,
            loop_video,
            frame_is_new: false,
        }
    }

    /// Input that never produces frames
    #[must_use]
    pub fn disconnected(width: i32, height: i32) -> Self {
        Self {
            capture: None,
            source: None,
            frame: Mat::default(),
            requested_width: width,
            requested_height: height,
            loop_video: false,
            frame_is_new: false,
        }
    }

    fn try_open(source: &VideoSource, width: i32, height: i32) -> Result<Option<VideoCapture>> {
        let mut cap = match source {
            VideoSource::Camera(index) => {
                info!("Opening camera {}", index);
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;
                cap.set(CAP_PROP_FRAME_WIDTH, f64::from(width))?;
                cap.set(CAP_PROP_FRAME_HEIGHT, f64::from(height))?;
                // Keep only the newest frame
                cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
                cap
            }
            VideoSource::File(path) => {
                info!("Opening video file: {}", path.display());
                VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?
            }
        };

        if !cap.is_opened()? {
            return Ok(None);
        }

        let actual_width = f64_to_i32(cap.get(CAP_PROP_FRAME_WIDTH)?).unwrap_or(width);
        let actual_height = f64_to_i32(cap.get(CAP_PROP_FRAME_HEIGHT)?).unwrap_or(height);
        info!("Video source ready at {}x{}", actual_width, actual_height);

        Ok(Some(cap))
    }

    /// Whether the device opened successfully
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.capture.is_some()
    }

    /// Source this input was opened from
    #[must_use]
    pub fn source(&self) -> Option<&VideoSource> {
        self.source.as_ref()
    }

    /// Grab the newest frame. Returns whether a new frame arrived.
    ///
    /// Read failures count as "no frame this tick".
    pub fn update(&mut self) -> bool {
        self.frame_is_new = false;
        let Some(cap) = self.capture.as_mut() else {
            return false;
        };

        let mut frame = Mat::default();
        match cap.read(&mut frame) {
            Ok(true) if !frame.empty() => {
                self.frame = frame;
                self.frame_is_new = true;
            }
            Ok(_) => {
                if self.loop_video && matches!(self.source, Some(VideoSource::File(_))) {
                    debug!("End of video file, rewinding");
                    if let Err(e) = cap.set(CAP_PROP_POS_FRAMES, 0.0) {
                        warn!("Failed to rewind video: {}", e);
                    }
                } else {
                    debug!("No frame available this tick");
                }
            }
            Err(e) => debug!("Frame read failed: {}", e),
        }

        self.frame_is_new
    }

    /// Whether the last update produced a frame
    #[must_use]
    pub fn is_frame_new(&self) -> bool {
        self.frame_is_new
    }

    /// Latest frame (empty until one arrives)
    #[must_use]
    pub fn pixels(&self) -> &Mat {
        &self.frame
    }

    /// Frame width, falling back to the requested width
    #[must_use]
    pub fn width(&self) -> i32 {
        if self.frame.empty() {
            self.requested_width
        } else {
            self.frame.cols()
        }
    }

    /// Frame height, falling back to the requested height
    #[must_use]
    pub fn height(&self) -> i32 {
        if self.frame.empty() {
            self.requested_height
        } else {
            self.frame.rows()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_input() {
        let mut input = VideoInput::disconnected(320, 240);

        assert!(!input.is_initialized());
        assert!(!input.update());
        assert!(!input.is_frame_new());
        assert!(input.pixels().empty());
        assert_eq!(input.width(), 320);
        assert_eq!(input.height(), 240);
        assert!(input.source().is_none());
    }

    #[test]
    fn test_missing_video_file_is_not_fatal() {
        let input = VideoInput::open(VideoSource::File(PathBuf::from("no/such/clip.mp4")), 320, 240, true);
        assert!(!input.is_initialized());
        assert_eq!(input.width(), 320);
    }
}
