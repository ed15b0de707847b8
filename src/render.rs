//! Drawing of the tree canvas and the camera preview.
//!
//! The canvas is laid onto the view window and the tree is pushed a short
//! distance behind it, so every vertex goes canvas pixel -> window plane ->
//! off-axis camera -> canvas pixel. With the plane on the window itself the
//! round trip is the identity.

use crate::{
    config::{DisplayConfig, ViewConfig},
    face_detection::FaceBlob,
    history::HeadHistory,
    off_axis::{OffAxisCamera, ViewWindow},
    palette::{Background, Rgb},
    tree::Segment,
    utils::{map_range_clamped, safe_cast::f64_to_i32_clamp},
    Result,
};
use log::debug;
use nalgebra::{Point2, Point3};
use opencv::{
    core::{Mat, Point, Rect, Scalar, CV_8UC3},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8, LINE_AA},
    prelude::*,
};

/// Pixel coordinates handed to OpenCV are kept inside this range
const PIXEL_LIMIT: i32 = 1 << 20;

/// Thickest stroke drawn for a single branch
const MAX_STROKE: i32 = 64;

/// OpenCV color for an RGB triple (OpenCV is BGR)
#[must_use]
pub fn to_scalar(color: Rgb) -> Scalar {
    Scalar::new(f64::from(color.b), f64::from(color.g), f64::from(color.r), 0.0)
}

fn to_pixel(p: Point2<f64>) -> Point {
    Point::new(
        f64_to_i32_clamp(p.x, -PIXEL_LIMIT, PIXEL_LIMIT),
        f64_to_i32_clamp(p.y, -PIXEL_LIMIT, PIXEL_LIMIT),
    )
}

/// Projects canvas geometry through the head-coupled camera and draws it
#[derive(Debug, Clone)]
pub struct TreeRenderer {
    width: i32,
    height: i32,
    scene_depth: f64,
}

impl TreeRenderer {
    #[must_use]
    pub fn new(display: &DisplayConfig, view: &ViewConfig) -> Self {
        Self {
            width: display.canvas_width,
            height: display.canvas_height,
            scene_depth: view.scene_depth,
        }
    }

    /// Canvas width in pixels
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Canvas height in pixels
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Where the stem starts: bottom centre of the canvas
    #[must_use]
    pub fn tree_root(&self) -> Point2<f64> {
        Point2::new(f64::from(self.width) / 2.0, f64::from(self.height))
    }

    /// World position of a canvas pixel on the tree plane
    #[must_use]
    pub fn canvas_to_world(&self, pixel: Point2<f64>, window: &ViewWindow) -> Point3<f64> {
        let u = pixel.x / f64::from(self.width);
        let v = 1.0 - pixel.y / f64::from(self.height);
        window.point_at(u, v) + window.look_direction() * self.scene_depth
    }

    /// Canvas pixel for normalized device coordinates
    #[must_use]
    pub fn ndc_to_canvas(&self, ndc: Point2<f64>) -> Point2<f64> {
        Point2::new(
            (ndc.x + 1.0) / 2.0 * f64::from(self.width),
            (1.0 - ndc.y) / 2.0 * f64::from(self.height),
        )
    }

    /// Canvas pixel seen by the camera for a canvas pixel on the tree plane
    #[must_use]
    pub fn project_point(
        &self,
        pixel: Point2<f64>,
        camera: &OffAxisCamera,
        window: &ViewWindow,
    ) -> Option<Point2<f64>> {
        camera
            .project(&self.canvas_to_world(pixel, window))
            .map(|ndc| self.ndc_to_canvas(ndc))
    }

    /// Blank canvas in the background color
    ///
    /// # Errors
    ///
    /// Returns an OpenCV error if the matrix cannot be allocated.
    pub fn new_canvas(&self, background: Background) -> Result<Mat> {
        let level = f64::from(background.clear_level());
        Ok(Mat::new_rows_cols_with_default(
            self.height,
            self.width,
            CV_8UC3,
            Scalar::all(level),
        )?)
    }

    /// Draw segments onto the canvas and return how many were drawn.
    ///
    /// # Errors
    ///
    /// Returns an OpenCV error if a line cannot be drawn.
    pub fn draw_segments(
        &self,
        canvas: &mut Mat,
        segments: &[Segment],
        camera: &OffAxisCamera,
        window: &ViewWindow,
    ) -> Result<usize> {
        let mut drawn = 0;
        for segment in segments {
            let start = self.project_point(segment.start, camera, window);
            let end = self.project_point(segment.end, camera, window);
            let (Some(start), Some(end)) = (start, end) else {
                continue;
            };

            imgproc::line(
                canvas,
                to_pixel(start),
                to_pixel(end),
                to_scalar(segment.color),
                f64_to_i32_clamp(segment.width, 1, MAX_STROKE),
                LINE_AA,
                0,
            )?;
            drawn += 1;
        }

        if drawn < segments.len() {
            debug!("Skipped {} segments outside the view", segments.len() - drawn);
        }
        Ok(drawn)
    }
}

/// Frame rate in the top-left corner
///
/// # Errors
///
/// Returns an OpenCV error if the text cannot be drawn.
pub fn draw_fps(canvas: &mut Mat, fps: f64, background: Background) -> Result<()> {
    let color = match background {
        Background::Dark => Scalar::new(0.0, 255.0, 0.0, 0.0),
        Background::Light => Scalar::new(0.0, 128.0, 0.0, 0.0),
    };
    imgproc::put_text(
        canvas,
        &format!("FPS: {fps:.1}"),
        Point::new(10, 30),
        FONT_HERSHEY_SIMPLEX,
        1.0,
        color,
        2,
        LINE_8,
        false,
    )?;
    Ok(())
}

/// Camera pixel a head position was mapped from, kept inside the frame
#[must_use]
pub fn world_to_camera(position: &Point3<f64>, window: &ViewWindow, video_width: f64, video_height: f64) -> Point2<f64> {
    Point2::new(
        map_range_clamped(position.x, window.bottom_right.x, window.bottom_left.x, 0.0, video_width),
        map_range_clamped(position.y, window.top_left.y, window.bottom_right.y, 0.0, video_height),
    )
}

/// Copy of the camera frame with the face boxes and the head trail
///
/// # Errors
///
/// Returns an OpenCV error if drawing fails.
pub fn camera_preview(frame: &Mat, blobs: &[FaceBlob], history: &HeadHistory, window: &ViewWindow) -> Result<Mat> {
    let mut preview = frame.try_clone()?;
    let width = f64::from(preview.cols());
    let height = f64::from(preview.rows());

    let trail: Vec<Point> = history
        .iter()
        .map(|p| to_pixel(world_to_camera(p, window, width, height)))
        .collect();
    for pair in trail.windows(2) {
        imgproc::line(
            &mut preview,
            pair[0],
            pair[1],
            Scalar::new(255.0, 128.0, 0.0, 0.0),
            1,
            LINE_AA,
            0,
        )?;
    }

    for (i, blob) in blobs.iter().enumerate() {
        // Only the first face drives the view
        let color = if i == 0 {
            Scalar::new(0.0, 255.0, 0.0, 0.0)
        } else {
            Scalar::new(128.0, 128.0, 128.0, 0.0)
        };
        let rect = Rect::new(
            f64_to_i32_clamp(blob.bbox.x, -PIXEL_LIMIT, PIXEL_LIMIT),
            f64_to_i32_clamp(blob.bbox.y, -PIXEL_LIMIT, PIXEL_LIMIT),
            f64_to_i32_clamp(blob.bbox.width, 0, PIXEL_LIMIT),
            f64_to_i32_clamp(blob.bbox.height, 0, PIXEL_LIMIT),
        );
        imgproc::rectangle(&mut preview, rect, color, 2, LINE_8, 0)?;
        imgproc::circle(&mut preview, to_pixel(blob.centroid), 3, color, -1, LINE_8, 0)?;
    }

    Ok(preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use opencv::core::Vec3b;

    fn renderer(scene_depth: f64) -> TreeRenderer {
        let view = ViewConfig {
            scene_depth,
            ..ViewConfig::default()
        };
        TreeRenderer::new(&DisplayConfig::default(), &view)
    }

    fn camera_at(eye: Point3<f64>, window: &ViewWindow) -> OffAxisCamera {
        let mut camera = OffAxisCamera::default();
        camera.set_position(eye);
        camera.look_through(window).unwrap();
        camera
    }

    #[test]
    fn test_zero_depth_is_identity() {
        let renderer = renderer(0.0);
        let window = ViewWindow::centered(0.3, 0.2);
        let camera = camera_at(Point3::new(0.07, -0.03, 0.4), &window);

        for pixel in [Point2::new(0.0, 0.0), Point2::new(512.0, 768.0), Point2::new(300.0, 123.0)] {
            let seen = renderer.project_point(pixel, &camera, &window).unwrap();
            assert_relative_eq!(seen.x, pixel.x, epsilon = 1e-6);
            assert_relative_eq!(seen.y, pixel.y, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_depth_gives_parallax() {
        let renderer = renderer(0.1);
        let window = ViewWindow::centered(0.3, 0.2);
        let pixel = Point2::new(512.0, 384.0);

        let left = camera_at(Point3::new(-0.1, 0.0, 0.4), &window);
        let right = camera_at(Point3::new(0.1, 0.0, 0.4), &window);
        let from_left = renderer.project_point(pixel, &left, &window).unwrap();
        let from_right = renderer.project_point(pixel, &right, &window).unwrap();

        // The plane lies behind the window, so it moves with the head
        assert!(from_left.x < pixel.x);
        assert!(from_right.x > pixel.x);
    }

    #[test]
    fn test_canvas_corners_on_window() {
        let renderer = renderer(0.0);
        let window = ViewWindow::centered(0.3, 0.2);

        let top_left = renderer.canvas_to_world(Point2::new(0.0, 0.0), &window);
        assert_relative_eq!(top_left, window.top_left, epsilon = 1e-12);

        let bottom_right = renderer.canvas_to_world(Point2::new(1024.0, 768.0), &window);
        assert_relative_eq!(bottom_right, window.bottom_right, epsilon = 1e-12);
    }

    #[test]
    fn test_new_canvas_uses_background() {
        let renderer = renderer(0.0);
        let dark = renderer.new_canvas(Background::Dark).unwrap();
        let light = renderer.new_canvas(Background::Light).unwrap();

        assert_eq!(dark.cols(), 1024);
        assert_eq!(dark.rows(), 768);
        assert_eq!(*dark.at_2d::<Vec3b>(10, 10).unwrap(), Vec3b::from_array([0, 0, 0]));
        assert_eq!(*light.at_2d::<Vec3b>(10, 10).unwrap(), Vec3b::from_array([255, 255, 255]));
    }

    #[test]
    fn test_draw_segments_marks_canvas() {
        let renderer = renderer(0.0);
        let window = ViewWindow::centered(0.3, 0.2);
        let camera = camera_at(Point3::new(0.0, 0.0, 0.4), &window);
        let mut canvas = renderer.new_canvas(Background::Dark).unwrap();

        let segment = Segment {
            start: Point2::new(512.0, 768.0),
            end: Point2::new(512.0, 568.0),
            width: 3.0,
            color: Rgb { r: 240, g: 240, b: 240 },
            depth: 0,
        };
        let drawn = renderer.draw_segments(&mut canvas, &[segment], &camera, &window).unwrap();

        assert_eq!(drawn, 1);
        let pixel = canvas.at_2d::<Vec3b>(700, 512).unwrap();
        assert!(pixel[0] > 0);
    }

    #[test]
    fn test_bgr_order() {
        let scalar = to_scalar(Rgb { r: 10, g: 20, b: 30 });
        assert_relative_eq!(scalar[0], 30.0);
        assert_relative_eq!(scalar[2], 10.0);
    }

    #[test]
    fn test_world_to_camera_inverts_face_mapping() {
        let window = ViewWindow::centered(0.3, 0.2);
        let pixel = world_to_camera(&Point3::new(0.15, 0.1, 0.4), &window, 320.0, 240.0);
        assert_relative_eq!(pixel.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(pixel.y, 0.0, epsilon = 1e-9);

        let outside = world_to_camera(&Point3::new(-1.0, -1.0, 0.4), &window, 320.0, 240.0);
        assert_relative_eq!(outside.x, 320.0);
        assert_relative_eq!(outside.y, 240.0);
    }
}
