//! Head-coupled off-axis perspective camera.
//!
//! The camera treats a physical display as a window: given three corners of
//! the window plane and the viewer's eye position, it builds an asymmetric
//! frustum whose near face lines up with the window. Everything lying on the
//! window plane therefore projects to a fixed place on screen, while points
//! in front of or behind it shift with the viewer's head.

use crate::{
    constants::{DEFAULT_FAR_CLIP, DEFAULT_NEAR_CLIP, EPSILON},
    Error, Result,
};
use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

/// Window plane described by three of its corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    /// Top-left corner in world space
    pub top_left: Point3<f64>,
    /// Bottom-left corner in world space
    pub bottom_left: Point3<f64>,
    /// Bottom-right corner in world space
    pub bottom_right: Point3<f64>,
}

impl ViewWindow {
    /// Window of the given real-world size centred on the origin in the z = 0 plane
    #[must_use]
    pub fn centered(width: f64, height: f64) -> Self {
        Self {
            top_left: Point3::new(-width / 2.0, height / 2.0, 0.0),
            bottom_left: Point3::new(-width / 2.0, -height / 2.0, 0.0),
            bottom_right: Point3::new(width / 2.0, -height / 2.0, 0.0),
        }
    }

    /// Edge from bottom-left to bottom-right (the plane's x axis)
    #[must_use]
    pub fn bottom_edge(&self) -> Vector3<f64> {
        self.bottom_right - self.bottom_left
    }

    /// Edge from bottom-left to top-left (the plane's y axis)
    #[must_use]
    pub fn left_edge(&self) -> Vector3<f64> {
        self.top_left - self.bottom_left
    }

    /// Real-world width of the window
    #[must_use]
    pub fn width(&self) -> f64 {
        self.bottom_edge().norm()
    }

    /// Real-world height of the window
    #[must_use]
    pub fn height(&self) -> f64 {
        self.left_edge().norm()
    }

    /// Point on the window plane at normalized coordinates (`u` right, `v` up)
    #[must_use]
    pub fn point_at(&self, u: f64, v: f64) -> Point3<f64> {
        self.bottom_left + self.bottom_edge() * u + self.left_edge() * v
    }

    /// Unit vector pointing from the viewer through the window
    #[must_use]
    pub fn look_direction(&self) -> Vector3<f64> {
        self.left_edge().normalize().cross(&self.bottom_edge().normalize())
    }
}

/// Perspective camera configured from a window portal and an eye position
#[derive(Debug, Clone)]
pub struct OffAxisCamera {
    position: Point3<f64>,
    near_clip: f64,
    far_clip: f64,
    lens_offset: Vector2<f64>,
    aspect_ratio: f64,
    fov_y: f64,
    view: Matrix4<f64>,
    projection: Matrix4<f64>,
    view_projection: Matrix4<f64>,
}

impl Default for OffAxisCamera {
    fn default() -> Self {
        Self::new(DEFAULT_NEAR_CLIP, DEFAULT_FAR_CLIP)
    }
}

impl OffAxisCamera {
    /// Create a camera at the origin with identity matrices
    #[must_use]
    pub fn new(near_clip: f64, far_clip: f64) -> Self {
        Self {
            position: Point3::origin(),
            near_clip,
            far_clip,
            lens_offset: Vector2::zeros(),
            aspect_ratio: 1.0,
            fov_y: std::f64::consts::FRAC_PI_2,
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            view_projection: Matrix4::identity(),
        }
    }

    /// Move the eye. Takes effect on the next portal setup.
    pub fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    /// Current eye position
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    /// Lens shift applied after the symmetric perspective
    #[must_use]
    pub fn lens_offset(&self) -> Vector2<f64> {
        self.lens_offset
    }

    /// Width over height of the portal
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Vertical field of view in radians
    #[must_use]
    pub fn fov_y(&self) -> f64 {
        self.fov_y
    }

    /// World to camera transform
    #[must_use]
    pub fn view_matrix(&self) -> &Matrix4<f64> {
        &self.view
    }

    /// Camera to clip transform, lens offset included
    #[must_use]
    pub fn projection_matrix(&self) -> &Matrix4<f64> {
        &self.projection
    }

    /// Combined world to clip transform, updated on each portal setup
    #[must_use]
    pub fn view_projection(&self) -> Matrix4<f64> {
        self.view_projection
    }

    /// Point the camera through the window portal from the current eye.
    ///
    /// On error the previous configuration is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Projection`] when the corners are degenerate, the clip
    /// planes are unusable, or the eye lies on the window plane.
    pub fn setup_off_axis_view_portal(
        &mut self,
        top_left: &Point3<f64>,
        bottom_left: &Point3<f64>,
        bottom_right: &Point3<f64>,
    ) -> Result<()> {
        let bottom_edge = bottom_right - bottom_left;
        let left_edge = top_left - bottom_left;
        let width = bottom_edge.norm();
        let height = left_edge.norm();
        if width < EPSILON || height < EPSILON {
            return Err(Error::Projection("window corners are degenerate".to_string()));
        }
        if !(self.near_clip > 0.0 && self.far_clip > self.near_clip) {
            return Err(Error::Projection(format!(
                "invalid clip planes: near {} far {}",
                self.near_clip, self.far_clip
            )));
        }

        let bottom_edge_norm = bottom_edge / width;
        let left_edge_norm = left_edge / height;
        let look = left_edge_norm.cross(&bottom_edge_norm);
        if look.norm() < EPSILON {
            return Err(Error::Projection("window edges are parallel".to_string()));
        }
        let up = bottom_edge_norm.cross(&look);

        let bottom_left_to_cam = self.position - bottom_left;
        let lens_offset = Vector2::new(
            -bottom_left_to_cam.dot(&bottom_edge_norm) * 2.0 / width + 1.0,
            -bottom_left_to_cam.dot(&left_edge_norm) * 2.0 / height + 1.0,
        );
        let aspect_ratio = width / height;

        let distance_along_axis = bottom_left_to_cam.dot(&look).abs();
        if distance_along_axis < EPSILON {
            return Err(Error::Projection("eye lies on the window plane".to_string()));
        }
        let fov_y = 2.0 * ((height / 2.0) / distance_along_axis).atan();

        let target = self.position + look;
        let view = Matrix4::look_at_rh(&self.position, &target, &up);
        let perspective = Matrix4::new_perspective(aspect_ratio, fov_y, self.near_clip, self.far_clip);
        let shift = Matrix4::new_translation(&Vector3::new(-lens_offset.x, -lens_offset.y, 0.0));

        self.lens_offset = lens_offset;
        self.aspect_ratio = aspect_ratio;
        self.fov_y = fov_y;
        self.view = view;
        self.projection = shift * perspective;
        self.view_projection = self.projection * self.view;

        Ok(())
    }

    /// Convenience wrapper taking a [`ViewWindow`]
    ///
    /// # Errors
    ///
    /// See [`OffAxisCamera::setup_off_axis_view_portal`].
    pub fn look_through(&mut self, window: &ViewWindow) -> Result<()> {
        self.setup_off_axis_view_portal(&window.top_left, &window.bottom_left, &window.bottom_right)
    }

    /// Project a world point into normalized device coordinates.
    ///
    /// Returns `None` for points at or behind the eye.
    #[must_use]
    pub fn project(&self, world: &Point3<f64>) -> Option<Point2<f64>> {
        let clip = self.view_projection * world.to_homogeneous();
        if clip.w <= EPSILON {
            return None;
        }
        Some(Point2::new(clip.x / clip.w, clip.y / clip.w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tracked_camera(eye: Point3<f64>, window: &ViewWindow) -> OffAxisCamera {
        let mut camera = OffAxisCamera::default();
        camera.set_position(eye);
        camera.look_through(window).unwrap();
        camera
    }

    #[test]
    fn test_centered_eye_is_symmetric() {
        let window = ViewWindow::centered(0.3, 0.2);
        let camera = tracked_camera(Point3::new(0.0, 0.0, 0.4), &window);

        assert_relative_eq!(camera.lens_offset().x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(camera.lens_offset().y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(camera.aspect_ratio(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(camera.fov_y(), 2.0 * (0.1f64 / 0.4).atan(), epsilon = 1e-12);
    }

    #[test]
    fn test_look_direction_points_into_screen() {
        let window = ViewWindow::centered(0.3, 0.2);
        let look = window.look_direction();
        assert_relative_eq!(look.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_window_corners_map_to_ndc_corners() {
        let window = ViewWindow::centered(0.3, 0.2);
        for eye in [
            Point3::new(0.0, 0.0, 0.4),
            Point3::new(0.12, -0.05, 0.4),
            Point3::new(-0.3, 0.2, 0.9),
        ] {
            let camera = tracked_camera(eye, &window);
            let bl = camera.project(&window.bottom_left).unwrap();
            let tl = camera.project(&window.top_left).unwrap();
            let br = camera.project(&window.bottom_right).unwrap();
            assert_relative_eq!(bl.x, -1.0, epsilon = 1e-9);
            assert_relative_eq!(bl.y, -1.0, epsilon = 1e-9);
            assert_relative_eq!(tl.y, 1.0, epsilon = 1e-9);
            assert_relative_eq!(br.x, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_point_behind_window_shifts_with_eye() {
        let window = ViewWindow::centered(0.3, 0.2);
        let behind = Point3::new(0.0, 0.0, -0.1);

        let centered = tracked_camera(Point3::new(0.0, 0.0, 0.4), &window);
        let right = tracked_camera(Point3::new(0.1, 0.0, 0.4), &window);

        assert_relative_eq!(centered.project(&behind).unwrap().x, 0.0, epsilon = 1e-9);
        assert!(right.project(&behind).unwrap().x > 0.0);
    }

    #[test]
    fn test_point_behind_eye_is_not_projected() {
        let window = ViewWindow::centered(0.3, 0.2);
        let camera = tracked_camera(Point3::new(0.0, 0.0, 0.4), &window);
        assert!(camera.project(&Point3::new(0.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn test_eye_on_plane_keeps_previous_configuration() {
        let window = ViewWindow::centered(0.3, 0.2);
        let mut camera = tracked_camera(Point3::new(0.0, 0.0, 0.4), &window);
        let before = camera.view_projection();

        camera.set_position(Point3::new(0.05, 0.0, 0.0));
        let result = camera.look_through(&window);

        assert!(matches!(result, Err(Error::Projection(_))));
        assert_eq!(camera.view_projection(), before);
    }

    #[test]
    fn test_view_projection_follows_eye() {
        let window = ViewWindow::centered(0.3, 0.2);
        let mut camera = OffAxisCamera::default();
        assert_eq!(camera.view_projection(), Matrix4::identity());

        for eye in [Point3::new(0.0, 0.0, 0.4), Point3::new(0.12, -0.05, 0.3)] {
            camera.set_position(eye);
            camera.look_through(&window).unwrap();
            assert_relative_eq!(
                camera.view_projection(),
                camera.projection_matrix() * camera.view_matrix(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_degenerate_window_rejected() {
        let mut camera = OffAxisCamera::default();
        camera.set_position(Point3::new(0.0, 0.0, 0.4));
        let p = Point3::new(0.0, 0.0, 0.0);
        assert!(camera.setup_off_axis_view_portal(&p, &p, &Point3::new(1.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_point_at_covers_window() {
        let window = ViewWindow::centered(0.3, 0.2);
        assert_eq!(window.point_at(0.0, 1.0), window.top_left);
        assert_eq!(window.point_at(1.0, 0.0), window.bottom_right);
        assert_relative_eq!(window.point_at(0.5, 0.5).coords.norm(), 0.0, epsilon = 1e-12);
    }
}
