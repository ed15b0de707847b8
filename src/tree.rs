//! Recursive fractal tree generator.
//!
//! Each branch draws a segment along its local "up" axis, moves its origin
//! to the segment's tip, shrinks, and splits into two rotated children until
//! the length falls to the threshold. Transforms are plain values handed down
//! the recursion, so sibling subtrees never see each other's rotation.

use crate::{
    constants::{MAX_TREE_SEGMENTS, STROKE_LENGTH_RANGE, STROKE_WIDTH_RANGE},
    interaction::InteractionParams,
    palette::{Palette, Rgb},
    utils::map_range,
    Error, Result,
};
use nalgebra::{Point2, Vector2};
use rand::Rng;

/// One drawn branch in canvas pixel space (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
    /// Stroke width in pixels
    pub width: f64,
    pub color: Rgb,
    /// 0 for the stem
    pub depth: u32,
}

impl Segment {
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// Local drawing frame: an origin and a heading in degrees, 0 pointing up
/// and positive angles turning clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turtle {
    pub origin: Point2<f64>,
    pub heading: f64,
}

impl Turtle {
    #[must_use]
    pub fn new(origin: Point2<f64>) -> Self {
        Self { origin, heading: 0.0 }
    }

    /// Unit vector of the local up axis
    #[must_use]
    pub fn up(&self) -> Vector2<f64> {
        let rad = self.heading.to_radians();
        Vector2::new(rad.sin(), -rad.cos())
    }

    /// Same origin, frame rotated by `degrees`
    #[must_use]
    pub fn rotated(&self, degrees: f64) -> Self {
        Self {
            origin: self.origin,
            heading: self.heading + degrees,
        }
    }

    /// Frame moved `distance` along its up axis
    #[must_use]
    pub fn advanced(&self, distance: f64) -> Self {
        Self {
            origin: self.origin + self.up() * distance,
            heading: self.heading,
        }
    }
}

/// Stroke width for a branch of the given length
#[must_use]
pub fn stroke_width(len: f64) -> f64 {
    map_range(
        len,
        STROKE_LENGTH_RANGE.0,
        STROKE_LENGTH_RANGE.1,
        STROKE_WIDTH_RANGE.0,
        STROKE_WIDTH_RANGE.1,
    )
}

/// Number of shrink steps that keep a branch longer than `min_length`.
///
/// Stops counting at 64, which is already far past any drawable tree.
#[must_use]
pub fn shrink_steps(len: f64, len_fac: f64, min_length: f64) -> u32 {
    let mut steps = 0;
    let mut current = len * len_fac;
    while current > min_length && steps < 64 {
        steps += 1;
        current *= len_fac;
    }
    steps
}

/// Total segments a tree will draw, `None` if it does not fit in a `u64`
#[must_use]
pub fn branch_count(len: f64, len_fac: f64, min_length: f64) -> Option<u64> {
    let levels = shrink_steps(len, len_fac, min_length) + 1;
    1u64.checked_shl(levels).map(|n| n - 1)
}

/// Check that a tree with these parameters ends and stays drawable
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for a non-positive length, a shrink factor
/// outside (0, 1), a non-positive threshold, or a tree beyond
/// [`MAX_TREE_SEGMENTS`].
pub fn check_tree(params: &InteractionParams, min_length: f64) -> Result<u64> {
    if !(params.len.is_finite() && params.len > 0.0) {
        return Err(Error::InvalidInput(format!("stem length must be positive, got {}", params.len)));
    }
    if !(params.len_fac > 0.0 && params.len_fac < 1.0) {
        return Err(Error::InvalidInput(format!(
            "shrink factor must be in (0, 1), got {}",
            params.len_fac
        )));
    }
    if !(min_length.is_finite() && min_length > 0.0) {
        return Err(Error::InvalidInput(format!(
            "minimum branch length must be positive, got {min_length}"
        )));
    }

    match branch_count(params.len, params.len_fac, min_length) {
        Some(count) if count <= MAX_TREE_SEGMENTS => Ok(count),
        _ => Err(Error::InvalidInput(format!(
            "tree with length {} and shrink factor {} exceeds {} segments",
            params.len, params.len_fac, MAX_TREE_SEGMENTS
        ))),
    }
}

/// Grow a tree from `root`, stem pointing up.
///
/// # Errors
///
/// See [`check_tree`].
pub fn grow_tree<R: Rng + ?Sized>(
    root: Point2<f64>,
    params: &InteractionParams,
    palette: &Palette,
    min_length: f64,
    rng: &mut R,
) -> Result<Vec<Segment>> {
    let count = check_tree(params, min_length)?;

    #[allow(clippy::cast_possible_truncation)] // count <= MAX_TREE_SEGMENTS
    let mut segments = Vec::with_capacity(count as usize);
    let mut grower = Grower {
        params,
        palette,
        min_length,
        rng,
        out: &mut segments,
    };
    grower.branch(params.len, Turtle::new(root), 0);

    Ok(segments)
}

struct Grower<'a, R: Rng + ?Sized> {
    params: &'a InteractionParams,
    palette: &'a Palette,
    min_length: f64,
    rng: &'a mut R,
    out: &'a mut Vec<Segment>,
}

impl<R: Rng + ?Sized> Grower<'_, R> {
    fn branch(&mut self, len: f64, turtle: Turtle, depth: u32) {
        let tip = turtle.advanced(len);
        self.out.push(Segment {
            start: turtle.origin,
            end: tip.origin,
            width: stroke_width(len),
            color: self.palette.random_color(&mut *self.rng),
            depth,
        });

        let len = len * self.params.len_fac;
        if len > self.min_length {
            let theta = self.params.theta;
            let tilt = self.params.x_tilt;
            self.branch(len, tip.rotated(theta - tilt), depth + 1);
            self.branch(len, tip.rotated(-theta - tilt), depth + 1);
        }
    }
}
