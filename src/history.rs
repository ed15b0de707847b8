//! Bounded history of recent head positions.
//!
//! The history keeps the newest [`HEAD_HISTORY_CAPACITY`] eye positions in
//! insertion order. It backs the optional eye smoothing and the head trail
//! drawn on the camera preview.

use crate::constants::HEAD_HISTORY_CAPACITY;
use nalgebra::{Point3, Vector3};
use std::collections::VecDeque;

/// Ring of head positions, oldest first
#[derive(Debug, Clone)]
pub struct HeadHistory {
    positions: VecDeque<Point3<f64>>,
}

impl Default for HeadHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadHistory {
    /// Create an empty history
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: VecDeque::with_capacity(HEAD_HISTORY_CAPACITY + 1),
        }
    }

    /// Append a position, evicting the oldest entries past capacity
    pub fn push(&mut self, position: Point3<f64>) {
        self.positions.push_back(position);
        while self.positions.len() > HEAD_HISTORY_CAPACITY {
            self.positions.pop_front();
        }
    }

    /// Number of stored positions
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no position has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Most recent position
    #[must_use]
    pub fn latest(&self) -> Option<Point3<f64>> {
        self.positions.back().copied()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Point3<f64>> + '_ {
        self.positions.iter()
    }

    /// Drop all positions
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Mean of the newest `window` positions.
    ///
    /// A window of 0 or 1 returns the latest position unchanged.
    #[must_use]
    pub fn smoothed(&self, window: usize) -> Option<Point3<f64>> {
        let latest = self.latest()?;
        if window <= 1 {
            return Some(latest);
        }

        let take = window.min(self.positions.len());
        let sum = self
            .positions
            .iter()
            .rev()
            .take(take)
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);

        #[allow(clippy::cast_precision_loss)] // take <= HEAD_HISTORY_CAPACITY
        Some(Point3::from(sum / take as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64) -> Point3<f64> {
        Point3::new(x, 0.0, 0.4)
    }

    #[test]
    fn test_push_and_latest() {
        let mut history = HeadHistory::new();
        assert!(history.is_empty());
        assert!(history.latest().is_none());

        history.push(p(1.0));
        history.push(p(2.0));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest(), Some(p(2.0)));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = HeadHistory::new();
        for i in 0..75 {
            history.push(p(f64::from(i)));
        }

        assert_eq!(history.len(), HEAD_HISTORY_CAPACITY);
        let xs: Vec<f64> = history.iter().map(|q| q.x).collect();
        let expected: Vec<f64> = (25..75).map(f64::from).collect();
        assert_eq!(xs, expected);
    }

    #[test]
    fn test_smoothed_window() {
        let mut history = HeadHistory::new();
        history.push(p(1.0));
        history.push(p(2.0));
        history.push(p(6.0));

        assert_relative_eq!(history.smoothed(1).unwrap().x, 6.0);
        assert_relative_eq!(history.smoothed(2).unwrap().x, 4.0);
        assert_relative_eq!(history.smoothed(3).unwrap().x, 3.0);
        // Window larger than the history uses everything available
        assert_relative_eq!(history.smoothed(10).unwrap().x, 3.0);
        assert_relative_eq!(history.smoothed(10).unwrap().z, 0.4);
    }

    #[test]
    fn test_clear() {
        let mut history = HeadHistory::new();
        history.push(p(1.0));
        history.clear();
        assert!(history.is_empty());
        assert!(history.smoothed(5).is_none());
    }
}
