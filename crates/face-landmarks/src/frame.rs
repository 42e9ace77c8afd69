//! Landmark frame types

use serde::{Deserialize, Serialize};

use crate::LandmarkError;

/// Single face mesh point in normalized camera space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Depth relative to the face center (smaller is closer to the camera)
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point, optionally ignoring depth
    pub fn distance(&self, other: &Landmark, include_depth: bool) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = if include_depth { self.z - other.z } else { 0.0 };
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// All landmarks of one detected face in one video frame
///
/// The position of a point in the sequence is its landmark label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkFrame {
    landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    /// Create a frame from an ordered landmark list
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Build a frame holding only the given labeled points.
    ///
    /// Unlisted labels up to the highest given one are filled with the origin.
    pub fn sparse(points: &[(usize, Landmark)]) -> Self {
        let len = points.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
        let mut landmarks = vec![Landmark::default(); len];
        for &(index, point) in points {
            landmarks[index] = point;
        }
        Self { landmarks }
    }

    /// Number of points in the frame
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    /// Check if the frame holds no points
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Get a landmark by label
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    /// Get a landmark by label, failing if the frame lacks it
    pub fn landmark(&self, index: usize) -> Result<&Landmark, LandmarkError> {
        self.landmarks
            .get(index)
            .ok_or(LandmarkError::MissingLandmarks {
                index,
                available: self.landmarks.len(),
            })
    }

    /// Distance between two labeled landmarks
    pub fn distance(&self, a: usize, b: usize, include_depth: bool) -> Result<f64, LandmarkError> {
        Ok(self.landmark(a)?.distance(self.landmark(b)?, include_depth))
    }

    /// Iterate over all points in label order
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter()
    }
}
