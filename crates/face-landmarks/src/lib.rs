//! Face Landmark Frames
//!
//! Landmark frames come from an external face mesh model (468 normalized
//! 3-D points per face, MediaPipe numbering). This crate holds the frame
//! types and the mouth-openness ratio computed from them:
//! - Landmark and frame types
//! - Named landmark indices
//! - Scale-invariant openness ratio extraction

pub mod frame;
pub mod ratio;

pub use frame::{Landmark, LandmarkFrame};
pub use ratio::{RatioExtractor, RatioMode, Segment};

use thiserror::Error;

/// Landmark error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("Landmark {index} missing from frame with {available} points")]
    MissingLandmarks { index: usize, available: usize },

    #[error("Face scale distance is zero or not finite")]
    DegenerateScale,

    #[error("Openness ratio {0} is not a positive finite number")]
    MalformedRatio(f64),
}

/// Face mesh landmark indices used by the ratio extractor and motion gate
pub mod index {
    /// Number of points in a full face mesh
    pub const FACE_MESH_POINTS: usize = 468;

    pub const NOSE_TIP: usize = 1;
    pub const GLABELLA: usize = 9;
    pub const FOREHEAD: usize = 10;
    pub const UPPER_LIP: usize = 13;
    pub const LOWER_LIP: usize = 14;
    pub const CHIN: usize = 152;
    pub const LEFT_CHEEK: usize = 234;
    pub const RIGHT_CHEEK: usize = 454;
}
