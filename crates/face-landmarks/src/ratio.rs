//! Mouth-openness ratio extraction
//!
//! The ratio divides an opening distance by a face-size distance so that it
//! stays roughly constant as the face moves toward or away from the camera.

use serde::{Deserialize, Serialize};

use crate::frame::LandmarkFrame;
use crate::index;
use crate::LandmarkError;

/// Named ratio definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioMode {
    /// Glabella to chin over cheek width. Tracks jaw travel.
    #[default]
    JawSpan,
    /// Inner lip gap over the mean of cheek width and forehead-to-nose
    LipGap,
}

/// Pair of landmark labels measured against each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub from: usize,
    pub to: usize,
}

impl Segment {
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    fn length(&self, frame: &LandmarkFrame, include_depth: bool) -> Result<f64, LandmarkError> {
        frame.distance(self.from, self.to, include_depth)
    }
}

/// Computes the openness ratio of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RatioExtractor {
    opening: Segment,
    /// Face-size normalizers, averaged when more than one
    scale: Vec<Segment>,
    include_depth: bool,
}

impl Default for RatioExtractor {
    fn default() -> Self {
        Self::new(RatioMode::default())
    }
}

impl RatioExtractor {
    /// Create an extractor for a named ratio definition
    pub fn new(mode: RatioMode) -> Self {
        match mode {
            RatioMode::JawSpan => Self::jaw_span(),
            RatioMode::LipGap => Self::lip_gap(),
        }
    }

    /// Glabella–chin distance over cheek width
    pub fn jaw_span() -> Self {
        Self::custom(
            Segment::new(index::GLABELLA, index::CHIN),
            vec![Segment::new(index::LEFT_CHEEK, index::RIGHT_CHEEK)],
            true,
        )
    }

    /// Lip gap over the mean of cheek width and forehead-to-nose distance
    pub fn lip_gap() -> Self {
        Self::custom(
            Segment::new(index::UPPER_LIP, index::LOWER_LIP),
            vec![
                Segment::new(index::LEFT_CHEEK, index::RIGHT_CHEEK),
                Segment::new(index::FOREHEAD, index::NOSE_TIP),
            ],
            true,
        )
    }

    /// Arbitrary opening segment over the mean of the given scale segments
    pub fn custom(opening: Segment, scale: Vec<Segment>, include_depth: bool) -> Self {
        Self {
            opening,
            scale,
            include_depth,
        }
    }

    /// Compute the ratio for one frame
    pub fn extract(&self, frame: &LandmarkFrame) -> Result<f64, LandmarkError> {
        let opening = self.opening.length(frame, self.include_depth)?;

        let mut scale_sum = 0.0;
        for segment in &self.scale {
            scale_sum += segment.length(frame, self.include_depth)?;
        }
        if self.scale.is_empty() {
            return Err(LandmarkError::DegenerateScale);
        }
        let scale = scale_sum / self.scale.len() as f64;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(LandmarkError::DegenerateScale);
        }

        let ratio = opening / scale;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(LandmarkError::MalformedRatio(ratio));
        }
        Ok(ratio)
    }

    /// Every landmark label the extractor reads
    pub fn required_indices(&self) -> Vec<usize> {
        std::iter::once(&self.opening)
            .chain(self.scale.iter())
            .flat_map(|s| [s.from, s.to])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Landmark;

    fn jaw_frame(opening: f64, width: f64) -> LandmarkFrame {
        LandmarkFrame::sparse(&[
            (index::GLABELLA, Landmark::new(0.5, 0.3, 0.0)),
            (index::CHIN, Landmark::new(0.5, 0.3 + opening, 0.0)),
            (index::LEFT_CHEEK, Landmark::new(0.5 - width / 2.0, 0.5, 0.0)),
            (index::RIGHT_CHEEK, Landmark::new(0.5 + width / 2.0, 0.5, 0.0)),
        ])
    }

    #[test]
    fn test_jaw_span_ratio() {
        let ratio = RatioExtractor::jaw_span().extract(&jaw_frame(0.4, 0.4)).unwrap();
        assert!((ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_is_scale_invariant() {
        let extractor = RatioExtractor::jaw_span();
        let near = extractor.extract(&jaw_frame(0.44, 0.4)).unwrap();
        let far = extractor.extract(&jaw_frame(0.22, 0.2)).unwrap();
        assert!((near - far).abs() < 1e-9);
    }

    #[test]
    fn test_lip_gap_uses_mean_scale() {
        let frame = LandmarkFrame::sparse(&[
            (index::NOSE_TIP, Landmark::new(0.5, 0.4, 0.0)),
            (index::FOREHEAD, Landmark::new(0.5, 0.2, 0.0)),
            (index::UPPER_LIP, Landmark::new(0.5, 0.60, 0.0)),
            (index::LOWER_LIP, Landmark::new(0.5, 0.63, 0.0)),
            (index::LEFT_CHEEK, Landmark::new(0.3, 0.5, 0.0)),
            (index::RIGHT_CHEEK, Landmark::new(0.7, 0.5, 0.0)),
        ]);

        // 0.03 / mean(0.4, 0.2)
        let ratio = RatioExtractor::lip_gap().extract(&frame).unwrap();
        assert!((ratio - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_missing_landmarks() {
        let frame = LandmarkFrame::sparse(&[(index::GLABELLA, Landmark::default())]);
        let err = RatioExtractor::jaw_span().extract(&frame).unwrap_err();
        assert!(matches!(err, LandmarkError::MissingLandmarks { index: 152, .. }));
    }

    #[test]
    fn test_degenerate_scale() {
        let err = RatioExtractor::jaw_span().extract(&jaw_frame(0.4, 0.0)).unwrap_err();
        assert_eq!(err, LandmarkError::DegenerateScale);
    }

    #[test]
    fn test_closed_opening_is_malformed() {
        let err = RatioExtractor::jaw_span().extract(&jaw_frame(0.0, 0.4)).unwrap_err();
        assert_eq!(err, LandmarkError::MalformedRatio(0.0));
    }

    #[test]
    fn test_required_indices() {
        assert_eq!(
            RatioExtractor::jaw_span().required_indices(),
            vec![index::GLABELLA, index::CHIN, index::LEFT_CHEEK, index::RIGHT_CHEEK]
        );
    }
}
