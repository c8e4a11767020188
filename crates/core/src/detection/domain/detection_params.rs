use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_MIN_FACE_RATIO, DEFAULT_MIN_NEIGHBORS, DEFAULT_SCALE_FACTOR,
};

#[derive(Error, Debug, PartialEq)]
pub enum ParamsError {
    #[error("scale factor must be greater than 1.0, got {0}")]
    ScaleFactor(f64),
    #[error("min neighbors must be at least 0, got {0}")]
    MinNeighbors(i32),
    #[error("min face ratio must be in (0.0, 1.0], got {0}")]
    MinFaceRatio(f32),
    #[error("max face size must be positive, got {0}")]
    MaxFaceSize(i32),
}

/// Tunables passed through to multi-scale cascade detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionParams {
    /// How much the search window grows between scales.
    pub scale_factor: f64,
    /// Overlapping candidates required to keep a detection.
    pub min_neighbors: i32,
    /// Smallest face to look for, as a fraction of the frame height.
    pub min_face_ratio: f32,
    /// Largest face to look for, in pixels; `None` is unbounded.
    pub max_face_size: Option<i32>,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            min_face_ratio: DEFAULT_MIN_FACE_RATIO,
            max_face_size: None,
        }
    }
}

impl DetectionParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.scale_factor.is_nan() || self.scale_factor <= 1.0 {
            return Err(ParamsError::ScaleFactor(self.scale_factor));
        }
        if self.min_neighbors < 0 {
            return Err(ParamsError::MinNeighbors(self.min_neighbors));
        }
        if self.min_face_ratio.is_nan() || self.min_face_ratio <= 0.0 || self.min_face_ratio > 1.0 {
            return Err(ParamsError::MinFaceRatio(self.min_face_ratio));
        }
        if let Some(max) = self.max_face_size {
            if max <= 0 {
                return Err(ParamsError::MaxFaceSize(max));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let p = DetectionParams::default();
        assert_relative_eq!(p.scale_factor, 1.1);
        assert_eq!(p.min_neighbors, 2);
        assert_relative_eq!(p.min_face_ratio, 0.2);
        assert_eq!(p.max_face_size, None);
        assert!(p.validate().is_ok());
    }

    #[rstest]
    #[case(DetectionParams { scale_factor: 1.0, ..Default::default() }, ParamsError::ScaleFactor(1.0))]
    #[case(DetectionParams { scale_factor: f64::NAN, ..Default::default() }, ParamsError::ScaleFactor(f64::NAN))]
    #[case(DetectionParams { min_neighbors: -1, ..Default::default() }, ParamsError::MinNeighbors(-1))]
    #[case(DetectionParams { min_face_ratio: 0.0, ..Default::default() }, ParamsError::MinFaceRatio(0.0))]
    #[case(DetectionParams { min_face_ratio: 1.5, ..Default::default() }, ParamsError::MinFaceRatio(1.5))]
    #[case(DetectionParams { max_face_size: Some(0), ..Default::default() }, ParamsError::MaxFaceSize(0))]
    fn test_invalid_params(#[case] params: DetectionParams, #[case] expected: ParamsError) {
        let err = params.validate().unwrap_err();
        assert_eq!(
            std::mem::discriminant(&err),
            std::mem::discriminant(&expected)
        );
    }

    #[test]
    fn test_full_height_ratio_is_valid() {
        let p = DetectionParams {
            min_face_ratio: 1.0,
            ..Default::default()
        };
        assert!(p.validate().is_ok());
    }
}
