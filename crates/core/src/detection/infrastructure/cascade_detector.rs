use std::path::{Path, PathBuf};

use opencv::core::{Mat, Rect, Scalar, Size, Vector, CV_8UC3};
use opencv::imgproc;
use opencv::objdetect::{self, CascadeClassifier};
use opencv::prelude::*;
use thiserror::Error;

use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::min_face_size::MinFaceSize;
use crate::shared::face_rect::FaceRect;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("cascade path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),
    #[error("failed to load cascade from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: opencv::Error,
    },
    #[error("cascade file {0} is empty or not a trained classifier")]
    Empty(PathBuf),
    #[error("expected a 3-channel RGB frame, got {0} channel(s)")]
    Channels(u8),
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

/// Face detector backed by an OpenCV cascade classifier (Haar or LBP).
///
/// Frames are converted to equalized grayscale before multi-scale
/// detection. The minimum face size is 20% of the first frame's height by
/// default; the maximum is unbounded unless configured.
pub struct CascadeFaceDetector {
    classifier: CascadeClassifier,
    params: DetectionParams,
    min_face_size: MinFaceSize,
    path: PathBuf,
}

impl CascadeFaceDetector {
    pub fn load(path: &Path, params: DetectionParams) -> Result<Self, CascadeError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| CascadeError::InvalidPath(path.to_path_buf()))?;
        let classifier = CascadeClassifier::new(path_str).map_err(|e| CascadeError::Load {
            path: path.to_path_buf(),
            source: e,
        })?;
        let empty = classifier.empty().map_err(|e| CascadeError::Load {
            path: path.to_path_buf(),
            source: e,
        })?;
        if empty {
            return Err(CascadeError::Empty(path.to_path_buf()));
        }

        log::info!("Loaded cascade classifier from {}", path.display());
        Ok(Self {
            classifier,
            min_face_size: MinFaceSize::new(params.min_face_ratio),
            params,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn set_params(&mut self, params: &DetectionParams) {
        self.params = *params;
        self.min_face_size = MinFaceSize::new(params.min_face_ratio);
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceRect>, Box<dyn std::error::Error>> {
        let image = equalized_gray(frame)?;

        let min = self.min_face_size.resolve(frame.height());
        let max = self.params.max_face_size.unwrap_or(0);

        let mut faces = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &image,
            &mut faces,
            self.params.scale_factor,
            self.params.min_neighbors,
            objdetect::CASCADE_SCALE_IMAGE,
            Size::new(min, min),
            Size::new(max, max),
        )?;

        Ok(faces
            .iter()
            .filter_map(|r| {
                FaceRect::new(r.x, r.y, r.width, r.height).clamp_to(frame.width(), frame.height())
            })
            .collect())
    }
}

/// Converts an RGB [`Frame`] to the histogram-equalized grayscale `Mat` the
/// cascade runs on.
fn equalized_gray(frame: &Frame) -> Result<Mat, CascadeError> {
    if frame.channels() != 3 {
        return Err(CascadeError::Channels(frame.channels()));
    }

    let mut rgb = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        CV_8UC3,
        Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(frame.data());

    let mut gray = Mat::default();
    imgproc::cvt_color_def(&rgb, &mut gray, imgproc::COLOR_RGB2GRAY)?;
    let mut equalized = Mat::default();
    imgproc::equalize_hist(&gray, &mut equalized)?;
    Ok(equalized)
}
