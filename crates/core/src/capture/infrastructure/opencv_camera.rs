use opencv::core::{Mat, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use thiserror::Error;

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("failed to open camera #{index}")]
    Open { index: i32 },
    #[error("camera is not open")]
    NotOpened,
    #[error("unsupported capture format (OpenCV type {0}), expected 8-bit BGR")]
    UnsupportedFormat(i32),
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

/// Camera device read through OpenCV's `VideoCapture`.
///
/// Frames arrive as BGR `Mat`s and are converted to RGB [`Frame`]s. The
/// device is released on [`FrameSource::release`] or when dropped.
pub struct OpenCvCamera {
    index: i32,
    capture: Option<VideoCapture>,
    sequence: usize,
}

impl OpenCvCamera {
    pub fn new(index: i32) -> Self {
        Self {
            index,
            capture: None,
            sequence: 0,
        }
    }

    pub fn index(&self) -> i32 {
        self.index
    }
}

/// Backends tried in order when opening a device index.
fn backends() -> &'static [i32] {
    #[cfg(target_os = "linux")]
    {
        &[videoio::CAP_V4L, videoio::CAP_ANY]
    }
    #[cfg(not(target_os = "linux"))]
    {
        &[videoio::CAP_ANY]
    }
}

impl FrameSource for OpenCvCamera {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.release();
        for &backend in backends() {
            match VideoCapture::new(self.index, backend) {
                Ok(capture) => {
                    if capture.is_opened().map_err(CaptureError::from)? {
                        log::info!("Opened camera #{} (backend {backend})", self.index);
                        self.capture = Some(capture);
                        self.sequence = 0;
                        return Ok(());
                    }
                }
                Err(e) => {
                    log::debug!(
                        "Failed to open camera #{} with backend {backend}: {e}",
                        self.index
                    );
                }
            }
        }
        Err(CaptureError::Open { index: self.index }.into())
    }

    fn is_opened(&self) -> bool {
        self.capture
            .as_ref()
            .map(|c| c.is_opened().unwrap_or(false))
            .unwrap_or(false)
    }

    fn grab(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let capture = self.capture.as_mut().ok_or(CaptureError::NotOpened)?;

        let mut mat = Mat::default();
        let read = capture.read(&mut mat).map_err(CaptureError::from)?;
        if !read || mat.empty() {
            return Ok(None);
        }

        let frame = mat_to_frame(&mat, self.sequence)?;
        self.sequence += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            match capture.release() {
                Ok(()) => log::info!("Released camera #{}", self.index),
                Err(e) => log::warn!("Failed to release camera #{}: {e}", self.index),
            }
        }
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        self.release();
    }
}

/// Copies an 8-bit BGR `Mat` into an RGB [`Frame`].
fn mat_to_frame(mat: &Mat, sequence: usize) -> Result<Frame, CaptureError> {
    let typ = mat.typ();
    if typ != CV_8UC3 {
        return Err(CaptureError::UnsupportedFormat(typ));
    }

    // cvt_color allocates a fresh, continuous destination.
    let mut rgb = Mat::default();
    imgproc::cvt_color_def(mat, &mut rgb, imgproc::COLOR_BGR2RGB)?;

    Ok(Frame::new(
        rgb.data_bytes()?.to_vec(),
        rgb.cols() as u32,
        rgb.rows() as u32,
        3,
        sequence,
    ))
}
