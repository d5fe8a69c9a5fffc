use image::DynamicImage;

use crate::error::EmojifyError;

/// A detected face: bounding box plus the detector's expression signals.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FaceDescriptor {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Probability in `[0, 1]` that the left eye is open.
    pub left_eye_open_probability: f32,
    /// Probability in `[0, 1]` that the right eye is open.
    pub right_eye_open_probability: f32,
    /// Probability in `[0, 1]` that the face is smiling.
    pub smiling_probability: f32,
}

impl FaceDescriptor {
    /// Face at the given bounding box with all probabilities at zero.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            left_eye_open_probability: 0.0,
            right_eye_open_probability: 0.0,
            smiling_probability: 0.0,
        }
    }

    /// Set the left-eye-open, right-eye-open and smiling probabilities.
    pub fn with_probabilities(
        mut self,
        left_eye_open: f32,
        right_eye_open: f32,
        smiling: f32,
    ) -> Self {
        self.left_eye_open_probability = left_eye_open;
        self.right_eye_open_probability = right_eye_open;
        self.smiling_probability = smiling;
        self
    }

    /// Center of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check the detector contract: finite position, positive extents and
    /// probabilities within `[0, 1]`.
    pub fn validate(&self) -> Result<(), EmojifyError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(EmojifyError::InvalidInput(format!(
                "face position ({}, {}) is not finite",
                self.x, self.y
            )));
        }
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(EmojifyError::InvalidInput(format!(
                "face size {}x{} must be positive",
                self.width, self.height
            )));
        }

        let probabilities = [
            ("left eye open", self.left_eye_open_probability),
            ("right eye open", self.right_eye_open_probability),
            ("smiling", self.smiling_probability),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(EmojifyError::InvalidInput(format!(
                    "{name} probability must be within [0, 1], got {p}"
                )));
            }
        }
        Ok(())
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to hook an on-device detector (ML Kit, ONNX, etc.)
/// into [`crate::Emojifier::detect_and_apply`]. Detectors must report the
/// eye-open and smiling probabilities along with the bounding box.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in `image`, in the order they should be composited.
    fn detect(&self, image: &DynamicImage) -> Vec<FaceDescriptor>;
}
