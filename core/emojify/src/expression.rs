use std::fmt;
use std::str::FromStr;

use crate::error::EmojifyError;
use crate::face::FaceDescriptor;

/// Default left-eye-open threshold.
pub const LEFT_EYE_THRESHOLD: f32 = 0.54;

/// Default right-eye-open threshold.
pub const RIGHT_EYE_THRESHOLD: f32 = 0.57;

/// Default smiling threshold.
pub const SMILE_THRESHOLD: f32 = 0.2;

/// Expression category for one face. Each variant selects one overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expression {
    /// Both eyes open, smiling.
    BothEyesOpenSmile,
    /// Both eyes open, not smiling.
    BothEyesOpenFrown,
    /// Both eyes closed, smiling.
    BothEyesClosedSmile,
    /// Both eyes closed, not smiling.
    BothEyesClosedFrown,
    /// Left eye open, right eye closed, smiling.
    LeftEyeOpenSmile,
    /// Left eye open, right eye closed, not smiling.
    LeftEyeOpenFrown,
    /// Right eye open, left eye closed, smiling.
    RightEyeOpenSmile,
    /// Right eye open, left eye closed, not smiling.
    RightEyeOpenFrown,
}

impl Expression {
    /// All eight categories in declaration order.
    pub const ALL: [Expression; 8] = [
        Expression::BothEyesOpenSmile,
        Expression::BothEyesOpenFrown,
        Expression::BothEyesClosedSmile,
        Expression::BothEyesClosedFrown,
        Expression::LeftEyeOpenSmile,
        Expression::LeftEyeOpenFrown,
        Expression::RightEyeOpenSmile,
        Expression::RightEyeOpenFrown,
    ];

    /// Map the three thresholded signals to a category.
    pub fn from_signals(left_eye_open: bool, right_eye_open: bool, smiling: bool) -> Self {
        match (left_eye_open, right_eye_open, smiling) {
            (true, true, true) => Expression::BothEyesOpenSmile,
            (true, true, false) => Expression::BothEyesOpenFrown,
            (false, false, true) => Expression::BothEyesClosedSmile,
            (false, false, false) => Expression::BothEyesClosedFrown,
            (true, false, true) => Expression::LeftEyeOpenSmile,
            (true, false, false) => Expression::LeftEyeOpenFrown,
            (false, true, true) => Expression::RightEyeOpenSmile,
            (false, true, false) => Expression::RightEyeOpenFrown,
        }
    }

    /// Key of the overlay drawn for this category.
    pub fn asset_key(self) -> &'static str {
        match self {
            Expression::BothEyesOpenSmile => "smile",
            Expression::BothEyesOpenFrown => "frown",
            Expression::BothEyesClosedSmile => "closed_smile",
            Expression::BothEyesClosedFrown => "closed_frown",
            Expression::LeftEyeOpenSmile => "leftwink",
            Expression::LeftEyeOpenFrown => "leftwinkfrown",
            Expression::RightEyeOpenSmile => "rightwink",
            Expression::RightEyeOpenFrown => "rightwinkfrown",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset_key())
    }
}

impl FromStr for Expression {
    type Err = EmojifyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Expression::ALL
            .into_iter()
            .find(|e| e.asset_key() == key)
            .ok_or_else(|| EmojifyError::InvalidInput(format!("unknown expression key: {key}")))
    }
}

/// Inclusive lower bounds above which a signal counts as "open" or "smiling".
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Thresholds {
    /// Left-eye-open threshold (default 0.54).
    pub left_eye_open: f32,
    /// Right-eye-open threshold (default 0.57).
    pub right_eye_open: f32,
    /// Smiling threshold (default 0.2).
    pub smiling: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            left_eye_open: LEFT_EYE_THRESHOLD,
            right_eye_open: RIGHT_EYE_THRESHOLD,
            smiling: SMILE_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Reject thresholds outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), EmojifyError> {
        let values = [
            ("left eye", self.left_eye_open),
            ("right eye", self.right_eye_open),
            ("smile", self.smiling),
        ];
        for (name, t) in values {
            if !(0.0..=1.0).contains(&t) {
                return Err(EmojifyError::InvalidInput(format!(
                    "{name} threshold must be within [0, 1], got {t}"
                )));
            }
        }
        Ok(())
    }
}

/// Thresholds each probability of a face and picks its [`Expression`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Classifier {
    thresholds: Thresholds,
}

impl Classifier {
    /// Create a classifier with custom thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Classify a face. Total over any input; out-of-range probabilities are
    /// simply compared against the thresholds.
    pub fn classify(&self, face: &FaceDescriptor) -> Expression {
        let t = &self.thresholds;
        Expression::from_signals(
            face.left_eye_open_probability >= t.left_eye_open,
            face.right_eye_open_probability >= t.right_eye_open,
            face.smiling_probability >= t.smiling,
        )
    }

    /// Validate `face` first, then classify it.
    pub fn try_classify(&self, face: &FaceDescriptor) -> Result<Expression, EmojifyError> {
        face.validate()?;
        Ok(self.classify(face))
    }
}
