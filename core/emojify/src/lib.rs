//! Emoji overlays for detected faces: classify each face's expression from
//! its eye-open and smiling probabilities, then composite the matching
//! overlay onto the picture, scaled to the face width.
//!
//! # Example
//!
//! ```no_run
//! use emojify::{Emojified, Emojifier, Expression, FaceDescriptor, OverlaySet};
//!
//! let picture = emojify::decode_image(&std::fs::read("group.jpg").unwrap()).unwrap();
//! let overlays = OverlaySet::from_encoded(
//!     Expression::ALL.map(|e| (e, std::fs::read(format!("{e}.png")).unwrap())),
//! )
//! .unwrap();
//!
//! let faces = [FaceDescriptor::new(50.0, 50.0, 100.0, 100.0).with_probabilities(0.9, 0.9, 0.9)];
//! match Emojifier::new().apply(&picture, &faces, &overlays).unwrap() {
//!     Emojified::Composited(result) => println!("drew {:?}", result.expressions),
//!     Emojified::NoFacesFound => println!("no faces"),
//! }
//! ```
#![warn(missing_docs)]

mod assets;
mod codec;
mod compose;
mod error;
mod expression;
/// Face descriptors and the detector seam.
pub mod face;
mod placement;

/// Overlay lookup by expression.
pub use assets::{OverlayAssets, OverlaySet};
/// Host boundary helpers.
pub use codec::{decode_image, detect_format, encode_image};
/// Single-face compositing.
pub use compose::{composite, draw_over, CompositeOptions};
/// Error type returned by emojify operations.
pub use error::EmojifyError;
/// Expression classification.
pub use expression::{
    Classifier, Expression, Thresholds, LEFT_EYE_THRESHOLD, RIGHT_EYE_THRESHOLD, SMILE_THRESHOLD,
};
/// Face descriptor and face detection trait.
pub use face::{FaceDescriptor, FaceDetector};
/// Overlay geometry.
pub use placement::{place_overlay, HeightScaling, OverlayPlacement, SCALE_FACTOR};

use image::DynamicImage;
use tracing::debug;

/// Encoded output format for hosts that want bytes back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless PNG, keeps the source color type.
    #[default]
    Png,

    /// JPEG; alpha is flattened onto white.
    Jpeg,

    /// Lossless WebP.
    Webp,
}

/// A picture with one overlay drawn per face.
#[derive(Debug, Clone)]
pub struct EmojifiedImage {
    /// The composited picture, same size and color type as the source.
    pub image: DynamicImage,

    /// Expression chosen for each face, in input order.
    pub expressions: Vec<Expression>,
}

/// Outcome of emojifying one picture.
#[derive(Debug, Clone)]
pub enum Emojified {
    /// At least one face was found and composited.
    Composited(EmojifiedImage),

    /// The face list was empty; nothing was drawn. Hosts usually tell the
    /// user instead of showing a result.
    NoFacesFound,
}

impl Emojified {
    /// True for [`Emojified::NoFacesFound`].
    pub fn is_no_faces(&self) -> bool {
        matches!(self, Emojified::NoFacesFound)
    }

    /// Composited picture, if any faces were found.
    pub fn image(&self) -> Option<&DynamicImage> {
        match self {
            Emojified::Composited(result) => Some(&result.image),
            Emojified::NoFacesFound => None,
        }
    }

    /// Take the composited picture, if any faces were found.
    pub fn into_image(self) -> Option<DynamicImage> {
        match self {
            Emojified::Composited(result) => Some(result.image),
            Emojified::NoFacesFound => None,
        }
    }

    /// Expression chosen per face; empty when no faces were found.
    pub fn expressions(&self) -> &[Expression] {
        match self {
            Emojified::Composited(result) => &result.expressions,
            Emojified::NoFacesFound => &[],
        }
    }
}

/// Builder for classifying faces and compositing their overlays.
///
/// Holds no per-picture state; one `Emojifier` can process any number of
/// pictures.
#[derive(Default)]
pub struct Emojifier {
    thresholds: Thresholds,
    options: CompositeOptions,
    /// Used by [`Emojifier::detect_and_apply`]. Detection itself lives
    /// outside this crate.
    detector: Option<Box<dyn FaceDetector>>,
}

impl Emojifier {
    /// Create an emojifier with the default thresholds and overlay sizing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the eye-open and smiling thresholds (defaults 0.54 / 0.57 / 0.2).
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the overlay width as a fraction of the face width (default 0.9).
    pub fn scale_factor(mut self, scale_factor: f64) -> Self {
        self.options.scale_factor = scale_factor;
        self
    }

    /// Choose how the overlay height is derived (default
    /// [`HeightScaling::Compounded`]).
    pub fn height_scaling(mut self, height_scaling: HeightScaling) -> Self {
        self.options.height_scaling = height_scaling;
        self
    }

    /// Provide the face detector used by [`Emojifier::detect_and_apply`].
    ///
    /// ```no_run
    /// use emojify::{Emojifier, FaceDescriptor, FaceDetector, OverlaySet};
    /// use image::DynamicImage;
    ///
    /// struct MyDetector;
    /// impl FaceDetector for MyDetector {
    ///     fn detect(&self, _image: &DynamicImage) -> Vec<FaceDescriptor> {
    ///         // Your detection logic here
    ///         vec![]
    ///     }
    /// }
    ///
    /// let picture = DynamicImage::new_rgb8(640, 480);
    /// let outcome = Emojifier::new()
    ///     .face_detector(Box::new(MyDetector))
    ///     .detect_and_apply(&picture, &OverlaySet::new())
    ///     .unwrap();
    /// assert!(outcome.is_no_faces());
    /// ```
    pub fn face_detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Classifier built from the configured thresholds.
    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.thresholds)
    }

    /// Overlay sizing in effect.
    pub fn composite_options(&self) -> &CompositeOptions {
        &self.options
    }

    /// Classify a single face.
    pub fn classify(&self, face: &FaceDescriptor) -> Expression {
        self.classifier().classify(face)
    }

    /// Composite one overlay per face onto a copy of `picture`, in the order
    /// given. An empty `faces` slice yields [`Emojified::NoFacesFound`].
    pub fn apply(
        &self,
        picture: &DynamicImage,
        faces: &[FaceDescriptor],
        assets: &dyn OverlayAssets,
    ) -> Result<Emojified, EmojifyError> {
        self.thresholds.validate()?;

        compose::emojify_faces(picture, faces, &self.classifier(), assets, &self.options)
    }

    /// Run the configured detector on `picture`, then [`Emojifier::apply`].
    pub fn detect_and_apply(
        &self,
        picture: &DynamicImage,
        assets: &dyn OverlayAssets,
    ) -> Result<Emojified, EmojifyError> {
        let detector = self
            .detector
            .as_deref()
            .ok_or_else(|| EmojifyError::InvalidInput("no face detector configured".into()))?;

        let faces = detector.detect(picture);
        debug!(faces = faces.len(), "face detection finished");
        self.apply(picture, &faces, assets)
    }
}
