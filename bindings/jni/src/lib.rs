uniffi::setup_scaffolding!();

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum EmojifyError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("overlay asset error: {message}")]
    AssetError { message: String },
    #[error("failed to decode image: {message}")]
    DecodeError { message: String },
    #[error("failed to encode image: {message}")]
    EncodeError { message: String },
    #[error("invalid quality value")]
    InvalidQuality,
}

impl From<emojify_core::EmojifyError> for EmojifyError {
    fn from(e: emojify_core::EmojifyError) -> Self {
        match e {
            emojify_core::EmojifyError::InvalidInput(message) => {
                EmojifyError::InvalidInput { message }
            }
            emojify_core::EmojifyError::AssetError(message) => EmojifyError::AssetError { message },
            emojify_core::EmojifyError::DecodeError(message) => {
                EmojifyError::DecodeError { message }
            }
            emojify_core::EmojifyError::EncodeError(message) => {
                EmojifyError::EncodeError { message }
            }
            emojify_core::EmojifyError::InvalidQuality(_) => EmojifyError::InvalidQuality,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum Expression {
    BothEyesOpenSmile,
    BothEyesOpenFrown,
    BothEyesClosedSmile,
    BothEyesClosedFrown,
    LeftEyeOpenSmile,
    LeftEyeOpenFrown,
    RightEyeOpenSmile,
    RightEyeOpenFrown,
}

impl From<Expression> for emojify_core::Expression {
    fn from(expression: Expression) -> Self {
        match expression {
            Expression::BothEyesOpenSmile => emojify_core::Expression::BothEyesOpenSmile,
            Expression::BothEyesOpenFrown => emojify_core::Expression::BothEyesOpenFrown,
            Expression::BothEyesClosedSmile => emojify_core::Expression::BothEyesClosedSmile,
            Expression::BothEyesClosedFrown => emojify_core::Expression::BothEyesClosedFrown,
            Expression::LeftEyeOpenSmile => emojify_core::Expression::LeftEyeOpenSmile,
            Expression::LeftEyeOpenFrown => emojify_core::Expression::LeftEyeOpenFrown,
            Expression::RightEyeOpenSmile => emojify_core::Expression::RightEyeOpenSmile,
            Expression::RightEyeOpenFrown => emojify_core::Expression::RightEyeOpenFrown,
        }
    }
}

impl From<emojify_core::Expression> for Expression {
    fn from(expression: emojify_core::Expression) -> Self {
        match expression {
            emojify_core::Expression::BothEyesOpenSmile => Expression::BothEyesOpenSmile,
            emojify_core::Expression::BothEyesOpenFrown => Expression::BothEyesOpenFrown,
            emojify_core::Expression::BothEyesClosedSmile => Expression::BothEyesClosedSmile,
            emojify_core::Expression::BothEyesClosedFrown => Expression::BothEyesClosedFrown,
            emojify_core::Expression::LeftEyeOpenSmile => Expression::LeftEyeOpenSmile,
            emojify_core::Expression::LeftEyeOpenFrown => Expression::LeftEyeOpenFrown,
            emojify_core::Expression::RightEyeOpenSmile => Expression::RightEyeOpenSmile,
            emojify_core::Expression::RightEyeOpenFrown => Expression::RightEyeOpenFrown,
        }
    }
}

#[derive(uniffi::Enum)]
pub enum HeightScaling {
    Compounded,
    AspectPreserving,
}

impl From<HeightScaling> for emojify_core::HeightScaling {
    fn from(scaling: HeightScaling) -> Self {
        match scaling {
            HeightScaling::Compounded => emojify_core::HeightScaling::Compounded,
            HeightScaling::AspectPreserving => emojify_core::HeightScaling::AspectPreserving,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
}

impl From<OutputFormat> for emojify_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Png => emojify_core::OutputFormat::Png,
            OutputFormat::Jpeg => emojify_core::OutputFormat::Jpeg,
            OutputFormat::Webp => emojify_core::OutputFormat::Webp,
        }
    }
}

#[derive(Clone, uniffi::Record)]
pub struct FaceDescriptor {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub left_eye_open_probability: f32,
    pub right_eye_open_probability: f32,
    pub smiling_probability: f32,
}

impl From<&FaceDescriptor> for emojify_core::FaceDescriptor {
    fn from(face: &FaceDescriptor) -> Self {
        emojify_core::FaceDescriptor::new(face.x, face.y, face.width, face.height)
            .with_probabilities(
                face.left_eye_open_probability,
                face.right_eye_open_probability,
                face.smiling_probability,
            )
    }
}

#[derive(Clone, uniffi::Record)]
pub struct Thresholds {
    pub left_eye_open: f32,
    pub right_eye_open: f32,
    pub smiling: f32,
}

impl From<Thresholds> for emojify_core::Thresholds {
    fn from(t: Thresholds) -> Self {
        emojify_core::Thresholds {
            left_eye_open: t.left_eye_open,
            right_eye_open: t.right_eye_open,
            smiling: t.smiling,
        }
    }
}

/// Encoded overlay bytes for one expression.
#[derive(uniffi::Record)]
pub struct OverlayAsset {
    pub expression: Expression,
    pub data: Vec<u8>,
}

#[derive(uniffi::Record)]
pub struct EmojifiedPhoto {
    pub data: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub expressions: Vec<Expression>,
}

#[derive(uniffi::Enum)]
pub enum EmojifyOutcome {
    Composited { photo: EmojifiedPhoto },
    NoFacesFound,
}

fn overlay_set(overlays: Vec<OverlayAsset>) -> Result<emojify_core::OverlaySet, EmojifyError> {
    let set = emojify_core::OverlaySet::from_encoded(
        overlays
            .into_iter()
            .map(|asset| (emojify_core::Expression::from(asset.expression), asset.data)),
    )?;
    Ok(set)
}

/// Default classification thresholds (0.54 / 0.57 / 0.2).
#[uniffi::export]
pub fn default_thresholds() -> Thresholds {
    let t = emojify_core::Thresholds::default();
    Thresholds {
        left_eye_open: t.left_eye_open,
        right_eye_open: t.right_eye_open,
        smiling: t.smiling,
    }
}

/// Overlay resource key for an expression ("smile", "leftwink", ...).
#[uniffi::export]
pub fn asset_key(expression: Expression) -> String {
    emojify_core::Expression::from(expression).asset_key().to_string()
}

/// Classify one face.
#[uniffi::export]
pub fn classify(face: FaceDescriptor, thresholds: Thresholds) -> Result<Expression, EmojifyError> {
    let thresholds = emojify_core::Thresholds::from(thresholds);
    thresholds.validate()?;
    let expression = emojify_core::Classifier::new(thresholds).try_classify(&(&face).into())?;
    Ok(expression.into())
}

/// Emojify with default thresholds and sizing, returning PNG bytes.
#[uniffi::export]
pub fn emojify_with_defaults(
    input: Vec<u8>,
    faces: Vec<FaceDescriptor>,
    overlays: Vec<OverlayAsset>,
) -> Result<EmojifyOutcome, EmojifyError> {
    emojify(
        input,
        faces,
        overlays,
        default_thresholds(),
        HeightScaling::Compounded,
        emojify_core::SCALE_FACTOR,
        OutputFormat::Png,
        0.9,
    )
}

/// Emojify with full control over all parameters.
#[uniffi::export]
pub fn emojify(
    input: Vec<u8>,
    faces: Vec<FaceDescriptor>,
    overlays: Vec<OverlayAsset>,
    thresholds: Thresholds,
    height_scaling: HeightScaling,
    scale_factor: f64,
    format: OutputFormat,
    quality: f32,
) -> Result<EmojifyOutcome, EmojifyError> {
    let picture = emojify_core::decode_image(&input)?;
    let faces: Vec<emojify_core::FaceDescriptor> = faces.iter().map(Into::into).collect();
    let assets = overlay_set(overlays)?;

    let outcome = emojify_core::Emojifier::new()
        .thresholds(thresholds.into())
        .height_scaling(height_scaling.into())
        .scale_factor(scale_factor)
        .apply(&picture, &faces, &assets)?;

    let result = match outcome {
        emojify_core::Emojified::Composited(result) => result,
        emojify_core::Emojified::NoFacesFound => return Ok(EmojifyOutcome::NoFacesFound),
    };
    let data = emojify_core::encode_image(&result.image, &format.into(), quality)?;

    Ok(EmojifyOutcome::Composited {
        photo: EmojifiedPhoto {
            data,
            format,
            width: result.image.width(),
            height: result.image.height(),
            expressions: result.expressions.into_iter().map(Into::into).collect(),
        },
    })
}
