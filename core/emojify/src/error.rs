use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmojifyError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("overlay asset error: {0}")]
    AssetError(String),

    #[error("failed to decode image: {0}")]
    DecodeError(String),

    #[error("failed to encode image: {0}")]
    EncodeError(String),

    #[error("quality must be between 0.0 and 1.0, got {0}")]
    InvalidQuality(f32),
}
