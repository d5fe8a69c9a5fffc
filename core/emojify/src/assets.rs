use std::collections::HashMap;

use image::DynamicImage;

use crate::codec::decode_image;
use crate::error::EmojifyError;
use crate::expression::Expression;

/// Source of the overlay drawn for each [`Expression`].
///
/// Implement this to serve overlays from bundled resources, a cache, or
/// anything else; [`OverlaySet`] is the in-memory implementation.
pub trait OverlayAssets {
    /// Overlay for `expression`, or [`EmojifyError::AssetError`] if none is
    /// available.
    fn overlay_for(&self, expression: Expression) -> Result<&DynamicImage, EmojifyError>;
}

/// Decoded overlays keyed by expression.
#[derive(Debug, Clone, Default)]
pub struct OverlaySet {
    overlays: HashMap<Expression, DynamicImage>,
}

impl OverlaySet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode each `(expression, bytes)` pair (PNG, JPEG or WebP).
    pub fn from_encoded<I, B>(entries: I) -> Result<Self, EmojifyError>
    where
        I: IntoIterator<Item = (Expression, B)>,
        B: AsRef<[u8]>,
    {
        let mut set = Self::new();
        for (expression, bytes) in entries {
            set.insert_encoded(expression, bytes.as_ref())?;
        }
        Ok(set)
    }

    /// Add or replace the overlay for `expression`, returning the previous one.
    pub fn insert(
        &mut self,
        expression: Expression,
        overlay: DynamicImage,
    ) -> Option<DynamicImage> {
        self.overlays.insert(expression, overlay)
    }

    /// Builder form of [`OverlaySet::insert`].
    pub fn with(mut self, expression: Expression, overlay: DynamicImage) -> Self {
        self.insert(expression, overlay);
        self
    }

    /// Decode `bytes` and store it as the overlay for `expression`.
    pub fn insert_encoded(
        &mut self,
        expression: Expression,
        bytes: &[u8],
    ) -> Result<(), EmojifyError> {
        let overlay = decode_image(bytes)
            .map_err(|e| EmojifyError::AssetError(format!("overlay {expression}: {e}")))?;
        self.insert(expression, overlay);
        Ok(())
    }

    /// Overlay for `expression`, if present.
    pub fn get(&self, expression: Expression) -> Option<&DynamicImage> {
        self.overlays.get(&expression)
    }

    /// Expressions with no overlay yet, in declaration order.
    pub fn missing(&self) -> Vec<Expression> {
        Expression::ALL
            .into_iter()
            .filter(|e| !self.overlays.contains_key(e))
            .collect()
    }

    /// True once all eight expressions have an overlay.
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Number of stored overlays.
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    /// True when no overlay is stored.
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

impl OverlayAssets for OverlaySet {
    fn overlay_for(&self, expression: Expression) -> Result<&DynamicImage, EmojifyError> {
        self.get(expression).ok_or_else(|| {
            EmojifyError::AssetError(format!("no overlay for expression {expression}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

    fn make_overlay_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 200, 0, 255]));
        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
            .unwrap();
        buffer
    }

    #[test]
    fn lookup_hits_inserted_overlay() {
        let set =
            OverlaySet::new().with(Expression::BothEyesOpenSmile, DynamicImage::new_rgba8(3, 2));
        let overlay = set.overlay_for(Expression::BothEyesOpenSmile).unwrap();
        assert_eq!((overlay.width(), overlay.height()), (3, 2));
    }

    #[test]
    fn missing_overlay_is_asset_error() {
        let set = OverlaySet::new();
        assert!(matches!(
            set.overlay_for(Expression::RightEyeOpenFrown),
            Err(EmojifyError::AssetError(_))
        ));
    }

    #[test]
    fn from_encoded_decodes_png() {
        let png = make_overlay_png(8, 6);
        let set = OverlaySet::from_encoded(Expression::ALL.map(|e| (e, png.clone()))).unwrap();
        assert!(set.is_complete());
        assert_eq!(set.len(), 8);
        assert_eq!(set.get(Expression::LeftEyeOpenSmile).unwrap().width(), 8);
    }

    #[test]
    fn undecodable_overlay_is_asset_error() {
        let result =
            OverlaySet::from_encoded([(Expression::BothEyesOpenSmile, b"not an image".to_vec())]);
        assert!(matches!(result, Err(EmojifyError::AssetError(_))));
    }

    #[test]
    fn missing_lists_gaps_in_order() {
        let set = OverlaySet::new()
            .with(Expression::BothEyesOpenSmile, DynamicImage::new_rgba8(1, 1))
            .with(Expression::RightEyeOpenSmile, DynamicImage::new_rgba8(1, 1));
        let missing = set.missing();
        assert_eq!(missing.len(), 6);
        assert_eq!(missing[0], Expression::BothEyesOpenFrown);
        assert!(!missing.contains(&Expression::RightEyeOpenSmile));
        assert!(!set.is_complete());
    }

    #[test]
    fn insert_replaces_previous() {
        let mut set = OverlaySet::new();
        assert!(set
            .insert(Expression::BothEyesClosedFrown, DynamicImage::new_rgba8(1, 1))
            .is_none());
        let previous = set.insert(Expression::BothEyesClosedFrown, DynamicImage::new_rgba8(2, 2));
        assert_eq!(previous.map(|p| p.width()), Some(1));
    }
}
