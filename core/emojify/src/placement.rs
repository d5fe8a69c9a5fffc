use crate::error::EmojifyError;
use crate::face::FaceDescriptor;

/// Fraction of the face width covered by the overlay.
pub const SCALE_FACTOR: f64 = 0.9;

/// How the overlay height follows its width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum HeightScaling {
    /// Aspect-scaled height multiplied by the scale factor a second time.
    /// Overlays come out slightly squashed; kept for parity with the
    /// existing app's output.
    #[default]
    Compounded,

    /// Height follows the width's aspect ratio only.
    AspectPreserving,
}

/// Where and how large an overlay is drawn, in background pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPlacement {
    /// Left edge; negative when the overlay starts off-image.
    pub x: i64,
    /// Top edge; negative when the overlay starts off-image.
    pub y: i64,
    /// Scaled overlay width.
    pub width: u32,
    /// Scaled overlay height.
    pub height: u32,
}

impl OverlayPlacement {
    /// True when the scaled overlay has no visible pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Compute the scaled size and top-left corner of an overlay for `face`.
///
/// The width is `face.width × scale_factor` truncated to whole pixels; the
/// height keeps the overlay's aspect ratio using integer division, then
/// (for [`HeightScaling::Compounded`]) is scaled again and truncated.
/// Horizontally the overlay is centered on the face. Vertically the face
/// center sits one third of the way down the overlay, so the overlay's
/// eyes line up with the face's.
pub fn place_overlay(
    face: &FaceDescriptor,
    overlay_width: u32,
    overlay_height: u32,
    scale_factor: f64,
    height_scaling: HeightScaling,
) -> Result<OverlayPlacement, EmojifyError> {
    if overlay_width == 0 || overlay_height == 0 {
        return Err(EmojifyError::InvalidInput(format!(
            "overlay has zero size ({overlay_width}x{overlay_height})"
        )));
    }
    if !(scale_factor.is_finite() && scale_factor > 0.0) {
        return Err(EmojifyError::InvalidInput(format!(
            "scale factor must be positive, got {scale_factor}"
        )));
    }

    let width = (face.width * scale_factor) as u32;
    let aspect_height = u64::from(overlay_height) * u64::from(width) / u64::from(overlay_width);
    let height = match height_scaling {
        HeightScaling::Compounded => (aspect_height as f64 * scale_factor) as u32,
        HeightScaling::AspectPreserving => u32::try_from(aspect_height).unwrap_or(u32::MAX),
    };

    let (center_x, center_y) = face.center();
    let x = (center_x - f64::from(width / 2)).floor() as i64;
    let y = (center_y - f64::from(height / 3)).floor() as i64;

    Ok(OverlayPlacement {
        x,
        y,
        width,
        height,
    })
}
