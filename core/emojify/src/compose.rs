use image::{DynamicImage, ImageBuffer, Pixel, RgbaImage};
use tracing::{debug, warn};

use crate::assets::OverlayAssets;
use crate::error::EmojifyError;
use crate::expression::Classifier;
use crate::face::FaceDescriptor;
use crate::placement::{place_overlay, HeightScaling, OverlayPlacement, SCALE_FACTOR};
use crate::{Emojified, EmojifiedImage};

/// Overlay sizing knobs shared by every face of one picture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeOptions {
    /// Overlay width as a fraction of the face width.
    pub scale_factor: f64,
    /// How the overlay height follows its width.
    pub height_scaling: HeightScaling,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            scale_factor: SCALE_FACTOR,
            height_scaling: HeightScaling::default(),
        }
    }
}

/// Alpha-blend `overlay` onto `canvas` with its top-left corner at `(x, y)`.
///
/// Overlay pixels falling outside the canvas are clipped; a negative origin
/// draws only the part of the overlay that lands inside.
pub fn draw_over<P>(
    canvas: &mut ImageBuffer<P, Vec<P::Subpixel>>,
    overlay: &ImageBuffer<P, Vec<P::Subpixel>>,
    x: i64,
    y: i64,
) where
    P: Pixel,
{
    image::imageops::overlay(canvas, overlay, x, y);
}

/// Return a copy of `background` with `overlay` scaled to `face` and drawn
/// over it. The result keeps the background's dimensions and color type.
pub fn composite(
    background: &DynamicImage,
    overlay: &DynamicImage,
    face: &FaceDescriptor,
    options: &CompositeOptions,
) -> Result<DynamicImage, EmojifyError> {
    face.validate()?;
    ensure_supported(background)?;

    let placement = place_overlay(
        face,
        overlay.width(),
        overlay.height(),
        options.scale_factor,
        options.height_scaling,
    )?;
    if placement.is_empty() {
        warn!(
            face_width = face.width,
            face_height = face.height,
            "face too small for an overlay, skipping"
        );
        return Ok(background.clone());
    }
    debug!(
        x = placement.x,
        y = placement.y,
        width = placement.width,
        height = placement.height,
        "overlay placement"
    );

    let Some((patch, left, top)) = visible_patch(&overlay.to_rgba8(), &placement, background)
    else {
        return Ok(background.clone());
    };

    Ok(blend_onto(background, patch, left, top))
}

/// Scale `overlay` to the placement size, keeping only the window that
/// lands inside `background`. Returns the patch and its clamped origin, or
/// `None` when the overlay misses the background entirely.
///
/// Sampling is nearest-neighbour without filtering, like a plain bitmap
/// rescale: target pixel `d` reads source pixel `d × src / scaled`.
fn visible_patch(
    overlay: &RgbaImage,
    placement: &OverlayPlacement,
    background: &DynamicImage,
) -> Option<(RgbaImage, i64, i64)> {
    let left = placement.x.max(0);
    let top = placement.y.max(0);
    let right = placement
        .x
        .saturating_add(i64::from(placement.width))
        .min(i64::from(background.width()));
    let bottom = placement
        .y
        .saturating_add(i64::from(placement.height))
        .min(i64::from(background.height()));
    if left >= right || top >= bottom {
        return None;
    }

    let (src_w, src_h) = overlay.dimensions();
    let (skip_x, skip_y) = ((left - placement.x) as u64, (top - placement.y) as u64);
    let patch = RgbaImage::from_fn((right - left) as u32, (bottom - top) as u32, |px, py| {
        let sx = (skip_x + u64::from(px)) * u64::from(src_w) / u64::from(placement.width);
        let sy = (skip_y + u64::from(py)) * u64::from(src_h) / u64::from(placement.height);
        *overlay.get_pixel(sx as u32, sy as u32)
    });
    Some((patch, left, top))
}

fn ensure_supported(background: &DynamicImage) -> Result<(), EmojifyError> {
    match background {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => Ok(()),
        other => Err(EmojifyError::AssetError(format!(
            "unsupported background pixel format: {:?}",
            other.color()
        ))),
    }
}

/// Draw `patch` onto a copy of `background`, going through an alpha-capable
/// buffer of the same channel layout and back.
fn blend_onto(background: &DynamicImage, patch: RgbaImage, x: i64, y: i64) -> DynamicImage {
    match background {
        DynamicImage::ImageRgba8(bg) => {
            let mut canvas = bg.clone();
            draw_over(&mut canvas, &patch, x, y);
            DynamicImage::ImageRgba8(canvas)
        }
        DynamicImage::ImageRgb8(_) => {
            let mut canvas = background.to_rgba8();
            draw_over(&mut canvas, &patch, x, y);
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
        }
        DynamicImage::ImageLumaA8(bg) => {
            let mut canvas = bg.clone();
            let top = DynamicImage::ImageRgba8(patch).to_luma_alpha8();
            draw_over(&mut canvas, &top, x, y);
            DynamicImage::ImageLumaA8(canvas)
        }
        _ => {
            let mut canvas = background.to_luma_alpha8();
            let top = DynamicImage::ImageRgba8(patch).to_luma_alpha8();
            draw_over(&mut canvas, &top, x, y);
            DynamicImage::ImageLuma8(DynamicImage::ImageLumaA8(canvas).to_luma8())
        }
    }
}

/// Classify every face and composite its overlay onto a running copy of
/// `source`, in input order.
pub(crate) fn emojify_faces(
    source: &DynamicImage,
    faces: &[FaceDescriptor],
    classifier: &Classifier,
    assets: &dyn OverlayAssets,
    options: &CompositeOptions,
) -> Result<Emojified, EmojifyError> {
    debug!(faces = faces.len(), "emojifying picture");

    if faces.is_empty() {
        return Ok(Emojified::NoFacesFound);
    }
    ensure_supported(source)?;

    let mut working = source.clone();
    let mut expressions = Vec::with_capacity(faces.len());
    for (index, face) in faces.iter().enumerate() {
        let expression = classifier.try_classify(face)?;
        let overlay = assets.overlay_for(expression)?;
        debug!(index, %expression, x = face.x, y = face.y, "compositing face");

        working = composite(&working, overlay, face, options)?;
        expressions.push(expression);
    }

    Ok(Emojified::Composited(EmojifiedImage {
        image: working,
        expressions,
    }))
}
