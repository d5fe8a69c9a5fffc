use emojify::{
    composite, decode_image, encode_image, place_overlay, CompositeOptions, Emojified, Emojifier,
    EmojifyError, Expression, FaceDescriptor, HeightScaling, OutputFormat, OverlayAssets,
    OverlaySet, SCALE_FACTOR,
};
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};

const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

fn make_picture(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, BACKGROUND))
}

fn make_overlay_png(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, pixel);
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
    buffer
}

/// Solid 100x100 overlays, one distinct color per expression.
fn colored_overlays() -> OverlaySet {
    OverlaySet::from_encoded(Expression::ALL.into_iter().enumerate().map(|(i, e)| {
        let shade = 30 * (i as u8 + 1);
        (e, make_overlay_png(100, 100, Rgba([shade, 255 - shade, 77, 255])))
    }))
    .unwrap()
}

fn color_of(assets: &OverlaySet, expression: Expression) -> Rgb<u8> {
    let p = assets.overlay_for(expression).unwrap().to_rgba8().get_pixel(0, 0).0;
    Rgb([p[0], p[1], p[2]])
}

#[test]
fn single_smiling_face_end_to_end() {
    let overlays = colored_overlays();
    let face = FaceDescriptor::new(50.0, 50.0, 100.0, 100.0).with_probabilities(0.9, 0.9, 0.9);

    let outcome = Emojifier::new()
        .apply(&make_picture(300, 300), &[face], &overlays)
        .unwrap();
    assert_eq!(outcome.expressions(), &[Expression::BothEyesOpenSmile]);

    let placement =
        place_overlay(&face, 100, 100, SCALE_FACTOR, HeightScaling::Compounded).unwrap();
    assert_eq!(placement.x, 50 + 50 - i64::from(placement.width / 2));
    assert_eq!(placement.y, 50 + 50 - i64::from(placement.height / 3));

    let image = outcome.into_image().unwrap();
    let rgb = image.as_rgb8().unwrap();
    let smile = color_of(&overlays, Expression::BothEyesOpenSmile);
    let (x, y) = (placement.x as u32, placement.y as u32);
    assert_eq!(rgb.get_pixel(x, y), &smile);
    assert_eq!(rgb.get_pixel(x + placement.width - 1, y + placement.height - 1), &smile);
    assert_eq!(rgb.get_pixel(x - 1, y), &BACKGROUND);
    assert_eq!(rgb.get_pixel(x, y + placement.height), &BACKGROUND);
}

#[test]
fn empty_face_list_is_no_faces_found() {
    let outcome = Emojifier::new()
        .apply(&make_picture(50, 50), &[], &colored_overlays())
        .unwrap();
    assert!(matches!(outcome, Emojified::NoFacesFound));
    assert!(outcome.into_image().is_none());
}

#[test]
fn two_faces_are_placed_independently() {
    let overlays = colored_overlays();
    let left = FaceDescriptor::new(10.0, 20.0, 80.0, 80.0).with_probabilities(0.9, 0.1, 0.9);
    let right = FaceDescriptor::new(200.0, 120.0, 120.0, 120.0).with_probabilities(0.1, 0.1, 0.0);

    let outcome = Emojifier::new()
        .apply(&make_picture(400, 300), &[left, right], &overlays)
        .unwrap();
    assert_eq!(
        outcome.expressions(),
        &[Expression::LeftEyeOpenSmile, Expression::BothEyesClosedFrown]
    );

    let image = outcome.into_image().unwrap();
    let rgb = image.as_rgb8().unwrap();
    for (face, expression) in [
        (left, Expression::LeftEyeOpenSmile),
        (right, Expression::BothEyesClosedFrown),
    ] {
        let p = place_overlay(&face, 100, 100, SCALE_FACTOR, HeightScaling::Compounded).unwrap();
        let center = (p.x as u32 + p.width / 2, p.y as u32 + p.height / 2);
        assert_eq!(rgb.get_pixel(center.0, center.1), &color_of(&overlays, expression));
    }
}

#[test]
fn later_faces_draw_over_earlier_ones() {
    let overlays = colored_overlays();
    let first = FaceDescriptor::new(50.0, 50.0, 100.0, 100.0).with_probabilities(0.9, 0.9, 0.9);
    let second = FaceDescriptor::new(50.0, 50.0, 100.0, 100.0).with_probabilities(0.9, 0.9, 0.0);

    let image = Emojifier::new()
        .apply(&make_picture(200, 200), &[first, second], &overlays)
        .unwrap()
        .into_image()
        .unwrap();
    assert_eq!(
        image.as_rgb8().unwrap().get_pixel(100, 100),
        &color_of(&overlays, Expression::BothEyesOpenFrown)
    );
}

#[test]
fn output_keeps_source_dimensions() {
    let face = FaceDescriptor::new(150.0, 150.0, 200.0, 200.0).with_probabilities(0.6, 0.6, 0.3);
    let image = Emojifier::new()
        .apply(&make_picture(257, 193), &[face], &colored_overlays())
        .unwrap()
        .into_image()
        .unwrap();
    assert_eq!((image.width(), image.height()), (257, 193));
}

#[test]
fn source_picture_is_not_modified() {
    let picture = make_picture(120, 120);
    let snapshot = picture.clone();
    let face = FaceDescriptor::new(10.0, 10.0, 100.0, 100.0).with_probabilities(0.9, 0.9, 0.9);
    Emojifier::new().apply(&picture, &[face], &colored_overlays()).unwrap();
    assert_eq!(picture, snapshot);
}

#[test]
fn repeated_runs_are_identical() {
    let overlays = colored_overlays();
    let faces = [
        FaceDescriptor::new(12.3, 45.6, 78.9, 91.2).with_probabilities(0.55, 0.56, 0.21),
        FaceDescriptor::new(140.0, 20.0, 33.0, 40.0).with_probabilities(0.2, 0.8, 0.1),
    ];
    let emojifier = Emojifier::new();
    let a = emojifier.apply(&make_picture(200, 150), &faces, &overlays).unwrap();
    let b = emojifier.apply(&make_picture(200, 150), &faces, &overlays).unwrap();
    assert_eq!(a.expressions(), b.expressions());
    assert_eq!(a.image(), b.image());
}

#[test]
fn aspect_preserving_toggle_draws_taller_overlay() {
    let overlays = colored_overlays();
    let face = FaceDescriptor::new(50.0, 50.0, 100.0, 100.0).with_probabilities(0.9, 0.9, 0.9);
    let options = CompositeOptions {
        height_scaling: HeightScaling::AspectPreserving,
        ..CompositeOptions::default()
    };
    let overlay = overlays.overlay_for(Expression::BothEyesOpenSmile).unwrap();

    let compounded =
        composite(&make_picture(200, 200), overlay, &face, &CompositeOptions::default()).unwrap();
    let preserved = composite(&make_picture(200, 200), overlay, &face, &options).unwrap();

    // Compounded: 90x81 at (55, 73). Aspect preserving: 90x90 at (55, 70).
    let smile = color_of(&overlays, Expression::BothEyesOpenSmile);
    assert_eq!(compounded.as_rgb8().unwrap().get_pixel(100, 72), &BACKGROUND);
    assert_eq!(preserved.as_rgb8().unwrap().get_pixel(100, 72), &smile);
    assert_eq!(preserved.as_rgb8().unwrap().get_pixel(100, 159), &smile);
    assert_eq!(compounded.as_rgb8().unwrap().get_pixel(100, 159), &BACKGROUND);
}

#[test]
fn face_far_larger_than_picture_fills_it() {
    let overlays = colored_overlays();
    let face =
        FaceDescriptor::new(32.0 - 5e5, 32.0 - 5e5, 1e6, 1e6).with_probabilities(0.9, 0.9, 0.9);

    let outcome = Emojifier::new()
        .apply(&make_picture(64, 64), &[face], &overlays)
        .unwrap();

    let smile = color_of(&overlays, Expression::BothEyesOpenSmile);
    let image = outcome.into_image().unwrap();
    assert_eq!((image.width(), image.height()), (64, 64));
    assert!(image.as_rgb8().unwrap().pixels().all(|p| *p == smile));
}

#[test]
fn custom_asset_source_is_consulted() {
    struct OnlyFrowns(DynamicImage);

    impl OverlayAssets for OnlyFrowns {
        fn overlay_for(&self, expression: Expression) -> Result<&DynamicImage, EmojifyError> {
            match expression {
                Expression::BothEyesOpenFrown | Expression::BothEyesClosedFrown => Ok(&self.0),
                other => Err(EmojifyError::AssetError(format!("no {other}"))),
            }
        }
    }

    let gray = RgbaImage::from_pixel(10, 10, Rgba([9, 9, 9, 255]));
    let assets = OnlyFrowns(DynamicImage::ImageRgba8(gray));
    let frown = FaceDescriptor::new(0.0, 0.0, 50.0, 50.0).with_probabilities(0.9, 0.9, 0.0);
    let smile = FaceDescriptor::new(0.0, 0.0, 50.0, 50.0).with_probabilities(0.9, 0.9, 0.9);

    assert!(Emojifier::new().apply(&make_picture(60, 60), &[frown], &assets).is_ok());
    assert!(matches!(
        Emojifier::new().apply(&make_picture(60, 60), &[frown, smile], &assets),
        Err(EmojifyError::AssetError(_))
    ));
}

#[test]
fn encoded_round_trip_through_host_boundary() {
    let mut source = Vec::new();
    PngEncoder::new(&mut source)
        .write_image(&[0u8; 64 * 64 * 3], 64, 64, ExtendedColorType::Rgb8)
        .unwrap();

    let picture = decode_image(&source).unwrap();
    let face = FaceDescriptor::new(0.0, 0.0, 64.0, 64.0).with_probabilities(0.0, 0.0, 0.0);
    let image = Emojifier::new()
        .apply(&picture, &[face], &colored_overlays())
        .unwrap()
        .into_image()
        .unwrap();

    let encoded = encode_image(&image, &OutputFormat::Png, 1.0).unwrap();
    let decoded = decode_image(&encoded).unwrap();
    assert_eq!(decoded.to_rgb8(), image.to_rgb8());
}
