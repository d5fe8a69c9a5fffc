use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageEncoder, ImageFormat, ImageReader, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

use crate::compose::draw_over;
use crate::error::EmojifyError;
use crate::OutputFormat;

/// Decode an encoded picture or overlay, sniffing the container from its
/// leading bytes.
pub fn decode_image(input: &[u8]) -> Result<DynamicImage, EmojifyError> {
    let decode_error = |e: &dyn std::fmt::Display| EmojifyError::DecodeError(e.to_string());
    ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| decode_error(&e))?
        .decode()
        .map_err(|e| decode_error(&e))
}

/// Container format of `input`, without decoding pixels.
pub fn detect_format(input: &[u8]) -> Result<ImageFormat, EmojifyError> {
    image::guess_format(input).map_err(|e| EmojifyError::DecodeError(e.to_string()))
}

/// JPEG has no alpha: transparent regions end up white.
pub(crate) fn flatten_alpha(image: &DynamicImage) -> RgbImage {
    let mut canvas = RgbaImage::from_pixel(image.width(), image.height(), Rgba([255; 4]));
    draw_over(&mut canvas, &image.to_rgba8(), 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// Encode a composited image for handing back to a host.
///
/// PNG and WebP are lossless and keep the image's color type; JPEG drops
/// alpha by flattening onto white and uses `quality` (0.0–1.0).
pub fn encode_image(
    image: &DynamicImage,
    format: &OutputFormat,
    quality: f32,
) -> Result<Vec<u8>, EmojifyError> {
    if !(0.0..=1.0).contains(&quality) {
        return Err(EmojifyError::InvalidQuality(quality));
    }

    let mut buffer = Vec::new();
    match format {
        OutputFormat::Png => {
            image
                .write_with_encoder(PngEncoder::new(&mut buffer))
                .map_err(|e| EmojifyError::EncodeError(e.to_string()))?;
        }
        OutputFormat::Webp => {
            image
                .write_with_encoder(WebPEncoder::new_lossless(&mut buffer))
                .map_err(|e| EmojifyError::EncodeError(e.to_string()))?;
        }
        OutputFormat::Jpeg => {
            let rgb = flatten_alpha(image);
            let quality_percent = (quality * 100.0).round().max(1.0) as u8;
            JpegEncoder::new_with_quality(&mut buffer, quality_percent)
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| EmojifyError::EncodeError(e.to_string()))?;
        }
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_rgba(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbaImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = image::Rgba([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
                255,
            ]);
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn png_round_trip_preserves_pixels() {
        let img = make_test_rgba(16, 12);
        let data = encode_image(&img, &OutputFormat::Png, 1.0).unwrap();
        assert_eq!(detect_format(&data).unwrap(), ImageFormat::Png);
        let decoded = decode_image(&data).unwrap();
        assert_eq!(decoded.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn encode_jpeg_produces_valid_output() {
        let img = make_test_rgba(48, 64);
        let data = encode_image(&img, &OutputFormat::Jpeg, 0.8).unwrap();
        assert_eq!(data[0], 0xFF);
        assert_eq!(data[1], 0xD8);
    }

    #[test]
    fn encode_webp_produces_valid_output() {
        let img = make_test_rgba(48, 64);
        let data = encode_image(&img, &OutputFormat::Webp, 0.8).unwrap();
        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(&data[8..12], b"WEBP");
    }

    #[test]
    fn quality_out_of_range_is_rejected() {
        let img = make_test_rgba(4, 4);
        assert!(matches!(
            encode_image(&img, &OutputFormat::Jpeg, 1.5),
            Err(EmojifyError::InvalidQuality(_))
        ));
    }

    fn flatten_pixel(pixel: [u8; 4]) -> [u8; 3] {
        let rgba = RgbaImage::from_pixel(1, 1, Rgba(pixel));
        flatten_alpha(&DynamicImage::ImageRgba8(rgba)).get_pixel(0, 0).0
    }

    #[test]
    fn transparent_pixels_turn_white_for_jpeg() {
        assert_eq!(flatten_pixel([255, 0, 0, 0]), [255, 255, 255]);
        assert_eq!(flatten_pixel([100, 150, 200, 255]), [100, 150, 200]);
    }

    #[test]
    fn half_transparent_red_turns_pink_for_jpeg() {
        let [r, g, b] = flatten_pixel([255, 0, 0, 128]);
        assert_eq!(r, 255);
        // white weighted by 127/255
        assert!((125..=129).contains(&g), "g = {g}");
        assert!((125..=129).contains(&b), "b = {b}");
    }

    #[test]
    fn jpeg_of_transparent_image_decodes_light() {
        let clear = DynamicImage::ImageRgba8(RgbaImage::new(16, 16));
        let data = encode_image(&clear, &OutputFormat::Jpeg, 0.9).unwrap();
        let decoded = decode_image(&data).unwrap().to_rgb8();
        assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c > 240)));
    }

    #[test]
    fn invalid_input_returns_error() {
        assert!(matches!(decode_image(b"not an image"), Err(EmojifyError::DecodeError(_))));
    }
}
