//! Render a synthetic picture with one emoji overlay per expression.
//!
//! Usage:
//!   RUST_LOG=emojify=debug cargo run --example render_sample [-- out.png]
//!
//! Writes `emojified_sample.png` to the current directory by default.

use emojify::{
    encode_image, Emojified, Emojifier, Expression, FaceDescriptor, OutputFormat, OverlaySet,
};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use tracing_subscriber::EnvFilter;

/// Filled disc tinted per expression, transparent outside the circle.
fn disc_overlay(index: usize) -> DynamicImage {
    let size = 64u32;
    let radius = size as f32 / 2.0;
    let tint = [(index * 32) as u8, 200, 255 - (index * 32) as u8, 255];
    let mut img = RgbaImage::new(size, size);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        if dx * dx + dy * dy <= radius * radius {
            *pixel = Rgba(tint);
        }
    }
    DynamicImage::ImageRgba8(img)
}

fn gradient_picture(width: u32, height: u32) -> DynamicImage {
    let mut img = RgbImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 96]);
    }
    DynamicImage::ImageRgb8(img)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "emojified_sample.png".to_string());

    let mut overlays = OverlaySet::new();
    for (i, expression) in Expression::ALL.into_iter().enumerate() {
        overlays.insert(expression, disc_overlay(i));
    }

    // One face per cube corner: left eye, right eye, smile.
    let mut faces = Vec::new();
    for i in 0..8u32 {
        let signal = |bit: u32| if i & bit != 0 { 0.9 } else { 0.1 };
        let column = f64::from(i % 4);
        let row = f64::from(i / 4);
        faces.push(
            FaceDescriptor::new(20.0 + column * 150.0, 40.0 + row * 180.0, 120.0, 140.0)
                .with_probabilities(signal(4), signal(2), signal(1)),
        );
    }

    let picture = gradient_picture(620, 400);
    match Emojifier::new().apply(&picture, &faces, &overlays).unwrap() {
        Emojified::Composited(result) => {
            for (face, expression) in faces.iter().zip(&result.expressions) {
                println!("  face at ({:.0}, {:.0}): {expression}", face.x, face.y);
            }
            let data = encode_image(&result.image, &OutputFormat::Png, 1.0).unwrap();
            std::fs::write(&output, &data).unwrap();
            println!("wrote {output} ({} bytes)", data.len());
        }
        Emojified::NoFacesFound => println!("no faces to draw"),
    }
}
