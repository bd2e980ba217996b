/// CPU rasterizer and image encoders for the card display list

use super::layout::GLYPH_SIZE;
use super::paint::PaintCommand;
use crate::{Error, ImageFormat, Result, Viewport};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};
use std::io::Cursor;

fn blend(dst: &mut Rgba<u8>, (r, g, b, a): (u8, u8, u8, u8)) {
    let a = a as u32;
    let inv = 255 - a;
    dst[0] = ((r as u32 * a + dst[0] as u32 * inv) / 255) as u8;
    dst[1] = ((g as u32 * a + dst[1] as u32 * inv) / 255) as u8;
    dst[2] = ((b as u32 * a + dst[2] as u32 * inv) / 255) as u8;
    dst[3] = (a + dst[3] as u32 * inv / 255) as u8;
}

fn fill_rect(img: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, rgba: (u8, u8, u8, u8)) {
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = ((x as i64 + width as i64).max(0) as u32).min(img.width());
    let y1 = ((y as i64 + height as i64).max(0) as u32).min(img.height());
    for py in y0..y1 {
        for px in x0..x1 {
            blend(img.get_pixel_mut(px, py), rgba);
        }
    }
}

fn draw_text(img: &mut RgbaImage, x: i32, y: i32, text: &str, scale: u32, rgba: (u8, u8, u8, u8)) {
    let cell = (GLYPH_SIZE * scale) as i32;
    for (i, ch) in text.chars().enumerate() {
        // unknown glyphs render as '?'
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')).unwrap_or([0; 8]);
        let gx = x + i as i32 * cell;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8 {
                if *bits & (1u8 << col) == 0 {
                    continue;
                }
                fill_rect(
                    img,
                    gx + col * scale as i32,
                    y + row as i32 * scale as i32,
                    scale,
                    scale,
                    rgba,
                );
            }
        }
    }
}

/// Execute a display list onto a fresh transparent buffer.
pub fn rasterize(commands: &[PaintCommand], viewport: Viewport) -> RgbaImage {
    let mut img = RgbaImage::new(viewport.width, viewport.height);
    for cmd in commands {
        match cmd {
            PaintCommand::Image { image: bg } => {
                image::imageops::replace(&mut img, bg.as_ref(), 0, 0);
            }
            PaintCommand::SolidRect {
                x,
                y,
                width,
                height,
                rgba,
            } => fill_rect(&mut img, *x, *y, *width, *height, *rgba),
            PaintCommand::Text {
                x,
                y,
                text,
                scale,
                rgba,
            } => draw_text(&mut img, *x, *y, text, *scale, *rgba),
        }
    }
    img
}

/// Encode a rendered card. `quality` only affects lossy formats.
pub fn encode(img: &RgbaImage, format: ImageFormat, quality: f32) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    match format {
        ImageFormat::Png => {
            img.write_to(&mut buffer, image::ImageFormat::Png)
                .map_err(|e| Error::CaptureFailure(format!("PNG encoding failed: {}", e)))?;
        }
        ImageFormat::Jpeg => {
            let q = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
            let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, q);
            encoder
                .encode_image(&rgb)
                .map_err(|e| Error::CaptureFailure(format!("JPEG encoding failed: {}", e)))?;
        }
    }
    Ok(buffer.into_inner())
}
