//! Raster canvas helpers shared by commands and the history.
//!
//! The canvas is a plain owned RGBA8 buffer. Every bitmap handed to the
//! history is normalized to this format before it is stored.

use image::{DynamicImage, Rgba, RgbaImage};

/// The mutable raster commands replay onto
pub type Canvas = RgbaImage;

/// Fully transparent pixel
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Create a fully transparent canvas
pub fn blank_canvas(width: u32, height: u32) -> Canvas {
    RgbaImage::from_pixel(width, height, TRANSPARENT)
}

/// Reset every pixel of the canvas to transparent
pub fn clear_canvas(canvas: &mut Canvas) {
    for pixel in canvas.pixels_mut() {
        *pixel = TRANSPARENT;
    }
}

/// Deep copy of `bitmap` in RGBA8, never sharing the caller's buffer
pub fn normalized_copy(bitmap: &DynamicImage) -> Canvas {
    bitmap.to_rgba8()
}
