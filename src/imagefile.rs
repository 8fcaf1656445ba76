//! PNG loading and saving.

use std::io::Read;

use image::{DynamicImage, GrayImage, Luma};
use log::debug;

use crate::canvas::Canvas;
use crate::error::Error;

/// Load an image job's bitmap from `path`, or from standard input when the
/// path is `-`, reduced to black and white with the given luma threshold.
pub fn load(path: &str, threshold: u8) -> Result<Canvas, Error> {
    let img = if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| {
                debug!("reading stdin failed: {}", e);
                Error::ImageLoad(path.to_string())
            })?;
        image::load_from_memory(&buf)
    } else {
        image::open(path)
    }
    .map_err(|e| {
        debug!("decoding '{}' failed: {}", path, e);
        Error::ImageLoad(path.to_string())
    })?;
    Ok(from_image(&img, threshold))
}

/// Reduce a decoded image to a monochrome canvas. Pixels darker than or
/// equal to `threshold` become ink.
pub fn from_image(img: &DynamicImage, threshold: u8) -> Canvas {
    let gray = img.to_luma8();
    let mut canvas = Canvas::new(gray.width(), gray.height());
    for (x, y, Luma([luma])) in gray.enumerate_pixels() {
        if *luma <= threshold {
            canvas.set(x as i32, y as i32, true);
        }
    }
    canvas
}

/// Write the composed strip to a PNG file instead of printing it.
pub fn save(canvas: &Canvas, path: &str) -> Result<(), Error> {
    let mut img = GrayImage::new(canvas.width(), canvas.height());
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Luma([if canvas.get(x, y) { 0 } else { 255 }]);
    }
    img.save(path).map_err(|e| {
        debug!("encoding '{}' failed: {}", path, e);
        Error::ImageSave(path.to_string())
    })
}
