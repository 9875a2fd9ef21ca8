//! Image encoding: `DynamicImage` → opaque RGB PNG bytes.
//!
//! Output images never carry an alpha channel. Transparent pixels are
//! composited onto white, matching what a viewer shows for a blank page.
//! PNG is lossless, so rendered text stays crisp.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Composite `img` onto an opaque white background.
pub fn flatten(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
    })
}

/// `c·α + 255·(1-α)` in 8-bit fixed point, rounded.
fn over_white(c: u8, alpha: u8) -> u8 {
    let (c, a) = (c as u32, alpha as u32);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Flatten and PNG-encode a rasterised page.
pub fn encode_page(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let rgb = flatten(img);
    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} page → {} bytes PNG",
        rgb.width(),
        rgb.height(),
        buf.len()
    );
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_drops_alpha_channel() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let png = encode_page(&img).expect("encode should succeed");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).expect("valid png");
        assert!(!decoded.color().has_alpha());
        assert_eq!(decoded.width(), 10);
        assert_eq!(decoded.to_rgb8().get_pixel(3, 3), &Rgb([255, 0, 0]));
    }

    #[test]
    fn transparent_pixels_become_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])));
        assert_eq!(flatten(&img).get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn half_alpha_blends_toward_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128])));
        let px = flatten(&img).get_pixel(0, 0).0;
        assert!(px[0] > 120 && px[0] < 135, "got {px:?}");
    }

    #[test]
    fn opaque_rgb_passes_through() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 1, Rgb([10, 20, 30])));
        assert_eq!(flatten(&img).get_pixel(2, 0), &Rgb([10, 20, 30]));
    }
}
