//! Face-region cropping for template registration.
//!
//! The external `index` call stores one template per image, so the identity
//! commit submits only the assigned face's region rather than the whole
//! group photo. A padding margin keeps enough context around tight detection
//! boxes for the service to re-detect the face.

use std::io::Cursor;

use image::ImageFormat;

use facia_core::geometry::BoundingBox;

use crate::error::EngineError;

/// Fraction of the box dimensions added on each side before cropping.
const CROP_PADDING: f64 = 0.1;

/// Crop `region` (image-relative) out of `image_bytes`, with padding clamped
/// to the image bounds, re-encoded as PNG.
pub fn crop_face_region(image_bytes: &[u8], region: &BoundingBox) -> Result<Vec<u8>, EngineError> {
    let img = image::load_from_memory(image_bytes)?;
    let (img_w, img_h) = (img.width() as f64, img.height() as f64);

    let pad_x = region.width * CROP_PADDING;
    let pad_y = region.height * CROP_PADDING;

    let left = ((region.left - pad_x) * img_w).max(0.0);
    let top = ((region.top - pad_y) * img_h).max(0.0);
    let right = ((region.right() + pad_x) * img_w).min(img_w);
    let bottom = ((region.bottom() + pad_y) * img_h).min(img_h);

    let x = left as u32;
    let y = top as u32;
    let width = ((right - left) as u32).max(1).min(img.width() - x);
    let height = ((bottom - top) as u32).max(1).min(img.height() - y);

    let cropped = img.crop_imm(x, y, width, height);

    let mut out = Cursor::new(Vec::new());
    cropped.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use image::RgbImage;

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn crops_padded_region() {
        let bytes = png_bytes(200, 100);
        let region = BoundingBox::new(0.25, 0.2, 0.5, 0.5);

        let cropped = crop_face_region(&bytes, &region).unwrap();
        let img = image::load_from_memory(&cropped).unwrap();

        // 0.5 * 200 = 100px wide plus 10% padding on both sides -> 120px.
        assert_eq!(img.width(), 120);
        // 0.5 * 100 = 50px tall plus 5px padding on both sides -> 60px.
        assert_eq!(img.height(), 60);
    }

    #[test]
    fn padding_clamps_at_image_edges() {
        let bytes = png_bytes(100, 100);
        let region = BoundingBox::new(0.0, 0.0, 0.5, 0.5);

        let cropped = crop_face_region(&bytes, &region).unwrap();
        let img = image::load_from_memory(&cropped).unwrap();

        // Left/top padding cannot go below zero.
        assert_eq!(img.width(), 55);
        assert_eq!(img.height(), 55);
    }

    #[test]
    fn rejects_undecodable_bytes() {
        let region = BoundingBox::new(0.1, 0.1, 0.3, 0.3);
        assert!(matches!(
            crop_face_region(b"definitely not an image", &region),
            Err(EngineError::Image(_))
        ));
    }
}
