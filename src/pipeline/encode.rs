//! Canvas composition and PNG encoding for captured pages.
//!
//! The raw capture is pasted onto a canvas of the target width, filled with
//! the theme background and 5 px taller than the capture, so the last line of
//! content never touches the image edge. The capture's own height is never
//! cropped.

use crate::error::RasterError;
use crate::theme::Theme;
use image::{imageops, DynamicImage, RgbaImage};
use std::io::Cursor;
use tracing::debug;

/// Extra pixels below the captured content.
pub const BOTTOM_MARGIN_PX: u32 = 5;

/// Paste `capture` onto a theme-coloured canvas of `width` px.
///
/// Captures narrower than `width` are centred; wider ones are clipped on the
/// right, matching a fixed-width viewport.
pub fn compose_canvas(
    capture: &DynamicImage,
    width: u32,
    theme: Theme,
) -> Result<RgbaImage, RasterError> {
    let (cw, ch) = (capture.width(), capture.height());
    if cw == 0 || ch == 0 {
        return Err(RasterError::EmptyCapture {
            width: cw,
            height: ch,
        });
    }

    let mut canvas = RgbaImage::from_pixel(width, ch + BOTTOM_MARGIN_PX, theme.background_rgba());
    let x = (i64::from(width) - i64::from(cw)).max(0) / 2;
    imageops::overlay(&mut canvas, &capture.to_rgba8(), x, 0);

    debug!(
        "Composed canvas {}x{} from {}x{} capture",
        canvas.width(),
        canvas.height(),
        cw,
        ch
    );
    Ok(canvas)
}

/// Encode an image as PNG bytes.
///
/// PNG is lossless, so text edges stay crisp for sharing.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, RasterError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!("Encoded image → {} bytes PNG", buf.len());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn canvas_is_five_px_taller_and_themed() {
        let capture =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(750, 1200, Rgba([10, 20, 30, 255])));
        let canvas = compose_canvas(&capture, 750, Theme::Dark).unwrap();
        assert_eq!(canvas.dimensions(), (750, 1205));
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
        assert_eq!(*canvas.get_pixel(0, 1204), Theme::Dark.background_rgba());
    }

    #[test]
    fn narrow_capture_is_centred() {
        let capture =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(700, 10, Rgba([0, 0, 0, 255])));
        let canvas = compose_canvas(&capture, 750, Theme::Light).unwrap();
        assert_eq!(*canvas.get_pixel(0, 0), Theme::Light.background_rgba());
        assert_eq!(*canvas.get_pixel(25, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn empty_capture_is_rejected() {
        let capture = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        assert!(matches!(
            compose_canvas(&capture, 750, Theme::Light),
            Err(RasterError::EmptyCapture { .. })
        ));
    }

    #[test]
    fn encode_produces_png() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let png = encode_png(&img).expect("encode should succeed");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
