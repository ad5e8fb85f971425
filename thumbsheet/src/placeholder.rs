//! Image served before any sheet has been built.

use crate::compose::{encode_png, ComposeError};
use bytes::Bytes;
use image::RgbaImage;

/// Encodes a 1×1 fully transparent PNG.
pub fn transparent_pixel() -> Result<Bytes, ComposeError> {
    encode_png(&RgbaImage::new(1, 1)).map(Bytes::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_one_transparent_pixel() {
        let png = transparent_pixel().unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();

        assert_eq!(img.dimensions(), (1, 1));
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }
}
