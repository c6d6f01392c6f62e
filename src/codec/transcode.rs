//! Decode an upload, re-encode it as PNG, and base64 the result.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, GenericImageView, ImageOutputFormat};

use super::{CodecError, UploadedImage};

/// MIME type of every [`EncodedPayload`].
pub const PAYLOAD_MIME_TYPE: &str = "image/png";

/// Base64 (standard alphabet, padded) of an image serialized as PNG.
///
/// Built per request and never reused across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mime_type(&self) -> &'static str {
        PAYLOAD_MIME_TYPE
    }
}

/// RGBA pixels for the UI thumbnail.
#[derive(Debug, Clone)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decode `upload` strictly as its declared type.
///
/// # Errors
///
/// [`CodecError::Decode`] when the bytes are not a valid image of that type.
pub fn decode(upload: &UploadedImage) -> Result<DynamicImage, CodecError> {
    image::load_from_memory_with_format(&upload.bytes, upload.format.decoder_format()).map_err(
        |e| CodecError::Decode(format!("{} is not a valid {}: {e}", upload.name, upload.format.extension())),
    )
}

/// Serialize `image` as PNG bytes at full resolution.
pub fn to_png_bytes(image: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Re-encode `image` as PNG and base64 it.
pub fn encode_payload(image: &DynamicImage) -> Result<EncodedPayload, CodecError> {
    let png = to_png_bytes(image)?;
    Ok(EncodedPayload(general_purpose::STANDARD.encode(png)))
}

/// Downscale `image` to fit within `max_edge` and return RGBA pixels.
///
/// Images already smaller than `max_edge` keep their size.
pub fn preview_rgba(image: &DynamicImage, max_edge: u32) -> PreviewImage {
    let (w, h) = image.dimensions();
    let rgba = if w > max_edge || h > max_edge {
        image.thumbnail(max_edge, max_edge).to_rgba8()
    } else {
        image.to_rgba8()
    };
    PreviewImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ImageFormat;
    use image::{Rgb, RgbImage};

    fn sample_image(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn upload_as(format: ImageFormat, width: u32, height: u32) -> UploadedImage {
        let output = match format {
            ImageFormat::Png => ImageOutputFormat::Png,
            ImageFormat::Jpg | ImageFormat::Jpeg => ImageOutputFormat::Jpeg(90),
        };
        let mut bytes = Vec::new();
        sample_image(width, height)
            .write_to(&mut Cursor::new(&mut bytes), output)
            .expect("encode fixture");
        UploadedImage::new(format!("fixture.{}", format.extension()), bytes, format)
    }

    #[test]
    fn payload_decodes_back_to_png_with_same_dimensions() {
        for format in [ImageFormat::Jpg, ImageFormat::Jpeg, ImageFormat::Png] {
            let upload = upload_as(format, 123, 45);
            let decoded = decode(&upload).expect("decode");
            let payload = encode_payload(&decoded).expect("encode");

            let png = general_purpose::STANDARD
                .decode(payload.as_str())
                .expect("valid base64");
            let round = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
                .expect("payload is PNG");
            assert_eq!(round.dimensions(), (123, 45), "format {format:?}");
        }
    }

    #[test]
    fn payload_is_deterministic() {
        let decoded = decode(&upload_as(ImageFormat::Png, 16, 16)).unwrap();
        assert_eq!(
            encode_payload(&decoded).unwrap(),
            encode_payload(&decoded).unwrap()
        );
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let upload = UploadedImage::new("broken.png", b"definitely not a png".to_vec(), ImageFormat::Png);
        assert!(matches!(decode(&upload), Err(CodecError::Decode(_))));
    }

    #[test]
    fn declared_type_is_enforced() {
        // PNG bytes declared as JPEG must not decode.
        let mut upload = upload_as(ImageFormat::Png, 8, 8);
        upload.format = ImageFormat::Jpeg;
        assert!(matches!(decode(&upload), Err(CodecError::Decode(_))));
    }

    #[test]
    fn payload_is_png() {
        let decoded = decode(&upload_as(ImageFormat::Png, 2, 2)).unwrap();
        let payload = encode_payload(&decoded).unwrap();
        assert_eq!(payload.mime_type(), "image/png");
    }

    #[test]
    fn preview_is_bounded_and_keeps_aspect() {
        let preview = preview_rgba(&sample_image(400, 200), 100);
        assert_eq!((preview.width, preview.height), (100, 50));
        assert_eq!(preview.rgba.len(), 100 * 50 * 4);
    }

    #[test]
    fn small_preview_is_not_upscaled() {
        let preview = preview_rgba(&sample_image(30, 20), 100);
        assert_eq!((preview.width, preview.height), (30, 20));
    }
}
