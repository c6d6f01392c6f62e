//! Image codec: upload → bitmap → PNG → base64.
//!
//! ```text
//! UploadedImage { bytes, declared format }
//!        │ decode()            (strict: bytes must match the declared type)
//!        ▼
//! image::DynamicImage ──preview_rgba()──▶ PreviewImage (UI thumbnail)
//!        │ encode_payload()    (full resolution, no compression tuning)
//!        ▼
//! EncodedPayload (base64 PNG)
//! ```

pub mod transcode;
pub mod upload;

pub use transcode::{
    decode, encode_payload, preview_rgba, to_png_bytes, EncodedPayload, PreviewImage,
    PAYLOAD_MIME_TYPE,
};
pub use upload::{ImageFormat, UploadedImage};

use thiserror::Error;

/// Errors raised while reading, decoding or re-encoding an upload.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// The file extension is not one of jpg / jpeg / png.
    #[error("unsupported image type '{0}' (expected jpg, jpeg or png)")]
    UnsupportedFormat(String),

    /// The upload could not be read from disk.
    #[error("cannot read image: {0}")]
    Io(String),

    /// The bytes are not a valid image of the declared type.
    #[error("cannot decode image: {0}")]
    Decode(String),

    /// PNG re-encoding failed.
    #[error("cannot encode image as PNG: {0}")]
    Encode(String),
}
