//! Uploaded image bytes and their declared format.

use std::path::Path;

use super::CodecError;

/// Image types accepted by the upload field.
///
/// `Jpg` and `Jpeg` are distinct only so the declared extension survives
/// round-trips through the UI; both decode as JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpg,
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Extensions listed in the upload dialog, in display order.
    pub const ACCEPTED_EXTENSIONS: [&'static str; 3] = ["jpg", "jpeg", "png"];

    /// Parse a file extension (without the dot), case-insensitively.
    ///
    /// ```
    /// use perceiva::codec::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_extension("JPG").unwrap(), ImageFormat::Jpg);
    /// assert!(ImageFormat::from_extension("gif").is_err());
    /// ```
    pub fn from_extension(ext: &str) -> Result<Self, CodecError> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" => Ok(Self::Jpg),
            "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(CodecError::UnsupportedFormat(other.to_string())),
        }
    }

    /// The decoder used for this declared type.
    pub fn decoder_format(self) -> image::ImageFormat {
        match self {
            Self::Jpg | Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

/// Raw bytes of a user upload plus the format declared by its file name.
///
/// Lives only as long as the current upload; the dispatcher replaces it on
/// the next upload and drops it on clear.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Display name (file name without directories).
    pub name: String,
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl UploadedImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, format: ImageFormat) -> Self {
        Self {
            name: name.into(),
            bytes,
            format,
        }
    }

    /// Read an upload from disk; the declared format comes from the extension.
    ///
    /// # Errors
    ///
    /// - [`CodecError::UnsupportedFormat`]: missing or unknown extension.
    /// - [`CodecError::Io`]: the file could not be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CodecError> {
        let path = path.as_ref();

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| CodecError::UnsupportedFormat(path.display().to_string()))?;
        let format = ImageFormat::from_extension(ext)?;

        let bytes = std::fs::read(path)
            .map_err(|e| CodecError::Io(format!("{}: {e}", path.display())))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, bytes, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(ImageFormat::from_extension("PNG").unwrap(), ImageFormat::Png);
        assert_eq!(ImageFormat::from_extension("Jpeg").unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("jpg").unwrap(), ImageFormat::Jpg);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = ImageFormat::from_extension("bmp").unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedFormat(ref e) if e == "bmp"));
    }

    #[test]
    fn jpg_and_jpeg_share_a_decoder() {
        assert_eq!(
            ImageFormat::Jpg.decoder_format(),
            ImageFormat::Jpeg.decoder_format()
        );
    }

    #[test]
    fn from_path_reads_bytes_and_format() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("street.PNG");
        std::fs::write(&path, [1u8, 2, 3]).expect("write");

        let upload = UploadedImage::from_path(&path).expect("read");
        assert_eq!(upload.name, "street.PNG");
        assert_eq!(upload.bytes, vec![1, 2, 3]);
        assert_eq!(upload.format, ImageFormat::Png);
    }

    #[test]
    fn from_path_without_extension_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("noext");
        std::fs::write(&path, [0u8]).expect("write");

        assert!(matches!(
            UploadedImage::from_path(&path),
            Err(CodecError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn from_path_missing_file_is_io_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("missing.jpg");
        assert!(matches!(
            UploadedImage::from_path(&path),
            Err(CodecError::Io(_))
        ));
    }
}
