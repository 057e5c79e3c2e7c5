//! Image format detection for uploaded documents.
//!
//! Only JPEG, PNG, WebP and TIFF are accepted. Content sniffing via `infer`
//! wins over the filename; the extension is used when the bytes are not
//! recognised.

use std::path::Path;

/// File extensions accepted for upload (lowercase, no dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tif", "tiff"];

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Tiff,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Tiff => "image/tiff",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::WebP),
            "image/tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Map a file extension through its guessed MIME types.
    pub fn from_extension(ext: &str) -> Option<Self> {
        mime_guess::from_ext(&ext.to_lowercase())
            .iter()
            .find_map(|mime| Self::from_mime(mime.essence_str()))
    }

    /// Detect the format from content, falling back to the filename.
    ///
    /// Content that is recognised as some other type (e.g. a PDF renamed to
    /// `.png`) is rejected rather than trusted by extension.
    pub fn detect(filename: &str, content: &[u8]) -> Option<Self> {
        if let Some(kind) = infer::get(content) {
            return Self::from_mime(kind.mime_type());
        }
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

/// Whether a path has one of the supported image extensions.
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_detect_by_magic_bytes() {
        assert_eq!(ImageFormat::detect("scan.bin", PNG_MAGIC), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::detect("scan", JPEG_MAGIC), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_content_overrides_extension() {
        assert_eq!(ImageFormat::detect("photo.jpg", PNG_MAGIC), Some(ImageFormat::Png));
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(ImageFormat::detect("a.TIFF", b"??"), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::detect("a.webp", b"??"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::detect("a.gif", b"??"), None);
    }

    #[test]
    fn test_pdf_rejected_even_with_image_extension() {
        assert_eq!(ImageFormat::detect("invoice.png", b"%PDF-1.7\n"), None);
    }

    #[test]
    fn test_supported_extension() {
        assert!(is_supported_extension(Path::new("dir/a.JPG")));
        assert!(is_supported_extension(Path::new("b.tif")));
        assert!(!is_supported_extension(Path::new("c.pdf")));
        assert!(!is_supported_extension(Path::new("noext")));
    }
}
