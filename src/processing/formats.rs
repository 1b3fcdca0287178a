//! Image format detection and input filtering

use std::path::Path;

/// File extensions accepted as batch inputs
pub fn supported_input_extensions() -> &'static [&'static str] {
    &["jpg", "jpeg"]
}

/// Check if a file extension (without the dot) is a JPEG extension
pub fn is_jpeg_extension(extension: &str) -> bool {
    supported_input_extensions()
        .iter()
        .any(|&ext| ext.eq_ignore_ascii_case(extension))
}

/// Decide whether a file name is an eligible input.
///
/// Only the extension is inspected; callers exclude directories first.
pub fn is_jpeg_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(is_jpeg_extension)
}

/// Detect the encoded format of an image from its leading bytes
pub fn detect_format(data: &[u8]) -> image::ImageResult<image::ImageFormat> {
    image::guess_format(data)
}

/// Human-readable name for a detected format
pub fn format_name(format: image::ImageFormat) -> String {
    format!("{format:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_jpeg_extensions() {
        assert!(is_jpeg_path("a/b/file.JPG"));
        assert!(is_jpeg_path("file.jpeg"));
        assert!(is_jpeg_path("file.JpEg"));
        assert!(is_jpeg_path("photo.jpg"));
    }

    #[test]
    fn test_rejects_other_names() {
        assert!(!is_jpeg_path("no_image.ABC"));
        assert!(!is_jpeg_path("no_extension"));
        assert!(!is_jpeg_path("picture.png"));
        assert!(!is_jpeg_path("archive.jpg.zip"));
        assert!(!is_jpeg_path("trailing."));
    }

    #[test]
    fn test_extension_check() {
        assert!(is_jpeg_extension("jpg"));
        assert!(is_jpeg_extension("JPEG"));
        assert!(!is_jpeg_extension("jpe"));
        assert!(!is_jpeg_extension(""));
    }

    #[test]
    fn test_format_detection_from_header() {
        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01];
        assert_eq!(detect_format(&jpeg_header).unwrap(), image::ImageFormat::Jpeg);

        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D];
        assert_eq!(detect_format(&png_header).unwrap(), image::ImageFormat::Png);
        assert_eq!(format_name(image::ImageFormat::Png), "Png");

        assert!(detect_format(b"definitely not an image").is_err());
    }
}
