//! Fit-within-box JPEG resizing

use std::io::{Read, Write};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::config::Size;
use crate::error::{BatchResizeError, Result};
use crate::processing::formats::{detect_format, format_name};

/// JPEG quality used for every output
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Decodes a JPEG stream, shrinks it into a bounding box and re-encodes it
#[derive(Debug, Clone, Copy)]
pub struct ImageResizer {
    filter: FilterType,
    quality: u8,
}

/// Dimensions before and after a fit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitOutcome {
    pub original: (u32, u32),
    pub resized: (u32, u32),
}

impl FitOutcome {
    /// Whether the image had to be scaled down
    pub fn was_scaled(&self) -> bool {
        self.original != self.resized
    }
}

impl ImageResizer {
    /// Create a resizer using Lanczos3 and the default JPEG quality
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Create a resizer with a custom resampling filter
    pub fn with_filter(filter: FilterType) -> Self {
        Self {
            filter,
            ..Self::new()
        }
    }

    /// Fit the image read from `input` into `size` and write it to `output`.
    ///
    /// Nothing is written unless the input decodes as a JPEG. Images that
    /// already fit are re-encoded at their original dimensions.
    pub fn fit<R: Read, W: Write>(&self, size: Size, mut input: R, mut output: W) -> Result<FitOutcome> {
        let mut data = Vec::new();
        input
            .read_to_end(&mut data)
            .map_err(|e| BatchResizeError::Decode(image::ImageError::IoError(e)))?;

        let image = decode_jpeg(&data)?;
        let original = (image.width(), image.height());
        let (target_width, target_height) = fit_dimensions(original.0, original.1, size);

        let resized = if (target_width, target_height) == original {
            debug!("{}x{} already fits in {}", original.0, original.1, size);
            image
        } else {
            debug!(
                "Resizing {}x{} -> {}x{} using {:?}",
                original.0, original.1, target_width, target_height, self.filter
            );
            image.resize_exact(target_width, target_height, self.filter)
        };

        let encoder = JpegEncoder::new_with_quality(&mut output, self.quality);
        resized
            .write_with_encoder(encoder)
            .map_err(BatchResizeError::Encode)?;
        output
            .flush()
            .map_err(|e| BatchResizeError::Encode(image::ImageError::IoError(e)))?;

        Ok(FitOutcome {
            original,
            resized: (resized.width(), resized.height()),
        })
    }
}

impl Default for ImageResizer {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_jpeg(data: &[u8]) -> Result<DynamicImage> {
    let format = detect_format(data).map_err(BatchResizeError::Decode)?;
    if format != ImageFormat::Jpeg {
        return Err(BatchResizeError::unsupported_format(format_name(format)));
    }

    image::load_from_memory_with_format(data, ImageFormat::Jpeg).map_err(BatchResizeError::Decode)
}

/// Largest dimensions that fit within `size` while keeping the aspect ratio.
///
/// Never upscales: an image already inside the box keeps its dimensions.
/// Neither result dimension drops below one pixel.
pub fn fit_dimensions(width: u32, height: u32, size: Size) -> (u32, u32) {
    if size.contains(width, height) {
        return (width, height);
    }

    let (w, h) = (u64::from(width), u64::from(height));
    let (max_w, max_h) = (u64::from(size.width()), u64::from(size.height()));

    // Compare w/h against max_w/max_h without floating point
    let (new_w, new_h) = if w * max_h >= h * max_w {
        (max_w, (h * max_w + w / 2) / w)
    } else {
        ((w * max_h + h / 2) / h, max_h)
    };

    let clamp = |v: u64| u32::try_from(v.max(1)).unwrap_or(u32::MAX);
    (clamp(new_w), clamp(new_h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::{ImageBuffer, Rgb};
    use std::io;

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let intensity = ((x + y) % 255) as u8;
            Rgb([intensity, intensity / 2, 255 - intensity])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        create_test_image(width, height)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 90))
            .unwrap();
        buf
    }

    fn size(width: u32, height: u32) -> Size {
        Size::new(width, height).unwrap()
    }

    /// Writer that refuses every write
    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fit_dimensions_landscape() {
        assert_eq!(fit_dimensions(800, 600, size(500, 500)), (500, 375));
        assert_eq!(fit_dimensions(1000, 800, size(600, 600)), (600, 480));
    }

    #[test]
    fn test_fit_dimensions_portrait() {
        assert_eq!(fit_dimensions(800, 1000, size(600, 600)), (480, 600));
        assert_eq!(fit_dimensions(600, 800, size(500, 500)), (375, 500));
    }

    #[test]
    fn test_fit_dimensions_never_upscales() {
        assert_eq!(fit_dimensions(300, 200, size(500, 500)), (300, 200));
        assert_eq!(fit_dimensions(500, 500, size(500, 500)), (500, 500));
    }

    #[test]
    fn test_fit_dimensions_one_axis_over() {
        // Only the height exceeds the box
        assert_eq!(fit_dimensions(400, 1000, size(500, 500)), (200, 500));
        // Extreme panorama keeps at least one pixel
        assert_eq!(fit_dimensions(10_000, 2, size(100, 100)), (100, 1));
    }

    #[test]
    fn test_fit_dimensions_stay_in_bounds() {
        let boxes = [size(500, 500), size(640, 480), size(100, 300), size(1, 1)];
        for &bounds in &boxes {
            for &(w, h) in &[(801, 599), (1234, 567), (333, 1999), (4000, 3000), (7, 9)] {
                let (nw, nh) = fit_dimensions(w, h, bounds);
                assert!(nw <= bounds.width() && nh <= bounds.height(), "{w}x{h} in {bounds}");
                assert!(nw >= 1 && nh >= 1);
            }
        }
    }

    #[test]
    fn test_fit_large_jpeg() {
        let input = jpeg_bytes(800, 600);
        let mut output = Vec::new();

        let outcome = ImageResizer::new()
            .fit(size(500, 500), input.as_slice(), &mut output)
            .unwrap();
        assert_eq!(outcome.original, (800, 600));
        assert_eq!(outcome.resized, (500, 375));
        assert!(outcome.was_scaled());

        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!(detect_format(&output).unwrap(), ImageFormat::Jpeg);
        assert_eq!((decoded.width(), decoded.height()), (500, 375));
    }

    #[test]
    fn test_fit_small_jpeg_keeps_dimensions() {
        let input = jpeg_bytes(300, 200);
        let mut output = Vec::new();

        let outcome = ImageResizer::new()
            .fit(size(500, 500), input.as_slice(), &mut output)
            .unwrap();
        assert!(!outcome.was_scaled());

        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 200));
    }

    #[test]
    fn test_png_is_unsupported_and_writes_nothing() {
        let mut png = Vec::new();
        create_test_image(40, 30)
            .write_with_encoder(PngEncoder::new(&mut png))
            .unwrap();

        let mut output = Vec::new();
        let err = ImageResizer::new()
            .fit(size(10, 10), png.as_slice(), &mut output)
            .unwrap_err();
        assert!(matches!(err, BatchResizeError::UnsupportedFormat { ref format } if format == "Png"));
        assert!(output.is_empty());
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        let mut output = Vec::new();
        let err = ImageResizer::new()
            .fit(size(10, 10), &b"this is not a jpeg at all"[..], &mut output)
            .unwrap_err();
        assert!(matches!(err, BatchResizeError::Decode(_)));
        assert!(output.is_empty());
    }

    #[test]
    fn test_truncated_jpeg_fails_to_decode() {
        let input = jpeg_bytes(64, 64);
        let truncated = &input[..20];

        let mut output = Vec::new();
        let err = ImageResizer::new()
            .fit(size(10, 10), truncated, &mut output)
            .unwrap_err();
        assert!(matches!(err, BatchResizeError::Decode(_)));
    }

    #[test]
    fn test_write_failure_is_encode_error() {
        let input = jpeg_bytes(64, 64);
        let err = ImageResizer::new()
            .fit(size(32, 32), input.as_slice(), BrokenWriter)
            .unwrap_err();
        assert!(matches!(err, BatchResizeError::Encode(_)));
    }

    #[test]
    fn test_custom_filter() {
        let input = jpeg_bytes(200, 100);
        let mut output = Vec::new();
        let outcome = ImageResizer::with_filter(FilterType::Triangle)
            .fit(size(50, 50), input.as_slice(), &mut output)
            .unwrap();
        assert_eq!(outcome.resized, (50, 25));
    }
}
