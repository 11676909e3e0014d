//! Image writer: decodes camera payloads and persists them as JPEG files.

use crate::error::ExtractError;
use crate::views::CameraView;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes decoded camera images into a flat output directory.
#[derive(Debug, Clone)]
pub struct ImageWriter {
    output_dir: PathBuf,
    quality: u8,
}

impl ImageWriter {
    /// Create the writer, creating `output_dir` and its parents if needed.
    pub fn create(output_dir: impl Into<PathBuf>, quality: u8) -> Result<Self, ExtractError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;

        Ok(Self {
            output_dir,
            quality: quality.clamp(1, 100),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Output file name for an image: `{timestamp}_{view}.jpeg`
    pub fn file_name(timestamp: i64, view: CameraView) -> String {
        format!("{}_{}.jpeg", timestamp, view.name())
    }

    pub fn output_path(&self, timestamp: i64, view: CameraView) -> PathBuf {
        self.output_dir.join(Self::file_name(timestamp, view))
    }

    /// Decode `payload` to RGB and write it as JPEG.
    ///
    /// An existing file with the same name is overwritten.
    pub fn write(
        &self,
        payload: &[u8],
        view: CameraView,
        timestamp: i64,
    ) -> Result<PathBuf, ExtractError> {
        let raster = image::load_from_memory_with_format(payload, ImageFormat::Jpeg)
            .map_err(|source| ExtractError::ImageDecode {
                view,
                timestamp,
                source,
            })?
            .to_rgb8();

        self.write_raster(&raster, view, timestamp)
    }

    /// Encode `raster` and write it in one step.
    ///
    /// The file is only created once encoding has succeeded.
    fn write_raster(
        &self,
        raster: &RgbImage,
        view: CameraView,
        timestamp: i64,
    ) -> Result<PathBuf, ExtractError> {
        let path = self.output_path(timestamp, view);

        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, self.quality)
            .encode_image(raster)
            .map_err(|source| ExtractError::ImageEncode {
                path: path.clone(),
                source,
            })?;
        fs::write(&path, &encoded)?;

        debug!(
            path = %path.display(),
            width = raster.width(),
            height = raster.height(),
            bytes = encoded.len(),
            "Image written"
        );

        Ok(path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::Rgb;

    /// Encode a small gradient as JPEG bytes.
    pub(crate) fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
        let raster = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, 128])
        });
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, 90)
            .encode_image(&raster)
            .unwrap();
        bytes
    }

    #[test]
    fn test_file_name_format() {
        assert_eq!(
            ImageWriter::file_name(1_550_083_467_346_370, CameraView::SideLeft),
            "1550083467346370_side_left.jpeg"
        );
        assert_eq!(ImageWriter::file_name(0, CameraView::Front), "0_front.jpeg");
    }

    #[test]
    fn test_create_makes_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");

        ImageWriter::create(&nested, 75).unwrap();
        assert!(nested.is_dir());

        // Idempotent
        ImageWriter::create(&nested, 75).unwrap();
    }

    #[test]
    fn test_write_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ImageWriter::create(tmp.path(), 75).unwrap();

        let path = writer
            .write(&jpeg_fixture(16, 8), CameraView::FrontRight, 1234)
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "1234_front_right.jpeg");
        assert_eq!(path.parent().unwrap(), tmp.path());

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
        assert_eq!(decoded.color().channel_count(), 3);
    }

    #[test]
    fn test_write_overwrites_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ImageWriter::create(tmp.path(), 75).unwrap();

        writer.write(&jpeg_fixture(8, 8), CameraView::Front, 7).unwrap();
        let path = writer.write(&jpeg_fixture(24, 16), CameraView::Front, 7).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 24);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_encode_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ImageWriter::create(tmp.path(), 75).unwrap();

        // JPEG dimensions are limited to 65535.
        let raster = RgbImage::new(65_536, 1);
        let result = writer.write_raster(&raster, CameraView::SideRight, 3);

        assert!(matches!(result, Err(ExtractError::ImageEncode { .. })));
        assert!(!writer.output_path(3, CameraView::SideRight).exists());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_corrupt_payload_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ImageWriter::create(tmp.path(), 75).unwrap();

        let result = writer.write(b"not a jpeg", CameraView::Front, 1);
        assert!(matches!(
            result,
            Err(ExtractError::ImageDecode { view: CameraView::Front, timestamp: 1, .. })
        ));
        assert!(!writer.output_path(1, CameraView::Front).exists());

        assert!(writer.write(&[], CameraView::Front, 2).is_err());
    }
}
