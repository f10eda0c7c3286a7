// SPDX-License-Identifier: GPL-3.0-only

//! Async photo encoding
//!
//! Encodes snapshots to JPEG (with quality control) or PNG on a blocking
//! task and packages the result as an uploadable [`MediaFile`].

use crate::config::PhotoOutputFormat;
use crate::errors::PhotoError;
use crate::upload::MediaFile;
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::{debug, info};

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    Jpeg,
    /// PNG format (lossless compression)
    Png,
}

impl EncodingFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
            EncodingFormat::Png => "png",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "image/jpeg",
            EncodingFormat::Png => "image/png",
        }
    }

    /// Name the upload part carries
    pub fn upload_file_name(&self) -> String {
        format!("photo.{}", self.extension())
    }
}

impl From<PhotoOutputFormat> for EncodingFormat {
    fn from(format: PhotoOutputFormat) -> Self {
        match format {
            PhotoOutputFormat::Jpeg => EncodingFormat::Jpeg,
            PhotoOutputFormat::Png => EncodingFormat::Png,
        }
    }
}

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }
}

/// Encoded image data ready for upload or saving
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn into_media_file(self) -> MediaFile {
        MediaFile::new(
            self.data,
            self.format.upload_file_name(),
            self.format.mime(),
        )
    }
}

/// Photo encoder
#[derive(Debug, Clone, Copy)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: EncodingQuality,
}

impl PhotoEncoder {
    pub fn new(format: EncodingFormat, quality: EncodingQuality) -> Self {
        Self { format, quality }
    }

    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    /// Encode on a blocking task (CPU-bound)
    pub async fn encode(&self, image: RgbImage) -> Result<EncodedImage, PhotoError> {
        let encoder = *self;
        tokio::task::spawn_blocking(move || encoder.encode_blocking(image))
            .await
            .map_err(|e| PhotoError::EncodingFailed(format!("Encoding task error: {}", e)))?
    }

    /// Encode on the current thread
    pub fn encode_blocking(&self, image: RgbImage) -> Result<EncodedImage, PhotoError> {
        let (width, height) = image.dimensions();
        info!(width, height, format = ?self.format, "Starting encoding");

        let data = match self.format {
            EncodingFormat::Jpeg => Self::encode_jpeg(&image, self.quality)?,
            EncodingFormat::Png => Self::encode_png(&image)?,
        };

        debug!(size = data.len(), "Encoding complete");
        Ok(EncodedImage {
            data,
            format: self.format,
            width,
            height,
        })
    }

    fn encode_jpeg(image: &RgbImage, quality: EncodingQuality) -> Result<Vec<u8>, PhotoError> {
        let mut buffer = Vec::new();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            &mut buffer,
            quality.jpeg_quality(),
        );
        encoder.encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(buffer)
    }

    fn encode_png(image: &RgbImage) -> Result<Vec<u8>, PhotoError> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(buffer)
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new(EncodingFormat::Jpeg, EncodingQuality::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> RgbImage {
        RgbImage::from_fn(16, 8, |x, y| image::Rgb([(x * 16) as u8, (y * 32) as u8, 128]))
    }

    #[test]
    fn test_jpeg_quality_values() {
        assert_eq!(EncodingQuality::Low.jpeg_quality(), 60);
        assert_eq!(EncodingQuality::Medium.jpeg_quality(), 80);
        assert_eq!(EncodingQuality::High.jpeg_quality(), 92);
        assert_eq!(EncodingQuality::Maximum.jpeg_quality(), 98);
    }

    #[test]
    fn test_jpeg_media_file() {
        let encoded = PhotoEncoder::default().encode_blocking(gradient()).unwrap();
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);

        let file = encoded.into_media_file();
        assert_eq!(file.file_name, "photo.jpg");
        assert_eq!(file.mime, "image/jpeg");
    }

    #[tokio::test]
    async fn test_png_decodes_back_losslessly() {
        let source = gradient();
        let encoder = PhotoEncoder::new(EncodingFormat::Png, EncodingQuality::Low);
        let encoded = encoder.encode(source.clone()).await.unwrap();
        assert_eq!(&encoded.data[1..4], b"PNG");

        let decoded = image::load_from_memory(&encoded.data).unwrap().to_rgb8();
        assert_eq!(decoded, source);
    }
}
