//! Image preprocessing
//!
//! Turns uploaded bytes into the `[1, 3, S, S]` tensor the classifier expects:
//! decode, force RGB, resize, then normalize per channel.

use image::{imageops::FilterType, DynamicImage};
use serde::{Deserialize, Serialize};

use crate::utils::error::{DiagnosisError, Result};
use crate::IMAGE_SIZE;

/// ImageNet normalization mean values (RGB)
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet normalization std values (RGB)
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Per-channel normalization applied after resizing
///
/// Must match what the classifier saw during training. A mismatch silently
/// degrades accuracy instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// MobileNet family: `x / 127.5 - 1`, range [-1, 1]
    #[default]
    MobileNet,
    /// ImageNet mean/std standardization
    ImageNet,
    /// `x / 255`, range [0, 1]
    UnitRange,
}

impl Normalization {
    /// Normalize one 8-bit sample of channel `c`
    #[inline]
    pub fn apply(&self, value: u8, c: usize) -> f32 {
        let v = value as f32;
        match self {
            Normalization::MobileNet => v / 127.5 - 1.0,
            Normalization::ImageNet => (v / 255.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c],
            Normalization::UnitRange => v / 255.0,
        }
    }

    /// Inclusive bounds of any normalized value
    pub fn value_range(&self) -> (f32, f32) {
        match self {
            Normalization::MobileNet => (-1.0, 1.0),
            Normalization::ImageNet => (
                (0.0 - IMAGENET_MEAN[0]) / IMAGENET_STD[0],
                (1.0 - IMAGENET_MEAN[2]) / IMAGENET_STD[2],
            ),
            Normalization::UnitRange => (0.0, 1.0),
        }
    }
}

/// Resampling filter used for resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    #[default]
    CatmullRom,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Preprocessing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Square side length of the classifier input
    pub image_size: usize,
    pub normalization: Normalization,
    pub resize_filter: ResizeFilter,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            image_size: IMAGE_SIZE,
            normalization: Normalization::default(),
            resize_filter: ResizeFilter::default(),
        }
    }
}

/// Single-image batch in CHW layout, shape `[1, 3, height, width]`
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Vec<f32>,
    height: usize,
    width: usize,
}

impl ImageTensor {
    /// Wrap CHW data, checking its length against the dimensions
    pub fn new(data: Vec<f32>, height: usize, width: usize) -> Result<Self> {
        if data.len() != 3 * height * width {
            return Err(DiagnosisError::Inference(format!(
                "tensor data has {} values, expected {} for 3x{}x{}",
                data.len(),
                3 * height * width,
                height,
                width
            )));
        }
        Ok(Self { data, height, width })
    }

    pub fn shape(&self) -> [usize; 4] {
        [1, 3, self.height, self.width]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// (min, max, mean) over all values
    pub fn stats(&self) -> (f32, f32, f32) {
        let min = self.data.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = self.data.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let mean = self.data.iter().sum::<f32>() / self.data.len().max(1) as f32;
        (min, max, mean)
    }
}

/// Resize an image to the target dimensions
fn resize_image(image: &DynamicImage, size: u32, filter: ResizeFilter) -> DynamicImage {
    image.resize_exact(size, size, filter.into())
}

/// Normalize an RGB image into CHW layout
fn normalize_image(image: &DynamicImage, normalization: Normalization) -> Vec<f32> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let num_pixels = (width * height) as usize;

    let mut normalized = vec![0.0f32; 3 * num_pixels];

    for (i, pixel) in rgb.pixels().enumerate() {
        // CHW layout: all R values, then all G values, then all B values
        for c in 0..3 {
            normalized[c * num_pixels + i] = normalization.apply(pixel[c], c);
        }
    }

    normalized
}

/// Image preprocessor for the classifier input
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Preprocess an already decoded image
    pub fn preprocess(&self, image: &DynamicImage) -> Result<ImageTensor> {
        let size = self.config.image_size;
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let resized = resize_image(&rgb, size as u32, self.config.resize_filter);
        ImageTensor::new(
            normalize_image(&resized, self.config.normalization),
            size,
            size,
        )
    }

    /// Decode raw upload bytes and preprocess them
    ///
    /// Undecodable or empty input is a client error.
    pub fn preprocess_bytes(&self, bytes: &[u8]) -> Result<ImageTensor> {
        if bytes.is_empty() {
            return Err(DiagnosisError::InvalidImage("file gambar kosong".to_string()));
        }

        let image = image::load_from_memory(bytes)
            .map_err(|e| DiagnosisError::InvalidImage(e.to_string()))?;

        self.preprocess(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    use crate::utils::error::ErrorKind;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    fn leaf_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, 120, (y % 256) as u8])
        });
        encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
    }

    #[test]
    fn test_png_shape_and_range() {
        let pre = Preprocessor::default();
        let tensor = pre.preprocess_bytes(&leaf_png(300, 180)).unwrap();

        assert_eq!(tensor.shape(), [1, 3, 224, 224]);
        assert_eq!(tensor.as_slice().len(), 3 * 224 * 224);

        let (min, max, _) = tensor.stats();
        assert!(min >= -1.0 && max <= 1.0);
    }

    #[test]
    fn test_jpeg_decodes() {
        let img = RgbImage::from_pixel(64, 64, Rgb([40, 160, 60]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg);

        let tensor = Preprocessor::default().preprocess_bytes(&bytes).unwrap();
        assert_eq!(tensor.shape(), [1, 3, 224, 224]);
    }

    #[test]
    fn test_rgba_and_grayscale_become_three_channels() {
        let rgba = RgbaImage::from_pixel(50, 50, Rgba([10, 20, 30, 0]));
        let bytes = encode(DynamicImage::ImageRgba8(rgba), ImageFormat::Png);
        let tensor = Preprocessor::default().preprocess_bytes(&bytes).unwrap();
        assert_eq!(tensor.shape()[1], 3);

        let gray = DynamicImage::new_luma8(40, 40);
        let tensor = Preprocessor::default().preprocess(&gray).unwrap();
        assert_eq!(tensor.shape(), [1, 3, 224, 224]);
    }

    #[test]
    fn test_mobilenet_normalization_bounds() {
        let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([255, 255, 255])));
        let black = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([0, 0, 0])));
        let pre = Preprocessor::default();

        let (min, max, _) = pre.preprocess(&white).unwrap().stats();
        assert!((min - 1.0).abs() < 1e-6 && (max - 1.0).abs() < 1e-6);

        let (min, max, _) = pre.preprocess(&black).unwrap().stats();
        assert!((min + 1.0).abs() < 1e-6 && (max + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_chw_layout() {
        let red = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])));
        let pre = Preprocessor::new(PreprocessConfig {
            image_size: 4,
            normalization: Normalization::UnitRange,
            resize_filter: ResizeFilter::Nearest,
        });

        let values = pre.preprocess(&red).unwrap().into_vec();
        assert!(values[..16].iter().all(|&v| v == 1.0));
        assert!(values[16..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_imagenet_range() {
        let norm = Normalization::ImageNet;
        let (lo, hi) = norm.value_range();
        for c in 0..3 {
            assert!(norm.apply(0, c) >= lo - 1e-5);
            assert!(norm.apply(255, c) <= hi + 1e-5);
        }
    }

    #[test]
    fn test_corrupt_bytes_are_client_errors() {
        let pre = Preprocessor::default();

        let err = pre.preprocess_bytes(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Client);
        assert!(!err.to_string().is_empty());

        let err = pre.preprocess_bytes(&[]).unwrap_err();
        assert!(matches!(err, DiagnosisError::InvalidImage(_)));
    }

    #[test]
    fn test_deterministic() {
        let bytes = leaf_png(90, 90);
        let pre = Preprocessor::default();
        assert_eq!(
            pre.preprocess_bytes(&bytes).unwrap(),
            pre.preprocess_bytes(&bytes).unwrap()
        );
    }

    #[test]
    fn test_tensor_length_checked() {
        assert!(ImageTensor::new(vec![0.0; 10], 2, 2).is_err());
        assert!(ImageTensor::new(vec![0.0; 12], 2, 2).is_ok());
    }
}
