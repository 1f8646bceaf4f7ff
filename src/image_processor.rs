//! # Image Processing Module
//!
//! Questo modulo gestisce la lettura delle dimensioni e la ricodifica delle
//! immagini JPEG e PNG interamente in-process: decodifica e resize con la crate
//! `image`, encoding JPEG con `mozjpeg`, encoding PNG con `image`.
//!
//! ## Formati Supportati
//!
//! | Formato | Estensioni     | Parametri encoder                          |
//! |---------|----------------|--------------------------------------------|
//! | JPEG    | `.jpg` `.jpeg` | qualità 1-100                              |
//! | PNG     | `.png`         | livello compressione 0-9, filtro adattivo  |
//!
//! ## Pipeline di Ricodifica
//!
//! 1. **Decodifica**: formato rilevato dal contenuto del file, non dall'estensione
//! 2. **Resize**: dimensioni esatte calcolate da [`crate::resize::fit_within`], filtro Lanczos3
//! 3. **Encoding**: formato di output deciso dall'estensione del file originale
//!
//! ## Configurazione Qualità
//!
//! - **JPEG**: la qualità (1-100) viene passata direttamente a mozjpeg, con
//!   tabelle Huffman ottimizzate, trellis quantization e modalità progressiva.
//!   L'alpha channel viene scartato (JPEG non lo supporta).
//! - **PNG**: la qualità 0-100 viene convertita in un livello 0-9 con
//!   `floor((100 - quality) / 11.1)`, dove 100 = nessuna compressione e
//!   0 = compressione massima. La crate `image` espone tre livelli di deflate,
//!   quindi i livelli vengono raggruppati: 0-2 fast, 3-6 default, 7-9 best.
//!   Limite noto: livelli dello stesso gruppo producono output identico, il
//!   livello 0-9 conserva solo l'ordinamento fra gruppi.
//!
//! ## Esempio
//! ```rust,ignore
//! let processor = ImageProcessor::new();
//! let dims = processor.dimensions(Path::new("image1.png"))?;
//! if let Some(target) = fit_within(dims, 1920) {
//!     let settings = EncodeSettings::for_kind(ImageKind::Png, 80);
//!     processor.transcode(input, temp, target, settings)?;
//! }
//! ```

use crate::error::{CompressError, Result};
use crate::resize::Dimensions;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageEncoder};
use mozjpeg::{ColorSpace, Compress};
use std::fs::File;
use std::panic::{self, AssertUnwindSafe};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Highest PNG compression level accepted by the encoder settings
pub const MAX_PNG_COMPRESSION_LEVEL: u8 = 9;

/// Image formats the compressor knows how to re-encode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Detect the kind from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// Format-specific encoder parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeSettings {
    Jpeg { quality: u8 },
    Png { compression_level: u8, adaptive_filter: bool },
}

impl EncodeSettings {
    /// Build encoder settings for `kind` from the user-facing quality (0-100)
    pub fn for_kind(kind: ImageKind, quality: u8) -> Self {
        match kind {
            ImageKind::Jpeg => Self::Jpeg { quality },
            ImageKind::Png => Self::Png {
                compression_level: png_compression_level(quality),
                adaptive_filter: true,
            },
        }
    }
}

/// Map quality (100 = least compression, 0 = most) to a PNG level in 0..=9
pub fn png_compression_level(quality: u8) -> u8 {
    let level = ((100.0 - quality as f64) / 11.1).floor();
    level.clamp(0.0, MAX_PNG_COMPRESSION_LEVEL as f64) as u8
}

/// Deflate strategy used for a PNG compression level
fn png_compression_type(level: u8) -> CompressionType {
    match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Metadata read and re-encode operations needed by the directory processor
pub trait ImageTranscoder: Send + Sync {
    /// Read pixel dimensions without decoding the whole image.
    fn dimensions(&self, path: &Path) -> Result<Dimensions>;

    /// Decode `input`, resize to exactly `target` and encode into `output`.
    fn transcode(
        &self,
        input: &Path,
        output: &Path,
        target: Dimensions,
        settings: EncodeSettings,
    ) -> Result<()>;
}

/// Transcoder backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Open `path` with the format sniffed from its content
    fn open(path: &Path) -> Result<ImageReader<BufReader<File>>> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        if reader.format().is_none() {
            return Err(CompressError::UnsupportedFormat(format!(
                "{}: unrecognized image content",
                path.display()
            )));
        }
        Ok(reader)
    }

    fn decode(path: &Path) -> Result<DynamicImage> {
        Self::open(path)?
            .decode()
            .map_err(|e| CompressError::Decode(format!("{}: {}", path.display(), e)))
    }

    fn encode_jpeg(image: &DynamicImage, output: &Path, quality: u8) -> Result<()> {
        if !(1..=100).contains(&quality) {
            return Err(CompressError::Encode(format!(
                "JPEG quality must be between 1 and 100, got {}",
                quality
            )));
        }

        let rgb = image.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);

        // libjpeg reports fatal errors by unwinding out of the encoder
        let encoded = panic::catch_unwind(AssertUnwindSafe(|| -> std::io::Result<Vec<u8>> {
            let mut compress = Compress::new(ColorSpace::JCS_RGB);
            compress.set_size(width, height);
            compress.set_quality(quality as f32);
            compress.set_optimize_coding(true);
            compress.set_progressive_mode();

            let mut started = compress.start_compress(Vec::new())?;
            started.write_scanlines(rgb.as_raw())?;
            started.finish()
        }))
        .map_err(|_| CompressError::Encode("JPEG encoder aborted".to_string()))?
        .map_err(|e| CompressError::Encode(format!("JPEG encode failed: {}", e)))?;

        std::fs::write(output, encoded)?;
        Ok(())
    }

    fn encode_png(
        image: &DynamicImage,
        output: &Path,
        compression_level: u8,
        adaptive_filter: bool,
    ) -> Result<()> {
        if compression_level > MAX_PNG_COMPRESSION_LEVEL {
            return Err(CompressError::Encode(format!(
                "PNG compression level must be between 0 and {}, got {}",
                MAX_PNG_COMPRESSION_LEVEL, compression_level
            )));
        }

        let filter = if adaptive_filter {
            PngFilter::Adaptive
        } else {
            PngFilter::NoFilter
        };

        let mut writer = BufWriter::new(File::create(output)?);
        PngEncoder::new_with_quality(&mut writer, png_compression_type(compression_level), filter)
            .write_image(image.as_bytes(), image.width(), image.height(), image.color())
            .map_err(|e| CompressError::Encode(format!("PNG encode failed: {}", e)))?;
        writer.flush()?;
        Ok(())
    }
}

impl ImageTranscoder for ImageProcessor {
    fn dimensions(&self, path: &Path) -> Result<Dimensions> {
        let (width, height) = Self::open(path)?
            .into_dimensions()
            .map_err(|e| CompressError::Decode(format!("{}: {}", path.display(), e)))?;
        Ok(Dimensions::new(width, height))
    }

    fn transcode(
        &self,
        input: &Path,
        output: &Path,
        target: Dimensions,
        settings: EncodeSettings,
    ) -> Result<()> {
        let image = Self::decode(input)?;
        debug!(
            "Resizing {} from {}x{} to {}",
            input.display(),
            image.width(),
            image.height(),
            target
        );
        let resized = image.resize_exact(target.width, target.height, FilterType::Lanczos3);

        match settings {
            EncodeSettings::Jpeg { quality } => Self::encode_jpeg(&resized, output, quality),
            EncodeSettings::Png {
                compression_level,
                adaptive_filter,
            } => Self::encode_png(&resized, output, compression_level, adaptive_filter),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    /// Write a gradient JPEG of the given size
    pub(crate) fn write_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
    }

    /// Write a noisy JPEG at a given encoder quality; noise barely compresses
    pub(crate) fn write_noisy_jpeg(path: &Path, width: u32, height: u32, quality: u8) {
        let mut state: u32 = 0x2545_f491;
        let img = RgbImage::from_fn(width, height, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let bytes = state.to_le_bytes();
            Rgb([bytes[0], bytes[1], bytes[2]])
        });
        let mut writer = BufWriter::new(File::create(path).unwrap());
        JpegEncoder::new_with_quality(&mut writer, quality)
            .encode_image(&img)
            .unwrap();
        writer.flush().unwrap();
    }

    /// Write a flat-colour PNG of the given size
    pub(crate) fn write_png(path: &Path, width: u32, height: u32) {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]));
        img.save_with_format(path, image::ImageFormat::Png).unwrap();
    }

    #[test]
    fn test_png_quality_mapping_extremes() {
        assert_eq!(png_compression_level(100), 0);
        assert_eq!(png_compression_level(0), 9);
        assert_eq!(png_compression_level(80), 1);
        assert_eq!(png_compression_level(50), 4);
    }

    #[test]
    fn test_png_quality_mapping_always_in_range() {
        for quality in 0..=100u8 {
            assert!(png_compression_level(quality) <= MAX_PNG_COMPRESSION_LEVEL);
        }
        // Monotonic: lower quality never means less compression
        for quality in 1..=100u8 {
            assert!(png_compression_level(quality) <= png_compression_level(quality - 1));
        }
    }

    #[test]
    fn test_png_levels_share_three_deflate_presets() {
        for level in 0..=2 {
            assert!(matches!(png_compression_type(level), CompressionType::Fast));
        }
        for level in 3..=6 {
            assert!(matches!(png_compression_type(level), CompressionType::Default));
        }
        for level in 7..=MAX_PNG_COMPRESSION_LEVEL {
            assert!(matches!(png_compression_type(level), CompressionType::Best));
        }
    }

    #[test]
    fn test_jpeg_output_uses_progressive_optimized_coding() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("photo.jpg");
        let output = temp_dir.path().join("photo.jpg.temp");
        write_jpeg(&input, 320, 240);

        ImageProcessor::new()
            .transcode(
                &input,
                &output,
                Dimensions::new(160, 120),
                EncodeSettings::Jpeg { quality: 80 },
            )
            .unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        // SOF2 marks a progressive frame; baseline encoders emit SOF0
        assert!(bytes.windows(2).any(|w| w == [0xFF, 0xC2]));
        assert!(!bytes.windows(2).any(|w| w == [0xFF, 0xC0]));
    }

    #[test]
    fn test_image_kind_from_extension() {
        assert_eq!(ImageKind::from_path(Path::new("a.JPG")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("a.jpeg")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("a.Png")), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_path(Path::new("a.emf")), None);
        assert_eq!(ImageKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_settings_for_kind() {
        assert_eq!(
            EncodeSettings::for_kind(ImageKind::Jpeg, 75),
            EncodeSettings::Jpeg { quality: 75 }
        );
        assert_eq!(
            EncodeSettings::for_kind(ImageKind::Png, 0),
            EncodeSettings::Png {
                compression_level: 9,
                adaptive_filter: true
            }
        );
    }

    #[test]
    fn test_dimensions_reads_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        write_jpeg(&path, 320, 200);

        let dims = ImageProcessor::new().dimensions(&path).unwrap();
        assert_eq!(dims, Dimensions::new(320, 200));
    }

    #[test]
    fn test_dimensions_of_garbage_is_unsupported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fake.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let err = ImageProcessor::new().dimensions(&path).unwrap_err();
        assert!(matches!(err, CompressError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_truncated_png_is_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cut.png");
        write_png(&path, 64, 64);
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        let output = temp_dir.path().join("cut.png.temp");
        let err = ImageProcessor::new()
            .transcode(
                &path,
                &output,
                Dimensions::new(32, 32),
                EncodeSettings::for_kind(ImageKind::Png, 80),
            )
            .unwrap_err();
        assert!(matches!(err, CompressError::Decode(_)));
    }

    #[test]
    fn test_transcode_jpeg_resizes() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("big.jpg");
        let output = temp_dir.path().join("big.jpg.temp");
        write_jpeg(&input, 400, 300);

        let processor = ImageProcessor::new();
        processor
            .transcode(
                &input,
                &output,
                Dimensions::new(200, 150),
                EncodeSettings::Jpeg { quality: 70 },
            )
            .unwrap();

        assert_eq!(processor.dimensions(&output).unwrap(), Dimensions::new(200, 150));
    }

    #[test]
    fn test_transcode_png_keeps_alpha_format() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("logo.png");
        let output = temp_dir.path().join("logo.png.temp");
        write_png(&input, 300, 600);

        let processor = ImageProcessor::new();
        processor
            .transcode(
                &input,
                &output,
                Dimensions::new(50, 100),
                EncodeSettings::for_kind(ImageKind::Png, 0),
            )
            .unwrap();

        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (50, 100));
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_transcode_rejects_invalid_jpeg_quality() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("photo.jpg");
        write_jpeg(&input, 64, 64);

        let err = ImageProcessor::new()
            .transcode(
                &input,
                &temp_dir.path().join("out.jpg"),
                Dimensions::new(32, 32),
                EncodeSettings::Jpeg { quality: 0 },
            )
            .unwrap_err();
        assert!(matches!(err, CompressError::Encode(_)));
    }

    #[test]
    fn test_transcode_rejects_invalid_png_level() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("logo.png");
        write_png(&input, 64, 64);

        let err = ImageProcessor::new()
            .transcode(
                &input,
                &temp_dir.path().join("out.png"),
                Dimensions::new(32, 32),
                EncodeSettings::Png {
                    compression_level: 10,
                    adaptive_filter: true,
                },
            )
            .unwrap_err();
        assert!(matches!(err, CompressError::Encode(_)));
    }
}
