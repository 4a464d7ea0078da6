//! Writing flattened screenshots to disk

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbaImage;
use image::codecs::jpeg::JpegEncoder;

use crate::config::{ImageFormat, SaveLocation};

/// JPEG quality used for saved screenshots
const JPEG_QUALITY: u8 = 100;

/// Write `img` to `path` in `format`
///
/// The image is encoded into a temporary file next to `path` and renamed over
/// it only once encoding succeeded, so a failure never leaves a truncated
/// file behind.
pub fn save_rgba(img: &RgbaImage, path: &Path, format: ImageFormat) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".snapmark-")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    {
        let mut writer = io::BufWriter::new(tmp.as_file_mut());
        save_rgba_to_writer(img, &mut writer, format)?;
        writer.flush().context("Failed to flush image data")?;
    }

    tmp.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!(
        "Saved {}x{} {:?} to {}",
        img.width(),
        img.height(),
        format,
        path.display()
    );
    Ok(())
}

/// Encode `img` in `format` into any writer
pub fn save_rgba_to_writer<W: Write>(img: &RgbaImage, w: W, format: ImageFormat) -> Result<()> {
    match format {
        ImageFormat::Png => write_png(w, img).context("Failed to encode PNG"),
        ImageFormat::Jpeg => write_jpeg(w, img).context("Failed to encode JPEG"),
    }
}

fn write_png<W: Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

fn write_jpeg<W: Write>(mut w: W, image: &RgbaImage) -> image::ImageResult<()> {
    // JPEG has no alpha channel
    let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    JpegEncoder::new_with_quality(&mut w, JPEG_QUALITY).encode_image(&rgb)
}

/// Default timestamped path for a new screenshot
pub fn get_img_path(location: SaveLocation, format: ImageFormat) -> Option<PathBuf> {
    let mut path = location.dir()?;
    let name = chrono::Local::now()
        .format("Screenshot_%Y-%m-%d_%H-%M-%S")
        .to_string();
    path.push(format!("{}.{}", name, format.extension()));
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(16, 8, |x, y| Rgba([(x * 15) as u8, (y * 30) as u8, 200, 255]))
    }

    #[test]
    fn test_png_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        save_rgba(&sample(), &path, ImageFormat::Png).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_jpeg_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.jpg");
        save_rgba(&sample(), &path, ImageFormat::Jpeg).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let loaded = image::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (16, 8));
    }

    #[test]
    fn test_overwrite_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, vec![0u8; 1 << 16]).unwrap();

        save_rgba(&sample(), &path, ImageFormat::Png).unwrap();
        assert_eq!(image::open(&path).unwrap().to_rgba8(), sample());
    }

    #[test]
    fn test_failed_save_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("shot.png");

        assert!(save_rgba(&sample(), &path, ImageFormat::Png).is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_img_path_uses_format_extension() {
        if let Some(path) = get_img_path(SaveLocation::Pictures, ImageFormat::Jpeg) {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("Screenshot_"));
            assert!(name.ends_with(".jpg"));
        }
    }
}
