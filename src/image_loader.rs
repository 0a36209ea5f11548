// Image loading module
// Decodes the selected image into straight-alpha RGBA pixels

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Extensions offered by the image selection dialog
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Loaded image data ready for display
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Straight-alpha RGBA pixels
    pub pixels: RgbaImage,
}

impl ImageData {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// Load the image at `path`
pub fn load_image(path: &Path) -> Result<ImageData> {
    let data = fs::read(path)
        .with_context(|| format!("Failed to read image file: {}", path.display()))?;

    let hint = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(format_from_extension);
    let img = load_from_bytes(&data, hint)?;

    let image = ImageData::from_rgba(img.to_rgba8());
    if image.width == 0 || image.height == 0 {
        anyhow::bail!("Image {} has no pixels", path.display());
    }
    Ok(image)
}

/// Load an image from raw bytes, sniffing the format before trusting the extension
fn load_from_bytes(data: &[u8], hint: Option<ImageFormat>) -> Result<DynamicImage> {
    let format = match image::guess_format(data) {
        Ok(format) => format,
        Err(e) => hint.ok_or(e).context("Failed to detect image format")?,
    };

    let cursor = Cursor::new(data);
    let img = image::load(cursor, format).context("Failed to decode image")?;

    Ok(img)
}

/// Get the image format for a file extension offered by the selection dialog
pub fn format_from_extension(ext: &str) -> Option<ImageFormat> {
    match ext.to_lowercase().as_str() {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "bmp" => Some(ImageFormat::Bmp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(format_from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(format_from_extension("Jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(format_from_extension("bmp"), Some(ImageFormat::Bmp));
        assert_eq!(format_from_extension("gif"), None);
    }

    #[test]
    fn dialog_extensions_are_all_known_formats() {
        for ext in IMAGE_EXTENSIONS {
            assert!(format_from_extension(ext).is_some(), "{ext}");
        }
    }

    #[test]
    fn loads_png_preserving_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(1, 1, Rgba([200, 100, 50, 77]));
        img.save(&path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (3, 2));
        assert_eq!(*loaded.pixels.get_pixel(1, 1), Rgba([200, 100, 50, 77]));
        assert_eq!(loaded.pixels.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_image(&dir.path().join("nope.png")).is_err());
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.png");
        fs::write(&path, b"definitely not a png").unwrap();
        assert!(load_image(&path).is_err());
    }
}
