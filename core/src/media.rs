//! File input/output boundary: user-selected files in, exported
//! artifacts out. Non-image MIME types are rejected before any further
//! processing; exports are raw PNG bytes or a re-encoded JPEG.

use std::fs;
use std::path::Path;

use atelier_common::ImageArtifact;
use image::GenericImageView;

use crate::error::StudioError;

const JPEG_EXPORT_QUALITY: u8 = 92;

/// An uploaded image plus the source dimensions needed for the
/// `original` aspect-ratio sentinel.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub artifact: ImageArtifact,
    pub width: u32,
    pub height: u32,
}

pub fn load_image(path: &Path) -> Result<LoadedImage, StudioError> {
    let mime = mime_guess::from_path(path)
        .first()
        .ok_or_else(|| StudioError::UnsupportedMedia(path.display().to_string()))?;
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(StudioError::UnsupportedMedia(path.display().to_string()));
    }

    let bytes = fs::read(path)?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|err| StudioError::InvalidImage(err.to_string()))?;
    let (width, height) = decoded.dimensions();

    Ok(LoadedImage {
        artifact: ImageArtifact::from_bytes(mime.essence_str(), &bytes),
        width,
        height,
    })
}

/// Write an artifact's decoded bytes as-is. The model returns PNG
/// payloads, so this is the PNG download path.
pub fn export_raw(artifact: &ImageArtifact, path: &Path) -> Result<(), StudioError> {
    let bytes = artifact
        .decode()
        .map_err(|err| StudioError::InvalidImage(err.to_string()))?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Re-encode an artifact as JPEG, the slide export format.
pub fn export_jpeg(artifact: &ImageArtifact, path: &Path) -> Result<(), StudioError> {
    let bytes = artifact
        .decode()
        .map_err(|err| StudioError::InvalidImage(err.to_string()))?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|err| StudioError::InvalidImage(err.to_string()))?;
    // JPEG has no alpha channel.
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut out = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_EXPORT_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|err| StudioError::InvalidImage(err.to_string()))?;
    fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn loads_png_with_dimensions_and_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_png(dir.path(), "photo.png", 64, 48);
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.artifact.mime_type, "image/png");
        assert_eq!((loaded.width, loaded.height), (64, 48));
    }

    #[test]
    fn rejects_non_image_files_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "not an image").unwrap();
        assert!(matches!(
            load_image(&path),
            Err(StudioError::UnsupportedMedia(_))
        ));
    }

    #[test]
    fn rejects_corrupt_image_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not png data").unwrap();
        assert!(matches!(
            load_image(&path),
            Err(StudioError::InvalidImage(_))
        ));
    }

    #[test]
    fn jpeg_export_round_trips_through_the_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let source = sample_png(dir.path(), "slide.png", 32, 18);
        let loaded = load_image(&source).unwrap();

        let out = dir.path().join("slide-1.jpg");
        export_jpeg(&loaded.artifact, &out).unwrap();
        let reopened = image::open(&out).unwrap();
        assert_eq!(reopened.dimensions(), (32, 18));
    }

    #[test]
    fn raw_export_writes_the_original_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let source = sample_png(dir.path(), "result.png", 16, 16);
        let loaded = load_image(&source).unwrap();

        let out = dir.path().join("exported.png");
        export_raw(&loaded.artifact, &out).unwrap();
        assert_eq!(fs::read(&out).unwrap(), fs::read(&source).unwrap());
    }
}
