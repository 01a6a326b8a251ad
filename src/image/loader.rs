//! Image loading.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;

/// Loads images referenced from markdown, relative to a base directory.
///
/// Nothing is cached: every load decodes the file as it is on disk now,
/// so a capture never shows a stale picture.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    base_path: PathBuf,
}

impl ImageLoader {
    /// Create a new image loader with the given base path for relative images.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Load an image by its markdown `src`.
    ///
    /// Local paths and `data:` URLs are supported; remote URLs yield `None`.
    pub fn load(&self, src: &str) -> Option<DynamicImage> {
        if let Some(data) = src.strip_prefix("data:") {
            return decode_data_url(data);
        }
        if is_remote(src) {
            tracing::debug!(src, "remote image not loaded");
            return None;
        }

        let full_path = self.resolve_path(src);
        match image::open(&full_path) {
            Ok(img) => Some(img),
            Err(err) => {
                tracing::debug!(path = %full_path.display(), error = %err, "image load failed");
                None
            }
        }
    }

    /// Resolve a potentially relative path against the base directory.
    fn resolve_path(&self, image_path: &str) -> PathBuf {
        let path = Path::new(image_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

fn is_remote(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

/// Decode the part of a `data:` URL after the scheme, e.g.
/// `image/png;base64,iVBOR...`.
fn decode_data_url(data: &str) -> Option<DynamicImage> {
    let (meta, payload) = data.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    image::load_from_memory(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, color: [u8; 3]) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(2, 2, Rgb(color))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_loader_resolve_path_absolute() {
        let loader = ImageLoader::new(PathBuf::from("/base"));
        let resolved = loader.resolve_path("/absolute/path.png");
        assert_eq!(resolved, PathBuf::from("/absolute/path.png"));
    }

    #[test]
    fn test_loader_resolve_path_relative() {
        let loader = ImageLoader::new(PathBuf::from("/base"));
        let resolved = loader.resolve_path("relative/path.png");
        assert_eq!(resolved, PathBuf::from("/base/relative/path.png"));
    }

    #[test]
    fn test_load_relative_file() {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "red.png", [255, 0, 0]);
        let loader = ImageLoader::new(dir.path().to_path_buf());

        let img = loader.load("red.png").unwrap();
        assert_eq!(img.width(), 2);
    }

    #[test]
    fn test_every_load_reads_current_file() {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "pic.png", [255, 0, 0]);
        let loader = ImageLoader::new(dir.path().to_path_buf());
        let before = loader.load("pic.png").unwrap().to_rgb8();

        write_png(dir.path(), "pic.png", [0, 0, 255]);
        let after = loader.load("pic.png").unwrap().to_rgb8();

        assert_eq!(before.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(after.get_pixel(0, 0), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_missing_and_remote_images_yield_none() {
        let loader = ImageLoader::new(PathBuf::from("/nonexistent"));
        assert!(loader.load("missing.png").is_none());
        assert!(loader.load("https://example.com/a.png").is_none());
    }

    #[test]
    fn test_data_url_is_decoded() {
        let mut png = Vec::new();
        DynamicImage::new_rgb8(3, 1)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let src = format!("data:image/png;base64,{}", STANDARD.encode(&png));

        let img = ImageLoader::default().load(&src).unwrap();
        assert_eq!((img.width(), img.height()), (3, 1));
    }
}
