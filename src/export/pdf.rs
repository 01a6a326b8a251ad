//! Single-page PDF holding one raster image.

use std::path::{Path, PathBuf};

use image::buffer::ConvertBuffer;
use image::{RgbImage, RgbaImage};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};

use super::ExportError;

/// File name the export writes into the output directory.
pub const PDF_FILE_NAME: &str = "markdown-preview.pdf";

const POINTS_PER_MM: f32 = 72.0 / 25.4;
const DEFLATE_LEVEL: u8 = 6;

/// Page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageGeometry {
    /// A4 portrait.
    pub const A4: Self = Self {
        width_mm: 210.0,
        height_mm: 297.0,
    };
}

/// Where the image sits on the page, in millimetres from the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Display height for a bitmap scaled to `page_width`.
#[allow(clippy::cast_precision_loss)]
pub fn fit_to_width(bitmap_width: u32, bitmap_height: u32, page_width: f32) -> f32 {
    if bitmap_width == 0 {
        return 0.0;
    }
    bitmap_height as f32 * page_width / bitmap_width as f32
}

/// Place a bitmap at the page origin, spanning the full page width.
///
/// Content taller than the page runs off the bottom edge.
pub fn place(bitmap_width: u32, bitmap_height: u32, page: PageGeometry) -> Placement {
    Placement {
        x_mm: 0.0,
        y_mm: 0.0,
        width_mm: page.width_mm,
        height_mm: fit_to_width(bitmap_width, bitmap_height, page.width_mm),
    }
}

/// Build a one-page PDF with `image` placed per [`place`].
///
/// Transparent pixels are dropped; the capture is opaque.
#[allow(clippy::cast_possible_wrap)]
pub fn build_pdf(image: &RgbaImage, page: PageGeometry) -> Vec<u8> {
    let _scope = crate::perf::scope("export.pdf");
    let placement = place(image.width(), image.height(), page);

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let image_id = Ref::new(4);
    let content_id = Ref::new(5);
    let info_id = Ref::new(6);
    let image_name = Name(b"Im1");

    let page_width = page.width_mm * POINTS_PER_MM;
    let page_height = page.height_mm * POINTS_PER_MM;
    let image_width = placement.width_mm * POINTS_PER_MM;
    let image_height = placement.height_mm * POINTS_PER_MM;

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut pdf_page = pdf.page(page_id);
    pdf_page.media_box(Rect::new(0.0, 0.0, page_width, page_height));
    pdf_page.parent(page_tree_id);
    pdf_page.contents(content_id);
    pdf_page.resources().x_objects().pair(image_name, image_id);
    pdf_page.finish();

    let rgb: RgbImage = image.convert();
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(rgb.as_raw(), DEFLATE_LEVEL);
    let mut xobject = pdf.image_xobject(image_id, &compressed);
    xobject.filter(Filter::FlateDecode);
    xobject.width(image.width() as i32);
    xobject.height(image.height() as i32);
    xobject.color_space().device_rgb();
    xobject.bits_per_component(8);
    xobject.finish();

    // PDF space starts bottom-left; pin the image's top edge to the page top.
    let mut content = Content::new();
    content.save_state();
    content.transform([
        image_width,
        0.0,
        0.0,
        image_height,
        placement.x_mm * POINTS_PER_MM,
        page_height - placement.y_mm * POINTS_PER_MM - image_height,
    ]);
    content.x_object(image_name);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    pdf.document_info(info_id)
        .title(TextStr("Markdown Preview"))
        .producer(TextStr(concat!("marklive ", env!("CARGO_PKG_VERSION"))));

    pdf.finish()
}

/// Write `bytes` as [`PDF_FILE_NAME`] inside `dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_pdf(bytes: &[u8], dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(PDF_FILE_NAME);
    std::fs::write(&path, bytes).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn occurrences(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .filter(|window| *window == needle)
            .count()
    }

    #[test]
    fn test_fit_to_width_preserves_aspect() {
        assert!((fit_to_width(1000, 2000, 210.0) - 420.0).abs() < 1e-3);
        assert!((fit_to_width(800, 400, 210.0) - 105.0).abs() < 1e-3);
        assert!(fit_to_width(0, 400, 210.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_place_spans_page_width_at_origin() {
        let placement = place(400, 200, PageGeometry::A4);
        assert_eq!(
            placement,
            Placement {
                x_mm: 0.0,
                y_mm: 0.0,
                width_mm: 210.0,
                height_mm: 105.0,
            }
        );
    }

    #[test]
    fn test_tall_content_is_not_paginated() {
        let placement = place(100, 1000, PageGeometry::A4);
        assert!(placement.height_mm > PageGeometry::A4.height_mm);
        let bytes = build_pdf(&RgbaImage::new(100, 1000), PageGeometry::A4);
        assert_eq!(occurrences(&bytes, b"/Count 1"), 1);
    }

    #[test]
    fn test_build_pdf_has_one_page_and_one_image() {
        let image = RgbaImage::from_pixel(4, 2, Rgba([255, 255, 255, 255]));
        let bytes = build_pdf(&image, PageGeometry::A4);

        assert!(bytes.starts_with(b"%PDF-"));
        let pages = occurrences(&bytes, b"/Type /Page") - occurrences(&bytes, b"/Type /Pages");
        assert_eq!(pages, 1);
        assert_eq!(occurrences(&bytes, b"/Subtype /Image"), 1);
        assert_eq!(occurrences(&bytes, b"/Width 4"), 1);
        assert_eq!(occurrences(&bytes, b"/Height 2"), 1);
        assert_eq!(occurrences(&bytes, b"/FlateDecode"), 1);
    }

    #[test]
    fn test_save_pdf_writes_fixed_name() {
        let dir = TempDir::new().unwrap();
        let path = save_pdf(b"%PDF-1.7", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("markdown-preview.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn test_save_pdf_reports_missing_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            save_pdf(b"%PDF", &missing),
            Err(ExportError::Io { .. })
        ));
    }
}
