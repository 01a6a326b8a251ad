//! Rasterize the preview into a bitmap.
//!
//! The preview [`Document`] is laid out as a [`Scene`] of positioned text
//! runs, fills and images in CSS pixels. Text and fills are emitted as SVG
//! and rasterized with resvg; decoded images are composited on top. Nodes
//! rejected by [`CaptureOptions::filter`] never reach the bitmap.

use std::fmt::Write as _;
use std::io::Cursor;
use std::sync::{Arc, OnceLock};

use base64::Engine as _;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbaImage};
use resvg::usvg::fontdb;
use unicode_width::UnicodeWidthStr;

use super::ExportError;
use super::pdf::PageGeometry;
use crate::document::{Document, InlineStyle, LineType, RenderedLine};
use crate::image::ImageLoader;

const FONT_SIZE: f32 = 14.0;
const LINE_HEIGHT: f32 = 20.0;
const CHAR_WIDTH: f32 = FONT_SIZE * 0.6;
const PADDING: f32 = 16.0;
const IMAGE_MARGIN: f32 = 8.0;
const FONT_FAMILY: &str = "DejaVu Sans Mono, Menlo, Consolas, Liberation Mono, monospace";

const TEXT: Rgb<u8> = Rgb([0x11, 0x18, 0x27]);
const MUTED: Rgb<u8> = Rgb([0x4b, 0x55, 0x63]);
const LINK: Rgb<u8> = Rgb([0x25, 0x63, 0xeb]);
const CODE_BG: Rgb<u8> = Rgb([0x1f, 0x29, 0x37]);
const CODE_TEXT: Rgb<u8> = Rgb([0xf3, 0xf4, 0xf6]);
const RULE: Rgb<u8> = Rgb([0xe5, 0xe7, 0xeb]);
const TABLE_HEADER_BG: Rgb<u8> = Rgb([0xf3, 0xf4, 0xf6]);

/// Predicate deciding whether a scene node is drawn.
pub type NodeFilter = fn(&SceneNode) -> bool;

/// Settings for one capture.
#[derive(Debug, Clone, Copy)]
pub struct CaptureOptions {
    /// Fill behind all content.
    pub background: Rgb<u8>,
    /// Device pixels per CSS pixel.
    pub pixel_ratio: f32,
    pub filter: NodeFilter,
    /// Capture only the top region a page of this shape shows at full
    /// width. `None` captures everything.
    pub clip_to: Option<PageGeometry>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            background: Rgb([0xff, 0xff, 0xff]),
            pixel_ratio: 2.0,
            filter: visible_node,
            clip_to: Some(PageGeometry::A4),
        }
    }
}

/// Default filter: drop display-suppressed and zero-size nodes.
pub fn visible_node(node: &SceneNode) -> bool {
    !node.hidden && node.width > 0.0 && node.height > 0.0
}

/// Text decoration and color of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub color: Rgb<u8>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: TEXT,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SceneKind {
    Text { text: String, style: TextStyle },
    Fill(Rgb<u8>),
    Image(DynamicImage),
}

/// A positioned box in the scene, in CSS pixels.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Laid out but not displayed.
    pub hidden: bool,
    pub kind: SceneKind,
}

impl SceneNode {
    pub const fn fill(x: f32, y: f32, width: f32, height: f32, color: Rgb<u8>) -> Self {
        Self {
            x,
            y,
            width,
            height,
            hidden: false,
            kind: SceneKind::Fill(color),
        }
    }

    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Everything that makes up the captured region.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    width: f32,
    height: f32,
    nodes: Vec<SceneNode>,
}

impl Scene {
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub const fn width(&self) -> f32 {
        self.width
    }

    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Height of the region `page` shows when the scene spans its width.
    pub fn page_height(&self, page: PageGeometry) -> f32 {
        self.width * page.height_mm / page.width_mm
    }

    /// Lay out the preview as it appears on screen.
    ///
    /// Standalone images that load replace their `[Image: alt]` row; the
    /// placeholder text stays in the scene but is hidden.
    pub fn from_document(document: &Document, images: &ImageLoader) -> Self {
        Self::from_document_within(document, images, None)
    }

    /// Like [`from_document`](Self::from_document), but stops laying out
    /// once the rows run past what `clip_to` shows.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_document_within(
        document: &Document,
        images: &ImageLoader,
        clip_to: Option<PageGeometry>,
    ) -> Self {
        let columns = f32::from(document.width().max(1));
        let content_width = columns * CHAR_WIDTH;
        let mut scene = Self::new(content_width + 2.0 * PADDING, 0.0);
        let max_height = clip_to.map_or(f32::INFINITY, |page| scene.page_height(page));
        let mut y = PADDING;

        for (index, line) in document.lines().iter().enumerate() {
            if y >= max_height {
                break;
            }
            let loaded = document
                .image_at_line(index)
                .and_then(|image| images.load(&image.src));

            match loaded {
                Some(image) if image.width() > 0 && image.height() > 0 => {
                    let natural_width = image.width() as f32;
                    let width = natural_width.min(content_width);
                    let height = image.height() as f32 * width / natural_width;
                    scene.push_line_text(line, y, true);
                    scene.push(SceneNode {
                        x: PADDING,
                        y: y + IMAGE_MARGIN,
                        width,
                        height,
                        hidden: false,
                        kind: SceneKind::Image(image),
                    });
                    y += height + 2.0 * IMAGE_MARGIN;
                }
                _ => {
                    scene.push_line_background(line, y, content_width);
                    scene.push_line_text(line, y, false);
                    y += LINE_HEIGHT;
                }
            }
        }

        scene.height = (y + PADDING).min(max_height);
        scene
    }

    fn push_line_background(&mut self, line: &RenderedLine, y: f32, content_width: f32) {
        match line.line_type() {
            LineType::CodeBlock => {
                self.push(SceneNode::fill(PADDING, y, content_width, LINE_HEIGHT, CODE_BG));
            }
            LineType::TableHeader => {
                self.push(SceneNode::fill(
                    PADDING,
                    y,
                    content_width,
                    LINE_HEIGHT,
                    TABLE_HEADER_BG,
                ));
            }
            LineType::HeadingRule | LineType::HorizontalRule => {
                self.push(SceneNode::fill(
                    PADDING,
                    y + LINE_HEIGHT / 2.0,
                    content_width,
                    1.0,
                    RULE,
                ));
            }
            _ => {}
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn push_line_text(&mut self, line: &RenderedLine, y: f32, hidden: bool) {
        let line_type = line.line_type();
        if matches!(line_type, LineType::HeadingRule | LineType::HorizontalRule) {
            return;
        }

        let runs: Vec<(&str, InlineStyle)> = match line.spans() {
            Some(spans) => spans.iter().map(|span| (span.text(), span.style())).collect(),
            None => vec![(line.content(), InlineStyle::default())],
        };

        let mut column = 0usize;
        for (text, inline) in runs {
            let columns = text.width();
            let x = PADDING + column as f32 * CHAR_WIDTH;
            column += columns;
            if text.trim().is_empty() {
                continue;
            }
            let width = columns as f32 * CHAR_WIDTH;
            if inline.code && line_type != LineType::CodeBlock {
                let mut fill = SceneNode::fill(x, y, width, LINE_HEIGHT, CODE_BG);
                fill.hidden = hidden;
                self.push(fill);
            }
            self.push(SceneNode {
                x,
                y,
                width,
                height: LINE_HEIGHT,
                hidden,
                kind: SceneKind::Text {
                    text: text.to_string(),
                    style: text_style(line_type, inline),
                },
            });
        }
    }
}

fn text_style(line_type: LineType, inline: InlineStyle) -> TextStyle {
    let mut style = TextStyle {
        bold: inline.strong,
        italic: inline.emphasis,
        underline: inline.link,
        strikethrough: inline.strikethrough,
        ..TextStyle::default()
    };
    match line_type {
        LineType::Heading(_) | LineType::TableHeader => style.bold = true,
        LineType::BlockQuote => {
            style.italic = true;
            style.color = MUTED;
        }
        LineType::CodeBlock => style.color = CODE_TEXT,
        LineType::Image => style.color = MUTED,
        _ => {}
    }
    if inline.code && line_type != LineType::CodeBlock {
        style.color = CODE_TEXT;
    } else if inline.link {
        style.color = LINK;
    }
    style
}

/// A captured bitmap.
#[derive(Debug, Clone)]
pub struct Bitmap {
    image: RgbaImage,
}

impl Bitmap {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub const fn pixels(&self) -> &RgbaImage {
        &self.image
    }

    /// Encode as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder fails.
    pub fn to_png(&self) -> Result<Vec<u8>, ExportError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// The bitmap as a `data:image/png;base64,...` reference.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn data_url(&self) -> Result<String, ExportError> {
        let png = self.to_png()?;
        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        ))
    }
}

/// Capture the preview document with `options`.
///
/// # Errors
///
/// Returns an error if the scene cannot be rasterized.
pub fn capture_document(
    document: &Document,
    images: &ImageLoader,
    options: &CaptureOptions,
) -> Result<Bitmap, ExportError> {
    let _scope = crate::perf::scope("export.capture");
    let scene = Scene::from_document_within(document, images, options.clip_to);
    rasterize(&scene, options)
}

/// Rasterize `scene`, skipping nodes the filter rejects.
///
/// # Errors
///
/// Returns an error for an empty region, an SVG the renderer rejects, or a
/// bitmap that cannot be allocated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rasterize(scene: &Scene, options: &CaptureOptions) -> Result<Bitmap, ExportError> {
    let scale = options.pixel_ratio;
    let region_height = options
        .clip_to
        .map_or(scene.height, |page| scene.height.min(scene.page_height(page)));
    let width = (scene.width * scale).ceil() as u32;
    let height = (region_height * scale).ceil() as u32;
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyCapture);
    }

    let visible: Vec<&SceneNode> = scene
        .nodes
        .iter()
        .filter(|node| node.y < region_height && (options.filter)(node))
        .collect();
    let svg = scene_svg(scene.width, region_height, &visible, options.background);

    let opts = resvg::usvg::Options {
        fontdb: font_database(),
        ..Default::default()
    };
    let tree = resvg::usvg::Tree::from_str(&svg, &opts)?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or(ExportError::Bitmap { width, height })?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let mut canvas = RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or(ExportError::Bitmap { width, height })?;

    for node in visible {
        if let SceneKind::Image(image) = &node.kind {
            let target_width = ((node.width * scale).round() as u32).max(1);
            let target_height = ((node.height * scale).round() as u32).max(1);
            let resized = imageops::resize(image, target_width, target_height, FilterType::Triangle);
            imageops::overlay(
                &mut canvas,
                &resized,
                i64::from((node.x * scale).round() as i32),
                i64::from((node.y * scale).round() as i32),
            );
        }
    }

    tracing::debug!(width, height, "preview captured");
    Ok(Bitmap { image: canvas })
}

/// System fonts, loaded on first capture.
fn font_database() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "system fonts loaded");
            Arc::new(db)
        })
        .clone()
}

fn scene_svg(width: f32, height: f32, nodes: &[&SceneNode], background: Rgb<u8>) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#,
    );
    let _ = write!(
        svg,
        r#"<rect x="0" y="0" width="{width}" height="{height}" fill="{}"/>"#,
        hex(background)
    );

    for node in nodes {
        match &node.kind {
            SceneKind::Fill(color) => {
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                    node.x,
                    node.y,
                    node.width,
                    node.height,
                    hex(*color)
                );
            }
            SceneKind::Text { text, style } => {
                let baseline = node.y + (LINE_HEIGHT + FONT_SIZE) / 2.0 - 2.0;
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{baseline}" font-family="{FONT_FAMILY}" font-size="{FONT_SIZE}" fill="{}""#,
                    node.x,
                    hex(style.color)
                );
                if style.bold {
                    svg.push_str(r#" font-weight="bold""#);
                }
                if style.italic {
                    svg.push_str(r#" font-style="italic""#);
                }
                match (style.underline, style.strikethrough) {
                    (true, true) => svg.push_str(r#" text-decoration="underline line-through""#),
                    (true, false) => svg.push_str(r#" text-decoration="underline""#),
                    (false, true) => svg.push_str(r#" text-decoration="line-through""#),
                    (false, false) => {}
                }
                svg.push_str(r#" xml:space="preserve">"#);
                escape_xml(&mut svg, text);
                svg.push_str("</text>");
            }
            SceneKind::Image(_) => {}
        }
    }

    svg.push_str("</svg>");
    svg
}

fn hex(color: Rgb<u8>) -> String {
    let [r, g, b] = color.0;
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Control characters are not valid XML text and are dropped.
fn escape_xml(out: &mut String, text: &str) {
    let printable: String = text.chars().filter(|c| !c.is_control()).collect();
    let mut escaped = Vec::with_capacity(printable.len());
    if comrak::html::escape(&mut escaped, printable.as_bytes()).is_ok() {
        out.push_str(&String::from_utf8_lossy(&escaped));
    }
}
