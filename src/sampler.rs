//! Manual color sampling: maps a click on the displayed image back to a
//! pixel of the source image and reads its color.

use image::RgbImage;

use crate::color::{synthesize_palette_code, Color};
use crate::error::PaletteError;

/// On-screen rectangle of the displayed image, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    fn is_usable(&self) -> bool {
        [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// A point in display space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Natural pixel dimensions of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A color pulled from an image, before it becomes a catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedColor {
    pub color: Color,
    pub palette_code: String,
    pub label: Option<String>,
    pub description: Option<String>,
    /// Percentages of the rendered bounds, for marker placement. Set only
    /// by direct pixel sampling.
    pub display_position: Option<(f64, f64)>,
}

impl ExtractedColor {
    pub fn hex(&self) -> String {
        self.color.to_hex()
    }
}

/// Read-back access to a rendered raster image.
pub trait PixelReader {
    /// Dimensions of the loaded buffer, or `None` before anything is loaded.
    fn dimensions(&self) -> Option<Dimensions>;

    /// Color at source pixel `(x, y)`.
    fn read_pixel(&self, x: u32, y: u32) -> Result<Color, PaletteError>;
}

/// Off-screen RGB buffer sized to the natural dimensions of a decoded image.
#[derive(Debug, Clone, Default)]
pub struct RasterSurface {
    buffer: Option<RgbImage>,
}

impl RasterSurface {
    /// A surface with nothing drawn into it yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode arbitrary image bytes (PNG, JPEG, ...) into a surface.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PaletteError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| PaletteError::surface_unavailable(format!("cannot decode image: {e}")))?;
        Ok(Self::from_image(img.to_rgb8()))
    }

    pub fn from_image(buffer: RgbImage) -> Self {
        Self {
            buffer: Some(buffer),
        }
    }
}

impl PixelReader for RasterSurface {
    fn dimensions(&self) -> Option<Dimensions> {
        self.buffer
            .as_ref()
            .map(|b| Dimensions::new(b.width(), b.height()))
    }

    fn read_pixel(&self, x: u32, y: u32) -> Result<Color, PaletteError> {
        let buffer = self
            .buffer
            .as_ref()
            .ok_or_else(|| PaletteError::surface_unavailable("no image loaded"))?;
        let p = buffer.get_pixel_checked(x, y).ok_or_else(|| {
            PaletteError::surface_unavailable(format!(
                "pixel ({x}, {y}) outside {}x{} surface",
                buffer.width(),
                buffer.height()
            ))
        })?;
        Ok(Color::new(p[0], p[1], p[2]))
    }
}

/// Map a display coordinate to a source pixel index along one axis.
///
/// `normalized` is already clamped to [0, 1]; the index is truncated and
/// clamped to `0..extent`.
fn source_index(normalized: f64, extent: u32) -> u32 {
    let index = (normalized * extent as f64) as u32;
    index.min(extent - 1)
}

/// Clamped position of `click` within `bounds`, each axis in [0, 1].
fn normalize(bounds: &Bounds, click: Point) -> (f64, f64) {
    let nx = (click.x - bounds.left) / bounds.width;
    let ny = (click.y - bounds.top) / bounds.height;
    let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    (clamp(nx), clamp(ny))
}

/// Sample the source pixel under `click`.
///
/// Clicks outside `bounds` are clamped to the nearest edge, so the sampled
/// pixel is always inside the source image. Sampling is read-only and
/// repeatable.
pub fn sample_at(
    bounds: Bounds,
    click: Point,
    source: Dimensions,
    reader: &dyn PixelReader,
) -> Result<ExtractedColor, PaletteError> {
    if source.is_empty() {
        return Err(PaletteError::surface_unavailable(
            "source image has zero dimensions",
        ));
    }
    if !bounds.is_usable() {
        return Err(PaletteError::surface_unavailable(
            "rendered image bounds are empty",
        ));
    }
    match reader.dimensions() {
        None => return Err(PaletteError::surface_unavailable("no image loaded")),
        Some(actual) if actual != source => {
            return Err(PaletteError::surface_unavailable(format!(
                "surface is {}x{}, expected {}x{}",
                actual.width, actual.height, source.width, source.height
            )));
        }
        Some(_) => {}
    }

    let (nx, ny) = normalize(&bounds, click);
    let px = source_index(nx, source.width);
    let py = source_index(ny, source.height);
    let color = reader.read_pixel(px, py)?;
    log::debug!("sampled {color} at source pixel ({px}, {py})");

    Ok(ExtractedColor {
        color,
        palette_code: synthesize_palette_code(color),
        label: None,
        description: None,
        display_position: Some((nx * 100.0, ny * 100.0)),
    })
}
