use crate::error::PaletteError;

/// Core color type used throughout the catalog.
/// Wraps sRGB u8 components; hex, RGB and CMYK forms are all derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Integer CMYK percentages in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cmyk {
    pub c: u8,
    pub m: u8,
    pub y: u8,
    pub k: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a strict `#RRGGBB` string. Case-insensitive; the `#` is required.
    pub fn from_hex(hex: &str) -> Result<Self, PaletteError> {
        let Some(digits) = hex.strip_prefix('#') else {
            return Err(PaletteError::invalid_format(hex, "missing leading '#'"));
        };
        if digits.len() != 6 {
            return Err(PaletteError::invalid_format(
                hex,
                "expected exactly 6 hex digits",
            ));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PaletteError::invalid_format(hex, "non-hex digit"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| PaletteError::invalid_format(hex, "non-hex digit"))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Serialize to uppercase hex `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Channels as `"r, g, b"`, the form shown next to the hex value.
    pub fn rgb_string(self) -> String {
        format!("{}, {}, {}", self.r, self.g, self.b)
    }

    pub fn to_cmyk(self) -> Cmyk {
        rgb_to_cmyk(self.r, self.g, self.b)
    }

    /// WCAG 2.0 relative luminance.
    ///
    /// Linearizes each sRGB channel, then computes the weighted sum.
    pub fn relative_luminance(self) -> f32 {
        fn linearize(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linearize(self.r) + 0.7152 * linearize(self.g) + 0.0722 * linearize(self.b)
    }

    /// WCAG 2.0 contrast ratio between two colors, in [1, 21].
    pub fn contrast_ratio(c1: &Color, c2: &Color) -> f32 {
        let l1 = c1.relative_luminance();
        let l2 = c2.relative_luminance();
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Color {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Naive subtractive RGB to CMYK conversion, rounded to whole percentages.
pub fn rgb_to_cmyk(r: u8, g: u8, b: u8) -> Cmyk {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;
    let k = 1.0 - r.max(g).max(b);
    let pct = |v: f64| (v * 100.0).round() as u8;

    // Pure black: 1 - k is zero.
    if k >= 1.0 {
        return Cmyk {
            c: 0,
            m: 0,
            y: 0,
            k: 100,
        };
    }
    Cmyk {
        c: pct((1.0 - r - k) / (1.0 - k)),
        m: pct((1.0 - g - k) / (1.0 - k)),
        y: pct((1.0 - b - k) / (1.0 - k)),
        k: pct(k),
    }
}

const PALETTE_CODE_FALLBACK: &str = "0101";

/// Derive a Pantone-style code from a color when no real code is known.
///
/// Pure and total over every RGB triple. The numbers are a stable label,
/// not a lookup in any real color-matching registry.
pub fn synthesize_palette_code(color: Color) -> String {
    let (r, g, b) = (color.r as u32, color.g as u32, color.b as u32);
    let sector1 = r / 10 + 10;
    let sector2 = ((g + b) / 20) * 100 + r % 50;
    if sector2 == 0 {
        format!("PANTONE {sector1}-{PALETTE_CODE_FALLBACK} TCX")
    } else {
        format!("PANTONE {sector1}-{sector2} TCX")
    }
}
