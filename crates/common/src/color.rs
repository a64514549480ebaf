use serde::{Deserialize, Serialize};

/// The product page's particle palette.
pub const DEFAULT_PALETTE_HEX: [&str; 10] = [
    "#4c1a22", "#4c1a23", "#5d6268", "#1f2e37", "#474848", "#542619", "#ead8cf", "#4c241f",
    "#d6b9b1", "#964a47",
];

/// Errors from color parsing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("color must look like #rrggbb, got {0:?}")]
    Malformed(String),
    #[error("palette must contain at least one color")]
    EmptyPalette,
}

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse an opaque `#rrggbb` color.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let malformed = || ColorError::Malformed(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(malformed)?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(malformed());
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| malformed())
        };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, 1.0))
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Non-empty set of colors particles are sampled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Palette {
    colors: Vec<Color>,
    hex: Vec<String>,
}

impl Palette {
    pub fn from_hex<S: AsRef<str>>(entries: &[S]) -> Result<Self, ColorError> {
        if entries.is_empty() {
            return Err(ColorError::EmptyPalette);
        }
        let colors = entries
            .iter()
            .map(|h| Color::from_hex(h.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            colors,
            hex: entries.iter().map(|h| h.as_ref().to_string()).collect(),
        })
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`, wrapping around the palette.
    pub fn pick(&self, index: usize) -> Color {
        self.colors[index % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE_HEX
                .iter()
                .filter_map(|h| Color::from_hex(h).ok())
                .collect(),
            hex: DEFAULT_PALETTE_HEX.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for Palette {
    type Error = ColorError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Palette> for Vec<String> {
    fn from(p: Palette) -> Self {
        p.hex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_channels() {
        let c = Color::from_hex("#ff0080").unwrap();
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Color::from_hex("ff0080").is_err());
        assert!(Color::from_hex("#ff00").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
    }

    #[test]
    fn default_palette_has_ten_colors() {
        let p = Palette::default();
        assert_eq!(p.len(), 10);
        assert_eq!(p.pick(0), Color::from_hex("#4c1a22").unwrap());
        assert_eq!(p.pick(10), p.pick(0));
    }

    #[test]
    fn empty_palette_is_an_error() {
        let empty: [&str; 0] = [];
        assert_eq!(Palette::from_hex(&empty), Err(ColorError::EmptyPalette));
    }
}
