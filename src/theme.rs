//! Jewel palette: jewel → terminal colour, plus landed/matched highlights.

use crate::field::Jewel;
use crossterm::style::Color;
use thiserror::Error;

/// Colours used when rendering with `--color`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Indexed by `Jewel::index()`: S, T, V, W, X, Y, Z.
    pub jewels: [Color; 7],
    /// Background behind landed faller jewels.
    pub landed_bg: Color,
    /// Background behind matched jewels.
    pub matched_bg: Color,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThemeError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Red, orange, yellow, green, light blue, dark blue, pink; grey landed, white matched.
    pub const fn classic() -> Self {
        Self {
            jewels: [
                rgb(255, 0, 0),
                rgb(252, 132, 3),
                rgb(236, 252, 3),
                rgb(57, 252, 3),
                rgb(3, 248, 252),
                rgb(28, 0, 252),
                rgb(252, 0, 231),
            ],
            landed_bg: rgb(75, 75, 75),
            matched_bg: rgb(255, 255, 255),
        }
    }

    pub const fn jewel_color(&self, jewel: Jewel) -> Color {
        self.jewels[jewel.index()]
    }

    /// Override one jewel's colour from a `#RRGGBB` string.
    pub fn with_jewel_hex(mut self, jewel: Jewel, hex: &str) -> Result<Self, ThemeError> {
        self.jewels[jewel.index()] = parse_hex(hex)?;
        Ok(self)
    }
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ThemeError::InvalidHex(s.to_string()));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()));
    Ok(rgb(channel(0)?, channel(2)?, channel(4)?))
}
