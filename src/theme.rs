//! Retro color themes
//!
//! Supplies the colors the overlay and collision targets draw with: a base
//! text color, an ordered palette of hit colors, and ball/paddle/box colors.
//! Targets pick a hit color by `character_index % palette.len()`.

/// An sRGB color with alpha, components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

pub const WHITE: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse a `#RRGGBB` string. Malformed input falls back to white so a bad
    /// palette entry can never fail a render.
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            log::warn!("malformed color {hex:?}, using white");
            return WHITE;
        }
        match u32::from_str_radix(digits, 16) {
            Ok(v) => Self {
                r: ((v >> 16) & 0xFF) as f32 / 255.0,
                g: ((v >> 8) & 0xFF) as f32 / 255.0,
                b: (v & 0xFF) as f32 / 255.0,
                a: 1.0,
            },
            Err(_) => {
                log::warn!("malformed color {hex:?}, using white");
                WHITE
            }
        }
    }

    /// CSS hex form for DOM-side styling
    pub fn to_css(&self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        )
    }

    /// Shader-side form
    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A complete theme: page colors plus the hit palette
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub name: &'static str,
    pub background: Color,
    pub text: Color,
    pub box_background: Color,
    pub box_border: Color,
    pub paddle: Color,
    pub ball: Color,
    pub hit_colors: Vec<Color>,
}

impl ColorTheme {
    /// Hit color for a character index (wraps around the palette)
    pub fn hit_color(&self, index: usize) -> Color {
        if self.hit_colors.is_empty() {
            return self.text;
        }
        self.hit_colors[index % self.hit_colors.len()]
    }
}

/// The built-in 8-bit palettes
pub fn builtin_themes() -> Vec<ColorTheme> {
    vec![
        ColorTheme {
            name: "Classic",
            background: Color::from_hex("#000000"),
            text: Color::from_hex("#FFFFFF"),
            box_background: Color::from_hex("#111111"),
            box_border: Color::from_hex("#333333"),
            paddle: Color::from_hex("#FFFFFF"),
            ball: Color::from_hex("#FFFFFF"),
            hit_colors: vec![Color::from_hex("#FFFF00")],
        },
        ColorTheme {
            name: "Gameboy",
            background: Color::from_hex("#0F380F"),
            text: Color::from_hex("#9BBC0F"),
            box_background: Color::from_hex("#306230"),
            box_border: Color::from_hex("#8BAC0F"),
            paddle: Color::from_hex("#9BBC0F"),
            ball: Color::from_hex("#9BBC0F"),
            hit_colors: vec![
                Color::from_hex("#8BAC0F"),
                Color::from_hex("#306230"),
                Color::from_hex("#0F380F"),
            ],
        },
        ColorTheme {
            name: "CGA",
            background: Color::from_hex("#000000"),
            text: Color::from_hex("#55FFFF"),
            box_background: Color::from_hex("#000000"),
            box_border: Color::from_hex("#55FFFF"),
            paddle: Color::from_hex("#FF55FF"),
            ball: Color::from_hex("#FFFFFF"),
            hit_colors: vec![Color::from_hex("#FF55FF"), Color::from_hex("#55FFFF")],
        },
        ColorTheme {
            name: "NES",
            background: Color::from_hex("#000000"),
            text: Color::from_hex("#FFFFFF"),
            box_background: Color::from_hex("#0000FF"),
            box_border: Color::from_hex("#FF0000"),
            paddle: Color::from_hex("#FF0000"),
            ball: Color::from_hex("#FFFFFF"),
            hit_colors: vec![
                Color::from_hex("#FF0000"),
                Color::from_hex("#FFFF00"),
                Color::from_hex("#00FF00"),
            ],
        },
        ColorTheme {
            name: "Commodore 64",
            background: Color::from_hex("#4040E0"),
            text: Color::from_hex("#FFFFFF"),
            box_background: Color::from_hex("#4040E0"),
            box_border: Color::from_hex("#7070FF"),
            paddle: Color::from_hex("#7070FF"),
            ball: Color::from_hex("#FFFFFF"),
            hit_colors: vec![
                Color::from_hex("#7070FF"),
                Color::from_hex("#FFFFFF"),
                Color::from_hex("#A0A0FF"),
            ],
        },
    ]
}

/// Index of a theme by name, if present
pub fn theme_index(themes: &[ColorTheme], name: &str) -> Option<usize> {
    themes.iter().position(|t| t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let c = Color::from_hex("#9BBC0F");
        assert_eq!(c.to_css(), "#9BBC0F");
        assert!((c.g - 0xBC as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_malformed_hex_is_white() {
        assert_eq!(Color::from_hex("nope"), WHITE);
        assert_eq!(Color::from_hex("#12345"), WHITE);
        assert_eq!(Color::from_hex("#GGGGGG"), WHITE);
    }

    #[test]
    fn test_hit_color_wraps_palette() {
        let themes = builtin_themes();
        let nes = &themes[theme_index(&themes, "NES").unwrap()];
        assert_eq!(nes.hit_colors.len(), 3);
        assert_eq!(nes.hit_color(0), nes.hit_colors[0]);
        assert_eq!(nes.hit_color(4), nes.hit_colors[1]);
        assert_eq!(nes.hit_color(5), nes.hit_colors[2]);
    }

    #[test]
    fn test_empty_palette_falls_back_to_text() {
        let mut theme = builtin_themes().remove(0);
        theme.hit_colors.clear();
        assert_eq!(theme.hit_color(3), theme.text);
    }
}
