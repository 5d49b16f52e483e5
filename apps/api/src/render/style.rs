//! Paragraph styles and page geometry for the résumé document.

use serde::{Deserialize, Serialize};

/// Points per centimetre.
pub const CM: f32 = 72.0 / 2.54;

/// RGB color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    /// Parses `#RRGGBB`. Returns `None` for anything else.
    #[cfg(test)]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
/// Brand blue, `#003399`.
pub const BRAND_BLUE: Rgb = Rgb(0.0, 0.2, 0.6);
pub const GREY: Rgb = Rgb(0.502, 0.502, 0.502);
pub const LIGHT_GREY: Rgb = Rgb(0.827, 0.827, 0.827);

/// Named paragraph styles. The story refers to styles by name; the layout
/// engine resolves them through [`StyleSheet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleName {
    /// Candidate name in the header.
    Name,
    /// Section heading (OBJETIVO PROFISSIONAL, ...).
    SectionTitle,
    Normal,
    /// Small muted text: contact line, period line, footer.
    Small,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size_pt: f32,
    pub leading_pt: f32,
    pub color: Rgb,
    pub space_before_pt: f32,
    pub space_after_pt: f32,
}

/// Resolved set of paragraph styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    pub name: TextStyle,
    pub section_title: TextStyle,
    pub normal: TextStyle,
    pub small: TextStyle,
}

impl StyleSheet {
    pub fn get(&self, style: StyleName) -> &TextStyle {
        match style {
            StyleName::Name => &self.name,
            StyleName::SectionTitle => &self.section_title,
            StyleName::Normal => &self.normal,
            StyleName::Small => &self.small,
        }
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        StyleSheet {
            name: TextStyle {
                size_pt: 22.0,
                leading_pt: 26.0,
                color: BRAND_BLUE,
                space_before_pt: 0.0,
                space_after_pt: 10.0,
            },
            section_title: TextStyle {
                size_pt: 14.0,
                leading_pt: 18.0,
                color: BRAND_BLUE,
                space_before_pt: 15.0,
                space_after_pt: 5.0,
            },
            normal: TextStyle {
                size_pt: 10.0,
                leading_pt: 12.0,
                color: BLACK,
                space_before_pt: 0.0,
                space_after_pt: 0.0,
            },
            small: TextStyle {
                size_pt: 9.0,
                leading_pt: 12.0,
                color: GREY,
                space_before_pt: 0.0,
                space_after_pt: 0.0,
            },
        }
    }
}

/// Page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
}

impl PageGeometry {
    /// A4 portrait with 2 cm margins on all sides.
    pub fn a4() -> Self {
        PageGeometry {
            width_pt: 595.28,
            height_pt: 841.89,
            margin_pt: 2.0 * CM,
        }
    }

    pub fn text_width_pt(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }

    /// Y coordinate of the top edge of the text area (PDF origin is bottom-left).
    pub fn top_pt(&self) -> f32 {
        self.height_pt - self.margin_pt
    }

    pub fn bottom_pt(&self) -> f32 {
        self.margin_pt
    }
}
