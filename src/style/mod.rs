//! # Style System
//!
//! Named, reusable bags of visual properties referenced by elements: text,
//! paragraph, border, and fill styles, each in its own id namespace.
//!
//! Every property bag field is optional. A record in the registry supplies
//! base values; an element's inline override bag wins on conflicting keys;
//! whatever is still unset falls through to the kind's hard defaults at
//! render time. We don't implement CSS; we implement the four bags a
//! document designer actually edits, and we merge them predictably.

pub mod font;
pub mod registry;

pub use registry::{StyleBundle, StyleKind, StyleProps, StyleRecord, StyleRegistry};

use serde::{Deserialize, Serialize};

/// An RGBA color, serialized as a hex string (`#rrggbb` or `#rrggbbaa`)
/// to match the host's saved documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Lenient hex parsing: `#rgb`, `#rrggbb`, `#rrggbbaa`. Anything else
    /// comes back black. Use [`Color::parse_hex`] where the input needs
    /// validating instead of forgiving.
    pub fn hex(hex: &str) -> Self {
        Self::parse_hex(hex).unwrap_or(Color::BLACK)
    }

    /// Strict hex parsing for edge validation.
    pub fn parse_hex(hex: &str) -> Result<Self, String> {
        let raw = hex.trim().trim_start_matches('#');
        let component = |s: &str| -> Result<f64, String> {
            u8::from_str_radix(s, 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|_| format!("invalid color component '{}' in '{}'", s, hex))
        };
        match raw.len() {
            3 => Ok(Self {
                r: component(&raw[0..1].repeat(2))?,
                g: component(&raw[1..2].repeat(2))?,
                b: component(&raw[2..3].repeat(2))?,
                a: 1.0,
            }),
            6 => Ok(Self {
                r: component(&raw[0..2])?,
                g: component(&raw[2..4])?,
                b: component(&raw[4..6])?,
                a: 1.0,
            }),
            8 => Ok(Self {
                r: component(&raw[0..2])?,
                g: component(&raw[2..4])?,
                b: component(&raw[4..6])?,
                a: component(&raw[6..8])?,
            }),
            _ => Err(format!(
                "expected a color like #rgb, #rrggbb or #rrggbbaa, got '{}'",
                hex
            )),
        }
    }

    pub fn to_hex(&self) -> String {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if (self.a - 1.0).abs() < f64::EPSILON {
            format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                byte(self.r),
                byte(self.g),
                byte(self.b),
                byte(self.a)
            )
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::parse_hex(&s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// CSS-like border patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BorderPattern {
    #[default]
    Solid,
    Dashed,
    Dotted,
    None,
}

impl BorderPattern {
    /// SVG stroke-dasharray for this pattern, scaled by stroke width.
    pub fn dash_array(&self, stroke_width: f64) -> Option<String> {
        let w = stroke_width.max(1.0);
        match self {
            BorderPattern::Solid | BorderPattern::None => None,
            BorderPattern::Dashed => Some(format!("{} {}", w * 4.0, w * 2.0)),
            BorderPattern::Dotted => Some(format!("{} {}", w, w * 2.0)),
        }
    }
}

/// Character-level text properties.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyleProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// 100-900, CSS-style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
}

/// Block-level text properties.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyleProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// Multiplier of font size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_before: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_after: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderStyleProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<BorderPattern>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillStyleProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// 0.0 - 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

macro_rules! merge_fields {
    ($dst:expr, $src:expr, [$($field:ident),+ $(,)?]) => {
        $(
            if $src.$field.is_some() {
                $dst.$field = $src.$field.clone();
            }
        )+
    };
}

impl TextStyleProps {
    /// Overwrite fields that are set in `other`, keep the rest.
    pub fn merge_from(&mut self, other: &TextStyleProps) {
        merge_fields!(
            self,
            other,
            [
                font_family,
                font_size,
                font_weight,
                font_style,
                color,
                letter_spacing,
                text_decoration,
            ]
        );
    }
}

impl ParagraphStyleProps {
    pub fn merge_from(&mut self, other: &ParagraphStyleProps) {
        merge_fields!(
            self,
            other,
            [text_align, line_height, indent, space_before, space_after]
        );
    }
}

impl BorderStyleProps {
    pub fn merge_from(&mut self, other: &BorderStyleProps) {
        merge_fields!(self, other, [width, color, radius, pattern]);
    }
}

impl FillStyleProps {
    pub fn merge_from(&mut self, other: &FillStyleProps) {
        merge_fields!(self, other, [color, opacity]);
    }
}

/// Fully concrete text style the renderer works with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u32,
    pub font_style: FontStyle,
    pub color: Color,
    pub letter_spacing: f64,
    pub text_decoration: TextDecoration,
}

impl ResolvedTextStyle {
    /// The base default every text element resolves to when nothing else
    /// applies. `base_size` is the element's own font size.
    pub fn base(base_size: f64) -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_size: base_size,
            font_weight: 400,
            font_style: FontStyle::Normal,
            color: Color::BLACK,
            letter_spacing: 0.0,
            text_decoration: TextDecoration::None,
        }
    }

    pub fn apply(&mut self, props: &TextStyleProps) {
        if let Some(v) = &props.font_family {
            self.font_family = v.clone();
        }
        if let Some(v) = props.font_size {
            self.font_size = v;
        }
        if let Some(v) = props.font_weight {
            self.font_weight = v;
        }
        if let Some(v) = props.font_style {
            self.font_style = v;
        }
        if let Some(v) = props.color {
            self.color = v;
        }
        if let Some(v) = props.letter_spacing {
            self.letter_spacing = v;
        }
        if let Some(v) = props.text_decoration {
            self.text_decoration = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedParagraphStyle {
    pub text_align: TextAlign,
    pub line_height: f64,
    pub indent: f64,
    pub space_before: f64,
    pub space_after: f64,
}

impl ResolvedParagraphStyle {
    pub fn base() -> Self {
        Self {
            text_align: TextAlign::Left,
            line_height: 1.4,
            indent: 0.0,
            space_before: 0.0,
            space_after: 0.0,
        }
    }

    pub fn apply(&mut self, props: &ParagraphStyleProps) {
        if let Some(v) = props.text_align {
            self.text_align = v;
        }
        if let Some(v) = props.line_height {
            self.line_height = v;
        }
        if let Some(v) = props.indent {
            self.indent = v;
        }
        if let Some(v) = props.space_before {
            self.space_before = v;
        }
        if let Some(v) = props.space_after {
            self.space_after = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBorderStyle {
    pub width: f64,
    pub color: Color,
    pub radius: f64,
    pub pattern: BorderPattern,
}

impl ResolvedBorderStyle {
    pub fn base() -> Self {
        Self {
            width: 0.0,
            color: Color::BLACK,
            radius: 0.0,
            pattern: BorderPattern::Solid,
        }
    }

    pub fn apply(&mut self, props: &BorderStyleProps) {
        if let Some(v) = props.width {
            self.width = v;
        }
        if let Some(v) = props.color {
            self.color = v;
        }
        if let Some(v) = props.radius {
            self.radius = v;
        }
        if let Some(v) = props.pattern {
            self.pattern = v;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.pattern != BorderPattern::None && self.color.a > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFillStyle {
    pub color: Color,
    pub opacity: f64,
}

impl ResolvedFillStyle {
    pub fn base() -> Self {
        Self {
            color: Color::TRANSPARENT,
            opacity: 1.0,
        }
    }

    pub fn apply(&mut self, props: &FillStyleProps) {
        if let Some(v) = props.color {
            self.color = v;
        }
        if let Some(v) = props.opacity {
            self.opacity = v;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.color.a > 0.0 && self.opacity > 0.0
    }
}
