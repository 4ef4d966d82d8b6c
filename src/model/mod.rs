//! # Element Model
//!
//! The canonical data structures for the layout designer: one placeable
//! [`Element`], the tagged [`ElementKind`] union behind it, and the
//! [`LayoutDocument`] that is the unit of persistence.
//!
//! The model is intentionally close to the host application's JSON shape:
//! camelCase fields, a `type` tag on each element, hex-string colors. A
//! document saved by an older host must keep deserializing, so unknown
//! fields are ignored and missing style overrides are backfilled on load.
//!
//! The model stores geometry; it does not police it. Position clamping is
//! the drag controller's job and minimum sizes are the resize controller's
//! job. What the model does own is the per-variant capability surface:
//! `type_name`, `min_size`, `describe_properties`, `validate` all live on
//! [`ElementKind`], so adding a new element kind touches one impl block.

use crate::style::{BorderPattern, Color, ParagraphStyleProps, TextStyleProps};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Opaque unique element identifier. Assigned at creation, immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    /// Generate a fresh id.
    pub fn generate() -> Self {
        ElementId(format!("el-{}", Uuid::new_v4()))
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An axis-aligned rectangle in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// The drawable canvas area, in pixels. Elements are clamped inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasBounds {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasBounds {
    fn default() -> Self {
        // A4 portrait at 96 dpi, the host's default artboard.
        Self {
            width: 794.0,
            height: 1123.0,
        }
    }
}

/// One placeable unit on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,

    /// Top-left position in canvas pixel space. Always >= 0 after a drag.
    pub x: f64,
    pub y: f64,

    /// Base font size for text content, in pixels. Valid range 8..=72.
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    // Style linkage: either a registry id, an inline override bag, or both.
    // On conflicting keys the inline override wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_style_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_style_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_style_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_style_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_style: Option<TextStyleProps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_style: Option<ParagraphStyleProps>,

    /// Cosmetic stacking override. Unset means insertion order decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,

    #[serde(flatten)]
    pub kind: ElementKind,
}

pub(crate) fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

pub const DEFAULT_FONT_SIZE: f64 = 14.0;
pub const FONT_SIZE_MIN: f64 = 8.0;
pub const FONT_SIZE_MAX: f64 = 72.0;

/// The different kinds of placeable elements.
///
/// Variable elements auto-size from their rendered label; only text and
/// rectangle elements store explicit dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ElementKind {
    Text {
        /// Raw string, possibly embedding `{{dotted.path}}` tokens.
        text: String,
        width: f64,
        height: f64,
    },
    Rectangle {
        width: f64,
        height: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill_color: Option<Color>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_color: Option<Color>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_radius: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_style: Option<BorderPattern>,
    },
    Variable {
        /// A single dotted-path reference. Empty renders a placeholder.
        #[serde(rename = "variable")]
        path: String,
    },
}

/// The element type tags, used by "add element" actions and the defaults
/// table. Distinct from [`ElementKind`] because it carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    Text,
    Rectangle,
    Variable,
}

impl ElementType {
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Text => "text",
            ElementType::Rectangle => "rectangle",
            ElementType::Variable => "variable",
        }
    }

    /// The fixed defaults table: the kind payload a newly added element of
    /// this type starts with.
    pub fn seed_kind(&self) -> ElementKind {
        match self {
            ElementType::Text => ElementKind::Text {
                text: "New text".to_string(),
                width: 200.0,
                height: 40.0,
            },
            ElementType::Rectangle => ElementKind::Rectangle {
                width: 120.0,
                height: 80.0,
                fill_color: Some(Color::hex("#E5E7EB")),
                border_color: Some(Color::hex("#111827")),
                border_width: Some(1.0),
                border_radius: Some(0.0),
                border_style: Some(BorderPattern::Solid),
            },
            ElementType::Variable => ElementKind::Variable {
                path: String::new(),
            },
        }
    }
}

impl ElementKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Text { .. } => ElementType::Text,
            ElementKind::Rectangle { .. } => ElementType::Rectangle,
            ElementKind::Variable { .. } => ElementType::Variable,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.element_type().name()
    }

    /// Minimum (width, height) enforced during resizes.
    pub fn min_size(&self) -> (f64, f64) {
        match self {
            ElementKind::Text { .. } => (50.0, 30.0),
            ElementKind::Rectangle { .. } => (10.0, 10.0),
            ElementKind::Variable { .. } => (0.0, 0.0),
        }
    }

    /// Stored dimensions, if this kind has any. Variable elements auto-size.
    pub fn size(&self) -> Option<(f64, f64)> {
        match self {
            ElementKind::Text { width, height, .. }
            | ElementKind::Rectangle { width, height, .. } => Some((*width, *height)),
            ElementKind::Variable { .. } => None,
        }
    }

    pub fn is_resizable(&self) -> bool {
        self.size().is_some()
    }

    fn set_size(&mut self, w: f64, h: f64) {
        if let ElementKind::Text { width, height, .. }
        | ElementKind::Rectangle { width, height, .. } = self
        {
            *width = w;
            *height = h;
        }
    }

    /// The editable properties a host property panel should offer for this
    /// kind, beyond the shared position/style-link fields.
    pub fn describe_properties(&self) -> Vec<PropertyDescriptor> {
        match self {
            ElementKind::Text { .. } => vec![
                PropertyDescriptor::new("text", "Text", PropertyInput::MultilineText),
                PropertyDescriptor::new("width", "Width", PropertyInput::Number),
                PropertyDescriptor::new("height", "Height", PropertyInput::Number),
                PropertyDescriptor::new("fontSize", "Font size", PropertyInput::Number),
            ],
            ElementKind::Rectangle { .. } => vec![
                PropertyDescriptor::new("width", "Width", PropertyInput::Number),
                PropertyDescriptor::new("height", "Height", PropertyInput::Number),
                PropertyDescriptor::new("fillColor", "Fill", PropertyInput::Color),
                PropertyDescriptor::new("borderColor", "Border color", PropertyInput::Color),
                PropertyDescriptor::new("borderWidth", "Border width", PropertyInput::Number),
                PropertyDescriptor::new("borderRadius", "Corner radius", PropertyInput::Number),
                PropertyDescriptor::new("borderStyle", "Border style", PropertyInput::Choice),
            ],
            ElementKind::Variable { .. } => vec![
                PropertyDescriptor::new("variable", "Variable", PropertyInput::VariablePath),
                PropertyDescriptor::new("fontSize", "Font size", PropertyInput::Number),
            ],
        }
    }
}

/// A property-panel field description, derived from the element kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub input: PropertyInput,
}

impl PropertyDescriptor {
    fn new(key: &'static str, label: &'static str, input: PropertyInput) -> Self {
        Self { key, label, input }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyInput {
    Number,
    MultilineText,
    Color,
    Choice,
    VariablePath,
}

/// A single validation problem, surfaced inline next to the offending
/// field. Never thrown; always collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl Element {
    pub fn new(kind: ElementKind, x: f64, y: f64) -> Self {
        let mut element = Self {
            id: ElementId::generate(),
            x,
            y,
            font_size: DEFAULT_FONT_SIZE,
            text_style_id: None,
            paragraph_style_id: None,
            border_style_id: None,
            fill_style_id: None,
            text_style: None,
            paragraph_style: None,
            z_index: None,
            kind,
        };
        if matches!(element.kind, ElementKind::Text { .. }) {
            // Text elements always carry override bags so hosts can edit
            // single properties without allocating the object first.
            element.text_style = Some(TextStyleProps::default());
            element.paragraph_style = Some(ParagraphStyleProps::default());
        }
        element
    }

    /// The on-canvas footprint used for drag clamping and hit testing.
    /// Variable elements have no stored size, so theirs is estimated from
    /// the rendered label.
    pub fn footprint(&self) -> (f64, f64) {
        match &self.kind {
            ElementKind::Variable { path } => {
                let label_len = if path.is_empty() {
                    "{{variable}}".chars().count()
                } else {
                    path.chars().count() + 4
                };
                (
                    (label_len as f64 * self.font_size * 0.6).max(24.0),
                    self.font_size * 1.4,
                )
            }
            kind => kind.size().unwrap_or((0.0, 0.0)),
        }
    }

    pub fn frame(&self) -> Frame {
        let (width, height) = self.footprint();
        Frame {
            x: self.x,
            y: self.y,
            width,
            height,
        }
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.kind.set_size(width, height);
    }

    /// Clone this element with a fresh id and a (+20, +20) offset.
    /// Style override bags are values, so the clone shares nothing.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = ElementId::generate();
        copy.x += 20.0;
        copy.y += 20.0;
        copy
    }

    /// Validate this element's current state. Geometry out of range and
    /// font sizes outside [8, 72] are reported, never thrown.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.x < 0.0 || self.y < 0.0 {
            issues.push(ValidationIssue::new(
                "position",
                "position must not be negative",
            ));
        }
        if !(FONT_SIZE_MIN..=FONT_SIZE_MAX).contains(&self.font_size) {
            issues.push(ValidationIssue::new(
                "fontSize",
                format!(
                    "font size must be between {} and {}",
                    FONT_SIZE_MIN, FONT_SIZE_MAX
                ),
            ));
        }
        if let Some((w, h)) = self.kind.size() {
            let (min_w, min_h) = self.kind.min_size();
            if w < min_w || h < min_h {
                issues.push(ValidationIssue::new(
                    "size",
                    format!("{} must be at least {}x{}", self.kind.type_name(), min_w, min_h),
                ));
            }
        }
        if let ElementKind::Rectangle {
            border_width: Some(bw),
            ..
        } = &self.kind
        {
            if *bw < 0.0 {
                issues.push(ValidationIssue::new(
                    "borderWidth",
                    "border width must not be negative",
                ));
            }
        }
        issues
    }
}

/// The persisted unit: elements in insertion order plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub elements: Vec<Element>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

/// Descriptive metadata stamped at save time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default)]
    pub version: u32,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub text_count: usize,
    #[serde(default)]
    pub rectangle_count: usize,
    #[serde(default)]
    pub variable_count: usize,
    #[serde(default)]
    pub has_custom_styles: bool,
}

pub const DOCUMENT_VERSION: u32 = 1;

impl LayoutDocument {
    /// Build a document from an element list, stamping fresh metadata.
    pub fn from_elements(elements: Vec<Element>, has_custom_styles: bool) -> Self {
        let count = |t: ElementType| {
            elements
                .iter()
                .filter(|e| e.kind.element_type() == t)
                .count()
        };
        let metadata = DocumentMetadata {
            version: DOCUMENT_VERSION,
            created_at: now_millis(),
            text_count: count(ElementType::Text),
            rectangle_count: count(ElementType::Rectangle),
            variable_count: count(ElementType::Variable),
            has_custom_styles,
        };
        Self { elements, metadata }
    }

    /// Backfill fields older documents may lack, so they stay renderable:
    /// text elements regain their style override bags.
    pub fn normalize(&mut self) {
        for element in &mut self.elements {
            if matches!(element.kind, ElementKind::Text { .. }) {
                if element.text_style.is_none() {
                    element.text_style = Some(TextStyleProps::default());
                }
                if element.paragraph_style.is_none() {
                    element.paragraph_style = Some(ParagraphStyleProps::default());
                }
            }
        }
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A partial update applied to one element.
///
/// Top-level fields replace; the `text_style` and `paragraph_style` bags
/// merge one level deeper, so toggling a single property never clobbers
/// its siblings.
#[derive(Debug, Clone, Default)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub font_size: Option<f64>,
    pub text: Option<String>,
    pub variable: Option<String>,
    pub fill_color: Option<Color>,
    pub border_color: Option<Color>,
    pub border_width: Option<f64>,
    pub border_radius: Option<f64>,
    pub border_style: Option<BorderPattern>,
    /// `Some(None)` clears the link, `Some(Some(id))` sets it.
    pub text_style_id: Option<Option<String>>,
    pub paragraph_style_id: Option<Option<String>>,
    pub border_style_id: Option<Option<String>>,
    pub fill_style_id: Option<Option<String>>,
    /// Merged into the existing override bag field by field.
    pub text_style: Option<TextStyleProps>,
    pub paragraph_style: Option<ParagraphStyleProps>,
    pub z_index: Option<Option<i32>>,
}

impl ElementPatch {
    /// Validate the patch against the element it would apply to, without
    /// applying it. Issues are reported per offending field.
    pub fn validate(&self, element: &Element) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if let Some(fs) = self.font_size {
            if !(FONT_SIZE_MIN..=FONT_SIZE_MAX).contains(&fs) {
                issues.push(ValidationIssue::new(
                    "fontSize",
                    format!(
                        "font size must be between {} and {}",
                        FONT_SIZE_MIN, FONT_SIZE_MAX
                    ),
                ));
            }
        }
        if matches!((self.x, self.y), (Some(x), _) if x < 0.0)
            || matches!(self.y, Some(y) if y < 0.0)
        {
            issues.push(ValidationIssue::new(
                "position",
                "position must not be negative",
            ));
        }
        let (min_w, min_h) = element.kind.min_size();
        if matches!(self.width, Some(w) if w < min_w) {
            issues.push(ValidationIssue::new(
                "width",
                format!("width must be at least {}", min_w),
            ));
        }
        if matches!(self.height, Some(h) if h < min_h) {
            issues.push(ValidationIssue::new(
                "height",
                format!("height must be at least {}", min_h),
            ));
        }
        if matches!(self.border_width, Some(bw) if bw < 0.0) {
            issues.push(ValidationIssue::new(
                "borderWidth",
                "border width must not be negative",
            ));
        }
        issues
    }

    /// Apply this patch to an element. Fields not present are untouched.
    pub fn apply(&self, element: &mut Element) {
        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if let Some(fs) = self.font_size {
            element.font_size = fs;
        }
        if let (Some(w), Some((_, h))) = (self.width, element.kind.size()) {
            element.kind.set_size(w, h);
        }
        if let (Some(h), Some((w, _))) = (self.height, element.kind.size()) {
            element.kind.set_size(w, h);
        }
        if let (Some(new_text), ElementKind::Text { text, .. }) = (&self.text, &mut element.kind) {
            *text = new_text.clone();
        }
        if let (Some(new_path), ElementKind::Variable { path }) =
            (&self.variable, &mut element.kind)
        {
            *path = new_path.clone();
        }
        if let ElementKind::Rectangle {
            fill_color,
            border_color,
            border_width,
            border_radius,
            border_style,
            ..
        } = &mut element.kind
        {
            if let Some(c) = self.fill_color {
                *fill_color = Some(c);
            }
            if let Some(c) = self.border_color {
                *border_color = Some(c);
            }
            if let Some(w) = self.border_width {
                *border_width = Some(w);
            }
            if let Some(r) = self.border_radius {
                *border_radius = Some(r);
            }
            if let Some(s) = self.border_style {
                *border_style = Some(s);
            }
        }
        if let Some(link) = &self.text_style_id {
            element.text_style_id = link.clone();
        }
        if let Some(link) = &self.paragraph_style_id {
            element.paragraph_style_id = link.clone();
        }
        if let Some(link) = &self.border_style_id {
            element.border_style_id = link.clone();
        }
        if let Some(link) = &self.fill_style_id {
            element.fill_style_id = link.clone();
        }
        if let Some(patch) = &self.text_style {
            element
                .text_style
                .get_or_insert_with(TextStyleProps::default)
                .merge_from(patch);
        }
        if let Some(patch) = &self.paragraph_style {
            element
                .paragraph_style
                .get_or_insert_with(ParagraphStyleProps::default)
                .merge_from(patch);
        }
        if let Some(z) = self.z_index {
            element.z_index = z;
        }
    }
}
