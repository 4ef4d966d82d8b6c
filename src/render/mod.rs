//! # Canvas Renderer
//!
//! Maps elements to a display list the host draws: resolved styles,
//! token-highlight or value-substituted text spans, and derived selection
//! affordances. The renderer reads the element list, the style registry,
//! and the variable map; it owns no state of its own.
//!
//! Style resolution layers, lowest first: the kind's hard defaults, then
//! the registry record linked by id (a lookup miss falls back to the
//! defaults with a warning instead of failing), then the element's inline
//! override bag. Inline wins on conflicting keys.

pub mod svg;

use crate::canvas::Corner;
use crate::model::{Element, ElementId, ElementKind, Frame};
use crate::style::{
    BorderStyleProps, FillStyleProps, ParagraphStyleProps, ResolvedBorderStyle, ResolvedFillStyle,
    ResolvedParagraphStyle, ResolvedTextStyle, StyleProps, StyleRegistry, TextStyleProps,
};
use crate::text::{self, Segment};
use crate::vars::VariableMap;
use log::warn;
use serde::Serialize;

/// Whether text tokens render literally (highlighted) or substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderMode {
    /// Keep `{{path}}` literal; spans are tagged for highlighting.
    Tokens,
    /// Replace tokens with resolved display values.
    Values,
}

/// One run of same-styled text inside a rendered element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSpan {
    pub text: String,
    /// True only for literal `{{path}}` spans in token mode; the host
    /// tints these.
    pub is_token: bool,
}

/// The kind-specific visual payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Visual {
    Text {
        spans: Vec<RenderSpan>,
        text_style: ResolvedTextStyle,
        paragraph_style: ResolvedParagraphStyle,
    },
    Rectangle {
        fill: ResolvedFillStyle,
        border: ResolvedBorderStyle,
    },
    Variable {
        /// What to draw: the resolved value, or the placeholder label.
        label: String,
        /// False when the path was empty or unresolved.
        resolved: bool,
        text_style: ResolvedTextStyle,
    },
}

/// One element ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedElement {
    pub id: ElementId,
    pub frame: Frame,
    pub selected: bool,
    pub visual: Visual,
}

impl RenderedElement {
    /// The plain text this element displays, spans rejoined in order.
    pub fn text_content(&self) -> String {
        match &self.visual {
            Visual::Text { spans, .. } => {
                spans.iter().map(|s| s.text.as_str()).collect::<String>()
            }
            Visual::Variable { label, .. } => label.clone(),
            Visual::Rectangle { .. } => String::new(),
        }
    }
}

/// Indices of `elements` in paint order: stable sort on the cosmetic
/// z-index override, insertion order as tie-break, so "later = higher"
/// holds for untouched documents.
pub fn paint_order(elements: &[Element]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..elements.len()).collect();
    order.sort_by_key(|&idx| elements[idx].z_index.unwrap_or(0));
    order
}

/// Corner-handle centers for a frame, derived view state only.
pub fn handle_positions(frame: &Frame) -> [(Corner, (f64, f64)); 4] {
    [
        (Corner::TopLeft, (frame.x, frame.y)),
        (Corner::TopRight, (frame.x + frame.width, frame.y)),
        (Corner::BottomLeft, (frame.x, frame.y + frame.height)),
        (
            Corner::BottomRight,
            (frame.x + frame.width, frame.y + frame.height),
        ),
    ]
}

/// Render the whole element list in paint order.
pub fn render_document(
    elements: &[Element],
    registry: &StyleRegistry,
    variables: &VariableMap,
    mode: RenderMode,
    selected: Option<&ElementId>,
) -> Vec<RenderedElement> {
    paint_order(elements)
        .into_iter()
        .map(|idx| render_element(&elements[idx], registry, variables, mode, selected))
        .collect()
}

/// Render a single element.
pub fn render_element(
    element: &Element,
    registry: &StyleRegistry,
    variables: &VariableMap,
    mode: RenderMode,
    selected: Option<&ElementId>,
) -> RenderedElement {
    let visual = match &element.kind {
        ElementKind::Text { text, .. } => Visual::Text {
            spans: text_spans(text, variables, mode),
            text_style: effective_text_style(element, registry),
            paragraph_style: effective_paragraph_style(element, registry),
        },
        ElementKind::Rectangle {
            fill_color,
            border_color,
            border_width,
            border_radius,
            border_style,
            ..
        } => {
            let mut fill = ResolvedFillStyle::base();
            if let Some(record) = linked_record::<FillStyleProps>(
                element.fill_style_id.as_deref(),
                registry,
                &element.id,
            ) {
                fill.apply(record);
            }
            // The rectangle's direct fields are its inline override.
            fill.apply(&FillStyleProps {
                color: *fill_color,
                opacity: None,
            });

            let mut border = ResolvedBorderStyle::base();
            if let Some(record) = linked_record::<BorderStyleProps>(
                element.border_style_id.as_deref(),
                registry,
                &element.id,
            ) {
                border.apply(record);
            }
            border.apply(&BorderStyleProps {
                width: *border_width,
                color: *border_color,
                radius: *border_radius,
                pattern: *border_style,
            });

            Visual::Rectangle { fill, border }
        }
        ElementKind::Variable { path } => {
            let entry = if path.is_empty() {
                None
            } else {
                variables.get(path)
            };
            let (label, resolved) = match (mode, entry) {
                (RenderMode::Values, Some(entry)) => (entry.display_value.clone(), true),
                _ if path.is_empty() => ("{{variable}}".to_string(), false),
                (_, Some(_)) => (format!("{{{{{}}}}}", path), true),
                (_, None) => (format!("{{{{{}}}}}", path), false),
            };
            Visual::Variable {
                label,
                resolved,
                text_style: effective_text_style(element, registry),
            }
        }
    };

    RenderedElement {
        id: element.id.clone(),
        frame: element.frame(),
        selected: selected == Some(&element.id),
        visual,
    }
}

/// Split text into render spans. In value mode every token collapses into
/// substituted literal text; in token mode tokens stay literal and tagged.
fn text_spans(raw: &str, variables: &VariableMap, mode: RenderMode) -> Vec<RenderSpan> {
    match mode {
        RenderMode::Values => vec![RenderSpan {
            text: text::substitute(raw, variables),
            is_token: false,
        }],
        RenderMode::Tokens => text::split_tokens(raw)
            .into_iter()
            .map(|segment| match segment {
                Segment::Literal { text } => RenderSpan {
                    text,
                    is_token: false,
                },
                Segment::Token { path } => RenderSpan {
                    text: format!("{{{{{}}}}}", path),
                    is_token: true,
                },
            })
            .collect(),
    }
}

/// Look up a linked style record, warning (not failing) on a miss so a
/// deleted style degrades to the base default.
fn linked_record<'a, P: StyleProps>(
    link: Option<&str>,
    registry: &'a StyleRegistry,
    element: &ElementId,
) -> Option<&'a P> {
    let id = link?;
    match registry.get_style::<P>(id) {
        Some(record) => Some(&record.props),
        None => {
            warn!(
                "element {} links unknown {} style '{}'; using base default",
                element,
                P::KIND.name(),
                id
            );
            None
        }
    }
}

fn effective_text_style(element: &Element, registry: &StyleRegistry) -> ResolvedTextStyle {
    let mut resolved = ResolvedTextStyle::base(element.font_size);
    if let Some(record) = linked_record::<TextStyleProps>(
        element.text_style_id.as_deref(),
        registry,
        &element.id,
    ) {
        resolved.apply(record);
    }
    if let Some(inline) = &element.text_style {
        resolved.apply(inline);
    }
    resolved
}

fn effective_paragraph_style(
    element: &Element,
    registry: &StyleRegistry,
) -> ResolvedParagraphStyle {
    let mut resolved = ResolvedParagraphStyle::base();
    if let Some(record) = linked_record::<ParagraphStyleProps>(
        element.paragraph_style_id.as_deref(),
        registry,
        &element.id,
    ) {
        resolved.apply(record);
    }
    if let Some(inline) = &element.paragraph_style {
        resolved.apply(inline);
    }
    resolved
}
