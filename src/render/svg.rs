//! # SVG Backend
//!
//! Serializes a rendered display list into a standalone SVG document.
//! This is the reference drawing surface: hosts with their own canvas
//! consume [`RenderedElement`](super::RenderedElement) directly, the CLI
//! and tests go through here.
//!
//! The writer is a plain string builder. Geometry arrives already
//! resolved, so emission is a straight walk over the display list in
//! paint order with no layout decisions of its own.

use super::{RenderSpan, RenderedElement, Visual};
use crate::model::{CanvasBounds, Frame};
use crate::render::handle_positions;
use std::fmt::Write;

/// Token spans and unresolved variable chips are tinted with this color.
const TOKEN_COLOR: &str = "#7c3aed";
/// Selection outline and handle color.
const SELECTION_COLOR: &str = "#2563eb";
/// Corner handle square size, centered on the handle position.
const HANDLE_SIZE: f64 = 8.0;

/// Serialize a display list into a complete SVG document.
pub fn write_svg(elements: &[RenderedElement], bounds: CanvasBounds) -> String {
    let mut out = String::with_capacity(1024 + elements.len() * 256);
    let _ = write!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" \
         viewBox=\"0 0 {} {}\">\n",
        bounds.width, bounds.height, bounds.width, bounds.height
    );
    let _ = write!(
        out,
        "  <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#ffffff\"/>\n",
        bounds.width, bounds.height
    );

    for element in elements {
        write_element(&mut out, element);
    }
    // Selection chrome draws above everything.
    for element in elements.iter().filter(|e| e.selected) {
        write_selection(&mut out, &element.frame);
    }

    out.push_str("</svg>\n");
    out
}

fn write_element(out: &mut String, element: &RenderedElement) {
    let frame = &element.frame;
    match &element.visual {
        Visual::Rectangle { fill, border } => {
            let _ = write!(
                out,
                "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
                frame.x, frame.y, frame.width, frame.height
            );
            if border.radius > 0.0 {
                let _ = write!(out, " rx=\"{}\"", border.radius);
            }
            if fill.is_visible() {
                let _ = write!(out, " fill=\"{}\"", fill.color.to_hex());
                if fill.opacity < 1.0 {
                    let _ = write!(out, " fill-opacity=\"{}\"", fill.opacity);
                }
            } else {
                out.push_str(" fill=\"none\"");
            }
            if border.is_visible() {
                let _ = write!(
                    out,
                    " stroke=\"{}\" stroke-width=\"{}\"",
                    border.color.to_hex(),
                    border.width
                );
                if let Some(dash) = border.pattern.dash_array(border.width) {
                    let _ = write!(out, " stroke-dasharray=\"{}\"", dash);
                }
            }
            out.push_str("/>\n");
        }
        Visual::Text {
            spans,
            text_style,
            paragraph_style,
        } => {
            // Single baseline per element; wrapping is the host's concern.
            let baseline = frame.y + text_style.font_size;
            let anchor = match paragraph_style.text_align {
                crate::style::TextAlign::Center => ("middle", frame.x + frame.width / 2.0),
                crate::style::TextAlign::Right => ("end", frame.x + frame.width),
                _ => ("start", frame.x + paragraph_style.indent),
            };
            let _ = write!(
                out,
                "  <text x=\"{}\" y=\"{}\" text-anchor=\"{}\" font-family=\"{}\" \
                 font-size=\"{}\" font-weight=\"{}\" fill=\"{}\"",
                anchor.1,
                baseline,
                anchor.0,
                escape(&text_style.font_family),
                text_style.font_size,
                text_style.font_weight,
                text_style.color.to_hex()
            );
            if text_style.letter_spacing != 0.0 {
                let _ = write!(out, " letter-spacing=\"{}\"", text_style.letter_spacing);
            }
            if text_style.font_style == crate::style::FontStyle::Italic {
                out.push_str(" font-style=\"italic\"");
            }
            match text_style.text_decoration {
                crate::style::TextDecoration::Underline => {
                    out.push_str(" text-decoration=\"underline\"")
                }
                crate::style::TextDecoration::LineThrough => {
                    out.push_str(" text-decoration=\"line-through\"")
                }
                crate::style::TextDecoration::None => {}
            }
            out.push('>');
            for span in spans {
                write_span(out, span);
            }
            out.push_str("</text>\n");
        }
        Visual::Variable {
            label,
            resolved,
            text_style,
        } => {
            let color = if *resolved {
                text_style.color.to_hex()
            } else {
                TOKEN_COLOR.to_string()
            };
            let _ = write!(
                out,
                "  <text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" \
                 fill=\"{}\">{}</text>\n",
                frame.x,
                frame.y + text_style.font_size,
                escape(&text_style.font_family),
                text_style.font_size,
                color,
                escape(label)
            );
        }
    }
}

fn write_span(out: &mut String, span: &RenderSpan) {
    if span.is_token {
        let _ = write!(
            out,
            "<tspan fill=\"{}\">{}</tspan>",
            TOKEN_COLOR,
            escape(&span.text)
        );
    } else {
        out.push_str(&escape(&span.text));
    }
}

fn write_selection(out: &mut String, frame: &Frame) {
    let _ = write!(
        out,
        "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" \
         stroke=\"{}\" stroke-width=\"1\" stroke-dasharray=\"4 2\"/>\n",
        frame.x, frame.y, frame.width, frame.height, SELECTION_COLOR
    );
    for (_, (hx, hy)) in handle_positions(frame) {
        let _ = write!(
            out,
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#ffffff\" \
             stroke=\"{}\" stroke-width=\"1\"/>\n",
            hx - HANDLE_SIZE / 2.0,
            hy - HANDLE_SIZE / 2.0,
            HANDLE_SIZE,
            HANDLE_SIZE,
            SELECTION_COLOR
        );
    }
}

/// Minimal XML text escaping.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, ElementType};
    use crate::render::{render_document, RenderMode};
    use crate::style::StyleRegistry;
    use crate::vars::VariableMap;

    fn svg_for(elements: &[Element], selected: Option<&crate::model::ElementId>) -> String {
        let registry = StyleRegistry::new();
        let variables = VariableMap::new();
        let rendered =
            render_document(elements, &registry, &variables, RenderMode::Tokens, selected);
        write_svg(&rendered, CanvasBounds::default())
    }

    #[test]
    fn test_rectangle_emits_fill_and_stroke() {
        let el = Element::new(ElementType::Rectangle.seed_kind(), 5.0, 6.0);
        let svg = svg_for(&[el], None);
        assert!(svg.contains("x=\"5\" y=\"6\" width=\"120\" height=\"80\""));
        assert!(svg.contains("fill=\"#e5e7eb\""));
        assert!(svg.contains("stroke=\"#111827\""));
    }

    #[test]
    fn test_text_is_escaped() {
        let el = Element::new(
            crate::model::ElementKind::Text {
                text: "a < b & c".to_string(),
                width: 200.0,
                height: 40.0,
            },
            0.0,
            0.0,
        );
        let svg = svg_for(&[el], None);
        assert!(svg.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_token_span_is_tinted() {
        let el = Element::new(
            crate::model::ElementKind::Text {
                text: "Hi {{user.name}}".to_string(),
                width: 200.0,
                height: 40.0,
            },
            0.0,
            0.0,
        );
        let svg = svg_for(&[el], None);
        assert!(svg.contains(&format!("<tspan fill=\"{}\">", TOKEN_COLOR)));
        assert!(svg.contains("{{user.name}}"));
    }

    #[test]
    fn test_selection_draws_outline_and_four_handles() {
        let el = Element::new(ElementType::Rectangle.seed_kind(), 0.0, 0.0);
        let id = el.id.clone();
        let svg = svg_for(&[el], Some(&id));
        assert!(svg.contains("stroke-dasharray=\"4 2\""));
        assert_eq!(svg.matches("fill=\"#ffffff\" ").count(), 4);
    }

    #[test]
    fn test_document_is_well_formed_shell() {
        let svg = svg_for(&[], None);
        assert!(svg.starts_with("<svg xmlns="));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
