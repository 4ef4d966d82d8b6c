//! # Maquette
//!
//! A headless layout-designer engine: the element model, interaction
//! state machines, style system, and renderer behind a drag-and-drop
//! canvas, with no UI framework attached.
//!
//! Most canvas editors fuse their geometry logic into the view layer and
//! then can't test it. Maquette inverts that: every interaction is a pure
//! state machine fed by pointer coordinates, and the host's only jobs are
//! forwarding events and drawing the display list the renderer hands back.
//!
//! ## Architecture
//!
//! ```text
//! Pointer events / JSON
//!       ↓
//!   [canvas]   : Designer controller, drag/resize/edit state machines
//!       ↓
//!   [model]    : Elements, patches, the persisted document
//!       ↓
//!   [style]    : Registry, property bags, resolution cascade
//!       ↓
//!   [render]   : Display list, token spans, SVG backend
//! ```
//!
//! The [`text`] tokenizer and [`vars`] resolver feed the renderer: text
//! content may embed `{{dotted.path}}` tokens which resolve against a
//! normalized variable map at draw time, never destructively.

pub mod canvas;
pub mod error;
pub mod model;
pub mod render;
pub mod style;
pub mod text;
pub mod vars;

pub use canvas::Designer;
pub use error::MaquetteError;
pub use model::{CanvasBounds, Element, ElementId, ElementType, LayoutDocument};
pub use render::{RenderMode, RenderedElement};
pub use style::StyleRegistry;

use serde_json::Value;

/// Render a document against a variable context to SVG.
///
/// This is the primary batch entry point. Takes a saved layout, resolves
/// variables, and returns a standalone SVG string. Interactive hosts use
/// [`Designer`] instead.
pub fn render_document(
    document: &LayoutDocument,
    registry: &StyleRegistry,
    data: &Value,
    mode: RenderMode,
) -> String {
    let variables = vars::resolve(data);
    let rendered = render::render_document(&document.elements, registry, &variables, mode, None);
    render::svg::write_svg(&rendered, CanvasBounds::default())
}

/// Render a layout described as JSON to SVG.
pub fn render_json(json: &str, data: &Value, mode: RenderMode) -> Result<String, MaquetteError> {
    let mut document: LayoutDocument = serde_json::from_str(json)?;
    document.normalize();
    Ok(render_document(&document, &StyleRegistry::new(), data, mode))
}
