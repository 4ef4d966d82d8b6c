//! # Designer Controller
//!
//! The orchestrator: one authoritative element list, the current
//! selection, and the pointer wiring that feeds the drag and resize
//! controllers. Hosts construct a [`Designer`] with the upstream
//! variables and an optional initial layout, push pointer/keyboard events
//! at it, and get the save/export contract back.
//!
//! Controllers never mutate the list themselves. They return updates; the
//! designer applies them to the list it just read. That keeps exactly one
//! source of truth between renderer, drag, and resize.

pub mod drag;
pub mod edit;
pub mod resize;

pub use drag::{CanvasOrigin, DragController, PositionUpdate};
pub use edit::EditSession;
pub use resize::{Corner, GeometryUpdate, ResizeController, ResizeTuning};

use crate::error::MaquetteError;
use crate::model::{
    CanvasBounds, Element, ElementId, ElementKind, ElementPatch, ElementType, LayoutDocument,
    ValidationIssue,
};
use crate::render::{self, RenderMode, RenderedElement};
use crate::style::StyleRegistry;
use crate::vars::{self, VariableMap};
use log::{debug, info, warn};
use serde_json::Value;
use thiserror::Error;

/// Distance in pixels within which a pointer press grabs a corner handle.
const HANDLE_HIT_RADIUS: f64 = 6.0;

/// Why an element update was not applied.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("unknown element: {0}")]
    NotFound(ElementId),
    /// The patch failed validation; nothing was applied. Issues are meant
    /// for inline display next to the offending fields.
    #[error("invalid update: {0:?}")]
    Invalid(Vec<ValidationIssue>),
}

/// Callback invoked on every explicit save.
pub type SaveHook = Box<dyn FnMut(&LayoutDocument)>;

/// The layout designer: element list, selection, styles, variables, and
/// the pointer state machines.
pub struct Designer {
    elements: Vec<Element>,
    selected: Option<ElementId>,
    bounds: CanvasBounds,
    origin: CanvasOrigin,
    registry: StyleRegistry,
    variables: VariableMap,
    drag: DragController,
    resize: ResizeController,
    edit: Option<EditSession>,
    on_save: Option<SaveHook>,
    /// Cascade counter for initial element placement.
    placed: usize,
}

impl Designer {
    /// A designer over an empty canvas with default tuning.
    pub fn new(bounds: CanvasBounds, registry: StyleRegistry, available_variables: &Value) -> Self {
        Self {
            elements: Vec::new(),
            selected: None,
            bounds,
            origin: CanvasOrigin::default(),
            registry,
            variables: vars::resolve(available_variables),
            drag: DragController::new(),
            resize: ResizeController::default(),
            edit: None,
            on_save: None,
            placed: 0,
        }
    }

    /// A designer seeded from a previously saved document. The document is
    /// normalized on the way in so older saves stay renderable.
    pub fn with_layout(
        bounds: CanvasBounds,
        registry: StyleRegistry,
        available_variables: &Value,
        mut initial: LayoutDocument,
    ) -> Self {
        initial.normalize();
        let mut designer = Self::new(bounds, registry, available_variables);
        designer.placed = initial.elements.len();
        designer.elements = initial.elements;
        info!("loaded layout with {} elements", designer.elements.len());
        designer
    }

    /// Replace the resize tuning (damping/throttle). Takes effect on the
    /// next session.
    pub fn set_resize_tuning(&mut self, tuning: ResizeTuning) {
        self.resize = ResizeController::new(tuning);
    }

    /// Where the canvas sits in the host viewport; pointer events are
    /// translated through this.
    pub fn set_canvas_origin(&mut self, origin: CanvasOrigin) {
        self.origin = origin;
    }

    pub fn set_on_save(&mut self, hook: SaveHook) {
        self.on_save = Some(hook);
    }

    /// Re-resolve against fresh upstream data.
    pub fn set_variables(&mut self, available_variables: &Value) {
        self.variables = vars::resolve(available_variables);
    }

    pub fn bounds(&self) -> CanvasBounds {
        self.bounds
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    fn element_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| &e.id == id)
    }

    pub fn selected(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut StyleRegistry {
        &mut self.registry
    }

    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// The sorted dot paths offered by the variable-insertion menu.
    pub fn variable_paths(&self) -> Vec<&str> {
        vars::variable_paths(&self.variables)
    }

    // ── Document operations ─────────────────────────────────────────

    /// Add a new element of the given type at the next cascade position,
    /// seeded from the defaults table, and select it.
    pub fn add_element(&mut self, element_type: ElementType) -> ElementId {
        let kind = element_type.seed_kind();
        let (x, y) = self.next_placement(&kind);
        let element = Element::new(kind, x, y);
        let id = element.id.clone();
        debug!("add {} element {} at ({}, {})", element_type.name(), id, x, y);
        self.elements.push(element);
        self.selected = Some(id.clone());
        self.placed += 1;
        id
    }

    /// Staggered placement for new elements, kept inside canvas bounds.
    fn next_placement(&self, kind: &ElementKind) -> (f64, f64) {
        let step = (self.placed % 8) as f64 * 30.0;
        let (w, h) = kind.size().unwrap_or((120.0, 24.0));
        let x = (20.0 + step).min((self.bounds.width - w).max(0.0));
        let y = (20.0 + step).min((self.bounds.height - h).max(0.0));
        (x, y)
    }

    /// Apply a partial update. Validates first; an invalid patch applies
    /// nothing and reports every offending field.
    pub fn update_element(&mut self, id: &ElementId, patch: ElementPatch) -> Result<(), UpdateError> {
        let element = self
            .elements
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| UpdateError::NotFound(id.clone()))?;
        let issues = patch.validate(element);
        if !issues.is_empty() {
            return Err(UpdateError::Invalid(issues));
        }
        patch.apply(element);
        Ok(())
    }

    /// Remove an element; clears the selection if it pointed at the victim.
    pub fn delete_element(&mut self, id: &ElementId) -> bool {
        let Some(pos) = self.elements.iter().position(|e| &e.id == id) else {
            return false;
        };
        self.elements.remove(pos);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        debug!("deleted element {}", id);
        true
    }

    /// Clone an element with a fresh id at a (+20, +20) offset and select
    /// the clone.
    pub fn duplicate_element(&mut self, id: &ElementId) -> Option<ElementId> {
        let copy = self.element(id)?.duplicate();
        let new_id = copy.id.clone();
        self.elements.push(copy);
        self.selected = Some(new_id.clone());
        Some(new_id)
    }

    /// Empty the canvas and the selection.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.selected = None;
        self.edit = None;
        self.drag.end();
        self.resize.end();
        self.placed = 0;
    }

    pub fn select(&mut self, id: &ElementId) -> bool {
        if self.element(id).is_some() {
            self.selected = Some(id.clone());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ── Persistence contract ────────────────────────────────────────

    /// Snapshot the element list as the persisted document shape.
    pub fn serialize(&self) -> LayoutDocument {
        LayoutDocument::from_elements(self.elements.clone(), self.registry.has_custom_styles())
    }

    /// Explicit save action: serialize and hand the document to the host's
    /// save hook (once per call).
    pub fn save(&mut self) -> LayoutDocument {
        let document = self.serialize();
        if let Some(hook) = self.on_save.as_mut() {
            hook(&document);
        }
        info!("saved layout with {} elements", document.elements.len());
        document
    }

    /// Replace the canvas contents from a document, normalizing first.
    pub fn load(&mut self, mut document: LayoutDocument) {
        document.normalize();
        self.clear();
        self.placed = document.elements.len();
        self.elements = document.elements;
    }

    /// Parse-then-apply JSON load: a malformed payload mutates nothing.
    pub fn load_json(&mut self, json: &str) -> Result<(), MaquetteError> {
        let document: LayoutDocument = serde_json::from_str(json)?;
        self.load(document);
        Ok(())
    }

    // ── Pointer wiring ──────────────────────────────────────────────

    /// Pointer press in viewport coordinates. Grabs a corner handle of the
    /// selected element if one is under the pointer, otherwise selects and
    /// starts dragging the topmost element there, otherwise clears the
    /// selection.
    pub fn pointer_down(&mut self, pointer_x: f64, pointer_y: f64) {
        let local_x = pointer_x - self.origin.x;
        let local_y = pointer_y - self.origin.y;

        if let Some(corner) = self.handle_under(local_x, local_y) {
            let id = self.selected.clone();
            if let Some(element) = id.as_ref().and_then(|id| self.element(id)) {
                let element = element.clone();
                self.resize.start(pointer_x, pointer_y, &element, corner);
                return;
            }
        }

        match self.topmost_at(local_x, local_y) {
            Some(id) => {
                self.selected = Some(id.clone());
                if let Some(element) = self.element(&id) {
                    let element = element.clone();
                    self.drag.start(pointer_x, pointer_y, &element, self.origin);
                }
            }
            None => self.selected = None,
        }
    }

    /// Pointer move: routes to whichever session is active and applies the
    /// resulting update to the authoritative list.
    pub fn pointer_move(&mut self, pointer_x: f64, pointer_y: f64) {
        if self.resize.is_active() {
            if let Some(update) = self.resize.update(pointer_x, pointer_y) {
                self.apply_geometry(update);
            }
            return;
        }
        if let Some(update) = self.drag.update(pointer_x, pointer_y, self.bounds) {
            self.apply_position(update);
        }
    }

    /// Pointer release: the last computed position/size stands (there is
    /// no drag/resize cancel), both machines return to idle.
    pub fn pointer_up(&mut self) {
        self.drag.end();
        self.resize.end();
    }

    fn apply_position(&mut self, update: PositionUpdate) {
        match self.element_mut(&update.id) {
            Some(element) => element.set_position(update.x, update.y),
            None => warn!("drag update for vanished element {}", update.id),
        }
    }

    fn apply_geometry(&mut self, update: GeometryUpdate) {
        match self.element_mut(&update.id) {
            Some(element) => {
                element.set_position(update.x, update.y);
                element.set_size(update.width, update.height);
            }
            None => warn!("resize update for vanished element {}", update.id),
        }
    }

    /// The corner handle of the selected element under a canvas-local
    /// point, if any.
    fn handle_under(&self, local_x: f64, local_y: f64) -> Option<Corner> {
        let element = self.selected.as_ref().and_then(|id| self.element(id))?;
        if !element.kind.is_resizable() {
            return None;
        }
        for (corner, (hx, hy)) in render::handle_positions(&element.frame()) {
            if (local_x - hx).abs() <= HANDLE_HIT_RADIUS && (local_y - hy).abs() <= HANDLE_HIT_RADIUS
            {
                return Some(corner);
            }
        }
        None
    }

    /// The topmost element whose frame contains the point, in paint order.
    fn topmost_at(&self, local_x: f64, local_y: f64) -> Option<ElementId> {
        render::paint_order(&self.elements)
            .into_iter()
            .rev()
            .map(|idx| &self.elements[idx])
            .find(|e| e.frame().contains(local_x, local_y))
            .map(|e| e.id.clone())
    }

    // ── Inline editing ──────────────────────────────────────────────

    /// Double-click contract: open an edit session over the element's raw
    /// text. Only text elements are editable inline.
    pub fn begin_edit(&mut self, id: &ElementId) -> bool {
        if self.edit.is_some() {
            debug!("edit begin ignored: a session is already open");
            return false;
        }
        match self.element(id) {
            Some(Element {
                kind: ElementKind::Text { text, .. },
                ..
            }) => {
                self.edit = Some(EditSession::begin(id.clone(), text));
                true
            }
            Some(element) => {
                debug!("{} elements have no inline editor", element.kind.type_name());
                false
            }
            None => false,
        }
    }

    /// The open session, for the host to feed keystrokes and caret moves.
    pub fn edit_session_mut(&mut self) -> Option<&mut EditSession> {
        self.edit.as_mut()
    }

    /// Commit the open session; the element keeps its raw token text. Also
    /// what focus loss calls. Returns true if the element changed.
    pub fn commit_edit(&mut self) -> bool {
        let Some(session) = self.edit.take() else {
            return false;
        };
        let (id, new_text) = session.commit();
        match new_text {
            Some(text) => self
                .update_element(
                    &id,
                    ElementPatch {
                        text: Some(text),
                        ..Default::default()
                    },
                )
                .is_ok(),
            None => false,
        }
    }

    /// Discard the open session, reverting to the pre-edit text.
    pub fn cancel_edit(&mut self) {
        if let Some(session) = self.edit.take() {
            session.cancel();
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Render every element against the current styles and variables.
    pub fn render(&self, mode: RenderMode) -> Vec<RenderedElement> {
        render::render_document(
            &self.elements,
            &self.registry,
            &self.variables,
            mode,
            self.selected.as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn designer() -> Designer {
        let mut d = Designer::new(
            CanvasBounds {
                width: 800.0,
                height: 600.0,
            },
            StyleRegistry::new(),
            &json!({"user": {"name": "Ann"}}),
        );
        d.set_resize_tuning(ResizeTuning::exact());
        d
    }

    #[test]
    fn test_add_element_selects_it() {
        let mut d = designer();
        let id = d.add_element(ElementType::Text);
        assert_eq!(d.selected(), Some(&id));
        assert_eq!(d.elements().len(), 1);
        let el = d.element(&id).unwrap();
        assert!(el.x >= 0.0 && el.x + el.footprint().0 <= 800.0);
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut d = designer();
        let id = d.add_element(ElementType::Rectangle);
        assert!(d.delete_element(&id));
        assert_eq!(d.selected(), None);
        assert!(!d.delete_element(&id));
    }

    #[test]
    fn test_delete_keeps_unrelated_selection() {
        let mut d = designer();
        let first = d.add_element(ElementType::Text);
        let second = d.add_element(ElementType::Text);
        d.select(&first);
        assert!(d.delete_element(&second));
        assert_eq!(d.selected(), Some(&first));
    }

    #[test]
    fn test_duplicate_offsets_and_selects() {
        let mut d = designer();
        let id = d.add_element(ElementType::Rectangle);
        let (x, y) = {
            let el = d.element(&id).unwrap();
            (el.x, el.y)
        };
        let copy_id = d.duplicate_element(&id).unwrap();
        let copy = d.element(&copy_id).unwrap();
        assert_eq!((copy.x, copy.y), (x + 20.0, y + 20.0));
        assert_eq!(d.selected(), Some(&copy_id));
    }

    #[test]
    fn test_update_rejects_invalid_without_applying() {
        let mut d = designer();
        let id = d.add_element(ElementType::Text);
        let before = d.element(&id).unwrap().font_size;
        let result = d.update_element(
            &id,
            ElementPatch {
                font_size: Some(500.0),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(UpdateError::Invalid(_))));
        assert_eq!(d.element(&id).unwrap().font_size, before);
    }

    #[test]
    fn test_pointer_drag_moves_element() {
        let mut d = designer();
        let id = d.add_element(ElementType::Rectangle);
        let el = d.element(&id).unwrap();
        // Grab near the middle, clear of the corner handles.
        let (cx, cy) = (el.x + 60.0, el.y + 40.0);
        d.pointer_down(cx, cy);
        d.pointer_move(cx + 100.0, cy + 50.0);
        d.pointer_up();
        let el = d.element(&id).unwrap();
        assert_eq!((el.x, el.y), (20.0 + 100.0, 20.0 + 50.0));
    }

    #[test]
    fn test_pointer_down_on_empty_clears_selection() {
        let mut d = designer();
        d.add_element(ElementType::Rectangle);
        d.pointer_down(790.0, 590.0);
        assert_eq!(d.selected(), None);
    }

    #[test]
    fn test_pointer_down_on_handle_starts_resize() {
        let mut d = designer();
        let id = d.add_element(ElementType::Rectangle);
        let frame = d.element(&id).unwrap().frame();
        // Press exactly on the bottom-right handle, then drag outward.
        d.pointer_down(frame.x + frame.width, frame.y + frame.height);
        d.pointer_move(frame.x + frame.width + 30.0, frame.y + frame.height + 10.0);
        d.pointer_up();
        let el = d.element(&id).unwrap();
        let (w, h) = el.kind.size().unwrap();
        assert_eq!((w, h), (150.0, 90.0));
        assert_eq!((el.x, el.y), (frame.x, frame.y), "anchored top-left");
    }

    #[test]
    fn test_topmost_element_wins_hit_test() {
        let mut d = designer();
        let below = d.add_element(ElementType::Rectangle);
        let above = d.add_element(ElementType::Rectangle);
        // Stack them exactly.
        d.update_element(
            &above,
            ElementPatch {
                x: Some(20.0),
                y: Some(20.0),
                ..Default::default()
            },
        )
        .unwrap();
        d.clear_selection();
        d.pointer_down(30.0, 30.0);
        assert_eq!(d.selected(), Some(&above));
        assert_ne!(d.selected(), Some(&below));
    }

    #[test]
    fn test_edit_commit_applies_raw_text() {
        let mut d = designer();
        let id = d.add_element(ElementType::Text);
        assert!(d.begin_edit(&id));
        let session = d.edit_session_mut().unwrap();
        session.set_caret(0);
        session.insert_str("Hi ");
        session.insert_variable("user.name");
        assert!(d.commit_edit());
        match &d.element(&id).unwrap().kind {
            ElementKind::Text { text, .. } => {
                assert_eq!(text, "Hi {{user.name}}New text");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_edit_cancel_reverts() {
        let mut d = designer();
        let id = d.add_element(ElementType::Text);
        d.begin_edit(&id);
        d.edit_session_mut().unwrap().insert_str("garbage");
        d.cancel_edit();
        match &d.element(&id).unwrap().kind {
            ElementKind::Text { text, .. } => assert_eq!(text, "New text"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_edit_rejected_for_non_text() {
        let mut d = designer();
        let id = d.add_element(ElementType::Rectangle);
        assert!(!d.begin_edit(&id));
    }

    #[test]
    fn test_save_invokes_hook_once() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut d = designer();
        d.add_element(ElementType::Text);
        let calls = Rc::new(RefCell::new(0));
        let observed = Rc::clone(&calls);
        d.set_on_save(Box::new(move |doc| {
            *observed.borrow_mut() += 1;
            assert_eq!(doc.elements.len(), 1);
        }));
        d.save();
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut d = designer();
        d.add_element(ElementType::Text);
        d.add_element(ElementType::Rectangle);
        d.clear();
        assert!(d.elements().is_empty());
        assert_eq!(d.selected(), None);
    }

    #[test]
    fn test_load_json_bad_payload_mutates_nothing() {
        let mut d = designer();
        d.add_element(ElementType::Text);
        assert!(d.load_json("{broken").is_err());
        assert_eq!(d.elements().len(), 1);
    }
}
