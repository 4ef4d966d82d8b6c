//! # Drag Controller
//!
//! Pointer-driven state machine translating raw pointer events into
//! element position updates: Idle → Dragging → Idle.
//!
//! The controller never touches the element list itself. `start` snapshots
//! what it needs (pointer-to-corner offset, footprint), `update` returns
//! the clamped position for the designer to apply to the one authoritative
//! list, and `end` clears the session. Starting while a session is active
//! is a no-op; two simultaneous drags are not a thing.

use crate::model::{CanvasBounds, Element, ElementId};
use log::{debug, trace};

/// The canvas origin in the host's viewport coordinates. Pointer events
/// arrive in viewport space; subtracting this yields canvas-local points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasOrigin {
    pub x: f64,
    pub y: f64,
}

/// A clamped position for one element, produced by each `update` call.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug)]
struct DragSession {
    element_id: ElementId,
    origin: CanvasOrigin,
    /// Pointer offset from the element's top-left, in canvas-local space.
    offset_x: f64,
    offset_y: f64,
    /// Footprint at drag start; a drag never changes size.
    footprint_w: f64,
    footprint_h: f64,
}

/// Idle → Dragging → Idle.
#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The element currently being dragged, if any.
    pub fn active_element(&self) -> Option<&ElementId> {
        self.session.as_ref().map(|s| &s.element_id)
    }

    /// Idle → Dragging. No-op if a session is already active.
    pub fn start(&mut self, pointer_x: f64, pointer_y: f64, element: &Element, origin: CanvasOrigin) {
        if self.session.is_some() {
            debug!("drag start ignored: a session is already active");
            return;
        }
        let local_x = pointer_x - origin.x;
        let local_y = pointer_y - origin.y;
        let (footprint_w, footprint_h) = element.footprint();
        debug!("drag start on {} at ({}, {})", element.id, local_x, local_y);
        self.session = Some(DragSession {
            element_id: element.id.clone(),
            origin,
            offset_x: local_x - element.x,
            offset_y: local_y - element.y,
            footprint_w,
            footprint_h,
        });
    }

    /// Compute the next clamped position. Returns `None` when idle. O(1),
    /// safe to call at pointer-move frequency.
    pub fn update(
        &self,
        pointer_x: f64,
        pointer_y: f64,
        bounds: CanvasBounds,
    ) -> Option<PositionUpdate> {
        let session = self.session.as_ref()?;
        let max_x = (bounds.width - session.footprint_w).max(0.0);
        let max_y = (bounds.height - session.footprint_h).max(0.0);
        let x = (pointer_x - session.origin.x - session.offset_x).clamp(0.0, max_x);
        let y = (pointer_y - session.origin.y - session.offset_y).clamp(0.0, max_y);
        trace!("drag update {} -> ({}, {})", session.element_id, x, y);
        Some(PositionUpdate {
            id: session.element_id.clone(),
            x,
            y,
        })
    }

    /// Dragging → Idle. Idempotent.
    pub fn end(&mut self) {
        if let Some(session) = self.session.take() {
            debug!("drag end on {}", session.element_id);
        }
    }
}
