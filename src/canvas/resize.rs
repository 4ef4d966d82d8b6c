//! # Resize Controller
//!
//! Corner-handle drags → width/height/x/y updates: Idle → Resizing → Idle.
//!
//! The key discipline is the start snapshot: every delta is computed from
//! the geometry captured at `start`, never from the continuously-mutated
//! element, so rounding can't compound and nothing runs away. The corner
//! being dragged tracks the pointer; the diagonally opposite corner stays
//! anchored.
//!
//! Damping and the move throttle are tuning knobs only. They exist so a
//! resize doesn't feel twitchy at pointer-move frequency; no observable
//! invariant depends on them, and tests run with [`ResizeTuning::exact`].

use crate::model::{Element, ElementId, Frame};
use log::{debug, trace, warn};
use std::time::{Duration, Instant};

/// A corner handle of a resizable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// Sensitivity and rate-limit knobs for resize moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeTuning {
    /// Pointer deltas are multiplied by this before applying. The host
    /// default of 0.5 halves the effective pointer speed.
    pub damping: f64,
    /// Minimum interval between applied moves. `None` disables throttling.
    pub min_interval: Option<Duration>,
}

impl Default for ResizeTuning {
    fn default() -> Self {
        Self {
            damping: 0.5,
            min_interval: Some(Duration::from_millis(32)),
        }
    }
}

impl ResizeTuning {
    /// 1:1 pointer tracking with no throttle. What tests use, and what a
    /// host wanting deterministic behavior should pass.
    pub fn exact() -> Self {
        Self {
            damping: 1.0,
            min_interval: None,
        }
    }
}

/// New geometry for one element, rounded to integer pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryUpdate {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug)]
struct ResizeSession {
    element_id: ElementId,
    corner: Corner,
    start_pointer_x: f64,
    start_pointer_y: f64,
    /// Immutable geometry snapshot taken at `start`.
    initial: Frame,
    min_width: f64,
    min_height: f64,
    last_applied: Option<Instant>,
}

/// Idle → Resizing → Idle.
#[derive(Debug)]
pub struct ResizeController {
    tuning: ResizeTuning,
    session: Option<ResizeSession>,
}

impl Default for ResizeController {
    fn default() -> Self {
        Self::new(ResizeTuning::default())
    }
}

impl ResizeController {
    pub fn new(tuning: ResizeTuning) -> Self {
        Self {
            tuning,
            session: None,
        }
    }

    pub fn tuning(&self) -> ResizeTuning {
        self.tuning
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn active_element(&self) -> Option<&ElementId> {
        self.session.as_ref().map(|s| &s.element_id)
    }

    /// Idle → Resizing. Snapshots the element's current geometry. No-op if
    /// a session is already active or the element kind doesn't resize.
    pub fn start(&mut self, pointer_x: f64, pointer_y: f64, element: &Element, corner: Corner) {
        if self.session.is_some() {
            debug!("resize start ignored: a session is already active");
            return;
        }
        if !element.kind.is_resizable() {
            warn!(
                "resize start ignored: {} elements auto-size",
                element.kind.type_name()
            );
            return;
        }
        let (min_width, min_height) = element.kind.min_size();
        debug!("resize start on {} from {:?}", element.id, corner);
        self.session = Some(ResizeSession {
            element_id: element.id.clone(),
            corner,
            start_pointer_x: pointer_x,
            start_pointer_y: pointer_y,
            initial: element.frame(),
            min_width,
            min_height,
            last_applied: None,
        });
    }

    /// Compute the next geometry from the start snapshot. Returns `None`
    /// when idle or when the throttle swallows this move.
    pub fn update(&mut self, pointer_x: f64, pointer_y: f64) -> Option<GeometryUpdate> {
        let session = self.session.as_mut()?;

        if let Some(interval) = self.tuning.min_interval {
            let now = Instant::now();
            if let Some(last) = session.last_applied {
                if now.duration_since(last) < interval {
                    return None;
                }
            }
            session.last_applied = Some(now);
        }

        let dx = (pointer_x - session.start_pointer_x) * self.tuning.damping;
        let dy = (pointer_y - session.start_pointer_y) * self.tuning.damping;
        let init = session.initial;

        // Per-corner rule: clamp the two adjusted dimensions to minimums,
        // then shift x/y by however much the opposite edge actually moved,
        // so the anchor corner never drifts.
        let (width, height, x, y) = match session.corner {
            Corner::BottomRight => (
                (init.width + dx).max(session.min_width),
                (init.height + dy).max(session.min_height),
                init.x,
                init.y,
            ),
            Corner::BottomLeft => {
                let width = (init.width - dx).max(session.min_width);
                (
                    width,
                    (init.height + dy).max(session.min_height),
                    init.x + (init.width - width),
                    init.y,
                )
            }
            Corner::TopRight => {
                let height = (init.height - dy).max(session.min_height);
                (
                    (init.width + dx).max(session.min_width),
                    height,
                    init.x,
                    init.y + (init.height - height),
                )
            }
            Corner::TopLeft => {
                let width = (init.width - dx).max(session.min_width);
                let height = (init.height - dy).max(session.min_height);
                (
                    width,
                    height,
                    init.x + (init.width - width),
                    init.y + (init.height - height),
                )
            }
        };

        trace!(
            "resize update {} -> {}x{} at ({}, {})",
            session.element_id,
            width,
            height,
            x,
            y
        );
        Some(GeometryUpdate {
            id: session.element_id.clone(),
            x: x.round(),
            y: y.round(),
            width: width.round(),
            height: height.round(),
        })
    }

    /// Resizing → Idle, discarding the snapshot. Idempotent.
    pub fn end(&mut self) {
        if let Some(session) = self.session.take() {
            debug!("resize end on {}", session.element_id);
        }
    }
}
