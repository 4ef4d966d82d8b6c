//! # Inline Edit Sessions
//!
//! Double-clicking a text element opens an edit session over the *raw*
//! token-bearing text: authors always edit `{{user.name}}`, never the
//! substituted value. A session is a plain buffer + caret; the host feeds
//! it keystrokes and the variable menu, then commits (only if the content
//! changed) or cancels (reverting to the pre-edit value).

use crate::model::ElementId;
use log::debug;

/// A live inline text edit. Consumed by `commit` or `cancel`.
#[derive(Debug, Clone)]
pub struct EditSession {
    element_id: ElementId,
    original: String,
    buffer: String,
    /// Byte offset into `buffer`, always on a char boundary.
    caret: usize,
}

impl EditSession {
    /// Open a session seeded with the element's raw text, caret at the end.
    pub fn begin(element_id: ElementId, raw_text: &str) -> Self {
        debug!("edit begin on {}", element_id);
        Self {
            element_id,
            original: raw_text.to_string(),
            buffer: raw_text.to_string(),
            caret: raw_text.len(),
        }
    }

    pub fn element_id(&self) -> &ElementId {
        &self.element_id
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer != self.original
    }

    /// Move the caret to a byte offset, snapping down to a char boundary.
    pub fn set_caret(&mut self, offset: usize) {
        let mut offset = offset.min(self.buffer.len());
        while offset > 0 && !self.buffer.is_char_boundary(offset) {
            offset -= 1;
        }
        self.caret = offset;
    }

    pub fn caret_left(&mut self) {
        if let Some((idx, _)) = self.buffer[..self.caret].char_indices().next_back() {
            self.caret = idx;
        }
    }

    pub fn caret_right(&mut self) {
        if let Some(c) = self.buffer[self.caret..].chars().next() {
            self.caret += c.len_utf8();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.caret, c);
        self.caret += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.buffer.insert_str(self.caret, s);
        self.caret += s.len();
    }

    /// Delete the char before the caret (backspace).
    pub fn delete_backward(&mut self) {
        if let Some((idx, c)) = self.buffer[..self.caret].char_indices().next_back() {
            self.buffer.remove(idx);
            self.caret -= c.len_utf8();
        }
    }

    /// Splice a `{{path}}` token at the caret and leave the caret just
    /// after it, the variable-menu insertion contract.
    pub fn insert_variable(&mut self, path: &str) {
        let token = format!("{{{{{}}}}}", path);
        self.insert_str(&token);
    }

    /// Close the session, returning the new text only if it changed.
    pub fn commit(self) -> (ElementId, Option<String>) {
        let changed = self.is_dirty();
        debug!(
            "edit commit on {} ({})",
            self.element_id,
            if changed { "changed" } else { "unchanged" }
        );
        (self.element_id, changed.then_some(self.buffer))
    }

    /// Close the session, discarding every change.
    pub fn cancel(self) -> ElementId {
        debug!("edit cancel on {}", self.element_id);
        self.element_id
    }
}
