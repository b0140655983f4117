//! The in-memory host document.
//!
//! All text mutation funnels through [`TextDocument::splice`], which remaps
//! anchors, fields, annotations and the view cursor in one place. Positions
//! are byte offsets into the buffer; paragraphs are separated by `'\n'` and
//! the document always has at least one (possibly empty) paragraph.

use crate::anchor::{Anchor, AnchorId, CommandSpec, ScannedAnchor};
use crate::field::{FieldId, FieldKind, TextField};
use crate::fragment::Fragment;
use crate::meta::{Annotation, DocumentMeta, FormDescriptor};
use crate::view::ViewSuspension;
use crate::{INSERT_MARK_CLOSE, INSERT_MARK_OPEN};
use std::cell::Cell;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::ops::Range;
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("range {start}..{end} is outside the document or splits a character")]
    InvalidRange { start: usize, end: usize },

    #[error("unknown anchor: {0}")]
    UnknownAnchor(AnchorId),

    #[error("unknown field: {0:?}")]
    UnknownField(FieldId),

    #[error("field {0:?} is not a placeholder")]
    NotAPlaceholder(FieldId),

    #[error("field {0:?} is not refreshable")]
    NotRefreshable(FieldId),
}

/// An editable rich-text document with position-tracked decorations.
#[derive(Debug)]
pub struct TextDocument {
    text: String,
    anchors: BTreeMap<AnchorId, Anchor>,
    next_anchor: u32,
    fields: BTreeMap<FieldId, TextField>,
    next_field: u32,
    annotations: Vec<Annotation>,
    cursor: Option<usize>,
    modified: bool,
    view_depth: Rc<Cell<u32>>,
    meta: DocumentMeta,
}

impl Default for TextDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDocument {
    pub fn new() -> Self {
        Self::from_text("")
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchors: BTreeMap::new(),
            next_anchor: 0,
            fields: BTreeMap::new(),
            next_field: 0,
            annotations: Vec::new(),
            cursor: None,
            modified: false,
            view_depth: Rc::new(Cell::new(0)),
            meta: DocumentMeta::default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    // ---- paragraph queries ----------------------------------------------

    pub fn is_start_of_paragraph(&self, pos: usize) -> bool {
        pos == 0 || self.text.as_bytes().get(pos - 1) == Some(&b'\n')
    }

    pub fn is_end_of_paragraph(&self, pos: usize) -> bool {
        pos >= self.text.len() || self.text.as_bytes().get(pos) == Some(&b'\n')
    }

    /// True when no cursor could move right from `pos`: the very end of the
    /// document.
    pub fn is_end_of_document(&self, pos: usize) -> bool {
        pos >= self.text.len()
    }

    /// The paragraph containing `pos`, excluding the separating newline.
    pub fn paragraph_bounds(&self, pos: usize) -> Range<usize> {
        let pos = pos.min(self.text.len());
        let start = self.text[..pos].rfind('\n').map_or(0, |i| i + 1);
        let end = self.text[pos..]
            .find('\n')
            .map_or(self.text.len(), |i| pos + i);
        start..end
    }

    pub fn paragraph_count(&self) -> usize {
        self.text.bytes().filter(|b| *b == b'\n').count() + 1
    }

    // ---- anchors ---------------------------------------------------------

    /// Register a command declaration covering `range`.
    pub fn add_command_anchor(
        &mut self,
        spec: CommandSpec,
        range: Range<usize>,
    ) -> Result<AnchorId, DocumentError> {
        self.check_range(&range)?;
        let id = AnchorId(self.next_anchor);
        self.next_anchor += 1;
        self.anchors.insert(id, Anchor { range, spec });
        Ok(id)
    }

    pub fn anchor(&self, id: AnchorId) -> Option<&Anchor> {
        self.anchors.get(&id)
    }

    pub fn anchor_range(&self, id: AnchorId) -> Option<Range<usize>> {
        self.anchors.get(&id).map(|a| a.range.clone())
    }

    pub fn anchor_text(&self, id: AnchorId) -> Option<&str> {
        let range = self.anchors.get(&id)?.range.clone();
        self.text.get(range)
    }

    /// Drop the anchor handle without touching the anchored text.
    pub fn remove_anchor(&mut self, id: AnchorId) {
        self.anchors.remove(&id);
    }

    /// All anchors in document order: start ascending, end descending, so an
    /// outer anchor precedes the anchors nested inside it.
    pub fn scan(&self) -> Vec<ScannedAnchor> {
        let mut out: Vec<ScannedAnchor> = self
            .anchors
            .iter()
            .map(|(id, a)| ScannedAnchor {
                id: *id,
                spec: a.spec.clone(),
                range: a.range.clone(),
            })
            .collect();
        out.sort_by_key(|s| (s.range.start, Reverse(s.range.end), s.id));
        out
    }

    pub fn range_contains(outer: &Range<usize>, inner: &Range<usize>) -> bool {
        outer.start <= inner.start && inner.end <= outer.end
    }

    // ---- fields ----------------------------------------------------------

    pub fn add_placeholder(&mut self, pos: usize) -> Result<FieldId, DocumentError> {
        self.add_field(pos, FieldKind::Placeholder)
    }

    pub fn add_refreshable(&mut self, pos: usize) -> Result<FieldId, DocumentError> {
        self.add_field(pos, FieldKind::Refreshable)
    }

    fn add_field(&mut self, pos: usize, kind: FieldKind) -> Result<FieldId, DocumentError> {
        self.check_range(&(pos..pos))?;
        let id = FieldId(self.next_field);
        self.next_field += 1;
        self.fields.insert(
            id,
            TextField {
                pos,
                kind,
                refresh_count: 0,
            },
        );
        Ok(id)
    }

    pub fn field(&self, id: FieldId) -> Option<&TextField> {
        self.fields.get(&id)
    }

    /// Placeholder fields inside `range`, in document order.
    pub fn placeholders_in(&self, range: &Range<usize>) -> Vec<FieldId> {
        self.fields_in(range, &FieldKind::Placeholder)
    }

    /// Refreshable fields inside `range`, in document order.
    pub fn refreshable_fields_in(&self, range: &Range<usize>) -> Vec<FieldId> {
        self.fields_in(range, &FieldKind::Refreshable)
    }

    fn fields_in(&self, range: &Range<usize>, kind: &FieldKind) -> Vec<FieldId> {
        let mut out: Vec<(usize, FieldId)> = self
            .fields
            .iter()
            .filter(|(_, f)| f.kind == *kind && range.contains(&f.pos))
            .map(|(id, f)| (f.pos, *id))
            .collect();
        out.sort();
        out.into_iter().map(|(_, id)| id).collect()
    }

    /// Replace a placeholder field with literal text. The field is consumed.
    pub fn fill_placeholder(&mut self, id: FieldId, text: &str) -> Result<(), DocumentError> {
        let field = self
            .fields
            .get(&id)
            .ok_or(DocumentError::UnknownField(id))?;
        if field.kind != FieldKind::Placeholder {
            return Err(DocumentError::NotAPlaceholder(id));
        }
        let pos = field.pos;
        self.fields.remove(&id);
        self.splice(pos..pos, text, None)
    }

    /// Invoke the host refresh operation of a refreshable field.
    pub fn refresh_field(&mut self, id: FieldId) -> Result<(), DocumentError> {
        let field = self
            .fields
            .get_mut(&id)
            .ok_or(DocumentError::UnknownField(id))?;
        if field.kind != FieldKind::Refreshable {
            return Err(DocumentError::NotRefreshable(id));
        }
        field.refresh_count += 1;
        self.modified = true;
        Ok(())
    }

    // ---- text mutation ---------------------------------------------------

    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<(), DocumentError> {
        self.splice(pos..pos, text, None)
    }

    pub fn delete_range(&mut self, range: Range<usize>) -> Result<(), DocumentError> {
        self.splice(range, "", None)
    }

    /// Replace the anchored text of `id`, keeping the anchor alive and
    /// stretched over the replacement. Anchors nested strictly inside the
    /// replaced range are dropped with their text.
    pub fn replace_anchor_text(&mut self, id: AnchorId, text: &str) -> Result<(), DocumentError> {
        let range = self
            .anchors
            .get(&id)
            .ok_or(DocumentError::UnknownAnchor(id))?
            .range
            .clone();
        self.splice(range, text, Some(id))
    }

    /// Insert a fragment into the anchored range of `id`, replacing whatever
    /// the range contained. With `with_marks` the content is bracketed by the
    /// insertion-boundary markers removed later by garbage collection. The
    /// fragment's nested command anchors and fields are re-registered inside
    /// the inserted content. Returns the range of the inserted content
    /// (markers excluded).
    pub fn insert_fragment(
        &mut self,
        id: AnchorId,
        fragment: &Fragment,
        with_marks: bool,
    ) -> Result<Range<usize>, DocumentError> {
        let range = self
            .anchors
            .get(&id)
            .ok_or(DocumentError::UnknownAnchor(id))?
            .range
            .clone();

        let mut buf = String::with_capacity(fragment.text.len() + 2);
        if with_marks {
            buf.push(INSERT_MARK_OPEN);
        }
        let content_offset = buf.len();
        buf.push_str(&fragment.text);
        if with_marks {
            buf.push(INSERT_MARK_CLOSE);
        }

        self.splice(range.clone(), &buf, Some(id))?;
        let content_start = range.start + content_offset;

        for cmd in &fragment.commands {
            let nested = content_start + cmd.start..content_start + cmd.end;
            debug!(spec = %cmd.spec.name, start = nested.start, end = nested.end, "registering nested command");
            self.add_command_anchor(cmd.spec.clone(), nested)?;
        }
        for field in &fragment.fields {
            self.add_field(content_start + field.pos, field.kind.clone())?;
        }

        Ok(content_start..content_start + fragment.text.len())
    }

    /// Delete the whole paragraph containing `pos`, merging it out of the
    /// document. The sole remaining paragraph is cleared instead of removed,
    /// so no dangling paragraph container is left behind. Returns the span
    /// that was removed, in pre-deletion coordinates.
    pub fn delete_paragraph_at(&mut self, pos: usize) -> Result<Range<usize>, DocumentError> {
        let bounds = self.paragraph_bounds(pos);
        let removed = if bounds.start == 0 && bounds.end == self.text.len() {
            // Sole paragraph: clear content only.
            bounds
        } else if bounds.end < self.text.len() {
            // Consume the trailing separator.
            bounds.start..bounds.end + 1
        } else {
            // Last paragraph: consume the preceding separator.
            bounds.start - 1..bounds.end
        };
        self.splice(removed.clone(), "", None)?;
        Ok(removed)
    }

    // ---- annotations -----------------------------------------------------

    pub fn add_annotation(&mut self, pos: usize, message: impl Into<String>) {
        self.annotations.push(Annotation {
            pos: pos.min(self.text.len()),
            message: message.into(),
        });
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    // ---- cursor ----------------------------------------------------------

    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = Some(pos.min(self.text.len()));
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    // ---- view updates ----------------------------------------------------

    /// Suppress live view updates until the returned guard is dropped.
    pub fn suppress_view_updates(&self) -> ViewSuspension {
        ViewSuspension::acquire(&self.view_depth)
    }

    pub fn view_updates_suppressed(&self) -> bool {
        self.view_depth.get() > 0
    }

    // ---- modified flag ---------------------------------------------------

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    // ---- metadata --------------------------------------------------------

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    pub fn set_document_type(&mut self, doc_type: impl Into<String>) {
        self.meta.doc_type = Some(doc_type.into());
    }

    pub fn document_type(&self) -> Option<&str> {
        self.meta.doc_type.as_deref()
    }

    pub fn set_print_function(&mut self, name: impl Into<String>) {
        self.meta.print_function = Some(name.into());
    }

    pub fn set_jump_mark(&mut self, anchor: AnchorId) {
        self.meta.jump_mark = Some(anchor);
    }

    pub fn jump_mark(&self) -> Option<AnchorId> {
        self.meta.jump_mark
    }

    pub fn add_draft_only_block(&mut self, anchor: AnchorId) {
        self.meta.draft_only_blocks.push(anchor);
    }

    pub fn add_not_in_original_block(&mut self, anchor: AnchorId) {
        self.meta.not_in_original_blocks.push(anchor);
    }

    pub fn add_all_versions_block(&mut self, anchor: AnchorId) {
        self.meta.all_versions_blocks.push(anchor);
    }

    pub fn add_form_descriptor(&mut self, descriptor: FormDescriptor) {
        self.meta.form_descriptors.push(descriptor);
    }

    pub fn has_form_descriptors(&self) -> bool {
        !self.meta.form_descriptors.is_empty()
    }

    // ---- the splice primitive -------------------------------------------

    fn check_range(&self, range: &Range<usize>) -> Result<(), DocumentError> {
        let ok = range.start <= range.end
            && range.end <= self.text.len()
            && self.text.is_char_boundary(range.start)
            && self.text.is_char_boundary(range.end);
        if ok {
            Ok(())
        } else {
            Err(DocumentError::InvalidRange {
                start: range.start,
                end: range.end,
            })
        }
    }

    /// Replace `range` with `replacement` and remap every tracked position.
    ///
    /// A `protect`ed anchor is never dropped; it ends up exactly covering the
    /// replacement. Unprotected anchors fully inside a non-empty `range` are
    /// removed with their text; fields inside it are removed; the cursor and
    /// annotations inside it clamp to its start.
    fn splice(
        &mut self,
        range: Range<usize>,
        replacement: &str,
        protect: Option<AnchorId>,
    ) -> Result<(), DocumentError> {
        self.check_range(&range)?;
        let (a, b) = (range.start, range.end);
        let old_len = b - a;
        let new_len = replacement.len();

        self.text.replace_range(a..b, replacement);

        // Anchors.
        let mut dropped: Vec<AnchorId> = Vec::new();
        for (id, anchor) in self.anchors.iter_mut() {
            if protect == Some(*id) {
                anchor.range = a..a + new_len;
                continue;
            }
            let (s, e) = (anchor.range.start, anchor.range.end);
            if old_len > 0 && s >= a && e <= b {
                dropped.push(*id);
                continue;
            }
            let s = if s < a {
                s
            } else if s >= b {
                s - old_len + new_len
            } else {
                a
            };
            let e = if e <= a {
                e
            } else if e >= b {
                e - old_len + new_len
            } else {
                a + new_len
            };
            anchor.range = s..e.max(s);
        }
        for id in dropped {
            self.anchors.remove(&id);
        }

        // Fields.
        let mut removed: Vec<FieldId> = Vec::new();
        for (id, field) in self.fields.iter_mut() {
            let p = field.pos;
            if p >= b {
                field.pos = p - old_len + new_len;
            } else if p >= a && old_len > 0 {
                removed.push(*id);
            }
        }
        for id in removed {
            self.fields.remove(&id);
        }

        // Annotations and cursor clamp into the replacement start.
        for note in &mut self.annotations {
            if note.pos >= b {
                note.pos = note.pos - old_len + new_len;
            } else if note.pos > a {
                note.pos = note.pos.min(a + new_len);
            }
        }
        if let Some(c) = self.cursor {
            self.cursor = Some(if c >= b {
                c - old_len + new_len
            } else if c > a {
                a
            } else {
                c
            });
        }

        self.modified = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> CommandSpec {
        CommandSpec::new(name)
    }

    #[test]
    fn paragraph_queries() {
        let doc = TextDocument::from_text("one\ntwo\nthree");
        assert!(doc.is_start_of_paragraph(0));
        assert!(doc.is_start_of_paragraph(4));
        assert!(!doc.is_start_of_paragraph(5));
        assert!(doc.is_end_of_paragraph(3));
        assert!(doc.is_end_of_paragraph(13));
        assert!(!doc.is_end_of_paragraph(1));
        assert!(doc.is_end_of_document(13));
        assert!(!doc.is_end_of_document(7));
        assert_eq!(doc.paragraph_bounds(5), 4..7);
        assert_eq!(doc.paragraph_count(), 3);
    }

    #[test]
    fn anchors_shift_on_insert_and_delete() {
        let mut doc = TextDocument::from_text("hello world");
        let id = doc.add_command_anchor(spec("insertValue"), 6..11).unwrap();

        doc.insert_text(0, "## ").unwrap();
        assert_eq!(doc.anchor_range(id), Some(9..14));

        doc.delete_range(0..3).unwrap();
        assert_eq!(doc.anchor_range(id), Some(6..11));
        assert_eq!(doc.anchor_text(id), Some("world"));
    }

    #[test]
    fn anchor_dies_with_its_text() {
        let mut doc = TextDocument::from_text("abcdef");
        let id = doc.add_command_anchor(spec("insertValue"), 2..4).unwrap();
        doc.delete_range(1..5).unwrap();
        assert_eq!(doc.anchor_range(id), None);
        assert_eq!(doc.text(), "af");
    }

    #[test]
    fn replace_anchor_text_keeps_anchor_and_stretches_parent() {
        let mut doc = TextDocument::from_text("[xy]rest");
        let outer = doc.add_command_anchor(spec("insertFrag"), 0..4).unwrap();
        let inner = doc.add_command_anchor(spec("insertValue"), 1..3).unwrap();

        doc.replace_anchor_text(inner, "longer").unwrap();
        assert_eq!(doc.text(), "[longer]rest");
        assert_eq!(doc.anchor_range(inner), Some(1..7));
        assert_eq!(doc.anchor_range(outer), Some(0..8));
    }

    #[test]
    fn fragment_insertion_registers_nested_anchors_in_range() {
        let mut doc = TextDocument::from_text("AB");
        let host = doc.add_command_anchor(spec("insertFrag"), 1..1).unwrap();

        let fragment = Fragment::from_text("value: xx")
            .with_command(spec("insertValue"), 7..9)
            .with_placeholder(7);
        let content = doc.insert_fragment(host, &fragment, true).unwrap();

        assert_eq!(doc.text(), "A<value: xx>B");
        assert_eq!(content, 2..11);
        let host_range = doc.anchor_range(host).unwrap();
        assert_eq!(host_range, 1..12);

        let scanned = doc.scan();
        assert_eq!(scanned.len(), 2);
        assert_eq!(scanned[0].id, host);
        assert!(TextDocument::range_contains(
            &host_range,
            &scanned[1].range
        ));
        assert_eq!(doc.placeholders_in(&content).len(), 1);
    }

    #[test]
    fn scan_orders_outer_before_inner() {
        let mut doc = TextDocument::from_text("0123456789");
        let inner = doc.add_command_anchor(spec("insertValue"), 2..5).unwrap();
        let outer = doc.add_command_anchor(spec("insertFrag"), 0..9).unwrap();
        let sibling = doc.add_command_anchor(spec("form"), 6..8).unwrap();

        let order: Vec<_> = doc.scan().into_iter().map(|s| s.id).collect();
        assert_eq!(order, vec![outer, inner, sibling]);
    }

    #[test]
    fn fill_placeholder_consumes_field() {
        let mut doc = TextDocument::from_text("Dear , hello");
        let field = doc.add_placeholder(5).unwrap();
        doc.fill_placeholder(field, "Ada").unwrap();
        assert_eq!(doc.text(), "Dear Ada, hello");
        assert!(doc.field(field).is_none());
    }

    #[test]
    fn delete_paragraph_merges_and_sole_paragraph_is_cleared() {
        let mut doc = TextDocument::from_text("a\nb\nc");
        doc.delete_paragraph_at(2).unwrap();
        assert_eq!(doc.text(), "a\nc");

        doc.delete_paragraph_at(2).unwrap();
        assert_eq!(doc.text(), "a");

        // Sole paragraph: content cleared, paragraph container stays.
        doc.delete_paragraph_at(0).unwrap();
        assert_eq!(doc.text(), "");
        assert_eq!(doc.paragraph_count(), 1);
    }

    #[test]
    fn modified_flag_follows_mutation() {
        let mut doc = TextDocument::from_text("x");
        assert!(!doc.is_modified());
        doc.insert_text(0, "y").unwrap();
        assert!(doc.is_modified());
        doc.set_modified(false);
        assert!(!doc.is_modified());
    }

    #[test]
    fn view_suppression_releases_on_drop() {
        let doc = TextDocument::new();
        assert!(!doc.view_updates_suppressed());
        {
            let _guard = doc.suppress_view_updates();
            assert!(doc.view_updates_suppressed());
        }
        assert!(!doc.view_updates_suppressed());
    }

    #[test]
    fn cursor_clamps_into_deleted_range() {
        let mut doc = TextDocument::from_text("0123456789");
        doc.set_cursor(7);
        doc.delete_range(4..9).unwrap();
        assert_eq!(doc.cursor(), Some(4));
    }
}
