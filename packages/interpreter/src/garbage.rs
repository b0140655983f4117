//! Surrounding-garbage collection.
//!
//! Expansion brackets inserted content with one-character markers. After the
//! main pass the markers have to go, and when a marker was left alone in its
//! paragraph the whole paragraph goes with it, so expanded templates do not
//! accumulate blank lines around every insertion point.
//!
//! Deletions are queued during the visit and applied afterwards in one view
//! suppression scope, each adjusted by the deletions applied before it.

use scribe_commands::{Command, CommandVisitor};
use scribe_document::{DocumentError, TextDocument, INSERT_MARK_LEN};
use std::ops::Range;
use tracing::debug;

#[derive(Debug, PartialEq, Eq)]
enum Garbage {
    /// Delete the whole paragraph containing `pos`.
    Paragraph { pos: usize },
    /// Delete exactly this marker range.
    Marker { range: Range<usize> },
}

pub(crate) struct GarbageCollector {
    debug_mode: bool,
    queue: Vec<Garbage>,
}

impl GarbageCollector {
    pub(crate) fn new(debug_mode: bool) -> Self {
        Self {
            debug_mode,
            queue: Vec::new(),
        }
    }

    fn collect_marks(&mut self, doc: &TextDocument, cmd: &mut Command) {
        // Every visited expansion command is finished after this pass, with
        // or without markers to clean up; errored ones keep their marker
        // text but must not linger in the tree.
        cmd.done = !self.debug_mode;
        if !cmd.has_insert_marks || cmd.error_state {
            return;
        }
        let Some(range) = doc.anchor_range(cmd.anchor()) else {
            return;
        };
        let start_mark = range.start..range.start + INSERT_MARK_LEN;
        let end_mark = range.end - INSERT_MARK_LEN..range.end;

        // A marker alone in its paragraph takes the paragraph with it.
        if doc.is_start_of_paragraph(start_mark.start) && doc.is_end_of_paragraph(start_mark.end) {
            self.queue.push(Garbage::Paragraph {
                pos: start_mark.start,
            });
        } else {
            self.queue.push(Garbage::Marker { range: start_mark });
        }

        // At the very end of the document the trailing paragraph is spared
        // for manually inserted fragments; the insertion point was chosen by
        // the user and the document must not lose its last paragraph under
        // them.
        let at_document_end = cmd.manual_mode() && doc.is_end_of_document(end_mark.end);
        if doc.is_start_of_paragraph(end_mark.start)
            && doc.is_end_of_paragraph(end_mark.end)
            && !at_document_end
        {
            self.queue.push(Garbage::Paragraph { pos: end_mark.start });
        } else {
            self.queue.push(Garbage::Marker { range: end_mark });
        }

        cmd.has_insert_marks = false;
    }

    /// Apply all queued deletions.
    pub(crate) fn remove_garbage(&mut self, doc: &mut TextDocument) -> Result<(), DocumentError> {
        let _quiet = doc.suppress_view_updates();
        // Positions were captured against one snapshot; every applied
        // deletion shifts the ones still queued behind it.
        let mut applied: Vec<(usize, usize)> = Vec::new();
        for garbage in self.queue.drain(..) {
            match garbage {
                Garbage::Paragraph { pos } => {
                    let pos = adjust(pos, &applied);
                    let removed = doc.delete_paragraph_at(pos)?;
                    debug!(start = removed.start, end = removed.end, "deleted paragraph");
                    applied.push((removed.start, removed.len()));
                }
                Garbage::Marker { range } => {
                    let start = adjust(range.start, &applied);
                    let end = adjust(range.end, &applied);
                    doc.delete_range(start..end)?;
                    applied.push((start, end - start));
                }
            }
        }
        Ok(())
    }
}

fn adjust(mut pos: usize, applied: &[(usize, usize)]) -> usize {
    for &(start, len) in applied {
        if pos > start {
            pos -= len.min(pos - start);
        }
    }
    pos
}

impl CommandVisitor for GarbageCollector {
    fn on_insert_fragment(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        self.collect_marks(doc, cmd);
        0
    }

    fn on_insert_content(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        self.collect_marks(doc, cmd);
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_accounts_for_earlier_deletions() {
        // Each applied entry is recorded in the coordinates that held when
        // its deletion ran, after all entries before it.
        let applied = vec![(2, 3), (10, 1)];
        assert_eq!(adjust(1, &applied), 1);
        assert_eq!(adjust(4, &applied), 2);
        assert_eq!(adjust(12, &applied), 9);
        assert_eq!(adjust(11, &applied), 8);
    }
}
