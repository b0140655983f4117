//! The settings scan.
//!
//! Runs before any content-changing pass and lifts document-level commands
//! into metadata: the type tag, the print function, the visibility block
//! registries and the jump mark. Only the type tag and the print function
//! are consumed here. Block markers and the jump mark are never marked done:
//! the registries hold their anchors, and later stages (visibility toggling,
//! the cursor jump) still need those ranges alive.

use scribe_commands::{Command, CommandVisitor};
use scribe_document::TextDocument;
use tracing::debug;

pub(crate) struct SettingsScanner;

impl CommandVisitor for SettingsScanner {
    fn on_set_document_type(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        debug!(doc_type = cmd.type_name(), "setting document type");
        doc.set_document_type(cmd.type_name());
        // The type tag must not reappear on later runs, debug mode or not.
        cmd.done = true;
        0
    }

    fn on_set_print_function(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        doc.set_print_function(cmd.function_name());
        cmd.done = true;
        0
    }

    fn on_draft_only(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        doc.add_draft_only_block(cmd.anchor());
        0
    }

    fn on_not_in_original(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        doc.add_not_in_original_block(cmd.anchor());
        0
    }

    fn on_all_versions(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        doc.add_all_versions_block(cmd.anchor());
        0
    }

    fn on_set_jump_mark(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        doc.set_jump_mark(cmd.anchor());
        0
    }
}
