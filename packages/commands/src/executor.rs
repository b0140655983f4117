//! Depth-first command execution.

use crate::command::Command;
use crate::kind::CommandKind;
use crate::tree::CommandTree;
use scribe_document::TextDocument;
use tracing::trace;

/// One interpreter pass over the command tree.
///
/// Every handler receives the document and the mutable command, and returns
/// the number of errors it produced. The default for each handler is to
/// ignore the command, so a pass only overrides the kinds it cares about.
pub trait CommandVisitor {
    fn on_set_document_type(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_set_print_function(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_draft_only(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_not_in_original(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_all_versions(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_set_jump_mark(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_insert_fragment(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_insert_content(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_insert_value(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_insert_function_value(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_insert_form_value(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_form(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_update_fields(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }

    fn on_invalid(&mut self, _doc: &mut TextDocument, _cmd: &mut Command) -> usize {
        0
    }
}

/// Run `visitor` over every not-yet-done command in depth-first document
/// order. Returns the summed error count.
///
/// The traversal order is snapshotted up front, so a visitor may mutate the
/// document freely; commands it adds become visible on the next rebuild.
pub fn execute_depth_first(
    visitor: &mut impl CommandVisitor,
    tree: &mut CommandTree,
    doc: &mut TextDocument,
) -> usize {
    let mut errors = 0;
    for id in tree.pre_order() {
        let Some(cmd) = tree.get_mut(id) else {
            continue;
        };
        if cmd.done {
            continue;
        }
        trace!(anchor = %id, kind = ?cmd.kind(), "visiting command");
        errors += match cmd.kind() {
            CommandKind::SetDocumentType => visitor.on_set_document_type(doc, cmd),
            CommandKind::SetPrintFunction => visitor.on_set_print_function(doc, cmd),
            CommandKind::DraftOnly => visitor.on_draft_only(doc, cmd),
            CommandKind::NotInOriginal => visitor.on_not_in_original(doc, cmd),
            CommandKind::AllVersions => visitor.on_all_versions(doc, cmd),
            CommandKind::SetJumpMark => visitor.on_set_jump_mark(doc, cmd),
            CommandKind::InsertFragment => visitor.on_insert_fragment(doc, cmd),
            CommandKind::InsertContent => visitor.on_insert_content(doc, cmd),
            CommandKind::InsertValue => visitor.on_insert_value(doc, cmd),
            CommandKind::InsertFunctionValue => visitor.on_insert_function_value(doc, cmd),
            CommandKind::InsertFormValue => visitor.on_insert_form_value(doc, cmd),
            CommandKind::Form => visitor.on_form(doc, cmd),
            CommandKind::UpdateFields => visitor.on_update_fields(doc, cmd),
            CommandKind::Invalid => visitor.on_invalid(doc, cmd),
        };
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_document::CommandSpec;

    #[derive(Default)]
    struct Recorder {
        visited: Vec<CommandKind>,
    }

    impl CommandVisitor for Recorder {
        fn on_insert_value(&mut self, _doc: &mut TextDocument, cmd: &mut Command) -> usize {
            self.visited.push(cmd.kind());
            0
        }

        fn on_invalid(&mut self, _doc: &mut TextDocument, cmd: &mut Command) -> usize {
            self.visited.push(cmd.kind());
            1
        }
    }

    #[test]
    fn traversal_skips_done_and_sums_errors() {
        let mut doc = TextDocument::from_text("0123456789");
        let value = doc
            .add_command_anchor(
                CommandSpec::new("insertValue").with_attr("column", "c"),
                0..2,
            )
            .unwrap();
        let skipped = doc
            .add_command_anchor(
                CommandSpec::new("insertValue").with_attr("column", "d"),
                3..5,
            )
            .unwrap();
        doc.add_command_anchor(CommandSpec::new("nonsense"), 6..8)
            .unwrap();

        let mut tree = CommandTree::scan(&mut doc);
        tree.get_mut(skipped).unwrap().done = true;

        let mut recorder = Recorder::default();
        let errors = execute_depth_first(&mut recorder, &mut tree, &mut doc);
        assert_eq!(errors, 1);
        assert_eq!(
            recorder.visited,
            vec![CommandKind::InsertValue, CommandKind::Invalid]
        );
        assert!(tree.get(value).is_some());
    }
}
