//! The field-update pass.

use scribe_commands::{Command, CommandVisitor};
use scribe_document::TextDocument;
use tracing::{debug, warn};

/// Refreshes host text fields inside `updateFields` ranges.
pub(crate) struct FieldUpdater {
    debug_mode: bool,
}

impl FieldUpdater {
    pub(crate) fn new(debug_mode: bool) -> Self {
        Self { debug_mode }
    }
}

impl CommandVisitor for FieldUpdater {
    fn on_update_fields(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        let Some(range) = doc.anchor_range(cmd.anchor()) else {
            return 0;
        };
        let fields = doc.refreshable_fields_in(&range);
        debug!(anchor = %cmd.anchor(), count = fields.len(), "refreshing fields");
        let _quiet = doc.suppress_view_updates();
        for field in fields {
            if let Err(err) = doc.refresh_field(field) {
                warn!(%err, "field refresh failed");
            }
        }
        cmd.done = !self.debug_mode;
        0
    }
}
