//! Inline error markers.

use scribe_commands::Command;
use scribe_document::{DocumentError, TextDocument};
use tracing::error;

/// The visible marker an errored command leaves in the text. The full
/// message goes into an annotation next to it.
pub const ERROR_MARK: &str = "<ERROR:  >";

/// Replace the command's anchored text with the error marker and attach the
/// full message as an annotation.
pub fn insert_error_field(
    doc: &mut TextDocument,
    cmd: &mut Command,
    message: &str,
) -> Result<(), DocumentError> {
    error!(anchor = %cmd.anchor(), kind = ?cmd.kind(), message, "command failed");
    doc.replace_anchor_text(cmd.anchor(), ERROR_MARK)?;
    let pos = doc
        .anchor_range(cmd.anchor())
        .map_or(0, |range| range.start);
    doc.add_annotation(pos, message);
    cmd.error_state = true;
    Ok(())
}
