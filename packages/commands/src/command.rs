//! One discovered command and its processing state.

use crate::kind::CommandKind;
use scribe_document::{AnchorId, CommandSpec};

/// A command anchor together with the flags the passes maintain on it.
///
/// `done` means the command is finished and its anchor may be discarded on
/// the next tree rebuild. `executed` is the weaker latch used by expansion:
/// the command has been attempted this run and must not be retried, but its
/// anchor stays in the document (error markers keep their command visible).
#[derive(Debug, Clone)]
pub struct Command {
    anchor: AnchorId,
    kind: CommandKind,
    spec: CommandSpec,
    parse_error: Option<String>,
    pub done: bool,
    pub executed: bool,
    pub error_state: bool,
    pub has_insert_marks: bool,
}

impl Command {
    pub fn new(anchor: AnchorId, spec: CommandSpec) -> Self {
        let (kind, parse_error) = match CommandKind::classify(&spec) {
            Ok(kind) => (kind, None),
            Err(reason) => (CommandKind::Invalid, Some(reason)),
        };
        Self {
            anchor,
            kind,
            spec,
            parse_error,
            done: false,
            executed: false,
            error_state: false,
            has_insert_marks: false,
        }
    }

    pub fn anchor(&self) -> AnchorId {
        self.anchor
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Why this command is [`CommandKind::Invalid`], if it is.
    pub fn parse_error(&self) -> Option<&str> {
        self.parse_error.as_deref()
    }

    /// Carry processing state over from an earlier incarnation of the same
    /// anchor during a tree rebuild.
    pub(crate) fn adopt_state(&mut self, previous: &Command) {
        self.done = previous.done;
        self.executed = previous.executed;
        self.error_state = previous.error_state;
        self.has_insert_marks = previous.has_insert_marks;
    }

    // ---- argument accessors ---------------------------------------------

    pub fn frag_id(&self) -> &str {
        self.spec.attr("frag_id").unwrap_or("")
    }

    pub fn column(&self) -> &str {
        self.spec.attr("column").unwrap_or("")
    }

    pub fn function_name(&self) -> &str {
        self.spec.attr("function").unwrap_or("")
    }

    pub fn field_id(&self) -> &str {
        self.spec.attr("id").unwrap_or("")
    }

    pub fn type_name(&self) -> &str {
        self.spec.attr("type").unwrap_or("")
    }

    /// Optional value-transform function name.
    pub fn trafo(&self) -> Option<&str> {
        self.spec.attr("trafo")
    }

    pub fn left_separator(&self) -> &str {
        self.spec.attr("autosep_left").unwrap_or("")
    }

    pub fn right_separator(&self) -> &str {
        self.spec.attr("autosep_right").unwrap_or("")
    }

    /// Manual-mode fragment insertion: failures surface to the user instead
    /// of being absorbed silently, and trailing-paragraph cleanup is relaxed.
    pub fn manual_mode(&self) -> bool {
        self.spec.attr("manual") == Some("true")
    }

    /// Positional arguments, used by expansion to fill placeholders.
    pub fn args(&self) -> &[String] {
        self.spec.args.as_slice()
    }
}
