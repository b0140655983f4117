//! The closed set of commands and their wire names.

use scribe_document::CommandSpec;
use serde::{Deserialize, Serialize};

/// What a discovered command declaration means to the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Tag the whole document with a type name.
    SetDocumentType,
    /// Register the named print function on the document.
    SetPrintFunction,
    /// Visibility block: drop on final prints.
    DraftOnly,
    /// Visibility block: drop from the original.
    NotInOriginal,
    /// Visibility block: keep in every version.
    AllVersions,
    /// Remember this position as the post-processing cursor target.
    SetJumpMark,
    /// Expand an external fragment in place of the anchored range.
    InsertFragment,
    /// Expand the next queued content source in place of the anchored range.
    InsertContent,
    /// Insert a column of the selected record.
    InsertValue,
    /// Insert the result of a named document function.
    InsertFunctionValue,
    /// Bind the anchored range to a form field id.
    InsertFormValue,
    /// Carry a serialized form description.
    Form,
    /// Refresh the host text fields inside the anchored range.
    UpdateFields,
    /// Unknown name or missing required argument. Processed by the main pass
    /// as an error.
    Invalid,
}

impl CommandKind {
    /// Classify a raw declaration. An `Err` carries the reason the
    /// declaration is unusable; the caller records it and files the command
    /// as `Invalid`.
    pub fn classify(spec: &CommandSpec) -> Result<CommandKind, String> {
        let kind = match spec.name.as_str() {
            "setType" => CommandKind::SetDocumentType,
            "setPrintFunction" => CommandKind::SetPrintFunction,
            "draftOnly" => CommandKind::DraftOnly,
            "notInOriginal" => CommandKind::NotInOriginal,
            "allVersions" => CommandKind::AllVersions,
            "setJumpMark" => CommandKind::SetJumpMark,
            "insertFrag" => CommandKind::InsertFragment,
            "insertContent" => CommandKind::InsertContent,
            "insertValue" => CommandKind::InsertValue,
            "insertFunctionValue" => CommandKind::InsertFunctionValue,
            "insertFormValue" => CommandKind::InsertFormValue,
            "form" => CommandKind::Form,
            "updateFields" => CommandKind::UpdateFields,
            other => return Err(format!("unknown command '{other}'")),
        };
        if let Some(required) = kind.required_attr() {
            if spec.attr(required).is_none() {
                return Err(format!(
                    "command '{}' is missing required argument '{required}'",
                    spec.name
                ));
            }
        }
        Ok(kind)
    }

    fn required_attr(self) -> Option<&'static str> {
        match self {
            CommandKind::InsertFragment => Some("frag_id"),
            CommandKind::InsertValue => Some("column"),
            CommandKind::InsertFunctionValue => Some("function"),
            CommandKind::InsertFormValue => Some("id"),
            _ => None,
        }
    }

    /// True for the commands that replace their anchored range with external
    /// content during expansion.
    pub fn expands(self) -> bool {
        matches!(
            self,
            CommandKind::InsertFragment | CommandKind::InsertContent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_names() {
        let spec = CommandSpec::new("insertValue").with_attr("column", "name");
        assert_eq!(CommandKind::classify(&spec), Ok(CommandKind::InsertValue));
        assert_eq!(
            CommandKind::classify(&CommandSpec::new("updateFields")),
            Ok(CommandKind::UpdateFields)
        );
    }

    #[test]
    fn unknown_name_is_rejected_with_reason() {
        let err = CommandKind::classify(&CommandSpec::new("explode")).unwrap_err();
        assert!(err.contains("explode"));
    }

    #[test]
    fn missing_required_argument_is_rejected() {
        let err = CommandKind::classify(&CommandSpec::new("insertFrag")).unwrap_err();
        assert!(err.contains("frag_id"));

        let ok = CommandSpec::new("insertFrag").with_attr("frag_id", "header");
        assert_eq!(
            CommandKind::classify(&ok),
            Ok(CommandKind::InsertFragment)
        );
    }
}
