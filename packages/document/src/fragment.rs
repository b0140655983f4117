//! Detached sub-documents produced by fragment resolution.

use crate::anchor::CommandSpec;
use crate::field::FieldKind;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A command declaration nested inside a fragment, with its range relative
/// to the fragment's own text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentCommand {
    pub spec: CommandSpec,
    pub start: usize,
    pub end: usize,
}

/// A text field nested inside a fragment, position relative to the
/// fragment's own text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentField {
    pub pos: usize,
    pub kind: FieldKind,
}

/// A resolved piece of external content: plain text plus the command anchors
/// and fields it carries. Inserting a fragment re-registers both at the
/// insertion offset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub commands: Vec<FragmentCommand>,
    pub fields: Vec<FragmentField>,
}

impl Fragment {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            commands: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Attach a nested command covering `range` of the fragment text.
    pub fn with_command(mut self, spec: CommandSpec, range: Range<usize>) -> Self {
        self.commands.push(FragmentCommand {
            spec,
            start: range.start,
            end: range.end,
        });
        self
    }

    /// Attach a placeholder field at `pos` of the fragment text.
    pub fn with_placeholder(mut self, pos: usize) -> Self {
        self.fields.push(FragmentField {
            pos,
            kind: FieldKind::Placeholder,
        });
        self
    }

    /// Attach a refreshable field at `pos` of the fragment text.
    pub fn with_refreshable(mut self, pos: usize) -> Self {
        self.fields.push(FragmentField {
            pos,
            kind: FieldKind::Refreshable,
        });
        self
    }
}
