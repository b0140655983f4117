//! Text fields: position-tracked inline objects.

use serde::{Deserialize, Serialize};

/// Stable identity of a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub(crate) u32);

/// What a text field is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// A fill-in target inside inserted content. Filling it replaces the
    /// field with literal text.
    Placeholder,
    /// A host-refreshable field (date, database reference). The Field-Update
    /// pass bumps its refresh counter.
    Refreshable,
}

/// An inline field at a byte position.
#[derive(Debug, Clone)]
pub struct TextField {
    pub(crate) pos: usize,
    pub(crate) kind: FieldKind,
    pub(crate) refresh_count: u32,
}

impl TextField {
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn refresh_count(&self) -> u32 {
        self.refresh_count
    }
}
