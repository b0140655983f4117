//! Document-level metadata written by the interpreter passes.

use crate::anchor::AnchorId;
use serde::{Deserialize, Serialize};

/// A form description registered by a `form` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDescriptor {
    /// Serialized form configuration, as carried by the command declaration.
    pub config: String,
}

/// An inline note attached next to an error marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub pos: usize,
    pub message: String,
}

/// Document-wide settings and registries.
///
/// Kept as plain data on the document; the interpreter threads an explicit
/// context instead of reaching for globals.
#[derive(Debug, Clone, Default)]
pub struct DocumentMeta {
    pub doc_type: Option<String>,
    pub print_function: Option<String>,
    pub jump_mark: Option<AnchorId>,
    pub draft_only_blocks: Vec<AnchorId>,
    pub not_in_original_blocks: Vec<AnchorId>,
    pub all_versions_blocks: Vec<AnchorId>,
    pub form_descriptors: Vec<FormDescriptor>,
}
