//! The environment the interpreter runs against.
//!
//! The interpreter itself owns no data sources. Record access, document
//! functions and fragment resolution are traits implemented by the embedding
//! application; tests plug in in-memory fakes.

use scribe_document::Fragment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("record has no column '{column}'")]
pub struct ColumnNotFound {
    pub column: String,
}

/// One data record, usually the selected sender.
pub trait Record {
    fn get(&self, column: &str) -> Result<String, ColumnNotFound>;
}

/// Supplies the currently selected record, if any.
pub trait RecordSource {
    fn selected(&self) -> Option<&dyn Record>;
}

/// A named value-transform or value-producing function.
pub trait DocumentFunction {
    /// Declared parameter names, in order.
    fn parameters(&self) -> Vec<String>;

    fn evaluate(&self, args: &BTreeMap<String, String>) -> String;
}

/// Looks up document functions by name.
pub trait FunctionLibrary {
    fn lookup(&self, name: &str) -> Option<&dyn DocumentFunction>;
}

#[derive(Error, Debug, Clone)]
#[error("fragment fetch from '{location}' failed: {reason}")]
pub struct FetchError {
    pub location: String,
    pub reason: String,
}

/// Maps fragment ids to candidate locations and fetches their content.
pub trait FragmentResolver {
    /// Candidate locations for `frag_id`, in fallback order. Empty means the
    /// id is unknown.
    fn resolve(&self, frag_id: &str) -> Vec<String>;

    fn fetch(&self, location: &str) -> Result<Fragment, FetchError>;
}

/// Borrowed bundle of everything the passes consult.
pub struct Collaborators<'a> {
    pub records: &'a dyn RecordSource,
    pub functions: &'a dyn FunctionLibrary,
    pub fragments: &'a dyn FragmentResolver,
}

/// Interpreter-wide settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// In debug mode commands stay visible after processing instead of being
    /// marked done and discarded.
    pub debug_mode: bool,

    /// Content queue consumed by `insertContent` commands, one entry each.
    pub content_sources: Vec<String>,

    /// Raw toggle for the surplus-placeholder user warning. Only the exact
    /// tokens `true`, `on` and `1` enable it.
    pub extra_args_warning: Option<String>,
}

impl InterpreterConfig {
    pub fn warning_enabled(&self) -> bool {
        matches!(self.extra_args_warning.as_deref(), Some("true" | "on" | "1"))
    }
}
