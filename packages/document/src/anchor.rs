//! Anchors: stable range handles carrying command declarations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Stable identity of an anchor. Survives arbitrary text edits until the
/// anchored text itself is deleted or the anchor is removed explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(pub(crate) u32);

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anchor-{}", self.0)
    }
}

/// The declarative payload of an anchor, as produced by the host's command
/// parser: a command name, positional arguments and named arguments.
///
/// The configuration-language parser itself lives outside this workspace;
/// specs arrive pre-split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    pub args: Vec<String>,
    pub attrs: BTreeMap<String, String>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

/// An anchored command declaration inside the document.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub(crate) range: Range<usize>,
    pub(crate) spec: CommandSpec,
}

impl Anchor {
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }
}

/// One entry of a document scan, in document order.
#[derive(Debug, Clone)]
pub struct ScannedAnchor {
    pub id: AnchorId,
    pub spec: CommandSpec,
    pub range: Range<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_serializes_with_attrs() {
        let spec = CommandSpec::new("insertFrag")
            .with_arg("greeting")
            .with_attr("frag_id", "greeting");
        let json = serde_json::to_string(&spec).unwrap();
        let back: CommandSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
        assert_eq!(back.attr("frag_id"), Some("greeting"));
        assert_eq!(back.attr("missing"), None);
    }
}
