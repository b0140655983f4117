//! The containment tree over all discovered commands.

use crate::command::Command;
use scribe_document::{AnchorId, TextDocument};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Range;
use tracing::debug;

/// All commands of one document, arranged by range containment.
///
/// The tree never caches positions; it is rebuilt from a fresh document scan
/// after every mutation round. Processing state on surviving commands is
/// carried over by anchor identity.
#[derive(Debug, Default)]
pub struct CommandTree {
    commands: HashMap<AnchorId, Command>,
    roots: Vec<AnchorId>,
    children: HashMap<AnchorId, Vec<AnchorId>>,
}

impl CommandTree {
    /// Discover all commands currently anchored in `doc`.
    pub fn scan(doc: &mut TextDocument) -> Self {
        let mut tree = Self::default();
        tree.rebuild(doc);
        tree
    }

    /// Re-scan the document and rebuild containment.
    ///
    /// Commands already marked done are discarded together with their
    /// anchors. Returns whether the command structure changed: a command
    /// appeared or vanished, or some parent/child relation moved. Pure
    /// position shifts do not count as change.
    pub fn rebuild(&mut self, doc: &mut TextDocument) -> bool {
        let old_ids: BTreeSet<AnchorId> = self.commands.keys().copied().collect();
        let old_parents = self.parent_map();

        let finished: Vec<AnchorId> = self
            .commands
            .iter()
            .filter(|(_, cmd)| cmd.done)
            .map(|(id, _)| *id)
            .collect();
        for id in &finished {
            debug!(anchor = %id, "discarding finished command");
            doc.remove_anchor(*id);
            self.commands.remove(id);
        }

        let scanned = doc.scan();
        let mut commands = HashMap::with_capacity(scanned.len());
        for entry in &scanned {
            let mut cmd = Command::new(entry.id, entry.spec.clone());
            if let Some(previous) = self.commands.get(&entry.id) {
                cmd.adopt_state(previous);
            }
            commands.insert(entry.id, cmd);
        }
        self.commands = commands;

        // Containment falls out of the scan order (start ascending, end
        // descending): an open anchor on the stack that no longer contains
        // the next entry is closed.
        self.roots.clear();
        self.children.clear();
        let mut stack: Vec<(AnchorId, Range<usize>)> = Vec::new();
        for entry in &scanned {
            while let Some((_, open)) = stack.last() {
                if TextDocument::range_contains(open, &entry.range) {
                    break;
                }
                stack.pop();
            }
            match stack.last() {
                Some((parent, _)) => self.children.entry(*parent).or_default().push(entry.id),
                None => self.roots.push(entry.id),
            }
            stack.push((entry.id, entry.range.clone()));
        }

        let new_ids: BTreeSet<AnchorId> = self.commands.keys().copied().collect();
        old_ids != new_ids || old_parents != self.parent_map()
    }

    fn parent_map(&self) -> BTreeMap<AnchorId, Option<AnchorId>> {
        let mut map: BTreeMap<AnchorId, Option<AnchorId>> =
            self.commands.keys().map(|id| (*id, None)).collect();
        for (parent, kids) in &self.children {
            for kid in kids {
                map.insert(*kid, Some(*parent));
            }
        }
        map
    }

    pub fn get(&self, id: AnchorId) -> Option<&Command> {
        self.commands.get(&id)
    }

    pub fn get_mut(&mut self, id: AnchorId) -> Option<&mut Command> {
        self.commands.get_mut(&id)
    }

    pub fn roots(&self) -> &[AnchorId] {
        &self.roots
    }

    pub fn children(&self, id: AnchorId) -> &[AnchorId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All commands in depth-first document order.
    pub fn pre_order(&self) -> Vec<AnchorId> {
        let mut out = Vec::with_capacity(self.commands.len());
        let mut stack: Vec<AnchorId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(kids) = self.children.get(&id) {
                stack.extend(kids.iter().rev().copied());
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }
}
