//! Fragment expansion.
//!
//! `insertFrag` and `insertContent` replace their anchored range with
//! external content. The inserted content may carry further commands, so the
//! interpreter drives this pass to a fixpoint: execute, rebuild the tree,
//! repeat until the command structure stops changing.
//!
//! Expanded commands are latched with `executed` rather than `done`; their
//! anchors must survive until garbage collection has removed the insertion
//! markers around the content.

use crate::context::{Collaborators, InterpreterConfig};
use crate::error_field::insert_error_field;
use scribe_commands::{Command, CommandVisitor};
use scribe_document::{Fragment, TextDocument};
use std::ops::Range;
use tracing::{debug, error, warn};

pub(crate) struct Expander<'a, 'c> {
    collab: &'a Collaborators<'c>,
    config: &'a InterpreterConfig,
    /// Set once the view cursor has been parked on the first unfilled
    /// placeholder. Later unfilled placeholders leave the cursor alone.
    placeholder_latched: bool,
    content_index: usize,
    user_messages: Vec<String>,
}

impl<'a, 'c> Expander<'a, 'c> {
    pub(crate) fn new(collab: &'a Collaborators<'c>, config: &'a InterpreterConfig) -> Self {
        Self {
            collab,
            config,
            placeholder_latched: false,
            content_index: 0,
            user_messages: Vec::new(),
        }
    }

    pub(crate) fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.user_messages)
    }

    /// Fill the placeholders of freshly inserted content from the command's
    /// positional arguments and park the view cursor.
    fn fill_placeholders(&mut self, doc: &mut TextDocument, cmd: &Command, content: Range<usize>) {
        let fields = doc.placeholders_in(&content);
        let args = cmd.args();

        for (j, field) in fields.iter().enumerate().take(args.len()) {
            if args[j].is_empty() {
                if !self.placeholder_latched {
                    if let Some(f) = doc.field(*field) {
                        doc.set_cursor(f.pos());
                        self.placeholder_latched = true;
                    }
                }
            } else if let Err(err) = doc.fill_placeholder(*field, &args[j]) {
                error!(%err, "placeholder fill failed");
            }
        }

        if fields.len() > args.len() {
            if !self.placeholder_latched {
                if let Some(f) = doc.field(fields[args.len()]) {
                    doc.set_cursor(f.pos());
                    self.placeholder_latched = true;
                }
            }
        } else {
            // Every placeholder is covered. Without an open placeholder the
            // cursor goes to the jump mark, if the template set one.
            if !self.placeholder_latched {
                if let Some(mark) = doc.jump_mark() {
                    if let Some(range) = doc.anchor_range(mark) {
                        doc.set_cursor(range.start);
                    }
                }
            }
            if fields.len() < args.len() {
                error!(
                    frag_id = cmd.frag_id(),
                    args = args.len(),
                    placeholders = fields.len(),
                    "surplus fragment arguments"
                );
                if self.config.warning_enabled() {
                    self.user_messages.push(format!(
                        "fragment '{}' received {} arguments but has only {} placeholders",
                        cmd.frag_id(),
                        args.len(),
                        fields.len()
                    ));
                }
            }
        }
    }

    /// Put `fragment` in place of the command's anchored range, bracketed by
    /// insertion markers, and fill its placeholders.
    fn expand(&mut self, doc: &mut TextDocument, cmd: &mut Command, fragment: &Fragment) -> usize {
        let content = match doc.insert_fragment(cmd.anchor(), fragment, true) {
            Ok(content) => content,
            Err(err) => {
                error!(%err, anchor = %cmd.anchor(), "fragment insertion failed");
                cmd.executed = true;
                return self.fail(doc, cmd, &err.to_string());
            }
        };
        cmd.has_insert_marks = true;
        cmd.executed = true;
        self.fill_placeholders(doc, cmd, content);
        0
    }

    fn fail(&mut self, doc: &mut TextDocument, cmd: &mut Command, message: &str) -> usize {
        if let Err(err) = insert_error_field(doc, cmd, message) {
            error!(%err, "could not place error marker");
        }
        cmd.executed = true;
        if cmd.manual_mode() {
            self.user_messages.push(message.to_string());
        }
        1
    }
}

impl CommandVisitor for Expander<'_, '_> {
    fn on_insert_fragment(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        if cmd.executed || cmd.error_state {
            return 0;
        }
        let frag_id = cmd.frag_id().to_string();
        let locations = self.collab.fragments.resolve(&frag_id);
        if locations.is_empty() {
            return self.fail(doc, cmd, &format!("fragment '{frag_id}' is not defined"));
        }

        let mut failures: Vec<String> = Vec::new();
        for location in &locations {
            match self.collab.fragments.fetch(location) {
                Ok(fragment) => {
                    debug!(%frag_id, %location, "expanding fragment");
                    return self.expand(doc, cmd, &fragment);
                }
                Err(err) => {
                    warn!(%frag_id, %location, %err, "fragment candidate failed");
                    failures.push(err.to_string());
                }
            }
        }
        let message = format!(
            "fragment '{frag_id}' could not be inserted: {}",
            failures.join("; ")
        );
        self.fail(doc, cmd, &message)
    }

    fn on_insert_content(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        if cmd.executed || cmd.error_state {
            return 0;
        }
        let Some(location) = self.config.content_sources.get(self.content_index).cloned() else {
            // The content queue ran dry; leave the command untouched.
            cmd.executed = true;
            return 0;
        };
        self.content_index += 1;

        match self.collab.fragments.fetch(&location) {
            Ok(fragment) => {
                debug!(%location, "merging queued content");
                self.expand(doc, cmd, &fragment)
            }
            Err(err) => self.fail(doc, cmd, &err.to_string()),
        }
    }
}
