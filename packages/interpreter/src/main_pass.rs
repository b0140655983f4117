//! The main processing pass.
//!
//! Runs after expansion has settled: resolves `insertValue` and
//! `insertFunctionValue` against the collaborating data sources and turns
//! invalid commands into error markers.

use crate::context::Collaborators;
use crate::error_field::insert_error_field;
use scribe_commands::{Command, CommandVisitor};
use scribe_document::TextDocument;
use std::collections::BTreeMap;
use tracing::{debug, error};

/// Sentinel shown by `insertValue` when no record is selected.
pub const NO_RECORD_SENTINEL: &str = "<ERROR: no sender selected>";

pub(crate) struct MainProcessor<'a, 'c> {
    collab: &'a Collaborators<'c>,
    debug_mode: bool,
}

impl<'a, 'c> MainProcessor<'a, 'c> {
    pub(crate) fn new(collab: &'a Collaborators<'c>, debug_mode: bool) -> Self {
        Self { collab, debug_mode }
    }

    /// Run the optional value transform. A missing transform degrades to an
    /// inline sentinel instead of aborting the command.
    fn apply_optional_trafo(&self, trafo: Option<&str>, value: String) -> String {
        let Some(name) = trafo else {
            return value;
        };
        let Some(function) = self.collab.functions.lookup(name) else {
            error!(trafo = name, "value transform not defined");
            return format!("<ERROR: transform '{name}' not defined>");
        };
        // Every declared parameter receives the raw value.
        let args: BTreeMap<String, String> = function
            .parameters()
            .into_iter()
            .map(|param| (param, value.clone()))
            .collect();
        function.evaluate(&args)
    }

    fn write_value(&self, doc: &mut TextDocument, cmd: &mut Command, value: String) -> usize {
        let rendered = if value.is_empty() {
            // Empty values drop their separators with them.
            value
        } else {
            format!("{}{}{}", cmd.left_separator(), value, cmd.right_separator())
        };
        if let Err(err) = doc.replace_anchor_text(cmd.anchor(), &rendered) {
            error!(%err, anchor = %cmd.anchor(), "value insertion failed");
            return self.fail(doc, cmd, &err.to_string());
        }
        cmd.done = !self.debug_mode;
        0
    }

    fn fail(&self, doc: &mut TextDocument, cmd: &mut Command, message: &str) -> usize {
        if let Err(err) = insert_error_field(doc, cmd, message) {
            error!(%err, "could not place error marker");
        }
        1
    }
}

impl CommandVisitor for MainProcessor<'_, '_> {
    fn on_insert_value(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        let Some(record) = self.collab.records.selected() else {
            return self.write_value(doc, cmd, NO_RECORD_SENTINEL.to_string());
        };
        match record.get(cmd.column()) {
            Ok(value) => {
                debug!(column = cmd.column(), "inserting record value");
                let value = self.apply_optional_trafo(cmd.trafo(), value);
                self.write_value(doc, cmd, value)
            }
            Err(err) => self.fail(doc, cmd, &err.to_string()),
        }
    }

    fn on_insert_function_value(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        let name = cmd.function_name().to_string();
        let Some(function) = self.collab.functions.lookup(&name) else {
            let message = format!("<ERROR: function '{name}' not defined>");
            error!(function = %name, "document function not defined");
            if let Err(err) = doc.replace_anchor_text(cmd.anchor(), &message) {
                error!(%err, "could not place error text");
            }
            cmd.error_state = true;
            cmd.done = !self.debug_mode;
            return 1;
        };

        // Positional binding; surplus declared parameters stay unbound.
        let args: BTreeMap<String, String> = function
            .parameters()
            .into_iter()
            .zip(cmd.args().iter().cloned())
            .collect();
        let value = function.evaluate(&args);
        if let Err(err) = doc.replace_anchor_text(cmd.anchor(), &value) {
            error!(%err, anchor = %cmd.anchor(), "function value insertion failed");
            return self.fail(doc, cmd, &err.to_string());
        }
        cmd.done = !self.debug_mode;
        0
    }

    fn on_set_document_type(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        // Normally consumed by the settings scan; a stray survivor is still
        // honored here rather than reported.
        doc.set_document_type(cmd.type_name());
        cmd.done = true;
        0
    }

    fn on_invalid(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        let message = cmd
            .parse_error()
            .unwrap_or("invalid command")
            .to_string();
        self.fail(doc, cmd, &message)
    }
}
