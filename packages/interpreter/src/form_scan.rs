//! The form scan.
//!
//! Collects `form` descriptions into document metadata and builds the form
//! field model from `insertFormValue` commands. Neither command is ever
//! marked done; form documents are re-scanned on every open.

use crate::error_field::insert_error_field;
use scribe_commands::{Command, CommandVisitor};
use scribe_document::{AnchorId, FormDescriptor, TextDocument};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tracing::{debug, error};

/// One form field: an anchored range bound to a form field id.
#[derive(Debug, PartialEq, Eq)]
pub struct FormField {
    pub anchor: AnchorId,
    pub id: String,
}

/// The form field model of one document.
#[derive(Debug, Default)]
pub struct FormScanData {
    /// All fields bound to each form field id, in document order.
    pub id_to_fields: BTreeMap<String, Vec<Rc<FormField>>>,
    pub anchor_to_field: HashMap<AnchorId, Rc<FormField>>,
}

impl FormScanData {
    pub fn fields_for(&self, id: &str) -> &[Rc<FormField>] {
        self.id_to_fields.get(id).map_or(&[], Vec::as_slice)
    }
}

#[derive(Default)]
pub(crate) struct FormScanner {
    data: FormScanData,
}

impl FormScanner {
    pub(crate) fn into_data(self) -> FormScanData {
        self.data
    }
}

impl CommandVisitor for FormScanner {
    fn on_form(&mut self, doc: &mut TextDocument, cmd: &mut Command) -> usize {
        let Some(config) = cmd.spec().attr("config").map(str::to_string) else {
            if let Err(err) = insert_error_field(doc, cmd, "form command carries no description") {
                error!(%err, "could not place error marker");
            }
            return 1;
        };
        debug!(anchor = %cmd.anchor(), "registering form description");
        doc.add_form_descriptor(FormDescriptor { config });
        0
    }

    fn on_insert_form_value(&mut self, _doc: &mut TextDocument, cmd: &mut Command) -> usize {
        let anchor = cmd.anchor();
        // An anchor reachable through several tree paths still yields one
        // field.
        if self.data.anchor_to_field.contains_key(&anchor) {
            return 0;
        }
        let field = Rc::new(FormField {
            anchor,
            id: cmd.field_id().to_string(),
        });
        self.data
            .id_to_fields
            .entry(field.id.clone())
            .or_default()
            .push(Rc::clone(&field));
        self.data.anchor_to_field.insert(anchor, field);
        0
    }
}
