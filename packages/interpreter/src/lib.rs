//! # Scribe Interpreter
//!
//! Executes the declarative commands anchored in a [`TextDocument`], in a
//! fixed pipeline:
//!
//! 1. **Settings scan** ([`Interpreter::scan_document_settings`]): lifts
//!    document-level commands into metadata before anything changes content.
//! 2. **Template execution** ([`Interpreter::execute_template_commands`]):
//!    - fragment expansion, driven to a fixpoint because inserted content
//!      may carry further commands,
//!    - field update inside `updateFields` ranges,
//!    - the main pass resolving values, functions and invalid commands,
//!    - surrounding-garbage collection removing the insertion markers,
//!    - the form scan building the form field model.
//!
//! Individual command failures never abort the pipeline. Each failed command
//! turns into an inline error marker with an annotation, and the total shows
//! up as [`InterpretError::CommandsFailed`] at the end.
//!
//! The interpreter owns no data; records, document functions and fragment
//! sources come in through the [`Collaborators`] traits.

mod context;
mod error_field;
mod expansion;
mod fields;
mod form_scan;
mod garbage;
mod main_pass;
mod settings;

pub use context::{
    Collaborators, ColumnNotFound, DocumentFunction, FetchError, FragmentResolver,
    FunctionLibrary, InterpreterConfig, Record, RecordSource,
};
pub use error_field::ERROR_MARK;
pub use form_scan::{FormField, FormScanData};
pub use main_pass::NO_RECORD_SENTINEL;

use crate::expansion::Expander;
use crate::fields::FieldUpdater;
use crate::form_scan::FormScanner;
use crate::garbage::GarbageCollector;
use crate::main_pass::MainProcessor;
use crate::settings::SettingsScanner;
use scribe_commands::{execute_depth_first, CommandTree};
use scribe_document::{DocumentError, TextDocument};
use thiserror::Error;
use tracing::info;

/// Hard cap on expansion rounds. Fragments that keep producing new
/// `insertFrag` commands past this bound are cyclic.
pub const MAX_EXPANSION_ITERATIONS: usize = 32;

#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("{errors} command(s) failed during template processing")]
    CommandsFailed { errors: usize },

    #[error("fragment expansion did not settle after {iterations} iterations")]
    ExpansionDiverged { iterations: usize },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// The document-command interpreter.
///
/// One interpreter serves one document run; it caches the form scan result
/// and accumulates the user-facing messages produced along the way.
pub struct Interpreter<'a> {
    collab: Collaborators<'a>,
    config: InterpreterConfig,
    form_scan: Option<FormScanData>,
    user_messages: Vec<String>,
    expansion_iterations: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(collab: Collaborators<'a>, config: InterpreterConfig) -> Self {
        Self {
            collab,
            config,
            form_scan: None,
            user_messages: Vec::new(),
            expansion_iterations: 0,
        }
    }

    /// Lift document-level commands into metadata.
    ///
    /// Runs on every document open, including already-processed ones, so it
    /// must not leave a trace: the modified flag is restored and view
    /// updates stay suppressed throughout.
    pub fn scan_document_settings(&mut self, doc: &mut TextDocument, tree: &mut CommandTree) {
        let was_modified = doc.is_modified();
        {
            let _quiet = doc.suppress_view_updates();
            let mut scanner = SettingsScanner;
            execute_depth_first(&mut scanner, tree, doc);
            tree.rebuild(doc);
        }
        doc.set_modified(was_modified);
    }

    /// Run the full template pipeline.
    ///
    /// The modified flag is restored afterwards; opening a template is not
    /// an edit. Failed commands are counted, not fatal.
    pub fn execute_template_commands(
        &mut self,
        doc: &mut TextDocument,
        tree: &mut CommandTree,
    ) -> Result<(), InterpretError> {
        let was_modified = doc.is_modified();
        let result = self.run_template_passes(doc, tree);
        doc.set_modified(was_modified);
        match result? {
            0 => Ok(()),
            errors => Err(InterpretError::CommandsFailed { errors }),
        }
    }

    fn run_template_passes(
        &mut self,
        doc: &mut TextDocument,
        tree: &mut CommandTree,
    ) -> Result<usize, InterpretError> {
        let _quiet = doc.suppress_view_updates();
        let mut errors = 0;

        // Expansion runs to a fixpoint; inserted fragments may carry further
        // commands, including more insertFrag.
        let mut expander = Expander::new(&self.collab, &self.config);
        let mut iterations = 0;
        loop {
            if iterations >= MAX_EXPANSION_ITERATIONS {
                return Err(InterpretError::ExpansionDiverged { iterations });
            }
            iterations += 1;
            errors += execute_depth_first(&mut expander, tree, doc);
            if !tree.rebuild(doc) {
                break;
            }
        }
        self.expansion_iterations = iterations;
        let messages = expander.take_messages();
        self.user_messages.extend(messages);

        errors += execute_depth_first(&mut FieldUpdater::new(self.config.debug_mode), tree, doc);

        let mut main = MainProcessor::new(&self.collab, self.config.debug_mode);
        errors += execute_depth_first(&mut main, tree, doc);

        let mut gc = GarbageCollector::new(self.config.debug_mode);
        errors += execute_depth_first(&mut gc, tree, doc);
        gc.remove_garbage(doc)?;
        tree.rebuild(doc);

        let mut scanner = FormScanner::default();
        errors += execute_depth_first(&mut scanner, tree, doc);
        self.form_scan = Some(scanner.into_data());
        // Carrying a form description makes this a form document, whatever
        // an earlier setType said.
        if doc.has_form_descriptors() {
            doc.set_document_type("formDocument");
        }

        info!(
            errors,
            iterations = self.expansion_iterations,
            "template processing finished"
        );
        Ok(errors)
    }

    /// Build the form field model of an already-processed form document.
    ///
    /// A no-op when template execution already ran the scan.
    pub fn scan_form_elements(
        &mut self,
        doc: &mut TextDocument,
        tree: &mut CommandTree,
    ) -> Result<(), InterpretError> {
        if self.form_scan.is_some() {
            return Ok(());
        }
        let was_modified = doc.is_modified();
        let mut scanner = FormScanner::default();
        let errors = execute_depth_first(&mut scanner, tree, doc);
        self.form_scan = Some(scanner.into_data());
        doc.set_modified(was_modified);
        match errors {
            0 => Ok(()),
            errors => Err(InterpretError::CommandsFailed { errors }),
        }
    }

    pub fn form_data(&self) -> Option<&FormScanData> {
        self.form_scan.as_ref()
    }

    /// Messages to surface to the user after processing.
    pub fn user_messages(&self) -> &[String] {
        &self.user_messages
    }

    /// How many expansion rounds the last template run took.
    pub fn expansion_iterations(&self) -> usize {
        self.expansion_iterations
    }
}
