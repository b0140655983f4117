//! # Scribe Document
//!
//! In-memory rich-text host document for the command interpreter.
//!
//! A [`TextDocument`] is a flat text buffer in which paragraphs are separated
//! by `'\n'`, decorated with three kinds of position-tracked objects:
//!
//! - **Anchors**: stable handles to half-open byte ranges, each carrying the
//!   declarative [`CommandSpec`] found at that position. Anchors shift as the
//!   surrounding text is edited; an anchor whose text is deleted disappears.
//! - **Text fields**: placeholder fields (fill-in targets) and refreshable
//!   fields (date/database style) sitting at byte positions.
//! - **Annotations**: inline notes attached to error markers.
//!
//! The document also owns the document-level metadata the interpreter
//! produces (type tag, print function, jump mark, visibility blocks, form
//! descriptors), the modified flag, a single view cursor, and the
//! view-update suppression counter used to bracket batched edits.
//!
//! ## Position discipline
//!
//! Every text mutation funnels through one splice primitive that remaps all
//! anchors, fields, annotations and the cursor in a single place. Containment
//! between anchors is never cached here; callers recompute it from offsets
//! after each mutation round.

mod anchor;
mod document;
mod field;
mod fragment;
mod meta;
mod view;

pub use anchor::{Anchor, AnchorId, CommandSpec, ScannedAnchor};
pub use document::{DocumentError, TextDocument};
pub use field::{FieldId, FieldKind, TextField};
pub use fragment::{Fragment, FragmentCommand, FragmentField};
pub use meta::{Annotation, DocumentMeta, FormDescriptor};
pub use view::ViewSuspension;

/// Width in bytes of one insertion-boundary marker (`<` or `>`).
pub const INSERT_MARK_LEN: usize = 1;

/// Opening insertion-boundary marker written in front of expanded content.
pub const INSERT_MARK_OPEN: char = '<';

/// Closing insertion-boundary marker written behind expanded content.
pub const INSERT_MARK_CLOSE: char = '>';
