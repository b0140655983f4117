//! # Scribe Commands
//!
//! The command model sitting between the host document and the interpreter:
//!
//! - [`CommandKind`]: the closed set of command names the interpreter
//!   understands, parsed from raw [`CommandSpec`]s. Unknown names and specs
//!   missing a required argument become [`CommandKind::Invalid`].
//! - [`Command`]: one discovered command anchor with its processing flags
//!   (done, executed, error state, insertion-marker bookkeeping).
//! - [`CommandTree`]: all commands of a document arranged by containment,
//!   rebuilt from a fresh scan after every mutation round.
//! - [`CommandVisitor`] and [`execute_depth_first`]: the traversal protocol
//!   every interpreter pass implements. Visitors return an error count;
//!   traversal sums them.

mod command;
mod executor;
mod kind;
mod tree;

pub use command::Command;
pub use executor::{execute_depth_first, CommandVisitor};
pub use kind::CommandKind;
pub use tree::CommandTree;
