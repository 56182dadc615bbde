//! Persistent collections with linear undo/redo.
//!
//! Two fully persistent containers: every modification returns a new
//! version and every earlier version stays readable and unchanged.
//!
//! - [`PersistentArray`] keeps all versions of one lineage in a single
//!   version chain. Reading an outdated version re-roots the chain at that
//!   version (Baker's trick), so modifications are O(1) and repeated reads
//!   through one handle are amortized O(1).
//! - [`PersistentHashMap`] is a hash array mapped trie with path copying:
//!   a modification rebuilds only the nodes between the root and the
//!   touched leaf and shares everything else.
//!
//! Each version also carries an immutable [`UndoRedoManager`], so
//! `c.op(x).undo()` equals `c` and `c.op(x).undo().redo()` equals
//! `c.op(x)`.
//!
//! # Key properties
//!
//! - **Persistence**: modifying operations take `&self` and never change
//!   what any existing handle observes
//! - **Single-threaded**: versions share `Rc` state and are neither `Send`
//!   nor `Sync`
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # References
//!
//! - Bagwell, 2001: "Ideal Hash Trees"
//! - Baker, 1991: "Shallow Binding Makes Functional Arrays Fast"

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod iter;
pub mod node;
pub mod undo;

mod array;
mod chain;
mod map;
mod ops;

#[cfg(test)]
mod tests;

pub use array::PersistentArray;
pub use error::{Error, Result};
pub use map::{DefaultHashBuilder, PersistentHashMap};
pub use undo::{UndoRedoManager, Undoable};
