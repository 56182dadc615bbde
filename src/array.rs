//! Persistent array façade over the re-rooting version chain.

use std::fmt;
use std::rc::Rc;

use crate::chain::{VersionNode, VersionRef};
use crate::error::{Error, Result};
use crate::iter::ArrayIter;
use crate::undo::{self, UndoRedoManager, Undoable};

/// Fully persistent array.
///
/// Every modification returns a new array and leaves the receiver
/// untouched. `set_value`, `push_back` and `pop_back` are O(1); reads are
/// amortized O(1) per handle because a read through an outdated version
/// re-roots the shared version chain at that version.
///
/// Values are returned by clone. Arrays are single-threaded: handles of one
/// lineage share mutable chain state. A value written by `set_value` is
/// dropped together with the last version that can reach it.
pub struct PersistentArray<T> {
    node: VersionRef<T>,
    size: usize,
    history: UndoRedoManager<Self>,
}

// ---------------------------------------------------------------------------
// Construction & accessors
// ---------------------------------------------------------------------------

impl<T> PersistentArray<T> {
    /// Creates an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self::from_values(Vec::new())
    }

    /// Creates an array holding `count` clones of `value`.
    #[must_use]
    pub fn with_len(count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::from_values(std::iter::repeat_n(value, count).collect())
    }

    fn from_values(values: Vec<T>) -> Self {
        Self {
            size: values.len(),
            node: VersionNode::root(values),
            history: UndoRedoManager::new(),
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the array holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns `true` if a modification can be undone.
    #[must_use]
    pub const fn has_undo(&self) -> bool {
        self.history.has_undo()
    }

    /// Returns `true` if an undone modification can be redone.
    #[must_use]
    pub const fn has_redo(&self) -> bool {
        self.history.has_redo()
    }

    /// Returns the array as it was before its most recent modification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToUndo`] if the history is empty.
    pub fn try_undo(&self) -> Result<Self> {
        self.history.try_undo()
    }

    /// Re-applies the most recently undone modification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToRedo`] if nothing was undone since the last
    /// modification.
    pub fn try_redo(&self) -> Result<Self> {
        self.history.try_redo()
    }

    /// Returns the array as it was before its most recent modification.
    ///
    /// # Panics
    ///
    /// Panics if the history is empty.
    #[must_use]
    pub fn undo(&self) -> Self {
        self.history.undo()
    }

    /// Re-applies the most recently undone modification.
    ///
    /// # Panics
    ///
    /// Panics if nothing was undone since the last modification.
    #[must_use]
    pub fn redo(&self) -> Self {
        self.history.redo()
    }

    /// Applies `f` to the value at `index < size`, re-rooting the chain at
    /// this version when the node does not hold it directly.
    fn read<R>(&self, index: usize, f: impl FnOnce(&T) -> R) -> R {
        if !self.node.contains(index) {
            let depth = VersionNode::reroot(&self.node);
            tracing::trace!(depth, index, "re-rooted array version chain");
        }
        self.node
            .read(index, f)
            .expect("root storage covers every index below the array length")
    }

    #[cfg(test)]
    pub(crate) fn holds_root(&self) -> bool {
        self.node.is_root()
    }

    const fn check_index(&self, index: usize) -> Result<()> {
        if index < self.size {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.size,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Read operations (T: Clone)
// ---------------------------------------------------------------------------

impl<T: Clone> PersistentArray<T> {
    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= len()`.
    pub fn try_value(&self, index: usize) -> Result<T> {
        self.check_index(index)?;
        Ok(self.read(index, T::clone))
    }

    /// Returns the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn value(&self, index: usize) -> T {
        self.try_value(index).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Returns the element at `index`, or `None` if out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.try_value(index).ok()
    }

    /// Returns the first element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCollection`] if the array is empty.
    pub fn try_front(&self) -> Result<T> {
        if self.is_empty() {
            return Err(Error::EmptyCollection { operation: "front" });
        }
        self.try_value(0)
    }

    /// Returns the last element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCollection`] if the array is empty.
    pub fn try_back(&self) -> Result<T> {
        if self.is_empty() {
            return Err(Error::EmptyCollection { operation: "back" });
        }
        self.try_value(self.size - 1)
    }

    /// Returns the first element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[must_use]
    pub fn front(&self) -> T {
        self.try_front().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Returns the last element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[must_use]
    pub fn back(&self) -> T {
        self.try_back().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Returns a double-ended iterator over clones of the elements.
    #[must_use]
    pub fn iter(&self) -> ArrayIter<'_, T> {
        ArrayIter::new(self)
    }
}

// ---------------------------------------------------------------------------
// Write operations: each returns a new array with an undo entry
// ---------------------------------------------------------------------------

impl<T: 'static> PersistentArray<T> {
    /// Returns an array with the element at `index` replaced by `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= len()`.
    pub fn try_set_value(&self, index: usize, value: T) -> Result<Self> {
        self.check_index(index)?;
        let node = VersionNode::change_set(Rc::clone(&self.node), index, value);
        Ok(self.modify(node, self.size))
    }

    /// Returns an array with the element at `index` replaced by `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn set_value(&self, index: usize, value: T) -> Self {
        self.try_set_value(index, value)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Returns an array with `value` appended.
    ///
    /// When no version of the lineage has used the slot past this array's
    /// end, the shared storage grows in place and the new array reuses this
    /// array's node; otherwise the new element is recorded as a change set.
    #[must_use]
    pub fn push_back(&self, value: T) -> Self {
        let root = VersionNode::find_root(&self.node);

        if root.contains(self.size) {
            // A sibling version already owns this slot.
            tracing::trace!(index = self.size, "push_back recorded as change set");
            let node = VersionNode::change_set(Rc::clone(&self.node), self.size, value);
            self.modify(node, self.size + 1)
        } else {
            tracing::trace!(index = self.size, "push_back extended root storage");
            root.extend(value);
            self.modify(Rc::clone(&self.node), self.size + 1)
        }
    }

    /// Returns an array without its last element.
    ///
    /// The element stays in the version chain; only the length shrinks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCollection`] if the array is empty.
    pub fn try_pop_back(&self) -> Result<Self> {
        if self.is_empty() {
            return Err(Error::EmptyCollection {
                operation: "pop_back",
            });
        }
        Ok(self.modify(Rc::clone(&self.node), self.size - 1))
    }

    /// Returns an array without its last element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[must_use]
    pub fn pop_back(&self) -> Self {
        self.try_pop_back().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Returns the array `(node, size)` and records the transition from the
    /// current state in the undo history.
    fn modify(&self, node: VersionRef<T>, size: usize) -> Self {
        let before = Self::snapshot(Rc::clone(&self.node), self.size);
        let after = Self::snapshot(node, size);
        let history = self.history.push_undo(undo::action(before, after.clone()));
        after(history)
    }

    fn snapshot(
        node: VersionRef<T>,
        size: usize,
    ) -> impl Fn(UndoRedoManager<Self>) -> Self + Clone + 'static {
        move |history| Self {
            node: Rc::clone(&node),
            size,
            history,
        }
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<T> Undoable for PersistentArray<T> {
    fn undo(&self) -> Self {
        self.history.undo()
    }

    fn redo(&self) -> Self {
        self.history.redo()
    }
}

impl<T> Clone for PersistentArray<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
            size: self.size,
            history: self.history.clone(),
        }
    }
}

impl<T> Default for PersistentArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PersistentArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentArray")
            .field("len", &self.size)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

/// Same length and equal elements position by position.
///
/// `self` is read out in full before `other` is touched, so each side
/// re-roots the shared chain at most once.
impl<T: Clone + PartialEq> PartialEq for PersistentArray<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.size != other.size {
            return false;
        }
        if Rc::ptr_eq(&self.node, &other.node) {
            return true;
        }
        let mine: Vec<T> = self.iter().collect();
        mine.into_iter().eq(other.iter())
    }
}

impl<T: Clone + Eq> Eq for PersistentArray<T> {}

impl<T> From<Vec<T>> for PersistentArray<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_values(values)
    }
}

/// The result has an empty history.
impl<T> FromIterator<T> for PersistentArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(iter.into_iter().collect())
    }
}

impl<'a, T: Clone> IntoIterator for &'a PersistentArray<T> {
    type Item = T;
    type IntoIter = ArrayIter<'a, T>;

    fn into_iter(self) -> ArrayIter<'a, T> {
        self.iter()
    }
}
