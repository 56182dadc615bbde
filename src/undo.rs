//! Linear undo/redo history shared by every collection.
//!
//! The history is itself persistent: a pair of immutable stacks whose
//! entries are shared between managers. Pushing, undoing and redoing all
//! return a new manager and leave the receiver untouched.
//!
//! Actions capture whole collection snapshots, not deltas, so undo and
//! redo cost O(1) whatever the recorded operation did.

use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};

/// Collections that can step backward and forward through their history.
pub trait Undoable<C = Self> {
    /// Returns the collection as it was before the most recent modification.
    ///
    /// # Panics
    ///
    /// Panics if there is nothing to undo.
    fn undo(&self) -> C;

    /// Re-applies the most recently undone modification.
    ///
    /// # Panics
    ///
    /// Panics if there is nothing to redo.
    fn redo(&self) -> C;
}

/// A reversible step recorded in an [`UndoRedoManager`].
///
/// Both directions receive the manager the resulting collection must carry.
pub trait UndoRedoAction<C> {
    /// Rebuilds the collection state preceding the action.
    fn apply_undo(&self, manager: UndoRedoManager<C>) -> C;

    /// Rebuilds the collection state following the action.
    fn apply_redo(&self, manager: UndoRedoManager<C>) -> C;
}

/// Shared handle to a recorded action.
pub type ActionPtr<C> = Rc<dyn UndoRedoAction<C>>;

/// [`UndoRedoAction`] built from a pair of closures.
pub struct FnAction<U, R> {
    undo: U,
    redo: R,
}

impl<C, U, R> UndoRedoAction<C> for FnAction<U, R>
where
    U: Fn(UndoRedoManager<C>) -> C,
    R: Fn(UndoRedoManager<C>) -> C,
{
    fn apply_undo(&self, manager: UndoRedoManager<C>) -> C {
        (self.undo)(manager)
    }

    fn apply_redo(&self, manager: UndoRedoManager<C>) -> C {
        (self.redo)(manager)
    }
}

/// Wraps an undo/redo closure pair into a shareable action.
pub fn action<C, U, R>(undo: U, redo: R) -> ActionPtr<C>
where
    U: Fn(UndoRedoManager<C>) -> C + 'static,
    R: Fn(UndoRedoManager<C>) -> C + 'static,
{
    Rc::new(FnAction { undo, redo })
}

// ---------------------------------------------------------------------------
// Persistent action stack
// ---------------------------------------------------------------------------

struct StackEntry<C> {
    action: ActionPtr<C>,
    next: Option<Rc<Self>>,
}

/// Immutable singly-linked stack; pushes share the tail.
struct ActionStack<C> {
    top: Option<Rc<StackEntry<C>>>,
}

impl<C> ActionStack<C> {
    const fn empty() -> Self {
        Self { top: None }
    }

    const fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    fn top(&self) -> Option<&ActionPtr<C>> {
        self.top.as_ref().map(|entry| &entry.action)
    }

    fn push(&self, action: ActionPtr<C>) -> Self {
        Self {
            top: Some(Rc::new(StackEntry {
                action,
                next: self.top.clone(),
            })),
        }
    }

    fn pop(&self) -> Self {
        Self {
            top: self.top.as_ref().and_then(|entry| entry.next.clone()),
        }
    }
}

impl<C> Clone for ActionStack<C> {
    fn clone(&self) -> Self {
        Self {
            top: self.top.clone(),
        }
    }
}

// Unwinds uniquely owned entries one by one; recursive drop of a long
// history would overflow the stack.
impl<C> Drop for ActionStack<C> {
    fn drop(&mut self) {
        let mut next = self.top.take();
        while let Some(entry) = next {
            match Rc::try_unwrap(entry) {
                Ok(mut entry) => next = entry.next.take(),
                Err(_) => break,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Immutable pair of undo and redo stacks.
pub struct UndoRedoManager<C> {
    undo_stack: ActionStack<C>,
    redo_stack: ActionStack<C>,
}

impl<C> UndoRedoManager<C> {
    /// Creates a manager with empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo_stack: ActionStack::empty(),
            redo_stack: ActionStack::empty(),
        }
    }

    /// Returns a manager with `action` on top of the undo stack and an
    /// empty redo stack.
    #[must_use]
    pub fn push_undo(&self, action: ActionPtr<C>) -> Self {
        Self {
            undo_stack: self.undo_stack.push(action),
            redo_stack: ActionStack::empty(),
        }
    }

    /// Returns `true` if an action can be undone.
    #[must_use]
    pub const fn has_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if an action can be redone.
    #[must_use]
    pub const fn has_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Moves the top undo action to the redo stack and applies its undo
    /// half.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToUndo`] if the undo stack is empty.
    pub fn try_undo(&self) -> Result<C> {
        let recent = self.undo_stack.top().ok_or(Error::NothingToUndo)?;
        let manager = Self {
            undo_stack: self.undo_stack.pop(),
            redo_stack: self.redo_stack.push(Rc::clone(recent)),
        };
        tracing::trace!(has_undo = manager.has_undo(), "undo applied");
        Ok(recent.apply_undo(manager))
    }

    /// Moves the top redo action to the undo stack and applies its redo
    /// half.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToRedo`] if the redo stack is empty.
    pub fn try_redo(&self) -> Result<C> {
        let recent = self.redo_stack.top().ok_or(Error::NothingToRedo)?;
        let manager = Self {
            undo_stack: self.undo_stack.push(Rc::clone(recent)),
            redo_stack: self.redo_stack.pop(),
        };
        tracing::trace!(has_redo = manager.has_redo(), "redo applied");
        Ok(recent.apply_redo(manager))
    }
}

impl<C> Undoable<C> for UndoRedoManager<C> {
    fn undo(&self) -> C {
        self.try_undo().unwrap_or_else(|e| panic!("{e}"))
    }

    fn redo(&self) -> C {
        self.try_redo().unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<C> Clone for UndoRedoManager<C> {
    fn clone(&self) -> Self {
        Self {
            undo_stack: self.undo_stack.clone(),
            redo_stack: self.redo_stack.clone(),
        }
    }
}

impl<C> Default for UndoRedoManager<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for UndoRedoManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoRedoManager")
            .field("has_undo", &self.has_undo())
            .field("has_redo", &self.has_redo())
            .finish()
    }
}
