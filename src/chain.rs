//! Version chain behind persistent arrays.
//!
//! All versions derived from one origin form a tree of nodes linked toward
//! a single root. The root owns the backing slots; every other node is a
//! change set overriding one index of its parent. Reading through a deep
//! node re-roots the chain at that node (Baker's trick): parent links on
//! the path are reversed and overrides are swapped into the slots, so the
//! reader becomes O(1) while every other version still reconstructs the
//! same contents.
//!
//! Re-rooting mutates shared nodes in place; it is invisible to handles
//! only because the collections are single-threaded.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

/// Node payload: backing slots for the root, one override otherwise.
///
/// Each node owns its values, so dropping the last version that reaches a
/// change set drops the value it overrides with.
enum Payload<T> {
    Root(Vec<T>),
    ChangeSet { index: usize, value: T },
}

/// Shared reference to a version node.
pub type VersionRef<T> = Rc<VersionNode<T>>;

/// One version of an array lineage.
pub struct VersionNode<T> {
    payload: RefCell<Payload<T>>,
    parent: RefCell<Option<VersionRef<T>>>,
}

impl<T> VersionNode<T> {
    /// Creates the root of a new lineage over `slots`.
    pub fn root(slots: Vec<T>) -> VersionRef<T> {
        Rc::new(Self {
            payload: RefCell::new(Payload::Root(slots)),
            parent: RefCell::new(None),
        })
    }

    /// Creates a version differing from `parent` only at `index`.
    pub fn change_set(parent: VersionRef<T>, index: usize, value: T) -> VersionRef<T> {
        Rc::new(Self {
            payload: RefCell::new(Payload::ChangeSet { index, value }),
            parent: RefCell::new(Some(parent)),
        })
    }

    /// Returns `true` if this node owns the backing slots.
    pub fn is_root(&self) -> bool {
        matches!(*self.payload.borrow(), Payload::Root(_))
    }

    /// Returns `true` if this node answers for `index` without consulting
    /// its parent.
    pub fn contains(&self, index: usize) -> bool {
        match &*self.payload.borrow() {
            Payload::Root(slots) => index < slots.len(),
            Payload::ChangeSet { index: own, .. } => *own == index,
        }
    }

    /// Applies `f` to the value this node holds for `index`, if any.
    pub fn read<R>(&self, index: usize, f: impl FnOnce(&T) -> R) -> Option<R> {
        match &*self.payload.borrow() {
            Payload::Root(slots) => slots.get(index).map(f),
            Payload::ChangeSet { index: own, value } => (*own == index).then(|| f(value)),
        }
    }

    /// Appends a slot to the backing storage.
    ///
    /// # Panics
    ///
    /// Panics if this node is not the root.
    pub fn extend(&self, value: T) {
        let mut payload = self.payload.borrow_mut();
        let Payload::Root(slots) = &mut *payload else {
            panic!("only the root node owns backing storage");
        };
        slots.push(value);
    }

    /// Walks parent links up to the lineage root.
    pub fn find_root(node: &VersionRef<T>) -> VersionRef<T> {
        let mut current = Rc::clone(node);
        loop {
            let parent = current.parent.borrow().clone();
            match parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    /// Makes `node` the root of its lineage.
    ///
    /// Returns the number of change sets moved off the path.
    pub fn reroot(node: &VersionRef<T>) -> usize {
        let mut path = Vec::new();
        let mut root = Rc::clone(node);
        while !root.is_root() {
            let parent = root
                .reparent(None)
                .expect("change-set node always has a parent");
            path.push(root);
            root = parent;
        }

        let depth = path.len();
        // Nearest to the old root first.
        while let Some(next) = path.pop() {
            root.sift_up_root(&next);
            root.reparent(Some(Rc::clone(&next)));
            root = next;
        }
        depth
    }

    fn reparent(&self, parent: Option<VersionRef<T>>) -> Option<VersionRef<T>> {
        self.parent.replace(parent)
    }

    /// Hands root ownership from `self` to its child `other`.
    ///
    /// The override held by `other` goes into the slots and the value it
    /// displaces becomes `self`'s override, then the payloads trade places.
    fn sift_up_root(&self, other: &Self) {
        {
            let mut mine = self.payload.borrow_mut();
            let mut theirs = other.payload.borrow_mut();
            let (Payload::Root(slots), Payload::ChangeSet { index, value }) =
                (&mut *mine, &mut *theirs)
            else {
                panic!("sift up requires a root and a change set");
            };
            mem::swap(&mut slots[*index], value);
        }
        self.payload.swap(&other.payload);
    }
}

// Unwinds uniquely owned ancestors iteratively; heavy modification builds
// chains long enough to overflow a recursive drop.
impl<T> Drop for VersionNode<T> {
    fn drop(&mut self) {
        let mut next = self.parent.get_mut().take();
        while let Some(node) = next {
            next = match Rc::try_unwrap(node) {
                Ok(mut node) => node.parent.get_mut().take(),
                Err(_) => None,
            };
        }
    }
}
