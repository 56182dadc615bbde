//! Persistent hash map façade over the HAMT engine.

use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};
use std::ops;
use std::rc::Rc;

use crate::error::Result;
use crate::iter::MapIter;
use crate::node::{Entry, Node, NodeRef};
use crate::ops::get::get_recursive;
use crate::ops::insert::{InsertStatus, insert_recursive};
use crate::ops::remove::{RemoveOutcome, remove_recursive};
use crate::undo::{self, UndoRedoManager, Undoable};

/// Hasher used when none is given: deterministic across runs.
pub type DefaultHashBuilder = BuildHasherDefault<DefaultHasher>;

/// Persistent hash map backed by a hash array mapped trie.
///
/// Every modification returns a new map and leaves the receiver untouched.
/// Versions share all trie nodes off the modified path, so a modification
/// costs O(trie depth) allocations. Each map also carries its own linear
/// undo/redo history.
pub struct PersistentHashMap<K, V, S = DefaultHashBuilder> {
    root: Option<NodeRef<K, V>>,
    size: usize,
    hasher: S,
    history: UndoRedoManager<Self>,
}

// ---------------------------------------------------------------------------
// Construction & accessors
// ---------------------------------------------------------------------------

impl<K, V> PersistentHashMap<K, V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V, S> PersistentHashMap<K, V, S> {
    /// Creates an empty map hashing keys with `hasher`.
    #[must_use]
    pub const fn with_hasher(hasher: S) -> Self {
        Self {
            root: None,
            size: 0,
            hasher,
            history: UndoRedoManager::new(),
        }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the map's hasher.
    #[must_use]
    pub const fn hasher(&self) -> &S {
        &self.hasher
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

    /// Returns the map as it was before its most recent modification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToUndo`](crate::Error::NothingToUndo) if the
    /// history is empty.
    pub fn try_undo(&self) -> Result<Self> {
        self.history.try_undo()
    }

    /// Re-applies the most recently undone modification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToRedo`](crate::Error::NothingToRedo) if
    /// nothing was undone since the last modification.
    pub fn try_redo(&self) -> Result<Self> {
        self.history.try_redo()
    }

    /// Returns the map as it was before its most recent modification.
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

    /// Returns an iterator over `(&K, &V)` pairs in unspecified order.
    ///
    /// The order is stable for a given trie shape; every call starts a fresh
    /// traversal.
    #[must_use]
    pub fn iter(&self) -> MapIter<'_, K, V> {
        MapIter::new(self.root.as_deref(), self.size)
    }
}

// ---------------------------------------------------------------------------
// Read operations (K: Hash + Eq)
// ---------------------------------------------------------------------------

impl<K: Hash + Eq, V, S: BuildHasher> PersistentHashMap<K, V, S> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let root = self.root.as_deref()?;
        get_recursive(root, self.hasher.hash_one(key), key, 0).map(|e| &e.value)
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }
}

// ---------------------------------------------------------------------------
// Write operations: each returns a new map with an undo entry
// ---------------------------------------------------------------------------

impl<K, V, S> PersistentHashMap<K, V, S>
where
    K: Hash + Eq + 'static,
    V: 'static,
    S: BuildHasher + Clone + 'static,
{
    /// Returns a map with `key` bound to `value`, replacing any previous
    /// binding.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let (root, size) = self.inserted(key, value, true);
        self.modify(root, size)
    }

    /// Returns a map with `key` bound to `value` unless `key` is already
    /// present, in which case the existing binding is kept.
    #[must_use]
    pub fn insert_if_absent(&self, key: K, value: V) -> Self {
        let (root, size) = self.inserted(key, value, false);
        self.modify(root, size)
    }

    /// Returns a map without `key`. Removing an absent key yields an equal
    /// map.
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(root) = &self.root else {
            return self.modify(None, 0);
        };
        match remove_recursive(root, self.hasher.hash_one(key), key, 0) {
            RemoveOutcome::NotFound => self.modify(self.root.clone(), self.size),
            RemoveOutcome::Removed(node) => self.modify(node, self.size - 1),
        }
    }

    /// Computes the root and size after inserting, without touching history.
    fn inserted(&self, key: K, value: V, replace: bool) -> (Option<NodeRef<K, V>>, usize) {
        let hash = self.hasher.hash_one(&key);
        let entry = Rc::new(Entry { hash, key, value });

        let Some(root) = &self.root else {
            return (Some(Node::leaf(entry)), 1);
        };
        let outcome = insert_recursive(root, &entry, replace, 0);
        // Only a genuinely new key grows the map.
        let size = match outcome.status {
            InsertStatus::Resized => self.size + 1,
            InsertStatus::ModifiedExisting | InsertStatus::Unchanged => self.size,
        };
        (Some(outcome.node), size)
    }

    /// Returns the map `(root, size)` and records the transition from the
    /// current state in the undo history.
    ///
    /// An unchanged root still records an (identity) action so that `undo`
    /// is valid after every modifying call.
    fn modify(&self, root: Option<NodeRef<K, V>>, size: usize) -> Self {
        let before = Self::snapshot(self.root.clone(), self.size, self.hasher.clone());
        let after = Self::snapshot(root, size, self.hasher.clone());
        let history = self.history.push_undo(undo::action(before, after.clone()));
        after(history)
    }

    fn snapshot(
        root: Option<NodeRef<K, V>>,
        size: usize,
        hasher: S,
    ) -> impl Fn(UndoRedoManager<Self>) -> Self + Clone + 'static {
        move |history| Self {
            root: root.clone(),
            size,
            hasher: hasher.clone(),
            history,
        }
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, V, S> Undoable for PersistentHashMap<K, V, S> {
    fn undo(&self) -> Self {
        self.history.undo()
    }

    fn redo(&self) -> Self {
        self.history.redo()
    }
}

impl<K, V, S: Clone> Clone for PersistentHashMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            size: self.size,
            hasher: self.hasher.clone(),
            history: self.history.clone(),
        }
    }
}

impl<K, V, S: Default> Default for PersistentHashMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> fmt::Debug for PersistentHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentHashMap")
            .field("len", &self.size)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

/// Same size and every key bound to an equal value, in any order.
impl<K, V, S> PartialEq for PersistentHashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.size != other.size {
            return false;
        }
        if let (Some(a), Some(b)) = (&self.root, &other.root)
            && Rc::ptr_eq(a, b)
        {
            return true;
        }
        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Hash + Eq, V: Eq, S: BuildHasher> Eq for PersistentHashMap<K, V, S> {}

/// Later duplicates replace earlier ones. The result has an empty history.
impl<K, V, S> FromIterator<(K, V)> for PersistentHashMap<K, V, S>
where
    K: Hash + Eq + 'static,
    V: 'static,
    S: BuildHasher + Clone + Default + 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        for (k, v) in iter {
            (map.root, map.size) = map.inserted(k, v, true);
        }
        map
    }
}

/// Each element is applied as one undoable insert.
impl<K, V, S> Extend<(K, V)> for PersistentHashMap<K, V, S>
where
    K: Hash + Eq + 'static,
    V: 'static,
    S: BuildHasher + Clone + 'static,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            *self = self.insert(k, v);
        }
    }
}

impl<K, Q, V, S> ops::Index<&Q> for PersistentHashMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V, S> IntoIterator for &'a PersistentHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = MapIter<'a, K, V>;

    fn into_iter(self) -> MapIter<'a, K, V> {
        self.iter()
    }
}
