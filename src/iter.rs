//! Iterator types for persistent collections.

use std::iter::FusedIterator;
use std::rc::Rc;
use std::slice;

use crate::array::PersistentArray;
use crate::node::{Entry, Node};

// ---------------------------------------------------------------------------
// Map iteration
// ---------------------------------------------------------------------------

/// Iterator over `(&K, &V)` pairs of a
/// [`PersistentHashMap`](crate::PersistentHashMap).
///
/// Walks the trie lazily in pre-order, children in slot order, collision
/// entries in storage order. Pending nodes are held as borrows of the map
/// they came from, so an iterator never keeps a trie version alive on its
/// own.
pub struct MapIter<'a, K, V> {
    pending: Vec<&'a Node<K, V>>,
    collision: slice::Iter<'a, Rc<Entry<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> MapIter<'a, K, V> {
    /// Starts a traversal of the trie rooted at `root` holding `len` entries.
    pub(crate) fn new(root: Option<&'a Node<K, V>>, len: usize) -> Self {
        Self {
            pending: root.into_iter().collect(),
            collision: slice::Iter::default(),
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for MapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.collision.next() {
                self.remaining -= 1;
                return Some((&entry.key, &entry.value));
            }
            match self.pending.pop()? {
                Node::Value(entry) => {
                    self.remaining -= 1;
                    return Some((&entry.key, &entry.value));
                }
                Node::Bitmap { children, .. } => {
                    // Reversed so the lowest slot is popped first.
                    self.pending.extend(children.iter().rev().map(|c| &**c));
                }
                Node::Collision(entries) => self.collision = entries.iter(),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for MapIter<'_, K, V> {}

impl<K, V> FusedIterator for MapIter<'_, K, V> {}

impl<K, V> Clone for MapIter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
            collision: self.collision.clone(),
            remaining: self.remaining,
        }
    }
}

// ---------------------------------------------------------------------------
// Array iteration
// ---------------------------------------------------------------------------

/// Iterator over clones of the elements of a [`PersistentArray`], front to
/// back or back to front.
///
/// Each step reads through the array, so iterating an outdated version
/// re-roots the version chain once and then reads in O(1).
pub struct ArrayIter<'a, T> {
    array: &'a PersistentArray<T>,
    front: usize,
    back: usize,
}

impl<'a, T> ArrayIter<'a, T> {
    pub(crate) const fn new(array: &'a PersistentArray<T>) -> Self {
        Self {
            array,
            front: 0,
            back: array.len(),
        }
    }
}

impl<T: Clone> Iterator for ArrayIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let value = self.array.get(self.front);
        self.front += 1;
        value
    }

    fn nth(&mut self, n: usize) -> Option<T> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<T: Clone> DoubleEndedIterator for ArrayIter<'_, T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        self.array.get(self.back)
    }

    fn nth_back(&mut self, n: usize) -> Option<T> {
        self.back = self.back.saturating_sub(n).max(self.front);
        self.next_back()
    }
}

impl<T: Clone> ExactSizeIterator for ArrayIter<'_, T> {}

impl<T: Clone> FusedIterator for ArrayIter<'_, T> {}

impl<T> Clone for ArrayIter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            array: self.array,
            front: self.front,
            back: self.back,
        }
    }
}
