//! Path-copying removal with leaf compaction.

use std::borrow::Borrow;
use std::rc::Rc;

use crate::node::{self, Node, NodeRef};

/// Outcome of a recursive remove.
pub enum RemoveOutcome<K, V> {
    /// Key was not found; the subtree is unchanged.
    NotFound,
    /// Key was removed. Holds the new subtree root, or `None` if the
    /// subtree is now empty.
    Removed(Option<NodeRef<K, V>>),
}

/// Removes `key` from the subtree rooted at `node`, which sits at trie
/// level `level`.
pub fn remove_recursive<K, V, Q>(
    node: &NodeRef<K, V>,
    hash: u64,
    key: &Q,
    level: u32,
) -> RemoveOutcome<K, V>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    match &**node {
        Node::Value(entry) => {
            if entry.hash == hash && entry.key.borrow() == key {
                RemoveOutcome::Removed(None)
            } else {
                RemoveOutcome::NotFound
            }
        }
        Node::Bitmap { bitmap, children } => {
            let bit = node::mask(node::fragment(hash, level));
            if bitmap & bit == 0 {
                return RemoveOutcome::NotFound;
            }
            let pos = node::index(*bitmap, bit);

            match remove_recursive(&children[pos], hash, key, level + 1) {
                RemoveOutcome::NotFound => RemoveOutcome::NotFound,
                RemoveOutcome::Removed(None) => {
                    // Child became empty: drop its slot.
                    compact(bitmap & !bit, node::children_removing(children, pos))
                }
                RemoveOutcome::Removed(Some(child)) => {
                    compact(*bitmap, node::children_replacing(children, pos, child))
                }
            }
        }
        Node::Collision(entries) => {
            let Some(pos) = entries
                .iter()
                .position(|e| e.hash == hash && e.key.borrow() == key)
            else {
                return RemoveOutcome::NotFound;
            };
            let mut remaining = entries.clone();
            remaining.remove(pos);
            if remaining.len() == 1 {
                // A lone survivor becomes a plain leaf.
                return RemoveOutcome::Removed(Some(Node::leaf(remaining.swap_remove(0))));
            }
            RemoveOutcome::Removed(Some(Rc::new(Node::Collision(remaining))))
        }
    }
}

/// Rebuilds a bitmap node after one of its slots changed.
///
/// A branch left with a single leaf collapses into that leaf, which the
/// parent then stores directly. Only leaves are lifted: a bitmap or
/// collision child is tied to its trie level and stays where it is.
fn compact<K, V>(bitmap: u32, children: Vec<NodeRef<K, V>>) -> RemoveOutcome<K, V> {
    debug_assert_eq!(children.len(), bitmap.count_ones() as usize);
    if children.is_empty() {
        return RemoveOutcome::Removed(None);
    }
    if children.len() == 1 && children[0].is_value() {
        return RemoveOutcome::Removed(Some(Rc::clone(&children[0])));
    }
    RemoveOutcome::Removed(Some(Rc::new(Node::Bitmap { bitmap, children })))
}
