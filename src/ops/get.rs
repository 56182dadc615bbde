//! Lookup: descends the trie to find a key.

use std::borrow::Borrow;

use crate::node::{self, Entry, Node};

/// Searches for `key` in the subtree rooted at `node`, which sits at trie
/// level `level`.
///
/// Returns the matching entry if found. Never allocates.
pub fn get_recursive<'a, K, V, Q>(
    node: &'a Node<K, V>,
    hash: u64,
    key: &Q,
    level: u32,
) -> Option<&'a Entry<K, V>>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    match node {
        Node::Value(entry) => {
            (entry.hash == hash && entry.key.borrow() == key).then_some(&**entry)
        }
        Node::Bitmap { bitmap, children } => {
            let bit = node::mask(node::fragment(hash, level));
            if bitmap & bit == 0 {
                // Slot is empty.
                return None;
            }
            let child = &children[node::index(*bitmap, bit)];
            get_recursive(child, hash, key, level + 1)
        }
        Node::Collision(entries) => entries
            .iter()
            .find(|e| e.hash == hash && e.key.borrow() == key)
            .map(|e| &**e),
    }
}
