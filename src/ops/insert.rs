//! Path-copying insertion.

use std::rc::Rc;

use crate::node::{self, Entry, MAX_DEPTH, Node, NodeRef};

/// Effect of an insert on the map's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertStatus {
    /// A new key was added; the map grew by one.
    Resized,
    /// An existing key received the new value.
    ModifiedExisting,
    /// Nothing changed; the returned node is the input node.
    Unchanged,
}

/// Outcome of a recursive insert.
pub struct InsertOutcome<K, V> {
    /// Root of the rebuilt subtree (the input node when `Unchanged`).
    pub node: NodeRef<K, V>,
    /// What the insert did.
    pub status: InsertStatus,
}

impl<K, V> InsertOutcome<K, V> {
    fn unchanged(node: &NodeRef<K, V>) -> Self {
        Self {
            node: Rc::clone(node),
            status: InsertStatus::Unchanged,
        }
    }
}

/// Inserts `entry` into the subtree rooted at `node`, which sits at trie
/// level `level`.
///
/// With `replace == false` an existing key keeps its value. Nodes off the
/// insertion path are shared with the input subtree.
pub fn insert_recursive<K: Eq, V>(
    node: &NodeRef<K, V>,
    entry: &Rc<Entry<K, V>>,
    replace: bool,
    level: u32,
) -> InsertOutcome<K, V> {
    match &**node {
        Node::Value(existing) => {
            if existing.hash == entry.hash && existing.key == entry.key {
                if !replace {
                    return InsertOutcome::unchanged(node);
                }
                InsertOutcome {
                    node: Node::leaf(Rc::clone(entry)),
                    status: InsertStatus::ModifiedExisting,
                }
            } else {
                InsertOutcome {
                    node: resolve_collision(node, existing.hash, entry, level),
                    status: InsertStatus::Resized,
                }
            }
        }
        Node::Bitmap { bitmap, children } => {
            let bit = node::mask(node::fragment(entry.hash, level));
            let pos = node::index(*bitmap, bit);

            if bitmap & bit == 0 {
                // Empty slot → new single-entry branch.
                let leaf = Node::leaf(Rc::clone(entry));
                let children = node::children_inserting(children, pos, leaf);
                return InsertOutcome {
                    node: Rc::new(Node::Bitmap {
                        bitmap: bitmap | bit,
                        children,
                    }),
                    status: InsertStatus::Resized,
                };
            }

            let child = &children[pos];
            let outcome = insert_recursive(child, entry, replace, level + 1);
            if Rc::ptr_eq(child, &outcome.node) {
                return InsertOutcome::unchanged(node);
            }
            InsertOutcome {
                node: Rc::new(Node::Bitmap {
                    bitmap: *bitmap,
                    children: node::children_replacing(children, pos, outcome.node),
                }),
                status: outcome.status,
            }
        }
        Node::Collision(entries) => insert_into_collision(node, entries, entry, replace),
    }
}

// ---------------------------------------------------------------------------
// Collision node insert
// ---------------------------------------------------------------------------

fn insert_into_collision<K: Eq, V>(
    node: &NodeRef<K, V>,
    entries: &[Rc<Entry<K, V>>],
    entry: &Rc<Entry<K, V>>,
    replace: bool,
) -> InsertOutcome<K, V> {
    let found = entries.iter().position(|e| e.key == entry.key);
    if found.is_some() && !replace {
        return InsertOutcome::unchanged(node);
    }

    // Any previous entry for the key is dropped, the new one goes last.
    let mut out = Vec::with_capacity(entries.len() + 1);
    out.extend(
        entries
            .iter()
            .enumerate()
            .filter(|&(i, _)| Some(i) != found)
            .map(|(_, e)| Rc::clone(e)),
    );
    out.push(Rc::clone(entry));

    InsertOutcome {
        node: Rc::new(Node::Collision(out)),
        status: if found.is_some() {
            InsertStatus::ModifiedExisting
        } else {
            InsertStatus::Resized
        },
    }
}

// ---------------------------------------------------------------------------
// Splitting a leaf
// ---------------------------------------------------------------------------

/// Builds the subtree holding both the `existing` leaf and `entry`, whose
/// keys differ but share every fragment above `level`.
///
/// Emits a chain of single-child bitmap nodes while the fragments keep
/// colliding and a collision node once [`MAX_DEPTH`] is passed.
fn resolve_collision<K, V>(
    existing: &NodeRef<K, V>,
    existing_hash: u64,
    entry: &Rc<Entry<K, V>>,
    level: u32,
) -> NodeRef<K, V> {
    if level > MAX_DEPTH {
        let Node::Value(existing_entry) = &**existing else {
            unreachable!("only leaves are split");
        };
        return Rc::new(Node::Collision(vec![
            Rc::clone(existing_entry),
            Rc::clone(entry),
        ]));
    }

    let frag_existing = node::fragment(existing_hash, level);
    let frag_inserted = node::fragment(entry.hash, level);

    if frag_existing == frag_inserted {
        // Still collided at this level.
        let child = resolve_collision(existing, existing_hash, entry, level + 1);
        Node::single(frag_existing, child)
    } else {
        Node::pair(
            frag_existing,
            Rc::clone(existing),
            frag_inserted,
            Node::leaf(Rc::clone(entry)),
        )
    }
}
