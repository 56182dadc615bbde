//! HAMT node types and bitmap helpers.
//!
//! Nodes are immutable once built and shared between map versions through
//! [`Rc`]. A modification rebuilds only the nodes on the path from the
//! root to the touched leaf; every other subtree is reused by reference.

use std::fmt;
use std::rc::Rc;

/// Bits of the hash consumed per trie level (5 → 32-way branching).
pub const BITS_PER_LEVEL: u32 = 5;

/// Mask selecting one level's worth of hash bits.
pub const BIT_MASK: u64 = 0x1F;

/// Number of slots in a bitmap node.
pub const CAPACITY: u32 = 32;

/// Deepest level addressed by hash bits: `64 / 5 - 1`.
///
/// Two distinct keys still sharing a slot below this level end up in a
/// [`Node::Collision`].
pub const MAX_DEPTH: u32 = u64::BITS / BITS_PER_LEVEL - 1;

/// Key-value pair with the precomputed hash of its key.
pub struct Entry<K, V> {
    /// Hash of `key` under the owning map's hasher.
    pub hash: u64,
    /// The key.
    pub key: K,
    /// The value.
    pub value: V,
}

/// Shared reference to a trie node.
pub type NodeRef<K, V> = Rc<Node<K, V>>;

/// HAMT trie node.
pub enum Node<K, V> {
    /// Leaf holding exactly one entry.
    Value(Rc<Entry<K, V>>),
    /// Branch with one child per set bit.
    ///
    /// Invariant: `children.len() == bitmap.count_ones()`, and the child at
    /// position `k` belongs to the `k`-th set bit in ascending order.
    Bitmap {
        /// Occupied slots.
        bitmap: u32,
        /// Dense children, ordered by slot.
        children: Vec<NodeRef<K, V>>,
    },
    /// Entries whose hashes agree on every level down to [`MAX_DEPTH`].
    ///
    /// Invariant: at least two entries, keys pairwise distinct.
    Collision(Vec<Rc<Entry<K, V>>>),
}

// ---------------------------------------------------------------------------
// Bitmap helpers
// ---------------------------------------------------------------------------

/// Extracts the 5-bit hash fragment governing trie level `level`.
#[inline]
#[must_use]
pub const fn fragment(hash: u64, level: u32) -> u32 {
    ((hash >> (BITS_PER_LEVEL * level)) & BIT_MASK) as u32
}

/// Returns the single-bit mask for the given fragment (0..31).
#[inline]
#[must_use]
pub const fn mask(frag: u32) -> u32 {
    1 << frag
}

/// Returns the dense index of `bit` within `bitmap`.
///
/// Counts the number of set bits below `bit`.
#[inline]
#[must_use]
pub const fn index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

// ---------------------------------------------------------------------------
// Constructors and path-copy primitives
// ---------------------------------------------------------------------------

impl<K, V> Node<K, V> {
    /// Creates a shared leaf for `entry`.
    #[must_use]
    pub fn leaf(entry: Rc<Entry<K, V>>) -> NodeRef<K, V> {
        Rc::new(Self::Value(entry))
    }

    /// Creates a bitmap node holding `child` at fragment `frag`.
    #[must_use]
    pub fn single(frag: u32, child: NodeRef<K, V>) -> NodeRef<K, V> {
        Rc::new(Self::Bitmap {
            bitmap: mask(frag),
            children: vec![child],
        })
    }

    /// Creates a bitmap node holding two children at distinct fragments,
    /// ordered by ascending fragment.
    #[must_use]
    pub fn pair(
        frag_a: u32,
        a: NodeRef<K, V>,
        frag_b: u32,
        b: NodeRef<K, V>,
    ) -> NodeRef<K, V> {
        debug_assert_ne!(frag_a, frag_b, "pair fragments must differ");
        let children = if frag_a < frag_b { vec![a, b] } else { vec![b, a] };
        Rc::new(Self::Bitmap {
            bitmap: mask(frag_a) | mask(frag_b),
            children,
        })
    }

    /// Returns `true` for leaves.
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Returns the number of directly referenced children or entries.
    #[must_use]
    pub fn children_len(&self) -> usize {
        match self {
            Self::Value(_) => 0,
            Self::Bitmap { children, .. } => children.len(),
            Self::Collision(entries) => entries.len(),
        }
    }
}

/// Copy of `children` with `child` inserted at dense position `at`.
pub(crate) fn children_inserting<K, V>(
    children: &[NodeRef<K, V>],
    at: usize,
    child: NodeRef<K, V>,
) -> Vec<NodeRef<K, V>> {
    let mut out = Vec::with_capacity(children.len() + 1);
    out.extend_from_slice(&children[..at]);
    out.push(child);
    out.extend_from_slice(&children[at..]);
    out
}

/// Copy of `children` with position `at` replaced by `child`.
pub(crate) fn children_replacing<K, V>(
    children: &[NodeRef<K, V>],
    at: usize,
    child: NodeRef<K, V>,
) -> Vec<NodeRef<K, V>> {
    let mut out = children.to_vec();
    out[at] = child;
    out
}

/// Copy of `children` without position `at`.
pub(crate) fn children_removing<K, V>(
    children: &[NodeRef<K, V>],
    at: usize,
) -> Vec<NodeRef<K, V>> {
    let mut out = Vec::with_capacity(children.len() - 1);
    out.extend_from_slice(&children[..at]);
    out.extend_from_slice(&children[at + 1..]);
    out
}

// ---------------------------------------------------------------------------
// Manual trait impls: no `K: Debug, V: Debug` bounds.
// ---------------------------------------------------------------------------

impl<K, V> fmt::Debug for Node<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(entry) => f
                .debug_struct("Value")
                .field("hash", &format_args!("{:#018x}", entry.hash))
                .finish_non_exhaustive(),
            Self::Bitmap { bitmap, children } => f
                .debug_struct("Bitmap")
                .field("bitmap", &format_args!("{bitmap:#034b}"))
                .field("children", children)
                .finish(),
            Self::Collision(entries) => f
                .debug_struct("Collision")
                .field("entries_len", &entries.len())
                .finish(),
        }
    }
}
