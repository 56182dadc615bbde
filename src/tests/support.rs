//! Shared test doubles.

use std::cell::Cell;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Metadata, Subscriber};

use crate::PersistentArray;

// ---------------------------------------------------------------------------
// Hashing under test control
// ---------------------------------------------------------------------------

/// Hasher whose output is the last `u64` written to it.
#[derive(Default)]
pub struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (self.0 << 8) | u64::from(b);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

/// Builds [`IdentityHasher`]s: a `u64` key hashes to itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityState;

impl BuildHasher for IdentityState {
    type Hasher = IdentityHasher;

    fn build_hasher(&self) -> IdentityHasher {
        IdentityHasher::default()
    }
}

/// Key whose hash under [`IdentityState`] is exactly `hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedKey {
    pub id: u32,
    pub hash: u64,
}

impl ForcedKey {
    pub const fn new(id: u32, hash: u64) -> Self {
        Self { id, hash }
    }
}

impl Hash for ForcedKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

// ---------------------------------------------------------------------------
// Lifetime accounting
// ---------------------------------------------------------------------------

thread_local! {
    static CREATED: Cell<usize> = const { Cell::new(0) };
    static CLONED: Cell<usize> = const { Cell::new(0) };
    static DROPPED: Cell<usize> = const { Cell::new(0) };
}

/// Element that counts its constructions, clones and drops.
///
/// Counters are per thread, so every test starts from zero.
#[derive(Debug, PartialEq, Eq)]
pub struct CountingElement(pub i32);

impl CountingElement {
    pub fn new(value: i32) -> Self {
        CREATED.with(|c| c.set(c.get() + 1));
        Self(value)
    }

    pub fn created() -> usize {
        CREATED.with(Cell::get)
    }

    pub fn cloned() -> usize {
        CLONED.with(Cell::get)
    }

    pub fn dropped() -> usize {
        DROPPED.with(Cell::get)
    }

    /// Instances currently alive.
    pub fn live() -> usize {
        Self::created() + Self::cloned() - Self::dropped()
    }

    pub fn reset() {
        CREATED.with(|c| c.set(0));
        CLONED.with(|c| c.set(0));
        DROPPED.with(|c| c.set(0));
    }
}

impl Clone for CountingElement {
    fn clone(&self) -> Self {
        CLONED.with(|c| c.set(c.get() + 1));
        Self(self.0)
    }
}

impl Drop for CountingElement {
    fn drop(&mut self) {
        DROPPED.with(|c| c.set(c.get() + 1));
    }
}

// ---------------------------------------------------------------------------
// Assertions
// ---------------------------------------------------------------------------

/// Reads every index through `value` and compares with `expected`.
pub fn assert_elements<T>(array: &PersistentArray<T>, expected: &[T])
where
    T: Clone + PartialEq + std::fmt::Debug,
{
    assert_eq!(array.len(), expected.len(), "length mismatch");
    for (i, want) in expected.iter().enumerate() {
        assert_eq!(&array.value(i), want, "element {i}");
    }
}

// ---------------------------------------------------------------------------
// Re-root accounting
// ---------------------------------------------------------------------------

/// Subscriber counting events that carry a `depth` field, which only the
/// re-root trace in the array emits.
#[derive(Default)]
struct RerootCounter {
    seen: Arc<AtomicUsize>,
}

impl Subscriber for RerootCounter {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _: &Id, _: &Record<'_>) {}

    fn record_follows_from(&self, _: &Id, _: &Id) {}

    fn event(&self, event: &Event<'_>) {
        if event.metadata().fields().field("depth").is_some() {
            self.seen.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn enter(&self, _: &Id) {}

    fn exit(&self, _: &Id) {}
}

/// Runs `f` and returns how many times it re-rooted an array chain.
pub fn count_reroots(f: impl FnOnce()) -> usize {
    let counter = RerootCounter::default();
    let seen = Arc::clone(&counter.seen);
    tracing::subscriber::with_default(counter, f);
    seen.load(Ordering::Relaxed)
}
