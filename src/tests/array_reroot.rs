use super::support::{assert_elements, count_reroots};
use crate::PersistentArray;

/// A long chain of writes re-roots once and every handle still reads its
/// own history.
#[test]
fn long_set_value_chain_reads_own_history() {
    let base = PersistentArray::with_len(10, 0_usize);
    let mut versions = Vec::with_capacity(1000);
    let mut current = base.clone();
    for i in 0..1000 {
        current = current.set_value(i % 10, i + 1);
        versions.push(current.clone());
    }

    // The newest version: each index holds its last write.
    for _ in 0..3 {
        for j in 0..10 {
            assert_eq!(current.value(j), 990 + j + 1);
        }
    }

    // The origin is untouched.
    assert!(base.iter().all(|v| v == 0));

    // An early version: only index 0 and 1 written.
    let early = &versions[1];
    assert_eq!(early.value(0), 1);
    assert_eq!(early.value(1), 2);
    assert!(early.iter().skip(2).all(|v| v == 0));

    // Back to the newest after re-rooting away from it.
    assert_eq!(current.value(0), 991);
}

/// Alternating reads between sibling branches must not cross-contaminate.
#[test]
fn interleaved_sibling_reads() {
    let origin = PersistentArray::from(vec![1, 2, 3, 4]);
    let left = origin.set_value(0, 10).set_value(2, 30);
    let right = origin.set_value(0, 100).set_value(3, 400);

    for _ in 0..5 {
        assert_eq!(left.value(0), 10);
        assert_eq!(right.value(0), 100);
        assert_eq!(origin.value(0), 1);
        assert_eq!(right.value(3), 400);
        assert_eq!(left.value(3), 4);
        assert_eq!(origin.value(2), 3);
        assert_eq!(left.value(2), 30);
    }

    assert_elements(&origin, &[1, 2, 3, 4]);
    assert_elements(&left, &[10, 2, 30, 4]);
    assert_elements(&right, &[100, 2, 3, 400]);
}

/// Branches that each grow past the shared length keep their own tails.
#[test]
fn sibling_push_backs_past_shared_length() {
    let origin = PersistentArray::from(vec![1, 2]);
    let a = origin.push_back(3);
    let b = origin.push_back(30);
    let c = b.push_back(40);
    let d = a.pop_back().push_back(300);

    assert_elements(&origin, &[1, 2]);
    assert_elements(&a, &[1, 2, 3]);
    assert_elements(&b, &[1, 2, 30]);
    assert_elements(&c, &[1, 2, 30, 40]);
    assert_elements(&d, &[1, 2, 300]);

    // Read again in a different order.
    assert_elements(&c, &[1, 2, 30, 40]);
    assert_elements(&a, &[1, 2, 3]);
    assert_elements(&d, &[1, 2, 300]);
    assert_elements(&b, &[1, 2, 30]);
}

/// Writes to an outdated version after re-rooting elsewhere.
#[test]
fn write_through_outdated_version() {
    let v0 = PersistentArray::from(vec![0, 0, 0]);
    let v1 = v0.set_value(1, 1);
    assert_eq!(v1.value(1), 1);

    // v0 is no longer the root.
    let v2 = v0.set_value(2, 2);
    assert_elements(&v2, &[0, 0, 2]);
    assert_elements(&v1, &[0, 1, 0]);
    assert_elements(&v0, &[0, 0, 0]);
}

/// Dropping a chain far deeper than the call stack tolerates recursively.
#[test]
fn deep_chain_drops_without_overflow() {
    let mut array = PersistentArray::with_len(1, 0_u32);
    for i in 0..200_000 {
        array = array.set_value(0, i);
    }
    assert_eq!(array.value(0), 199_999);
    drop(array);
}

/// Comparing two branches reads each side in one pass.
#[test]
fn equality_reroots_each_side_once() {
    let base: PersistentArray<usize> = (0..16).collect();
    let mut left = base.clone();
    let mut right = base.clone();
    for i in 0..16 {
        left = left.set_value(i, i + 100);
        right = right.set_value(i, i + 100);
    }

    let reroots = count_reroots(|| assert_eq!(left, right));
    assert_eq!(reroots, 2);
    assert!(right.holds_root());

    let unequal = right.set_value(3, 0);
    let reroots = count_reroots(|| assert_ne!(left, unequal));
    assert_eq!(reroots, 2);
}
