use super::support::assert_elements;
use crate::{Error, PersistentArray, Undoable};

#[test]
fn fresh_array_has_no_history() {
    let array = PersistentArray::from(vec![1, 2, 3]);
    assert!(!array.has_undo());
    assert!(!array.has_redo());
    assert_eq!(array.try_undo().unwrap_err(), Error::NothingToUndo);
    assert_eq!(array.try_redo().unwrap_err(), Error::NothingToRedo);
}

#[test]
fn undo_redo_across_branches() {
    let v0 = PersistentArray::from(vec![1, 2, 3]);
    let v1 = v0.push_back(100).set_value(2, 200);
    let v2 = v1.undo().undo();
    let v3 = v1.undo();
    let v4 = v2.redo();
    let v5 = v4.redo();
    let v6 = v2.redo().redo().push_back(400);

    assert_elements(&v0, &[1, 2, 3]);
    assert_elements(&v1, &[1, 2, 200, 100]);
    assert_elements(&v2, &[1, 2, 3]);
    assert_elements(&v3, &[1, 2, 3, 100]);
    assert_elements(&v4, &[1, 2, 3, 100]);
    assert_elements(&v5, &[1, 2, 200, 100]);
    assert_elements(&v6, &[1, 2, 200, 100, 400]);
}

#[test]
fn undo_each_kind_of_modification() {
    let mut test = PersistentArray::new();
    test = test.push_back(1);
    test = test.push_back(2);
    test = test.push_back(3);

    assert_elements(&test, &[1, 2, 3]);
    assert_elements(&test.undo(), &[1, 2]);
    assert_elements(&test.undo().undo(), &[1]);
    assert_elements(&test.undo().undo().undo(), &[]);

    test = test.set_value(0, 4);
    test = test.set_value(1, 5);
    test = test.set_value(2, 6);

    assert_elements(&test, &[4, 5, 6]);
    assert_elements(&test.undo(), &[4, 5, 3]);
    assert_elements(&test.undo().undo(), &[4, 2, 3]);
    assert_elements(&test.undo().undo().undo(), &[1, 2, 3]);

    test = test.pop_back();
    test = test.pop_back();
    test = test.pop_back();

    assert_elements(&test, &[]);
    assert_elements(&test.undo(), &[4]);
    assert_elements(&test.undo().undo(), &[4, 5]);
    assert_elements(&test.undo().undo().undo(), &[4, 5, 6]);
}

#[test]
fn undo_then_redo_round_trip() {
    let a = PersistentArray::from(vec![7, 8, 9]);
    let b = a.set_value(1, 80);

    assert_eq!(b.undo(), a);
    assert_eq!(b.undo().redo(), b);
    assert!(b.undo().has_redo());
    assert!(!b.undo().redo().has_redo());
}

#[test]
fn modification_after_undo_clears_redo() {
    let a = PersistentArray::from(vec![1]).push_back(2);
    let undone = a.undo();
    assert!(undone.has_redo());

    let diverged = undone.push_back(3);
    assert!(!diverged.has_redo());
    assert_eq!(diverged.try_redo().unwrap_err(), Error::NothingToRedo);
    assert_elements(&diverged, &[1, 3]);
    assert_elements(&diverged.undo(), &[1]);
}

#[test]
fn undoable_trait_dispatch() {
    fn step_back<C: Undoable>(c: &C) -> C {
        c.undo()
    }

    let a = PersistentArray::from(vec![1, 2]).pop_back();
    assert_elements(&step_back(&a), &[1, 2]);
}

#[test]
#[should_panic(expected = "nothing to undo")]
fn undo_panics_without_history() {
    let array: PersistentArray<i32> = PersistentArray::new();
    let _ = array.undo();
}
