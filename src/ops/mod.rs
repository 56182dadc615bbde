//! Trie algorithms: search, path-copying insert and erase.

pub mod get;
pub mod insert;
pub mod remove;
