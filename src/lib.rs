//! An order-statistic map built on a left-leaning red-black tree.
//!
//! [`RBTreeMap`] is an ordered symbol table with O(log n) worst-case insertion,
//! deletion and lookup, plus order-statistic queries that read the subtree size
//! cached on every node:
//!
//! - [`select`](RBTreeMap::select) - the key at a given sorted position
//! - [`rank`](RBTreeMap::rank) - how many keys are smaller than a given key
//! - [`floor`](RBTreeMap::floor) / [`ceiling`](RBTreeMap::ceiling) - nearest keys
//! - [`count_between`](RBTreeMap::count_between) / [`keys_between`](RBTreeMap::keys_between) -
//!   inclusive key ranges
//! - Indexing by [`Rank`] - e.g., `map[Rank(0)]` for the first value
//!
//! # Example
//!
//! ```
//! use llrb_tree::{RBTreeMap, Rank};
//!
//! let mut scores = RBTreeMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.len(), 3);
//!
//! // Order-statistic operations (O(log n))
//! assert_eq!(scores.select(1), Ok(&"Bob"));
//! assert_eq!(scores.rank(&"Carol"), 2);
//! assert_eq!(scores.rank(&"Beth"), 1); // defined for absent keys too
//! assert_eq!(scores[Rank(0)], 100);
//! ```
//!
//! # Errors
//!
//! Operations with a precondition report violations through [`Error`]; a key that is
//! simply absent is reported as `None`.
//!
//! # Implementation
//!
//! The tree is a left-leaning red-black tree (a binary encoding of a 2-3 tree) whose
//! nodes live in an arena and refer to their children by index. Insertion and the three
//! deletions recurse down and re-link each subtree root on the way back up, restoring
//! the red-black invariants and the cached subtree sizes at every level.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order_statistic;
mod raw;

pub mod rbtree_map;

pub use error::{Error, Result};
pub use order_statistic::Rank;
pub use rbtree_map::RBTreeMap;
