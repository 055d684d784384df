mod arena;
mod handle;
mod node;
mod raw_rbtree_map;
mod size;
#[cfg(test)]
mod validate;

pub(crate) use raw_rbtree_map::{Path, RawRBTreeMap};
