/// A zero-based position in the sorted order of a map.
///
/// # Examples
///
/// ```
/// use llrb_tree::{RBTreeMap, Rank};
///
/// let mut map = RBTreeMap::new();
/// map.insert("b", 20);
/// map.insert("a", 10);
///
/// assert_eq!(map[Rank(0)], 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
