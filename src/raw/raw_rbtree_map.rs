use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;
use core::ops::Bound;

use alloc::vec::Vec;
use log::trace;
use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Node};
use super::size::Size;

/// Descent stack used by the iterators; a red-black tree of `u32::MAX` keys is at
/// most 64 nodes deep.
pub(crate) type Path = SmallVec<[Handle; 32]>;

/// New subtree root after a removal, plus the entry that was unlinked.
type Removed<K, V> = (Option<Handle>, (K, V));

/// The left-leaning red-black tree backing `RBTreeMap`.
///
/// Every mutation recurses to a base case and reassigns the returned subtree root into
/// its parent's link on the way back up, so nodes never need a parent pointer.
#[derive(Clone)]
pub(crate) struct RawRBTreeMap<K, V> {
    pub(super) nodes: Arena<Node<K, V>>,
    pub(super) root: Option<Handle>,
}

impl<K, V> RawRBTreeMap<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.size_of(self.root)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn clear(&mut self) {
        trace!("clearing red-black tree of {} entries", self.len());
        self.nodes.clear();
        self.root = None;
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    /// A missing link is black.
    #[inline]
    pub(super) fn is_red(&self, link: Option<Handle>) -> bool {
        link.is_some_and(|h| self.node(h).is_red())
    }

    #[inline]
    pub(super) fn size_of(&self, link: Option<Handle>) -> usize {
        link.map_or(0, |h| self.node(h).size.to_usize())
    }

    fn left_of(&self, link: Option<Handle>) -> Option<Handle> {
        link.and_then(|h| self.node(h).left)
    }

    fn update_size(&mut self, h: Handle) {
        let node = self.node(h);
        let size = Size::of_children(self.size_of(node.left), self.size_of(node.right));
        self.node_mut(h).size = size;
    }

    /// Forces the root black. Returns `true` when the root had been red, which is the
    /// only way the black height of the tree grows.
    fn blacken_root(&mut self) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let was_red = self.node(root).is_red();
        self.node_mut(root).color = Color::Black;
        was_red
    }

    /// Colors a root 2-node red so that the top of a deletion descent already has a red
    /// link to hand down.
    fn borrow_red_at_root(&mut self, root: Handle) {
        let node = self.node(root);
        if !self.is_red(node.left) && !self.is_red(node.right) {
            trace!("root is a 2-node; lending it a red link before descending");
            self.node_mut(root).color = Color::Red;
        }
    }

    //              h                          x
    //             / \                        / \
    //            a  (x)        ==>         (h)  c
    //               / \                    / \
    //              b   c                  a   b
    //
    /// Turns a red right link into a red left link. `x` inherits `h`'s incoming color
    /// and its subtree size.
    fn rotate_left(&mut self, h: Handle) -> Handle {
        let x = self.node(h).right.expect("`rotate_left()` - `h` has no right child!");
        debug_assert!(self.node(x).is_red(), "`rotate_left()` - right link of `h` is black!");

        let (h_color, h_size) = {
            let node = self.node(h);
            (node.color, node.size)
        };
        let b = self.node(x).left;

        let node = self.node_mut(h);
        node.right = b;
        node.color = Color::Red;

        let node = self.node_mut(x);
        node.left = Some(h);
        node.color = h_color;
        node.size = h_size;

        self.update_size(h);
        x
    }

    //                h                      x
    //               / \                    / \
    //             (x)  c       ==>        a  (h)
    //             / \                        / \
    //            a   b                      b   c
    //
    /// Mirror of [`rotate_left`](Self::rotate_left); splits a run of two red left links.
    fn rotate_right(&mut self, h: Handle) -> Handle {
        let x = self.node(h).left.expect("`rotate_right()` - `h` has no left child!");
        debug_assert!(self.node(x).is_red(), "`rotate_right()` - left link of `h` is black!");

        let (h_color, h_size) = {
            let node = self.node(h);
            (node.color, node.size)
        };
        let b = self.node(x).right;

        let node = self.node_mut(h);
        node.left = b;
        node.color = Color::Red;

        let node = self.node_mut(x);
        node.right = Some(h);
        node.color = h_color;
        node.size = h_size;

        self.update_size(h);
        x
    }

    /// Toggles `h` and both of its children. Splits a temporary 4-node on the way up;
    /// joins `h` and its children into one on the way down.
    fn flip_colors(&mut self, h: Handle) {
        let node = self.node(h);
        let left = node.left.expect("`flip_colors()` - `h` has no left child!");
        let right = node.right.expect("`flip_colors()` - `h` has no right child!");

        self.node_mut(h).flip_color();
        self.node_mut(left).flip_color();
        self.node_mut(right).flip_color();
    }

    /// Insertion fix-up.
    fn fix_up(&mut self, mut h: Handle) -> Handle {
        let node = self.node(h);
        if self.is_red(node.right) && !self.is_red(node.left) {
            h = self.rotate_left(h);
        }
        let left = self.node(h).left;
        if self.is_red(left) && self.is_red(self.left_of(left)) {
            h = self.rotate_right(h);
        }
        let node = self.node(h);
        if self.is_red(node.left) && self.is_red(node.right) {
            self.flip_colors(h);
        }
        self.update_size(h);
        h
    }

    /// Deletion fix-up. Borrowing on the way down can leave a red right link next to a
    /// red left one, so any red right link is rotated here.
    fn balance(&mut self, mut h: Handle) -> Handle {
        if self.is_red(self.node(h).right) {
            h = self.rotate_left(h);
        }
        let left = self.node(h).left;
        if self.is_red(left) && self.is_red(self.left_of(left)) {
            h = self.rotate_right(h);
        }
        let node = self.node(h);
        if self.is_red(node.left) && self.is_red(node.right) {
            self.flip_colors(h);
        }
        self.update_size(h);
        h
    }

    /// Requires `h` red with `h.left` and `h.left.left` black. Makes `h.left` or one of
    /// its children red, borrowing a key from the right sibling when it has one to spare.
    fn move_red_left(&mut self, mut h: Handle) -> Handle {
        self.flip_colors(h);
        let right = self.node(h).right.expect("`move_red_left()` - `h` has no right child!");
        if self.is_red(self.node(right).left) {
            let right = self.rotate_right(right);
            self.node_mut(h).right = Some(right);
            h = self.rotate_left(h);
            self.flip_colors(h);
        }
        h
    }

    /// Requires `h` red with `h.right` and `h.right.left` black. Makes `h.right` or one
    /// of its children red, borrowing from the left sibling when it has one to spare.
    fn move_red_right(&mut self, mut h: Handle) -> Handle {
        self.flip_colors(h);
        let left = self.node(h).left.expect("`move_red_right()` - `h` has no left child!");
        if self.is_red(self.node(left).left) {
            h = self.rotate_right(h);
            self.flip_colors(h);
        }
        h
    }

    /// Is the left child of `h` a 2-node?
    fn left_is_two_node(&self, h: Handle) -> bool {
        let left = self.node(h).left;
        !self.is_red(left) && !self.is_red(self.left_of(left))
    }

    /// Is the right child of `h` a 2-node?
    fn right_is_two_node(&self, h: Handle) -> bool {
        let right = self.node(h).right;
        !self.is_red(right) && !self.is_red(self.left_of(right))
    }

    fn delete_min_at(&mut self, mut h: Handle) -> Removed<K, V> {
        if self.node(h).left.is_none() {
            let node = self.nodes.take(h);
            return (node.right, node.into_entry());
        }
        if self.left_is_two_node(h) {
            h = self.move_red_left(h);
        }
        let left = self.node(h).left.expect("`delete_min_at()` - left child vanished!");
        let (left, removed) = self.delete_min_at(left);
        self.node_mut(h).left = left;
        (Some(self.balance(h)), removed)
    }

    fn delete_max_at(&mut self, mut h: Handle) -> Removed<K, V> {
        if self.is_red(self.node(h).left) {
            h = self.rotate_right(h);
        }
        if self.node(h).right.is_none() {
            let node = self.nodes.take(h);
            return (node.left, node.into_entry());
        }
        if self.right_is_two_node(h) {
            h = self.move_red_right(h);
        }
        let right = self.node(h).right.expect("`delete_max_at()` - right child vanished!");
        let (right, removed) = self.delete_max_at(right);
        self.node_mut(h).right = right;
        (Some(self.balance(h)), removed)
    }

    /// Removes the first entry.
    pub(crate) fn delete_min(&mut self) -> Option<(K, V)> {
        let root = self.root?;
        self.borrow_red_at_root(root);
        let (root, removed) = self.delete_min_at(root);
        self.root = root;
        self.blacken_root();
        Some(removed)
    }

    /// Removes the last entry.
    pub(crate) fn delete_max(&mut self) -> Option<(K, V)> {
        let root = self.root?;
        self.borrow_red_at_root(root);
        let (root, removed) = self.delete_max_at(root);
        self.root = root;
        self.blacken_root();
        Some(removed)
    }
}

impl<K: Ord, V> RawRBTreeMap<K, V> {
    #[inline]
    fn compare<Q>(&self, key: &Q, h: Handle) -> Ordering
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        key.cmp(self.node(h).key.borrow())
    }

    /// Finds the node holding `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut link = self.root;
        while let Some(h) = link {
            let node = self.node(h);
            link = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(h),
            };
        }
        None
    }

    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.node(self.search(key)?);
        Some((&node.key, &node.value))
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let h = self.search(key)?;
        Some(&mut self.node_mut(h).value)
    }

    /// Inserts or overwrites. Returns the previous value for an existing key.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root, previous) = self.insert_at(self.root, key, value);
        self.root = Some(root);
        if self.blacken_root() {
            trace!("root split; black height grew (len = {})", self.len());
        }
        previous
    }

    fn insert_at(&mut self, link: Option<Handle>, key: K, value: V) -> (Handle, Option<V>) {
        let Some(h) = link else {
            return (self.nodes.alloc(Node::new(key, value)), None);
        };

        let previous = match key.cmp(&self.node(h).key) {
            Ordering::Less => {
                let (left, previous) = self.insert_at(self.node(h).left, key, value);
                self.node_mut(h).left = Some(left);
                previous
            }
            Ordering::Greater => {
                let (right, previous) = self.insert_at(self.node(h).right, key, value);
                self.node_mut(h).right = Some(right);
                previous
            }
            Ordering::Equal => Some(mem::replace(&mut self.node_mut(h).value, value)),
        };

        (self.fix_up(h), previous)
    }

    /// Removes `key` if present. An absent key leaves the tree untouched.
    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key)?;
        let root = self.root?;
        self.borrow_red_at_root(root);
        let (root, removed) = self.delete_at(root, key);
        self.root = root;
        self.blacken_root();
        Some(removed)
    }

    /// Requires `key` to be present below `h`.
    fn delete_at<Q>(&mut self, mut h: Handle, key: &Q) -> Removed<K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if self.compare(key, h) == Ordering::Less {
            if self.left_is_two_node(h) {
                h = self.move_red_left(h);
            }
            let left = self.node(h).left.expect("`delete_at()` - key is missing from the left subtree!");
            let (left, removed) = self.delete_at(left, key);
            self.node_mut(h).left = left;
            return (Some(self.balance(h)), removed);
        }

        if self.is_red(self.node(h).left) {
            h = self.rotate_right(h);
        }
        if self.compare(key, h) == Ordering::Equal && self.node(h).right.is_none() {
            let node = self.nodes.take(h);
            return (node.left, node.into_entry());
        }
        if self.right_is_two_node(h) {
            h = self.move_red_right(h);
        }

        let right = self.node(h).right.expect("`delete_at()` - key is missing from the right subtree!");
        let removed = if self.compare(key, h) == Ordering::Equal {
            // Replace `h` with its successor, then unlink the successor's node.
            let (right, mut successor) = self.delete_min_at(right);
            let node = self.node_mut(h);
            node.right = right;
            mem::swap(&mut node.key, &mut successor.0);
            mem::swap(&mut node.value, &mut successor.1);
            successor
        } else {
            let (right, removed) = self.delete_at(right, key);
            self.node_mut(h).right = right;
            removed
        };
        (Some(self.balance(h)), removed)
    }
}

impl<K, V> RawRBTreeMap<K, V> {
    pub(crate) fn first(&self) -> Option<Handle> {
        let mut h = self.root?;
        while let Some(left) = self.node(h).left {
            h = left;
        }
        Some(h)
    }

    pub(crate) fn last(&self) -> Option<Handle> {
        let mut h = self.root?;
        while let Some(right) = self.node(h).right {
            h = right;
        }
        Some(h)
    }

    /// Node at zero-based position `rank` in key order.
    pub(crate) fn select(&self, rank: usize) -> Option<Handle> {
        if rank >= self.len() {
            return None;
        }

        let mut remaining = rank;
        let mut link = self.root;
        while let Some(h) = link {
            let node = self.node(h);
            let left_size = self.size_of(node.left);
            link = match remaining.cmp(&left_size) {
                Ordering::Less => node.left,
                Ordering::Greater => {
                    remaining -= left_size + 1;
                    node.right
                }
                Ordering::Equal => return Some(h),
            };
        }
        unreachable!("`select()` - subtree sizes disagree with the tree shape");
    }

    pub(crate) fn select_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        let h = self.select(rank)?;
        let node = self.node_mut(h);
        Some((&node.key, &mut node.value))
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        self.height_at(self.root)
    }

    fn height_at(&self, link: Option<Handle>) -> usize {
        link.map_or(0, |h| {
            let node = self.node(h);
            1 + self.height_at(node.left).max(self.height_at(node.right))
        })
    }

    /// Pushes `link` and its left spine; the top of `path` is then the smallest key
    /// of that subtree.
    pub(crate) fn push_left_spine(&self, path: &mut Path, mut link: Option<Handle>) {
        while let Some(h) = link {
            path.push(h);
            link = self.node(h).left;
        }
    }

    pub(crate) fn push_right_spine(&self, path: &mut Path, mut link: Option<Handle>) {
        while let Some(h) = link {
            path.push(h);
            link = self.node(h).right;
        }
    }

    /// Unlinks every node and returns the entries in key order.
    pub(crate) fn into_sorted_vec(mut self) -> Vec<(K, V)> {
        let mut entries = Vec::with_capacity(self.len());
        let mut path = Path::new();
        self.push_left_spine(&mut path, self.root);
        while let Some(h) = path.pop() {
            let node = self.nodes.take(h);
            self.push_left_spine(&mut path, node.right);
            entries.push(node.into_entry());
        }
        self.root = None;
        entries
    }
}

impl<K: Ord, V> RawRBTreeMap<K, V> {
    /// Number of keys strictly less than `key`. Defined whether or not `key` is present.
    pub(crate) fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut rank = 0;
        let mut link = self.root;
        while let Some(h) = link {
            let node = self.node(h);
            link = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => {
                    rank += self.size_of(node.left) + 1;
                    node.right
                }
                Ordering::Equal => return rank + self.size_of(node.left),
            };
        }
        rank
    }

    /// Number of keys less than or equal to `key`.
    pub(crate) fn rank_inclusive<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut rank = 0;
        let mut link = self.root;
        while let Some(h) = link {
            let node = self.node(h);
            link = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => {
                    rank += self.size_of(node.left) + 1;
                    node.right
                }
                Ordering::Equal => return rank + self.size_of(node.left) + 1,
            };
        }
        rank
    }

    /// Largest key `<= key`.
    pub(crate) fn floor<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut best = None;
        let mut link = self.root;
        while let Some(h) = link {
            let node = self.node(h);
            link = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => {
                    best = Some(h);
                    node.right
                }
                Ordering::Equal => return Some(h),
            };
        }
        best
    }

    /// Smallest key `>= key`.
    pub(crate) fn ceiling<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut best = None;
        let mut link = self.root;
        while let Some(h) = link {
            let node = self.node(h);
            link = match key.cmp(node.key.borrow()) {
                Ordering::Greater => node.right,
                Ordering::Less => {
                    best = Some(h);
                    node.left
                }
                Ordering::Equal => return Some(h),
            };
        }
        best
    }

    /// Number of keys that fall before `start`.
    pub(crate) fn rank_before<Q>(&self, start: Bound<&Q>) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match start {
            Bound::Included(key) => self.rank(key),
            Bound::Excluded(key) => self.rank_inclusive(key),
            Bound::Unbounded => 0,
        }
    }

    /// Number of keys that do not fall after `end`.
    pub(crate) fn rank_through<Q>(&self, end: Bound<&Q>) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match end {
            Bound::Included(key) => self.rank_inclusive(key),
            Bound::Excluded(key) => self.rank(key),
            Bound::Unbounded => self.len(),
        }
    }

    /// Descends towards the first key within `start`, stacking every node at or past the
    /// bound. The top of the returned path is the first key of the range.
    pub(crate) fn lower_path<Q>(&self, start: Bound<&Q>) -> Path
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path = Path::new();
        let mut link = self.root;
        while let Some(h) = link {
            let node = self.node(h);
            let within = match start {
                Bound::Included(key) => key <= node.key.borrow(),
                Bound::Excluded(key) => key < node.key.borrow(),
                Bound::Unbounded => true,
            };
            if within {
                path.push(h);
                link = node.left;
            } else {
                link = node.right;
            }
        }
        path
    }

    /// Mirror of [`lower_path`](Self::lower_path) for the last key within `end`.
    pub(crate) fn upper_path<Q>(&self, end: Bound<&Q>) -> Path
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path = Path::new();
        let mut link = self.root;
        while let Some(h) = link {
            let node = self.node(h);
            let within = match end {
                Bound::Included(key) => key >= node.key.borrow(),
                Bound::Excluded(key) => key > node.key.borrow(),
                Bound::Unbounded => true,
            };
            if within {
                path.push(h);
                link = node.right;
            } else {
                link = node.left;
            }
        }
        path
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
mod tests {
    use super::*;
    use alloc::vec;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn keys_in_order(tree: &RawRBTreeMap<i32, i32>) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut path = Path::new();
        tree.push_left_spine(&mut path, tree.root);
        while let Some(h) = path.pop() {
            let node = tree.node(h);
            keys.push(node.key);
            tree.push_left_spine(&mut path, node.right);
        }
        keys
    }

    type Shape = Vec<(Handle, i32, Option<Handle>, Option<Handle>, Color, usize)>;

    /// Every node's handle, links, color and cached size, in key order.
    fn shape(tree: &RawRBTreeMap<i32, i32>) -> Shape {
        let mut shape = Vec::new();
        let mut path = Path::new();
        tree.push_left_spine(&mut path, tree.root);
        while let Some(h) = path.pop() {
            let node = tree.node(h);
            shape.push((h, node.key, node.left, node.right, node.color, node.size.to_usize()));
            tree.push_left_spine(&mut path, node.right);
        }
        shape
    }

    fn build(keys: &[i32]) -> RawRBTreeMap<i32, i32> {
        let mut tree = RawRBTreeMap::new();
        for &key in keys {
            tree.insert(key, key * 10);
            tree.validate_invariants();
        }
        tree
    }

    #[test]
    fn rotations_preserve_order_and_sizes() {
        // Hand-built right-leaning pair: 1 -(red)-> 2.
        let mut tree: RawRBTreeMap<i32, i32> = RawRBTreeMap::new();
        let low = tree.nodes.alloc(Node::new(1, 10));
        let high = tree.nodes.alloc(Node::new(2, 20));
        tree.node_mut(low).color = Color::Black;
        tree.node_mut(low).right = Some(high);
        tree.node_mut(low).size = Size::from_usize(2);

        let root = tree.rotate_left(low);
        assert_eq!(root, high);
        assert_eq!(tree.node(high).left, Some(low));
        assert_eq!(tree.node(high).color, Color::Black);
        assert_eq!(tree.node(low).color, Color::Red);
        assert_eq!(tree.node(high).size.to_usize(), 2);
        assert_eq!(tree.node(low).size.to_usize(), 1);

        let root = tree.rotate_right(high);
        assert_eq!(root, low);
        assert_eq!(tree.node(low).right, Some(high));
        assert_eq!(tree.node(low).color, Color::Black);
        assert_eq!(tree.node(high).color, Color::Red);
        assert_eq!(tree.node(low).size.to_usize(), 2);
        assert_eq!(tree.node(high).size.to_usize(), 1);
    }

    #[test]
    fn flip_colors_toggles_all_three() {
        let mut tree = build(&[2, 1, 3]);
        let root = tree.root.unwrap();
        assert!(!tree.is_red(Some(root)));
        assert!(!tree.is_red(tree.node(root).left));
        assert!(!tree.is_red(tree.node(root).right));

        tree.flip_colors(root);
        assert!(tree.is_red(Some(root)));
        assert!(tree.is_red(tree.node(root).left));
        assert!(tree.is_red(tree.node(root).right));
    }

    #[test]
    fn insert_keeps_invariants_at_every_step() {
        let tree = build(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(keys_in_order(&tree), vec![1, 3, 4, 5, 7, 8, 9]);
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn ascending_inserts_stay_bushy() {
        let tree = build(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.node(tree.root.unwrap()).key, 4);
    }

    #[test]
    fn overwrite_keeps_shape() {
        let mut tree = build(&[1, 2, 3]);
        assert_eq!(tree.insert(2, 99), Some(20));
        tree.validate_invariants();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get_key_value(&2), Some((&2, &99)));
    }

    #[test]
    fn delete_min_drains_in_order() {
        let keys = [42, 7, 19, 3, 88, 61, 25, 10, 54, 30];
        let mut tree = build(&keys);
        let mut drained = Vec::new();
        while let Some((key, value)) = tree.delete_min() {
            assert_eq!(value, key * 10);
            drained.push(key);
            tree.validate_invariants();
        }
        let mut sorted = keys.to_vec();
        sorted.sort_unstable();
        assert_eq!(drained, sorted);
        assert!(tree.is_empty());
        assert_eq!(tree.nodes.len(), 0);
    }

    #[test]
    fn delete_max_drains_in_reverse() {
        let mut tree = build(&(0..32).collect::<Vec<_>>());
        for expected in (0..32).rev() {
            assert_eq!(tree.delete_max(), Some((expected, expected * 10)));
            tree.validate_invariants();
        }
        assert_eq!(tree.delete_max(), None);
    }

    #[test]
    fn removing_an_interior_key_uses_its_successor() {
        let mut tree = build(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(tree.remove_entry(&5), Some((5, 50)));
        tree.validate_invariants();
        assert_eq!(keys_in_order(&tree), vec![1, 3, 4, 7, 8, 9]);
        assert_eq!(tree.get_key_value(&7), Some((&7, &70)));
    }

    #[test]
    fn removing_an_absent_key_changes_nothing() {
        let mut tree = build(&[10, 20, 30, 40, 50, 60, 70]);
        let before = shape(&tree);
        let root = tree.root;
        assert_eq!(tree.remove_entry(&35), None);
        assert_eq!(tree.remove_entry(&0), None);
        assert_eq!(tree.remove_entry(&99), None);
        assert_eq!(tree.root, root);
        assert_eq!(shape(&tree), before);
    }

    #[test]
    fn rank_and_select_are_inverse() {
        let tree = build(&[50, 10, 40, 20, 30]);
        for i in 0..tree.len() {
            let h = tree.select(i).unwrap();
            assert_eq!(tree.rank(&tree.node(h).key), i);
        }
        assert_eq!(tree.select(5), None);
        assert_eq!(tree.rank(&35), 3);
        assert_eq!(tree.rank_inclusive(&30), 3);
        assert_eq!(tree.rank(&0), 0);
        assert_eq!(tree.rank(&99), 5);
    }

    #[test]
    fn floor_and_ceiling() {
        let tree = build(&[10, 20, 30]);
        let key = |h: Option<Handle>| h.map(|h| tree.node(h).key);
        assert_eq!(key(tree.floor(&25)), Some(20));
        assert_eq!(key(tree.ceiling(&25)), Some(30));
        assert_eq!(key(tree.floor(&5)), None);
        assert_eq!(key(tree.ceiling(&35)), None);
        assert_eq!(key(tree.floor(&20)), Some(20));
        assert_eq!(key(tree.ceiling(&20)), Some(20));
    }

    #[test]
    fn range_paths_start_at_the_bounds() {
        let tree = build(&[10, 20, 30, 40, 50]);
        let top = |path: Path| path.last().map(|&h| tree.node(h).key);
        assert_eq!(top(tree.lower_path(Bound::Included(&20))), Some(20));
        assert_eq!(top(tree.lower_path(Bound::Excluded(&20))), Some(30));
        assert_eq!(top(tree.lower_path(Bound::Included(&55))), None);
        assert_eq!(top(tree.upper_path(Bound::Included(&40))), Some(40));
        assert_eq!(top(tree.upper_path(Bound::Excluded(&40))), Some(30));
        assert_eq!(top(tree.upper_path::<i32>(Bound::Unbounded)), Some(50));
        assert_eq!(tree.rank_before(Bound::Excluded(&20)), 2);
        assert_eq!(tree.rank_through(Bound::Included(&40)), 4);
    }

    #[test]
    fn into_sorted_vec_empties_the_arena() {
        let tree = build(&[3, 1, 2]);
        assert_eq!(tree.into_sorted_vec(), vec![(1, 10), (2, 20), (3, 30)]);
    }

    #[test]
    #[should_panic(expected = "`Arena::alloc()` - arena is at maximum capacity")]
    fn insert_past_capacity_panics() {
        // Handles are 16 bits wide under test.
        let mut tree: RawRBTreeMap<u32, ()> = RawRBTreeMap::new();
        for key in 0..=(Handle::MAX as u32) {
            tree.insert(key, ());
        }
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
        DeleteMin,
        DeleteMax,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0i32..400).prop_map(Op::Insert),
            3 => (0i32..400).prop_map(Op::Remove),
            1 => Just(Op::DeleteMin),
            1 => Just(Op::DeleteMax),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 0..300)) {
            let mut tree: RawRBTreeMap<i32, i32> = RawRBTreeMap::new();
            let mut model: Vec<i32> = Vec::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        let previous = tree.insert(key, key);
                        let position = model.binary_search(&key);
                        prop_assert_eq!(previous.is_some(), position.is_ok());
                        if let Err(index) = position {
                            model.insert(index, key);
                        }
                    }
                    Op::Remove(key) => {
                        let removed = tree.remove_entry(&key);
                        match model.binary_search(&key) {
                            Ok(index) => {
                                model.remove(index);
                                prop_assert_eq!(removed, Some((key, key)));
                            }
                            Err(_) => prop_assert_eq!(removed, None),
                        }
                    }
                    Op::DeleteMin => {
                        let expected = (!model.is_empty()).then(|| model.remove(0));
                        prop_assert_eq!(tree.delete_min().map(|(k, _)| k), expected);
                    }
                    Op::DeleteMax => {
                        prop_assert_eq!(tree.delete_max().map(|(k, _)| k), model.pop());
                    }
                }

                tree.validate_invariants();
                prop_assert_eq!(tree.len(), model.len());
                prop_assert_eq!(tree.nodes.len(), model.len());
                prop_assert_eq!(keys_in_order(&tree), model.clone());
            }
        }

        #[test]
        fn height_is_logarithmic(keys in prop::collection::vec(any::<i32>(), 1..2_000)) {
            let mut tree = RawRBTreeMap::new();
            for key in keys {
                tree.insert(key, ());
            }
            // 2 * ceil(log2(n + 1)) bounds the 2 * log2(n + 1) red-black limit from above.
            let bound = 2 * (tree.len() + 1).next_power_of_two().ilog2() as usize;
            prop_assert!(tree.height() <= bound, "height {} > {}", tree.height(), bound);
        }
    }
}
