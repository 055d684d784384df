//! Consistency checker for the red-black tree, used as the test oracle.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use super::handle::Handle;
use super::raw_rbtree_map::{Path, RawRBTreeMap};

impl<K: Ord, V> RawRBTreeMap<K, V> {
    /// Checks every structural invariant. Panics listing each violation found.
    ///
    /// Only meaningful between public operations; the algorithms break these rules
    /// temporarily inside a single call.
    pub(crate) fn validate_invariants(&self) {
        let mut errors: Vec<String> = Vec::new();

        if let Some(root) = self.root
            && self.is_red(Some(root))
        {
            errors.push(format!("root {root:?} is red"));
        }

        self.check_order(self.root, None, None, &mut errors);
        self.check_sizes(self.root, &mut errors);
        self.check_shape(self.root, &mut errors);
        self.check_black_balance(&mut errors);

        // Ranks are only meaningful once order and sizes hold.
        if errors.is_empty() {
            self.check_ranks(&mut errors);
        }

        if self.nodes.len() != self.len() {
            errors.push(format!(
                "arena holds {} nodes but the tree reaches {}",
                self.nodes.len(),
                self.len()
            ));
        }

        assert!(errors.is_empty(), "Red-black tree invariant violations:\n{}", errors.join("\n"));
    }

    /// Symmetric order: every key strictly between its ancestors' bounds.
    fn check_order(&self, link: Option<Handle>, low: Option<&K>, high: Option<&K>, errors: &mut Vec<String>) {
        let Some(h) = link else {
            return;
        };
        let node = self.node(h);
        if low.is_some_and(|low| node.key <= *low) {
            errors.push(format!("node {h:?} is not greater than its lower bound"));
        }
        if high.is_some_and(|high| node.key >= *high) {
            errors.push(format!("node {h:?} is not less than its upper bound"));
        }
        self.check_order(node.left, low, Some(&node.key), errors);
        self.check_order(node.right, Some(&node.key), high, errors);
    }

    fn check_sizes(&self, link: Option<Handle>, errors: &mut Vec<String>) -> usize {
        let Some(h) = link else {
            return 0;
        };
        let node = self.node(h);
        let actual = self.check_sizes(node.left, errors) + self.check_sizes(node.right, errors) + 1;
        let stored = node.size.to_usize();
        if stored != actual {
            errors.push(format!("size mismatch at {h:?}: stored={stored}, actual={actual}"));
        }
        actual
    }

    /// No red right links and no two red links in a row.
    fn check_shape(&self, link: Option<Handle>, errors: &mut Vec<String>) {
        let Some(h) = link else {
            return;
        };
        let node = self.node(h);
        if self.is_red(node.right) {
            errors.push(format!("node {h:?} has a red right link"));
        }
        if node.is_red() && self.is_red(node.left) {
            errors.push(format!("node {h:?} and its left child are both red"));
        }
        self.check_shape(node.left, errors);
        self.check_shape(node.right, errors);
    }

    /// Every path from the root to a missing link crosses the same number of black links.
    fn check_black_balance(&self, errors: &mut Vec<String>) {
        let mut expected = 0;
        let mut link = self.root;
        while let Some(h) = link {
            if !self.is_red(Some(h)) {
                expected += 1;
            }
            link = self.node(h).left;
        }
        self.check_black_path(self.root, expected, errors);
    }

    fn check_black_path(&self, link: Option<Handle>, remaining: usize, errors: &mut Vec<String>) {
        let Some(h) = link else {
            if remaining != 0 {
                errors.push(format!("black height off by {remaining} on some path"));
            }
            return;
        };
        let node = self.node(h);
        let remaining = if node.is_red() {
            remaining
        } else if let Some(remaining) = remaining.checked_sub(1) {
            remaining
        } else {
            errors.push(format!("too many black links on the path to {h:?}"));
            return;
        };
        self.check_black_path(node.left, remaining, errors);
        self.check_black_path(node.right, remaining, errors);
    }

    /// `rank(select(i)) == i` for every position and `select(rank(k)) == k` for every key.
    fn check_ranks(&self, errors: &mut Vec<String>) {
        for i in 0..self.len() {
            match self.select(i) {
                Some(h) if self.rank(&self.node(h).key) == i => {}
                Some(h) => errors.push(format!("rank(select({i})) != {i} at {h:?}")),
                None => errors.push(format!("select({i}) found nothing")),
            }
        }

        let mut path = Path::new();
        self.push_left_spine(&mut path, self.root);
        while let Some(h) = path.pop() {
            let node = self.node(h);
            if self.select(self.rank(&node.key)) != Some(h) {
                errors.push(format!("select(rank(key)) does not return {h:?}"));
            }
            self.push_left_spine(&mut path, node.right);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::super::node::{Color, Node};
    use super::super::size::Size;
    use super::*;

    #[test]
    fn empty_tree_is_valid() {
        RawRBTreeMap::<i32, ()>::new().validate_invariants();
    }

    #[test]
    #[should_panic(expected = "has a red right link")]
    fn red_right_link_is_reported() {
        let mut tree: RawRBTreeMap<i32, ()> = RawRBTreeMap::new();
        let root = tree.nodes.alloc(Node::new(1, ()));
        let right = tree.nodes.alloc(Node::new(2, ()));
        let node = tree.nodes.get_mut(root);
        node.color = Color::Black;
        node.right = Some(right);
        node.size = Size::from_usize(2);
        tree.root = Some(root);

        tree.validate_invariants();
    }

    #[test]
    #[should_panic(expected = "size mismatch")]
    fn stale_size_is_reported() {
        let mut tree: RawRBTreeMap<i32, ()> = RawRBTreeMap::new();
        tree.insert(1, ());
        tree.insert(2, ());
        let root = tree.root.unwrap();
        tree.nodes.get_mut(root).size = Size::from_usize(5);

        tree.validate_invariants();
    }

    #[test]
    #[should_panic(expected = "black height off")]
    fn black_imbalance_is_reported() {
        let mut tree: RawRBTreeMap<i32, ()> = RawRBTreeMap::new();
        for key in [2, 1, 3] {
            tree.insert(key, ());
        }
        // The right path loses a black link.
        let root = tree.root.unwrap();
        let right = tree.node(root).right.unwrap();
        tree.nodes.get_mut(right).color = Color::Red;

        tree.validate_invariants();
    }
}
