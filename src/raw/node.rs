use super::handle::Handle;
use super::size::Size;

/// Color of the link from a node's parent, stored on the child.
///
/// A missing child is black.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

impl Color {
    #[inline]
    pub(crate) const fn flip(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

/// A single key/value pair and its two child links.
///
/// Children are owned through their arena handles; no node is reachable from more
/// than one parent link.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    pub(crate) color: Color,
    // Nodes in the subtree rooted here, this one included.
    pub(crate) size: Size,
}

impl<K, V> Node<K, V> {
    /// New leaves always hang from a red link.
    pub(crate) const fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            color: Color::Red,
            size: Size::ONE,
        }
    }

    #[inline]
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    pub(crate) fn flip_color(&mut self) {
        self.color = self.color.flip();
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}
