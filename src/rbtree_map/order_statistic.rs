use core::borrow::Borrow;
use core::ops::{Bound, Index, IndexMut};

use super::{Keys, RBTreeMap, Range};
use crate::Rank;
use crate::error::{Error, Result};

impl<K, V> RBTreeMap<K, V> {
    /// Returns the key at zero-based position `rank` in sorted order.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `rank >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::{Error, RBTreeMap};
    ///
    /// let map = RBTreeMap::from([("c", 3), ("a", 1), ("b", 2)]);
    /// assert_eq!(map.select(0), Ok(&"a"));
    /// assert_eq!(map.select(2), Ok(&"c"));
    /// assert_eq!(map.select(3), Err(Error::OutOfRange { rank: 3, len: 3 }));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn select(&self, rank: usize) -> Result<&K> {
        self.get_by_rank(rank).map(|(k, _)| k).ok_or(Error::OutOfRange {
            rank,
            len: self.len(),
        })
    }

    /// Returns the key-value pair at position `rank` in sorted order.
    ///
    /// This is an order-statistic extension and is not part of the standard
    /// `BTreeMap` API.
    ///
    /// The rank is zero-based. Returns `None` if `rank` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert("a", 10);
    /// map.insert("c", 30);
    /// map.insert("b", 20);
    ///
    /// assert_eq!(map.get_by_rank(1), Some((&"b", &20)));
    /// assert!(map.get_by_rank(3).is_none());
    /// ```
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        let node = self.raw.node(self.raw.select(rank)?);
        Some((&node.key, &node.value))
    }

    /// Returns the key and a mutable reference to the value at position `rank`
    /// in sorted order.
    ///
    /// The key is returned as a shared reference because mutating it would
    /// violate the map's ordering.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(10, "a");
    /// map.insert(5, "b");
    ///
    /// if let Some((key, value)) = map.get_by_rank_mut(0) {
    ///     assert_eq!(*key, 5);
    ///     *value = "updated";
    /// }
    ///
    /// assert_eq!(map.get(&5), Some(&"updated"));
    /// ```
    #[must_use]
    pub fn get_by_rank_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        self.raw.select_mut(rank)
    }
}

impl<K: Ord, V> RBTreeMap<K, V> {
    /// Returns the number of keys strictly less than `key`.
    ///
    /// `key` need not be in the map. When it is, the result is its zero-based position,
    /// so `select(rank(k)) == Ok(k)` for every stored key `k`.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([("act", 1), ("ape", 2)]);
    /// assert_eq!(map.rank(&"act"), 0);
    /// assert_eq!(map.rank(&"age"), 1);
    /// assert_eq!(map.rank(&"zoo"), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank(key)
    }

    /// Returns the zero-based rank of `key` in sorted order, or `None` if the
    /// key is not present.
    ///
    /// This is an order-statistic extension and is not part of the standard
    /// `BTreeMap` API.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(10, "a");
    /// map.insert(20, "b");
    ///
    /// assert_eq!(map.rank_of(&10), Some(0));
    /// assert_eq!(map.rank_of(&15), None);
    /// ```
    #[must_use]
    pub fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|_| self.raw.rank(key))
    }

    /// Returns the largest key less than or equal to `key`, or `None` if there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(10, ()), (20, ()), (30, ())]);
    /// assert_eq!(map.floor(&25), Some(&20));
    /// assert_eq!(map.floor(&20), Some(&20));
    /// assert_eq!(map.floor(&5), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn floor<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.floor(key).map(|h| &self.raw.node(h).key)
    }

    /// Returns the smallest key greater than or equal to `key`, or `None` if there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(10, ()), (20, ()), (30, ())]);
    /// assert_eq!(map.ceiling(&25), Some(&30));
    /// assert_eq!(map.ceiling(&35), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn ceiling<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.ceiling(key).map(|h| &self.raw.node(h).key)
    }

    /// Returns how many keys `k` satisfy `lo <= k <= hi`. Neither bound has to be present.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `lo > hi`.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::{Error, RBTreeMap};
    ///
    /// let map: RBTreeMap<_, _> = (1..=10).map(|k| (k * 10, ())).collect();
    /// assert_eq!(map.count_between(&20, &50), Ok(4));
    /// assert_eq!(map.count_between(&21, &49), Ok(2));
    /// assert_eq!(map.count_between(&30, &30), Ok(1));
    /// assert_eq!(map.count_between(&50, &20), Err(Error::InvalidArgument { operation: "count_between" }));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn count_between<Q>(&self, lo: &Q, hi: &Q) -> Result<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if lo > hi {
            return Err(Error::InvalidArgument {
                operation: "count_between",
            });
        }
        Ok(self.raw.rank_inclusive(hi) - self.raw.rank(lo))
    }

    /// Returns an iterator over the keys `k` with `lo <= k <= hi`, in ascending order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `lo > hi`.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_tree::RBTreeMap;
    ///
    /// let map = RBTreeMap::from([(1, 'a'), (3, 'c'), (5, 'e'), (7, 'g')]);
    /// let keys: Vec<_> = map.keys_between(&2, &5).unwrap().copied().collect();
    /// assert_eq!(keys, [3, 5]);
    /// assert!(map.keys_between(&5, &2).is_err());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to construct, amortized O(1) per key.
    pub fn keys_between<Q>(&self, lo: &Q, hi: &Q) -> Result<Keys<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if lo > hi {
            return Err(Error::InvalidArgument {
                operation: "keys_between",
            });
        }
        Ok(Keys {
            range: Range::new(&self.raw, Bound::Included(lo), Bound::Included(hi)),
        })
    }
}

/// Indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use llrb_tree::{RBTreeMap, Rank};
///
/// let mut map = RBTreeMap::new();
/// map.insert("a", 1);
/// map.insert("b", 2);
///
/// assert_eq!(map[Rank(0)], 1);
/// ```
impl<K, V> Index<Rank> for RBTreeMap<K, V> {
    type Output = V;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.get_by_rank(rank.0).map(|(_, v)| v).expect("index out of bounds")
    }
}

/// Mutably indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use llrb_tree::{RBTreeMap, Rank};
///
/// let mut map = RBTreeMap::from([("a", 1), ("b", 2)]);
/// map[Rank(1)] = 5;
///
/// assert_eq!(map.get(&"b"), Some(&5));
/// ```
impl<K, V> IndexMut<Rank> for RBTreeMap<K, V> {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        self.get_by_rank_mut(rank.0).map(|(_, v)| v).expect("index out of bounds")
    }
}
