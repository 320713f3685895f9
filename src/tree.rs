//! A self-balancing search tree ordered by an injected comparator.

use std::cmp::{self, Ordering};
use std::fmt;
use std::mem;

use crate::error::Error;

/// A total order over keys, injected into a search tree at construction.
///
/// The comparator defines both the placement of keys and their equality for
/// deduplication. It must be a total order; the tree does not check this.
pub trait Comparator<K> {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;
}

/// Orders keys by their natural `Ord` instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord> Comparator<K> for NaturalOrder {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

impl<K, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        self(lhs, rhs)
    }
}

/// An ordered search tree implemented as an AVL tree.
///
/// Keys are sorted according to the comparator given at construction, or
/// their natural order if none is provided. There are no duplicates:
/// inserting a key that compares equal to a stored key replaces it.
///
/// ```
/// use avl_search::SearchTree;
/// let mut tree = SearchTree::new();
/// tree.insert(2);
/// tree.insert(1);
/// tree.insert(3);
/// assert_eq!(tree.minimum(), Ok(&1));
/// assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
/// ```
#[derive(Clone)]
pub struct SearchTree<K, C = NaturalOrder> {
    comparator: C,
    root: Link<K>,
    len: usize,
}

type Link<K> = Option<Box<Node<K>>>;

/*
 INVARIANT: Keys in the left child are smaller than the key in a node and
 keys in the right child are greater. There are no duplicate keys. The
 difference in height between left and right children is at most 1 and the
 cached height of a node is one more than the height of its taller child.
*/
#[derive(Clone)]
struct Node<K> {
    key: K,
    height: usize,
    left: Link<K>,
    right: Link<K>,
}

impl<K> Node<K> {
    fn new(key: K) -> Box<Self> {
        Box::new(Node {
            key,
            height: 1,
            left: None,
            right: None,
        })
    }

    // Height of a possibly empty subtree.
    fn height(link: &Link<K>) -> usize {
        match link {
            None => 0,
            Some(node) => node.height,
        }
    }

    // Positive if the node is left leaning, negative if right leaning.
    fn balance_factor(&self) -> isize {
        Self::height(&self.left) as isize - Self::height(&self.right) as isize
    }

    fn balance(link: &Link<K>) -> isize {
        match link {
            None => 0,
            Some(node) => node.balance_factor(),
        }
    }

    fn set_height(&mut self) {
        self.height = 1 + cmp::max(Self::height(&self.left), Self::height(&self.right));
    }

    /// Rotates the subtree to the right, promoting the left child.
    /// Returns the new subtree root. Heights are recomputed bottom-up.
    fn rotated_right(mut self: Box<Self>) -> Box<Self> {
        match self.left.take() {
            None => self,
            Some(mut left) => {
                self.left = left.right.take();
                self.set_height();
                left.right = Some(self);
                left.set_height();
                left
            }
        }
    }

    /// Rotates the subtree to the left, promoting the right child.
    /// Returns the new subtree root.
    fn rotated_left(mut self: Box<Self>) -> Box<Self> {
        match self.right.take() {
            None => self,
            Some(mut right) => {
                self.right = right.left.take();
                self.set_height();
                right.left = Some(self);
                right.set_height();
                right
            }
        }
    }

    /// Restores the AVL condition at this node and refreshes its height.
    /// The initial imbalance must not exceed 2, which always holds after a
    /// single update below. Returns the new subtree root.
    fn balanced(mut self: Box<Self>) -> Box<Self> {
        let balance = self.balance_factor();
        if balance > 1 {
            // left leaning
            if Self::balance(&self.left) < 0 {
                // left child is right leaning, rotate it first
                if let Some(left) = self.left.take() {
                    self.left = Some(left.rotated_left());
                }
            }
            self.rotated_right()
        } else if balance < -1 {
            // right leaning
            if Self::balance(&self.right) > 0 {
                // right child is left leaning, rotate it first
                if let Some(right) = self.right.take() {
                    self.right = Some(right.rotated_right());
                }
            }
            self.rotated_left()
        } else {
            self.set_height();
            self
        }
    }

    /// Unlinks the node with the smallest key from the subtree.
    /// Returns the modified subtree and the removed key.
    fn split_min(mut self: Box<Self>) -> (Link<K>, K) {
        match self.left.take() {
            None => (self.right.take(), self.key),
            Some(left) => {
                let (left, min) = left.split_min();
                self.left = left;
                (Some(self.balanced()), min)
            }
        }
    }

    /// Unlinks the node with the greatest key from the subtree.
    /// Returns the modified subtree and the removed key.
    fn split_max(mut self: Box<Self>) -> (Link<K>, K) {
        match self.right.take() {
            None => (self.left.take(), self.key),
            Some(right) => {
                let (right, max) = right.split_max();
                self.right = right;
                (Some(self.balanced()), max)
            }
        }
    }

    /// Unlinks the root node of the subtree. A node with two children keeps
    /// its place and takes over the key of its in-order successor, the
    /// minimum of the right subtree, which is unlinked instead.
    /// Returns the modified subtree and the removed key.
    fn unlinked(mut self: Box<Self>) -> (Link<K>, K) {
        match (self.left.take(), self.right.take()) {
            (None, right) => (right, self.key),
            (left, None) => (left, self.key),
            (left, Some(right)) => {
                let (right, successor) = right.split_min();
                let removed = mem::replace(&mut self.key, successor);
                self.left = left;
                self.right = right;
                (Some(self.balanced()), removed)
            }
        }
    }
}

// Outcome of the combined delete-or-update-or-insert descent.
enum Upsert<K> {
    Unchanged,
    Inserted,
    Deleted,
    Relocated(K),
}

impl<K: Ord> SearchTree<K> {
    /// Creates an empty search tree ordered by the keys' natural order.
    /// No memory is allocated until the first key is inserted.
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K: Ord> Default for SearchTree<K> {
    /// Creates an empty search tree ordered by the keys' natural order.
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> SearchTree<K, C> {
    /// Returns true if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of keys in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree: 0 if empty, 1 for a single node.
    pub fn height(&self) -> usize {
        Node::height(&self.root)
    }

    /// Clears the tree, releasing all nodes.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Returns the ordering in force for this tree.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns a lazy iterator over the keys in ascending order.
    ///
    /// Each call produces a fresh traversal over the tree's current contents;
    /// independent traversals do not affect each other. The iterator borrows
    /// the tree, so the tree cannot be mutated while it is alive.
    pub fn in_order(&self) -> InOrder<'_, K> {
        InOrder {
            stack: initial_stack(&self.root),
        }
    }

    /// Returns a lazy iterator over the keys in pre-order
    /// (node before its children).
    pub fn pre_order(&self) -> PreOrder<'_, K> {
        PreOrder {
            stack: initial_stack(&self.root),
        }
    }

    /// Returns a lazy iterator over the keys in post-order
    /// (node after its children).
    pub fn post_order(&self) -> PostOrder<'_, K> {
        PostOrder {
            stack: initial_stack(&self.root),
        }
    }
}

impl<K, C: Comparator<K>> SearchTree<K, C> {
    /// Creates an empty search tree with the given key order.
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            comparator,
            root: None,
            len: 0,
        }
    }

    /// Looks up a key. Returns the stored key, whose payload may differ from
    /// the probe for comparator-equal keys, or `None` if it is absent.
    pub fn search(&self, key: &K) -> Option<&K> {
        self.search_by(|stored| self.comparator.compare(key, stored))
    }

    /// Looks up a key with an ordering function: `f` returns the ordering of
    /// the sought key relative to the stored key it is given.
    pub fn search_by<F>(&self, mut f: F) -> Option<&K>
    where
        F: FnMut(&K) -> Ordering,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match f(&node.key) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
                Ordering::Equal => return Some(&node.key),
            }
        }
        None
    }

    /// Returns true if a key comparing equal to the given key is present.
    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Inserts a key. If a key comparing equal is already present it is
    /// replaced in place and returned; the tree structure does not change in
    /// that case.
    pub fn insert(&mut self, key: K) -> Option<K> {
        let (root, replaced) = Self::insert_at(&self.comparator, self.root.take(), key);
        self.root = Some(root);
        if replaced.is_none() {
            self.len += 1;
        }
        replaced
    }

    // Returns the modified subtree and the replaced key, if any.
    fn insert_at(comparator: &C, link: Link<K>, key: K) -> (Box<Node<K>>, Option<K>) {
        match link {
            None => (Node::new(key), None),
            Some(mut node) => match comparator.compare(&key, &node.key) {
                Ordering::Less => {
                    let (left, replaced) = Self::insert_at(comparator, node.left.take(), key);
                    node.left = Some(left);
                    (node.balanced(), replaced)
                }
                Ordering::Greater => {
                    let (right, replaced) = Self::insert_at(comparator, node.right.take(), key);
                    node.right = Some(right);
                    (node.balanced(), replaced)
                }
                Ordering::Equal => {
                    // Same position in the order, payload may differ.
                    let replaced = mem::replace(&mut node.key, key);
                    (node, Some(replaced))
                }
            },
        }
    }

    /// Removes the key comparing equal to the given key.
    /// Returns the removed key, or `None` if it was absent (a no-op).
    pub fn delete(&mut self, key: &K) -> Option<K> {
        let comparator = &self.comparator;
        let (root, removed) = Self::delete_at(self.root.take(), &mut |stored| {
            comparator.compare(key, stored)
        });
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Removes the key matching an ordering function: `f` returns the
    /// ordering of the sought key relative to the stored key it is given.
    /// Returns the removed key, or `None` if no key matched.
    pub fn delete_by<F>(&mut self, mut f: F) -> Option<K>
    where
        F: FnMut(&K) -> Ordering,
    {
        let (root, removed) = Self::delete_at(self.root.take(), &mut f);
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    // Returns the modified subtree and the removed key, if any.
    fn delete_at(link: Link<K>, f: &mut dyn FnMut(&K) -> Ordering) -> (Link<K>, Option<K>) {
        match link {
            // key not found, nothing to do
            None => (None, None),
            Some(mut node) => match f(&node.key) {
                Ordering::Less => {
                    let (left, removed) = Self::delete_at(node.left.take(), f);
                    node.left = left;
                    (Some(node.balanced()), removed)
                }
                Ordering::Greater => {
                    let (right, removed) = Self::delete_at(node.right.take(), f);
                    node.right = right;
                    (Some(node.balanced()), removed)
                }
                Ordering::Equal => {
                    let (link, removed) = node.unlinked();
                    (link, Some(removed))
                }
            },
        }
    }

    /// Returns the smallest key in the tree.
    pub fn minimum(&self) -> Result<&K, Error> {
        let mut node = self
            .root
            .as_deref()
            .ok_or(Error::EmptySearchTree("minimum"))?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Ok(&node.key)
    }

    /// Returns the greatest key in the tree.
    pub fn maximum(&self) -> Result<&K, Error> {
        let mut node = self
            .root
            .as_deref()
            .ok_or(Error::EmptySearchTree("maximum"))?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Ok(&node.key)
    }

    /// Removes and returns the smallest key in the tree.
    pub fn delete_minimum(&mut self) -> Result<K, Error> {
        match self.root.take() {
            None => Err(Error::EmptySearchTree("delete_minimum")),
            Some(root) => {
                let (root, min) = root.split_min();
                self.root = root;
                self.len -= 1;
                Ok(min)
            }
        }
    }

    /// Removes and returns the greatest key in the tree.
    pub fn delete_maximum(&mut self) -> Result<K, Error> {
        match self.root.take() {
            None => Err(Error::EmptySearchTree("delete_maximum")),
            Some(root) => {
                let (root, max) = root.split_max();
                self.root = root;
                self.len -= 1;
                Ok(max)
            }
        }
    }

    /// Applies a delete-update-insert policy at `key` in a single descent.
    ///
    /// If a key comparing equal to `key` is present, `delete` decides whether
    /// it is removed; otherwise `update` computes a replacement key. A
    /// replacement that still compares equal is written in place. A
    /// replacement with a different position in the order cannot stay where
    /// it is: the node is unlinked and the replacement key is re-inserted at
    /// its proper position once the descent has completed. If no equal key is
    /// present, `key` itself is inserted when `insert_if_absent` is set.
    pub fn delete_or_update_or_insert<D, U>(
        &mut self,
        key: K,
        mut delete: D,
        mut update: U,
        insert_if_absent: bool,
    ) where
        D: FnMut(&K) -> bool,
        U: FnMut(&K) -> K,
    {
        let (root, outcome) = Self::upsert_at(
            &self.comparator,
            self.root.take(),
            key,
            &mut delete,
            &mut update,
            insert_if_absent,
        );
        self.root = root;
        match outcome {
            Upsert::Unchanged => {}
            Upsert::Inserted => self.len += 1,
            Upsert::Deleted => self.len -= 1,
            Upsert::Relocated(new_key) => {
                self.len -= 1;
                self.insert(new_key);
            }
        }
    }

    fn upsert_at(
        comparator: &C,
        link: Link<K>,
        key: K,
        delete: &mut dyn FnMut(&K) -> bool,
        update: &mut dyn FnMut(&K) -> K,
        insert_if_absent: bool,
    ) -> (Link<K>, Upsert<K>) {
        match link {
            None => {
                if insert_if_absent {
                    (Some(Node::new(key)), Upsert::Inserted)
                } else {
                    (None, Upsert::Unchanged)
                }
            }
            Some(mut node) => match comparator.compare(&key, &node.key) {
                Ordering::Less => {
                    let (left, outcome) = Self::upsert_at(
                        comparator,
                        node.left.take(),
                        key,
                        delete,
                        update,
                        insert_if_absent,
                    );
                    node.left = left;
                    (Some(node.balanced()), outcome)
                }
                Ordering::Greater => {
                    let (right, outcome) = Self::upsert_at(
                        comparator,
                        node.right.take(),
                        key,
                        delete,
                        update,
                        insert_if_absent,
                    );
                    node.right = right;
                    (Some(node.balanced()), outcome)
                }
                Ordering::Equal => {
                    if delete(&node.key) {
                        let (link, _) = node.unlinked();
                        (link, Upsert::Deleted)
                    } else {
                        let new_key = update(&node.key);
                        if comparator.compare(&new_key, &node.key) == Ordering::Equal {
                            // Position unchanged, write in place.
                            node.key = new_key;
                            (Some(node), Upsert::Unchanged)
                        } else {
                            // Sort position changed: relocation needs an
                            // unlink here and a fresh insert afterwards.
                            let (link, _) = node.unlinked();
                            (link, Upsert::Relocated(new_key))
                        }
                    }
                }
            },
        }
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        // Check subtree structure. Returns the height of the subtree.
        fn check<K, C: Comparator<K>>(comparator: &C, link: &Link<K>, count: &mut usize) -> usize {
            match link.as_deref() {
                None => 0,
                Some(node) => {
                    *count += 1;
                    let left_height = check(comparator, &node.left, count);
                    let right_height = check(comparator, &node.right, count);

                    // Check order against child nodes
                    if let Some(left) = node.left.as_deref() {
                        assert_eq!(comparator.compare(&left.key, &node.key), Ordering::Less);
                    }
                    if let Some(right) = node.right.as_deref() {
                        assert_eq!(comparator.compare(&right.key, &node.key), Ordering::Greater);
                    }

                    // Check cached height
                    let height = 1 + cmp::max(left_height, right_height);
                    assert_eq!(node.height, height);

                    // Check AVL condition (near balance)
                    assert!(left_height <= right_height + 1);
                    assert!(right_height <= left_height + 1);

                    height
                }
            }
        }

        let mut count = 0;
        check(&self.comparator, &self.root, &mut count);
        assert_eq!(count, self.len);

        // Check global order: in-order keys must be strictly ascending
        let mut previous: Option<&K> = None;
        for key in self.in_order() {
            if let Some(previous) = previous {
                assert_eq!(self.comparator.compare(previous, key), Ordering::Less);
            }
            previous = Some(key);
        }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for SearchTree<K, C> {
    /// Formats the tree structurally as `(left key right)`, with `_` for an
    /// empty subtree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn subtree<K: fmt::Debug>(link: &Link<K>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match link.as_deref() {
                None => write!(f, "_"),
                Some(node) => {
                    write!(f, "(")?;
                    subtree(&node.left, f)?;
                    write!(f, " {:?} ", node.key)?;
                    subtree(&node.right, f)?;
                    write!(f, ")")
                }
            }
        }

        write!(f, "SearchTree")?;
        subtree(&self.root, f)
    }
}

impl<'a, K, C> IntoIterator for &'a SearchTree<K, C> {
    type Item = &'a K;
    type IntoIter = InOrder<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.in_order()
    }
}

// A traversal stack entry: either a key ready to be emitted or a subtree
// whose expansion is still pending.
enum Frame<'a, K> {
    Ready(&'a K),
    Pending(&'a Node<K>),
}

impl<K> Clone for Frame<'_, K> {
    fn clone(&self) -> Self {
        match self {
            Frame::Ready(key) => Frame::Ready(key),
            Frame::Pending(node) => Frame::Pending(node),
        }
    }
}

fn initial_stack<K>(root: &Link<K>) -> Vec<Frame<'_, K>> {
    match root.as_deref() {
        None => Vec::new(),
        Some(node) => vec![Frame::Pending(node)],
    }
}

/// A lazy in-order traversal over the keys of a [`SearchTree`].
///
/// Iteration state lives on an explicit stack, independent of the native
/// call stack, so the traversal can be suspended between `next` calls.
pub struct InOrder<'a, K> {
    stack: Vec<Frame<'a, K>>,
}

// Auto derived clone would have an invalid type bound of K: Clone
impl<K> Clone for InOrder<'_, K> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
        }
    }
}

impl<'a, K> Iterator for InOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        loop {
            match self.stack.pop()? {
                Frame::Ready(key) => return Some(key),
                Frame::Pending(node) => {
                    // Push in reverse of emission order, the stack is LIFO.
                    if let Some(right) = node.right.as_deref() {
                        self.stack.push(Frame::Pending(right));
                    }
                    self.stack.push(Frame::Ready(&node.key));
                    if let Some(left) = node.left.as_deref() {
                        self.stack.push(Frame::Pending(left));
                    }
                }
            }
        }
    }
}

/// A lazy pre-order traversal over the keys of a [`SearchTree`].
pub struct PreOrder<'a, K> {
    stack: Vec<Frame<'a, K>>,
}

// Auto derived clone would have an invalid type bound of K: Clone
impl<K> Clone for PreOrder<'_, K> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
        }
    }
}

impl<'a, K> Iterator for PreOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        loop {
            match self.stack.pop()? {
                Frame::Ready(key) => return Some(key),
                Frame::Pending(node) => {
                    // Push in reverse of emission order, the stack is LIFO.
                    if let Some(right) = node.right.as_deref() {
                        self.stack.push(Frame::Pending(right));
                    }
                    if let Some(left) = node.left.as_deref() {
                        self.stack.push(Frame::Pending(left));
                    }
                    self.stack.push(Frame::Ready(&node.key));
                }
            }
        }
    }
}

/// A lazy post-order traversal over the keys of a [`SearchTree`].
pub struct PostOrder<'a, K> {
    stack: Vec<Frame<'a, K>>,
}

// Auto derived clone would have an invalid type bound of K: Clone
impl<K> Clone for PostOrder<'_, K> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
        }
    }
}

impl<'a, K> Iterator for PostOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        loop {
            match self.stack.pop()? {
                Frame::Ready(key) => return Some(key),
                Frame::Pending(node) => {
                    // Push in reverse of emission order, the stack is LIFO.
                    self.stack.push(Frame::Ready(&node.key));
                    if let Some(right) = node.right.as_deref() {
                        self.stack.push(Frame::Pending(right));
                    }
                    if let Some(left) = node.left.as_deref() {
                        self.stack.push(Frame::Pending(left));
                    }
                }
            }
        }
    }
}
