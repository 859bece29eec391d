//! Doubly-linked sequence over external storage.
//!
//! Nodes live in a [`Storage`], wrapped in [`ListNode`]; a [`Sequence`]
//! only tracks head, tail, and length. Any node can be spliced out in O(1)
//! given its key, and a node unlinked from one sequence can be linked into
//! another without touching storage.
//!
//! # Storage Invariant
//!
//! A sequence must always be used with the same storage instance, and a key
//! handed to [`Sequence::splice_out`] or [`Sequence::move_to_front`] must be
//! linked in *that* sequence. Both are the caller's responsibility.
//! `splice_out` checks membership with debug assertions; `move_to_front`
//! panics on a key it cannot relink.
//!
//! # Example
//!
//! ```
//! use nexus_sq::{Directory, ListNode, Sequence};
//!
//! let mut storage: Directory<ListNode<u64>> = Directory::new();
//! let mut waiting: Sequence<u64, Directory<ListNode<u64>>> = Sequence::new();
//! let mut done: Sequence<u64, Directory<ListNode<u64>>> = Sequence::new();
//!
//! let a = waiting.push_back(&mut storage, 10);
//! let b = waiting.push_back(&mut storage, 20);
//! let c = waiting.push_back(&mut storage, 30);
//!
//! // Splice from the middle - O(1)
//! waiting.splice_out(&mut storage, b);
//! done.link_back(&mut storage, b);
//!
//! assert_eq!(waiting.display(&storage).to_string(), "[10 30]");
//! assert_eq!(done.display(&storage).to_string(), "[20]");
//!
//! // Relocate without changing the length
//! waiting.move_to_front(&mut storage, c);
//! assert_eq!(waiting.keys(&storage).collect::<Vec<_>>(), vec![c, a]);
//! assert_eq!(waiting.len(), 2);
//! ```

use core::fmt;
use std::marker::PhantomData;

use crate::{Key, Storage, UnboundedStorage};

/// Type alias for sequence storage backed by `slab::Slab`.
#[cfg(feature = "slab")]
pub type SlabSequenceStorage<T> = slab::Slab<ListNode<T, usize>>;

/// A node in a sequence.
///
/// Wraps user data with prev/next links. Users reach the data through the
/// sequence's accessors; the links are an implementation detail.
#[derive(Debug)]
pub struct ListNode<T, K: Key = u32> {
    pub(crate) data: T,
    pub(crate) prev: K,
    pub(crate) next: K,
}

impl<T, K: Key> ListNode<T, K> {
    /// Creates a new unlinked node.
    #[inline]
    fn new(data: T) -> Self {
        Self {
            data,
            prev: K::NONE,
            next: K::NONE,
        }
    }
}

/// A doubly-linked sequence over external storage.
///
/// # Type Parameters
///
/// - `T`: Element type
/// - `S`: Storage type (e.g. [`Directory<ListNode<T>>`](crate::Directory))
/// - `K`: Key type (default `u32`)
#[derive(Debug)]
pub struct Sequence<T, S, K: Key = u32>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    head: K,
    tail: K,
    len: usize,
    _marker: PhantomData<(T, S)>,
}

impl<T, S, K: Key> Default for Sequence<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Base impl - works with any Storage (read/link/unlink operations)
// =============================================================================

impl<T, S, K: Key> Sequence<T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    /// Creates an empty sequence.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: K::NONE,
            tail: K::NONE,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Returns the number of linked nodes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no nodes are linked.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the front node's key, or `None` if empty.
    #[inline]
    pub fn front_key(&self) -> Option<K> {
        if self.head.is_none() { None } else { Some(self.head) }
    }

    /// Returns the back node's key, or `None` if empty.
    #[inline]
    pub fn back_key(&self) -> Option<K> {
        if self.tail.is_none() { None } else { Some(self.tail) }
    }

    // ========================================================================
    // Link operations (relink only, storage untouched)
    // ========================================================================

    /// Links an existing node at the front.
    ///
    /// The node must already exist in storage and not be in any sequence.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not valid in storage.
    #[inline]
    pub fn link_front(&mut self, storage: &mut S, key: K) {
        let node = storage.get_mut(key).expect("invalid key");
        node.next = self.head;
        node.prev = K::NONE;

        if self.head.is_some() {
            // Safety: head is valid when is_some()
            unsafe { storage.get_unchecked_mut(self.head) }.prev = key;
        } else {
            self.tail = key;
        }

        self.head = key;
        self.len += 1;
    }

    /// Links an existing node at the back.
    ///
    /// The node must already exist in storage and not be in any sequence.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not valid in storage.
    #[inline]
    pub fn link_back(&mut self, storage: &mut S, key: K) {
        let node = storage.get_mut(key).expect("invalid key");
        node.prev = self.tail;
        node.next = K::NONE;

        if self.tail.is_some() {
            // Safety: tail is valid when is_some()
            unsafe { storage.get_unchecked_mut(self.tail) }.next = key;
        } else {
            self.head = key;
        }

        self.tail = key;
        self.len += 1;
    }

    /// Unlinks the front node and returns its key.
    ///
    /// The node stays in storage. Returns `None` if the sequence is empty.
    #[inline]
    pub fn pop_front(&mut self, storage: &mut S) -> Option<K> {
        let key = self.front_key()?;
        self.splice_out(storage, key);
        Some(key)
    }

    /// Unlinks `key` from wherever it sits in this sequence.
    ///
    /// O(1): the neighbours are relinked to each other and the node's own
    /// links are cleared. The node stays in storage.
    ///
    /// `key` must be linked in this sequence. That is not checked in release
    /// builds; callers track membership themselves.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not valid in storage.
    #[inline]
    pub fn splice_out(&mut self, storage: &mut S, key: K) {
        let node = storage.get(key).expect("invalid key");
        let prev = node.prev;
        let next = node.next;

        debug_assert!(
            if prev.is_none() { self.head == key } else { self.head != key },
            "splice_out: node is not linked in this sequence"
        );
        debug_assert!(
            if next.is_none() { self.tail == key } else { self.tail != key },
            "splice_out: node is not linked in this sequence"
        );

        if prev.is_some() {
            // Safety: prev is valid when is_some() (list invariant)
            unsafe { storage.get_unchecked_mut(prev) }.next = next;
        } else {
            self.head = next;
        }

        if next.is_some() {
            // Safety: next is valid when is_some() (list invariant)
            unsafe { storage.get_unchecked_mut(next) }.prev = prev;
        } else {
            self.tail = prev;
        }

        // Safety: key validated above
        let node = unsafe { storage.get_unchecked_mut(key) };
        node.prev = K::NONE;
        node.next = K::NONE;

        self.len -= 1;
    }

    /// Moves a linked node to the front.
    ///
    /// A single relocation: the length never changes, and a node already at
    /// the front is left alone.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not valid in storage, if the sequence is empty, or
    /// if `key` has no predecessor (an unlinked node).
    #[inline]
    pub fn move_to_front(&mut self, storage: &mut S, key: K) {
        if self.head == key {
            return;
        }

        let node = storage.get(key).expect("invalid key");
        let prev = node.prev;
        let next = node.next;

        // Every linked node other than the head has a predecessor
        assert!(
            prev.is_some() && self.head.is_some(),
            "move_to_front: node is not linked in this sequence"
        );

        // Safety: prev is valid when is_some() (list invariant)
        unsafe { storage.get_unchecked_mut(prev) }.next = next;

        if next.is_some() {
            // Safety: next is valid when is_some() (list invariant)
            unsafe { storage.get_unchecked_mut(next) }.prev = prev;
        } else {
            self.tail = prev;
        }

        // Safety: head is valid when is_some(), checked above
        unsafe { storage.get_unchecked_mut(self.head) }.prev = key;

        // Safety: key validated above
        let node = unsafe { storage.get_unchecked_mut(key) };
        node.next = self.head;
        node.prev = K::NONE;

        self.head = key;
    }

    /// Forgets every link without touching storage.
    ///
    /// Only meaningful when the storage has been cleared as well.
    #[inline]
    pub fn reset(&mut self) {
        self.head = K::NONE;
        self.tail = K::NONE;
        self.len = 0;
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Returns an iterator over references to elements, front to back.
    #[inline]
    pub fn iter<'a>(&self, storage: &'a S) -> Iter<'a, T, S, K> {
        Iter {
            storage,
            front: self.head,
            back: self.tail,
            _marker: PhantomData,
        }
    }

    /// Returns an iterator over keys, front to back.
    #[inline]
    pub fn keys<'a>(&self, storage: &'a S) -> Keys<'a, T, S, K> {
        Keys {
            storage,
            front: self.head,
            back: self.tail,
            _marker: PhantomData,
        }
    }

    /// Renders the elements front to back as `[a b c]`.
    #[inline]
    pub fn display<'a>(&self, storage: &'a S) -> DisplaySequence<'a, T, S, K>
    where
        T: fmt::Display,
    {
        DisplaySequence {
            iter: self.iter(storage),
        }
    }
}

// =============================================================================
// Unbounded storage impl - insert then link
// =============================================================================

impl<T, S, K: Key> Sequence<T, S, K>
where
    S: UnboundedStorage<ListNode<T, K>, Key = K>,
{
    /// Stores `value` in a fresh node and links it at the back.
    ///
    /// Returns the key of the new node.
    #[inline]
    pub fn push_back(&mut self, storage: &mut S, value: T) -> K {
        let key = storage.insert(ListNode::new(value));
        self.link_back(storage, key);
        key
    }

}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over references to sequence elements.
pub struct Iter<'a, T, S, K: Key> {
    storage: &'a S,
    front: K,
    back: K,
    _marker: PhantomData<T>,
}

impl<T, S, K: Key> Clone for Iter<'_, T, S, K> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage,
            front: self.front,
            back: self.back,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: 'a, S, K: Key + 'a> Iterator for Iter<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_none() {
            return None;
        }

        // Safety: list invariants guarantee front is valid
        let node = unsafe { self.storage.get_unchecked(self.front) };

        // Met in the middle
        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.front = node.next;
        }

        Some(&node.data)
    }
}

/// Iterator over keys in a sequence.
pub struct Keys<'a, T, S, K: Key> {
    storage: &'a S,
    front: K,
    back: K,
    _marker: PhantomData<T>,
}

impl<'a, T, S, K: Key> Iterator for Keys<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_none() {
            return None;
        }

        let key = self.front;
        // Safety: list invariants guarantee front is valid
        let node = unsafe { self.storage.get_unchecked(self.front) };

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.front = node.next;
        }

        Some(key)
    }
}

impl<'a, T, S, K: Key> DoubleEndedIterator for Keys<'a, T, S, K>
where
    S: Storage<ListNode<T, K>, Key = K>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back.is_none() {
            return None;
        }

        let key = self.back;
        // Safety: list invariants guarantee back is valid
        let node = unsafe { self.storage.get_unchecked(self.back) };

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.back = node.prev;
        }

        Some(key)
    }
}

/// Formats a sequence as `[a b c]`. Returned by [`Sequence::display`].
pub struct DisplaySequence<'a, T, S, K: Key> {
    iter: Iter<'a, T, S, K>,
}

impl<'a, T: 'a, S, K: Key + 'a> fmt::Display for DisplaySequence<'a, T, S, K>
where
    T: fmt::Display,
    S: Storage<ListNode<T, K>, Key = K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.iter.clone().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            fmt::Display::fmt(value, f)?;
        }
        f.write_str("]")
    }
}
