//! Storage traits for containers with stable keys, and the growable
//! [`Directory`] used by the service queue.
//!
//! Storage owns the nodes; sequences only coordinate keys into it. This
//! split is what lets a node move between sequences without being freed.

use std::marker::PhantomData;

use log::debug;

use crate::Key;

/// Smallest non-zero directory capacity.
const MIN_CAPACITY: usize = 2;

/// Slab-like storage with stable keys.
///
/// # Requirements
///
/// Implementations must provide:
/// - **Stable keys**: a key stays valid for the lifetime of its entry
/// - **O(1)** get operations
///
/// # Implementations
///
/// - [`Directory<T>`] - append-only, doubling growth (in this crate)
/// - `slab::Slab<T>` - growable, slot reuse (feature `slab`)
pub trait Storage<T> {
    /// Key type for this storage.
    type Key: Key;

    /// Returns the number of occupied entries.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a reference to the value at `key`, if present.
    fn get(&self, key: Self::Key) -> Option<&T>;

    /// Returns a mutable reference to the value at `key`, if present.
    fn get_mut(&mut self, key: Self::Key) -> Option<&mut T>;

    /// Returns a reference without bounds checking.
    ///
    /// # Safety
    ///
    /// `key` must be valid and occupied.
    unsafe fn get_unchecked(&self, key: Self::Key) -> &T;

    /// Returns a mutable reference without bounds checking.
    ///
    /// # Safety
    ///
    /// `key` must be valid and occupied.
    unsafe fn get_unchecked_mut(&mut self, key: Self::Key) -> &mut T;
}

/// Storage that can always accept another value.
pub trait UnboundedStorage<T>: Storage<T> {
    /// Inserts a value, returning its stable key.
    fn insert(&mut self, value: T) -> Self::Key;
}

// =============================================================================
// Directory - append-only, capacity doubling
// =============================================================================

/// Append-only storage whose keys are dense insertion indices.
///
/// The `n`-th inserted value gets key `n` and keeps it until the directory is
/// dropped or cleared. Capacity doubles whenever an insert finds the
/// directory full, so `M` inserts cost O(M) in total.
///
/// # Example
///
/// ```
/// use nexus_sq::{Directory, Storage, UnboundedStorage};
///
/// let mut dir: Directory<&str> = Directory::new();
/// let a = dir.insert("a");
/// let b = dir.insert("b");
/// let c = dir.insert("c");
///
/// assert_eq!((a, b, c), (0, 1, 2));
/// assert_eq!(dir.get(b), Some(&"b"));
/// assert_eq!(dir.get(3), None);
/// assert_eq!(dir.capacity(), 4);
/// ```
#[derive(Debug)]
pub struct Directory<T, K: Key = u32> {
    entries: Vec<T>,
    _marker: PhantomData<K>,
}

impl<T, K: Key> Default for Directory<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: Key> Directory<T, K> {
    /// Creates an empty directory. Does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Creates a directory with room for at least `min_capacity` entries.
    ///
    /// Capacity is rounded up to a power of 2 so that later doubling keeps
    /// it one.
    pub fn with_capacity(min_capacity: usize) -> Self {
        if min_capacity == 0 {
            return Self::new();
        }
        let capacity = min_capacity.max(MIN_CAPACITY).next_power_of_two();
        Self {
            entries: Vec::with_capacity(capacity),
            _marker: PhantomData,
        }
    }

    /// Returns the number of entries the directory holds without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Returns the number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the key the next insert will be assigned.
    #[inline]
    pub fn next_key(&self) -> K {
        K::from_usize(self.entries.len())
    }

    /// Drops every entry. Capacity is kept.
    ///
    /// Any sequence still holding keys into this directory must be reset
    /// as well; their keys no longer name anything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cold]
    fn grow(&mut self) {
        let old = self.entries.capacity();
        let new = (old * 2).max(MIN_CAPACITY);
        self.entries.reserve_exact(new - self.entries.len());
        debug!("directory grew from {} to {} slots", old, new);
    }
}

impl<T, K: Key> Storage<T> for Directory<T, K> {
    type Key = K;

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    fn get(&self, key: K) -> Option<&T> {
        self.entries.get(key.as_usize())
    }

    #[inline]
    fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.entries.get_mut(key.as_usize())
    }

    #[inline]
    unsafe fn get_unchecked(&self, key: K) -> &T {
        unsafe { self.entries.get_unchecked(key.as_usize()) }
    }

    #[inline]
    unsafe fn get_unchecked_mut(&mut self, key: K) -> &mut T {
        unsafe { self.entries.get_unchecked_mut(key.as_usize()) }
    }
}

impl<T, K: Key> UnboundedStorage<T> for Directory<T, K> {
    /// Appends `value` and returns its key.
    ///
    /// # Panics
    ///
    /// Panics if the key space is exhausted (the next key would be the
    /// `NONE` sentinel).
    #[inline]
    fn insert(&mut self, value: T) -> K {
        let index = self.entries.len();
        assert!(
            index < K::NONE.as_usize(),
            "directory exhausted its key space"
        );

        if index == self.entries.capacity() {
            self.grow();
        }

        self.entries.push(value);
        K::from_usize(index)
    }
}

// =============================================================================
// slab::Slab implementation
// =============================================================================

#[cfg(feature = "slab")]
impl<T> Storage<T> for slab::Slab<T> {
    type Key = usize;

    #[inline]
    fn len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn get(&self, key: usize) -> Option<&T> {
        self.get(key)
    }

    #[inline]
    fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        self.get_mut(key)
    }

    #[inline]
    unsafe fn get_unchecked(&self, key: usize) -> &T {
        unsafe { self.get(key).unwrap_unchecked() }
    }

    #[inline]
    unsafe fn get_unchecked_mut(&mut self, key: usize) -> &mut T {
        unsafe { self.get_mut(key).unwrap_unchecked() }
    }
}

#[cfg(feature = "slab")]
impl<T> UnboundedStorage<T> for slab::Slab<T> {
    #[inline]
    fn insert(&mut self, value: T) -> usize {
        self.insert(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty_and_unallocated() {
        let dir: Directory<u64> = Directory::new();
        assert!(dir.is_empty());
        assert_eq!(dir.len(), 0);
        assert_eq!(dir.capacity(), 0);
        assert_eq!(dir.next_key(), 0);
    }

    #[test]
    fn keys_are_insertion_order() {
        let mut dir: Directory<u64> = Directory::new();
        for i in 0..10u64 {
            assert_eq!(dir.insert(i * 10), i as u32);
        }
        assert_eq!(dir.len(), 10);
        for i in 0..10u32 {
            assert_eq!(dir.get(i), Some(&(u64::from(i) * 10)));
        }
    }

    #[test]
    fn out_of_range_get_is_none() {
        let mut dir: Directory<u64> = Directory::new();
        dir.insert(1);
        assert_eq!(dir.get(1), None);
        assert_eq!(dir.get(u32::NONE), None);
        assert!(dir.get_mut(5).is_none());
    }

    #[test]
    fn get_mut() {
        let mut dir: Directory<u64> = Directory::new();
        let key = dir.insert(10);
        *dir.get_mut(key).unwrap() = 20;
        assert_eq!(dir.get(key), Some(&20));
    }

    #[test]
    fn capacity_doubles() {
        let mut dir: Directory<u64> = Directory::new();
        let mut seen = Vec::new();
        for i in 0..33u64 {
            dir.insert(i);
            if seen.last() != Some(&dir.capacity()) {
                seen.push(dir.capacity());
            }
        }
        assert_eq!(seen, vec![2, 4, 8, 16, 32, 64]);
    }

    #[test]
    fn with_capacity_rounds_to_power_of_two() {
        let dir: Directory<u64> = Directory::with_capacity(100);
        assert_eq!(dir.capacity(), 128);

        let dir: Directory<u64> = Directory::with_capacity(1);
        assert_eq!(dir.capacity(), 2);

        let dir: Directory<u64> = Directory::with_capacity(0);
        assert_eq!(dir.capacity(), 0);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut dir: Directory<u64> = Directory::new();
        for i in 0..5 {
            dir.insert(i);
        }
        dir.clear();
        assert!(dir.is_empty());
        assert_eq!(dir.capacity(), 8);
        assert_eq!(dir.insert(99), 0);
    }

    #[test]
    fn drop_releases_every_entry() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

        #[derive(Debug)]
        struct DropCounter;
        impl Drop for DropCounter {
            fn drop(&mut self) {
                DROP_COUNT.fetch_add(1, Ordering::SeqCst);
            }
        }

        DROP_COUNT.store(0, Ordering::SeqCst);

        {
            let mut dir: Directory<DropCounter> = Directory::new();
            dir.insert(DropCounter);
            dir.insert(DropCounter);
            dir.insert(DropCounter);
        }

        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 3);
    }

    #[cfg(feature = "slab")]
    mod slab_tests {
        use super::*;

        #[test]
        fn insert_get() {
            let mut storage: slab::Slab<u64> = slab::Slab::new();

            let key = UnboundedStorage::insert(&mut storage, 42);
            assert_eq!(Storage::get(&storage, key), Some(&42));
            assert_eq!(Storage::len(&storage), 1);
        }
    }
}
