//! Slot storage with stable keys.
//!
//! A [`Storage`] hands out a key for every inserted value. The key stays valid
//! until that value is removed; after removal the slot may be handed out again.
//! The sequence keeps all of its nodes in one storage and links them by key.

use std::fmt;
use std::ptr::NonNull;

use crate::Key;

/// Slab-like storage with stable keys.
///
/// # Requirements
///
/// Implementations must provide:
/// - **Stable keys**: a key addresses the same value until it is removed
/// - **O(1)** insert, remove, get
/// - **Clean rejection**: a failed insert hands the value back and leaves the
///   storage untouched
///
/// # Implementations
///
/// - [`Arena<T, K>`] - growable, optionally bounded (in this crate)
/// - `slab::Slab<T>` - growable (feature `slab`)
pub trait Storage<T> {
    /// Key type for this storage.
    type Key: Key;

    /// Inserts a value, returning its stable key.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full(value))` if the storage cannot take another value.
    fn try_insert(&mut self, value: T) -> Result<Self::Key, Full<T>>;

    /// Removes and returns the value at `key`, if present.
    fn remove(&mut self, key: Self::Key) -> Option<T>;

    /// Returns a reference to the value at `key`, if present.
    fn get(&self, key: Self::Key) -> Option<&T>;

    /// Returns a mutable reference to the value at `key`, if present.
    fn get_mut(&mut self, key: Self::Key) -> Option<&mut T>;

    /// Returns the number of occupied slots.
    fn len(&self) -> usize;

    /// Returns `true` if no slots are occupied.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every stored value.
    fn clear(&mut self);

    /// Returns an empty storage configured like this one (same limits).
    ///
    /// Used to build replacement chains off to the side.
    fn empty_like(&self) -> Self
    where
        Self: Sized;
}

/// Storage that can address one value without borrowing the others.
///
/// Mutable iteration hands out a `&mut` per node and keeps walking. That is
/// only sound if reaching the next node never creates a reference covering
/// nodes already handed out, which indexing a `Vec` or slice does.
///
/// # Safety
///
/// `value_ptr` must not create a reference to any value other than the one at
/// `key`, so pointers returned earlier for other keys stay valid across calls.
pub unsafe trait PointerStorage<T>: Storage<T> {
    /// Returns a pointer to the value at `key`, if present.
    fn value_ptr(&mut self, key: Self::Key) -> Option<NonNull<T>>;
}

/// Error returned when storage refuses a value.
///
/// Carries the rejected value so the caller keeps ownership of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage is full")
    }
}

impl<T: fmt::Debug> std::error::Error for Full<T> {}

// =============================================================================
// Arena - growable slots, free-list reuse, optional limit
// =============================================================================

#[derive(Debug)]
enum Slot<T, K> {
    Occupied(T),
    /// Vacant slot holding the next free key (or `NONE`).
    Vacant(K),
}

/// Growable slot arena.
///
/// Values live in one `Vec` of slots. Removed slots are threaded onto a free
/// list and reused LIFO, so keys stay small and dense.
///
/// An arena may be given a limit on live values. Inserting past the limit,
/// past the key type's range, or when the allocator refuses to grow the
/// backing `Vec`, is rejected with [`Full`] instead of aborting.
///
/// # Example
///
/// ```
/// use nexus_seq::{Arena, Storage};
///
/// let mut arena: Arena<&str> = Arena::with_limit(2);
/// let a = arena.try_insert("a").unwrap();
/// let _b = arena.try_insert("b").unwrap();
///
/// assert!(arena.try_insert("c").is_err());
/// assert_eq!(arena.remove(a), Some("a"));
/// assert!(arena.try_insert("c").is_ok());
/// ```
#[derive(Debug)]
pub struct Arena<T, K: Key = u32> {
    slots: Vec<Slot<T, K>>,
    /// Head of the free list.
    free: K,
    len: usize,
    limit: usize,
}

impl<T, K: Key> Arena<T, K> {
    /// Creates an unbounded arena. Does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self::with_limit(usize::MAX)
    }

    /// Creates an arena that holds at most `limit` live values.
    ///
    /// Nothing is allocated up front; the limit only caps growth.
    #[inline]
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: K::NONE,
            len: 0,
            limit,
        }
    }

    /// Returns the configured limit, or `None` if unbounded.
    #[inline]
    pub const fn limit(&self) -> Option<usize> {
        if self.limit == usize::MAX {
            None
        } else {
            Some(self.limit)
        }
    }

    /// Returns the number of live values.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no values are live.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the limit has been reached.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len >= self.limit
    }

    /// Returns the number of slots ever allocated, live or vacant.
    #[inline]
    pub fn slots(&self) -> usize {
        self.slots.len()
    }
}

impl<T, K: Key> Default for Arena<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: Key> Storage<T> for Arena<T, K> {
    type Key = K;

    fn try_insert(&mut self, value: T) -> Result<K, Full<T>> {
        if self.is_full() {
            return Err(Full(value));
        }

        let key = if let Some(key) = self.free.get() {
            let slot = &mut self.slots[key.as_usize()];
            debug_assert!(matches!(slot, Slot::Vacant(_)), "free list points at live slot");
            if let Slot::Vacant(next) = slot {
                self.free = *next;
            }
            *slot = Slot::Occupied(value);
            key
        } else {
            let index = self.slots.len();
            // NONE must stay unaddressable
            if index >= K::NONE.as_usize() || self.slots.try_reserve(1).is_err() {
                return Err(Full(value));
            }
            self.slots.push(Slot::Occupied(value));
            K::from_usize(index)
        };

        self.len += 1;
        Ok(key)
    }

    fn remove(&mut self, key: K) -> Option<T> {
        let slot = self.slots.get_mut(key.as_usize())?;
        match std::mem::replace(slot, Slot::Vacant(self.free)) {
            Slot::Occupied(value) => {
                self.free = key;
                self.len -= 1;
                Some(value)
            }
            vacant => {
                *slot = vacant;
                None
            }
        }
    }

    #[inline]
    fn get(&self, key: K) -> Option<&T> {
        match self.slots.get(key.as_usize())? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant(_) => None,
        }
    }

    #[inline]
    fn get_mut(&mut self, key: K) -> Option<&mut T> {
        match self.slots.get_mut(key.as_usize())? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant(_) => None,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free = K::NONE;
        self.len = 0;
    }

    fn empty_like(&self) -> Self {
        Self::with_limit(self.limit)
    }
}

unsafe impl<T, K: Key> PointerStorage<T> for Arena<T, K> {
    fn value_ptr(&mut self, key: K) -> Option<NonNull<T>> {
        let index = key.as_usize();
        if index >= self.slots.len() {
            return None;
        }

        // as_mut_ptr does not reference the buffer, so only this slot is borrowed
        let slot = unsafe { &mut *self.slots.as_mut_ptr().add(index) };
        match slot {
            Slot::Occupied(value) => Some(NonNull::from(value)),
            Slot::Vacant(_) => None,
        }
    }
}

// =============================================================================
// slab::Slab implementation
// =============================================================================

/// `slab` has no fallible insert: growing past the allocator's limit panics
/// inside `Slab::insert`, so this backend never returns [`Full`].
///
/// Not a [`PointerStorage`]: `Slab` only reaches values by indexing its `Vec`.
#[cfg(feature = "slab")]
impl<T> Storage<T> for slab::Slab<T> {
    type Key = usize;

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<usize, Full<T>> {
        Ok(self.insert(value))
    }

    #[inline]
    fn remove(&mut self, key: usize) -> Option<T> {
        self.try_remove(key)
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
    fn len(&self) -> usize {
        self.len()
    }

    fn clear(&mut self) {
        self.clear();
    }

    fn empty_like(&self) -> Self {
        slab::Slab::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let arena: Arena<u64> = Arena::new();
        assert!(arena.is_empty());
        assert!(!arena.is_full());
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.limit(), None);
        assert_eq!(arena.slots(), 0);
    }

    #[test]
    fn insert_get_remove() {
        let mut arena: Arena<u64> = Arena::new();

        let key = arena.try_insert(42).unwrap();
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(key), Some(&42));

        assert_eq!(arena.remove(key), Some(42));
        assert_eq!(arena.get(key), None);
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn get_mut() {
        let mut arena: Arena<u64> = Arena::new();

        let key = arena.try_insert(10).unwrap();
        *arena.get_mut(key).unwrap() = 20;

        assert_eq!(arena.get(key), Some(&20));
    }

    #[test]
    fn limit_rejects_and_returns_value() {
        let mut arena: Arena<u64> = Arena::with_limit(2);

        let k0 = arena.try_insert(0).unwrap();
        let k1 = arena.try_insert(1).unwrap();
        assert!(arena.is_full());

        let err = arena.try_insert(2);
        assert_eq!(err.unwrap_err().into_inner(), 2);

        assert_eq!(arena.get(k0), Some(&0));
        assert_eq!(arena.get(k1), Some(&1));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn slot_reuse_is_lifo() {
        let mut arena: Arena<u64> = Arena::new();

        let k0 = arena.try_insert(0).unwrap();
        let k1 = arena.try_insert(1).unwrap();
        let _k2 = arena.try_insert(2).unwrap();

        arena.remove(k0);
        arena.remove(k1);

        assert_eq!(arena.try_insert(3).unwrap(), k1);
        assert_eq!(arena.try_insert(4).unwrap(), k0);
        assert_eq!(arena.slots(), 3);
    }

    #[test]
    fn remove_vacant_or_out_of_range() {
        let mut arena: Arena<u64> = Arena::new();

        let key = arena.try_insert(42).unwrap();
        arena.remove(key);

        assert_eq!(arena.remove(key), None);
        assert_eq!(arena.remove(99), None);
        assert_eq!(arena.remove(u32::NONE), None);

        // Free list survived the double remove
        assert_eq!(arena.try_insert(7).unwrap(), key);
        assert_eq!(arena.try_insert(8).unwrap(), 1);
    }

    #[test]
    fn key_space_exhaustion() {
        let mut arena: Arena<u8, u8> = Arena::new();

        for i in 0..u8::MAX {
            assert_eq!(arena.try_insert(i).unwrap(), i);
        }

        // Slot 255 would collide with u8::NONE
        assert_eq!(arena.try_insert(0).unwrap_err().into_inner(), 0);

        arena.remove(10);
        assert_eq!(arena.try_insert(0).unwrap(), 10);
    }

    #[test]
    fn clear_resets() {
        let mut arena: Arena<u64> = Arena::with_limit(4);
        for i in 0..4 {
            arena.try_insert(i).unwrap();
        }

        arena.clear();

        assert!(arena.is_empty());
        assert_eq!(arena.slots(), 0);
        assert_eq!(arena.try_insert(9).unwrap(), 0);
    }

    #[test]
    fn empty_like_keeps_limit() {
        let mut arena: Arena<u64> = Arena::with_limit(3);
        arena.try_insert(1).unwrap();

        let fresh = arena.empty_like();
        assert!(fresh.is_empty());
        assert_eq!(fresh.limit(), Some(3));
    }

    #[test]
    fn drop_cleans_up() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

        #[derive(Debug)]
        struct DropCounter;
        impl Drop for DropCounter {
            fn drop(&mut self) {
                DROP_COUNT.fetch_add(1, Ordering::SeqCst);
            }
        }

        {
            let mut arena: Arena<DropCounter> = Arena::new();
            let key = arena.try_insert(DropCounter).unwrap();
            arena.try_insert(DropCounter).unwrap();
            arena.try_insert(DropCounter).unwrap();

            drop(arena.remove(key));
            assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 1);
        }

        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn value_ptr_addresses_one_slot() {
        let mut arena: Arena<u64> = Arena::new();
        let a = arena.try_insert(1).unwrap();
        let b = arena.try_insert(2).unwrap();

        let pa = arena.value_ptr(a).unwrap();
        let pb = arena.value_ptr(b).unwrap();
        // Both pointers stay usable after the second lookup
        unsafe {
            *pa.as_ptr() += 10;
            *pb.as_ptr() += 20;
        }
        assert_eq!(arena.get(a), Some(&11));
        assert_eq!(arena.get(b), Some(&22));

        arena.remove(a);
        assert!(arena.value_ptr(a).is_none());
        assert!(arena.value_ptr(99).is_none());
    }

    #[test]
    fn u16_key() {
        let mut arena: Arena<u64, u16> = Arena::new();

        let key = arena.try_insert(42).unwrap();
        assert_eq!(arena.get(key), Some(&42));
    }

    #[cfg(feature = "slab")]
    mod slab_tests {
        use super::*;

        #[test]
        fn insert_get_remove() {
            let mut storage = slab::Slab::new();

            let key = Storage::try_insert(&mut storage, 42).unwrap();
            assert_eq!(Storage::get(&storage, key), Some(&42));

            assert_eq!(Storage::remove(&mut storage, key), Some(42));
            assert_eq!(Storage::remove(&mut storage, key), None);
        }

        #[test]
        fn slot_reuse() {
            let mut storage = slab::Slab::new();

            let k1 = Storage::try_insert(&mut storage, 1).unwrap();
            Storage::remove(&mut storage, k1);

            let k2 = Storage::try_insert(&mut storage, 2).unwrap();
            assert_eq!(k1, k2);
        }
    }
}
