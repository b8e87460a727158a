//! Singly-linked sequence over slot storage.
//!
//! The sequence owns its storage, the key of the first node and a cached
//! length. Each node links to the next by key. The head slot plays the part
//! of a sentinel node without holding a value: it is simply `head`, and the
//! [`before_begin`](LinkedSequence::before_begin) position names it.
//!
//! # Build Aside, Then Swap
//!
//! Anything that builds more than one node (construction from values,
//! [`assign`](LinkedSequence::assign), [`try_clone`](LinkedSequence::try_clone),
//! [`assign_from`](LinkedSequence::assign_from)) builds a complete chain in a
//! separate sequence first and only then swaps it in. If storage refuses a
//! node, or a `Clone` panics, the half-built chain is dropped and the target
//! is untouched.
//!
//! Single-node mutations validate the position and allocate the node before
//! touching any link, so they either fully happen or change nothing.
//!
//! # Example
//!
//! ```
//! use nexus_seq::{Error, LinkedSequence};
//!
//! let mut seq: LinkedSequence<u32> = LinkedSequence::new();
//! seq.push_front(3).unwrap();
//! seq.push_front(2).unwrap();
//! seq.push_front(1).unwrap();
//!
//! let first = seq.begin();
//! seq.insert_after(first, 99).unwrap();
//! assert_eq!(seq.iter().copied().collect::<Vec<_>>(), [1, 99, 2, 3]);
//!
//! seq.erase_after(first).unwrap();
//! assert_eq!(seq.pop_front(), Ok(1));
//! assert_eq!(seq.pop_front(), Ok(2));
//! assert_eq!(seq.pop_front(), Ok(3));
//! assert_eq!(seq.pop_front(), Err(Error::Empty));
//! ```

use std::marker::PhantomData;

use log::{debug, trace};

use crate::iter::{Iter, IterMut};
use crate::node::Node;
use crate::position::{Access, Place, Position, ReadOnly, ReadWrite};
use crate::{Arena, Error, Key, PointerStorage, Result, Storage};

/// Type alias for a sequence backed by `slab::Slab`.
#[cfg(feature = "slab")]
pub type SlabSequence<T> = LinkedSequence<T, slab::Slab<Node<T, usize>>, usize>;

/// A singly-linked sequence.
///
/// # Type Parameters
///
/// - `T`: Element type
/// - `S`: Storage type (default [`Arena`])
/// - `K`: Key type (default `u32`)
///
/// # Example
///
/// ```
/// use nexus_seq::LinkedSequence;
///
/// let a: LinkedSequence<u32> = [1, 2, 3].into();
/// let b = a.clone();
///
/// assert_eq!(a, b);
/// assert!(a < [1, 2, 4].into());
/// ```
pub struct LinkedSequence<T, S = Arena<Node<T>>, K: Key = u32>
where
    S: Storage<Node<T, K>, Key = K>,
{
    storage: S,
    head: K,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T> LinkedSequence<T> {
    /// Creates an empty sequence over an unbounded [`Arena`].
    ///
    /// Does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self {
            storage: Arena::new(),
            head: <u32 as Key>::NONE,
            len: 0,
            _marker: PhantomData,
        }
    }
}

impl<T, S, K: Key> Default for LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K> + Default,
{
    fn default() -> Self {
        Self::with_storage(S::default())
    }
}

fn reject(op: &'static str, err: Error) -> Error {
    debug!("{op} rejected: {err}");
    err
}

impl<T, S, K: Key> LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    // ========================================================================
    // Construction
    // ========================================================================

    /// Creates an empty sequence over the given storage.
    ///
    /// Anything already in `storage` is dropped.
    ///
    /// ```
    /// use nexus_seq::{Arena, Error, LinkedSequence};
    ///
    /// let mut seq: LinkedSequence<u8> = LinkedSequence::with_storage(Arena::with_limit(1));
    /// seq.push_front(1).unwrap();
    /// assert_eq!(seq.push_front(2), Err(Error::StorageFull));
    /// ```
    pub fn with_storage(mut storage: S) -> Self {
        storage.clear();
        Self {
            storage,
            head: K::NONE,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Builds a sequence holding `values` in order, over the given storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageFull`] if storage refuses a node. Everything
    /// built so far is dropped.
    pub fn try_from_values_in<I>(storage: S, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut seq = Self::with_storage(storage);
        let mut tail = Place::BeforeBegin;
        for value in values {
            tail = match seq.link_after(tail, value) {
                Ok(place) => place,
                Err(err) => {
                    debug!("build rejected after {} elements: {err}", seq.len);
                    return Err(err);
                }
            };
        }
        trace!("built sequence of {} elements", seq.len);
        Ok(seq)
    }

    /// Replaces the contents with `values`, in order.
    ///
    /// The new chain is built in storage configured like this sequence's, then
    /// swapped in. All positions into the old contents become stale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageFull`] if storage refuses a node; the sequence
    /// is left unchanged.
    pub fn assign<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let mut fresh = Self::try_from_values_in(self.storage.empty_like(), values)?;
        self.swap(&mut fresh);
        Ok(())
    }

    /// Returns a deep copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageFull`] if storage refuses a node.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
    {
        Self::try_from_values_in(self.storage.empty_like(), self.iter().cloned())
    }

    /// Replaces the contents with a deep copy of `other` (copy and swap).
    ///
    /// The copy is built in storage configured like this sequence's.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageFull`] if storage refuses a node; the sequence
    /// is left unchanged.
    pub fn assign_from(&mut self, other: &Self) -> Result<()>
    where
        T: Clone,
    {
        let mut fresh = Self::try_from_values_in(self.storage.empty_like(), other.iter().cloned())?;
        self.swap(&mut fresh);
        Ok(())
    }

    // ========================================================================
    // Size
    // ========================================================================

    /// Returns the number of elements.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the backing storage.
    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ========================================================================
    // Front
    // ========================================================================

    /// Returns a reference to the first element.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.storage.get(self.head.get()?).map(|node| &node.value)
    }

    /// Returns a mutable reference to the first element.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.storage
            .get_mut(self.head.get()?)
            .map(|node| &mut node.value)
    }

    /// Pushes a value to the front. O(1).
    ///
    /// Returns the position of the new element. Existing positions stay valid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageFull`] if storage refuses the node; the value is
    /// dropped and the sequence is unchanged.
    #[inline]
    pub fn push_front(&mut self, value: T) -> Result<Position<K, ReadWrite>> {
        self.link_after(Place::BeforeBegin, value)
            .map(Position::new)
            .map_err(|err| reject("push_front", err))
    }

    /// Removes and returns the first element. O(1).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if there is nothing to remove.
    #[inline]
    pub fn pop_front(&mut self) -> Result<T> {
        if self.is_empty() {
            return Err(reject("pop_front", Error::Empty));
        }
        self.unlink_after(Place::BeforeBegin)
            .map(|(value, _)| value)
            .map_err(|err| reject("pop_front", err))
    }

    // ========================================================================
    // Positional mutation
    // ========================================================================

    /// Inserts a value after `pos`. O(1).
    ///
    /// `pos` may be before-begin (inserting at the front) or any live element.
    /// Returns the position of the new element.
    ///
    /// # Errors
    ///
    /// - [`Error::EndPosition`] if `pos` is the end marker
    /// - [`Error::StalePosition`] if `pos` names a removed element
    /// - [`Error::StorageFull`] if storage refuses the node
    ///
    /// On error the value is dropped and the sequence is unchanged.
    #[inline]
    pub fn insert_after<A: Access>(
        &mut self,
        pos: Position<K, A>,
        value: T,
    ) -> Result<Position<K, ReadWrite>> {
        self.link_after(pos.place(), value)
            .map(Position::new)
            .map_err(|err| reject("insert_after", err))
    }

    /// Erases the element after `pos`. O(1), never allocates.
    ///
    /// Returns the position now following `pos`, which is the end marker when
    /// the last element was erased.
    ///
    /// # Errors
    ///
    /// - [`Error::EndPosition`] if `pos` is the end marker
    /// - [`Error::NothingAfter`] if no element follows `pos`
    /// - [`Error::StalePosition`] if `pos` names a removed element
    #[inline]
    pub fn erase_after<A: Access>(&mut self, pos: Position<K, A>) -> Result<Position<K, ReadWrite>> {
        self.unlink_after(pos.place())
            .map(|(_, next)| Position::new(next))
            .map_err(|err| reject("erase_after", err))
    }

    /// Removes the element after `pos` and returns it. O(1).
    ///
    /// # Errors
    ///
    /// Same as [`erase_after`](Self::erase_after).
    #[inline]
    pub fn remove_after<A: Access>(&mut self, pos: Position<K, A>) -> Result<T> {
        self.unlink_after(pos.place())
            .map(|(value, _)| value)
            .map_err(|err| reject("remove_after", err))
    }

    /// Removes every element. O(n), never fails.
    ///
    /// Nodes are detached from the front one at a time and dropped.
    pub fn clear(&mut self) {
        let released = self.len;
        while let Some(key) = self.head.get() {
            match self.storage.remove(key) {
                Some(node) => self.head = node.next,
                None => break,
            }
        }
        self.head = K::NONE;
        self.len = 0;
        trace!("cleared {released} elements");
    }

    /// Exchanges contents with `other`. O(1).
    ///
    /// Positions keep naming their elements, which now live in the other
    /// sequence.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Returns the before-begin anchor. It can be written after, never read.
    #[inline]
    pub fn before_begin(&mut self) -> Position<K, ReadWrite> {
        Position::new(Place::BeforeBegin)
    }

    /// Returns the position of the first element, or end if empty.
    #[inline]
    pub fn begin(&mut self) -> Position<K, ReadWrite> {
        Position::new(self.place_of(self.head))
    }

    /// Returns the end marker.
    #[inline]
    pub fn end(&mut self) -> Position<K, ReadWrite> {
        Position::new(Place::End)
    }

    /// Read-only [`before_begin`](Self::before_begin).
    #[inline]
    pub fn cbefore_begin(&self) -> Position<K, ReadOnly> {
        Position::new(Place::BeforeBegin)
    }

    /// Read-only [`begin`](Self::begin).
    #[inline]
    pub fn cbegin(&self) -> Position<K, ReadOnly> {
        Position::new(self.place_of(self.head))
    }

    /// Read-only [`end`](Self::end).
    #[inline]
    pub fn cend(&self) -> Position<K, ReadOnly> {
        Position::new(Place::End)
    }

    /// Returns the element at `pos`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotDereferenceable`] for before-begin and end
    /// - [`Error::StalePosition`] if the element was removed
    #[inline]
    pub fn get<A: Access>(&self, pos: Position<K, A>) -> Result<&T> {
        let found = match pos.place() {
            Place::Node { key, stamp } => self.node(key, stamp).map(|node| &node.value),
            Place::BeforeBegin | Place::End => Err(Error::NotDereferenceable),
        };
        found.map_err(|err| reject("get", err))
    }

    /// Returns the element at `pos` mutably. Requires a [`ReadWrite`] position.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    #[inline]
    pub fn get_mut(&mut self, pos: Position<K, ReadWrite>) -> Result<&mut T> {
        let found = match pos.place() {
            Place::Node { key, stamp } => self.node_mut(key, stamp).map(|node| &mut node.value),
            Place::BeforeBegin | Place::End => Err(Error::NotDereferenceable),
        };
        found.map_err(|err| reject("get_mut", err))
    }

    /// Returns the position after `pos`.
    ///
    /// Before-begin advances to the first element (or end when empty).
    ///
    /// # Errors
    ///
    /// - [`Error::PastEnd`] if `pos` is the end marker
    /// - [`Error::StalePosition`] if the element was removed
    #[inline]
    pub fn advance<A: Access>(&self, pos: Position<K, A>) -> Result<Position<K, A>> {
        let next = match pos.place() {
            Place::End => Err(Error::PastEnd),
            place => self.next_of(place),
        };
        next.map(|next| Position::new(self.place_of(next)))
            .map_err(|err| reject("advance", err))
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Returns an iterator over references to elements, front to back.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, S, K> {
        Iter::new(&self.storage, self.head, self.len)
    }

    // ========================================================================
    // Links
    // ========================================================================

    /// Resolves a node position: the slot must be occupied by the same node.
    #[inline]
    fn node(&self, key: K, stamp: u64) -> Result<&Node<T, K>> {
        match self.storage.get(key) {
            Some(node) if node.stamp == stamp => Ok(node),
            _ => Err(Error::StalePosition),
        }
    }

    #[inline]
    fn node_mut(&mut self, key: K, stamp: u64) -> Result<&mut Node<T, K>> {
        match self.storage.get_mut(key) {
            Some(node) if node.stamp == stamp => Ok(node),
            _ => Err(Error::StalePosition),
        }
    }

    /// Key of the node following `place` (`NONE` at the tail).
    #[inline]
    fn next_of(&self, place: Place<K>) -> Result<K> {
        match place {
            Place::BeforeBegin => Ok(self.head),
            Place::Node { key, stamp } => self.node(key, stamp).map(|node| node.next),
            Place::End => Err(Error::EndPosition),
        }
    }

    /// Points the link out of `place` at `key`. `place` must be validated.
    #[inline]
    fn set_next(&mut self, place: Place<K>, key: K) {
        match place {
            Place::BeforeBegin => self.head = key,
            Place::Node { key: at, .. } => {
                if let Some(node) = self.storage.get_mut(at) {
                    node.next = key;
                }
            }
            Place::End => {}
        }
    }

    #[inline]
    fn place_of(&self, key: K) -> Place<K> {
        match key.get().and_then(|key| self.storage.get(key).map(|node| (key, node.stamp))) {
            Some((key, stamp)) => Place::Node { key, stamp },
            None => Place::End,
        }
    }

    fn link_after(&mut self, place: Place<K>, value: T) -> Result<Place<K>> {
        let next = self.next_of(place)?;
        let node = Node::new(value, next);
        let stamp = node.stamp;
        let key = self
            .storage
            .try_insert(node)
            .map_err(|_| Error::StorageFull)?;

        // Nothing below can fail
        self.set_next(place, key);
        self.len += 1;
        Ok(Place::Node { key, stamp })
    }

    fn unlink_after(&mut self, place: Place<K>) -> Result<(T, Place<K>)> {
        let target = self.next_of(place)?.get().ok_or(Error::NothingAfter)?;
        let node = self.storage.remove(target).ok_or(Error::StalePosition)?;

        self.set_next(place, node.next);
        self.len -= 1;
        Ok((node.value, self.place_of(node.next)))
    }
}

impl<T, S, K: Key> LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K> + PointerStorage<Node<T, K>>,
{
    /// Returns an iterator over mutable references to elements, front to back.
    ///
    /// Available when storage is a [`PointerStorage`], such as [`Arena`].
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, S, K> {
        IterMut::new(&mut self.storage, self.head, self.len)
    }
}

impl<T: Clone, S, K: Key> Clone for LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    /// # Panics
    ///
    /// Panics if storage refuses a node. Use
    /// [`try_clone`](LinkedSequence::try_clone) to handle that.
    fn clone(&self) -> Self {
        self.try_clone()
            .unwrap_or_else(|err| panic!("failed to clone sequence: {err}"))
    }

    /// # Panics
    ///
    /// Panics if storage refuses a node; `self` is unchanged in that case.
    fn clone_from(&mut self, source: &Self) {
        self.assign_from(source)
            .unwrap_or_else(|err| panic!("failed to clone sequence: {err}"));
    }
}

/// Exchanges the contents of two sequences. O(1).
#[inline]
pub fn swap<T, S, K: Key>(a: &mut LinkedSequence<T, S, K>, b: &mut LinkedSequence<T, S, K>)
where
    S: Storage<Node<T, K>, Key = K>,
{
    a.swap(b);
}



#[cfg(test)]
mod bench_arena_storage {
    use super::*;
    use hdrhistogram::Histogram;

    /// Cycle counter on x86_64, nanoseconds since first use elsewhere.
    #[inline]
    fn ticks() -> u64 {
        #[cfg(target_arch = "x86_64")]
        unsafe {
            core::arch::x86_64::__rdtscp(&mut 0)
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            static EPOCH: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
            EPOCH.get_or_init(std::time::Instant::now).elapsed().as_nanos() as u64
        }
    }

    const UNIT: &str = if cfg!(target_arch = "x86_64") { "cycles" } else { "ns" };

    fn print_histogram(name: &str, hist: &Histogram<u64>) {
        println!(
            "{name:24} p50: {:4} {UNIT} | p99: {:4} {UNIT} | p999: {:5} {UNIT} | min: {:4} | max: {:5}",
            hist.value_at_quantile(0.50),
            hist.value_at_quantile(0.99),
            hist.value_at_quantile(0.999),
            hist.min(),
            hist.max(),
        );
    }

    const WARMUP: usize = 10_000;
    const ITERATIONS: usize = 100_000;

    #[test]
    #[ignore]
    fn bench_push_front() {
        let mut seq: LinkedSequence<u64> = LinkedSequence::new();
        let mut hist = Histogram::<u64>::new(3).unwrap();

        for i in 0..WARMUP {
            let _ = seq.push_front(i as u64);
            let _ = seq.pop_front();
        }

        for i in 0..ITERATIONS {
            let start = ticks();
            let _ = seq.push_front(i as u64);
            let elapsed = ticks().saturating_sub(start);
            hist.record(elapsed).unwrap();
            let _ = seq.pop_front();
        }

        print_histogram("push_front", &hist);
    }

    #[test]
    #[ignore]
    fn bench_insert_erase_after() {
        let mut seq: LinkedSequence<u64> = (0..1_000).collect();
        let mut hist = Histogram::<u64>::new(3).unwrap();

        let mut anchor = seq.begin();
        for _ in 0..500 {
            anchor = seq.advance(anchor).unwrap();
        }

        for i in 0..WARMUP {
            let _ = seq.insert_after(anchor, i as u64);
            let _ = seq.erase_after(anchor);
        }

        for i in 0..ITERATIONS {
            let start = ticks();
            let _ = seq.insert_after(anchor, i as u64);
            let _ = seq.erase_after(anchor);
            let elapsed = ticks().saturating_sub(start);
            hist.record(elapsed).unwrap();
        }

        print_histogram("insert_after+erase_after", &hist);
    }

    #[test]
    #[ignore]
    fn bench_stale_check() {
        let seq: LinkedSequence<u64> = (0..1_000).collect();
        let mut hist = Histogram::<u64>::new(3).unwrap();
        let first = seq.cbegin();

        for _ in 0..WARMUP {
            let _ = std::hint::black_box(seq.get(first));
        }

        for _ in 0..ITERATIONS {
            let start = ticks();
            let _ = std::hint::black_box(seq.get(first));
            let elapsed = ticks().saturating_sub(start);
            hist.record(elapsed).unwrap();
        }

        print_histogram("get (checked)", &hist);
    }
}
