//! Positions: copyable handles into a sequence.
//!
//! A position names one of three places:
//!
//! ```text
//! before-begin -> [a] -> [b] -> [c] -> end
//!      ^           ^                    ^
//!   anchor only   node             no node
//! ```
//!
//! Before-begin is the anchor for front mutation: inserting after it pushes to
//! the front, erasing after it pops the front. It can never be read. End can be
//! neither read nor advanced.
//!
//! Positions do not borrow the sequence. A node position carries the node's
//! key and stamp, and every use re-validates both, so a position whose node
//! was removed reports [`Error::StalePosition`](crate::Error::StalePosition)
//! instead of reading someone else's slot.
//!
//! # Access
//!
//! The access marker records where a position came from. Positions minted
//! through `&mut` queries are [`ReadWrite`] and can be passed to
//! [`get_mut`](crate::LinkedSequence::get_mut). Positions minted through `&`
//! queries are [`ReadOnly`]. `ReadWrite` converts into `ReadOnly`, never back.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::Key;

mod sealed {
    pub trait Sealed {}
}

/// Access marker for [`Position`]. Sealed: [`ReadOnly`] or [`ReadWrite`].
pub trait Access: sealed::Sealed + Copy + 'static {
    /// Marker name, for `Debug` output.
    const NAME: &'static str;
}

/// Marker for positions that only allow reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadOnly;

/// Marker for positions that allow writing through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadWrite;

impl sealed::Sealed for ReadOnly {}
impl sealed::Sealed for ReadWrite {}

impl Access for ReadOnly {
    const NAME: &'static str = "ReadOnly";
}

impl Access for ReadWrite {
    const NAME: &'static str = "ReadWrite";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Place<K> {
    BeforeBegin,
    Node { key: K, stamp: u64 },
    End,
}

/// A handle to before-begin, an element, or end of a
/// [`LinkedSequence`](crate::LinkedSequence).
///
/// Positions are `Copy` and compare by identity: two positions are equal when
/// they name the same place, regardless of access mode.
///
/// # Example
///
/// ```
/// use nexus_seq::{LinkedSequence, Position, ReadOnly};
///
/// let mut seq: LinkedSequence<u32> = [1, 2].into();
///
/// let first = seq.begin();
/// *seq.get_mut(first).unwrap() = 10;
///
/// let read: Position<u32, ReadOnly> = first.into();
/// assert_eq!(seq.get(read), Ok(&10));
/// assert_eq!(read, first);
/// ```
pub struct Position<K: Key = u32, A: Access = ReadWrite> {
    place: Place<K>,
    _access: PhantomData<A>,
}

impl<K: Key, A: Access> Position<K, A> {
    #[inline]
    pub(crate) const fn new(place: Place<K>) -> Self {
        Self {
            place,
            _access: PhantomData,
        }
    }

    #[inline]
    pub(crate) const fn place(self) -> Place<K> {
        self.place
    }

    /// Returns `true` for the before-begin anchor.
    #[inline]
    pub fn is_before_begin(self) -> bool {
        matches!(self.place, Place::BeforeBegin)
    }

    /// Returns `true` for the end marker.
    #[inline]
    pub fn is_end(self) -> bool {
        matches!(self.place, Place::End)
    }

    /// Returns the storage key of the referenced element.
    ///
    /// Returns `None` for before-begin and end.
    #[inline]
    pub fn key(self) -> Option<K> {
        match self.place {
            Place::Node { key, .. } => Some(key),
            Place::BeforeBegin | Place::End => None,
        }
    }

    /// Drops write access.
    #[inline]
    pub fn as_read_only(self) -> Position<K, ReadOnly> {
        Position::new(self.place)
    }
}

impl<K: Key> From<Position<K, ReadWrite>> for Position<K, ReadOnly> {
    #[inline]
    fn from(pos: Position<K, ReadWrite>) -> Self {
        pos.as_read_only()
    }
}

impl<K: Key, A: Access> Clone for Position<K, A> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Key, A: Access> Copy for Position<K, A> {}

impl<K: Key, A: Access, B: Access> PartialEq<Position<K, B>> for Position<K, A> {
    #[inline]
    fn eq(&self, other: &Position<K, B>) -> bool {
        self.place == other.place
    }
}

impl<K: Key, A: Access> Eq for Position<K, A> {}

impl<K: Key, A: Access> Hash for Position<K, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.place.hash(state);
    }
}

impl<K: Key, A: Access> fmt::Debug for Position<K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Position");
        match self.place {
            Place::BeforeBegin => out.field("at", &"before-begin"),
            Place::End => out.field("at", &"end"),
            Place::Node { key, stamp } => out.field("key", &key).field("stamp", &stamp),
        };
        out.field("access", &A::NAME).finish()
    }
}
