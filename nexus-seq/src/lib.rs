//! Singly-linked sequence with checked positions.
//!
//! [`LinkedSequence`] is a forward list: O(1) push/pop at the front, O(1)
//! insert/erase after any position, forward iteration, deep copy, structural
//! equality and lexicographic ordering. Positional mutation is the primary
//! access pattern; there is no indexing and no reverse traversal.
//!
//! # Design
//!
//! Nodes live in slot storage and link to each other by key:
//!
//! ```text
//! LinkedSequence { head, len }      Storage (Arena)
//!        |                          +---+-------------+
//!        +---- head = 2 ----------> | 2 | a, next = 0 |
//!                                   | 0 | b, next = 1 |
//!                                   | 1 | c, next = - |
//!                                   +---+-------------+
//! ```
//!
//! - The head slot stands in for a sentinel node. It never holds a value, so
//!   there is no "is this secretly the sentinel" check on reads.
//! - A [`Position`] is `(key, stamp)`, not a pointer. Every use checks that
//!   the slot still holds the same node, so a position into a removed element
//!   is reported as [`Error::StalePosition`] instead of reading freed memory.
//! - Multi-node builds go into a fresh sequence first and are swapped in only
//!   when complete. A failed `assign`, `assign_from` or `try_clone` leaves the
//!   target exactly as it was.
//!
//! # Quick Start
//!
//! ```
//! use nexus_seq::{Error, LinkedSequence};
//!
//! let mut seq: LinkedSequence<&str> = ["b", "d"].into();
//!
//! // Insert at the front through the before-begin anchor
//! let anchor = seq.before_begin();
//! seq.insert_after(anchor, "a").unwrap();
//!
//! // Insert after an element
//! let a = seq.begin();
//! let b = seq.advance(a).unwrap();
//! let c = seq.insert_after(b, "c").unwrap();
//! assert_eq!(seq.iter().copied().collect::<Vec<_>>(), ["a", "b", "c", "d"]);
//!
//! // Erase after an element; positions into the erased element go stale
//! seq.erase_after(b).unwrap();
//! assert_eq!(seq.get(c), Err(Error::StalePosition));
//!
//! // The end marker has nothing after it
//! let end = seq.end();
//! assert_eq!(seq.insert_after(end, "z"), Err(Error::EndPosition));
//! ```
//!
//! # Bounded Storage
//!
//! [`Arena::with_limit`] caps the number of live elements. Operations that
//! would exceed it fail with [`Error::StorageFull`] and change nothing.
//!
//! ```
//! use nexus_seq::{Arena, Error, LinkedSequence};
//!
//! let mut seq: LinkedSequence<u64> = LinkedSequence::with_storage(Arena::with_limit(2));
//! seq.assign([1, 2]).unwrap();
//!
//! assert_eq!(seq.assign([1, 2, 3]), Err(Error::StorageFull));
//! assert_eq!(seq.iter().copied().collect::<Vec<_>>(), [1, 2]);
//! ```
//!
//! # Logging
//!
//! Rejected operations are reported through the `log` facade at `debug`
//! level, bulk builds and clears at `trace`. No logger is installed here.
//!
//! # Feature Flags
//!
//! - `slab` - Enable [`Storage`] impl for `slab::Slab` and `SlabSequence`

#![warn(missing_docs)]

pub mod error;
pub mod iter;
pub mod key;
pub mod node;
pub mod position;
pub mod sequence;
pub mod storage;

mod cmp;

pub use error::{Error, Result};
pub use iter::{IntoIter, Iter, IterMut};
pub use key::Key;
pub use node::Node;
pub use position::{Access, Position, ReadOnly, ReadWrite};
pub use sequence::{LinkedSequence, swap};
pub use storage::{Arena, Full, PointerStorage, Storage};

#[cfg(feature = "slab")]
pub use sequence::SlabSequence;
