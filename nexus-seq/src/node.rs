//! Chain nodes.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::Key;

/// Source of node stamps, shared by every sequence in the process.
static STAMPS: AtomicU64 = AtomicU64::new(0);

/// A node in the sequence's chain.
///
/// Wraps one element with the key of the following node. The stamp gives each
/// node an identity that outlives its slot: when a slot is reused the new node
/// gets a fresh stamp, so positions naming the old node no longer resolve.
///
/// Users only see `&T`/`&mut T`; the node layout is an implementation detail
/// that storage backends need to name.
#[derive(Debug)]
pub struct Node<T, K: Key = u32> {
    pub(crate) value: T,
    pub(crate) next: K,
    pub(crate) stamp: u64,
}

impl<T, K: Key> Node<T, K> {
    /// Creates a node linked to `next` with a fresh stamp.
    #[inline]
    pub(crate) fn new(value: T, next: K) -> Self {
        Self {
            value,
            next,
            stamp: STAMPS.fetch_add(1, Ordering::Relaxed),
        }
    }
}
