//! Structural comparison, hashing and formatting.
//!
//! Everything here is defined over the element sequence, front to back, and
//! ignores where the elements happen to live in storage.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::node::Node;
use crate::{Key, LinkedSequence, Storage};

impl<T: PartialEq, S, K: Key> PartialEq for LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, S, K: Key> Eq for LinkedSequence<T, S, K> where S: Storage<Node<T, K>, Key = K> {}

/// Lexicographic: the first differing element decides, and a proper prefix
/// orders before the longer sequence.
impl<T: PartialOrd, S, K: Key> PartialOrd for LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, S, K: Key> Ord for LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, S, K: Key> Hash for LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: fmt::Debug, S, K: Key> fmt::Debug for LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}
