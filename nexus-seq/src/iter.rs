//! Iterators and conversions.

use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::node::Node;
use crate::{Key, LinkedSequence, PointerStorage, Storage};

/// Iterator over references to sequence elements, front to back.
pub struct Iter<'a, T, S, K: Key> {
    storage: &'a S,
    current: K,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T, S, K: Key> Iter<'a, T, S, K> {
    #[inline]
    pub(crate) fn new(storage: &'a S, head: K, len: usize) -> Self {
        Self {
            storage,
            current: head,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<T, S, K: Key> Clone for Iter<'_, T, S, K> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage,
            current: self.current,
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: 'a, S, K: Key> Iterator for Iter<'a, T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.storage.get(self.current.get()?)?;
        self.current = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: 'a, S, K: Key> ExactSizeIterator for Iter<'a, T, S, K> where
    S: Storage<Node<T, K>, Key = K>
{
}

impl<'a, T: 'a, S, K: Key> FusedIterator for Iter<'a, T, S, K> where
    S: Storage<Node<T, K>, Key = K>
{
}

/// Iterator over mutable references to sequence elements, front to back.
///
/// Needs [`PointerStorage`]: each step reaches the next node through a raw
/// pointer, leaving the references already yielded untouched.
pub struct IterMut<'a, T, S, K: Key> {
    storage: &'a mut S,
    current: K,
    remaining: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T, S, K: Key> IterMut<'a, T, S, K> {
    #[inline]
    pub(crate) fn new(storage: &'a mut S, head: K, len: usize) -> Self {
        Self {
            storage,
            current: head,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: 'a, S, K: Key> Iterator for IterMut<'a, T, S, K>
where
    S: Storage<Node<T, K>, Key = K> + PointerStorage<Node<T, K>>,
{
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let ptr = self.storage.value_ptr(self.current.get()?)?;

        // SAFETY: value_ptr borrows only this node, the chain is acyclic so
        // each node is reached once, and storage stays borrowed for 'a
        let node = unsafe { &mut *ptr.as_ptr() };
        self.current = node.next;
        self.remaining -= 1;
        Some(&mut node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: 'a, S, K: Key> ExactSizeIterator for IterMut<'a, T, S, K> where
    S: Storage<Node<T, K>, Key = K> + PointerStorage<Node<T, K>>
{
}

impl<'a, T: 'a, S, K: Key> FusedIterator for IterMut<'a, T, S, K> where
    S: Storage<Node<T, K>, Key = K> + PointerStorage<Node<T, K>>
{
}

/// Owning iterator that pops elements off the front.
pub struct IntoIter<T, S, K: Key>
where
    S: Storage<Node<T, K>, Key = K>,
{
    seq: LinkedSequence<T, S, K>,
}

impl<T, S, K: Key> Iterator for IntoIter<T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        // Running dry is not a rejected pop
        if self.seq.is_empty() {
            return None;
        }
        self.seq.pop_front().ok()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.seq.len(), Some(self.seq.len()))
    }
}

impl<T, S, K: Key> ExactSizeIterator for IntoIter<T, S, K> where
    S: Storage<Node<T, K>, Key = K>
{
}

impl<T, S, K: Key> FusedIterator for IntoIter<T, S, K> where S: Storage<Node<T, K>, Key = K> {}

impl<T, S, K: Key> IntoIterator for LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    type Item = T;
    type IntoIter = IntoIter<T, S, K>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { seq: self }
    }
}

impl<'a, T, S, K: Key> IntoIterator for &'a LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, S, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, S, K: Key> IntoIterator for &'a mut LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K> + PointerStorage<Node<T, K>>,
{
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, S, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Builds a sequence in iteration order.
///
/// # Panics
///
/// Panics if storage refuses a node. Use
/// [`LinkedSequence::try_from_values_in`] to handle that.
impl<T, S, K: Key> FromIterator<T> for LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::try_from_values_in(S::default(), iter)
            .unwrap_or_else(|err| panic!("failed to build sequence: {err}"))
    }
}

impl<T, S, K: Key, const N: usize> From<[T; N]> for LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K> + Default,
{
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T, S, K: Key> From<Vec<T>> for LinkedSequence<T, S, K>
where
    S: Storage<Node<T, K>, Key = K> + Default,
{
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}
