//! Slot keys with a reserved "no node" value.
//!
//! Links between nodes are stored as keys rather than `Option<K>`, so the
//! end of a chain is spelled `K::NONE` and a link costs exactly one key.

/// A copyable slot key with a sentinel "none" value.
///
/// Implemented for the unsigned integers. The sentinel is the type's maximum,
/// which means a store keyed by `u16` holds at most `u16::MAX` nodes.
///
/// Keys are plain `'static` values and never borrow.
///
/// # Example
///
/// ```
/// use nexus_seq::Key;
///
/// let key: u32 = 7;
/// assert!(key.is_some());
/// assert!(u32::NONE.is_none());
/// assert_eq!(u32::from_usize(7), key);
/// ```
pub trait Key: Copy + Eq + core::fmt::Debug + core::hash::Hash + 'static {
    /// Sentinel value meaning "no node".
    const NONE: Self;

    /// Creates a key from a slot offset.
    fn from_usize(val: usize) -> Self;

    /// Returns the slot offset this key addresses.
    fn as_usize(self) -> usize;

    /// Returns `true` if this is the sentinel.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this addresses a slot.
    #[inline]
    fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Converts the sentinel to `None`.
    #[inline]
    fn get(self) -> Option<Self> {
        if self.is_none() { None } else { Some(self) }
    }
}

macro_rules! impl_key_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Key for $ty {
                const NONE: Self = <$ty>::MAX;

                #[inline]
                fn from_usize(val: usize) -> Self {
                    val as Self
                }

                #[inline]
                fn as_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_key_for_unsigned!(u8, u16, u32, u64, usize);
