//! Key trait for storage indices, and the [`Buzzer`] token.
//!
//! The [`Key`] trait abstracts over index types used in storage. It provides
//! a sentinel value (`NONE`) for empty links and conversion to/from `usize`.
//! [`Buzzer`] is the key the service queue hands out to callers.

use core::fmt;

/// Trait for key/index types used in storage.
///
/// Provides a sentinel value (`NONE`) and conversion to/from `usize`.
/// Implemented for `u32`, `usize` and [`Buzzer`].
///
/// # Example
///
/// ```
/// use nexus_sq::Key;
///
/// let key: u32 = 42;
/// assert!(key.is_some());
/// assert!(u32::NONE.is_none());
/// ```
pub trait Key: Copy + Eq {
    /// Sentinel value representing "no key".
    ///
    /// Used internally to represent empty links between nodes.
    const NONE: Self;

    /// Creates a key from a `usize` value.
    ///
    /// Used when storage assigns sequential indices.
    fn from_usize(val: usize) -> Self;

    /// Returns the key as a `usize`.
    ///
    /// Used for indexing into arrays and bounds checking.
    fn as_usize(&self) -> usize;

    /// Returns `true` if this is the sentinel value.
    #[inline]
    fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Returns `true` if this is NOT the sentinel value.
    #[inline]
    fn is_some(&self) -> bool {
        !self.is_none()
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
                fn as_usize(&self) -> usize {
                    *self as usize
                }
            }
        )*
    };
}

impl_key_for_unsigned!(u32, usize);

/// Numeric code reported when there is nobody to seat.
///
/// Never assignable to a [`Buzzer`]: buzzers are unsigned.
pub const SEAT_NONE: i64 = -1;

/// A token identifying one participant in a service queue.
///
/// Buzzers start at zero and are reused after release. `u32::MAX` is
/// reserved as the link sentinel and is never handed out.
///
/// # Example
///
/// ```
/// use nexus_sq::{Buzzer, SEAT_NONE};
///
/// let b = Buzzer::new(7);
/// assert_eq!(b.get(), 7);
/// assert_eq!(Buzzer::code(Some(b)), 7);
/// assert_eq!(Buzzer::code(None), SEAT_NONE);
///
/// assert!(Buzzer::try_from(-1i64).is_err());
/// assert_eq!(Buzzer::try_from(3i64), Ok(Buzzer::new(3)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Buzzer(u32);

impl Buzzer {
    /// Wraps a raw buzzer id.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw buzzer id.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Flattens a seat result to the numeric form used at text boundaries:
    /// the id, or [`SEAT_NONE`] when nobody was seated.
    #[inline]
    pub fn code(seated: Option<Buzzer>) -> i64 {
        seated.map_or(SEAT_NONE, |b| i64::from(b.0))
    }
}

impl Key for Buzzer {
    const NONE: Self = Buzzer(u32::MAX);

    #[inline]
    fn from_usize(val: usize) -> Self {
        Buzzer(val as u32)
    }

    #[inline]
    fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Buzzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Buzzer> for u32 {
    #[inline]
    fn from(b: Buzzer) -> Self {
        b.0
    }
}

impl From<Buzzer> for i64 {
    #[inline]
    fn from(b: Buzzer) -> Self {
        i64::from(b.0)
    }
}

/// A numeric id that cannot name any buzzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidBuzzer(pub i64);

impl fmt::Display for InvalidBuzzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not a valid buzzer id", self.0)
    }
}

impl std::error::Error for InvalidBuzzer {}

impl TryFrom<i64> for Buzzer {
    type Error = InvalidBuzzer;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match u32::try_from(raw) {
            Ok(id) if id != u32::MAX => Ok(Buzzer(id)),
            _ => Err(InvalidBuzzer(raw)),
        }
    }
}
