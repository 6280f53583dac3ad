use core::fmt::Debug;

/// A fixed-size, untagged payload used for both keys and values.
///
/// An `Element` can hold a signed integer, an unsigned integer, a boolean, a
/// 32-bit float or an opaque pointer. No tag is stored: the table never looks
/// at which member was written, it only hands elements to the configured
/// strategies. Reading a member other than the one that was written
/// reinterprets the stored bits, so an element built with `Element::int(-1)`
/// reads back as `u32::MAX` through [`as_uint`](Element::as_uint).
///
/// Pointer-typed elements are never dereferenced or owned by the table.
///
/// # Examples
///
/// ```rust
/// use chain_hash::Element;
///
/// let e = Element::int(-1);
/// assert_eq!(e.as_int(), -1);
/// assert_eq!(e.as_uint(), u32::MAX);
///
/// let f = Element::float(1.5);
/// assert_eq!(f.as_float(), 1.5);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Element {
    bits: usize,
}

impl Element {
    /// Creates an element holding a signed integer.
    #[inline]
    pub const fn int(value: i32) -> Self {
        Self {
            bits: value as u32 as usize,
        }
    }

    /// Creates an element holding an unsigned integer.
    #[inline]
    pub const fn uint(value: u32) -> Self {
        Self {
            bits: value as usize,
        }
    }

    /// Creates an element holding a boolean.
    #[inline]
    pub const fn boolean(value: bool) -> Self {
        Self {
            bits: value as usize,
        }
    }

    /// Creates an element holding a 32-bit float.
    #[inline]
    pub const fn float(value: f32) -> Self {
        Self {
            bits: value.to_bits() as usize,
        }
    }

    /// Creates an element holding an opaque pointer.
    ///
    /// The pointer's provenance is exposed so that [`as_ptr`](Element::as_ptr)
    /// can hand back a pointer that is as usable as the original.
    #[inline]
    pub fn ptr<T>(value: *const T) -> Self {
        Self {
            bits: value.expose_provenance(),
        }
    }

    /// Reads the element as a signed integer.
    #[inline]
    pub const fn as_int(self) -> i32 {
        self.bits as u32 as i32
    }

    /// Reads the element as an unsigned integer.
    #[inline]
    pub const fn as_uint(self) -> u32 {
        self.bits as u32
    }

    /// Reads the element as a boolean. Any non-zero low byte is `true`.
    #[inline]
    pub const fn as_bool(self) -> bool {
        self.bits as u8 != 0
    }

    /// Reads the element as a 32-bit float.
    #[inline]
    pub const fn as_float(self) -> f32 {
        f32::from_bits(self.bits as u32)
    }

    /// Reads the element as a pointer.
    ///
    /// Dereferencing the result is only sound if the element was built from a
    /// pointer to a `T` that is still live.
    #[inline]
    pub fn as_ptr<T>(self) -> *const T {
        core::ptr::with_exposed_provenance(self.bits)
    }

    /// The raw stored bits.
    #[inline]
    pub const fn to_bits(self) -> usize {
        self.bits
    }
}

impl Debug for Element {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Element({:#x})", self.bits)
    }
}

impl From<i32> for Element {
    fn from(value: i32) -> Self {
        Self::int(value)
    }
}

impl From<u32> for Element {
    fn from(value: u32) -> Self {
        Self::uint(value)
    }
}

impl From<bool> for Element {
    fn from(value: bool) -> Self {
        Self::boolean(value)
    }
}

impl From<f32> for Element {
    fn from(value: f32) -> Self {
        Self::float(value)
    }
}
