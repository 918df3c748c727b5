//! Small bitmask sets over flag enums.
//!
//! Used where the engine needs a cheap "seen / attempted" set that is cleared in bulk,
//! e.g. the sub-probes already tried during one detection pass.

use num_traits::{One, PrimInt, Zero};

/// Implemented by flag enums; the bit index is usually the `#[repr(u8)]` discriminant.
pub trait FlagBitmask: Copy {
    type Storage: PrimInt;

    fn bit_index(self) -> u8;

    fn mask(self) -> Self::Storage {
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A set of flags of one enum, stored in a single primitive integer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitmaskFlags<F: FlagBitmask> {
    bits: F::Storage,
}

impl<F: FlagBitmask> Default for BitmaskFlags<F> {
    fn default() -> Self {
        Self {
            bits: F::Storage::zero(),
        }
    }
}

impl<F: FlagBitmask> BitmaskFlags<F> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn bits(&self) -> F::Storage {
        self.bits
    }

    pub fn insert(&mut self, flag: F) {
        self.bits = self.bits | flag.mask();
    }

    pub fn remove(&mut self, flag: F) {
        self.bits = self.bits & !flag.mask();
    }

    #[inline]
    pub fn contains(&self, flag: F) -> bool {
        (self.bits & flag.mask()) != F::Storage::zero()
    }

    /// Insert `flag`, returning `true` only if it was not already present.
    pub fn mark(&mut self, flag: F) -> bool {
        if self.contains(flag) {
            return false;
        }
        self.insert(flag);
        true
    }

    pub fn contains_any(&self, flags: &[F]) -> bool {
        flags.iter().any(|f| self.contains(*f))
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.bits.count_ones()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == F::Storage::zero()
    }

    pub fn clear(&mut self) {
        self.bits = F::Storage::zero();
    }
}

/// Declare a flag enum and implement [`FlagBitmask`] for it.
///
/// ```ignore
/// define_bitmask_flags!(SubProbe, u16, { TicTac, DropHang });
/// ```
#[macro_export]
macro_rules! define_bitmask_flags {
    ($(#[$meta:meta])* $vis:vis $name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $($variant),*
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(self) -> u8 {
                self as u8
            }
        }
    };
}
