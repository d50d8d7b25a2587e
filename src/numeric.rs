//! Basic numerical concepts used throughout the crate

use num_traits::{PrimInt, Unsigned};

// Floating-point precision of stored cut values is configured here
/// Floating-point type of the values that cuts are applied to
#[cfg(feature = "f32")]
pub type Float = f32;
/// Floating-point type of the values that cuts are applied to
#[cfg(not(feature = "f32"))]
pub type Float = f64;

/// Unsigned machine word which can hold one bit per cut of a cut flow
///
/// Any unsigned primitive integer qualifies. `u32` is what the ValueMaps of
/// the reconstruction framework carry, wider words allow longer cut flows.
///
pub trait CutWord: PrimInt + Unsigned + Send + Sync + std::fmt::Debug + 'static {
    /// Number of bits in this word
    fn bits() -> usize {
        Self::zero().count_zeros() as usize
    }

    /// Word with only bit `index` set
    fn bit(index: usize) -> Self {
        Self::one() << index
    }

    /// Word with the `count` low bits set
    fn low_bits(count: usize) -> Self {
        if count >= Self::bits() {
            Self::max_value()
        } else {
            (Self::one() << count) - Self::one()
        }
    }
}
//
impl<W> CutWord for W where W: PrimInt + Unsigned + Send + Sync + std::fmt::Debug + 'static {}
