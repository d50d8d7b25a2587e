//! Named cut indices of the supported identification working points
//!
//! Each working point applies a fixed sequence of cuts, and cut number `i` of
//! that sequence is bit `i` of its bitmask. The registries defined here are
//! process-wide constants. Two registries may share cut names (the 10-cut
//! ones do) but they are still distinct cut flows, and data tagged with one
//! of them is never interpreted under another.

use crate::{
    error::{CutFlowError, Result},
    numeric::CutWord,
};

use std::{fmt, ops::Range};

/// Ordered, named list of the cuts of one identification working point
#[derive(Debug)]
pub struct CutRegistry {
    /// Name of the cut flow
    name: &'static str,

    /// Cut names, in the order in which cuts are applied
    cuts: &'static [&'static str],
}
//
impl CutRegistry {
    /// Define a registry from its name and ordered cut names
    pub const fn new(name: &'static str, cuts: &'static [&'static str]) -> Self {
        Self { name, cuts }
    }

    /// Name of the cut flow
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of cuts
    pub fn size(&self) -> usize {
        self.cuts.len()
    }

    /// Index of the last cut, which is also the highest bit of the bitmask
    pub fn max_bit_nr(&self) -> usize {
        self.cuts.len().saturating_sub(1)
    }

    /// Mask with one bit set per cut
    pub fn full_mask<W: CutWord>(&self) -> Result<W> {
        self.check_fits::<W>()?;
        Ok(W::low_bits(self.size()))
    }

    /// All valid cut indices
    pub fn indices(&self) -> Range<usize> {
        0..self.size()
    }

    /// Cut names in application order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cuts.iter().copied()
    }

    /// Look up a cut index by name
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.cuts
            .iter()
            .position(|&cut| cut == name)
            .ok_or_else(|| CutFlowError::UnknownCutName {
                registry: self.name,
                name: name.to_owned(),
            })
    }

    /// Look up a cut name by index
    pub fn name_of(&self, index: usize) -> Result<&'static str> {
        self.check_index(index)?;
        Ok(self.cuts[index])
    }

    /// Check that an index designates one of our cuts
    pub fn check_index(&self, index: usize) -> Result<()> {
        if index < self.size() {
            Ok(())
        } else {
            Err(CutFlowError::IndexOutOfRange {
                registry: self.name,
                index,
                size: self.size(),
            })
        }
    }

    /// Check that a word of type W has one bit for each of our cuts
    pub fn check_fits<W: CutWord>(&self) -> Result<()> {
        if self.size() <= W::bits() {
            Ok(())
        } else {
            Err(CutFlowError::TooManyCuts {
                registry: self.name,
                size: self.size(),
                word_bits: W::bits(),
            })
        }
    }

    /// Check that some data tagged with `other` may be used with this registry
    pub fn ensure_same(&self, other: &CutRegistry) -> Result<()> {
        if self == other {
            Ok(())
        } else {
            Err(CutFlowError::RegistryMismatch {
                expected: self.name,
                actual: other.name,
            })
        }
    }
}

// Two registries are interchangeable only if both their name and their cut
// sequence match. Shared cut names alone do not suffice, nor does a shared
// name with different cuts.
impl PartialEq for CutRegistry {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || (self.name == other.name && self.cuts == other.cuts)
    }
}
//
impl Eq for CutRegistry {}

impl fmt::Display for CutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Define a registry module holding one index constant per cut
macro_rules! cut_registry {
    ($(#[$meta:meta])* $module:ident, $name:literal, [$($cut:ident = $idx:literal),+ $(,)?]) => {
        $(#[$meta])*
        pub mod $module {
            use super::CutRegistry;

            $(
                #[doc = concat!("Index of the ", stringify!($cut), " cut")]
                pub const $cut: usize = $idx;
            )+

            /// Registry of this cut flow
            pub static REGISTRY: CutRegistry = CutRegistry::new($name, &[$(stringify!($cut)),+]);
        }
    };
}

cut_registry!(
    /// HEEP V7.0 electron identification (12 cuts)
    heep_v70,
    "HEEPV70",
    [
        ET = 0,
        ETA = 1,
        DETAINSEED = 2,
        DPHIIN = 3,
        SIGMAIETAIETA = 4,
        E2X5OVER5X5 = 5,
        HADEM = 6,
        TRKISO = 7,
        EMHADD1ISO = 8,
        DXY = 9,
        MISSHITS = 10,
        ECALDRIVEN = 11,
    ]
);

cut_registry!(
    /// Cut-based electron identification, Summer16 V1 tuning (10 cuts)
    cut_sum16_v1,
    "CutSum16V1",
    [
        ET = 0,
        ETA = 1,
        DETAINSEED = 2,
        DPHIIN = 3,
        SIGMAIETAIETA = 4,
        HADEM = 5,
        INVEINVP = 6,
        PFISO = 7,
        CONVETO = 8,
        MISSHITS = 9,
    ]
);

cut_registry!(
    /// Cut-based electron identification, Fall17 V1 tuning (10 cuts)
    cut_fall17_v1,
    "CutFall17V1",
    [
        ET = 0,
        ETA = 1,
        DETAINSEED = 2,
        DPHIIN = 3,
        SIGMAIETAIETA = 4,
        HADEM = 5,
        INVEINVP = 6,
        PFISO = 7,
        CONVETO = 8,
        MISSHITS = 9,
    ]
);

/// Every registry known to this crate
pub fn all() -> [&'static CutRegistry; 3] {
    [
        &heep_v70::REGISTRY,
        &cut_sum16_v1::REGISTRY,
        &cut_fall17_v1::REGISTRY,
    ]
}

/// Find a registry from its name
pub fn by_name(name: &str) -> Option<&'static CutRegistry> {
    all().into_iter().find(|registry| registry.name() == name)
}
