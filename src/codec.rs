//! Bit-encoded cut flows
//!
//! A cut flow outcome is stored as one bit per cut, bit `i` being set if and
//! only if cut `i` of the registry passed. Callers can then test any subset
//! of the cuts, or everything but some cuts, without re-deriving the full
//! selection. For example, with the HEEP V7.0 registry:
//!
//! ```
//! use heep_vid::{codec::CutCodes, registry::heep_v70};
//!
//! let codes = CutCodes::<u32>::new(&heep_v70::REGISTRY)?;
//! let mut outcomes = [true; 12];
//! outcomes[heep_v70::TRKISO] = false;
//! let bits = codes.encode(&outcomes)?;
//!
//! assert!(!codes.pass_all_indices(bits, &[])?);
//! assert!(codes.pass_ignoring_indices(bits, &[heep_v70::TRKISO])?);
//! # Ok::<(), heep_vid::CutFlowError>(())
//! ```

use crate::{
    error::{CutFlowError, Result},
    numeric::CutWord,
    registry::CutRegistry,
};

use std::fmt;

/// Bitmask of passed cuts, tagged with the registry it was produced under
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CutBits<W: CutWord = u32> {
    registry: &'static CutRegistry,
    bits: W,
}
//
impl<W: CutWord> CutBits<W> {
    /// Registry which this bitmask follows
    pub fn registry(&self) -> &'static CutRegistry {
        self.registry
    }

    /// Raw bitmask, as stored in the framework's ValueMaps
    pub fn raw(&self) -> W {
        self.bits
    }

    /// Truth that cut `index` passed
    pub fn passed(&self, index: usize) -> Result<bool> {
        self.registry.check_index(index)?;
        Ok(self.bits & W::bit(index) != W::zero())
    }
}

impl<W: CutWord> fmt::Debug for CutBits<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CutBits({}: ", self.registry)?;
        for index in self.registry.indices().rev() {
            let bit = self.bits & W::bit(index) != W::zero();
            write!(f, "{}", u8::from(bit))?;
        }
        write!(f, ")")
    }
}

/// Unordered set of cuts of one registry
///
/// Indices are validated when the set is built, so that queries never have
/// to deal with out-of-range cuts.
///
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CutSet<W: CutWord = u32> {
    registry: &'static CutRegistry,
    mask: W,
}
//
impl<W: CutWord> CutSet<W> {
    /// Truth that no cut is in the set
    pub fn is_empty(&self) -> bool {
        self.mask == W::zero()
    }

    /// Number of cuts in the set
    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Truth that cut `index` is in the set
    pub fn contains(&self, index: usize) -> bool {
        index < self.registry.size() && self.mask & W::bit(index) != W::zero()
    }

    /// Cut indices of the set, in increasing order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.registry.indices().filter(move |&index| self.contains(index))
    }

    /// Registry which this set refers to
    pub fn registry(&self) -> &'static CutRegistry {
        self.registry
    }

    /// Mask with one bit set per cut of the set
    pub fn mask(&self) -> W {
        self.mask
    }
}

/// Encoder and query engine for the bitmasks of one registry
#[derive(Clone, Copy, Debug)]
pub struct CutCodes<W: CutWord = u32> {
    /// Registry of the cut flow
    registry: &'static CutRegistry,

    /// One bit set per cut of the registry
    full_mask: W,
}
//
impl<W: CutWord> CutCodes<W> {
    /// Set up the codec of a registry, checking that it fits in W
    pub fn new(registry: &'static CutRegistry) -> Result<Self> {
        Ok(Self {
            registry,
            full_mask: registry.full_mask::<W>()?,
        })
    }

    /// Registry of this codec
    pub fn registry(&self) -> &'static CutRegistry {
        self.registry
    }

    /// Mask with one bit set per cut of the registry
    pub fn full_mask(&self) -> W {
        self.full_mask
    }

    // ### CONSTRUCTION ###

    /// Encode ordered per-cut outcomes, one per cut of the registry
    pub fn encode(&self, outcomes: &[bool]) -> Result<CutBits<W>> {
        if outcomes.len() != self.registry.size() {
            return Err(CutFlowError::LengthMismatch {
                registry: self.registry.name(),
                expected: self.registry.size(),
                actual: outcomes.len(),
            });
        }
        let bits = outcomes
            .iter()
            .enumerate()
            .filter(|&(_, &passed)| passed)
            .fold(W::zero(), |bits, (index, _)| bits | W::bit(index));
        Ok(self.tag(bits))
    }

    /// Encode per-cut outcomes tagged with their cut index
    ///
    /// The outcomes may come in any order, but each cut of the registry must
    /// be given exactly once.
    ///
    pub fn encode_indexed(
        &self,
        outcomes: impl IntoIterator<Item = (usize, bool)>,
    ) -> Result<CutBits<W>> {
        let mut seen = W::zero();
        let mut bits = W::zero();
        for (index, passed) in outcomes {
            self.registry.check_index(index)?;
            let bit = W::bit(index);
            if seen & bit != W::zero() {
                return Err(CutFlowError::DuplicateCut {
                    registry: self.registry.name(),
                    index,
                });
            }
            seen = seen | bit;
            if passed {
                bits = bits | bit;
            }
        }
        if seen != self.full_mask {
            return Err(CutFlowError::LengthMismatch {
                registry: self.registry.name(),
                expected: self.registry.size(),
                actual: seen.count_ones() as usize,
            });
        }
        Ok(self.tag(bits))
    }

    /// Interpret a raw bitmask produced elsewhere under this registry
    pub fn decode(&self, raw: W) -> Result<CutBits<W>> {
        if raw & !self.full_mask != W::zero() {
            return Err(CutFlowError::StrayBits {
                registry: self.registry.name(),
                raw: raw.to_u128().unwrap_or(u128::MAX),
                max_bit_nr: self.registry.max_bit_nr(),
            });
        }
        Ok(self.tag(raw))
    }

    /// Build a set of cuts from their indices
    pub fn cut_set(&self, indices: impl IntoIterator<Item = usize>) -> Result<CutSet<W>> {
        let mut mask = W::zero();
        for index in indices {
            self.registry.check_index(index)?;
            mask = mask | W::bit(index);
        }
        Ok(CutSet {
            registry: self.registry,
            mask,
        })
    }

    /// Build a set of cuts from their names
    pub fn cut_set_by_name<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<CutSet<W>> {
        let indices = names
            .into_iter()
            .map(|name| self.registry.index_of(name))
            .collect::<Result<Vec<_>>>()?;
        self.cut_set(indices)
    }

    /// Set holding every cut of the registry
    pub fn all_cuts(&self) -> CutSet<W> {
        CutSet {
            registry: self.registry,
            mask: self.full_mask,
        }
    }

    // ### QUERIES ###

    /// Truth that every cut of the set passed
    ///
    /// An empty set stands for the full cut flow, so that `pass_all(bits,
    /// empty)` is the overall pass/fail decision.
    ///
    pub fn pass_all(&self, bits: CutBits<W>, cuts: &CutSet<W>) -> Result<bool> {
        self.check_registry(bits.registry)?;
        self.check_registry(cuts.registry)?;
        let required = if cuts.is_empty() {
            self.full_mask
        } else {
            cuts.mask
        };
        let pass = bits.bits & required == required;
        tracing::trace!(?bits, required = ?cuts.iter().collect::<Vec<_>>(), pass, "pass_all");
        Ok(pass)
    }

    /// Truth that every cut which is not in `ignored` passed
    ///
    /// Ignored cuts are not examined at all. An empty set ignores nothing.
    ///
    pub fn pass_subset_ignoring(&self, bits: CutBits<W>, ignored: &CutSet<W>) -> Result<bool> {
        self.check_registry(bits.registry)?;
        self.check_registry(ignored.registry)?;
        let required = self.full_mask & !ignored.mask;
        let pass = bits.bits & required == required;
        tracing::trace!(?bits, ignored = ?ignored.iter().collect::<Vec<_>>(), pass, "pass_subset_ignoring");
        Ok(pass)
    }

    /// Like `pass_all`, but taking raw cut indices
    pub fn pass_all_indices(&self, bits: CutBits<W>, cuts: &[usize]) -> Result<bool> {
        let cuts = self.cut_set(cuts.iter().copied())?;
        self.pass_all(bits, &cuts)
    }

    /// Like `pass_subset_ignoring`, but taking raw cut indices
    pub fn pass_ignoring_indices(&self, bits: CutBits<W>, ignored: &[usize]) -> Result<bool> {
        let ignored = self.cut_set(ignored.iter().copied())?;
        self.pass_subset_ignoring(bits, &ignored)
    }

    /// First cut of the sequence which failed, if any
    ///
    /// `Some(n)` means that cuts `0..n` all passed, this is the "number of
    /// cuts passed in order" that the framework also publishes.
    ///
    pub fn first_failed(&self, bits: CutBits<W>) -> Result<Option<usize>> {
        self.check_registry(bits.registry)?;
        let failed = !bits.bits & self.full_mask;
        if failed == W::zero() {
            Ok(None)
        } else {
            Ok(Some(failed.trailing_zeros() as usize))
        }
    }

    // ### INTERNAL HELPERS ###

    /// Attach our registry to some bits
    fn tag(&self, bits: W) -> CutBits<W> {
        CutBits {
            registry: self.registry,
            bits,
        }
    }

    /// Reject data which was produced under another registry
    fn check_registry(&self, other: &CutRegistry) -> Result<()> {
        self.registry.ensure_same(other)
    }
}
