//! Errors reported by cut-flow construction and queries
//!
//! All of these are programming or configuration errors of the caller. They
//! are reported at the call that detects them and never degraded into a
//! physics pass/fail outcome.

/// Cut-flow error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CutFlowError {
    /// A cut name is not part of the registry
    #[error("unknown cut name {name:?} for cut flow {registry}")]
    UnknownCutName {
        registry: &'static str,
        name: String,
    },

    /// A numeric cut index lies outside of [0, size)
    #[error("cut index {index} out of range for cut flow {registry} with {size} cuts")]
    IndexOutOfRange {
        registry: &'static str,
        index: usize,
        size: usize,
    },

    /// An outcome or record sequence does not have one entry per cut
    #[error("cut flow {registry} expects {expected} cut outcomes, got {actual}")]
    LengthMismatch {
        registry: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The same cut index was supplied twice to an index-keyed constructor
    #[error("cut index {index} supplied more than once for cut flow {registry}")]
    DuplicateCut { registry: &'static str, index: usize },

    /// A raw bitmask has bits set above the last cut of the registry
    #[error("bitmask {raw:#x} has bits set beyond cut {max_bit_nr} of cut flow {registry}")]
    StrayBits {
        registry: &'static str,
        raw: u128,
        max_bit_nr: usize,
    },

    /// The registry does not fit in the selected bitmask word
    #[error("cut flow {registry} has {size} cuts, which does not fit in a {word_bits}-bit word")]
    TooManyCuts {
        registry: &'static str,
        size: usize,
        word_bits: usize,
    },

    /// Data tagged with one registry was used with another
    #[error("cut flow {actual} used where cut flow {expected} was expected")]
    RegistryMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Malformed candidate input
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Result type of cut-flow operations
pub type Result<T> = std::result::Result<T, CutFlowError>;
