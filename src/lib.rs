//! HEEP/VID cut flows
//!
//!
//! # Introduction (for the physicist)
//!
//! Electron identification at a hadron collider applies a sequence of cuts
//! to every electron candidate: minimal transverse energy, acceptance in η,
//! track-cluster matching, shower shape, hadronic leakage, isolation, and so
//! on. The High Energy Electron Pairs ("HEEP") selection and the cut-based
//! identifications are evaluated this way by the versioned identification
//! ("VID") machinery of the reconstruction framework.
//!
//! Analysts rarely need the overall decision alone. Efficiency studies want
//! the outcome of each cut, and background estimates want "every cut but
//! isolation" (N-1 selections). This crate provides the bookkeeping for that.
//!
//!
//! # Introduction (for the computer guy)
//!
//! * `registry` names the cuts of each working point and gives them a fixed
//!   index, which is also their bit number.
//! * `codec` stores a cut flow as a bitmask and answers subset questions.
//! * `cutflow` stores a cut flow in detail (outcome and value of each cut)
//!   and derives masked versions of it.
//!
//! Everything is immutable once built, so results can be shared between
//! threads freely. The remaining modules are small tools around this core:
//! the saturation-aware shower shape cuts, a thread-safe pass/fail tally,
//! consistency checks between both representations, and a reader for
//! per-candidate cut outcomes.

#![warn(missing_docs)]

pub mod codec;
pub mod cutflow;
pub mod cuts;
#[allow(missing_docs)]
pub mod error;
pub mod input;
pub mod numeric;
pub mod registry;
pub mod tally;
pub mod validate;

pub use crate::{
    codec::{CutBits, CutCodes, CutSet},
    cutflow::{CutFlowResult, CutRecord},
    error::{CutFlowError, Result},
    registry::CutRegistry,
};
