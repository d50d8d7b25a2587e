//! Reading of per-candidate cut outcomes
//!
//! The cuts themselves are evaluated by the reconstruction framework, which
//! dumps one line per candidate electron:
//!
//! ```text
//! # optional bitmap, then one PASSED:VALUE token per cut in registry order
//! bits=0xf7f 1:52.1 1:0.3 1:0.001 1:0.02 1:0.009 1:0.95 1:0.01 0:12.3 1:4.2 1:0.001 1:0 1:1
//! 1:40.7 1:1.9 1:0.003 1:0.04 1:0.02 1:0.9 1:0.02 1:0.5 1:3.1 1:0.01 1:0 1:1
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. PASSED is `1`/`0` or
//! `true`/`false`. The bitmap, when present, is the one published by the
//! framework next to the detailed result, and is kept as is so that both can
//! be cross-checked.

use crate::{
    cutflow::CutFlowResult,
    error::{CutFlowError, Result},
    numeric::Float,
    registry::CutRegistry,
};

/// Prefix of the optional bitmap token
const BITMAP_PREFIX: &str = "bits=";

/// Cut outcomes of one candidate
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Line of the input which this candidate was read from
    pub line: usize,

    /// Bitmap published alongside the detailed result, if any
    pub bitmap: Option<u32>,

    /// Detailed cut-flow result
    pub result: CutFlowResult,
}

/// Parse every candidate of an input text
pub fn parse_candidates(registry: &'static CutRegistry, text: &str) -> Result<Vec<Candidate>> {
    let candidates = text
        .lines()
        .enumerate()
        .map(|(line_idx, line)| (line_idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, data)| parse_candidate(registry, line, data))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        cut_flow = registry.name(),
        nr_candidates = candidates.len(),
        "parsed candidates"
    );
    Ok(candidates)
}

/// Parse the data of one candidate
fn parse_candidate(registry: &'static CutRegistry, line: usize, data: &str) -> Result<Candidate> {
    let parse_error = |message: String| CutFlowError::Parse { line, message };

    let mut tokens = data.split_whitespace().peekable();
    let bitmap = match tokens.peek() {
        Some(&token) if token.starts_with(BITMAP_PREFIX) => {
            let raw = &token[BITMAP_PREFIX.len()..];
            let bitmap = parse_bitmap(raw)
                .ok_or_else(|| parse_error(format!("invalid bitmap {raw:?}")))?;
            tokens.next();
            Some(bitmap)
        }
        _ => None,
    };

    let outcomes = tokens
        .map(|token| {
            parse_outcome(token)
                .ok_or_else(|| parse_error(format!("invalid cut outcome {token:?}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let result = CutFlowResult::new(registry, &outcomes).map_err(|error| match error {
        CutFlowError::LengthMismatch {
            expected, actual, ..
        } => parse_error(format!("expected {expected} cut outcomes, found {actual}")),
        other => other,
    })?;

    Ok(Candidate {
        line,
        bitmap,
        result,
    })
}

/// Parse a bitmap written in decimal or, with a 0x prefix, in hexadecimal
fn parse_bitmap(raw: &str) -> Option<u32> {
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

/// Parse a PASSED:VALUE token
fn parse_outcome(token: &str) -> Option<(bool, Float)> {
    let (passed, value) = token.split_once(':')?;
    let passed = match passed.to_lowercase().as_str() {
        "1" | "true" => true,
        "0" | "false" => false,
        _ => return None,
    };
    Some((passed, value.parse().ok()?))
}
