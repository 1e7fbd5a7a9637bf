//! Engine configuration (ambient concern, not named by any [MODULE] in the
//! functional spec but required by SPEC_FULL.md §C): embedder-tunable
//! limits, deserializable the way the rest of this codebase's ecosystem
//! expects configuration to arrive — via `serde`, with every field
//! defaulted so an embedder can override just the one limit it cares
//! about.

use serde::Deserialize;

use crate::canonical_abi::{MAX_FLAT_PARAMS, MAX_FLAT_RESULTS};

/// Tunable limits this engine enforces beyond the bare type-system rules,
/// to keep a malicious or buggy resolved IR from running the checker out
/// of stack or memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Parameters a canonical function may flatten to before falling back
    /// to a pointer (spec §4.6). Overriding this away from the
    /// Component-Model-standard value changes what `canon lift`/`canon
    /// lower` accept — only meant for embedders simulating a different ABI
    /// revision in tests.
    pub max_flat_params: usize,
    pub max_flat_results: usize,
    /// Maximum component-nesting depth this engine will fold before
    /// rejecting the IR outright, guarding against unbounded recursion on
    /// a pathological (or adversarial) resolved tree.
    pub max_nesting_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits { max_flat_params: MAX_FLAT_PARAMS, max_flat_results: MAX_FLAT_RESULTS, max_nesting_depth: 1000 }
    }
}
