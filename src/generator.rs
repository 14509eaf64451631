//! Iterative axiom production.
//!
//! Each generation is a sequence of global search-and-replace passes, one per
//! rule in ascending name order. Replacement text is skipped by the rule that
//! produced it but stays visible to every later rule in the same generation,
//! so bodies that mention other rule names cascade within a single step.
//! This differs from the parallel rewrite of textbook L-Systems and is kept
//! as-is because callers depend on the exact output.
//!
//! Output length is unbounded: with a growing rule set it is exponential in
//! `iterations`, and callers are expected to keep the count small.

use crate::rules::RuleStore;
use tracing::debug;

/// Rewrites `seed` with the rules of `rules`, `iterations` times.
///
/// `iterations == 0` returns `seed` unchanged.
pub fn generate_axiom(rules: &RuleStore, seed: &str, iterations: u32) -> String {
    let mut axiom = seed.to_owned();
    for generation in 0..iterations {
        for (name, body) in rules.iter() {
            axiom = replace_pass(&axiom, name, body);
        }
        debug!(generation, len = axiom.len(), "generation complete");
    }
    axiom
}

/// Replaces every non-overlapping occurrence of `name`, scanning left to
/// right and resuming after each inserted body.
fn replace_pass(input: &str, name: &str, body: &str) -> String {
    // An empty name would match at every position without consuming input.
    if name.is_empty() {
        return input.to_owned();
    }
    input.replace(name, body)
}
