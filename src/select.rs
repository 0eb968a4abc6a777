//! Process selection — deterministic scoring over the registry
//!
//! Replaces "pick the first loaded" with an explicit rule: score every
//! registered process against the context, highest score wins, ties
//! break toward earliest load order. Identical context and registry
//! (same load order) always select the same process.

use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::process::{ProcessRegistry, ThinkingProcess};

/// Weight for an exact framework match
const FRAMEWORK_WEIGHT: f64 = 2.0;

/// Weight for an exact language match
const LANGUAGE_WEIGHT: f64 = 1.0;

/// Select the best-matching process for a context.
///
/// Errors with [`Error::NoProcessAvailable`] when the registry is empty.
pub fn select<'r>(
    context: &GenerationContext,
    registry: &'r ProcessRegistry,
) -> Result<&'r ThinkingProcess> {
    let mut best: Option<(&ThinkingProcess, f64)> = None;

    for process in registry.iter() {
        let score = score(process, context);
        tracing::debug!(process = %process.id, score, "scored thinking process");

        // Strictly-greater comparison keeps the earliest-loaded process
        // on ties.
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((process, score)),
        }
    }

    best.map(|(process, _)| process)
        .ok_or(Error::NoProcessAvailable)
}

/// Score one process against a context.
///
/// Exact framework match counts double an exact language match; the
/// fraction of context patterns the process references adds up to one
/// more point.
pub fn score(process: &ThinkingProcess, context: &GenerationContext) -> f64 {
    let mut score = 0.0;

    if !context.framework.is_empty()
        && process.meta.framework.as_deref() == Some(context.framework.as_str())
    {
        score += FRAMEWORK_WEIGHT;
    }

    if process.meta.language.as_deref() == Some(context.language.as_str()) {
        score += LANGUAGE_WEIGHT;
    }

    if !context.patterns.is_empty() {
        let matched = context
            .patterns
            .iter()
            .filter(|id| references_pattern(process, id))
            .count();
        score += matched as f64 / context.patterns.len() as f64;
    }

    score
}

fn references_pattern(process: &ThinkingProcess, id: &str) -> bool {
    process.meta.patterns.iter().any(|p| p == id)
        || process.steps.iter().any(|step| step.contains(id))
}
