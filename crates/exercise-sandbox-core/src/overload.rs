//! # Overload Resolution
//!
//! Pure selection of one constructor or method among same-named candidates,
//! given the runtime types of the supplied arguments.
//!
//! ## Algorithm
//!
//! 1. Filter candidates to those whose arity equals the argument count.
//!    Zero survivors → [`ResolutionReason::NoSuchCandidate`].
//! 2. Score each survivor per parameter: an exact type match scores 0, an
//!    assignable-by-widening or declared-compatibility (upcast) match scores
//!    1, anything else disqualifies the candidate. A candidate's total is
//!    the sum over its parameters; lower is better. Zero applicable
//!    candidates → [`ResolutionReason::NoApplicableOverload`].
//! 3. The unique lowest total wins. A tie for the lowest total is rejected
//!    as [`ResolutionReason::Ambiguous`] — resolution never makes an
//!    arbitrary pick, since the choice determines which submission
//!    implementation runs.
//!
//! The scorer is injected so the algorithm itself stays pure: primitive
//! widening lives on [`ParamType`], instance upcasting on the resolution
//! scope.

use exercise_sandbox_types::{Constructor, Method, ParamType, Value};

/// Why overload selection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionReason {
    /// No candidate with matching arity (or no candidate at all).
    NoSuchCandidate,
    /// Arity matched somewhere, but no candidate accepted the argument types.
    NoApplicableOverload,
    /// Two or more candidates tied on the best compatibility score.
    Ambiguous,
}

impl ResolutionReason {
    /// Stable label used in outcome records.
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionReason::NoSuchCandidate => "NoSuchCandidate",
            ResolutionReason::NoApplicableOverload => "NoApplicableOverload",
            ResolutionReason::Ambiguous => "AmbiguousOverload",
        }
    }

    /// Human-readable phrasing for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            ResolutionReason::NoSuchCandidate => "no candidate with that name and arity",
            ResolutionReason::NoApplicableOverload => {
                "no overload accepts the supplied argument types"
            }
            ResolutionReason::Ambiguous => "two or more overloads match equally well",
        }
    }
}

/// A candidate signature: anything exposing declared parameter types.
pub trait Candidate {
    fn declared_params(&self) -> &[ParamType];
}

impl Candidate for Constructor {
    fn declared_params(&self) -> &[ParamType] {
        self.params()
    }
}

impl Candidate for Method {
    fn declared_params(&self) -> &[ParamType] {
        self.params()
    }
}

/// Select exactly one candidate for the given arguments, or fail.
///
/// `score` is the compatibility oracle: `Some(0)` exact, `Some(1)` widening
/// or upcast, `None` inapplicable.
pub fn select<'a, C, S>(
    candidates: &'a [C],
    args: &[Value],
    score: S,
) -> Result<&'a C, ResolutionReason>
where
    C: Candidate,
    S: Fn(&ParamType, &Value) -> Option<u32>,
{
    // Step 1: arity filter.
    let arity_matched: Vec<&C> = candidates
        .iter()
        .filter(|c| c.declared_params().len() == args.len())
        .collect();
    if arity_matched.is_empty() {
        return Err(ResolutionReason::NoSuchCandidate);
    }

    // Step 2: per-parameter compatibility scoring.
    let mut scored: Vec<(u32, &C)> = Vec::new();
    for candidate in arity_matched {
        let mut total = 0u32;
        let mut applicable = true;
        for (param, arg) in candidate.declared_params().iter().zip(args) {
            match score(param, arg) {
                Some(s) => total += s,
                None => {
                    applicable = false;
                    break;
                }
            }
        }
        if applicable {
            scored.push((total, candidate));
        }
    }
    if scored.is_empty() {
        return Err(ResolutionReason::NoApplicableOverload);
    }

    // Step 3: unique best total wins; an exact tie is rejected.
    let best = scored.iter().map(|(total, _)| *total).min().unwrap_or(0);
    let mut at_best = scored
        .iter()
        .filter(|(total, _)| *total == best)
        .map(|(_, candidate)| *candidate);
    let winner = at_best.next().ok_or(ResolutionReason::NoApplicableOverload)?;
    if at_best.next().is_some() {
        return Err(ResolutionReason::Ambiguous);
    }
    Ok(winner)
}
