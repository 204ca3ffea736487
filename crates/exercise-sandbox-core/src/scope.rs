//! # Per-Submission Type Resolution
//!
//! This module provides the isolation boundary of the grading harness: a
//! [`ResolutionScope`] maps simple type names to one submission's compiled
//! type definitions, and nothing else.
//!
//! ## Purpose
//!
//! - **Isolation**: a scope is built from exactly one submission's type
//!   inventory; lookup never falls back to any outer or global namespace, so
//!   code resolved through one scope can never observe a type defined under a
//!   different submission's scope, even when the names collide.
//! - **Lookup**: exact, case-sensitive simple-name resolution only.
//! - **Compatibility oracle**: the scope scores instance arguments against
//!   declared parameter types, since it alone knows the submission's
//!   inheritance chains.
//!
//! A scope is built once by [`SubmissionBuilder`] when an execution context
//! is created for a submission and is read-only afterwards; it is shared via
//! `Arc` and discarded together with the context at the end of the run.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::warn;

use exercise_sandbox_types::{ParamType, TypeDef, Value};

/// Isolated simple-name → type lookup table for one submission.
pub struct ResolutionScope {
    types: BTreeMap<String, Arc<TypeDef>>,
}

impl ResolutionScope {
    /// Exact simple-name lookup (case-sensitive, no fallback). `None` means
    /// the submission does not declare the type; the execution context
    /// classifies that as a type resolution failure.
    pub fn resolve(&self, name: &str) -> Option<&Arc<TypeDef>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Assignability score of `arg` against a declared parameter type:
    /// `Some(0)` for an exact match, `Some(1)` for a widening conversion or
    /// declared (upcast) compatibility, `None` when inapplicable.
    pub fn assign_score(&self, param: &ParamType, arg: &Value) -> Option<u32> {
        if let (ParamType::Instance(declared), Value::Instance(handle)) = (param, arg) {
            if handle.type_name() == declared {
                return Some(0);
            }
            if self.is_ancestor(declared, handle.type_name()) {
                return Some(1);
            }
            return None;
        }
        param.primitive_score(arg)
    }

    /// Whether `ancestor` appears in `descendant`'s parent chain.
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        let mut current = self.resolve(descendant).and_then(|t| t.parent());
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = self.resolve(name).and_then(|t| t.parent());
        }
        false
    }

    /// Inheritance chain starting at `type_name`, nearest type first.
    /// Used for virtual dispatch: the first type in the chain declaring a
    /// method name owns the candidate overload set.
    pub fn inheritance_chain(&self, type_name: &str) -> Vec<&Arc<TypeDef>> {
        let mut chain = Vec::new();
        let mut current = self.resolve(type_name);
        while let Some(def) = current {
            chain.push(def);
            current = def.parent().and_then(|p| self.resolve(p));
        }
        chain
    }
}

/// Builder assembling one submission's type inventory into a scope.
///
/// Duplicate simple names follow last-one-wins with a warning, matching how
/// compiled artifacts are loaded elsewhere. [`build`](Self::build) validates
/// parent links: a dangling or cyclic parent is a submission-construction
/// error, reported before any test runs.
#[derive(Default)]
pub struct SubmissionBuilder {
    types: BTreeMap<String, Arc<TypeDef>>,
}

impl SubmissionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one compiled type definition.
    pub fn register(mut self, def: TypeDef) -> Self {
        let name = def.name().to_string();
        if self.types.contains_key(&name) {
            warn!(type_name = %name, "duplicate type registered, overwriting previous");
        }
        self.types.insert(name, Arc::new(def));
        self
    }

    /// Finish the inventory, validating inheritance links.
    pub fn build(self) -> Result<Arc<ResolutionScope>> {
        for def in self.types.values() {
            if let Some(parent) = def.parent() {
                if !self.types.contains_key(parent) {
                    bail!(
                        "type '{}' declares parent '{}' absent from this submission",
                        def.name(),
                        parent
                    );
                }
            }

            // Single inheritance still admits cycles through bad input.
            let mut seen = vec![def.name()];
            let mut current = def.parent();
            while let Some(name) = current {
                if seen.contains(&name) {
                    bail!("inheritance cycle through type '{}'", name);
                }
                seen.push(name);
                current = self.types.get(name).and_then(|t| t.parent());
            }
        }

        Ok(Arc::new(ResolutionScope { types: self.types }))
    }
}
