//! # Failure Taxonomy
//!
//! Every fault the harness can surface to a test outcome, as a closed set of
//! categories with a fixed attribution:
//!
//! | Category | Trigger | Attribution |
//! |---|---|---|
//! | `TypeResolution` | named type absent from the submission's scope | submission |
//! | `ConstructorResolution` | overload resolution failed on constructors | submission |
//! | `MethodResolution` | overload resolution failed on methods | submission |
//! | `SubmissionRuntime` | fault raised by resolved submission code | submission |
//! | `TimeoutExceeded` | test execution window exceeded its budget | submission (presumed) |
//! | `HarnessInternal` | invariant violation inside the core itself | infrastructure |
//!
//! Resolution failures are classified before any submission code runs.
//! Faults raised by submission artifacts are caught at the call boundary and
//! re-wrapped carrying only the submission's own message — they never
//! propagate as the harness's own fault type. `HarnessInternal` is the one
//! category that signals a defect in this crate rather than in the learner's
//! code; it is logged loudly the moment it is constructed and must never be
//! silently swallowed.

use std::any::Any;
use std::fmt;

use tracing::error;

use exercise_sandbox_types::{
    FailureRecord, SubmissionFault, Value, ATTRIBUTION_INFRASTRUCTURE, ATTRIBUTION_SUBMISSION,
};

use crate::overload::ResolutionReason;

/// One categorized failure; exactly one per failing outcome.
#[derive(Debug, Clone)]
pub enum Failure {
    /// The named type is absent from the submission's scope.
    TypeResolution { type_name: String },

    /// Constructor selection failed on a resolved type.
    ConstructorResolution {
        type_name: String,
        reason: ResolutionReason,
        /// Runtime type labels of the supplied arguments.
        arg_types: Vec<String>,
    },

    /// Method selection failed on a valid instance.
    MethodResolution {
        type_name: String,
        method: String,
        reason: ResolutionReason,
        /// Runtime type labels of the supplied arguments.
        arg_types: Vec<String>,
    },

    /// The resolved submission code itself raised a fault during
    /// construction or invocation.
    SubmissionRuntime {
        /// Where the fault surfaced, e.g. `Counter::increment`.
        location: String,
        /// The submission's own message, nothing of the harness's stack.
        message: String,
    },

    /// The test execution window exceeded its wall-clock budget.
    TimeoutExceeded { budget_ms: u64 },

    /// Invariant violation inside the harness itself (e.g. cross-context
    /// handle use). Never expected in correct operation: a defect in the
    /// infrastructure, not in the submission.
    HarnessInternal { message: String },
}

impl Failure {
    /// Construct a `HarnessInternal`, logging it at error level at the point
    /// of creation so an infrastructure defect is never folded quietly into
    /// a grading result.
    pub fn harness_internal(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(message = %message, "harness internal error");
        Failure::HarnessInternal { message }
    }

    /// Translate a fault returned by a submission artifact.
    pub fn submission_fault(location: impl Into<String>, fault: SubmissionFault) -> Self {
        Failure::SubmissionRuntime {
            location: location.into(),
            message: fault.message().to_string(),
        }
    }

    /// Translate a panic payload caught at the submission call boundary.
    /// Only the payload's own message survives the translation.
    pub fn submission_panic(location: impl Into<String>, payload: Box<dyn Any + Send>) -> Self {
        Failure::SubmissionRuntime {
            location: location.into(),
            message: panic_message(payload),
        }
    }

    /// Category name as it appears in outcome records.
    pub fn category(&self) -> &'static str {
        match self {
            Failure::TypeResolution { .. } => "TypeResolutionError",
            Failure::ConstructorResolution { .. } => "ConstructorResolutionError",
            Failure::MethodResolution { .. } => "MethodResolutionError",
            Failure::SubmissionRuntime { .. } => "SubmissionRuntimeFault",
            Failure::TimeoutExceeded { .. } => "TimeoutExceeded",
            Failure::HarnessInternal { .. } => "HarnessInternalError",
        }
    }

    /// Who the failure is attributed to.
    pub fn attribution(&self) -> &'static str {
        match self {
            Failure::HarnessInternal { .. } => ATTRIBUTION_INFRASTRUCTURE,
            _ => ATTRIBUTION_SUBMISSION,
        }
    }

    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Failure::HarnessInternal { .. })
    }

    /// Serializable record for a test outcome.
    pub fn to_record(&self) -> FailureRecord {
        let reason = match self {
            Failure::ConstructorResolution { reason, .. }
            | Failure::MethodResolution { reason, .. } => Some(reason.label().to_string()),
            _ => None,
        };
        FailureRecord {
            category: self.category().to_string(),
            reason,
            detail: self.to_string(),
            attribution: self.attribution().to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::TypeResolution { type_name } => {
                write!(
                    f,
                    "type '{type_name}' cannot be resolved in this submission's scope"
                )
            }
            Failure::ConstructorResolution {
                type_name,
                reason,
                arg_types,
            } => {
                write!(
                    f,
                    "constructor resolution failed for '{type_name}' with {} argument(s) ({}): {}",
                    arg_types.len(),
                    arg_types.join(", "),
                    reason.describe()
                )
            }
            Failure::MethodResolution {
                type_name,
                method,
                reason,
                arg_types,
            } => {
                write!(
                    f,
                    "method resolution failed for '{type_name}::{method}' with {} argument(s) ({}): {}",
                    arg_types.len(),
                    arg_types.join(", "),
                    reason.describe()
                )
            }
            Failure::SubmissionRuntime { location, message } => {
                write!(f, "submission code failed in {location}: {message}")
            }
            Failure::TimeoutExceeded { budget_ms } => {
                write!(f, "test execution exceeded its {budget_ms} ms budget")
            }
            Failure::HarnessInternal { message } => {
                write!(f, "harness internal error: {message}")
            }
        }
    }
}

impl std::error::Error for Failure {}

/// Extract the message of a caught panic payload.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "submission code panicked with a non-string payload".to_string()
    }
}

/// Runtime type labels of an argument list, for diagnostics.
pub fn describe_args(args: &[Value]) -> Vec<String> {
    args.iter().map(|v| v.type_label()).collect()
}
