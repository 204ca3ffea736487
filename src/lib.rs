//! Exercise Sandbox
//!
//! Grading harness for programming exercise submissions:
//!
//! - **Resolution**: per-submission name-to-type lookup with inheritance
//! - **Overload selection**: exact-match-first scoring with ambiguity rejection
//! - **Fault isolation**: submission failures caught and classified, never
//!   propagated as harness failures
//! - **Timeout supervision**: every test runs under a wall-clock budget
//!
//! See [`exercise_sandbox_core`] for the execution core and
//! [`exercise_sandbox_types`] for the value model shared across crates.

pub use exercise_sandbox_core as core;
pub use exercise_sandbox_types as types;

pub use exercise_sandbox_core::{
    CancelToken, ExecutionContext, Failure, ResolutionReason, RunReport, SubmissionBuilder,
    TestHarness, TimeoutGuard,
};
pub use exercise_sandbox_types::{
    Constructor, FailureRecord, InstanceHandle, Method, ObjectState, ParamType, SubmissionFault,
    TestOutcome, TypeDef, Value,
};
