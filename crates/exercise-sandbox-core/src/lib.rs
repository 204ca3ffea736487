//! Exercise Sandbox Core
//!
//! Execution core for grading programming exercise submissions.
//!
//! This crate resolves submitted types by name, selects constructor and
//! method overloads against runtime argument types, executes the resolved
//! submission code behind a fault boundary, and supervises each test with a
//! wall-clock timeout. Every failure surfaces as exactly one category of a
//! closed taxonomy, attributed to the submission or to the infrastructure.
//!
//! # Core Modules
//!
//! - [`scope`]: per-submission isolated name-to-type resolution
//! - [`overload`]: arity filter plus compatibility-scored overload selection
//! - [`failure`]: the closed failure taxonomy and panic/fault translation
//! - [`context`]: object creation and virtual method dispatch
//! - [`guard`]: per-test wall-clock budget with cooperative cancellation
//! - [`harness`]: the base surface instructor-authored tests run against
//! - [`report`]: aggregation and JSON persistence of test outcomes
//!
//! # Example
//!
//! ```ignore
//! use exercise_sandbox_core::{ExecutionContext, SubmissionBuilder, TestHarness};
//!
//! let scope = SubmissionBuilder::new()
//!     .register(counter_typedef())
//!     .build()?;
//! let harness = TestHarness::new(ExecutionContext::new(scope));
//! let outcome = harness.run_test("testStartsAtZero", |h, _| {
//!     let counter = h.create_object("Counter", &[])?;
//!     h.execute_method(&counter, "value", &[])
//! });
//! ```

pub mod context;
pub mod failure;
pub mod guard;
pub mod harness;
pub mod overload;
pub mod report;
pub mod scope;

pub use context::ExecutionContext;
pub use failure::Failure;
pub use guard::{CancelToken, GuardProbe, GuardState, TimeoutGuard, DEFAULT_BUDGET_MS};
pub use harness::TestHarness;
pub use overload::ResolutionReason;
pub use report::RunReport;
pub use scope::{ResolutionScope, SubmissionBuilder};
