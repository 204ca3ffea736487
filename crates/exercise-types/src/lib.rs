//! Shared types for the exercise-sandbox workspace.
//!
//! This crate provides the data model used across the workspace:
//!
//! - [`value`]: dynamic [`Value`]s and declared [`ParamType`]s with the fixed
//!   widening rule used by overload resolution
//! - [`typedef`]: compiled submission [`TypeDef`]s (constructors, methods,
//!   inheritance) and opaque [`InstanceHandle`]s
//! - [`outcome`]: serializable per-test [`TestOutcome`] records
//! - [`env_utils`]: typed environment-variable parsing

pub mod env_utils;
pub mod outcome;
pub mod typedef;
pub mod value;

// Re-export commonly used types at crate root
pub use outcome::{FailureRecord, TestOutcome, ATTRIBUTION_INFRASTRUCTURE, ATTRIBUTION_SUBMISSION};
pub use typedef::{
    Constructor, ConstructorFn, InstanceHandle, Method, MethodFn, ObjectState, SubmissionFault,
    TypeDef,
};
pub use value::{ParamType, Value};
