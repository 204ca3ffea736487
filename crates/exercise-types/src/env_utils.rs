//! Environment variable parsing utilities.
//!
//! Type-safe parsing of environment variables with defaults, eliminating the
//! repeated `std::env::var(..).ok().and_then(..).unwrap_or(..)` boilerplate.
//!
//! # Example
//!
//! ```
//! use exercise_sandbox_types::env_utils::{env_var, env_var_or};
//!
//! // Per-test budget override with default
//! let budget_ms: u64 = env_var_or("EXERCISE_TEST_BUDGET_MS", 10_000);
//!
//! // Parse returning Option
//! let custom: Option<u64> = env_var("CUSTOM_VALUE");
//! ```

use std::str::FromStr;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Parse an environment variable with a default value.
///
/// Returns the default if the variable is not set or cannot be parsed.
///
/// # Example
///
/// ```
/// use exercise_sandbox_types::env_utils::env_var_or;
///
/// let budget_ms: u64 = env_var_or("EXERCISE_TEST_BUDGET_MS", 10_000);
/// ```
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}
