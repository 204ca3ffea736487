//! Per-test outcome records.
//!
//! One test execution produces exactly one [`TestOutcome`]: either a rendered
//! value or a categorized failure, never both. The record carries enough
//! diagnostic detail to explain a failure without leaking internal scope
//! identities across submissions.

use serde::{Deserialize, Serialize};

/// Attribution label for failures caused by the graded submission.
pub const ATTRIBUTION_SUBMISSION: &str = "submission";

/// Attribution label for failures caused by the grading infrastructure.
pub const ATTRIBUTION_INFRASTRUCTURE: &str = "infrastructure";

/// Serializable failure detail carried by an outcome record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Failure category name (closed taxonomy).
    pub category: String,
    /// Sub-reason for constructor/method resolution failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human-readable detail: names attempted, argument types, nested
    /// submission message.
    pub detail: String,
    /// Who the failure is attributed to: "submission" or "infrastructure".
    pub attribution: String,
}

impl FailureRecord {
    /// Whether this failure signals a defect in the grading infrastructure
    /// rather than in the submission.
    pub fn is_infrastructure(&self) -> bool {
        self.attribution == ATTRIBUTION_INFRASTRUCTURE
    }
}

/// Outcome of one test execution window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Test name as reported by the harness.
    pub test: String,
    /// Wall-clock duration of the test execution window, in milliseconds.
    pub elapsed_ms: u64,
    /// Rendered result value if the test completed normally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Failure record if the test failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureRecord>,
}

impl TestOutcome {
    /// Build a passing outcome.
    pub fn passed(test: impl Into<String>, elapsed_ms: u64, value: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            elapsed_ms,
            value: Some(value.into()),
            failure: None,
        }
    }

    /// Build a failing outcome.
    pub fn failed(test: impl Into<String>, elapsed_ms: u64, failure: FailureRecord) -> Self {
        Self {
            test: test.into(),
            elapsed_ms,
            value: None,
            failure: Some(failure),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.failure.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_is_value_or_failure_never_both() {
        let pass = TestOutcome::passed("t1", 3, "42");
        assert!(pass.is_pass());
        assert!(pass.failure.is_none());

        let fail = TestOutcome::failed(
            "t2",
            5,
            FailureRecord {
                category: "TypeResolutionError".into(),
                reason: None,
                detail: "type 'Foo' cannot be resolved".into(),
                attribution: ATTRIBUTION_SUBMISSION.into(),
            },
        );
        assert!(!fail.is_pass());
        assert!(fail.value.is_none());
    }

    #[test]
    fn test_outcome_json_round_trip() {
        let outcome = TestOutcome::failed(
            "testTimeout",
            10_050,
            FailureRecord {
                category: "TimeoutExceeded".into(),
                reason: None,
                detail: "test execution exceeded its 10000 ms budget".into(),
                attribution: ATTRIBUTION_SUBMISSION.into(),
            },
        );

        let json = serde_json::to_string(&outcome).expect("serialize");
        let restored: TestOutcome = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.test, "testTimeout");
        assert_eq!(restored.elapsed_ms, 10_050);
        let failure = restored.failure.expect("failure present");
        assert_eq!(failure.category, "TimeoutExceeded");
        assert!(!failure.is_infrastructure());
    }
}
