//! # Run Report
//!
//! Aggregation of one submission's test outcomes into a serializable report,
//! with JSON persistence for downstream grading pipelines. A report with any
//! infrastructure-attributed failure is flagged so a grading run can be
//! voided instead of counted against the learner.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use exercise_sandbox_types::TestOutcome;

/// All outcomes of one submission's grading run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier of the submission this report covers.
    pub submission: String,
    pub outcomes: Vec<TestOutcome>,
}

impl RunReport {
    pub fn new(submission: impl Into<String>) -> Self {
        Self {
            submission: submission.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: TestOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_pass()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// True if any outcome failed for a reason attributed to the harness
    /// rather than the submission. Such a run should be re-executed, not
    /// graded.
    pub fn has_infrastructure_failure(&self) -> bool {
        self.outcomes
            .iter()
            .filter_map(|o| o.failure.as_ref())
            .any(|f| f.is_infrastructure())
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serialize run report")?;
        fs::write(path, json).with_context(|| format!("write report to {}", path.display()))?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("read report from {}", path.display()))?;
        serde_json::from_str(&json).context("parse run report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exercise_sandbox_types::{FailureRecord, ATTRIBUTION_INFRASTRUCTURE};

    fn sample_report() -> RunReport {
        let mut report = RunReport::new("student-42");
        report.record(TestOutcome::passed("testValue", 3, "0".to_string()));
        report.record(TestOutcome::failed(
            "testIncrement",
            5,
            FailureRecord {
                category: "SubmissionRuntimeFault".into(),
                reason: None,
                detail: "submission code failed in Counter::increment: overflow".into(),
                attribution: "submission".into(),
            },
        ));
        report
    }

    #[test]
    fn test_counts() {
        let report = sample_report();
        assert_eq!(report.total(), 2);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.has_infrastructure_failure());
    }

    #[test]
    fn test_infrastructure_failure_flags_the_run() {
        let mut report = sample_report();
        report.record(TestOutcome::failed(
            "testHandle",
            1,
            FailureRecord {
                category: "HarnessInternalError".into(),
                reason: None,
                detail: "handle belongs to a different execution context".into(),
                attribution: ATTRIBUTION_INFRASTRUCTURE.into(),
            },
        ));
        assert!(report.has_infrastructure_failure());
    }

    #[test]
    fn test_json_round_trip_through_disk() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("report.json");

        let report = sample_report();
        report.save_json(&path).expect("save report");

        let loaded = RunReport::load_json(&path).expect("load report");
        assert_eq!(loaded.submission, "student-42");
        assert_eq!(loaded.total(), 2);
        assert_eq!(loaded.passed(), 1);
        let failure = loaded.outcomes[1].failure.as_ref().expect("failure kept");
        assert_eq!(failure.category, "SubmissionRuntimeFault");
    }
}
