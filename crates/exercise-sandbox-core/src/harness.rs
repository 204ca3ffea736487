//! # Test Harness Base
//!
//! The contract instructor-authored test cases extend. A harness is built
//! with its [`ExecutionContext`] supplied at construction — there is no
//! set-after-build injection point, so a harness can never be used before it
//! is wired. Test bodies see only `create_object` / `execute_method` plus
//! the cancellation token; every test body runs under its own timeout guard
//! and yields exactly one [`TestOutcome`].
//!
//! ```ignore
//! let harness = TestHarness::new(ExecutionContext::new(scope));
//! let outcome = harness.run_test("testCounterStartsAtZero", |h, _| {
//!     let counter = h.create_object("Counter", &[])?;
//!     h.execute_method(&counter, "value", &[])
//! });
//! assert!(outcome.is_pass());
//! ```

use std::time::{Duration, Instant};

use exercise_sandbox_types::{InstanceHandle, TestOutcome, Value};

use crate::context::ExecutionContext;
use crate::failure::Failure;
use crate::guard::{default_budget, CancelToken, TimeoutGuard};

/// Base surface for instructor-authored tests over one submission.
#[derive(Clone)]
pub struct TestHarness {
    ctx: ExecutionContext,
    budget: Duration,
}

impl TestHarness {
    /// Build a harness around the context for one submission's grading run,
    /// with the configured default budget (10 000 ms unless overridden).
    pub fn new(ctx: ExecutionContext) -> Self {
        Self {
            ctx,
            budget: default_budget(),
        }
    }

    /// Override the per-test budget for this suite.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Create an instance of a submitted exercise type. By the time a test
    /// is written the concrete implementation does not exist yet, so tests
    /// can never name submission types directly — this is the only way in.
    pub fn create_object(&self, type_name: &str, args: &[Value]) -> Result<InstanceHandle, Failure> {
        self.ctx.create_object(type_name, args)
    }

    /// Execute a named method on an instance of a submitted exercise type.
    pub fn execute_method(
        &self,
        target: &InstanceHandle,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Failure> {
        self.ctx.execute_method(target, method, args)
    }

    /// Run one test body under a fresh timeout guard with the suite budget.
    pub fn run_test<F>(&self, name: &str, body: F) -> TestOutcome
    where
        F: FnOnce(&TestHarness, &CancelToken) -> Result<Value, Failure> + Send + 'static,
    {
        self.run_test_with_budget(name, self.budget, body)
    }

    /// Run one test body with an explicit per-test budget override.
    ///
    /// The body receives a harness over a fresh execution context bound to
    /// the same underlying scope, so concurrent tests never share handles.
    /// Exactly one guard governs the execution and is discarded with it.
    pub fn run_test_with_budget<F>(&self, name: &str, budget: Duration, body: F) -> TestOutcome
    where
        F: FnOnce(&TestHarness, &CancelToken) -> Result<Value, Failure> + Send + 'static,
    {
        let guard = TimeoutGuard::with_budget(budget);
        let worker_harness = TestHarness {
            ctx: self.ctx.fresh(),
            budget,
        };
        let started = Instant::now();
        let result = guard.run(move |token| body(&worker_harness, token));
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(value)) => TestOutcome::passed(name, elapsed_ms, value.render()),
            Ok(Err(failure)) => TestOutcome::failed(name, elapsed_ms, failure.to_record()),
            Err(failure) => TestOutcome::failed(name, elapsed_ms, failure.to_record()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::SubmissionBuilder;
    use exercise_sandbox_types::{ObjectState, SubmissionFault, TypeDef};

    fn greeter_harness() -> TestHarness {
        let scope = SubmissionBuilder::new()
            .register(
                TypeDef::new("Greeter")
                    .constructor(&[], |_| Ok(Box::new(()) as ObjectState))
                    .method("greet", &[], |_, _| Ok(Value::Str("hello".into())))
                    .method("fail", &[], |_, _| {
                        Err(SubmissionFault::new("deliberate failure"))
                    }),
            )
            .build()
            .expect("build scope");
        TestHarness::new(ExecutionContext::new(scope))
    }

    #[test]
    fn test_passing_outcome_carries_rendered_value() {
        let harness = greeter_harness();
        let outcome = harness.run_test("testGreet", |h, _| {
            let greeter = h.create_object("Greeter", &[])?;
            h.execute_method(&greeter, "greet", &[])
        });
        assert!(outcome.is_pass());
        assert_eq!(outcome.value.as_deref(), Some("\"hello\""));
        assert_eq!(outcome.test, "testGreet");
    }

    #[test]
    fn test_failing_outcome_carries_one_category() {
        let harness = greeter_harness();
        let outcome = harness.run_test("testFail", |h, _| {
            let greeter = h.create_object("Greeter", &[])?;
            h.execute_method(&greeter, "fail", &[])
        });
        assert!(!outcome.is_pass());
        assert!(outcome.value.is_none());
        let failure = outcome.failure.expect("failure present");
        assert_eq!(failure.category, "SubmissionRuntimeFault");
        assert!(failure.detail.contains("deliberate failure"));
    }

    #[test]
    fn test_per_test_budget_override_times_out() {
        let harness = greeter_harness();
        let outcome =
            harness.run_test_with_budget("testSpin", Duration::from_millis(50), |_, token| {
                while !token.is_cancelled() {
                    std::thread::sleep(Duration::from_millis(5));
                }
                Ok(Value::Unit)
            });
        let failure = outcome.failure.expect("failure present");
        assert_eq!(failure.category, "TimeoutExceeded");
    }

    #[test]
    fn test_each_test_gets_a_fresh_context() {
        let harness = greeter_harness();
        let base_id = harness.context().id();
        let outcome = harness.run_test("testContextIdentity", move |h, _| {
            if h.context().id() == base_id {
                Err(Failure::harness_internal("context was not refreshed"))
            } else {
                Ok(Value::Unit)
            }
        });
        assert!(outcome.is_pass(), "{:?}", outcome.failure);
    }
}
