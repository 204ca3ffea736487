//! # Timeout Guard
//!
//! Wall-clock supervision of one test execution. The guard runs the whole
//! test body on a dedicated worker thread and races it against a budget —
//! it deliberately does not supervise individual context calls, because a
//! single submission call may itself be the infinite loop, and per-call
//! supervision would only tax every well-behaved call.
//!
//! Cancellation is cooperative: at budget expiry the guard flips a shared
//! [`CancelToken`] and reports [`Failure::TimeoutExceeded`] promptly, but a
//! body that never polls the token keeps consuming its thread. This is a
//! documented limitation of in-process supervision; a deployment running
//! truly untrusted code must pair this guard with an outer process-level or
//! OS-level hard limit. The guard's contract is "report promptly", not
//! "terminate forcibly".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use exercise_sandbox_types::env_utils::env_var_or;

use crate::failure::Failure;

/// Default per-test budget in milliseconds.
pub const DEFAULT_BUDGET_MS: u64 = 10_000;

/// Environment variable overriding the default budget, in milliseconds.
pub const BUDGET_ENV_VAR: &str = "EXERCISE_TEST_BUDGET_MS";

/// The configured default budget: 10 000 ms unless overridden via
/// [`BUDGET_ENV_VAR`].
pub fn default_budget() -> Duration {
    Duration::from_millis(env_var_or(BUDGET_ENV_VAR, DEFAULT_BUDGET_MS))
}

/// Cooperative cancellation signal handed to the supervised body.
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the guard has given up on this execution. Long-running
    /// test bodies should poll this at safe points.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Lifecycle of one guarded execution. `Completed` and `Aborted` are final;
/// a guard is consumed by [`TimeoutGuard::run`] and can never be re-armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Armed,
    Running,
    Completed,
    Aborted,
}

/// Observer onto a guard's state, usable after the guard itself is consumed.
#[derive(Clone)]
pub struct GuardProbe {
    state: Arc<Mutex<GuardState>>,
}

impl GuardProbe {
    pub fn state(&self) -> GuardState {
        *self.state.lock()
    }
}

/// Supervises one test body against a wall-clock budget.
pub struct TimeoutGuard {
    budget: Duration,
    state: Arc<Mutex<GuardState>>,
    token: CancelToken,
}

impl TimeoutGuard {
    /// Arm a guard with the configured default budget.
    pub fn new() -> Self {
        Self::with_budget(default_budget())
    }

    /// Arm a guard with an explicit budget.
    pub fn with_budget(budget: Duration) -> Self {
        Self {
            budget,
            state: Arc::new(Mutex::new(GuardState::Armed)),
            token: CancelToken::new(),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn state(&self) -> GuardState {
        *self.state.lock()
    }

    pub fn probe(&self) -> GuardProbe {
        GuardProbe {
            state: Arc::clone(&self.state),
        }
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Run `body` on a dedicated worker thread and race it against the
    /// budget.
    ///
    /// The body's own result is passed through if it finishes in time —
    /// including a body that reports a `Failure` of its own, which still
    /// counts as `Completed`. Budget expiry reports
    /// [`Failure::TimeoutExceeded`] and detaches the worker. A worker that
    /// vanishes without reporting (a panic escaping the submission call
    /// boundary) is an infrastructure fault.
    pub fn run<T, F>(self, body: F) -> Result<T, Failure>
    where
        T: Send + 'static,
        F: FnOnce(&CancelToken) -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let token = self.token.clone();
        *self.state.lock() = GuardState::Running;
        let started = Instant::now();

        let spawned = thread::Builder::new()
            .name("exercise-test-worker".into())
            .spawn(move || {
                // A send failure means the supervisor already reported a
                // timeout and dropped the receiver.
                let _ = tx.send(body(&token));
            });
        let worker = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                *self.state.lock() = GuardState::Aborted;
                return Err(Failure::harness_internal(format!(
                    "failed to spawn test worker: {e}"
                )));
            }
        };

        match rx.recv_timeout(self.budget) {
            Ok(result) => {
                *self.state.lock() = GuardState::Completed;
                debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "test body completed within budget"
                );
                // The worker has already sent; joining is bounded.
                let _ = worker.join();
                Ok(result)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                *self.state.lock() = GuardState::Aborted;
                self.token.cancel();
                warn!(
                    budget_ms = self.budget.as_millis() as u64,
                    "test body exceeded its budget, aborting"
                );
                // Worker stays detached; a body that never checks the token
                // keeps its thread.
                Err(Failure::TimeoutExceeded {
                    budget_ms: self.budget.as_millis() as u64,
                })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                *self.state.lock() = GuardState::Aborted;
                let _ = worker.join();
                Err(Failure::harness_internal(
                    "test worker terminated without reporting a result",
                ))
            }
        }
    }
}

impl Default for TimeoutGuard {
    fn default() -> Self {
        Self::new()
    }
}
