//! Error types used by the taskgate combinators and queue.
//!
//! This module defines three error types:
//!
//! - [`TaskError`]: errors raised by (or on behalf of) individual task executions.
//! - [`ConfigError`]: eager validation failures of construction-time configuration.
//! - [`PartlyFailedError`]: a repeat sequence that failed after partial success.
//!
//! [`TaskError`] provides helper methods (`as_label`, `as_message`) for logging,
//! mirroring the labels used by the event bus.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// One failed attempt recorded by [`with_retries`](crate::with_retries).
#[derive(Debug)]
pub struct FailedAttempt {
    /// The error the attempt failed with.
    pub error: TaskError,
    /// Wall time spent in the attempt.
    pub elapsed: Duration,
}

/// # Errors produced by task execution.
///
/// Task bodies return `Result<T, TaskError>`; the combinators add their own
/// variants on top (`Canceled`, `Timeout`, `MaximumTriesReached`, ...).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The task handle cannot be started (e.g. an already-started operation observed twice).
    #[error("invalid task: {reason}")]
    InvalidTask {
        /// Why the task is unusable.
        reason: String,
    },

    /// Cooperative cancellation fired before the task settled.
    #[error("operation cancelled{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    Canceled {
        /// Optional reason passed to `cancel()`.
        reason: Option<String>,
    },

    /// The deadline elapsed before the task settled.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// Every attempt of a retried task failed.
    #[error("maximum tries reached after {} attempts", .errors.len())]
    MaximumTriesReached {
        /// Ledger of all failed attempts, in order.
        errors: Vec<FailedAttempt>,
    },

    /// A wait condition failed on its own (not through cancellation).
    #[error("condition failed: {source}")]
    ConditionFailed {
        /// The error raised by the condition body.
        source: Box<TaskError>,
    },

    /// A capability is not available in the current environment.
    #[error("not supported: {capability}")]
    NotSupported {
        /// The missing capability.
        capability: String,
    },

    /// The task body failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The queue discarded the item (via `clear()`) before it began executing.
    #[error("discarded before execution")]
    Discarded,

    /// The task body panicked.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use taskgate::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.to_string(), "execution failed: boom");
    /// ```
    pub fn fail(error: impl fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskgate::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::InvalidTask { .. } => "task_invalid",
            TaskError::Canceled { .. } => "task_canceled",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::MaximumTriesReached { .. } => "task_max_tries_reached",
            TaskError::ConditionFailed { .. } => "task_condition_failed",
            TaskError::NotSupported { .. } => "task_not_supported",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Discarded => "task_discarded",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::InvalidTask { reason } => format!("invalid: {reason}"),
            TaskError::Canceled { reason: Some(r) } => format!("cancelled: {r}"),
            TaskError::Canceled { reason: None } => "cancelled".to_string(),
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::MaximumTriesReached { errors } => {
                let last = errors
                    .last()
                    .map(|a| a.error.as_message())
                    .unwrap_or_default();
                format!("tries={} last={last}", errors.len())
            }
            TaskError::ConditionFailed { source } => format!("condition: {}", source.as_message()),
            TaskError::NotSupported { capability } => format!("unsupported: {capability}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Discarded => "discarded".to_string(),
            TaskError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// True for [`TaskError::Canceled`].
    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskError::Canceled { .. })
    }

    /// True for [`TaskError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }

    /// Builds a [`TaskError::Panicked`] from a `catch_unwind`/join payload.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let info = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown".to_string());
        TaskError::Panicked { info }
    }

    /// Maps a failed join of a spawned task body.
    pub(crate) fn from_join(err: tokio::task::JoinError) -> Self {
        match err.try_into_panic() {
            Ok(payload) => TaskError::from_panic(payload.as_ref()),
            Err(_) => TaskError::Canceled {
                reason: Some("runtime shut down".to_string()),
            },
        }
    }
}

/// # Invalid construction-time configuration.
///
/// Raised synchronously by [`QueueConfig::validate`](crate::QueueConfig::validate)
/// and therefore by [`Queue::new`](crate::Queue::new).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `concurrency` must be at least 1.
    #[error("concurrency must be at least 1 (got {0})")]
    InvalidConcurrency(usize),

    /// An interval must be at least 1ms.
    #[error("{name} must be at least 1ms (got {value:?})")]
    InvalidInterval {
        /// Option name.
        name: &'static str,
        /// Rejected value.
        value: Duration,
    },
}

/// A repeat sequence stopped on a failure after `succeeded.len()` iterations.
///
/// Partial progress is preserved: `succeeded` holds the results of every
/// iteration that completed before `source`.
#[derive(Debug)]
pub struct PartlyFailedError<T> {
    /// Results of the iterations that completed, in order.
    pub succeeded: Vec<T>,
    /// The failure that ended the sequence.
    pub source: TaskError,
}

impl<T> PartlyFailedError<T> {
    /// True if the sequence ended through cancellation.
    pub fn is_canceled(&self) -> bool {
        self.source.is_canceled()
    }

    /// Splits the error into its parts.
    pub fn into_parts(self) -> (Vec<T>, TaskError) {
        (self.succeeded, self.source)
    }
}

impl<T> fmt::Display for PartlyFailedError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "partly failed after {} iterations: {}",
            self.succeeded.len(),
            self.source
        )
    }
}

impl<T: fmt::Debug> std::error::Error for PartlyFailedError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
