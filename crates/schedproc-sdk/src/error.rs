// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error taxonomy for activity execution.
//!
//! Three layers, from the host's point of view:
//! - [`IntegrationError`]: the host broke its contract. Always fatal.
//! - [`ActivityError`]: raised by concrete activity logic. Caught once by the
//!   lifecycle wrapper and subject to the `FailOnException` policy.
//! - [`ExecutionFailure`]: what the host receives when an invocation fails.

use thiserror::Error;

use crate::arguments::ArgumentError;

/// Host contract violations detected while building the invocation scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrationError {
    /// The host passed no execution context at all
    #[error("Code Activity Context is null")]
    NullContext,

    /// The tracing capability is not registered on the context
    #[error("Failed to retrieve tracing service.")]
    TracingServiceUnavailable,

    /// The workflow context is not registered on the context
    #[error("Failed to retrieve workflow context.")]
    WorkflowContextUnavailable,

    /// The organization service factory is not registered on the context
    #[error("Failed to retrieve organization service factory.")]
    ServiceFactoryUnavailable,
}

/// Errors returned by the remote organization service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service processed the request and rejected it
    #[error("{message}")]
    Fault {
        /// Service specific error code
        code: String,
        /// Error message from the service
        message: String,
    },

    /// The request never reached the service or the reply was lost
    #[error("organization service unreachable: {0}")]
    Transport(String),
}

/// Failures raised by concrete activity logic.
///
/// The `Display` output of every variant is the exact message written to the
/// `ExceptionMessage` output and carried by [`ExecutionFailure::Activity`].
#[derive(Debug, Error)]
pub enum ActivityError {
    /// Invalid or ambiguous configuration detected before any remote mutation
    #[error("{0}")]
    InvalidExecution(String),

    /// A branch of the activity that is deliberately left unimplemented
    #[error("{0}")]
    NotImplemented(String),

    /// Argument lookup failed for a reason other than a missing binding
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// Remote call failed
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Concrete activity logic panicked
    #[error("{0}")]
    Panicked(String),
}

impl ActivityError {
    /// Shorthand for [`ActivityError::InvalidExecution`].
    pub fn invalid(message: impl Into<String>) -> Self {
        ActivityError::InvalidExecution(message.into())
    }

    /// Shorthand for [`ActivityError::NotImplemented`].
    pub fn not_implemented(message: impl Into<String>) -> Self {
        ActivityError::NotImplemented(message.into())
    }

    /// True for the unimplemented-branch signal.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, ActivityError::NotImplemented(_))
    }
}

/// Failure reported to the host by the lifecycle wrapper.
#[derive(Debug, Error)]
pub enum ExecutionFailure {
    /// Host contract violation, never subject to `FailOnException`
    #[error(transparent)]
    Integration(#[from] IntegrationError),

    /// Activity failure re-raised because `FailOnException` resolved to true
    #[error("{message}")]
    Activity {
        /// The original failure message
        message: String,
        /// The original failure
        #[source]
        source: ActivityError,
    },
}

impl ExecutionFailure {
    /// Wrap an activity failure, keeping its message and cause.
    pub fn activity(source: ActivityError) -> Self {
        ExecutionFailure::Activity {
            message: source.to_string(),
            source,
        }
    }

    /// The activity failure this wraps, if any.
    pub fn activity_error(&self) -> Option<&ActivityError> {
        match self {
            ExecutionFailure::Activity { source, .. } => Some(source),
            ExecutionFailure::Integration(_) => None,
        }
    }
}

/// Result type for activity logic.
pub type Result<T> = std::result::Result<T, ActivityError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_activity_error_display_is_plain_message() {
        let err = ActivityError::invalid("Process Name cannot be null or empty");
        assert_eq!(err.to_string(), "Process Name cannot be null or empty");
    }

    #[test]
    fn test_execution_failure_preserves_message_and_cause() {
        let failure = ExecutionFailure::activity(ActivityError::not_implemented("nope"));
        assert_eq!(failure.to_string(), "nope");
        assert!(failure.source().is_some());
        assert!(failure.activity_error().unwrap().is_not_implemented());
    }

    #[test]
    fn test_integration_failure_has_no_activity_error() {
        let failure = ExecutionFailure::from(IntegrationError::NullContext);
        assert!(failure.activity_error().is_none());
        assert_eq!(failure.to_string(), "Code Activity Context is null");
    }

    #[test]
    fn test_service_fault_display() {
        let err = ActivityError::from(ServiceError::Fault {
            code: "0x80040217".to_string(),
            message: "workflow With Id = 1 Does Not Exist".to_string(),
        });
        assert_eq!(err.to_string(), "workflow With Id = 1 Does Not Exist");
    }
}
