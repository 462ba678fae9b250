// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! schedproc SDK - lifecycle wrapper for workflow activities.
//!
//! A host runtime hands every invocation an [`ExecutionContext`] carrying its
//! capabilities (tracing, workflow context, organization service factory) and
//! the bound arguments. [`execute`] turns that into an [`ActivityScope`], runs
//! the concrete activity inside one error boundary and applies the
//! `FailOnException` policy to whatever the activity raises.
//!
//! # Quick Start
//!
//! ```ignore
//! use schedproc_sdk::{ActivityError, ActivityScope, CodeActivity, ExecutionContext, execute};
//!
//! struct Hello;
//!
//! impl CodeActivity for Hello {
//!     fn execute_activity(&self, scope: &mut ActivityScope<'_>) -> Result<(), ActivityError> {
//!         let ctx = scope.workflow_context();
//!         scope
//!             .trace()
//!             .trace(format_args!("Running against {}", ctx.primary_entity_id));
//!         Ok(())
//!     }
//! }
//!
//! let mut context = ExecutionContext::new()
//!     .with_tracing_service(tracing_service)
//!     .with_workflow_context(workflow_context)
//!     .with_service_factory(service_factory);
//!
//! execute(&Hello, Some(&mut context))?;
//! ```
//!
//! # Failure handling
//!
//! | Failure | `FailOnException = true` (default) | `FailOnException = false` |
//! |---------|------------------------------------|---------------------------|
//! | missing context or capability | `Err(ExecutionFailure::Integration)` | same |
//! | activity error or panic | outputs set, `Err(ExecutionFailure::Activity)` | outputs set, `Ok(())` |

pub mod activity;
pub mod arguments;
pub mod error;
pub mod host;
pub mod memory;
pub mod query;
pub mod telemetry;
pub mod trace;

pub use activity::{ActivityScope, CodeActivity, execute, execute_with};
pub use arguments::{
    ArgumentError, ArgumentValue, Arguments, EXCEPTION_MESSAGE, EXCEPTION_OCCURRED,
    FAIL_ON_EXCEPTION, InArgument, OptionSetValue, OutArgument,
};
pub use error::{ActivityError, ExecutionFailure, IntegrationError, Result, ServiceError};
pub use host::{
    ExecutionContext, OrganizationService, OrganizationServiceFactory, TracingService,
    WorkflowContext,
};
pub use trace::{LogTracingService, RecordingTracingService, TeeTracingService, TraceSink};

// Re-exported for activity crates
pub use serde_json;
pub use uuid;
