// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Activity lifecycle wrapper.
//!
//! [`execute_with`] is the single error boundary shared by all activities:
//!
//! 1. Reject a missing execution context.
//! 2. Acquire the tracing capability and build the invocation [`TraceSink`].
//! 3. Acquire the workflow context.
//! 4. Acquire the service factory and create a service handle impersonating
//!    the initiating user.
//! 5. Run the activity logic. Any failure (including a panic) is traced,
//!    written to the `ExceptionOccurred` / `ExceptionMessage` outputs and then
//!    either re-raised or suppressed according to `FailOnException`.
//!
//! Failures in steps 1-4 are host contract violations and are always returned
//! to the host, whatever the value of `FailOnException`.
//!
//! A captured panic still runs the process panic hook first, which by default
//! prints the payload to stderr outside the invocation [`TraceSink`]. Hosts
//! that need the sink to be the only output install their own hook with
//! [`std::panic::set_hook`].

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::arguments::{
    Arguments, EXCEPTION_MESSAGE, EXCEPTION_OCCURRED, FAIL_ON_EXCEPTION, InArgument, OutArgument,
};
use crate::error::{ActivityError, ExecutionFailure, IntegrationError};
use crate::host::{
    ExecutionContext, OrganizationService, OrganizationServiceFactory, WorkflowContext,
};
use crate::trace::TraceSink;

/// A concrete activity plugged into the lifecycle wrapper.
pub trait CodeActivity: Send + Sync {
    /// Fully-qualified activity name used in trace records.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Activity logic. Runs inside the error boundary of [`execute`].
    fn execute_activity(&self, scope: &mut ActivityScope<'_>) -> Result<(), ActivityError>;
}

/// State of one invocation handed to activity logic.
pub struct ActivityScope<'a> {
    trace: TraceSink,
    workflow_context: WorkflowContext,
    service_factory: Arc<dyn OrganizationServiceFactory>,
    service: Arc<dyn OrganizationService>,
    arguments: &'a mut Arguments,
}

impl<'a> ActivityScope<'a> {
    pub fn trace(&self) -> &TraceSink {
        &self.trace
    }

    pub fn workflow_context(&self) -> &WorkflowContext {
        &self.workflow_context
    }

    pub fn service_factory(&self) -> &Arc<dyn OrganizationServiceFactory> {
        &self.service_factory
    }

    /// Service handle impersonating the initiating user.
    pub fn service(&self) -> &Arc<dyn OrganizationService> {
        &self.service
    }

    pub fn arguments(&self) -> &Arguments {
        self.arguments
    }

    pub fn arguments_mut(&mut self) -> &mut Arguments {
        self.arguments
    }
}

/// Run `activity` through the lifecycle wrapper.
pub fn execute<A>(
    activity: &A,
    context: Option<&mut ExecutionContext>,
) -> Result<(), ExecutionFailure>
where
    A: CodeActivity + ?Sized,
{
    execute_with(activity.name(), context, |scope| activity.execute_activity(scope))
}

/// Run `body` inside the lifecycle wrapper under the activity name `name`.
pub fn execute_with<F>(
    name: &str,
    context: Option<&mut ExecutionContext>,
    body: F,
) -> Result<(), ExecutionFailure>
where
    F: FnOnce(&mut ActivityScope<'_>) -> Result<(), ActivityError>,
{
    let context = context.ok_or(IntegrationError::NullContext)?;

    let trace = TraceSink::from_context(context);
    if !trace.is_enabled() {
        return Err(IntegrationError::TracingServiceUnavailable.into());
    }

    let workflow_context = context
        .workflow_context()
        .cloned()
        .ok_or(IntegrationError::WorkflowContextUnavailable)?;

    let service_factory = context
        .service_factory()
        .ok_or(IntegrationError::ServiceFactoryUnavailable)?;
    let service =
        service_factory.create_organization_service(Some(workflow_context.initiating_user_id));

    trace.trace(format_args!(
        "Entered custom activity, Correlation Id: {}, Initiating User: {}",
        workflow_context.correlation_id, workflow_context.initiating_user_id
    ));

    let correlation_id = workflow_context.correlation_id;
    let mut scope = ActivityScope {
        trace: trace.clone(),
        workflow_context,
        service_factory,
        service,
        arguments: context.arguments_mut(),
    };

    trace.trace(format_args!(
        "Entering ExecuteActivity {}. Correlation Id: {}",
        name, correlation_id
    ));

    let outcome = match catch_unwind(AssertUnwindSafe(|| body(&mut scope))) {
        Ok(result) => result,
        Err(payload) => Err(ActivityError::Panicked(panic_message(payload.as_ref()))),
    };
    drop(scope);

    match outcome {
        Ok(()) => {
            trace.trace(format_args!(
                "Ending ExecuteActivity {}.  Correlation Id: {}",
                name, correlation_id
            ));
            Ok(())
        }
        Err(error) => {
            let message = error.to_string();
            trace.trace(format_args!(
                "Workflow Activity '{}' failed. Error message: '{}'",
                name, message
            ));

            let arguments = context.arguments_mut();
            OutArgument::<bool>::new(EXCEPTION_OCCURRED).set(arguments, true);
            OutArgument::<String>::new(EXCEPTION_MESSAGE).set(arguments, message);

            if fail_on_exception(arguments, &trace) {
                Err(ExecutionFailure::activity(error))
            } else {
                Ok(())
            }
        }
    }
}

/// Resolve `FailOnException`, defaulting to true.
fn fail_on_exception(arguments: &Arguments, trace: &TraceSink) -> bool {
    let policy = InArgument::new(FAIL_ON_EXCEPTION).with_default(true);
    match policy.get_or_default(arguments) {
        Ok(value) => value.unwrap_or(true),
        Err(e) => {
            trace.trace(format_args!(
                "Could not resolve {}, failing the activity: {}",
                FAIL_ON_EXCEPTION, e
            ));
            true
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "activity panicked".to_string()
    }
}
