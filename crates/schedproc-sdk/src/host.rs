// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Capabilities supplied by the host runtime for one invocation.
//!
//! The host owns every value in this module. Activities reach them only through
//! the [`ActivityScope`](crate::activity::ActivityScope) built by the lifecycle
//! wrapper.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::arguments::{ArgumentValue, Arguments};
use crate::error::ServiceError;
use crate::query::{EntityCollection, OrganizationRequest, OrganizationResponse, QueryExpression};

/// Host tracing capability. Best-effort: implementations must not fail.
pub trait TracingService: Send + Sync {
    fn trace(&self, message: fmt::Arguments<'_>);
}

/// Remote record store and message executor.
///
/// Both calls are synchronous round trips. Timeouts, if any, are enforced on
/// the service side.
pub trait OrganizationService: Send + Sync {
    /// Run a query and return the matching records.
    fn retrieve_multiple(&self, query: &QueryExpression) -> Result<EntityCollection, ServiceError>;

    /// Execute a message.
    fn execute(&self, request: &OrganizationRequest) -> Result<OrganizationResponse, ServiceError>;
}

/// Creates service handles impersonating a user.
pub trait OrganizationServiceFactory: Send + Sync {
    /// `None` runs as the system user.
    fn create_organization_service(&self, user_id: Option<Uuid>) -> Arc<dyn OrganizationService>;
}

/// Read-only workflow context of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowContext {
    /// Correlates every operation started by the same root request
    pub correlation_id: Uuid,
    /// User that started the process chain
    pub initiating_user_id: Uuid,
    /// User the process runs as
    pub user_id: Uuid,
    /// Logical name of the record the activity runs against
    #[serde(default)]
    pub primary_entity_name: String,
    /// Record the activity runs against
    pub primary_entity_id: Uuid,
    /// Nesting depth of the current process execution
    #[serde(default = "default_depth")]
    pub depth: u32,
}

fn default_depth() -> u32 {
    1
}

impl WorkflowContext {
    /// Context where the initiating user is also the running user.
    pub fn new(
        correlation_id: Uuid,
        initiating_user_id: Uuid,
        primary_entity_name: impl Into<String>,
        primary_entity_id: Uuid,
    ) -> Self {
        Self {
            correlation_id,
            initiating_user_id,
            user_id: initiating_user_id,
            primary_entity_name: primary_entity_name.into(),
            primary_entity_id,
            depth: default_depth(),
        }
    }
}

/// Everything the host hands to one invocation.
///
/// Every capability is optional here; the lifecycle wrapper checks presence
/// and reports missing ones as integration errors.
#[derive(Default)]
pub struct ExecutionContext {
    tracing_service: Option<Arc<dyn TracingService>>,
    workflow_context: Option<WorkflowContext>,
    service_factory: Option<Arc<dyn OrganizationServiceFactory>>,
    arguments: Arguments,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracing_service(mut self, service: Arc<dyn TracingService>) -> Self {
        self.tracing_service = Some(service);
        self
    }

    pub fn with_workflow_context(mut self, context: WorkflowContext) -> Self {
        self.workflow_context = Some(context);
        self
    }

    pub fn with_service_factory(mut self, factory: Arc<dyn OrganizationServiceFactory>) -> Self {
        self.service_factory = Some(factory);
        self
    }

    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    /// Bind one input argument.
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) -> Self {
        self.arguments.bind(name, value);
        self
    }

    pub fn tracing_service(&self) -> Option<Arc<dyn TracingService>> {
        self.tracing_service.clone()
    }

    pub fn workflow_context(&self) -> Option<&WorkflowContext> {
        self.workflow_context.as_ref()
    }

    pub fn service_factory(&self) -> Option<Arc<dyn OrganizationServiceFactory>> {
        self.service_factory.clone()
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn arguments_mut(&mut self) -> &mut Arguments {
        &mut self.arguments
    }

    /// Hand the argument bag (inputs and written outputs) back to the host.
    pub fn into_arguments(self) -> Arguments {
        self.arguments
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("tracing_service", &self.tracing_service.is_some())
            .field("workflow_context", &self.workflow_context)
            .field("service_factory", &self.service_factory.is_some())
            .field("arguments", &self.arguments)
            .finish()
    }
}
