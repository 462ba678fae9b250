// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory organization service.
//!
//! Stands in for the remote record store when activities run outside a real
//! host (the test harness and tests). Queries are evaluated against records
//! held in memory and every request is journaled so callers can assert on what
//! was sent.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::host::{OrganizationService, OrganizationServiceFactory};
use crate::query::{
    Entity, EntityCollection, ExecuteWorkflowRequest, ExecuteWorkflowResponse,
    OrganizationRequest, OrganizationResponse, QueryExpression, WORKFLOW_ENTITY,
};

/// How the service answers execute-workflow requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecuteBehavior {
    /// Reply with a fresh process instance id
    #[default]
    RespondWithId,
    /// Reply with a response that carries no id
    RespondWithoutId,
    /// Reply with a response of another message type
    RespondWithOther,
}

#[derive(Debug, Default)]
struct State {
    records: Vec<Entity>,
    queries: Vec<QueryExpression>,
    executed: Vec<ExecuteWorkflowRequest>,
    null_result_sets: bool,
    execute_behavior: ExecuteBehavior,
    execute_fault: Option<ServiceError>,
}

/// Organization service backed by a record list.
#[derive(Debug, Default)]
pub struct InMemoryOrganizationService {
    state: Mutex<State>,
}

impl InMemoryOrganizationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service preloaded with `records`.
    pub fn with_records(records: impl IntoIterator<Item = Entity>) -> Self {
        let service = Self::new();
        for record in records {
            service.insert(record);
        }
        service
    }

    fn state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn insert(&self, record: Entity) {
        self.state().records.push(record);
    }

    /// Answer every query without a result set.
    pub fn set_null_result_sets(&self, enabled: bool) {
        self.state().null_result_sets = enabled;
    }

    pub fn set_execute_behavior(&self, behavior: ExecuteBehavior) {
        self.state().execute_behavior = behavior;
    }

    /// Fail every execute request with `fault`.
    pub fn set_execute_fault(&self, fault: Option<ServiceError>) {
        self.state().execute_fault = fault;
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<QueryExpression> {
        self.state().queries.clone()
    }

    /// Execute-workflow requests received so far, failed ones included.
    pub fn executed(&self) -> Vec<ExecuteWorkflowRequest> {
        self.state().executed.clone()
    }
}

impl OrganizationService for InMemoryOrganizationService {
    fn retrieve_multiple(&self, query: &QueryExpression) -> Result<EntityCollection, ServiceError> {
        let mut state = self.state();
        state.queries.push(query.clone());

        if state.null_result_sets {
            debug!(entity = %query.entity_name, "Answering query without result set");
            return Ok(EntityCollection { entities: None });
        }

        let entities: Vec<Entity> = state
            .records
            .iter()
            .filter(|r| r.logical_name == query.entity_name)
            .filter(|r| query.criteria.matches(&r.attributes))
            .map(|r| r.project(&query.column_set))
            .collect();

        debug!(
            entity = %query.entity_name,
            matches = entities.len(),
            "Evaluated in-memory query"
        );
        Ok(EntityCollection::new(entities))
    }

    fn execute(&self, request: &OrganizationRequest) -> Result<OrganizationResponse, ServiceError> {
        let mut state = self.state();
        match request {
            OrganizationRequest::ExecuteWorkflow(req) => {
                state.executed.push(*req);

                if let Some(fault) = &state.execute_fault {
                    return Err(fault.clone());
                }

                let known = state
                    .records
                    .iter()
                    .any(|r| r.logical_name == WORKFLOW_ENTITY && r.id == req.workflow_id);
                if !known {
                    return Err(ServiceError::Fault {
                        code: "ObjectDoesNotExist".to_string(),
                        message: format!("workflow With Id = {} Does Not Exist", req.workflow_id),
                    });
                }

                debug!(
                    workflow_id = %req.workflow_id,
                    entity_id = %req.entity_id,
                    "Executing workflow"
                );
                Ok(match state.execute_behavior {
                    ExecuteBehavior::RespondWithId => {
                        OrganizationResponse::ExecuteWorkflow(ExecuteWorkflowResponse {
                            id: Some(Uuid::new_v4()),
                        })
                    }
                    ExecuteBehavior::RespondWithoutId => {
                        OrganizationResponse::ExecuteWorkflow(ExecuteWorkflowResponse { id: None })
                    }
                    ExecuteBehavior::RespondWithOther => OrganizationResponse::Other {
                        request_name: request.name().to_string(),
                    },
                })
            }
        }
    }
}

/// Factory handing out one shared in-memory service.
#[derive(Debug)]
pub struct InMemoryServiceFactory {
    service: Arc<InMemoryOrganizationService>,
    impersonated: Mutex<Vec<Option<Uuid>>>,
}

impl InMemoryServiceFactory {
    pub fn new(service: Arc<InMemoryOrganizationService>) -> Self {
        Self {
            service,
            impersonated: Mutex::new(Vec::new()),
        }
    }

    pub fn service(&self) -> &Arc<InMemoryOrganizationService> {
        &self.service
    }

    /// User ids passed to `create_organization_service`, in call order.
    pub fn impersonated_users(&self) -> Vec<Option<Uuid>> {
        self.impersonated
            .lock()
            .map(|users| users.clone())
            .unwrap_or_default()
    }
}

impl OrganizationServiceFactory for InMemoryServiceFactory {
    fn create_organization_service(&self, user_id: Option<Uuid>) -> Arc<dyn OrganizationService> {
        if let Ok(mut users) = self.impersonated.lock() {
            users.push(user_id);
        }
        self.service.clone()
    }
}
