// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Run a named process against a record.
//!
//! Resolution pipeline, failing on the first problem and before any remote
//! mutation:
//!
//! ```text
//! ProcessName ──query──> process id
//! ProcessType ─────────> Workflow | Action (unimplemented)
//! ExecuteOn ───────────> Global | SingleRecord (unimplemented) | Query (unimplemented)
//!                        └─> ExecutionPlan ──ExecuteWorkflow──> response id
//! ```

use schedproc_sdk::query::{
    ColumnSet, ConditionOperator, ExecuteWorkflowRequest, OrganizationRequest, QueryExpression,
    WORKFLOW_ENTITY, WORKFLOW_ID_COLUMN, WorkflowRecordType,
};
use schedproc_sdk::{
    ActivityError, ActivityScope, ArgumentError, Arguments, CodeActivity, InArgument,
    OptionSetValue, OrganizationService, TraceSink,
};
use uuid::Uuid;

use crate::options::{ExecuteOn, ProcessType};

pub const PROCESS_NAME: &str = "ProcessName";
pub const PROCESS_TYPE: &str = "ProcessType";
pub const EXECUTE_ON: &str = "ExecuteOn";
pub const RECORD_ID: &str = "RecordID";

/// Everything needed for the single execute request of an invocation.
///
/// Not `Clone`: [`ExecutionPlan::execute_workflow`] takes the plan by value,
/// so one plan issues at most one execute request.
///
/// ```compile_fail
/// # use schedproc_activities::{ExecuteOn, ExecutionPlan};
/// # use schedproc_sdk::memory::InMemoryOrganizationService;
/// # use schedproc_sdk::TraceSink;
/// # use uuid::Uuid;
/// let service = InMemoryOrganizationService::new();
/// let trace = TraceSink::disabled();
/// let plan = ExecutionPlan {
///     process_id: Uuid::new_v4(),
///     target_id: Uuid::new_v4(),
///     execute_on: ExecuteOn::Global,
/// };
/// let _ = plan.execute_workflow(&service, &trace);
/// let _ = plan.execute_workflow(&service, &trace);
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub process_id: Uuid,
    pub target_id: Uuid,
    pub execute_on: ExecuteOn,
}

impl ExecutionPlan {
    /// Issue the execute request.
    pub fn execute_workflow(
        self,
        service: &dyn OrganizationService,
        trace: &TraceSink,
    ) -> Result<(), ActivityError> {
        let request = OrganizationRequest::ExecuteWorkflow(ExecuteWorkflowRequest {
            workflow_id: self.process_id,
            entity_id: self.target_id,
        });
        let response = service.execute(&request)?;

        match response.as_execute_workflow().and_then(|r| r.id) {
            Some(id) => trace.trace(format_args!(
                "{} Workflow has been executed correctly with ID: '{}'.",
                self.execute_on, id
            )),
            None => trace.trace(format_args!(
                "{} Workflow has been executed correctly but response is NULL.",
                self.execute_on
            )),
        }
        Ok(())
    }
}

/// Resolves a process definition by name and runs it.
#[derive(Debug)]
pub struct RunProcessActivity {
    process_name: InArgument<String>,
    process_type: InArgument<OptionSetValue>,
    execute_on: InArgument<OptionSetValue>,
}

impl Default for RunProcessActivity {
    fn default() -> Self {
        Self::new()
    }
}

impl RunProcessActivity {
    pub fn new() -> Self {
        Self {
            process_name: InArgument::new(PROCESS_NAME),
            process_type: InArgument::new(PROCESS_TYPE),
            execute_on: InArgument::new(EXECUTE_ON),
        }
    }

    /// Look up the id of the process definition named by `ProcessName`.
    pub fn retrieve_process(
        &self,
        args: &Arguments,
        service: &dyn OrganizationService,
        trace: &TraceSink,
    ) -> Result<Uuid, ActivityError> {
        let process_name = self
            .process_name
            .get(args)
            .map_err(|e| unbound_or(e, "Process Name argument cannot be null"))?
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ActivityError::invalid("Process Name cannot be null or empty"))?;

        let query = QueryExpression::new(WORKFLOW_ENTITY)
            .with_columns(ColumnSet::columns([WORKFLOW_ID_COLUMN]))
            .add_condition("name", ConditionOperator::Equal, process_name.as_str())
            .add_condition(
                "type",
                ConditionOperator::Equal,
                WorkflowRecordType::Definition.code(),
            );

        let entities = service
            .retrieve_multiple(&query)?
            .entities
            .ok_or_else(|| ActivityError::invalid("No Entities were found collection response"))?;

        let process_id = match entities.as_slice() {
            [] => {
                return Err(ActivityError::invalid(format!(
                    "No Processes were found with name '{}'",
                    process_name
                )));
            }
            [process] => process.id,
            _ => {
                return Err(ActivityError::invalid(format!(
                    "More than one process was found with name '{}'",
                    process_name
                )));
            }
        };

        trace.trace(format_args!(
            "The process '{}' was retrieved correctly with ID '{}'",
            process_name, process_id
        ));
        Ok(process_id)
    }

    pub fn resolve_process_type(
        &self,
        args: &Arguments,
        trace: &TraceSink,
    ) -> Result<ProcessType, ActivityError> {
        let value = self
            .process_type
            .get(args)
            .map_err(|e| unbound_or(e, "Process Type argument cannot be null"))?
            .ok_or_else(|| ActivityError::invalid("Process Type cannot be null"))?;

        trace.trace(format_args!(
            "Process Type value has been resolved correctly: '{}'.",
            value
        ));
        Ok(ProcessType::try_from(value.value)?)
    }

    pub fn resolve_execute_on(
        &self,
        args: &Arguments,
        trace: &TraceSink,
    ) -> Result<ExecuteOn, ActivityError> {
        let value = self
            .execute_on
            .get(args)
            .map_err(|e| unbound_or(e, "ExecuteOn argument cannot be null"))?
            .ok_or_else(|| ActivityError::invalid("ExecuteOn cannot be null"))?;

        trace.trace(format_args!(
            "Process Execute On value has been resolved correctly: '{}'.",
            value
        ));
        Ok(ExecuteOn::try_from(value.value)?)
    }

    /// Target record for `SingleRecord` runs.
    // TODO: parse `RecordID` once the scheduled process entity stores it as a lookup.
    pub fn resolve_record_id(&self, _args: &Arguments) -> Result<Uuid, ActivityError> {
        Err(ActivityError::not_implemented(format!(
            "Execute On '{}' record resolution is not implemented",
            ExecuteOn::SingleRecord
        )))
    }

    /// Pick the target record for a resolved process.
    pub fn plan(
        &self,
        process_id: Uuid,
        execute_on: ExecuteOn,
        scope: &ActivityScope<'_>,
    ) -> Result<ExecutionPlan, ActivityError> {
        let target_id = match execute_on {
            ExecuteOn::Global => scope.workflow_context().primary_entity_id,
            ExecuteOn::SingleRecord => self.resolve_record_id(scope.arguments())?,
            ExecuteOn::Query => {
                return Err(ActivityError::not_implemented(format!(
                    "Execute On '{}' is not implemented",
                    ExecuteOn::Query
                )));
            }
        };

        Ok(ExecutionPlan {
            process_id,
            target_id,
            execute_on,
        })
    }

    fn run_workflow(
        &self,
        process_id: Uuid,
        scope: &ActivityScope<'_>,
    ) -> Result<(), ActivityError> {
        let execute_on = self.resolve_execute_on(scope.arguments(), scope.trace())?;
        let plan = self.plan(process_id, execute_on, scope)?;
        plan.execute_workflow(scope.service().as_ref(), scope.trace())
    }
}

impl CodeActivity for RunProcessActivity {
    fn execute_activity(&self, scope: &mut ActivityScope<'_>) -> Result<(), ActivityError> {
        let process_id =
            self.retrieve_process(scope.arguments(), scope.service().as_ref(), scope.trace())?;

        match self.resolve_process_type(scope.arguments(), scope.trace())? {
            ProcessType::Workflow => self.run_workflow(process_id, scope),
            ProcessType::Action => Err(ActivityError::not_implemented(format!(
                "Process Type '{}' is not implemented",
                ProcessType::Action
            ))),
        }
    }
}

/// Map a missing binding to `message`, keep other argument errors as they are.
fn unbound_or(err: ArgumentError, message: &str) -> ActivityError {
    match err {
        ArgumentError::Unbound(_) => ActivityError::invalid(message),
        other => ActivityError::Argument(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schedproc_sdk::RecordingTracingService;
    use schedproc_sdk::memory::InMemoryOrganizationService;
    use schedproc_sdk::query::Entity;
    use std::sync::Arc;

    fn definition(name: &str) -> Entity {
        Entity::new(WORKFLOW_ENTITY, Uuid::new_v4())
            .with_attribute("name", name)
            .with_attribute("type", WorkflowRecordType::Definition.code())
    }

    fn sink() -> (Arc<RecordingTracingService>, TraceSink) {
        let recorder = Arc::new(RecordingTracingService::new());
        let sink = TraceSink::new(recorder.clone());
        (recorder, sink)
    }

    #[test]
    fn test_retrieve_process_unbound_and_empty() {
        let activity = RunProcessActivity::new();
        let service = InMemoryOrganizationService::new();
        let (_, trace) = sink();

        let err = activity
            .retrieve_process(&Arguments::new(), &service, &trace)
            .unwrap_err();
        assert_eq!(err.to_string(), "Process Name argument cannot be null");

        let args = Arguments::new().with_input(PROCESS_NAME, "");
        let err = activity.retrieve_process(&args, &service, &trace).unwrap_err();
        assert_eq!(err.to_string(), "Process Name cannot be null or empty");

        let mut args = Arguments::new();
        args.bind_null(PROCESS_NAME);
        let err = activity.retrieve_process(&args, &service, &trace).unwrap_err();
        assert_eq!(err.to_string(), "Process Name cannot be null or empty");

        assert!(service.queries().is_empty());
    }

    #[test]
    fn test_retrieve_process_queries_definitions_by_name() {
        let activity = RunProcessActivity::new();
        let process = definition("Nightly cleanup");
        let activation = Entity::new(WORKFLOW_ENTITY, Uuid::new_v4())
            .with_attribute("name", "Nightly cleanup")
            .with_attribute("type", WorkflowRecordType::Activation.code());
        let service = InMemoryOrganizationService::with_records([process.clone(), activation]);
        let (recorder, trace) = sink();

        let args = Arguments::new().with_input(PROCESS_NAME, "Nightly cleanup");
        let id = activity.retrieve_process(&args, &service, &trace).unwrap();

        assert_eq!(id, process.id);
        let queries = service.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].entity_name, WORKFLOW_ENTITY);
        assert_eq!(
            queries[0].column_set,
            ColumnSet::Columns(vec![WORKFLOW_ID_COLUMN.to_string()])
        );
        assert_eq!(queries[0].criteria.conditions.len(), 2);
        assert!(recorder.contains(&format!(
            "The process 'Nightly cleanup' was retrieved correctly with ID '{}'",
            process.id
        )));
    }

    #[test]
    fn test_retrieve_process_cardinality_errors() {
        let activity = RunProcessActivity::new();
        let (_, trace) = sink();
        let args = Arguments::new().with_input(PROCESS_NAME, "Nightly");

        let empty = InMemoryOrganizationService::new();
        let err = activity.retrieve_process(&args, &empty, &trace).unwrap_err();
        assert_eq!(err.to_string(), "No Processes were found with name 'Nightly'");

        let twice = InMemoryOrganizationService::with_records([
            definition("Nightly"),
            definition("Nightly"),
        ]);
        let err = activity.retrieve_process(&args, &twice, &trace).unwrap_err();
        assert_eq!(
            err.to_string(),
            "More than one process was found with name 'Nightly'"
        );

        let null = InMemoryOrganizationService::with_records([definition("Nightly")]);
        null.set_null_result_sets(true);
        let err = activity.retrieve_process(&args, &null, &trace).unwrap_err();
        assert_eq!(err.to_string(), "No Entities were found collection response");
    }

    #[test]
    fn test_retrieve_process_type_mismatch_is_argument_error() {
        let activity = RunProcessActivity::new();
        let service = InMemoryOrganizationService::new();
        let (_, trace) = sink();
        let args = Arguments::new().with_input(PROCESS_NAME, true);

        let err = activity.retrieve_process(&args, &service, &trace).unwrap_err();
        assert!(matches!(err, ActivityError::Argument(_)));
    }

    #[test]
    fn test_resolve_process_type() {
        let activity = RunProcessActivity::new();
        let (recorder, trace) = sink();

        let err = activity
            .resolve_process_type(&Arguments::new(), &trace)
            .unwrap_err();
        assert_eq!(err.to_string(), "Process Type argument cannot be null");

        let mut args = Arguments::new();
        args.bind_null(PROCESS_TYPE);
        let err = activity.resolve_process_type(&args, &trace).unwrap_err();
        assert_eq!(err.to_string(), "Process Type cannot be null");

        let args = Arguments::new().with_input(PROCESS_TYPE, OptionSetValue::new(5));
        let err = activity.resolve_process_type(&args, &trace).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected Process Type value '5'");

        let args = Arguments::new().with_input(PROCESS_TYPE, OptionSetValue::new(1));
        assert_eq!(
            activity.resolve_process_type(&args, &trace).unwrap(),
            ProcessType::Workflow
        );
        assert!(recorder.contains("Process Type value has been resolved correctly: '1'."));
    }

    #[test]
    fn test_resolve_execute_on_reads_its_own_argument() {
        let activity = RunProcessActivity::new();
        let (_, trace) = sink();

        let args = Arguments::new()
            .with_input(PROCESS_TYPE, OptionSetValue::new(1))
            .with_input(EXECUTE_ON, OptionSetValue::new(3));
        assert_eq!(
            activity.resolve_execute_on(&args, &trace).unwrap(),
            ExecuteOn::Query
        );

        let args = Arguments::new().with_input(PROCESS_TYPE, OptionSetValue::new(1));
        let err = activity.resolve_execute_on(&args, &trace).unwrap_err();
        assert_eq!(err.to_string(), "ExecuteOn argument cannot be null");

        let mut args = Arguments::new();
        args.bind_null(EXECUTE_ON);
        let err = activity.resolve_execute_on(&args, &trace).unwrap_err();
        assert_eq!(err.to_string(), "ExecuteOn cannot be null");

        let args = Arguments::new().with_input(EXECUTE_ON, OptionSetValue::new(42));
        let err = activity.resolve_execute_on(&args, &trace).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected Execute On value '42'");
    }

    #[test]
    fn test_record_id_resolution_is_stubbed() {
        let activity = RunProcessActivity::new();
        let args = Arguments::new().with_input(RECORD_ID, Uuid::new_v4().to_string());

        let err = activity.resolve_record_id(&args).unwrap_err();
        assert!(err.is_not_implemented());
        assert_eq!(
            err.to_string(),
            "Execute On 'SingleRecord' record resolution is not implemented"
        );
    }

    #[test]
    fn test_plan_execute_traces_response() {
        let process = definition("Nightly");
        let service = InMemoryOrganizationService::with_records([process.clone()]);
        let (recorder, trace) = sink();
        let plan = ExecutionPlan {
            process_id: process.id,
            target_id: Uuid::new_v4(),
            execute_on: ExecuteOn::Global,
        };

        let expected = ExecuteWorkflowRequest {
            workflow_id: plan.process_id,
            entity_id: plan.target_id,
        };

        plan.execute_workflow(&service, &trace).unwrap();

        assert_eq!(service.executed(), vec![expected]);
        assert!(recorder.contains("Global Workflow has been executed correctly with ID: '"));
    }

    #[test]
    fn test_plan_execute_without_id_is_not_an_error() {
        use schedproc_sdk::memory::ExecuteBehavior;

        let process = definition("Nightly");
        let service = InMemoryOrganizationService::with_records([process.clone()]);
        let (recorder, trace) = sink();
        let target_id = Uuid::new_v4();
        let plan = || ExecutionPlan {
            process_id: process.id,
            target_id,
            execute_on: ExecuteOn::Global,
        };

        service.set_execute_behavior(ExecuteBehavior::RespondWithoutId);
        plan().execute_workflow(&service, &trace).unwrap();
        service.set_execute_behavior(ExecuteBehavior::RespondWithOther);
        plan().execute_workflow(&service, &trace).unwrap();

        let notes = recorder
            .records()
            .into_iter()
            .filter(|r| r == "Global Workflow has been executed correctly but response is NULL.")
            .count();
        assert_eq!(notes, 2);
    }
}
