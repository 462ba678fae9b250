// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Schedproc Test Harness
//!
//! Runs one registered activity through the lifecycle wrapper against an
//! in-memory organization seeded from the request, then reports what
//! happened.
//!
//! ## Input Format (via `INPUT_JSON` env var)
//!
//! ```json
//! {
//!   "activity": "run-process",
//!   "context": {
//!     "correlation_id": "6f1c2a4e-8a8b-4c50-9d61-2f0f8b1d7a10",
//!     "initiating_user_id": "0b3e5c1d-2a44-4f3e-8c7a-9e1d2b3c4d5e",
//!     "user_id": "0b3e5c1d-2a44-4f3e-8c7a-9e1d2b3c4d5e",
//!     "primary_entity_name": "dxtools_scheduledprocess",
//!     "primary_entity_id": "a8c4e0d2-5b7f-4e3a-9c1d-7f2e6b8a0c94"
//!   },
//!   "inputs": {
//!     "ProcessName": "Recalculate Totals",
//!     "ProcessType": { "value": 1 },
//!     "ExecuteOn": { "value": 1 },
//!     "FailOnException": false
//!   },
//!   "records": [
//!     {
//!       "logical_name": "workflow",
//!       "id": "5d9e7c3b-1f2a-4b6c-8d0e-3a4b5c6d7e8f",
//!       "attributes": { "name": "Recalculate Totals", "type": 1 }
//!     }
//!   ],
//!   "respond_without_id": false
//! }
//! ```
//!
//! ## Output Format (written to `output.json`)
//!
//! See [`output::HarnessOutput`]. The exit code is non-zero when the status is
//! `failed`.

mod config;
mod error;
mod output;

use std::collections::HashMap;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use schedproc_activities::{ActivityRegistry, RUN_PROCESS};
use schedproc_sdk::memory::{ExecuteBehavior, InMemoryOrganizationService, InMemoryServiceFactory};
use schedproc_sdk::query::Entity;
use schedproc_sdk::{
    ArgumentValue, Arguments, ExecutionContext, LogTracingService, RecordingTracingService,
    TeeTracingService, TracingService, WorkflowContext, execute, telemetry,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::output::HarnessOutput;

/// Test request input format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TestRequest {
    /// Registered activity name (default: "run-process")
    #[serde(default = "default_activity")]
    activity: String,

    /// Workflow context handed to the activity
    context: WorkflowContext,

    /// Bound inputs; `null` binds an input to null
    #[serde(default)]
    inputs: HashMap<String, Option<ArgumentValue>>,

    /// Records preloaded into the in-memory organization
    #[serde(default)]
    records: Vec<Entity>,

    /// Answer execute requests without a process instance id
    #[serde(default)]
    respond_without_id: bool,
}

fn default_activity() -> String {
    RUN_PROCESS.to_string()
}

fn main() -> ExitCode {
    telemetry::init_subscriber();

    let config = match HarnessConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load harness configuration");
            let _ = HarnessOutput::failed(e.to_string()).write_to_file(Path::new("output.json"));
            return ExitCode::FAILURE;
        }
    };

    let output = match run(&config.input_json, &ActivityRegistry::with_builtin()) {
        Ok(output) => output,
        Err(e) => {
            error!(error = %e, "Harness could not run the activity");
            HarnessOutput::failed(e.to_string())
        }
    };

    let path = config.output_path();
    if let Err(e) = output.write_to_file(&path) {
        error!(error = %e, path = %path.display(), "Failed to write output");
        return ExitCode::FAILURE;
    }

    if output.is_completed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Parse `input_json` and run the requested activity.
fn run(input_json: &str, registry: &ActivityRegistry) -> Result<HarnessOutput> {
    let request: TestRequest = serde_json::from_str(input_json)?;
    execute_request(request, registry)
}

fn execute_request(request: TestRequest, registry: &ActivityRegistry) -> Result<HarnessOutput> {
    let activity = registry
        .get(&request.activity)
        .ok_or_else(|| HarnessError::UnknownActivity {
            name: request.activity.clone(),
            registered: registry.names().join(", "),
        })?;

    let service = Arc::new(InMemoryOrganizationService::with_records(request.records));
    if request.respond_without_id {
        service.set_execute_behavior(ExecuteBehavior::RespondWithoutId);
    }
    let factory = Arc::new(InMemoryServiceFactory::new(service.clone()));

    let recorder = Arc::new(RecordingTracingService::new());
    let log: Arc<dyn TracingService> =
        Arc::new(LogTracingService::new().with_correlation_id(request.context.correlation_id));
    let recorded: Arc<dyn TracingService> = recorder.clone();

    let mut ctx = ExecutionContext::new()
        .with_tracing_service(Arc::new(TeeTracingService::new(vec![log, recorded])))
        .with_workflow_context(request.context)
        .with_service_factory(factory)
        .with_arguments(Arguments {
            inputs: request.inputs,
            outputs: HashMap::new(),
        });

    info!(activity = %request.activity, "Running activity");
    let result = execute(activity.as_ref(), Some(&mut ctx));

    let outputs = ctx.into_arguments().outputs;
    let output = match result {
        Ok(()) => HarnessOutput::completed(outputs),
        Err(e) => {
            warn!(activity = %request.activity, error = %e, "Activity failed");
            HarnessOutput::failed(e.to_string()).with_outputs(outputs)
        }
    };

    Ok(output
        .with_traces(recorder.records())
        .with_executed(service.executed()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RunStatus;
    use schedproc_sdk::{EXCEPTION_MESSAGE, EXCEPTION_OCCURRED};
    use serde_json::json;
    use uuid::Uuid;

    const PROCESS_ID: &str = "5d9e7c3b-1f2a-4b6c-8d0e-3a4b5c6d7e8f";
    const PRIMARY_ID: &str = "a8c4e0d2-5b7f-4e3a-9c1d-7f2e6b8a0c94";

    fn request(process_name: &str, extra: serde_json::Value) -> String {
        let mut request = json!({
            "context": {
                "correlation_id": Uuid::new_v4(),
                "initiating_user_id": Uuid::new_v4(),
                "user_id": Uuid::new_v4(),
                "primary_entity_name": "dxtools_scheduledprocess",
                "primary_entity_id": PRIMARY_ID
            },
            "inputs": {
                "ProcessName": process_name,
                "ProcessType": { "value": 1 },
                "ExecuteOn": { "value": 1 }
            },
            "records": [{
                "logical_name": "workflow",
                "id": PROCESS_ID,
                "attributes": { "name": "Recalculate Totals", "type": 1 }
            }]
        });
        if let (Some(target), Some(extra)) = (request.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                target.insert(key.clone(), value.clone());
            }
        }
        request.to_string()
    }

    #[test]
    fn test_parse_request_defaults() {
        let parsed: TestRequest =
            serde_json::from_str(&request("Recalculate Totals", json!({}))).unwrap();

        assert_eq!(parsed.activity, RUN_PROCESS);
        assert!(!parsed.respond_without_id);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.context.depth, 1);
    }

    #[test]
    fn test_run_completes_and_reports_execute() {
        let output = run(
            &request("Recalculate Totals", json!({})),
            &ActivityRegistry::with_builtin(),
        )
        .unwrap();

        assert_eq!(output.status, RunStatus::Completed);
        assert!(output.outputs.is_empty());
        assert_eq!(output.executed.len(), 1);
        assert_eq!(output.executed[0].workflow_id.to_string(), PROCESS_ID);
        assert_eq!(output.executed[0].entity_id.to_string(), PRIMARY_ID);
        assert!(
            output
                .traces
                .iter()
                .any(|t| t.starts_with("Global Workflow has been executed correctly with ID"))
        );
    }

    #[test]
    fn test_run_reports_failure_with_outputs() {
        let output = run(
            &request("Unknown", json!({})),
            &ActivityRegistry::with_builtin(),
        )
        .unwrap();

        assert_eq!(output.status, RunStatus::Failed);
        assert_eq!(
            output.error.as_deref(),
            Some("No Processes were found with name 'Unknown'")
        );
        assert_eq!(
            output.outputs.get(EXCEPTION_OCCURRED),
            Some(&ArgumentValue::Bool(true))
        );
        assert!(output.executed.is_empty());
    }

    #[test]
    fn test_run_suppressed_failure_completes() {
        let extra = json!({
            "inputs": {
                "ProcessName": "Unknown",
                "ProcessType": { "value": 1 },
                "ExecuteOn": { "value": 1 },
                "FailOnException": false
            }
        });

        let output = run(&request("Unknown", extra), &ActivityRegistry::with_builtin()).unwrap();

        assert_eq!(output.status, RunStatus::Completed);
        assert!(output.outputs.contains_key(EXCEPTION_MESSAGE));
    }

    #[test]
    fn test_run_respond_without_id() {
        let output = run(
            &request("Recalculate Totals", json!({ "respond_without_id": true })),
            &ActivityRegistry::with_builtin(),
        )
        .unwrap();

        assert!(output.is_completed());
        assert!(output.traces.iter().any(|t| t.ends_with("response is NULL.")));
    }

    #[test]
    fn test_run_unknown_activity() {
        let err = run(
            &request("Recalculate Totals", json!({ "activity": "run-action" })),
            &ActivityRegistry::with_builtin(),
        )
        .unwrap_err();

        assert!(matches!(err, HarnessError::UnknownActivity { .. }));
        assert!(err.to_string().contains(RUN_PROCESS));
    }

    #[test]
    fn test_run_rejects_malformed_json() {
        let err = run("{ not json", &ActivityRegistry::with_builtin()).unwrap_err();
        assert!(matches!(err, HarnessError::Request(_)));
    }
}
