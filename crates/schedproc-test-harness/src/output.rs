// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Run report written to `output.json`.
//!
//! Mirrors the instance output of workflow binaries: a status plus either
//! the activity outputs or an error, and for this harness the trace records
//! and the execute requests the in-memory organization received.

use std::collections::HashMap;
use std::path::Path;

use schedproc_sdk::ArgumentValue;
use schedproc_sdk::query::ExecuteWorkflowRequest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The wrapper returned normally (failures may have been suppressed)
    Completed,
    /// The wrapper raised, or the harness could not run the activity
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessOutput {
    pub status: RunStatus,

    /// Failure raised to the host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Output arguments written during the invocation
    #[serde(default)]
    pub outputs: HashMap<String, ArgumentValue>,

    #[serde(default)]
    pub traces: Vec<String>,

    /// Execute requests received by the organization, in order
    #[serde(default)]
    pub executed: Vec<ExecuteWorkflowRequest>,
}

impl HarnessOutput {
    pub fn completed(outputs: HashMap<String, ArgumentValue>) -> Self {
        Self {
            status: RunStatus::Completed,
            error: None,
            outputs,
            traces: Vec::new(),
            executed: Vec::new(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Failed,
            error: Some(error.into()),
            outputs: HashMap::new(),
            traces: Vec::new(),
            executed: Vec::new(),
        }
    }

    pub fn with_outputs(mut self, outputs: HashMap<String, ArgumentValue>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_traces(mut self, traces: Vec<String>) -> Self {
        self.traces = traces;
        self
    }

    pub fn with_executed(mut self, executed: Vec<ExecuteWorkflowRequest>) -> Self {
        self.executed = executed;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_failed_serialization_skips_missing_error() {
        let json = serde_json::to_value(HarnessOutput::completed(HashMap::new())).unwrap();
        assert_eq!(json["status"], "completed");
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(HarnessOutput::failed("boom")).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn test_write_to_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("1").join("output.json");
        let request = ExecuteWorkflowRequest {
            workflow_id: Uuid::new_v4(),
            entity_id: Uuid::new_v4(),
        };
        let output = HarnessOutput::failed("No Processes were found with name 'x'")
            .with_outputs(HashMap::from([(
                "ExceptionOccurred".to_string(),
                ArgumentValue::Bool(true),
            )]))
            .with_traces(vec!["Entered custom activity".to_string()])
            .with_executed(vec![request]);

        output.write_to_file(&path).unwrap();

        let read: HarnessOutput =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, output);
    }
}
