// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Record and request model of the organization service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Logical name of process (workflow) records.
pub const WORKFLOW_ENTITY: &str = "workflow";
/// Primary key column of process records.
pub const WORKFLOW_ID_COLUMN: &str = "workflowid";

/// Subtype of a process record (`type` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowRecordType {
    /// The process definition itself
    Definition = 1,
    /// An activated copy of a definition
    Activation = 2,
    /// A template to create definitions from
    Template = 3,
}

impl WorkflowRecordType {
    pub fn code(self) -> i64 {
        self as i64
    }
}

/// Columns to retrieve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSet {
    All,
    Columns(Vec<String>),
}

impl ColumnSet {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnSet::Columns(columns.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, column: &str) -> bool {
        match self {
            ColumnSet::All => true,
            ColumnSet::Columns(cols) => cols.iter().any(|c| c == column),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equal,
    NotEqual,
}

/// A single attribute condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionExpression {
    pub attribute: String,
    pub operator: ConditionOperator,
    pub values: Vec<Value>,
}

impl ConditionExpression {
    /// Evaluate the condition against a record's attributes.
    pub fn matches(&self, attributes: &Map<String, Value>) -> bool {
        let actual = attributes.get(&self.attribute).unwrap_or(&Value::Null);
        let hit = self.values.iter().any(|expected| expected == actual);
        match self.operator {
            ConditionOperator::Equal => hit,
            ConditionOperator::NotEqual => !hit,
        }
    }
}

/// Conjunction of conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterExpression {
    pub conditions: Vec<ConditionExpression>,
}

impl FilterExpression {
    pub fn matches(&self, attributes: &Map<String, Value>) -> bool {
        self.conditions.iter().all(|c| c.matches(attributes))
    }
}

/// Query against a single entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryExpression {
    pub entity_name: String,
    pub column_set: ColumnSet,
    pub criteria: FilterExpression,
}

impl QueryExpression {
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            column_set: ColumnSet::All,
            criteria: FilterExpression::default(),
        }
    }

    pub fn with_columns(mut self, column_set: ColumnSet) -> Self {
        self.column_set = column_set;
        self
    }

    /// Add a condition to the top-level filter.
    pub fn add_condition(
        mut self,
        attribute: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<Value>,
    ) -> Self {
        self.criteria.conditions.push(ConditionExpression {
            attribute: attribute.into(),
            operator,
            values: vec![value.into()],
        });
        self
    }
}

/// A record returned by the organization service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub logical_name: String,
    pub id: Uuid,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Entity {
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Copy of the record keeping only the requested columns.
    pub fn project(&self, columns: &ColumnSet) -> Self {
        let attributes = self
            .attributes
            .iter()
            .filter(|(name, _)| columns.contains(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self {
            logical_name: self.logical_name.clone(),
            id: self.id,
            attributes,
        }
    }
}

/// Result set of a query. `entities` is `None` when the service answered
/// without a result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityCollection {
    pub entities: Option<Vec<Entity>>,
}

impl EntityCollection {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            entities: Some(entities),
        }
    }
}

/// Run a process definition against one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteWorkflowRequest {
    pub workflow_id: Uuid,
    pub entity_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteWorkflowResponse {
    /// Identifier of the started process instance
    pub id: Option<Uuid>,
}

/// Requests accepted by [`OrganizationService::execute`](crate::host::OrganizationService::execute).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum OrganizationRequest {
    ExecuteWorkflow(ExecuteWorkflowRequest),
}

impl OrganizationRequest {
    pub fn name(&self) -> &'static str {
        match self {
            OrganizationRequest::ExecuteWorkflow(_) => "ExecuteWorkflow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum OrganizationResponse {
    ExecuteWorkflow(ExecuteWorkflowResponse),
    /// Response of a different message than the one requested
    Other { request_name: String },
}

impl OrganizationResponse {
    /// Downcast to an execute-workflow response.
    pub fn as_execute_workflow(&self) -> Option<&ExecuteWorkflowResponse> {
        match self {
            OrganizationResponse::ExecuteWorkflow(r) => Some(r),
            OrganizationResponse::Other { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn process(name: &str, record_type: WorkflowRecordType) -> Entity {
        Entity::new(WORKFLOW_ENTITY, Uuid::new_v4())
            .with_attribute("name", name)
            .with_attribute("type", record_type.code())
    }

    #[test]
    fn test_filter_matches_all_conditions() {
        let query = QueryExpression::new(WORKFLOW_ENTITY)
            .add_condition("name", ConditionOperator::Equal, "Nightly")
            .add_condition(
                "type",
                ConditionOperator::Equal,
                WorkflowRecordType::Definition.code(),
            );

        let definition = process("Nightly", WorkflowRecordType::Definition);
        let activation = process("Nightly", WorkflowRecordType::Activation);
        let other = process("Weekly", WorkflowRecordType::Definition);

        assert!(query.criteria.matches(&definition.attributes));
        assert!(!query.criteria.matches(&activation.attributes));
        assert!(!query.criteria.matches(&other.attributes));
    }

    #[test]
    fn test_not_equal_and_missing_attribute() {
        let cond = ConditionExpression {
            attribute: "statecode".to_string(),
            operator: ConditionOperator::NotEqual,
            values: vec![json!(1)],
        };
        assert!(cond.matches(&Map::new()));
    }

    #[test]
    fn test_project_keeps_requested_columns() {
        let record = process("Nightly", WorkflowRecordType::Definition)
            .with_attribute(WORKFLOW_ID_COLUMN, "x");
        let projected = record.project(&ColumnSet::columns([WORKFLOW_ID_COLUMN]));

        assert_eq!(projected.id, record.id);
        assert_eq!(projected.attributes.len(), 1);
        assert!(projected.attributes.contains_key(WORKFLOW_ID_COLUMN));
    }

    #[test]
    fn test_response_downcast() {
        let id = Uuid::new_v4();
        let resp = OrganizationResponse::ExecuteWorkflow(ExecuteWorkflowResponse { id: Some(id) });
        assert_eq!(resp.as_execute_workflow().unwrap().id, Some(id));

        let other = OrganizationResponse::Other {
            request_name: "WhoAmI".to_string(),
        };
        assert!(other.as_execute_workflow().is_none());
    }
}
