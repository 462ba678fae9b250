// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Option set enumerations of the scheduled process entity.

use std::fmt;
use std::str::FromStr;

use schedproc_sdk::ActivityError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw option value that matches no enumeration member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unexpected {label} value '{value}'")]
pub struct OptionValueError {
    /// Human label of the option set
    pub label: &'static str,
    /// The offending raw value, as supplied
    pub value: String,
}

impl From<OptionValueError> for ActivityError {
    fn from(err: OptionValueError) -> Self {
        ActivityError::InvalidExecution(err.to_string())
    }
}

/// Kind of process to run (`dxtools_processtype`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessType {
    Workflow = 1,
    Action = 2,
}

impl ProcessType {
    pub const LABEL: &'static str = "Process Type";

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            ProcessType::Workflow => "Workflow",
            ProcessType::Action => "Action",
        }
    }
}

impl TryFrom<i32> for ProcessType {
    type Error = OptionValueError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ProcessType::Workflow),
            2 => Ok(ProcessType::Action),
            other => Err(OptionValueError {
                label: Self::LABEL,
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for ProcessType {
    type Err = OptionValueError;

    /// Accepts the member name or its numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Workflow" => Ok(ProcessType::Workflow),
            "Action" => Ok(ProcessType::Action),
            other => other
                .parse::<i32>()
                .map_err(|_| OptionValueError {
                    label: Self::LABEL,
                    value: other.to_string(),
                })
                .and_then(ProcessType::try_from),
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which record(s) a process runs against (`dxtools_executeon`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecuteOn {
    /// The record the activity itself runs against
    Global = 1,
    /// One explicitly configured record
    SingleRecord = 2,
    /// Every record returned by a query
    Query = 3,
}

impl ExecuteOn {
    pub const LABEL: &'static str = "Execute On";

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            ExecuteOn::Global => "Global",
            ExecuteOn::SingleRecord => "SingleRecord",
            ExecuteOn::Query => "Query",
        }
    }
}

impl TryFrom<i32> for ExecuteOn {
    type Error = OptionValueError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ExecuteOn::Global),
            2 => Ok(ExecuteOn::SingleRecord),
            3 => Ok(ExecuteOn::Query),
            other => Err(OptionValueError {
                label: Self::LABEL,
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for ExecuteOn {
    type Err = OptionValueError;

    /// Accepts the member name or its numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Global" => Ok(ExecuteOn::Global),
            "SingleRecord" => Ok(ExecuteOn::SingleRecord),
            "Query" => Ok(ExecuteOn::Query),
            other => other
                .parse::<i32>()
                .map_err(|_| OptionValueError {
                    label: Self::LABEL,
                    value: other.to_string(),
                })
                .and_then(ExecuteOn::try_from),
        }
    }
}

impl fmt::Display for ExecuteOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
