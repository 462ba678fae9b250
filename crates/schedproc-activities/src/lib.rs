// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workflow activities for scheduled processes.
//!
//! [`RunProcessActivity`] resolves a process definition by name and runs it
//! against the primary record of the calling workflow. Run it through
//! [`schedproc_sdk::execute`] so it gets the lifecycle wrapper, the error
//! boundary and the `FailOnException` policy.
//!
//! ```ignore
//! use schedproc_activities::RunProcessActivity;
//!
//! let activity = RunProcessActivity::new();
//! schedproc_sdk::execute(&activity, Some(&mut ctx))?;
//! ```

pub mod options;
pub mod registry;
pub mod run_process;

pub use options::{ExecuteOn, OptionValueError, ProcessType};
pub use registry::{ActivityRegistry, RUN_PROCESS};
pub use run_process::{
    EXECUTE_ON, ExecutionPlan, PROCESS_NAME, PROCESS_TYPE, RECORD_ID, RunProcessActivity,
};
